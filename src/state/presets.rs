/// One-click instruction catalogs
///
/// Two static tables: general editing presets and hairstyle presets.
/// Selecting an entry overwrites the instruction with its fixed text.

/// A general-purpose editing preset
#[derive(Debug, PartialEq, Eq)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub prompt: &'static str,
    pub description: &'static str,
}

/// A hairstyle preset (label + fixed instruction)
#[derive(Debug, PartialEq, Eq)]
pub struct StylePreset {
    pub label: &'static str,
    pub prompt: &'static str,
}

pub static PRESETS: [Preset; 6] = [
    Preset {
        id: "restore",
        label: "老照片修复",
        prompt: "修复这张老照片。去除划痕，修复破损，去噪，锐化细节，并显著改善色彩平衡。",
        description: "修复划痕、噪点和色彩",
    },
    Preset {
        id: "background",
        label: "智能抠图",
        prompt: "移除这张图片的背景，替换为干净的纯白背景。保持主体清晰完整。",
        description: "分离主体，移除背景",
    },
    Preset {
        id: "face_swap",
        label: "AI 换脸",
        prompt: "将图片中人物的脸换成一张友好的笑脸，特征清晰，肤色自然融合。",
        description: "生成新的面部特征",
    },
    Preset {
        id: "avatar",
        label: "生成头像",
        prompt: "将这张图片转换成高质量的3D卡通头像风格，类似皮克斯动画风格。",
        description: "3D卡通/皮克斯风格",
    },
    Preset {
        id: "watermark",
        label: "去除水印",
        prompt: "移除这张图片上的所有水印、Logo和文字覆盖。智能填充并重建被遮挡的纹理，使其看起来自然。",
        description: "清除文字和Logo",
    },
    Preset {
        id: "mosaic",
        label: "去除马赛克",
        prompt: "去除图片中的马赛克或模糊，进行超分辨率重建，尽可能恢复原始细节和清晰度。",
        description: "去模糊，锐化细节",
    },
];

pub static HAIRSTYLES: [StylePreset; 6] = [
    StylePreset {
        label: "波波头",
        prompt: "将图片中人物的发型改为齐下巴的波波头短发，发丝自然有光泽。保持面部特征、表情和背景完全不变。",
    },
    StylePreset {
        label: "大波浪长发",
        prompt: "将图片中人物的发型改为蓬松的大波浪长卷发，长度及胸。保持面部特征、表情和背景完全不变。",
    },
    StylePreset {
        label: "寸头",
        prompt: "将图片中人物的发型改为干净利落的寸头，发际线自然。保持面部特征、表情和背景完全不变。",
    },
    StylePreset {
        label: "法式刘海",
        prompt: "为图片中的人物换上轻薄的法式刘海中长发，刘海自然垂落在眉毛附近。保持面部特征、表情和背景完全不变。",
    },
    StylePreset {
        label: "高马尾",
        prompt: "将图片中人物的头发扎成利落的高马尾，额前留少量碎发。保持面部特征、表情和背景完全不变。",
    },
    StylePreset {
        label: "背头",
        prompt: "将图片中人物的发型改为向后梳的油头背头，造型整洁有光泽。保持面部特征、表情和背景完全不变。",
    },
];

/// Look up a general preset by its id
pub fn preset(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.id == id)
}
