/// Prompt composition
///
/// Keeps the instruction text and the optional reference image consistent
/// with one of four input modes: free text, a general preset, a hairstyle
/// preset, or dual-image composition ("virtual fitting").

use super::data::EncodedImage;

/// Fixed instruction used once both images of a composition are present
pub const COMPOSITION_INSTRUCTION: &str =
    "让第一张图片中的人物穿上第二张图片中的服装。保持第一张图片中人物的面部、发型、姿势和背景不变，使服装的版型、颜色和纹理与第二张图片一致，并自然贴合身体。";

/// The composition toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionMode {
    /// Single image, instruction typed or picked from a preset
    #[default]
    Text,
    /// Source image plus a reference image
    Image,
}

/// Instruction text + reference image, always in a consistent combination
///
/// Every method returns a new value; a reference image can only exist
/// while the composition mode is `Image`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptComposer {
    instruction: String,
    reference: Option<EncodedImage>,
    mode: CompositionMode,
}

impl PromptComposer {
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn reference(&self) -> Option<&EncodedImage> {
        self.reference.as_ref()
    }

    pub fn mode(&self) -> CompositionMode {
        self.mode
    }

    /// True when the instruction has something besides whitespace
    pub fn has_instruction(&self) -> bool {
        !self.instruction.trim().is_empty()
    }

    /// Free text typed by the user
    pub fn edited(&self, text: String) -> Self {
        Self {
            instruction: text,
            ..self.clone()
        }
    }

    /// A preset (general or hairstyle) was picked
    ///
    /// Presets are single-image, so any reference image is dropped even
    /// when the composition toggle still reads `Image`.
    pub fn with_fixed_instruction(&self, prompt: &str) -> Self {
        Self {
            instruction: prompt.to_string(),
            reference: None,
            mode: self.mode,
        }
    }

    /// The composition toggle changed
    pub fn toggled(&self, mode: CompositionMode) -> Self {
        match mode {
            // Re-selecting text mode keeps whatever the user already typed
            CompositionMode::Text if self.mode == CompositionMode::Text => self.clone(),
            CompositionMode::Text => Self {
                instruction: String::new(),
                reference: None,
                mode,
            },
            CompositionMode::Image => {
                let instruction = if self.reference.is_some() {
                    COMPOSITION_INSTRUCTION.to_string()
                } else {
                    String::new()
                };
                Self {
                    instruction,
                    reference: self.reference.clone(),
                    mode,
                }
            }
        }
    }

    /// A reference image arrived; `None` when composition mode is off
    ///
    /// The fixed composition instruction is written only when the source
    /// image is already there.
    pub fn with_reference(&self, image: EncodedImage, has_source: bool) -> Option<Self> {
        if self.mode != CompositionMode::Image {
            return None;
        }

        let instruction = if has_source {
            COMPOSITION_INSTRUCTION.to_string()
        } else {
            self.instruction.clone()
        };

        Some(Self {
            instruction,
            reference: Some(image),
            mode: self.mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shirt() -> EncodedImage {
        EncodedImage::new(vec![9u8; 8], "image/png")
    }

    fn composing() -> PromptComposer {
        PromptComposer::default()
            .toggled(CompositionMode::Image)
            .with_reference(shirt(), true)
            .unwrap()
    }

    #[test]
    fn test_default_is_empty_text_mode() {
        let composer = PromptComposer::default();
        assert_eq!(composer.mode(), CompositionMode::Text);
        assert_eq!(composer.instruction(), "");
        assert!(composer.reference().is_none());
        assert!(!composer.has_instruction());
    }

    #[test]
    fn test_whitespace_is_not_an_instruction() {
        let composer = PromptComposer::default().edited("  \n\t ".to_string());
        assert!(!composer.has_instruction());
    }

    #[test]
    fn test_reference_fills_composition_instruction() {
        let composer = composing();
        assert_eq!(composer.instruction(), COMPOSITION_INSTRUCTION);
        assert!(composer.reference().is_some());
    }

    #[test]
    fn test_reference_without_source_leaves_instruction() {
        let composer = PromptComposer::default()
            .toggled(CompositionMode::Image)
            .with_reference(shirt(), false)
            .unwrap();
        assert_eq!(composer.instruction(), "");
        assert!(composer.reference().is_some());
    }

    #[test]
    fn test_reference_refused_in_text_mode() {
        assert!(PromptComposer::default().with_reference(shirt(), true).is_none());
    }

    #[test]
    fn test_preset_clears_reference() {
        let composer = composing().with_fixed_instruction("换个发型");
        assert_eq!(composer.instruction(), "换个发型");
        assert!(composer.reference().is_none());
    }

    #[test]
    fn test_toggle_to_text_clears_everything() {
        let composer = composing().toggled(CompositionMode::Text);
        assert_eq!(composer.mode(), CompositionMode::Text);
        assert_eq!(composer.instruction(), "");
        assert!(composer.reference().is_none());
    }

    #[test]
    fn test_toggle_back_without_reference_is_empty() {
        let composer = composing()
            .toggled(CompositionMode::Text)
            .edited("把天空变成晚霞".to_string())
            .toggled(CompositionMode::Image);
        assert_eq!(composer.instruction(), "");
        assert!(composer.reference().is_none());
    }

    #[test]
    fn test_toggle_image_with_reference_restores_instruction() {
        let composer = composing()
            .edited("随便改改".to_string())
            .toggled(CompositionMode::Image);
        assert_eq!(composer.instruction(), COMPOSITION_INSTRUCTION);
        assert!(composer.reference().is_some());
    }

    #[test]
    fn test_reselecting_text_keeps_typed_text() {
        let composer = PromptComposer::default()
            .edited("黑白风格".to_string())
            .toggled(CompositionMode::Text);
        assert_eq!(composer.instruction(), "黑白风格");
    }
}
