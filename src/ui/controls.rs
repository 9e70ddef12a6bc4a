/// Sidebar: upload zone, prompt composition and the generate button
use iced::widget::{button, column, container, row, scrollable, text, text_input, Column, Row};
use iced::{Alignment, Element, Length};

use crate::state::presets::{HAIRSTYLES, PRESETS};
use crate::state::{CompositionMode, EditSession};
use crate::ui::preview::PreviewCache;
use crate::Message;

/// Buttons per grid row
const PRESET_COLUMNS: usize = 2;
const HAIRSTYLE_COLUMNS: usize = 3;

pub fn sidebar<'a>(
    session: &'a EditSession,
    previews: &'a PreviewCache,
    drop_hover: bool,
) -> Element<'a, Message> {
    let content = if session.source().is_none() {
        upload_step(session, drop_hover)
    } else {
        settings_step(session, previews)
    };

    container(scrollable(container(content).padding(24)))
        .width(Length::Fixed(380.0))
        .height(Length::Fill)
        .into()
}

/// Step 1: nothing loaded yet
fn upload_step(session: &EditSession, drop_hover: bool) -> Column<'_, Message> {
    let zone = button(
        column![
            text("点击上传或拖拽图片至此").size(16),
            text("支持 JPG, PNG, WEBP").size(12),
        ]
        .spacing(6)
        .align_x(Alignment::Center)
        .width(Length::Fill),
    )
    .padding(32)
    .width(Length::Fill)
    .style(if drop_hover { button::primary } else { button::secondary })
    .on_press(Message::PickSource);

    let mut step = column![text("1  上传图片").size(18), zone].spacing(16);
    if let Some(message) = session.error_message() {
        step = step.push(text(message).size(13).style(text::danger));
    }
    step
}

/// Step 2: an image is loaded
fn settings_step<'a>(session: &'a EditSession, previews: &'a PreviewCache) -> Column<'a, Message> {
    let editing = session.is_editing();

    let header = row![
        text("2  编辑设置").size(18).width(Length::Fill),
        button(text("重新开始").size(12))
            .style(button::text)
            .on_press_maybe((!editing).then_some(Message::Reset)),
    ]
    .align_y(Alignment::Center);

    let mut step = column![header, composition_toggle(session)].spacing(18);

    if session.composition() == CompositionMode::Image {
        step = step.push(reference_picker(session, previews));
    }

    step = step
        .push(section("快捷指令", preset_grid(editing)))
        .push(section("发型", hairstyle_grid(editing)))
        .push(section(
            "自定义指令",
            text_input("描述你想如何修改这张图片...", session.instruction())
                .on_input_maybe((!editing).then_some(Message::InstructionChanged))
                .on_submit_maybe(session.can_start_edit().then_some(Message::Generate))
                .padding(10)
                .into(),
        ))
        .push(generate_button(session));

    if let Some(message) = session.error_message() {
        step = step.push(text(message).size(13).style(text::danger));
    }
    step
}

fn section<'a>(label: &'a str, body: Element<'a, Message>) -> Element<'a, Message> {
    column![text(label).size(12), body].spacing(8).into()
}

fn composition_toggle(session: &EditSession) -> Element<'_, Message> {
    let editing = session.is_editing();
    let option = |label: &'static str, mode: CompositionMode| {
        let style = if session.composition() == mode {
            button::primary
        } else {
            button::secondary
        };
        button(text(label).size(13).width(Length::Fill).align_x(Alignment::Center))
            .width(Length::Fill)
            .style(style)
            .on_press_maybe((!editing).then_some(Message::CompositionPicked(mode)))
    };

    row![
        option("文字指令", CompositionMode::Text),
        option("图片合成（虚拟试衣）", CompositionMode::Image),
    ]
    .spacing(8)
    .into()
}

fn reference_picker<'a>(session: &'a EditSession, previews: &'a PreviewCache) -> Element<'a, Message> {
    let label = if session.reference().is_some() {
        "更换参考图"
    } else {
        "上传参考图（服装）"
    };

    let picker = button(text(label).size(13))
        .style(button::secondary)
        .on_press_maybe((!session.is_editing()).then_some(Message::PickReference));

    let mut line = row![picker].spacing(12).align_y(Alignment::Center);
    match previews.reference() {
        Some(handle) => {
            line = line.push(iced::widget::image(handle.clone()).height(Length::Fixed(56.0)));
        }
        None => line = line.push(text("第二张图片将与原图合成").size(12)),
    }
    line.into()
}

fn preset_grid(editing: bool) -> Element<'static, Message> {
    let rows = PRESETS.chunks(PRESET_COLUMNS).map(|chunk| {
        let cells = chunk.iter().map(|preset| {
            button(
                column![text(preset.label).size(14), text(preset.description).size(10)].spacing(2),
            )
            .width(Length::Fill)
            .padding(10)
            .style(button::secondary)
            .on_press_maybe((!editing).then_some(Message::PresetPicked(preset.id)))
            .into()
        });
        Row::with_children(cells).spacing(8).into()
    });

    Column::with_children(rows).spacing(8).into()
}

fn hairstyle_grid(editing: bool) -> Element<'static, Message> {
    let rows = HAIRSTYLES.chunks(HAIRSTYLE_COLUMNS).map(|chunk| {
        let cells = chunk.iter().map(|style| {
            button(text(style.label).size(13).width(Length::Fill).align_x(Alignment::Center))
                .width(Length::Fill)
                .style(button::secondary)
                .on_press_maybe((!editing).then_some(Message::StylePicked(style)))
                .into()
        });
        Row::with_children(cells).spacing(8).into()
    });

    Column::with_children(rows).spacing(8).into()
}

fn generate_button(session: &EditSession) -> Element<'_, Message> {
    let label = if session.is_editing() {
        "处理中..."
    } else {
        "生成图像"
    };

    button(text(label).size(16).width(Length::Fill).align_x(Alignment::Center))
        .width(Length::Fill)
        .padding(14)
        .style(button::primary)
        .on_press_maybe(session.can_start_edit().then_some(Message::Generate))
        .into()
}
