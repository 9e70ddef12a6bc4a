/// Source / result panes
///
/// Wide windows show both panes side by side. Narrow windows show a tab
/// bar and only the session's active pane.
use iced::widget::{button, center, column, container, image, progress_bar, row, text, Space};
use iced::{Alignment, ContentFit, Element, Length};

use crate::state::{EditSession, Pane, Phase};
use crate::ui::preview::PreviewCache;
use crate::Message;

/// Ticks per back-and-forth sweep of the progress bar
pub const PROGRESS_PERIOD: u32 = 50;

pub fn canvas_area<'a>(
    session: &'a EditSession,
    previews: &'a PreviewCache,
    narrow: bool,
    progress: f32,
    status: Option<&'a str>,
) -> Element<'a, Message> {
    let Some(source) = previews.source() else {
        return center(
            column![
                text("未选择图片").size(22),
                text("请从侧边栏上传图片以开始 AI 编辑。").size(14),
            ]
            .spacing(8)
            .align_x(Alignment::Center),
        )
        .into();
    };

    let source_view = source_pane(source);
    let result_view = result_pane(session, previews, progress, status);

    let panes: Element<'a, Message> = if narrow {
        let visible = match session.active_pane() {
            Pane::Source => source_view,
            Pane::Result => result_view,
        };
        column![tab_bar(session), visible].spacing(12).into()
    } else {
        row![source_view, result_view].spacing(16).into()
    };

    container(panes)
        .padding(16)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn tab_bar(session: &EditSession) -> Element<'_, Message> {
    let tab = |label: String, pane: Pane| {
        let style = if session.active_pane() == pane {
            button::primary
        } else {
            button::text
        };
        button(text(label).width(Length::Fill).align_x(Alignment::Center))
            .width(Length::Fill)
            .style(style)
            .on_press(Message::PaneSelected(pane))
    };

    // A dot marks a finished result
    let result_label = if session.result().is_some() {
        "效果图 ●".to_string()
    } else {
        "效果图".to_string()
    };

    row![tab("原图".to_string(), Pane::Source), tab(result_label, Pane::Result)]
        .spacing(4)
        .into()
}

fn framed<'a>(badge: Element<'a, Message>, body: Element<'a, Message>) -> Element<'a, Message> {
    container(column![badge, center(body)].spacing(8))
        .padding(12)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn source_pane(handle: &image::Handle) -> Element<'_, Message> {
    framed(
        text("原图").size(12).into(),
        image(handle.clone()).content_fit(ContentFit::Contain).into(),
    )
}

fn result_pane<'a>(
    session: &'a EditSession,
    previews: &'a PreviewCache,
    progress: f32,
    status: Option<&'a str>,
) -> Element<'a, Message> {
    let badge: Element<'a, Message> = match previews.result() {
        Some(_) => row![
            text("✦ 结果").size(12),
            Space::with_width(Length::Fill),
            button(text("下载").size(12))
                .style(button::secondary)
                .on_press(Message::Download),
        ]
        .align_y(Alignment::Center)
        .into(),
        None => text("预览 / 结果").size(12).into(),
    };

    let body: Element<'a, Message> = match (session.phase(), previews.result()) {
        (Phase::Editing, _) => column![
            text("AI 正在绘制...").size(16),
            progress_bar(0.0..=1.0, progress).height(Length::Fixed(6.0)).width(Length::Fixed(220.0)),
            text("请稍候，处理可能需要数十秒").size(12),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .into(),
        (Phase::Succeeded, Some(handle)) => image(handle.clone()).content_fit(ContentFit::Contain).into(),
        (Phase::Failed(_), _) => column![text("生成失败").size(14), text("可调整指令后重试").size(12)]
            .spacing(4)
            .align_x(Alignment::Center)
            .into(),
        _ => column![text("输入指令并点击生成").size(14), text("查看 AI 魔法效果").size(14)]
            .spacing(4)
            .align_x(Alignment::Center)
            .into(),
    };

    let pane = framed(badge, body);
    match status {
        Some(status) => column![pane, text(status).size(12)].spacing(6).into(),
        None => pane,
    }
}

/// Position of the indeterminate progress bar for a given animation tick
///
/// Sweeps 0 -> 1 -> 0 over `PROGRESS_PERIOD` ticks.
pub fn sweep(tick: u32) -> f32 {
    let half = PROGRESS_PERIOD / 2;
    let step = tick % PROGRESS_PERIOD;
    let rising = if step <= half { step } else { PROGRESS_PERIOD - step };
    rising as f32 / half as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_goes_there_and_back() {
        assert_eq!(sweep(0), 0.0);
        assert_eq!(sweep(PROGRESS_PERIOD / 2), 1.0);
        assert_eq!(sweep(PROGRESS_PERIOD), 0.0);
        assert_eq!(sweep(PROGRESS_PERIOD / 4), sweep(PROGRESS_PERIOD * 3 / 4));
        assert!((0..PROGRESS_PERIOD * 3).all(|tick| (0.0..=1.0).contains(&sweep(tick))));
    }
}
