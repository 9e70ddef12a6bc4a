/// Which pane (source or result) is visible on narrow layouts
///
/// The pane is derived from the previous pane plus the transition that just
/// fired; it never looks at arbitrary field changes.

use super::session::Transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Source,
    Result,
}

/// Pane after an accepted transition
///
/// `result_arrived` is true when the transition took the result image
/// from absent to present. That always wins over a manual selection.
pub fn next_pane(current: Pane, transition: &Transition, result_arrived: bool) -> Pane {
    if result_arrived {
        return Pane::Result;
    }

    match transition {
        Transition::PaneSelected(pane) => *pane,
        // Show progress right away
        Transition::StartEdit => Pane::Result,
        // Back to the inputs so they can be corrected
        Transition::EditFailed(_) => Pane::Source,
        Transition::SourceLoaded(_) | Transition::Reset => Pane::Source,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::EncodedImage;

    fn image() -> EncodedImage {
        EncodedImage::new(vec![1u8], "image/png")
    }

    #[test]
    fn test_manual_selection_is_honored() {
        assert_eq!(
            next_pane(Pane::Result, &Transition::PaneSelected(Pane::Source), false),
            Pane::Source
        );
        assert_eq!(
            next_pane(Pane::Source, &Transition::PaneSelected(Pane::Result), false),
            Pane::Result
        );
    }

    #[test]
    fn test_result_arrival_wins() {
        assert_eq!(
            next_pane(Pane::Source, &Transition::EditSucceeded(image()), true),
            Pane::Result
        );
    }

    #[test]
    fn test_start_and_failure() {
        assert_eq!(next_pane(Pane::Source, &Transition::StartEdit, false), Pane::Result);
        assert_eq!(
            next_pane(Pane::Result, &Transition::EditFailed("quota exceeded".into()), false),
            Pane::Source
        );
    }

    #[test]
    fn test_prompt_changes_keep_pane() {
        let edited = Transition::InstructionEdited("更亮一些".into());
        assert_eq!(next_pane(Pane::Result, &edited, false), Pane::Result);
        assert_eq!(next_pane(Pane::Source, &edited, false), Pane::Source);
    }

    #[test]
    fn test_fresh_session_shows_source() {
        assert_eq!(next_pane(Pane::Result, &Transition::SourceLoaded(image()), false), Pane::Source);
        assert_eq!(next_pane(Pane::Result, &Transition::Reset, false), Pane::Source);
    }
}
