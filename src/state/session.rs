/// The editing session state machine
///
/// `EditSession` is the single source of truth for the images, the
/// instruction and the progress of the current edit. It is never mutated
/// in place: `apply` takes a transition and returns the next session as a
/// whole, so the invariants hold after every step.

use tracing::{debug, warn};

use super::composer::{CompositionMode, PromptComposer};
use super::data::{EditRequest, EncodedImage};
use super::presets::{Preset, StylePreset};
use super::view_tab::{self, Pane};

/// Coarse lifecycle of an edit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Exactly one request is outstanding
    Editing,
    Succeeded,
    /// Carries the user-visible reason
    Failed(String),
}

/// Everything that can happen to a session
#[derive(Debug, Clone)]
pub enum Transition {
    /// A new source image was ingested (file picker or drop)
    SourceLoaded(EncodedImage),
    /// A picked or dropped file was not accepted
    UploadRejected(String),
    Reset,
    InstructionEdited(String),
    PresetSelected(&'static Preset),
    StyleSelected(&'static StylePreset),
    CompositionToggled(CompositionMode),
    ReferenceLoaded(EncodedImage),
    /// Also used to retry after a failure
    StartEdit,
    EditSucceeded(EncodedImage),
    EditFailed(String),
    PaneSelected(Pane),
}

impl Transition {
    fn name(&self) -> &'static str {
        match self {
            Transition::SourceLoaded(_) => "source-loaded",
            Transition::UploadRejected(_) => "upload-rejected",
            Transition::Reset => "reset",
            Transition::InstructionEdited(_) => "instruction-edited",
            Transition::PresetSelected(_) => "preset-selected",
            Transition::StyleSelected(_) => "style-selected",
            Transition::CompositionToggled(_) => "composition-toggled",
            Transition::ReferenceLoaded(_) => "reference-loaded",
            Transition::StartEdit => "start-edit",
            Transition::EditSucceeded(_) => "edit-succeeded",
            Transition::EditFailed(_) => "edit-failed",
            Transition::PaneSelected(_) => "pane-selected",
        }
    }
}

/// The single mutable aggregate of the application
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditSession {
    source: Option<EncodedImage>,
    prompt: PromptComposer,
    result: Option<EncodedImage>,
    phase: Phase,
    active_pane: Pane,
    /// Rejection message for the last picked/dropped file
    upload_error: Option<String>,
}

impl EditSession {
    /// Create the start-of-application session (idle, no images)
    pub fn new() -> Self {
        Self::default()
    }

    /// A brand new session around a freshly ingested image
    fn fresh(source: EncodedImage) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    pub fn source(&self) -> Option<&EncodedImage> {
        self.source.as_ref()
    }

    pub fn reference(&self) -> Option<&EncodedImage> {
        self.prompt.reference()
    }

    pub fn result(&self) -> Option<&EncodedImage> {
        self.result.as_ref()
    }

    pub fn instruction(&self) -> &str {
        self.prompt.instruction()
    }

    pub fn composition(&self) -> CompositionMode {
        self.prompt.mode()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn active_pane(&self) -> Pane {
        self.active_pane
    }

    pub fn is_editing(&self) -> bool {
        self.phase == Phase::Editing
    }

    /// Message to show next to the prompt controls, if any
    pub fn error_message(&self) -> Option<&str> {
        if let Some(message) = &self.upload_error {
            return Some(message);
        }
        match &self.phase {
            Phase::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Guard for `StartEdit`: source present, instruction not blank, nothing in flight
    pub fn can_start_edit(&self) -> bool {
        self.source.is_some() && self.prompt.has_instruction() && !self.is_editing()
    }

    /// The request to send while `Editing`
    pub fn edit_request(&self) -> Option<EditRequest> {
        if !self.is_editing() {
            return None;
        }
        Some(EditRequest {
            source: self.source.clone()?,
            reference: self.prompt.reference().cloned(),
            instruction: self.prompt.instruction().to_string(),
        })
    }

    /// Apply a transition and return the next session
    ///
    /// A refused transition yields an unchanged copy.
    pub fn apply(&self, transition: Transition) -> EditSession {
        let Some(mut next) = self.step(&transition) else {
            debug!(transition = transition.name(), phase = ?self.phase, "transition refused");
            return self.clone();
        };

        let result_arrived = self.result.is_none() && next.result.is_some();
        next.active_pane = view_tab::next_pane(self.active_pane, &transition, result_arrived);

        debug!(
            transition = transition.name(),
            from = ?self.phase,
            to = ?next.phase,
            pane = ?next.active_pane,
            "transition applied"
        );
        next
    }

    /// The session-field part of a transition; `None` when refused
    fn step(&self, transition: &Transition) -> Option<EditSession> {
        match transition {
            Transition::SourceLoaded(image) => {
                if self.is_editing() {
                    return None;
                }
                Some(Self::fresh(image.clone()))
            }
            Transition::UploadRejected(message) => Some(Self {
                upload_error: Some(message.clone()),
                ..self.clone()
            }),
            Transition::Reset => {
                if self.is_editing() {
                    return None;
                }
                Some(Self::new())
            }
            Transition::InstructionEdited(text) => {
                self.composed(self.prompt.edited(text.clone()))
            }
            Transition::PresetSelected(preset) => {
                self.composed(self.prompt.with_fixed_instruction(preset.prompt))
            }
            Transition::StyleSelected(style) => {
                self.composed(self.prompt.with_fixed_instruction(style.prompt))
            }
            Transition::CompositionToggled(mode) => self.composed(self.prompt.toggled(*mode)),
            Transition::ReferenceLoaded(image) => {
                let prompt = self
                    .prompt
                    .with_reference(image.clone(), self.source.is_some())?;
                let next = self.composed(prompt)?;
                Some(Self {
                    upload_error: None,
                    ..next
                })
            }
            Transition::StartEdit => {
                if !self.can_start_edit() {
                    return None;
                }
                Some(Self {
                    result: None,
                    phase: Phase::Editing,
                    upload_error: None,
                    ..self.clone()
                })
            }
            Transition::EditSucceeded(image) => {
                if !self.is_editing() {
                    warn!("edit result arrived outside of an edit, ignoring");
                    return None;
                }
                // The outcome supersedes a file rejected mid-edit
                Some(Self {
                    result: Some(image.clone()),
                    phase: Phase::Succeeded,
                    upload_error: None,
                    ..self.clone()
                })
            }
            Transition::EditFailed(reason) => {
                if !self.is_editing() {
                    warn!("edit failure arrived outside of an edit, ignoring");
                    return None;
                }
                Some(Self {
                    result: None,
                    phase: Phase::Failed(reason.clone()),
                    upload_error: None,
                    ..self.clone()
                })
            }
            Transition::PaneSelected(_) => Some(self.clone()),
        }
    }

    /// Swap in a new prompt state; prompt inputs are frozen while editing
    fn composed(&self, prompt: PromptComposer) -> Option<EditSession> {
        if self.is_editing() {
            return None;
        }

        Some(Self {
            prompt,
            ..self.clone()
        })
    }
}
