/// State management module
///
/// This module handles all editing-session state, including:
/// - Encoded images and the edit request snapshot (data.rs)
/// - File ingestion for picker and drag-and-drop (ingest.rs)
/// - Preset and hairstyle catalogs (presets.rs)
/// - Instruction / reference image composition (composer.rs)
/// - The session state machine (session.rs)
/// - Source/result pane selection (view_tab.rs)

pub mod composer;
pub mod data;
pub mod ingest;
pub mod presets;
pub mod session;
pub mod view_tab;

pub use composer::CompositionMode;
pub use data::{EditRequest, EncodedImage};
pub use session::{EditSession, Phase, Transition};
pub use view_tab::Pane;
