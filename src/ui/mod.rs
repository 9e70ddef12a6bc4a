/// View helpers
///
/// - `controls.rs` - sidebar with upload and prompt controls
/// - `panes.rs` - source/result panes and the narrow-layout tab bar
/// - `preview.rs` - image handle cache

pub mod controls;
pub mod panes;
pub mod preview;
