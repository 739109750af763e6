pub mod sb_layout;
pub mod sb_main;
mod sb_ui;

pub use sb_layout::GridGeometry;
pub use sb_main::{PageTotal, RowEntry, StoryboardCell, StoryboardMode, StoryboardPage, TotalListener};
