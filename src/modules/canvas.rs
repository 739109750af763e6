pub mod cv_main;
mod cv_tools;
mod cv_ui;

pub use cv_main::{BrushState, Canvas, ERASER_COLOR};
