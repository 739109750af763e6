pub mod canvas;
pub mod drawing_dialog;
pub mod duration;
pub mod raster;
pub mod storyboard;
