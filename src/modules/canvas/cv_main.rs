use eframe::egui;
use image::{Rgba, RgbaImage};
use crate::modules::raster::{self, BACKGROUND};

/// Both the inline canvas and the enlarged dialog erase back to the canvas background.
pub const ERASER_COLOR: Rgba<u8> = BACKGROUND;

pub const BRUSH_SIZE_MIN: u32 = 1;
pub const BRUSH_SIZE_MAX: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushState { pub color: Rgba<u8>, pub size: u32, pub eraser: bool }

impl BrushState {
    pub const INLINE: Self = Self { color: Rgba([0, 0, 0, 255]), size: 2, eraser: false };
    pub const DIALOG: Self = Self { color: Rgba([0, 0, 0, 255]), size: 5, eraser: false };

    pub fn paint_color(&self) -> Rgba<u8> { if self.eraser { ERASER_COLOR } else { self.color } }

    pub fn to_egui(&self) -> egui::Color32 {
        let [r, g, b, a] = self.color.0;
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }
    pub fn rgb(&self) -> [u8; 3] {
        let [r, g, b, _] = self.color.0;
        [r, g, b]
    }
    pub fn set_rgb(&mut self, [r, g, b]: [u8; 3]) { self.color = Rgba([r, g, b, 255]); }

    /// `Color32` is premultiplied; the brush keeps the straight color at full opacity.
    pub fn set_from_egui(&mut self, c: egui::Color32) {
        let [r, g, b, _] = c.to_srgba_unmultiplied();
        self.set_rgb([r, g, b]);
    }
}

impl Default for BrushState {
    fn default() -> Self { Self::INLINE }
}

pub struct Canvas {
    pub(super) image: RgbaImage,
    pub(super) brush: BrushState,
    pub(super) last_pos: Option<(f32, f32)>,
    pub(super) display_size: (u32, u32),
    pub(super) texture: Option<egui::TextureHandle>,
    pub(super) texture_dirty: bool,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self { Self::from_image(raster::blank(width, height)) }

    pub fn from_image(image: RgbaImage) -> Self {
        let display_size: (u32, u32) = image.dimensions();
        Self {
            image, brush: BrushState::default(), last_pos: None,
            display_size, texture: None, texture_dirty: true,
        }
    }

    pub fn with_brush(mut self, brush: BrushState) -> Self { self.brush = brush; self }

    pub fn brush(&self) -> BrushState { self.brush }
    pub fn set_brush(&mut self, brush: BrushState) { self.brush = brush; }
    pub fn set_brush_size(&mut self, size: u32) { self.brush.size = size.clamp(BRUSH_SIZE_MIN, BRUSH_SIZE_MAX); }
    pub fn set_eraser(&mut self, eraser: bool) { self.brush.eraser = eraser; }

    pub fn image(&self) -> &RgbaImage { &self.image }

    /// Detached copy of the raster.
    pub fn get_image(&self) -> RgbaImage { self.image.clone() }

    pub fn replace_image(&mut self, image: RgbaImage) {
        self.image = image;
        self.last_pos = None;
        self.texture_dirty = true;
    }

    pub fn display_size(&self) -> (u32, u32) { self.display_size }
    pub fn set_display_size(&mut self, width: u32, height: u32) { self.display_size = (width, height); }

    pub fn is_drawing(&self) -> bool { self.last_pos.is_some() }

    pub fn pointer_pressed(&mut self, pos: (f32, f32)) {
        self.last_pos = Some(pos);
        self.draw_point(pos);
    }

    pub fn pointer_moved(&mut self, pos: (f32, f32)) {
        if let Some(last) = self.last_pos {
            self.draw_line(last, pos);
            self.last_pos = Some(pos);
        }
    }

    pub fn pointer_released(&mut self) { self.last_pos = None; }
}
