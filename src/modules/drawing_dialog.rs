use eframe::egui;
use image::RgbaImage;
use crate::modules::canvas::{BrushState, Canvas};
use crate::modules::canvas::cv_main::{BRUSH_SIZE_MAX, BRUSH_SIZE_MIN};
use crate::modules::raster;
use crate::style::{self, ModalColors, ThemeMode};

pub const DIALOG_CANVAS_WIDTH: u32 = 800;
pub const DIALOG_CANVAS_HEIGHT: u32 = 450;

pub enum DialogOutcome { Open, Accepted(RgbaImage), Cancelled }

/// Modal 800x450 editor for one storyboard cell.
pub struct DrawingDialog {
    canvas: Canvas,
}

impl DrawingDialog {
    pub fn new(seed: Option<&RgbaImage>, brush: BrushState) -> Self {
        let image: RgbaImage = match seed {
            Some(img) => raster::resize_exact(img, DIALOG_CANVAS_WIDTH, DIALOG_CANVAS_HEIGHT),
            None => raster::blank(DIALOG_CANVAS_WIDTH, DIALOG_CANVAS_HEIGHT),
        };
        Self { canvas: Canvas::from_image(image).with_brush(brush) }
    }

    pub fn brush(&self) -> BrushState { self.canvas.brush() }
    pub fn canvas(&self) -> &Canvas { &self.canvas }
    pub fn canvas_mut(&mut self) -> &mut Canvas { &mut self.canvas }

    pub fn set_brush_color(&mut self, color: egui::Color32) {
        let mut brush: BrushState = self.canvas.brush();
        brush.set_from_egui(color);
        self.canvas.set_brush(brush);
    }
    pub fn set_brush_rgb(&mut self, rgb: [u8; 3]) {
        let mut brush: BrushState = self.canvas.brush();
        brush.set_rgb(rgb);
        self.canvas.set_brush(brush);
    }
    pub fn set_brush_size(&mut self, size: u32) { self.canvas.set_brush_size(size); }
    pub fn set_eraser(&mut self, eraser: bool) { self.canvas.set_eraser(eraser); }

    pub fn get_image(&self) -> RgbaImage { self.canvas.get_image() }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogOutcome {
        let theme: ThemeMode = ThemeMode::from_visuals(&ctx.style().visuals);
        let colors: ModalColors = style::modal_colors(theme);
        style::modal_overlay(ctx, "drawing_dialog_overlay");

        let mut open: bool = true;
        let mut confirmed: bool = false;
        let mut cancelled: bool = false;

        egui::Window::new("Storyboard Canvas")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .frame(egui::Frame::new().fill(colors.bg).stroke(egui::Stroke::new(1.0, colors.border)).corner_radius(8.0).inner_margin(16.0))
            .open(&mut open)
            .order(egui::Order::Tooltip)
            .show(ctx, |ui| {
                self.canvas.show_editor(ui);
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    let mut rgb: [u8; 3] = self.canvas.brush().rgb();
                    ui.label(egui::RichText::new("Brush Color").size(12.0).color(colors.muted));
                    if ui.color_edit_button_srgb(&mut rgb).changed() { self.set_brush_rgb(rgb); }
                    ui.separator();

                    let mut size: u32 = self.canvas.brush().size;
                    ui.label(egui::RichText::new("Brush Size").size(12.0).color(colors.muted));
                    if ui.add(egui::Slider::new(&mut size, BRUSH_SIZE_MIN..=BRUSH_SIZE_MAX)).changed() { self.set_brush_size(size); }
                    ui.separator();

                    let mut eraser: bool = self.canvas.brush().eraser;
                    if ui.checkbox(&mut eraser, "Eraser").changed() { self.set_eraser(eraser); }
                });
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = 12.0;
                    cancelled = style::secondary_button(ui, "Cancel", theme).clicked();
                    confirmed = style::primary_button(ui, "Confirm").clicked();
                });
            });

        if confirmed {
            DialogOutcome::Accepted(self.canvas.get_image())
        } else if cancelled || !open {
            DialogOutcome::Cancelled
        } else {
            DialogOutcome::Open
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    #[test]
    fn blank_dialog_is_white_at_fixed_size() {
        let dialog = DrawingDialog::new(None, BrushState::DIALOG);
        assert_eq!(dialog.get_image().dimensions(), (DIALOG_CANVAS_WIDTH, DIALOG_CANVAS_HEIGHT));
        assert_eq!(dialog.get_image().get_pixel(400, 225).0, [255, 255, 255, 255]);
        assert_eq!(dialog.brush().size, 5);
    }

    #[test]
    fn seed_is_scaled_to_canvas_size() {
        let seed: RgbaImage = ImageBuffer::from_pixel(160, 90, Rgba([0, 128, 255, 255]));
        let dialog = DrawingDialog::new(Some(&seed), BrushState::DIALOG);
        let img: RgbaImage = dialog.get_image();
        assert_eq!(img.dimensions(), (800, 450));
        assert_eq!(img.get_pixel(400, 225).0, [0, 128, 255, 255]);
        assert_eq!(seed.dimensions(), (160, 90));
    }

    #[test]
    fn toolbar_setters_apply_immediately() {
        let mut dialog = DrawingDialog::new(None, BrushState::DIALOG);
        dialog.set_brush_color(egui::Color32::from_rgb(255, 0, 0));
        dialog.set_brush_size(42);
        dialog.set_eraser(true);
        let brush: BrushState = dialog.brush();
        assert_eq!(brush.color.0, [255, 0, 0, 255]);
        dialog.set_brush_rgb([10, 200, 30]);
        assert_eq!(dialog.brush().rgb(), [10, 200, 30]);
        assert_eq!(brush.size, 30);
        assert!(brush.eraser);
    }

    #[test]
    fn strokes_land_on_the_dialog_canvas() {
        let mut dialog = DrawingDialog::new(None, BrushState::DIALOG);
        dialog.canvas_mut().pointer_pressed((100.0, 100.0));
        dialog.canvas_mut().pointer_moved((200.0, 100.0));
        dialog.canvas_mut().pointer_released();
        assert_eq!(dialog.get_image().get_pixel(150, 100).0, [0, 0, 0, 255]);
        assert!(!dialog.canvas().is_drawing());
    }
}
