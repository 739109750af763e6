use eframe::egui;
use crate::modules::raster::to_color_image;
use crate::style::ColorPalette;
use super::cv_main::Canvas;

impl Canvas {
    pub(super) fn ensure_texture(&mut self, ctx: &egui::Context) -> egui::TextureId {
        if self.texture_dirty || self.texture.is_none() {
            let color_image: egui::ColorImage = to_color_image(&self.image);
            if let Some(texture) = self.texture.as_mut() {
                texture.set(color_image, egui::TextureOptions::LINEAR);
            } else {
                self.texture = Some(ctx.load_texture("storyboard_canvas", color_image, egui::TextureOptions::LINEAR));
            }
            self.texture_dirty = false;
        }
        self.texture.as_ref().map(|t: &egui::TextureHandle| t.id()).unwrap_or_default()
    }

    pub fn paint(&mut self, ui: &egui::Ui, rect: egui::Rect) {
        let tex: egui::TextureId = self.ensure_texture(ui.ctx());
        let uv: egui::Rect = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        ui.painter_at(rect).image(tex, rect, uv, egui::Color32::WHITE);
    }

    /// Inline cell: painted at the display size, clicks are reported to the caller.
    pub fn show_thumbnail(&mut self, ui: &mut egui::Ui, rect: egui::Rect) -> egui::Response {
        let (w, h) = self.display_size;
        let shown: egui::Rect = egui::Rect::from_min_size(rect.min, egui::vec2(w as f32, h as f32)).intersect(rect);
        let response: egui::Response = ui.allocate_rect(rect, egui::Sense::click());
        self.paint(ui, shown);
        if response.hovered() {
            ui.painter().rect_stroke(shown, 0.0, egui::Stroke::new(1.5, ColorPalette::BLUE_400), egui::StrokeKind::Inside);
        }
        response.on_hover_cursor(egui::CursorIcon::PointingHand)
    }

    /// Full-size editing surface driven by the pointer.
    pub fn show_editor(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let (w, h) = self.image.dimensions();
        let (rect, response) = ui.allocate_exact_size(egui::vec2(w as f32, h as f32), egui::Sense::click_and_drag());

        let primary_down: bool = ui.input(|i| i.pointer.primary_down());
        if response.is_pointer_button_down_on() && primary_down {
            if let Some(pos) = response.interact_pointer_pos() {
                let image_pos: (f32, f32) = screen_to_image(rect, (w, h), pos);
                if self.is_drawing() { self.pointer_moved(image_pos); } else { self.pointer_pressed(image_pos); }
            }
        } else if self.is_drawing() {
            self.pointer_released();
        }

        self.paint(ui, rect);
        ui.painter().rect_stroke(rect, 0.0, egui::Stroke::new(1.0, ColorPalette::ZINC_500), egui::StrokeKind::Outside);

        if let Some(mp) = response.hover_pos() {
            let scale: f32 = rect.width() / w.max(1) as f32;
            let ring: egui::Color32 = if self.brush.eraser { ColorPalette::RED_400 } else { self.brush.to_egui() };
            ui.painter_at(rect).circle_stroke(mp, self.brush.size as f32 * scale, egui::Stroke::new(1.5, ring));
        }
        response
    }
}

/// Maps a screen position into raster coordinates. Not clamped; strokes leaving the canvas are clipped by the rasterizer.
pub(super) fn screen_to_image(rect: egui::Rect, image_size: (u32, u32), pos: egui::Pos2) -> (f32, f32) {
    let sx: f32 = image_size.0 as f32 / rect.width().max(1.0);
    let sy: f32 = image_size.1 as f32 / rect.height().max(1.0);
    ((pos.x - rect.min.x) * sx, (pos.y - rect.min.y) * sy)
}
