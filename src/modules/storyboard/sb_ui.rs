use eframe::egui;
use crate::error::Result;
use crate::modules::drawing_dialog::DialogOutcome;
use crate::modules::raster;
use crate::style::{self, ThemeMode};
use super::sb_main::{StoryboardCell, StoryboardPage, HEADERS};

const HEADER_HEIGHT: f32 = 28.0;

impl StoryboardPage {
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Result<()> {
        let theme: ThemeMode = ThemeMode::from_visuals(ui.visuals());
        let viewport: egui::Vec2 = ui.available_size();
        self.update_geometry(viewport.x.max(0.0) as u32, viewport.y.max(0.0) as u32);

        let origin: egui::Pos2 = ui.available_rect_before_wrap().min;
        self.render_header(ui, origin, theme);

        let dialog_open: bool = self.active_dialog.is_some();
        let clicked_row: Option<usize> = ui.scope(|ui| {
            if dialog_open { ui.disable(); }
            self.render_rows(ui, origin + egui::vec2(0.0, HEADER_HEIGHT), theme)
        }).inner;

        if let Some(row) = clicked_row { self.handle_storyboard_clicked(row)?; }
        self.render_dialog(ui.ctx())?;
        self.process_row_events();
        Ok(())
    }

    fn column_rect(&self, top_left: egui::Pos2, row: usize, col: usize) -> egui::Rect {
        let offsets: [u32; 4] = self.geometry.column_offsets();
        let min: egui::Pos2 = top_left + egui::vec2(offsets[col] as f32, (row as u32 * self.geometry.row_height) as f32);
        egui::Rect::from_min_size(min, egui::vec2(self.geometry.column_widths[col] as f32, self.geometry.row_height as f32))
    }

    fn render_header(&self, ui: &mut egui::Ui, origin: egui::Pos2, theme: ThemeMode) {
        let (bg, text) = style::header_colors(theme);
        let painter: &egui::Painter = ui.painter();
        for (col, label) in HEADERS.iter().enumerate() {
            let cell: egui::Rect = self.column_rect(origin, 0, col);
            let rect: egui::Rect = egui::Rect::from_min_size(cell.min, egui::vec2(cell.width(), HEADER_HEIGHT));
            painter.rect_filled(rect, 0.0, bg);
            painter.text(rect.center(), egui::Align2::CENTER_CENTER, *label, egui::FontId::proportional(13.0), text);
        }
    }

    /// Returns the row whose storyboard cell was clicked.
    fn render_rows(&mut self, ui: &mut egui::Ui, top_left: egui::Pos2, theme: ThemeMode) -> Option<usize> {
        let grid_line: egui::Color32 = style::grid_line(theme);
        let rects: Vec<[egui::Rect; 4]> = (0..self.rows.len())
            .map(|row| [0, 1, 2, 3].map(|col| self.column_rect(top_left, row, col)))
            .collect();
        let mut clicked: Option<usize> = None;

        for (idx, (row, cells)) in self.rows.iter_mut().zip(rects).enumerate() {
            for cell in &cells {
                ui.painter().rect_stroke(*cell, 0.0, egui::Stroke::new(1.0, grid_line), egui::StrokeKind::Inside);
            }

            ui.painter().text(
                cells[0].center(), egui::Align2::CENTER_CENTER, row.number.to_string(),
                egui::FontId::proportional(14.0), ui.visuals().text_color(),
            );

            let response: egui::Response = match &mut row.cell {
                StoryboardCell::Empty => ui.put(cells[1].shrink(2.0), egui::Button::new("Upload Image")),
                StoryboardCell::Upload { thumbnail, path } => {
                    let size: egui::Vec2 = thumbnail.size();
                    let (w, h) = raster::fit_within(size.x as u32, size.y as u32, cells[1].width() as u32, cells[1].height() as u32);
                    let fitted: egui::Vec2 = egui::vec2(w as f32, h as f32);
                    let image = egui::Image::from_texture(egui::load::SizedTexture::new(thumbnail.texture_id(ui.ctx()), fitted));
                    let response: egui::Response = ui.put(cells[1], egui::Button::image(image).frame(false));
                    match path {
                        Some(p) => response.on_hover_text(p.display().to_string()),
                        None => response,
                    }
                }
                StoryboardCell::Drawing(canvas) => canvas.show_thumbnail(ui, cells[1]),
            };
            if response.clicked() { clicked = Some(idx); }

            ui.put(cells[2].shrink(2.0), egui::TextEdit::multiline(&mut row.description).hint_text(" "));
            row.duration.ui(ui, cells[3].shrink2(egui::vec2(6.0, 0.0)));
        }
        clicked
    }

    fn render_dialog(&mut self, ctx: &egui::Context) -> Result<()> {
        let Some((row, mut dialog)) = self.active_dialog.take() else { return Ok(()); };
        match dialog.show(ctx) {
            DialogOutcome::Open => { self.active_dialog = Some((row, dialog)); }
            DialogOutcome::Accepted(image) => {
                tracing::info!(page = self.page_number, row, "Drawing accepted");
                self.apply_drawing(row, image, dialog.brush())?;
            }
            DialogOutcome::Cancelled => {
                tracing::debug!(page = self.page_number, row, "Drawing dialog cancelled");
            }
        }
        Ok(())
    }
}
