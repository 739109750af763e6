use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use crate::error::{Result, StoryboardError};
use crate::modules::canvas::{BrushState, Canvas};
use crate::modules::drawing_dialog::DrawingDialog;
use crate::modules::duration::{DurationField, ShotDuration};
use crate::modules::raster::{self, Thumbnail};
use crate::project::ProjectContext;
use super::sb_layout::GridGeometry;

pub const FALLBACK_CELL: (u32, u32) = (150, 50);
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];
pub const HEADERS: [&str; 4] = ["#", "Storyboard", "Description", "Duration"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryboardMode { Upload, Draw }

/// What the storyboard column shows for one row.
pub enum StoryboardCell {
    Empty,
    Upload { thumbnail: Thumbnail, path: Option<PathBuf> },
    Drawing(Canvas),
}

pub struct RowEntry {
    pub(super) number: usize,
    pub(super) cell: StoryboardCell,
    pub(super) source_image: Option<RgbaImage>,
    pub(super) description: String,
    pub(super) duration: DurationField,
}

impl RowEntry {
    pub fn number(&self) -> usize { self.number }
    pub fn cell(&self) -> &StoryboardCell { &self.cell }
    pub fn source_image(&self) -> Option<&RgbaImage> { self.source_image.as_ref() }
    pub fn description(&self) -> &str { &self.description }
    pub fn duration(&self) -> &DurationField { &self.duration }

    pub fn canvas(&self) -> Option<&Canvas> {
        match &self.cell { StoryboardCell::Drawing(c) => Some(c), _ => None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTotal { pub page_number: usize, pub total: ShotDuration }

pub type TotalListener = Box<dyn FnMut(PageTotal)>;

pub(super) enum RowEvent { DurationChanged(usize) }

/// One page of the storyboard grid.
pub struct StoryboardPage {
    pub(super) page_number: usize,
    pub(super) start_number: usize,
    pub(super) fps: u32,
    pub(super) mode: StoryboardMode,
    pub(super) rows: Vec<RowEntry>,
    pub(super) geometry: GridGeometry,
    pub(super) viewport: (u32, u32),
    pub(super) active_dialog: Option<(usize, DrawingDialog)>,
    pub(super) row_rx: Receiver<RowEvent>,
    pub(super) total_listeners: Vec<TotalListener>,
}

impl StoryboardPage {
    pub fn new(page_number: usize, project: &ProjectContext) -> Self {
        let (row_tx, row_rx) = channel::<RowEvent>();
        let rows: Vec<RowEntry> = (0..project.rows_per_page)
            .map(|row| {
                let mut duration = DurationField::new(project.fps);
                let tx: Sender<RowEvent> = row_tx.clone();
                duration.on_value_changed(Box::new(move |_| { let _ = tx.send(RowEvent::DurationChanged(row)); }));
                RowEntry {
                    number: project.start_number(page_number) + row,
                    cell: StoryboardCell::Empty,
                    source_image: None,
                    description: String::new(),
                    duration,
                }
            })
            .collect();

        Self {
            page_number,
            start_number: project.start_number(page_number),
            fps: project.fps,
            mode: StoryboardMode::Upload,
            geometry: GridGeometry::compute(0, 0, project.rows_per_page),
            viewport: (0, 0),
            rows,
            active_dialog: None,
            row_rx,
            total_listeners: Vec::new(),
        }
    }

    pub fn page_number(&self) -> usize { self.page_number }
    pub fn start_number(&self) -> usize { self.start_number }
    pub fn mode(&self) -> StoryboardMode { self.mode }
    pub fn geometry(&self) -> GridGeometry { self.geometry }
    pub fn row_count(&self) -> usize { self.rows.len() }
    pub fn rows(&self) -> &[RowEntry] { &self.rows }
    pub fn row(&self, row: usize) -> Option<&RowEntry> { self.rows.get(row) }
    pub fn is_dialog_open(&self) -> bool { self.active_dialog.is_some() }
    pub fn dialog_mut(&mut self) -> Option<&mut DrawingDialog> { self.active_dialog.as_mut().map(|(_, d)| d) }

    pub(super) fn row_mut(&mut self, row: usize) -> Result<&mut RowEntry> {
        let rows: usize = self.rows.len();
        self.rows.get_mut(row).ok_or(StoryboardError::RowOutOfRange { row, rows })
    }

    pub fn duration_mut(&mut self, row: usize) -> Result<&mut DurationField> { Ok(&mut self.row_mut(row)?.duration) }

    pub fn set_description(&mut self, row: usize, text: &str) -> Result<()> {
        self.row_mut(row)?.description = text.to_string();
        Ok(())
    }

    /// Storyboard cell size, falling back to 150x50 before the first layout.
    pub fn cell_size(&self) -> (u32, u32) {
        let (w, h) = self.geometry.storyboard_cell();
        (if w == 0 { FALLBACK_CELL.0 } else { w }, if h == 0 { FALLBACK_CELL.1 } else { h })
    }

    pub fn update_geometry(&mut self, viewport_width: u32, viewport_height: u32) {
        if self.viewport == (viewport_width, viewport_height) { return; }
        self.viewport = (viewport_width, viewport_height);
        let previous_cell: (u32, u32) = self.cell_size();
        self.geometry = GridGeometry::compute(viewport_width, viewport_height, self.rows.len());
        let (w, h) = self.geometry.storyboard_cell();
        let (cell_w, cell_h) = self.cell_size();
        let cell_changed: bool = (cell_w, cell_h) != previous_cell;
        for row in self.rows.iter_mut() {
            match &mut row.cell {
                StoryboardCell::Drawing(canvas) => canvas.set_display_size(w, h),
                StoryboardCell::Upload { thumbnail, .. } if cell_changed => {
                    if let Some(image) = &row.source_image {
                        *thumbnail = Thumbnail::new(raster::scale_to_fit(image, cell_w, cell_h));
                    }
                }
                _ => {}
            }
        }
        tracing::trace!(page = self.page_number, geometry = ?self.geometry, "Recomputed grid geometry");
    }

    // --- UPLOAD ---

    pub fn handle_upload_clicked(&mut self, row: usize) -> Result<()> {
        if self.mode != StoryboardMode::Upload { return Ok(()); }
        let Some(path) = rfd::FileDialog::new()
            .set_title("Select Storyboard Image")
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return Ok(());
        };
        self.load_upload(row, &path)
    }

    pub fn load_upload(&mut self, row: usize, path: &Path) -> Result<()> {
        self.row_mut(row)?;
        let image: RgbaImage = image::open(path)
            .map_err(|source| StoryboardError::ImageDecode { path: path.to_path_buf(), source })?
            .to_rgba8();
        tracing::info!(page = self.page_number, row, "Loaded {} ({}x{})", path.display(), image.width(), image.height());
        self.set_uploaded_image(row, image, Some(path.to_path_buf()))
    }

    pub fn set_uploaded_image(&mut self, row: usize, image: RgbaImage, path: Option<PathBuf>) -> Result<()> {
        let (cell_w, cell_h) = self.cell_size();
        let entry: &mut RowEntry = self.row_mut(row)?;
        let thumbnail: Thumbnail = Thumbnail::new(raster::scale_to_fit(&image, cell_w, cell_h));
        entry.source_image = Some(image);
        entry.cell = StoryboardCell::Upload { thumbnail, path };
        Ok(())
    }

    // --- DRAW ---

    pub fn handle_storyboard_clicked(&mut self, row: usize) -> Result<()> {
        match self.mode {
            StoryboardMode::Draw => self.open_drawing_dialog(row),
            StoryboardMode::Upload => self.handle_upload_clicked(row),
        }
    }

    pub fn open_drawing_dialog(&mut self, row: usize) -> Result<()> {
        if self.mode != StoryboardMode::Draw || self.active_dialog.is_some() { return Ok(()); }
        let entry: &RowEntry = self.rows.get(row).ok_or(StoryboardError::RowOutOfRange { row, rows: self.rows.len() })?;
        let brush: BrushState = entry.canvas().map(|c| c.brush()).unwrap_or(BrushState::DIALOG);
        let dialog = DrawingDialog::new(entry.source_image.as_ref(), brush);
        tracing::debug!(page = self.page_number, row, "Opened drawing dialog");
        self.active_dialog = Some((row, dialog));
        Ok(())
    }

    pub fn accept_drawing(&mut self) -> Result<()> {
        let Some((row, dialog)) = self.active_dialog.take() else { return Ok(()); };
        let brush: BrushState = dialog.brush();
        self.apply_drawing(row, dialog.get_image(), brush)
    }

    pub fn cancel_drawing(&mut self) {
        if let Some((row, _)) = self.active_dialog.take() {
            tracing::debug!(page = self.page_number, row, "Drawing dialog cancelled");
        }
    }

    /// Stores an accepted drawing as the row's full-resolution image and refreshes the inline canvas.
    pub fn apply_drawing(&mut self, row: usize, image: RgbaImage, brush: BrushState) -> Result<()> {
        let (cell_w, cell_h) = self.cell_size();
        let entry: &mut RowEntry = self.row_mut(row)?;
        let thumbnail: RgbaImage = raster::resize_exact(&image, cell_w, cell_h);
        entry.source_image = Some(image);
        match &mut entry.cell {
            StoryboardCell::Drawing(canvas) => {
                canvas.replace_image(thumbnail);
                canvas.set_brush(brush);
                canvas.set_display_size(cell_w, cell_h);
            }
            cell => *cell = StoryboardCell::Drawing(Canvas::from_image(thumbnail).with_brush(brush)),
        }
        Ok(())
    }

    // --- MODES ---

    /// Every row becomes a canvas. Stored images are dropped, including uploads.
    pub fn switch_to_draw_mode(&mut self) {
        self.mode = StoryboardMode::Draw;
        let (cell_w, cell_h) = self.cell_size();
        for (idx, row) in self.rows.iter_mut().enumerate() {
            match &mut row.cell {
                StoryboardCell::Drawing(canvas) => canvas.set_display_size(cell_w, cell_h),
                cell => *cell = StoryboardCell::Drawing(Canvas::new(cell_w, cell_h)),
            }
            if row.source_image.take().is_some() {
                tracing::debug!(page = self.page_number, row = idx, "Dropped stored image on entering draw mode");
            }
        }
    }

    pub fn switch_to_upload_mode(&mut self) {
        self.mode = StoryboardMode::Upload;
        self.active_dialog = None;
        let (cell_w, cell_h) = self.cell_size();
        for row in self.rows.iter_mut() {
            let path: Option<PathBuf> = match std::mem::replace(&mut row.cell, StoryboardCell::Empty) {
                StoryboardCell::Upload { path, .. } => path,
                _ => None,
            };
            if let Some(image) = &row.source_image {
                let thumbnail: Thumbnail = Thumbnail::new(raster::scale_to_fit(image, cell_w, cell_h));
                row.cell = StoryboardCell::Upload { thumbnail, path };
            }
        }
    }

    // --- TOTALS ---

    pub fn page_total(&self) -> ShotDuration {
        ShotDuration::sum_normalized(self.rows.iter().map(|r| r.duration.get_duration()), self.fps)
    }

    pub fn on_total_changed(&mut self, listener: TotalListener) { self.total_listeners.push(listener); }

    /// Drains pending row events and notifies total listeners once if any duration changed.
    pub fn process_row_events(&mut self) -> Option<PageTotal> {
        let mut changed: bool = false;
        while let Ok(RowEvent::DurationChanged(row)) = self.row_rx.try_recv() {
            tracing::trace!(page = self.page_number, row, "Duration changed");
            changed = true;
        }
        if !changed { return None; }
        let total = PageTotal { page_number: self.page_number, total: self.page_total() };
        for listener in self.total_listeners.iter_mut() { listener(total); }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn page() -> StoryboardPage { StoryboardPage::new(1, &ProjectContext::default()) }

    fn photo(w: u32, h: u32) -> RgbaImage { ImageBuffer::from_pixel(w, h, Rgba([200, 40, 40, 255])) }

    #[test]
    fn rows_are_numbered_from_page_start() {
        let project = ProjectContext::default();
        let second = StoryboardPage::new(2, &project);
        assert_eq!(second.row_count(), 6);
        assert_eq!(second.start_number(), 7);
        let numbers: Vec<usize> = second.rows().iter().map(|r| r.number()).collect();
        assert_eq!(numbers, vec![7, 8, 9, 10, 11, 12]);
        assert!(second.rows().iter().all(|r| matches!(r.cell(), StoryboardCell::Empty)));
    }

    #[test]
    fn upload_stores_full_image_and_fitted_thumbnail() {
        let mut page = page();
        page.update_geometry(1000, 640);
        page.set_uploaded_image(0, photo(1920, 1080), Some(PathBuf::from("shot.png"))).unwrap();

        let row: &RowEntry = page.row(0).unwrap();
        assert_eq!(row.source_image().unwrap().dimensions(), (1920, 1080));
        match row.cell() {
            StoryboardCell::Upload { thumbnail, path } => {
                assert_eq!(thumbnail.image().dimensions(), (177, 99));
                assert_eq!(path.as_deref(), Some(Path::new("shot.png")));
            }
            _ => panic!("expected upload cell"),
        }
    }

    #[test]
    fn upload_replaces_existing_canvas() {
        let mut page = page();
        page.switch_to_draw_mode();
        page.apply_drawing(1, photo(800, 450), BrushState::DIALOG).unwrap();
        page.switch_to_upload_mode();
        page.set_uploaded_image(1, photo(64, 64), None).unwrap();
        assert!(page.row(1).unwrap().canvas().is_none());
        assert_eq!(page.row(1).unwrap().source_image().unwrap().dimensions(), (64, 64));
    }

    #[test]
    fn decode_failure_is_reported_and_row_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let mut page = page();
        let err = page.load_upload(0, &path).unwrap_err();
        assert!(matches!(err, StoryboardError::ImageDecode { .. }));
        assert!(page.row(0).unwrap().source_image().is_none());
        assert!(matches!(page.row(0).unwrap().cell(), StoryboardCell::Empty));
    }

    #[test]
    fn out_of_range_row_is_an_error() {
        let mut page = page();
        assert!(matches!(
            page.set_uploaded_image(6, photo(4, 4), None),
            Err(StoryboardError::RowOutOfRange { row: 6, rows: 6 })
        ));
    }

    #[test]
    fn draw_mode_discards_uploaded_images() {
        let mut page = page();
        page.set_uploaded_image(2, photo(320, 180), None).unwrap();
        page.switch_to_draw_mode();
        assert!(page.row(2).unwrap().source_image().is_none());
        assert!(page.rows().iter().all(|r| r.canvas().is_some()));

        page.switch_to_upload_mode();
        assert!(page.row(2).unwrap().source_image().is_none());
        assert!(matches!(page.row(2).unwrap().cell(), StoryboardCell::Empty));
    }

    #[test]
    fn upload_mode_round_trip_keeps_uploads() {
        let mut page = page();
        page.set_uploaded_image(2, photo(320, 180), Some(PathBuf::from("a.jpg"))).unwrap();
        page.switch_to_upload_mode();
        let row: &RowEntry = page.row(2).unwrap();
        assert!(row.source_image().is_some());
        assert!(matches!(row.cell(), StoryboardCell::Upload { path: Some(_), .. }));
    }

    #[test]
    fn upload_clicks_are_ignored_in_draw_mode() {
        let mut page = page();
        page.switch_to_draw_mode();
        page.handle_upload_clicked(0).unwrap();
        assert!(page.row(0).unwrap().canvas().is_some());
    }

    #[test]
    fn drawing_dialog_only_opens_in_draw_mode() {
        let mut page = page();
        page.open_drawing_dialog(0).unwrap();
        assert!(!page.is_dialog_open());
        page.switch_to_draw_mode();
        page.open_drawing_dialog(0).unwrap();
        assert!(page.is_dialog_open());
        assert_eq!(page.dialog_mut().unwrap().brush(), BrushState::INLINE);
    }

    #[test]
    fn accepted_drawing_becomes_source_and_thumbnail() {
        let mut page = page();
        page.switch_to_draw_mode();
        page.open_drawing_dialog(3).unwrap();
        let dialog: &mut DrawingDialog = page.dialog_mut().unwrap();
        dialog.set_brush_size(12);
        dialog.canvas_mut().pointer_pressed((400.0, 225.0));
        dialog.canvas_mut().pointer_released();
        page.accept_drawing().unwrap();

        let (cell_w, cell_h) = page.cell_size();
        let row: &RowEntry = page.row(3).unwrap();
        let source: &RgbaImage = row.source_image().unwrap();
        assert_eq!(source.dimensions(), (800, 450));
        assert_eq!(source.get_pixel(400, 225).0, [0, 0, 0, 255]);
        let canvas: &Canvas = row.canvas().unwrap();
        assert_eq!(canvas.image().dimensions(), (cell_w, cell_h));
        assert_eq!(canvas.brush().size, 12);
        assert!(!page.is_dialog_open());
    }

    #[test]
    fn reopening_seeds_dialog_with_previous_drawing() {
        let mut page = page();
        page.switch_to_draw_mode();
        let mut art: RgbaImage = photo(800, 450);
        art.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
        page.apply_drawing(0, art, BrushState { color: Rgba([9, 9, 9, 255]), size: 7, eraser: true }).unwrap();

        page.open_drawing_dialog(0).unwrap();
        let dialog: &mut DrawingDialog = page.dialog_mut().unwrap();
        assert_eq!(dialog.get_image().get_pixel(400, 225).0, [200, 40, 40, 255]);
        assert_eq!(dialog.brush(), BrushState { color: Rgba([9, 9, 9, 255]), size: 7, eraser: true });
    }

    #[test]
    fn cancelled_drawing_changes_nothing() {
        let mut page = page();
        page.switch_to_draw_mode();
        page.open_drawing_dialog(1).unwrap();
        page.dialog_mut().unwrap().canvas_mut().pointer_pressed((10.0, 10.0));
        page.cancel_drawing();
        let row: &RowEntry = page.row(1).unwrap();
        assert!(row.source_image().is_none());
        assert!(row.canvas().unwrap().image().pixels().all(|p| *p == raster::BACKGROUND));
    }

    #[test]
    fn resize_updates_canvas_display_size() {
        let mut page = page();
        page.switch_to_draw_mode();
        page.update_geometry(1000, 640);
        assert_eq!(page.row(0).unwrap().canvas().unwrap().display_size(), (177, 100));
    }

    #[test]
    fn description_is_free_text_and_survives_mode_switches() {
        let mut page = page();
        assert_eq!(page.row(3).unwrap().description(), "");
        page.set_description(3, "Wide shot, dusk.\nHero enters left").unwrap();
        page.switch_to_draw_mode();
        page.switch_to_upload_mode();
        assert_eq!(page.row(3).unwrap().description(), "Wide shot, dusk.\nHero enters left");
        assert_eq!(page.row(2).unwrap().description(), "");
        assert!(matches!(page.set_description(6, "x"), Err(StoryboardError::RowOutOfRange { row: 6, rows: 6 })));
    }

    #[test]
    fn resize_regenerates_upload_thumbnails_from_source() {
        let mut page = page();
        page.update_geometry(1000, 640);
        page.set_uploaded_image(1, photo(1920, 1080), None).unwrap();
        page.update_geometry(2000, 1280);

        assert_eq!(page.cell_size(), (366, 206));
        match page.row(1).unwrap().cell() {
            StoryboardCell::Upload { thumbnail, .. } => assert_eq!(thumbnail.image().dimensions(), (366, 205)),
            _ => panic!("expected upload cell"),
        }
        assert_eq!(page.row(1).unwrap().source_image().unwrap().dimensions(), (1920, 1080));
    }

    #[test]
    fn duration_edits_notify_page_total_listeners() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut page = page();
        let received: Rc<RefCell<Vec<PageTotal>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        page.on_total_changed(Box::new(move |t| sink.borrow_mut().push(t)));

        assert_eq!(page.process_row_events(), None);
        page.duration_mut(0).unwrap().set_seconds_text("10");
        page.duration_mut(0).unwrap().set_frames_text("20");
        page.duration_mut(4).unwrap().set_seconds_text("5");
        page.duration_mut(4).unwrap().set_frames_text("10");

        let total: PageTotal = page.process_row_events().unwrap();
        assert_eq!(total, PageTotal { page_number: 1, total: ShotDuration::new(16, 6) });
        assert_eq!(*received.borrow(), vec![total]);
        assert_eq!(page.process_row_events(), None);
    }
}
