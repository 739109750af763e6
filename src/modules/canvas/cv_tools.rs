use image::{Rgba, RgbaImage};
use super::cv_main::Canvas;

impl Canvas {
    /// Filled circle of radius `brush.size` centred on `pos`.
    pub fn draw_point(&mut self, pos: (f32, f32)) {
        let color: Rgba<u8> = self.brush.paint_color();
        stamp_segment(&mut self.image, pos, pos, self.brush.size as f32, color);
        self.texture_dirty = true;
    }

    /// Segment of width `2 * brush.size` with round ends.
    pub fn draw_line(&mut self, start: (f32, f32), end: (f32, f32)) {
        let color: Rgba<u8> = self.brush.paint_color();
        stamp_segment(&mut self.image, start, end, self.brush.size as f32, color);
        self.texture_dirty = true;
    }
}

/// Half-open pixel range covering `lo..=hi`, clipped to `0..limit`.
fn clipped_span(lo: f32, hi: f32, limit: u32) -> Option<(u32, u32)> {
    let start: f32 = lo.floor().max(0.0);
    let end: f32 = (hi.ceil() + 1.0).min(limit as f32);
    if start < end { Some((start as u32, end as u32)) } else { None }
}

/// Overwrites every pixel within `radius` of the segment. A zero-length segment is a disc.
pub(super) fn stamp_segment(buf: &mut RgbaImage, start: (f32, f32), end: (f32, f32), radius: f32, color: Rgba<u8>) {
    let (width, height) = buf.dimensions();
    let (x0, y0) = start;
    let (x1, y1) = end;
    let Some((min_x, max_x)) = clipped_span(x0.min(x1) - radius, x0.max(x1) + radius, width) else { return };
    let Some((min_y, max_y)) = clipped_span(y0.min(y1) - radius, y0.max(y1) + radius, height) else { return };

    let dx: f32 = x1 - x0; let dy: f32 = y1 - y0;
    let len_sq: f32 = dx * dx + dy * dy;
    let radius_sq: f32 = radius * radius;

    for py in min_y..max_y {
        let qy: f32 = py as f32;
        for px in min_x..max_x {
            let qx: f32 = px as f32;
            let t: f32 = if len_sq == 0.0 { 0.0 } else { (((qx - x0) * dx + (qy - y0) * dy) / len_sq).clamp(0.0, 1.0) };
            let (cx, cy) = (x0 + dx * t, y0 + dy * t);
            if (qx - cx).powi(2) + (qy - cy).powi(2) <= radius_sq {
                buf.put_pixel(px, py, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::canvas::{BrushState, ERASER_COLOR};
    use crate::modules::raster::BACKGROUND;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn painted(img: &RgbaImage) -> usize { img.pixels().filter(|p| **p != BACKGROUND).count() }

    #[test]
    fn point_fills_circle_of_brush_radius() {
        let mut canvas = Canvas::new(40, 40).with_brush(BrushState { color: RED, size: 5, eraser: false });
        canvas.draw_point((20.0, 20.0));
        let img: &RgbaImage = canvas.image();
        assert_eq!(*img.get_pixel(20, 20), RED);
        assert_eq!(*img.get_pixel(25, 20), RED);
        assert_eq!(*img.get_pixel(20, 15), RED);
        assert_eq!(*img.get_pixel(24, 24), BACKGROUND);
        assert_eq!(*img.get_pixel(26, 20), BACKGROUND);
    }

    #[test]
    fn line_width_is_twice_brush_size() {
        let mut canvas = Canvas::new(60, 40).with_brush(BrushState { color: RED, size: 3, eraser: false });
        canvas.draw_line((10.0, 20.0), (50.0, 20.0));
        let img: &RgbaImage = canvas.image();
        for y in 17..=23 { assert_eq!(*img.get_pixel(30, y), RED, "row {y}"); }
        assert_eq!(*img.get_pixel(30, 16), BACKGROUND);
        assert_eq!(*img.get_pixel(30, 24), BACKGROUND);
    }

    #[test]
    fn eraser_restores_background() {
        let mut canvas = Canvas::new(30, 30).with_brush(BrushState { color: RED, size: 4, eraser: false });
        canvas.draw_point((15.0, 15.0));
        canvas.set_eraser(true);
        canvas.draw_point((15.0, 15.0));
        assert_eq!(*canvas.image().get_pixel(15, 15), ERASER_COLOR);
        assert_eq!(painted(canvas.image()), 0);
    }

    #[test]
    fn strokes_off_canvas_are_clipped_not_wrapped() {
        let mut canvas = Canvas::new(32, 16).with_brush(BrushState { color: RED, size: 4, eraser: false });
        canvas.draw_point((-100.0, -100.0));
        canvas.draw_point((500.0, 8.0));
        assert_eq!(painted(canvas.image()), 0);

        canvas.draw_line((-10.0, 8.0), (2.0, 8.0));
        let img: &RgbaImage = canvas.image();
        assert_eq!(img.dimensions(), (32, 16));
        assert_eq!(*img.get_pixel(0, 8), RED);
        assert_eq!(*img.get_pixel(31, 8), BACKGROUND);
    }

    #[test]
    fn mixed_sequence_never_changes_dimensions() {
        let mut canvas = Canvas::new(25, 17).with_brush(BrushState { color: RED, size: 30, eraser: false });
        let points: [(f32, f32); 6] = [(0.0, 0.0), (24.0, 16.0), (-3.0, 40.0), (12.5, -8.0), (f32::MAX, 1.0), (5.0, 5.0)];
        canvas.pointer_pressed(points[0]);
        for p in &points[1..] { canvas.pointer_moved(*p); }
        canvas.pointer_released();
        canvas.draw_point((f32::MIN, f32::MIN));
        assert_eq!(canvas.image().dimensions(), (25, 17));
    }

    #[test]
    fn clipped_span_handles_ranges_outside_limit() {
        assert_eq!(clipped_span(-5.0, 3.0, 10), Some((0, 4)));
        assert_eq!(clipped_span(8.0, 40.0, 10), Some((8, 10)));
        assert_eq!(clipped_span(12.0, 40.0, 10), None);
        assert_eq!(clipped_span(-20.0, -2.0, 10), None);
    }
}
