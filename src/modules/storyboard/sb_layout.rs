pub const MARGIN_WIDTH: u32 = 20;
pub const MARGIN_HEIGHT: u32 = 40;
pub const FALLBACK_VIEWPORT: (u32, u32) = (800, 600);

const INDEX_COLUMN_SHARE: f64 = 0.07;
const DESCRIPTION_SHARE: f64 = 0.7;
const STORYBOARD_ASPECT: f64 = 16.0 / 9.0;

/// Row height and the four column widths: index, storyboard, description, duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridGeometry { pub row_height: u32, pub column_widths: [u32; 4] }

impl GridGeometry {
    pub fn compute(viewport_width: u32, viewport_height: u32, rows: usize) -> Self {
        let viewport_width: u32 = if viewport_width == 0 { FALLBACK_VIEWPORT.0 } else { viewport_width };
        let viewport_height: u32 = if viewport_height == 0 { FALLBACK_VIEWPORT.1 } else { viewport_height };

        let total_width: u32 = viewport_width.saturating_sub(MARGIN_WIDTH);
        let total_height: u32 = viewport_height.saturating_sub(MARGIN_HEIGHT);
        let row_height: u32 = total_height / rows.max(1) as u32;

        let col1_width: u32 = (total_width as f64 * INDEX_COLUMN_SHARE) as u32;
        let storyboard_width: u32 = ((STORYBOARD_ASPECT * row_height as f64) as u32).min(total_width - col1_width);

        let rest_width: u32 = total_width - (col1_width + storyboard_width);
        let col3_width: u32 = (rest_width as f64 * DESCRIPTION_SHARE) as u32;
        let col4_width: u32 = rest_width - col3_width;

        Self { row_height, column_widths: [col1_width, storyboard_width, col3_width, col4_width] }
    }

    pub fn storyboard_cell(&self) -> (u32, u32) { (self.column_widths[1], self.row_height) }

    pub fn total_width(&self) -> u32 { self.column_widths.iter().sum() }

    /// Left edge of each column relative to the grid origin.
    pub fn column_offsets(&self) -> [u32; 4] {
        let [a, b, c, _] = self.column_widths;
        [0, a, a + b, a + b + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_plus_margin_fill_viewport() {
        let geometry = GridGeometry::compute(1000, 640, 6);
        assert_eq!(geometry.row_height, 100);
        assert_eq!(geometry.column_widths, [68, 177, 514, 221]);
        assert_eq!(geometry.total_width() + MARGIN_WIDTH, 1000);
    }

    #[test]
    fn storyboard_never_exceeds_space_after_index_column() {
        for (w, h) in [(300, 2000), (120, 900), (1920, 1080), (21, 5000), (640, 41)] {
            let geometry = GridGeometry::compute(w, h, 6);
            let available: u32 = w - MARGIN_WIDTH;
            assert!(geometry.column_widths[1] <= available - geometry.column_widths[0], "{w}x{h}");
            assert_eq!(geometry.total_width() + MARGIN_WIDTH, w, "{w}x{h}");
        }
    }

    #[test]
    fn narrow_viewport_leaves_nothing_for_text_columns() {
        let geometry = GridGeometry::compute(300, 2000, 6);
        assert_eq!(geometry.column_widths, [19, 261, 0, 0]);
    }

    #[test]
    fn zero_viewport_uses_fallback() {
        let geometry = GridGeometry::compute(0, 0, 6);
        assert_eq!(geometry, GridGeometry::compute(800, 600, 6));
        assert_eq!(geometry.row_height, 93);
        assert_eq!(geometry.storyboard_cell(), (165, 93));
        assert_eq!(geometry.total_width() + MARGIN_WIDTH, 800);
    }

    #[test]
    fn viewport_smaller_than_margins_collapses_to_zero() {
        let geometry = GridGeometry::compute(10, 10, 6);
        assert_eq!(geometry, GridGeometry { row_height: 0, column_widths: [0, 0, 0, 0] });
    }

    #[test]
    fn offsets_follow_widths() {
        let geometry = GridGeometry::compute(1000, 640, 6);
        assert_eq!(geometry.column_offsets(), [0, 68, 245, 759]);
    }
}
