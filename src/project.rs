use crate::error::{Result, StoryboardError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FPS: u32 = 24;
pub const ROWS_PER_PAGE: usize = 6;
pub const COLS: usize = 4;
pub const TOTAL_PAGES: usize = 20;

pub const FPS_RANGE: (usize, usize) = (1, 240);
pub const ROWS_PER_PAGE_RANGE: (usize, usize) = (1, 24);
pub const TOTAL_PAGES_RANGE: (usize, usize) = (1, 200);

fn check_range(name: &'static str, value: u64, (min, max): (usize, usize)) -> Result<()> {
    if value < min as u64 || value > max as u64 {
        return Err(StoryboardError::InvalidSetting { name, value });
    }
    Ok(())
}

/// Per-project settings threaded into every page and duration control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    pub fps: u32,
    pub rows_per_page: usize,
    pub cols: usize,
    pub total_pages: usize,
}

impl Default for ProjectContext {
    fn default() -> Self {
        Self { fps: DEFAULT_FPS, rows_per_page: ROWS_PER_PAGE, cols: COLS, total_pages: TOTAL_PAGES }
    }
}

impl ProjectContext {
    pub fn reset_defaults(&mut self) { *self = Self::default(); }

    pub fn validate(&self) -> Result<()> {
        check_range("fps", self.fps as u64, FPS_RANGE)?;
        check_range("rows_per_page", self.rows_per_page as u64, ROWS_PER_PAGE_RANGE)?;
        check_range("cols", self.cols as u64, (COLS, COLS))?;
        check_range("total_pages", self.total_pages as u64, TOTAL_PAGES_RANGE)
    }

    /// First display number on `page_number` (1-based).
    pub fn start_number(&self, page_number: usize) -> usize {
        page_number.saturating_sub(1) * self.rows_per_page + 1
    }

    pub fn load() -> Self {
        let config_path: PathBuf = Self::get_config_path();
        match Self::load_from(&config_path) {
            Ok(ctx) => ctx,
            Err(StoryboardError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!("Ignoring project settings at {}: {}", config_path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Err(e) = self.save_to(&Self::get_config_path()) {
            tracing::error!("Failed to save project settings: {}", e);
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents: String = fs::read_to_string(path)?;
        let ctx: ProjectContext = serde_json::from_str(&contents)?;
        ctx.validate()?;
        Ok(ctx)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() { fs::create_dir_all(parent)?; }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!("Saved project settings to {}", path.display());
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        let mut path: PathBuf = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("storyboard_editor");
        path.push("project.json");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_defaults() {
        let mut ctx = ProjectContext { fps: 30, rows_per_page: 3, cols: 4, total_pages: 2 };
        ctx.reset_defaults();
        assert_eq!(ctx, ProjectContext::default());
        assert_eq!(ctx.fps, 24);
        assert_eq!(ctx.rows_per_page, 6);
        assert_eq!(ctx.total_pages, 20);
    }

    #[test]
    fn start_number_is_page_relative() {
        let ctx = ProjectContext::default();
        assert_eq!(ctx.start_number(1), 1);
        assert_eq!(ctx.start_number(3), 13);
    }

    #[test]
    fn validate_enforces_bounds_and_four_columns() {
        let zero_fps = ProjectContext { fps: 0, ..Default::default() };
        assert!(matches!(zero_fps.validate(), Err(StoryboardError::InvalidSetting { name: "fps", .. })));
        let five_cols = ProjectContext { cols: 5, ..Default::default() };
        assert!(matches!(five_cols.validate(), Err(StoryboardError::InvalidSetting { name: "cols", value: 5 })));
        assert!(ProjectContext::default().validate().is_ok());
        let too_many_pages = ProjectContext { total_pages: 201, ..Default::default() };
        assert!(matches!(too_many_pages.validate(), Err(StoryboardError::InvalidSetting { name: "total_pages", value: 201 })));
        let fast = ProjectContext { fps: 241, ..Default::default() };
        assert!(matches!(fast.validate(), Err(StoryboardError::InvalidSetting { name: "fps", value: 241 })));
        let widest = ProjectContext { fps: 240, rows_per_page: 24, total_pages: 200, ..Default::default() };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn settings_round_trip_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("project.json");
        let ctx = ProjectContext { fps: 25, rows_per_page: 8, cols: 4, total_pages: 5 };
        ctx.save_to(&path).unwrap();
        assert_eq!(ProjectContext::load_from(&path).unwrap(), ctx);
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");
        fs::write(&path, r#"{"fps":0,"rows_per_page":6,"cols":4,"total_pages":20}"#).unwrap();
        assert!(matches!(ProjectContext::load_from(&path), Err(StoryboardError::InvalidSetting { .. })));
        fs::write(&path, r#"{"fps":24,"rows_per_page":1000000000,"cols":4,"total_pages":1000000}"#).unwrap();
        assert!(matches!(
            ProjectContext::load_from(&path),
            Err(StoryboardError::InvalidSetting { name: "rows_per_page", value: 1_000_000_000 })
        ));
        fs::write(&path, "not json").unwrap();
        assert!(matches!(ProjectContext::load_from(&path), Err(StoryboardError::Settings(_))));
    }
}
