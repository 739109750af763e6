//! Storyboard editor: paged shot lists with uploaded or hand-drawn frames and
//! per-shot durations in seconds plus frames.

pub mod app;
pub mod error;
pub mod modules;
pub mod project;
pub mod style;

pub use app::StoryboardApp;
pub use error::{Result, StoryboardError};
pub use modules::duration::ShotDuration;
pub use modules::storyboard::{PageTotal, StoryboardMode, StoryboardPage};
pub use project::ProjectContext;

/// Log file for the release Windows build, which runs without a console.
pub fn log_file_path() -> std::path::PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    path.push("storyboard_editor");
    path.push("storyboard_editor.log");
    path
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(all(target_os = "windows", not(debug_assertions)))]
    {
        use std::fs::{self, OpenOptions};

        let log_file = log_file_path();
        if let Some(parent) = log_file.parent() { fs::create_dir_all(parent)?; }
        let file = OpenOptions::new().create(true).append(true).open(&log_file)?;

        let fmt_layer = fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    }

    #[cfg(not(all(target_os = "windows", not(debug_assertions))))]
    {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    }

    tracing::debug!("Logging initialized");
    Ok(())
}
