#![cfg_attr(all(target_os = "windows", not(debug_assertions)), windows_subsystem = "windows")]

use eframe::egui;
use storyboard_editor::StoryboardApp;

fn main() -> anyhow::Result<()> {
    storyboard_editor::init_logging()?;
    tracing::info!("Starting Storyboard Editor v{}", env!("CARGO_PKG_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Storyboard Editor"),
        ..Default::default()
    };
    eframe::run_native(
        "Storyboard Editor",
        options,
        Box::new(|cc| Ok(Box::new(StoryboardApp::new(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
