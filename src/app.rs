use eframe::egui;
use crate::style::ColorPalette;
use super::style::{self, ModalColors, ThemeMode};
use super::error::{Result, StoryboardError};
use super::modules::duration::ShotDuration;
use super::modules::storyboard::{PageTotal, StoryboardMode, StoryboardPage};
use super::project::{ProjectContext, FPS_RANGE, ROWS_PER_PAGE_RANGE, TOTAL_PAGES_RANGE};
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::fs;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug, Default)]
pub enum ThemePreference { #[default] System, Light, Dark }

impl ThemePreference {
    pub fn resolve(self, system: ThemeMode) -> ThemeMode {
        match self {
            ThemePreference::System => system,
            ThemePreference::Light => ThemeMode::Light,
            ThemePreference::Dark => ThemeMode::Dark,
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
struct AppSettings { theme_preference: ThemePreference }

impl AppSettings {
    fn load() -> Self {
        let config_path = Self::get_config_path();
        let Ok(contents) = fs::read_to_string(&config_path) else { return Self::default(); };
        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring app settings at {}: {}", config_path.display(), e);
                Self::default()
            }
        }
    }

    fn save(&self) {
        let config_path = Self::get_config_path();
        if let Some(parent) = config_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::error!("Failed to create {}: {}", parent.display(), e);
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(&config_path, json) { tracing::error!("Failed to save app settings: {}", e); }
            }
            Err(e) => tracing::error!("Failed to serialize app settings: {}", e),
        }
    }

    fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("storyboard_editor");
        path.push("app_settings.json");
        path
    }
}

fn system_theme(ctx: &egui::Context) -> ThemeMode {
    match ctx.theme() {
        egui::Theme::Dark => ThemeMode::Dark,
        egui::Theme::Light => ThemeMode::Light,
    }
}

pub struct StoryboardApp {
    project: ProjectContext,
    pending_project: ProjectContext,
    pages: Vec<StoryboardPage>,
    current_page: usize,
    mode: StoryboardMode,
    page_totals: Vec<ShotDuration>,
    total_tx: Sender<PageTotal>,
    total_rx: Receiver<PageTotal>,
    theme_mode: ThemeMode,
    theme_preference: ThemePreference,
    show_settings: bool,
    settings_error: Option<String>,
    error_message: Option<String>,
}

impl StoryboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let theme_mode: ThemeMode = settings.theme_preference.resolve(system_theme(&cc.egui_ctx));
        style::apply_theme(&cc.egui_ctx, theme_mode);

        let mut app = Self::with_project(ProjectContext::load());
        app.theme_mode = theme_mode;
        app.theme_preference = settings.theme_preference;
        app
    }

    /// Builds the shell without a GUI context. Invalid projects fall back to defaults.
    pub fn with_project(project: ProjectContext) -> Self {
        let project: ProjectContext = match project.validate() {
            Ok(()) => project,
            Err(e) => {
                tracing::warn!("Using default project settings: {}", e);
                ProjectContext::default()
            }
        };
        let (total_tx, total_rx) = channel::<PageTotal>();
        let mut app = Self {
            project,
            pending_project: project,
            pages: Vec::new(),
            current_page: 0,
            mode: StoryboardMode::Upload,
            page_totals: Vec::new(),
            total_tx,
            total_rx,
            theme_mode: ThemeMode::Dark,
            theme_preference: ThemePreference::System,
            show_settings: false,
            settings_error: None,
            error_message: None,
        };
        app.rebuild_pages();
        app
    }

    fn rebuild_pages(&mut self) {
        while self.total_rx.try_recv().is_ok() {}
        self.pages = (1..=self.project.total_pages)
            .map(|page_number| {
                let mut page = StoryboardPage::new(page_number, &self.project);
                let tx: Sender<PageTotal> = self.total_tx.clone();
                page.on_total_changed(Box::new(move |total| { let _ = tx.send(total); }));
                if self.mode == StoryboardMode::Draw { page.switch_to_draw_mode(); }
                page
            })
            .collect();
        self.page_totals = vec![ShotDuration::ZERO; self.pages.len()];
        self.current_page = self.current_page.min(self.pages.len().saturating_sub(1));
        tracing::info!(pages = self.pages.len(), rows = self.project.rows_per_page, fps = self.project.fps, "Built storyboard pages");
    }

    pub fn project(&self) -> ProjectContext { self.project }
    pub fn mode(&self) -> StoryboardMode { self.mode }
    pub fn page_count(&self) -> usize { self.pages.len() }
    pub fn current_page_index(&self) -> usize { self.current_page }
    pub fn page(&self, index: usize) -> Option<&StoryboardPage> { self.pages.get(index) }
    pub fn page_mut(&mut self, index: usize) -> Option<&mut StoryboardPage> { self.pages.get_mut(index) }
    pub fn error_message(&self) -> Option<&str> { self.error_message.as_deref() }

    pub fn go_to_page(&mut self, index: usize) {
        self.current_page = index.min(self.pages.len().saturating_sub(1));
    }
    pub fn next_page(&mut self) { self.go_to_page(self.current_page + 1); }
    pub fn prev_page(&mut self) { self.go_to_page(self.current_page.saturating_sub(1)); }

    pub fn set_mode(&mut self, mode: StoryboardMode) {
        if self.mode == mode { return; }
        self.mode = mode;
        for page in self.pages.iter_mut() {
            match mode {
                StoryboardMode::Upload => page.switch_to_upload_mode(),
                StoryboardMode::Draw => page.switch_to_draw_mode(),
            }
        }
        tracing::info!(?mode, "Switched storyboard mode");
    }

    /// Validates and adopts new project settings. Pages are rebuilt empty.
    pub fn apply_project(&mut self, project: ProjectContext) -> Result<()> {
        project.validate()?;
        self.project = project;
        self.pending_project = project;
        self.rebuild_pages();
        Ok(())
    }

    /// Drains page totals sent by the page listeners.
    pub fn receive_totals(&mut self) {
        while let Ok(PageTotal { page_number, total }) = self.total_rx.try_recv() {
            if let Some(slot) = page_number.checked_sub(1).and_then(|i| self.page_totals.get_mut(i)) {
                *slot = total;
            }
        }
    }

    pub fn page_total(&self, index: usize) -> ShotDuration {
        self.page_totals.get(index).copied().unwrap_or(ShotDuration::ZERO)
    }

    pub fn document_total(&self) -> ShotDuration {
        ShotDuration::sum_normalized(self.page_totals.iter().copied(), self.project.fps)
    }

    pub fn report_error(&mut self, error: StoryboardError) {
        tracing::error!("{}", error);
        self.error_message = Some(error.to_string());
    }

    fn save_settings(&self) {
        AppSettings { theme_preference: self.theme_preference }.save();
    }

    fn set_theme_preference(&mut self, ctx: &egui::Context, preference: ThemePreference) {
        self.theme_preference = preference;
        self.theme_mode = preference.resolve(system_theme(ctx));
        style::apply_theme(ctx, self.theme_mode);
        self.save_settings();
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        let muted: egui::Color32 = style::modal_colors(self.theme_mode).muted;
        let page_count: usize = self.pages.len();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui.add_enabled(self.current_page > 0, egui::Button::new("◀")).on_hover_text("Previous page").clicked() {
                    self.prev_page();
                }
                ui.label(egui::RichText::new(format!("Page {} of {}", self.current_page + 1, page_count)).size(14.0));
                if ui.add_enabled(self.current_page + 1 < page_count, egui::Button::new("▶")).on_hover_text("Next page").clicked() {
                    self.next_page();
                }
                ui.separator();

                let mut mode: StoryboardMode = self.mode;
                ui.selectable_value(&mut mode, StoryboardMode::Upload, "Upload Mode");
                ui.selectable_value(&mut mode, StoryboardMode::Draw, "Draw Mode");
                if mode != self.mode { self.set_mode(mode); }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.pending_project = self.project;
                        self.settings_error = None;
                        self.show_settings = true;
                    }
                    ui.label(egui::RichText::new(format!("{} fps", self.project.fps)).size(12.0).color(muted));
                });
            });
            ui.add_space(4.0);
        });
    }

    fn bottom_bar(&mut self, ctx: &egui::Context) {
        let page_total: ShotDuration = self.page_total(self.current_page);
        let document_total: ShotDuration = self.document_total();
        egui::TopBottomPanel::bottom("totals_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format!("Page total {}", page_total)).size(13.0));
                ui.separator();
                ui.label(egui::RichText::new(format!("Document total {}", document_total)).size(13.0).strong());
            });
            ui.add_space(4.0);
        });
    }

    fn render_settings_modal(&mut self, ctx: &egui::Context) {
        if !self.show_settings { return; }
        style::modal_overlay(ctx, "settings_overlay");
        let colors: ModalColors = style::modal_colors(self.theme_mode);
        let (muted, text) = (colors.muted, colors.text);

        let mut theme_clicked: Option<ThemePreference> = None;
        let mut apply_clicked = false;
        let mut open = self.show_settings;

        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .min_width(400.0)
            .frame(egui::Frame::new().fill(colors.bg).stroke(egui::Stroke::new(1.0, colors.border)).corner_radius(10.0).inner_margin(28.0))
            .open(&mut open)
            .order(egui::Order::Tooltip)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("PROJECT").size(11.0).color(muted));
                ui.add_space(10.0);
                let pending: &mut ProjectContext = &mut self.pending_project;
                setting_row(ui, "Frames per second", text, |ui| { ui.add(egui::DragValue::new(&mut pending.fps).range(FPS_RANGE.0..=FPS_RANGE.1)); });
                setting_row(ui, "Rows per page", text, |ui| { ui.add(egui::DragValue::new(&mut pending.rows_per_page).range(ROWS_PER_PAGE_RANGE.0..=ROWS_PER_PAGE_RANGE.1)); });
                setting_row(ui, "Total pages", text, |ui| { ui.add(egui::DragValue::new(&mut pending.total_pages).range(TOTAL_PAGES_RANGE.0..=TOTAL_PAGES_RANGE.1)); });

                ui.add_space(16.0);
                ui.label(egui::RichText::new("APPEARANCE").size(11.0).color(muted));
                ui.add_space(10.0);
                setting_row(ui, "Theme", text, |ui| {
                    for (pref, label) in [(ThemePreference::Dark, "Dark"), (ThemePreference::Light, "Light"), (ThemePreference::System, "System")] {
                        if ui.selectable_label(self.theme_preference == pref, label).clicked() { theme_clicked = Some(pref); }
                    }
                });

                if let Some(err) = &self.settings_error {
                    ui.add_space(10.0);
                    ui.label(egui::RichText::new(err).size(12.0).color(ColorPalette::RED_500));
                }

                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = 12.0;
                    if style::secondary_button(ui, "Reset Defaults", self.theme_mode).clicked() {
                        self.pending_project.reset_defaults();
                    }
                    apply_clicked = style::primary_button(ui, "Apply").clicked();
                });
                ui.add_space(4.0);
                ui.label(egui::RichText::new("Applying rebuilds all pages.").size(11.0).color(muted));
            });

        self.show_settings = open;
        if let Some(pref) = theme_clicked { self.set_theme_preference(ctx, pref); }
        if apply_clicked {
            match self.apply_project(self.pending_project) {
                Ok(()) => {
                    self.project.save();
                    self.settings_error = None;
                    self.show_settings = false;
                }
                Err(e) => {
                    tracing::warn!("Rejected project settings: {}", e);
                    self.settings_error = Some(e.to_string());
                }
            }
        }
    }

    fn render_error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_message.clone() else { return; };
        let mut open = true;
        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .open(&mut open)
            .order(egui::Order::Tooltip)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(message).size(14.0));
                ui.add_space(12.0);
                dismissed = style::secondary_button(ui, "OK", self.theme_mode).clicked();
            });
        if dismissed || !open { self.error_message = None; }
    }
}

fn setting_row(ui: &mut egui::Ui, label: &str, text: egui::Color32, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(label).size(14.0).color(text));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), add_contents);
    });
    ui.add_space(6.0);
}

impl eframe::App for StoryboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if matches!(self.theme_preference, ThemePreference::System) {
            let system = system_theme(ctx);
            if self.theme_mode != system {
                self.theme_mode = system;
                style::apply_theme(ctx, self.theme_mode);
            }
        }

        self.top_bar(ctx);
        self.bottom_bar(ctx);

        let mut failure: Option<StoryboardError> = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(page) = self.pages.get_mut(self.current_page) {
                if let Err(e) = page.ui(ui) { failure = Some(e); }
            }
        });
        if let Some(e) = failure { self.report_error(e); }

        self.receive_totals();
        self.render_settings_modal(ctx);
        self.render_error_window(ctx);
    }
}
