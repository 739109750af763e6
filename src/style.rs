use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn from_visuals(visuals: &egui::Visuals) -> Self {
        if visuals.dark_mode { ThemeMode::Dark } else { ThemeMode::Light }
    }
}

pub struct ColorPalette;

impl ColorPalette {
    pub const BLUE_400: egui::Color32 = egui::Color32::from_rgb(96, 165, 250);
    pub const BLUE_500: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
    pub const BLUE_600: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);

    pub const SLATE_100: egui::Color32 = egui::Color32::from_rgb(241, 245, 249);
    pub const SLATE_200: egui::Color32 = egui::Color32::from_rgb(226, 232, 240);
    pub const SLATE_300: egui::Color32 = egui::Color32::from_rgb(203, 213, 225);

    pub const GRAY_50: egui::Color32 = egui::Color32::from_rgb(249, 250, 251);
    pub const GRAY_100: egui::Color32 = egui::Color32::from_rgb(243, 244, 246);
    pub const GRAY_200: egui::Color32 = egui::Color32::from_rgb(229, 231, 235);
    pub const GRAY_300: egui::Color32 = egui::Color32::from_rgb(209, 213, 219);
    pub const GRAY_400: egui::Color32 = egui::Color32::from_rgb(156, 163, 175);
    pub const GRAY_500: egui::Color32 = egui::Color32::from_rgb(107, 114, 128);
    pub const GRAY_600: egui::Color32 = egui::Color32::from_rgb(75, 85, 99);
    pub const GRAY_700: egui::Color32 = egui::Color32::from_rgb(55, 65, 81);
    pub const GRAY_800: egui::Color32 = egui::Color32::from_rgb(31, 41, 55);
    pub const GRAY_900: egui::Color32 = egui::Color32::from_rgb(17, 24, 39);

    pub const ZINC_400: egui::Color32 = egui::Color32::from_rgb(161, 161, 170);
    pub const ZINC_500: egui::Color32 = egui::Color32::from_rgb(113, 113, 122);
    pub const ZINC_600: egui::Color32 = egui::Color32::from_rgb(82, 82, 91);
    pub const ZINC_700: egui::Color32 = egui::Color32::from_rgb(63, 63, 70);
    pub const ZINC_800: egui::Color32 = egui::Color32::from_rgb(39, 39, 42);
    pub const ZINC_900: egui::Color32 = egui::Color32::from_rgb(24, 24, 27);

    pub const RED_400: egui::Color32 = egui::Color32::from_rgb(248, 113, 113);
    pub const RED_500: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
}

/// Fill, border, muted label and body text for modal windows.
pub struct ModalColors { pub bg: egui::Color32, pub border: egui::Color32, pub muted: egui::Color32, pub text: egui::Color32 }

pub fn modal_colors(theme: ThemeMode) -> ModalColors {
    match theme {
        ThemeMode::Dark => ModalColors {
            bg: egui::Color32::from_rgb(22, 22, 27),
            border: ColorPalette::ZINC_700,
            muted: ColorPalette::ZINC_400,
            text: ColorPalette::SLATE_200,
        },
        ThemeMode::Light => ModalColors {
            bg: egui::Color32::WHITE,
            border: ColorPalette::GRAY_200,
            muted: ColorPalette::GRAY_600,
            text: ColorPalette::GRAY_700,
        },
    }
}

/// Dims everything behind a modal window.
pub fn modal_overlay(ctx: &egui::Context, id: &str) {
    egui::Area::new(egui::Id::new(id))
        .fixed_pos(egui::pos2(0.0, 0.0))
        .order(egui::Order::Foreground)
        .interactable(false)
        .show(ctx, |ui| {
            ui.painter().rect_filled(ctx.content_rect(), 0.0, egui::Color32::from_rgba_premultiplied(0, 0, 0, 160));
        });
}

// --- GRID ---

pub fn grid_line(theme: ThemeMode) -> egui::Color32 {
    match theme {
        ThemeMode::Dark => ColorPalette::ZINC_700,
        ThemeMode::Light => ColorPalette::GRAY_300,
    }
}

/// Header fill and text color.
pub fn header_colors(theme: ThemeMode) -> (egui::Color32, egui::Color32) {
    match theme {
        ThemeMode::Dark => (ColorPalette::ZINC_800, ColorPalette::SLATE_200),
        ThemeMode::Light => (ColorPalette::GRAY_100, ColorPalette::GRAY_800),
    }
}

pub fn apply_theme(ctx: &egui::Context, theme: ThemeMode) {
    let mut style = (*ctx.style()).clone();

    style.visuals.widgets.noninteractive.corner_radius = egui::CornerRadius::same(4);
    style.visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(4);
    style.visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(4);
    style.visuals.widgets.active.corner_radius = egui::CornerRadius::same(4);

    style.spacing.item_spacing = egui::vec2(6.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 4.0);
    style.spacing.window_margin = egui::Margin::same(10);

    match theme {
        ThemeMode::Dark => apply_dark_theme(&mut style),
        ThemeMode::Light => apply_light_theme(&mut style),
    }

    ctx.set_style(style);
}

fn apply_dark_theme(style: &mut egui::Style) {
    style.visuals.dark_mode = true;

    style.visuals.panel_fill = ColorPalette::ZINC_900;
    style.visuals.window_fill = ColorPalette::ZINC_900;
    style.visuals.faint_bg_color = ColorPalette::ZINC_800;
    style.visuals.extreme_bg_color = egui::Color32::from_rgb(12, 12, 15);

    style.visuals.widgets.noninteractive.bg_fill = ColorPalette::ZINC_800;
    style.visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, ColorPalette::ZINC_700);

    style.visuals.widgets.inactive.bg_fill = egui::Color32::from_rgb(30, 30, 35);
    style.visuals.widgets.inactive.weak_bg_fill = ColorPalette::ZINC_800;
    style.visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, ColorPalette::ZINC_600);

    style.visuals.widgets.hovered.bg_fill = egui::Color32::from_rgb(40, 40, 48);
    style.visuals.widgets.hovered.weak_bg_fill = egui::Color32::from_rgb(35, 35, 42);
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, ColorPalette::ZINC_500);

    style.visuals.widgets.active.bg_fill = egui::Color32::from_rgb(50, 50, 60);
    style.visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, ColorPalette::ZINC_400);

    style.visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, ColorPalette::SLATE_300);
    style.visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, ColorPalette::SLATE_200);
    style.visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, ColorPalette::SLATE_100);
    style.visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);

    style.visuals.selection.bg_fill = egui::Color32::from_rgba_premultiplied(60, 120, 240, 100);
    style.visuals.hyperlink_color = ColorPalette::BLUE_400;
}

fn apply_light_theme(style: &mut egui::Style) {
    style.visuals.dark_mode = false;

    style.visuals.panel_fill = ColorPalette::GRAY_50;
    style.visuals.window_fill = ColorPalette::GRAY_50;
    style.visuals.faint_bg_color = ColorPalette::GRAY_100;
    style.visuals.extreme_bg_color = egui::Color32::WHITE;

    style.visuals.widgets.noninteractive.bg_fill = egui::Color32::WHITE;
    style.visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_300);

    style.visuals.widgets.inactive.bg_fill = ColorPalette::GRAY_50;
    style.visuals.widgets.inactive.weak_bg_fill = ColorPalette::GRAY_100;
    style.visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_300);

    style.visuals.widgets.hovered.bg_fill = ColorPalette::GRAY_100;
    style.visuals.widgets.hovered.weak_bg_fill = ColorPalette::GRAY_200;
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_400);

    style.visuals.widgets.active.bg_fill = ColorPalette::GRAY_200;
    style.visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_500);

    style.visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_700);
    style.visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_800);
    style.visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_900);
    style.visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);

    style.visuals.selection.bg_fill = egui::Color32::from_rgba_premultiplied(60, 120, 240, 80);
    style.visuals.hyperlink_color = ColorPalette::BLUE_600;
}

const DIALOG_BUTTON_SIZE: egui::Vec2 = egui::vec2(120.0, 34.0);

pub fn primary_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    let (bg_color, hover_color) = (ColorPalette::BLUE_600, ColorPalette::BLUE_500);

    ui.scope(|ui| {
        let visuals = &mut ui.style_mut().visuals.widgets;
        visuals.inactive.bg_fill = bg_color;
        visuals.inactive.weak_bg_fill = bg_color;
        visuals.inactive.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
        visuals.inactive.bg_stroke = egui::Stroke::NONE;

        visuals.hovered.bg_fill = hover_color;
        visuals.hovered.weak_bg_fill = hover_color;
        visuals.hovered.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
        visuals.hovered.bg_stroke = egui::Stroke::NONE;

        visuals.active.bg_fill = bg_color;
        visuals.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
        visuals.active.bg_stroke = egui::Stroke::NONE;

        ui.add(egui::Button::new(egui::RichText::new(text).size(14.0)).min_size(DIALOG_BUTTON_SIZE))
    }).inner
}

pub fn secondary_button(ui: &mut egui::Ui, text: &str, theme: ThemeMode) -> egui::Response {
    let (bg_color, stroke_color, text_color, hover_bg) = match theme {
        ThemeMode::Dark => (ColorPalette::ZINC_800, ColorPalette::ZINC_600, ColorPalette::SLATE_200, ColorPalette::ZINC_700),
        ThemeMode::Light => (egui::Color32::WHITE, ColorPalette::GRAY_300, ColorPalette::GRAY_800, ColorPalette::GRAY_50),
    };

    ui.scope(|ui| {
        let visuals = &mut ui.style_mut().visuals.widgets;
        visuals.inactive.bg_fill = bg_color;
        visuals.inactive.weak_bg_fill = bg_color;
        visuals.inactive.fg_stroke = egui::Stroke::new(1.0, text_color);
        visuals.inactive.bg_stroke = egui::Stroke::new(1.0, stroke_color);

        visuals.hovered.bg_fill = hover_bg;
        visuals.hovered.weak_bg_fill = hover_bg;
        visuals.hovered.fg_stroke = egui::Stroke::new(1.0, text_color);
        visuals.hovered.bg_stroke = egui::Stroke::new(1.0, stroke_color);

        visuals.active.bg_fill = bg_color;
        visuals.active.fg_stroke = egui::Stroke::new(1.0, text_color);

        ui.add(egui::Button::new(egui::RichText::new(text).size(14.0)).min_size(DIALOG_BUTTON_SIZE))
    }).inner
}
