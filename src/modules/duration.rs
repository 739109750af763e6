use eframe::egui;
use std::fmt;

/// Seconds plus frames. Rows keep whatever the user typed; carry happens only when totals are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShotDuration { pub seconds: u32, pub frames: u32 }

impl ShotDuration {
    pub const ZERO: Self = Self { seconds: 0, frames: 0 };

    pub fn new(seconds: u32, frames: u32) -> Self { Self { seconds, frames } }

    /// Carries whole seconds out of `frames`. A zero fps leaves the value untouched.
    pub fn normalized(self, fps: u32) -> Self {
        if fps == 0 { return self; }
        Self {
            seconds: self.seconds.saturating_add(self.frames / fps),
            frames: self.frames % fps,
        }
    }

    pub fn sum_normalized<I: IntoIterator<Item = ShotDuration>>(durations: I, fps: u32) -> Self {
        durations.into_iter()
            .fold(Self::ZERO, |acc, d| Self {
                seconds: acc.seconds.saturating_add(d.seconds),
                frames: acc.frames.saturating_add(d.frames),
            })
            .normalized(fps)
    }
}

impl fmt::Display for ShotDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} + {})", self.seconds, self.frames)
    }
}

pub type DurationListener = Box<dyn FnMut(ShotDuration)>;

/// `( seconds + frames )` input pair.
pub struct DurationField {
    seconds_text: String,
    frames_text: String,
    fps: u32,
    listeners: Vec<DurationListener>,
}

impl DurationField {
    pub fn new(fps: u32) -> Self {
        Self { seconds_text: "0".to_string(), frames_text: "0".to_string(), fps, listeners: Vec::new() }
    }

    pub fn fps(&self) -> u32 { self.fps }

    pub fn on_value_changed(&mut self, listener: DurationListener) { self.listeners.push(listener); }

    pub fn get_duration(&self) -> ShotDuration {
        ShotDuration { seconds: parse_field(&self.seconds_text), frames: parse_field(&self.frames_text) }
    }

    pub fn set_seconds_text(&mut self, text: &str) {
        self.seconds_text = text.to_string();
        self.emit_changed();
    }

    pub fn set_frames_text(&mut self, text: &str) {
        self.frames_text = text.to_string();
        self.emit_changed();
    }

    fn emit_changed(&mut self) {
        let duration: ShotDuration = self.get_duration();
        for listener in self.listeners.iter_mut() { listener(duration); }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, rect: egui::Rect) -> bool {
        let fps: u32 = self.fps;
        let (seconds_changed, frames_changed) = ui.scope_builder(
            egui::UiBuilder::new().max_rect(rect).layout(egui::Layout::left_to_right(egui::Align::Center)),
            |ui| {
                ui.spacing_mut().item_spacing.x = 4.0;
                ui.label("(");
                let s: egui::Response = ui.add(egui::TextEdit::singleline(&mut self.seconds_text).desired_width(30.0))
                    .on_hover_text("Seconds");
                ui.label("+");
                let f: egui::Response = ui.add(egui::TextEdit::singleline(&mut self.frames_text).desired_width(30.0))
                    .on_hover_text(format!("Frames at {} fps", fps));
                ui.label(")");
                (s.changed(), f.changed())
            },
        ).inner;

        let changed: bool = seconds_changed || frames_changed;
        if changed { self.emit_changed(); }
        changed
    }
}

fn parse_field(text: &str) -> u32 { text.trim().parse::<u32>().unwrap_or(0) }
