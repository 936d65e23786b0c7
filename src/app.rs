use eframe::egui;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::editor::{EditorSession, PanelAction};
use crate::style::{self, ThemeMode};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum ThemePreference {
    System,
    Light,
    Dark,
}

#[derive(Serialize, Deserialize)]
struct AppSettings {
    theme_preference: ThemePreference,
    last_open_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_preference: ThemePreference::System,
            last_open_dir: None,
        }
    }
}

impl AppSettings {
    fn load() -> Self {
        let config_path = Self::get_config_path();
        if let Ok(contents) = fs::read_to_string(&config_path) {
            if let Ok(settings) = serde_json::from_str(&contents) {
                return settings;
            }
        }
        Self::default()
    }

    fn save(&self) {
        let config_path = Self::get_config_path();
        if let Some(parent) = config_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            let _ = fs::write(config_path, json);
        }
    }

    fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("retouch");
        path.push("settings.json");
        path
    }
}

pub struct RetouchApp {
    session: EditorSession,
    settings: AppSettings,
}

impl RetouchApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        style::apply_theme(&cc.egui_ctx, resolve_theme(&cc.egui_ctx, settings.theme_preference));
        Self {
            session: EditorSession::new(),
            settings,
        }
    }

    fn open_image(&mut self) {
        let start_dir = self.settings.last_open_dir.clone();
        if let Some(path) = self.session.open_via_dialog(start_dir.as_deref()) {
            if let Some(parent) = path.parent() {
                self.settings.last_open_dir = Some(parent.to_path_buf());
                self.settings.save();
            }
        }
    }

    fn save_image(&mut self) {
        self.session.save_via_dialog();
    }

    fn set_theme(&mut self, ctx: &egui::Context, preference: ThemePreference) {
        self.settings.theme_preference = preference;
        self.settings.save();
        style::apply_theme(ctx, resolve_theme(ctx, preference));
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        let mut open: bool = false;
        let mut save: bool = false;
        ctx.input_mut(|i| {
            if i.consume_key(egui::Modifiers::CTRL, egui::Key::O) {
                open = true;
            }
            if i.consume_key(egui::Modifiers::CTRL, egui::Key::S) {
                save = true;
            }
        });
        if open {
            self.open_image();
        }
        if save {
            self.save_image();
        }
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            egui::MenuBar::new().ui(ui, |ui| {
                let has_image: bool = self.session.has_image();
                ui.menu_button("File", |ui| {
                    if ui.button("Open... (Ctrl+O)").clicked() {
                        self.open_image();
                        ui.close();
                    }
                    if ui.add_enabled(has_image, egui::Button::new("Save As... (Ctrl+S)")).clicked() {
                        self.save_image();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        ui.close();
                    }
                });
                ui.menu_button("Image", |ui| {
                    if ui.add_enabled(has_image, egui::Button::new("Rotate 90° CW")).clicked() {
                        self.session.rotate_cw();
                        ui.close();
                    }
                    if ui.add_enabled(has_image, egui::Button::new("Flip Horizontal")).clicked() {
                        self.session.flip_horizontal();
                        ui.close();
                    }
                });
                ui.menu_button("View", |ui| {
                    let current: ThemePreference = self.settings.theme_preference;
                    for (preference, label) in [
                        (ThemePreference::System, "System Theme"),
                        (ThemePreference::Light, "Light Theme"),
                        (ThemePreference::Dark, "Dark Theme"),
                    ] {
                        if ui.selectable_label(current == preference, label).clicked() {
                            self.set_theme(ctx, preference);
                            ui.close();
                        }
                    }
                });
            });
            ui.add_space(4.0);
        });
    }
}

impl eframe::App for RetouchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard(ctx);
        self.top_bar(ctx);

        let mut action: PanelAction = PanelAction::None;
        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(210.0)
            .show(ctx, |ui| {
                action = self.session.render_controls(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.session.render_canvas(ui, ctx);
        });

        match action {
            PanelAction::OpenImage => self.open_image(),
            PanelAction::SaveImage => self.save_image(),
            PanelAction::None => {}
        }
    }
}

fn resolve_theme(ctx: &egui::Context, preference: ThemePreference) -> ThemeMode {
    let system_theme: ThemeMode = match ctx.theme() {
        egui::Theme::Dark => ThemeMode::Dark,
        egui::Theme::Light => ThemeMode::Light,
    };
    match preference {
        ThemePreference::System => system_theme,
        ThemePreference::Light => ThemeMode::Light,
        ThemePreference::Dark => ThemeMode::Dark,
    }
}
