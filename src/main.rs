#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

mod app;
mod editor;
mod style;

use app::RetouchApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Retouch"),
        ..Default::default()
    };
    eframe::run_native(
        "Retouch",
        options,
        Box::new(|cc| Ok(Box::new(RetouchApp::new(cc)))),
    )
}
