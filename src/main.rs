mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::CrashboardApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Crashboard – Accidents Dashboard",
        options,
        Box::new(|_cc| {
            let mut app = CrashboardApp::default();
            // Optional dataset path on the command line, loaded at startup.
            if let Some(path) = std::env::args().nth(1) {
                app.state.load_path(Path::new(&path));
            }
            Ok(Box::new(app))
        }),
    )
}
