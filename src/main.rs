mod app;
mod color;
mod config;
mod data;
mod error;
mod pipeline;
mod state;
mod ui;

use app::DataSweeperApp;
use config::Settings;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "💿 Data Sweeper",
        options,
        Box::new(|_cc| Ok(Box::new(DataSweeperApp::new(settings)))),
    )
}
