#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod panel;
mod session;

use app::TiltringApp;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 850.0])
            .with_title("Tiltring"),
        ..Default::default()
    };

    eframe::run_native(
        "Tiltring",
        options,
        Box::new(|cc| Ok(Box::new(TiltringApp::new(cc)))),
    )
}
