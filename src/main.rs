mod app;
mod color;
mod data;
mod state;
mod ui;

use app::ChallanBoardApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let mut app = ChallanBoardApp::default();

    // Load the fixed-path dataset once per process; a missing or empty file
    // is not fatal, the user can still File → Open another one.
    match data::loader::cached_default() {
        Ok(dataset) => app.state.set_dataset(dataset.clone()),
        Err(e) => {
            log::warn!("No default dataset: {e:#}");
            app.state.status_message = Some(format!("{e:#}"));
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Challan Board – E-Challan Analytics",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
