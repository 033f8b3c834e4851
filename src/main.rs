mod api;
mod app;
mod color;
mod config;
mod data;
mod formula;
mod state;
mod ui;

use app::PricingDashboardApp;
use clap::Parser;
use config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // `--api-url`, then `PRICING_API_URL`, then the default.
    let config = Config::parse();
    log::info!("using pricing backend at {}", config.api_base_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Drug Price Calculator",
        options,
        Box::new(move |cc| Ok(Box::new(PricingDashboardApp::new(cc, &config)))),
    )
}
