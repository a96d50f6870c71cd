/*!
 * Desktop dashboard for worldstats.
 *
 * Connects to a running query API (default http://localhost:8004,
 * override with WORLDSTATS_API or the first CLI argument) and provides
 * the Compare / Timeline / Map / Raw Data views.
 */

use eframe::egui;
use worldstats::app::WorldStatsApp;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let base_url = std::env::var("WORLDSTATS_API")
        .ok()
        .or_else(|| std::env::args().nth(1))
        .unwrap_or_else(|| "http://localhost:8004".to_string());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([700.0, 500.0])
            .with_title("World Statistics Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "World Statistics Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(WorldStatsApp::new(cc, base_url)))),
    )
}
