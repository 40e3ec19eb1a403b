mod core;
mod gui;
mod video;

use eframe::egui;
use gui::GifMakerApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = core::AppConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_title(config.window_title.as_str()),
        ..Default::default()
    };

    eframe::run_native(
        "gif maker",
        options,
        Box::new(|cc| {
            match GifMakerApp::new(cc) {
                Ok(app) => Ok(Box::new(app)),
                Err(e) => {
                    log::error!("Failed to initialize app: {}", e);
                    std::process::exit(1);
                }
            }
        }),
    ).map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
