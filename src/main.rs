use anyhow::Result;
use liquid_button::app::App;
use liquid_button::config::Config;
use log::{info, warn};

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting liquid-button...");

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    info!(
        "Container {}x{} at {} fps, frames to {}",
        config.size.width,
        config.size.height,
        config.fps_cap,
        config.output.dir.display()
    );

    let mut app = App::new(config)?;
    app.run()
}
