use tiny_sorter::app::SorterApp;
use tiny_sorter::config::Settings;
use tiny_sorter::error::AppError;
use tracing::Level;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let settings = Settings::load()?;
    tracing::info!(
        "Starting Tiny Sorter (test mode: {}, simulated sorter: {})",
        settings.ui.test_mode,
        settings.serial.simulate
    );
    SorterApp::start_gui(settings)
}
