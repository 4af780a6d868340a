mod app;
mod config;
mod effects;
mod input;
mod logging;
mod render;

pub use app::{run_app, Mode};
pub use config::AppConfig;
pub use logging::initialize as initialize_logging;
