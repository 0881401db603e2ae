// Process log configuration
pub mod config;

// Subscriber setup
pub mod logging;

pub use config::{LogConfig, LogFormat, LogOutput};
pub use logging::init_logging;
