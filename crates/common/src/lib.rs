pub mod config;
pub mod logging;
pub mod span;

pub use config::{Environment, env_or, env_parse};
pub use logging::setup_logging;
