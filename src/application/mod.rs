pub mod config;
pub mod validator;

pub use config::{Config, DisplayConfig, LoggingConfig, ScanConfig};
pub use validator::validate;
