#![forbid(unsafe_code)]

pub mod config;
pub mod mode;

pub use config::{ConfigError, MimicConfig, CONFIG_ENV};
pub use mode::{MockMode, VerifyMode};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate the code-generation side links generated mocks against.
pub const RUNTIME_CRATE: &str = "mimic-runtime";
