// utils module - configuration, logging, and version information

pub mod config;
pub mod logging;
pub mod version;

pub use config::{Config, DeviceConfig, DeviceKind, DisarmCode};
pub use logging::init_tracing;
pub use version::VersionInfo;
