// wmx-shared - Shared support library for the wmx2obj converter
// Logging setup, configuration loading and binary read helpers

pub mod config;
pub mod log;
pub mod util;

/// Default configuration file name looked up next to the working directory
pub const DEFAULT_CONFIG: &str = "wmx2obj.conf";

/// Environment variable prefix for configuration overrides (e.g. `Wmx2Obj_LogsDir`)
pub const CONFIG_ENV_PREFIX: &str = "Wmx2Obj_";
