// Configuration module
// Reads an optional INI-style configuration file with environment variable overrides

use std::collections::HashMap;

use configparser::ini::Ini;
use parking_lot::Mutex;

/// Global configuration singleton
static CONFIG: once_cell::sync::Lazy<Mutex<Config>> =
    once_cell::sync::Lazy::new(|| Mutex::new(Config::new()));

/// Get a reference to the global config instance
pub fn get_config() -> &'static Mutex<Config> {
    &CONFIG
}

/// Configuration file parser
/// Section headers are accepted but flattened; keys are case sensitive.
pub struct Config {
    values: HashMap<String, String>,
    filename: String,
    env_prefix: String,
}

impl Config {
    pub fn new() -> Self {
        Config {
            values: HashMap::new(),
            filename: String::new(),
            env_prefix: String::new(),
        }
    }

    /// Load configuration from a file
    /// env_prefix is used to check environment variables (e.g., "Wmx2Obj_")
    pub fn set_source(&mut self, filename: &str, env_prefix: &str) -> bool {
        self.filename = filename.to_string();
        self.env_prefix = env_prefix.to_string();
        self.reload()
    }

    /// Reload the configuration file. Returns false if it could not be read or parsed.
    fn reload(&mut self) -> bool {
        self.values.clear();

        let mut ini = Ini::new_cs();
        match ini.load(&self.filename) {
            Ok(sections) => {
                self.absorb(sections);
                true
            }
            Err(err) => {
                tracing::debug!("Config '{}' not loaded: {}", self.filename, err);
                false
            }
        }
    }

    fn absorb(&mut self, sections: HashMap<String, HashMap<String, Option<String>>>) {
        for (_, entries) in sections {
            for (key, value) in entries {
                let Some(mut value) = value else { continue };

                // Strip quotes
                if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                    value = value[1..value.len() - 1].to_string();
                }

                self.values.insert(key, value);
            }
        }
    }

    /// Name of the file the configuration was loaded from
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Get a string value with a default
    pub fn get_string_default(&self, key: &str, default: &str) -> String {
        self.get_env_or_config(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Get an integer value with a default
    pub fn get_int_default(&self, key: &str, default: i32) -> i32 {
        match self.get_env_or_config(key) {
            Some(val) => val.trim().parse().unwrap_or(default),
            None => default,
        }
    }

    /// Try environment variable first, then config file
    fn get_env_or_config(&self, key: &str) -> Option<String> {
        // Convert key to env var name: replace '.' with '_', add prefix
        if !self.env_prefix.is_empty() {
            let env_key = format!("{}{}", self.env_prefix, key.replace('.', "_"));
            if let Ok(val) = std::env::var(&env_key) {
                return Some(val);
            }
        }

        self.values.get(key).cloned()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
