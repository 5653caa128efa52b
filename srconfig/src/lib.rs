//! # SR Aggregator Configuration
//!
//! This crate provides configuration management for the SR aggregator, including:
//! - Loading configuration from a YAML file
//! - Merging with the embedded default configuration
//! - Environment variable overrides
//! - Typed getters for the host settings
//!
//! The configuration is loaded once at startup and is immutable afterwards.
//! There is no global instance: the loaded [`Config`] is passed to whoever
//! needs it.
//!
//! ## Usage
//!
//! ```no_run
//! use srconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let port = config.get_http_port();
//! let level = config.get_log_min_level()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::{env, fs, io::ErrorKind, path::Path};
use tracing::info;

// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("sraggregator.yaml");

const ENV_CONFIG_DIR: &str = "SRAGG_CONFIG";
const ENV_PREFIX: &str = "SRAGG_CONFIG__";
const CONFIG_DIR_NAME: &str = ".sraggregator";
const CONFIG_FILE_NAME: &str = "config.yaml";

// Default values for configuration
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
pub const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

/// Generates a getter for an unsigned value with a default
#[macro_export]
macro_rules! impl_u64_config {
    ($getter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> anyhow::Result<u64> {
            self.get_u64_or($path, $default)
        }
    };
}

/// Generates a getter for a bool value with a default
#[macro_export]
macro_rules! impl_bool_config {
    ($getter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> anyhow::Result<bool> {
            self.get_bool_or($path, $default)
        }
    };
}

/// Configuration of the SR aggregator
///
/// Holds the merged YAML tree (defaults, file, environment). Keys are
/// case-insensitive: they are lowercased on load and on lookup.
///
/// # Examples
///
/// ```
/// use srconfig::Config;
///
/// let config = Config::from_yaml_str("host:\n  http_port: 9000\n").unwrap();
/// assert_eq!(config.get_http_port(), 9000);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    config_dir: String,
    path: Option<String>,
    data: Value,
}

impl Config {
    /// Finds the config directory by trying different locations in order
    ///
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `SRAGG_CONFIG` environment variable
    /// 3. `.sraggregator` in the current directory
    /// 4. `.sraggregator` in the user's home directory
    pub fn find_config_dir(directory: &str) -> String {
        if !directory.is_empty() {
            return directory.to_string();
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        CONFIG_DIR_NAME.to_string()
    }

    /// Loads the configuration
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the `config.yaml` file of that directory, if present
    /// 4. Applies `SRAGG_CONFIG__*` environment variable overrides
    ///
    /// A missing directory or file is not an error. Nothing is written to disk.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join(CONFIG_FILE_NAME);
        let file_path = config_file_path.to_string_lossy().to_string();

        let mut data: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let path = match fs::read(&config_file_path) {
            Ok(yaml_data) => {
                info!(config_file = %file_path, "Loaded config file");
                let external: Value = serde_yaml::from_slice(&yaml_data)
                    .map_err(|e| anyhow!("Invalid config file {}: {}", file_path, e))?;
                merge_yaml(&mut data, &Self::lower_keys_value(external));
                Some(file_path)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(config_file = %file_path, "Config file not found, using default embedded config");
                None
            }
            Err(e) => return Err(anyhow!("Cannot read config file {}: {}", file_path, e)),
        };

        let mut data = Self::lower_keys_value(data);
        apply_env_overrides(&mut data, env::vars());

        Ok(Config {
            config_dir,
            path,
            data,
        })
    }

    /// Builds a configuration from a YAML document merged over the defaults
    ///
    /// Environment variables are not consulted.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut data: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if !yaml.trim().is_empty() {
            let external: Value = serde_yaml::from_str(yaml)?;
            merge_yaml(&mut data, &Self::lower_keys_value(external));
        }

        Ok(Config {
            config_dir: String::new(),
            path: None,
            data: Self::lower_keys_value(data),
        })
    }

    /// Directory the configuration was looked up in
    pub fn config_dir(&self) -> &str {
        &self.config_dir
    }

    /// Path of the loaded `config.yaml`, if one was found
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Gets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["host", "http_port"]`)
    ///
    /// # Returns
    ///
    /// The YAML value, or an error if the path doesn't exist
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let mut current = &self.data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Deserializes the value at `path` into `T`
    pub fn get_typed<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        let value = self.get_value(path)?;
        serde_yaml::from_value(value).map_err(|e| anyhow!("Invalid value at {}: {}", path.join("."), e))
    }

    /// Reads an unsigned number, falling back to `default` when unset or null
    pub fn get_u64_or(&self, path: &[&str], default: u64) -> Result<u64> {
        match self.get_value(path) {
            Ok(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| anyhow!("{} must be a non-negative integer", path.join("."))),
            Ok(Value::Null) | Err(_) => Ok(default),
            Ok(other) => Err(anyhow!(
                "{} must be a non-negative integer, got {:?}",
                path.join("."),
                other
            )),
        }
    }

    /// Reads a boolean, falling back to `default` when unset or null
    pub fn get_bool_or(&self, path: &[&str], default: bool) -> Result<bool> {
        match self.get_value(path) {
            Ok(Value::Bool(b)) => Ok(b),
            Ok(Value::Null) | Err(_) => Ok(default),
            Ok(other) => Err(anyhow!("{} must be a boolean, got {:?}", path.join("."), other)),
        }
    }

    /// Reads a string, falling back to `default` when unset, null or empty
    pub fn get_string_or(&self, path: &[&str], default: &str) -> Result<String> {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Ok(s),
            Ok(Value::String(_)) | Ok(Value::Null) | Err(_) => Ok(default.to_string()),
            Ok(other) => Err(anyhow!("{} must be a string, got {:?}", path.join("."), other)),
        }
    }

    /// Gets the address the HTTP server binds to
    pub fn get_bind_address(&self) -> String {
        match self.get_string_or(&["host", "bind_address"], DEFAULT_BIND_ADDRESS) {
            Ok(address) => address,
            Err(err) => {
                tracing::warn!("{}, using default {}", err, DEFAULT_BIND_ADDRESS);
                DEFAULT_BIND_ADDRESS.to_string()
            }
        }
    }

    /// Gets the HTTP port from configuration
    ///
    /// Returns the configured HTTP port, or the default port (8080) if not
    /// configured or invalid.
    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["host", "http_port"]) {
            Ok(Value::Number(n)) => match n.as_u64().and_then(|p| u16::try_from(p).ok()) {
                Some(port) => port,
                None => {
                    tracing::warn!("Invalid HTTP port {}, using default {}", n, DEFAULT_HTTP_PORT);
                    DEFAULT_HTTP_PORT
                }
            },
            Ok(Value::String(s)) => match s.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!("Invalid HTTP port '{}', using default {}", s, DEFAULT_HTTP_PORT);
                    DEFAULT_HTTP_PORT
                }
            },
            Ok(_) => {
                tracing::warn!(
                    "HTTP port not a number or string, using default {}",
                    DEFAULT_HTTP_PORT
                );
                DEFAULT_HTTP_PORT
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to get HTTP port: {}, using default {}",
                    err,
                    DEFAULT_HTTP_PORT
                );
                DEFAULT_HTTP_PORT
            }
        }
    }

    impl_u64_config!(
        get_request_timeout_secs,
        &["host", "request_timeout_secs"],
        DEFAULT_REQUEST_TIMEOUT_SECS
    );

    impl_bool_config!(
        get_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    /// Gets the minimum log level (`ERROR`, `WARN`, `INFO`, `DEBUG` or `TRACE`)
    pub fn get_log_min_level(&self) -> Result<String> {
        self.get_string_or(&["host", "logger", "min_level"], DEFAULT_LOG_MIN_LEVEL)
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        new_map.insert(Value::String(s.to_lowercase()), Self::lower_keys_value(v));
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }
}

/// Applies `SRAGG_CONFIG__A__B=value` style overrides
///
/// `SRAGG_CONFIG__UPSTREAM__BASE_URL=http://localhost:9000` sets
/// `upstream.base_url`. Values are parsed as YAML scalars, so `8081` becomes a
/// number and `true` a boolean.
fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
            let key_path = stripped.split("__").collect::<Vec<_>>();
            if key_path.iter().any(|k| k.is_empty()) {
                tracing::warn!(env_var = %key, "Ignoring malformed config override");
                continue;
            }
            if let Err(e) = set_value_internal(config, &key_path, convert_env_value(&value)) {
                tracing::warn!(env_var = %key, "Ignoring config override: {}", e);
            }
        }
    }
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn convert_env_value(value: &str) -> Value {
    match serde_yaml::from_str::<Value>(value) {
        Ok(parsed @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Null)) => parsed,
        _ => Value::String(value.to_string()),
    }
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings, keys from `external` are merged into `default`
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
