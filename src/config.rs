use std::path::Path;
use serde::{Serialize, Deserialize, de::DeserializeOwned};

use crate::log;

// ----------------------------------------------
// Configs
// ----------------------------------------------

pub type ConfigResult<T> = Result<T, String>;

pub trait Configs: Sized {
    fn post_load(&mut self) {
    }

    fn from_json(json: &str) -> ConfigResult<Self>
        where Self: DeserializeOwned
    {
        let mut configs: Self = serde_json::from_str(json).map_err(|err| err.to_string())?;
        configs.post_load();
        Ok(configs)
    }

    fn to_json(&self) -> ConfigResult<String>
        where Self: Serialize
    {
        serde_json::to_string_pretty(self).map_err(|err| err.to_string())
    }

    // Saves current configs to a JSON file.
    fn save_file<P>(&self, path: P) -> bool
        where Self: Serialize,
              P: AsRef<Path>
    {
        let path = path.as_ref();

        // Ignore any errors here; the directory may already exist.
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let json = match self.to_json() {
            Ok(json) => json,
            Err(err) => {
                log::error!(log::channel!("config"), "Failed to serialize config file {path:?}: {err}");
                return false;
            }
        };

        if let Err(err) = std::fs::write(path, json) {
            log::error!(log::channel!("config"), "Failed to write config file {path:?}: {err}");
            return false;
        }

        true
    }

    // Either succeeds loading the config file or returns a default config.
    fn load_file<P>(path: P) -> Self
        where Self: Default + DeserializeOwned,
              P: AsRef<Path>
    {
        let path = path.as_ref();

        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::error!(log::channel!("config"), "Failed to read config file from path {path:?}: {err}");
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(configs) => configs,
            Err(err) => {
                log::error!(log::channel!("config"), "Failed to deserialize config file from path {path:?}: {err}");
                Self::default()
            }
        }
    }
}

// ----------------------------------------------
// PathfindConfigs
// ----------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)] // Missing fields in the config file get defaults from PathfindConfigs::default().
pub struct PathfindConfigs {
    // Heuristic:
    pub heuristic_cache_capacity: usize, // 0 disables the cache.
    pub parallel_min_destinations: usize,

    // Search:
    pub start_padding_hops: i32,

    // Trade Locator:
    pub max_trade_distance: f64,

    // Debug Log:
    pub log_level: log::Level,
    pub log_tty_colors: bool,
}

impl PathfindConfigs {
    pub fn apply_log_settings(&self) {
        log::set_level(self.log_level);
        log::enable_tty_colors(self.log_tty_colors);
    }
}

impl Configs for PathfindConfigs {
    fn post_load(&mut self) {
        if self.start_padding_hops < 0 {
            log::warn!(log::channel!("config"), "Negative start_padding_hops ({}), using 0.", self.start_padding_hops);
            self.start_padding_hops = 0;
        }
        if self.max_trade_distance.is_nan() || self.max_trade_distance < 0.0 {
            log::warn!(log::channel!("config"), "Invalid max_trade_distance ({}), using 0.", self.max_trade_distance);
            self.max_trade_distance = 0.0;
        }
    }
}

impl Default for PathfindConfigs {
    fn default() -> Self {
        Self {
            // Heuristic:
            heuristic_cache_capacity: 256,
            parallel_min_destinations: 2,

            // Search:
            start_padding_hops: 3,

            // Trade Locator:
            max_trade_distance: crate::trade::MAX_TRADE_DISTANCE,

            // Debug Log:
            log_level: log::Level::Info,
            log_tty_colors: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let configs = PathfindConfigs::from_json(r#"{ "heuristic_cache_capacity": 16 }"#).unwrap();
        assert_eq!(configs.heuristic_cache_capacity, 16);
        assert_eq!(configs.start_padding_hops, 3);
        assert_eq!(configs.max_trade_distance, 50.0);
        assert_eq!(configs.log_level, log::Level::Info);
        assert!(configs.log_tty_colors);
    }

    #[test]
    fn test_invalid_values_are_clamped() {
        let configs = PathfindConfigs::from_json(r#"{ "start_padding_hops": -2, "max_trade_distance": -1.0 }"#).unwrap();
        assert_eq!(configs.start_padding_hops, 0);
        assert_eq!(configs.max_trade_distance, 0.0);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(PathfindConfigs::from_json("{ not json").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let configs = PathfindConfigs::load_file("does/not/exist/pathfind.json");
        assert_eq!(configs, PathfindConfigs::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir()
            .join(format!("citynav-configs-{}", std::process::id()))
            .join("pathfind.json");

        let configs = PathfindConfigs {
            heuristic_cache_capacity: 8,
            start_padding_hops: 1,
            ..PathfindConfigs::default()
        };

        assert!(configs.save_file(&path));
        assert_eq!(PathfindConfigs::load_file(&path), configs);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_apply_log_settings() {
        PathfindConfigs::default().apply_log_settings();
        assert!(log::Level::Info.is_enabled());
        assert!(!log::Level::Verbose.is_enabled());
    }
}
