use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;

/// Alarm disarm code; TOML allows it as a string or a bare number
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum DisarmCode {
    Text(String),
    Number(i64),
}

impl fmt::Display for DisarmCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisarmCode::Text(code) => f.write_str(code),
            DisarmCode::Number(code) => write!(f, "{}", code),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    MotionSensor,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DeviceConfig {
    pub id: String,
    pub location_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub category: Option<String>,
    pub model: Option<String>,
    /// Id of a device declared earlier in the file
    pub parent: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub hostname: String,
    pub mqtt_url: String,
    pub mqtt_port: u16,
    pub username: String,
    pub password: String,
    pub log_level: String,
    #[serde(default = "default_retry_interval")]
    pub update_interval_ms: u64,
    #[serde(default = "default_root_topic")]
    pub root_topic: String,
    #[serde(default = "default_hass_status_topic")]
    pub hass_status_topic: String,
    pub disarm_code: Option<DisarmCode>,
    pub state_file: Option<String>,
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceConfig>,
}

fn default_retry_interval() -> u64 {
    5000
}

fn default_root_topic() -> String {
    "ring".to_string()
}

fn default_hass_status_topic() -> String {
    "homeassistant/status".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from_file(&config_path)
    }

    pub fn get_config_path() -> Result<String> {
        #[cfg(debug_assertions)]
        {
            // In debug mode, look for config.toml in the current directory
            Ok("config.toml".to_string())
        }

        #[cfg(not(debug_assertions))]
        {
            // In release mode, look for config.toml in $HOME/.config/ring-bridge
            let home = std::env::var("HOME")
                .map_err(|_| Error::Config("HOME environment variable not set".to_string()))?;
            Ok(format!("{}/.config/ring-bridge/config.toml", home))
        }
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Device ids must be unique and parents declared before their children
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for device in &self.devices {
            if let Some(parent) = &device.parent {
                if !seen.contains(parent.as_str()) {
                    return Err(Error::Config(format!(
                        "Device '{}' refers to parent '{}' which is not declared before it",
                        device.id, parent
                    )));
                }
            }
            if !seen.insert(device.id.as_str()) {
                return Err(Error::Config(format!("Duplicate device id '{}'", device.id)));
            }
        }
        Ok(())
    }
}
