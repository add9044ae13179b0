//! Per-device saved state. Device types persist small bits of data (last
//! arming state, user settings) across restarts through [`StateStore`].

use crate::error::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub trait StateStore: Send + Sync {
    fn get(&self, device_id: &str) -> Option<Value>;
    fn set(&self, device_id: &str, state: Value);
}

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<String, Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, device_id: &str) -> Option<Value> {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get(device_id).cloned()
    }

    fn set(&self, device_id: &str, state: Value) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.insert(device_id.to_string(), state);
    }
}

/// JSON file holding one object keyed by device id, rewritten on every set
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    states: Mutex<Map<String, Value>>,
}

impl FileStateStore {
    /// Load saved state from `path`; a missing file starts empty
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let states = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            debug!("No saved state at {}, starting empty", path.display());
            Map::new()
        };
        Ok(Self {
            path,
            states: Mutex::new(states),
        })
    }

    fn save(&self, states: &Map<String, Value>) -> Result<()> {
        let contents = serde_json::to_string_pretty(states)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn get(&self, device_id: &str) -> Option<Value> {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get(device_id).cloned()
    }

    fn set(&self, device_id: &str, state: Value) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.insert(device_id.to_string(), state);
        if let Err(e) = self.save(&states) {
            warn!("Failed to save state to {}: {}", self.path.display(), e);
        }
    }
}
