//! Built-in device types and construction from configuration.

pub mod motion_sensor;

pub use motion_sensor::{MotionData, MotionSensor};

use crate::device::{BridgeContext, Device, DeviceBehavior, DeviceInfo, PrimaryAttribute};
use crate::error::{Error, Result};
use crate::utils::{DeviceConfig, DeviceKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_MANUFACTURER: &str = "Ring";

impl DeviceKind {
    fn category(&self) -> &'static str {
        match self {
            DeviceKind::MotionSensor => "alarm",
        }
    }

    fn model(&self) -> &'static str {
        match self {
            DeviceKind::MotionSensor => "Motion Sensor",
        }
    }

    fn primary_attribute(&self) -> PrimaryAttribute {
        match self {
            DeviceKind::MotionSensor => PrimaryAttribute::Key("commStatus".to_string()),
        }
    }

}

/// A configured device together with its typed behavior, so the vendor
/// state client can feed readings to the concrete device type.
#[derive(Clone)]
pub enum DeviceHandle {
    MotionSensor {
        device: Arc<Device>,
        sensor: Arc<MotionSensor>,
    },
}

impl DeviceHandle {
    fn build(kind: DeviceKind, info: DeviceInfo, context: &BridgeContext) -> Result<Self> {
        match kind {
            DeviceKind::MotionSensor => {
                let sensor = Arc::new(MotionSensor::new());
                let behavior: Arc<dyn DeviceBehavior> = sensor.clone();
                let device = Device::new(info, kind.primary_attribute(), behavior, context)?;
                Ok(DeviceHandle::MotionSensor { device, sensor })
            }
        }
    }

    pub fn device(&self) -> &Arc<Device> {
        match self {
            DeviceHandle::MotionSensor { device, .. } => device,
        }
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            DeviceHandle::MotionSensor { .. } => DeviceKind::MotionSensor,
        }
    }
}

/// Build every configured device. Parents must precede their children.
pub fn create_devices(configs: &[DeviceConfig], context: &BridgeContext) -> Result<Vec<DeviceHandle>> {
    let mut by_id: HashMap<&str, Arc<Device>> = HashMap::new();
    let mut handles = Vec::with_capacity(configs.len());

    for config in configs {
        let parent = match &config.parent {
            Some(id) => Some(by_id.get(id.as_str()).cloned().ok_or_else(|| {
                Error::Config(format!("Unknown parent '{}' for device '{}'", id, config.id))
            })?),
            None => None,
        };

        let info = DeviceInfo {
            device_id: config.id.clone(),
            location_id: config.location_id.clone(),
            category: config
                .category
                .clone()
                .unwrap_or_else(|| config.kind.category().to_string()),
            name: config.name.clone(),
            manufacturer: DEFAULT_MANUFACTURER.to_string(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| config.kind.model().to_string()),
            parent,
        };

        debug!("Creating {:?} device '{}'", config.kind, config.id);
        let handle = DeviceHandle::build(config.kind, info, context)?;
        by_id.insert(config.id.as_str(), handle.device().clone());
        handles.push(handle);
    }

    Ok(handles)
}
