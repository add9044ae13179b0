use crate::device::{Device, DeviceBehavior};
use crate::ha_mqtt::{Attributes, Component, EntitySpec};
use serde_json::{Map, Value};
use std::sync::Mutex;

/// Last known readings of a motion sensor, fed by the vendor API client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionData {
    pub faulted: bool,
    pub battery_level: Option<u8>,
    pub tamper_status: Option<String>,
    pub comm_status: Option<String>,
}

#[derive(Debug, Default)]
pub struct MotionSensor {
    data: Mutex<MotionData>,
}

impl MotionSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> MotionData {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Store new readings and, when the device is online, publish them
    pub fn update(&self, device: &Device, data: MotionData) {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = data;
        if device.is_online() {
            self.publish_state(device);
            device.publish_attributes();
        }
    }

    pub fn publish_state(&self, device: &Device) {
        let state = if self.data().faulted { "ON" } else { "OFF" };
        device.publish_entity_state("motion", state);
    }
}

impl DeviceBehavior for MotionSensor {
    fn entities(&self) -> Vec<(String, EntitySpec)> {
        vec![
            (
                "motion".to_string(),
                EntitySpec {
                    device_class: Some("motion".to_string()),
                    is_legacy_entity: true,
                    ..EntitySpec::new(Component::BinarySensor)
                },
            ),
            (
                "battery".to_string(),
                EntitySpec {
                    device_class: Some("battery".to_string()),
                    unit_of_measurement: Some("%".to_string()),
                    state_class: Some("measurement".to_string()),
                    parent_state_topic: Some("info/state".to_string()),
                    attributes: Some(Attributes::Filter("batt".to_string())),
                    value_template: Some(
                        "{{ value_json[\"batteryLevel\"] | default(\"\") }}".to_string(),
                    ),
                    ..EntitySpec::new(Component::Sensor)
                },
            ),
            (
                "tamper".to_string(),
                EntitySpec {
                    device_class: Some("problem".to_string()),
                    parent_state_topic: Some("info/state".to_string()),
                    attributes: Some(Attributes::Filter("tamper".to_string())),
                    value_template: Some(
                        "{% if value_json[\"tamperStatus\"] is equalto \"tamper\" %}ON{% else %}OFF{% endif %}"
                            .to_string(),
                    ),
                    ..EntitySpec::new(Component::BinarySensor)
                },
            ),
        ]
    }

    fn attributes(&self) -> Option<Map<String, Value>> {
        let data = self.data();
        let mut attributes = Map::new();
        if let Some(level) = data.battery_level {
            attributes.insert("batteryLevel".into(), level.into());
        }
        if let Some(status) = data.tamper_status {
            attributes.insert("tamperStatus".into(), status.into());
        }
        if let Some(status) = data.comm_status {
            attributes.insert("commStatus".into(), status.into());
        }
        Some(attributes).filter(|a| !a.is_empty())
    }
}
