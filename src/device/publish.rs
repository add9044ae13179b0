//! Single egress point for everything a device publishes.

use crate::bus::MessageBus;
use crate::device::EntityRegistry;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Debug trace category attached to a publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    Off,
    Mqtt,
    Discovery,
    Attributes,
    Stream,
}

impl Trace {
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Trace::Off => None,
            Trace::Mqtt => Some("mqtt"),
            Trace::Discovery => Some("disc"),
            Trace::Attributes => Some("attr"),
            Trace::Stream => Some("rtsp"),
        }
    }
}

#[derive(Clone)]
pub struct Publisher {
    bus: Arc<dyn MessageBus>,
    device_name: String,
}

impl Publisher {
    pub fn new(bus: Arc<dyn MessageBus>, device_name: impl Into<String>) -> Self {
        Self {
            bus,
            device_name: device_name.into(),
        }
    }

    /// Publish `payload` to `topic`. When traced, `masked` replaces the
    /// payload in the log line so secrets never reach the logs.
    pub fn publish(&self, topic: &str, payload: impl Into<String>, trace: Trace, masked: Option<&str>) {
        let payload = payload.into();
        self.trace(trace, topic, masked.unwrap_or(&payload));
        self.bus.publish(topic, payload);
    }

    /// Emit the debug line for traffic on `topic` under `trace`
    pub fn trace(&self, trace: Trace, topic: &str, payload: &str) {
        if let Some(kind) = trace.kind() {
            debug!(kind, topic, payload, "[{}] {} {}", self.device_name, topic, payload);
        }
    }

    /// Publish the matching subset of `attributes` to every entity that
    /// declares an attribute filter. Entities matching nothing publish nothing.
    pub fn publish_attribute_entities(&self, registry: &EntityRegistry, attributes: &Map<String, Value>) {
        for entity in registry.iter() {
            let (Some(filter), Some(topic)) = (entity.attribute_filter(), entity.topic("json_attributes_topic")) else {
                continue;
            };
            let selected = filter_attributes(attributes, filter);
            if selected.is_empty() {
                continue;
            }
            self.publish(topic, Value::Object(selected).to_string(), Trace::Attributes, None);
        }
    }
}

pub fn filter_attributes(attributes: &Map<String, Value>, filter: &Regex) -> Map<String, Value> {
    attributes
        .iter()
        .filter(|(key, _)| filter.is_match(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
