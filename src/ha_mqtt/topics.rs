//! Topic hierarchy for a device and its entities:
//! `{root}/{location}/{category}/{device}[/{entity}[/{suffix}]]`.

use crate::ha_mqtt::{Component, EntitySpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTopics {
    pub device_topic: String,
    pub availability_topic: String,
}

impl DeviceTopics {
    pub fn new(root: &str, location_id: &str, category: &str, device_id: &str) -> Self {
        let device_topic = format!("{}/{}/{}/{}", root, location_id, category, device_id);
        let availability_topic = format!("{}/status", device_topic);
        Self {
            device_topic,
            availability_topic,
        }
    }

    pub fn entity_topic(&self, entity_key: &str) -> String {
        format!("{}/{}", self.device_topic, entity_key)
    }

    /// State topic for an entity: the parent entity's topic when the entity
    /// borrows one, `image` for cameras and `state` for everything else.
    pub fn state_topic(&self, entity_key: &str, spec: &EntitySpec) -> String {
        match (&spec.parent_state_topic, spec.component) {
            (Some(parent), _) => format!("{}/{}", self.device_topic, parent),
            (None, Component::Camera) => format!("{}/image", self.entity_topic(entity_key)),
            (None, _) => format!("{}/state", self.entity_topic(entity_key)),
        }
    }
}

/// Topic the discovery message for one entity is published to
pub fn config_topic(root: &str, device_id: &str, component: Component, entity_key: &str) -> String {
    format!("{}/config/{}/{}/{}", root, device_id, component, entity_key)
}

/// Debug log channel of a stream helper, a sibling of its command topic
pub fn stream_debug_topic(command_topic: &str) -> String {
    match command_topic.rsplit_once('/') {
        Some((base, _)) => format!("{}/debug", base),
        None => "/debug".to_string(),
    }
}
