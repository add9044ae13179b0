use crate::error::{Error, Result};
use crate::ha_mqtt::Component;
use regex::{Regex, RegexBuilder};
use serde_json::Number;

/// How an entity consumes the device attribute object
#[derive(Debug, Clone, PartialEq)]
pub enum Attributes {
    /// The device publishes its attributes for this entity itself
    PassThrough,
    /// Publish only attribute keys matching this pattern (case-insensitive)
    Filter(String),
}

/// Declarative description of one entity of a device.
///
/// Device types build these with struct update syntax on top of
/// [`EntitySpec::new`]; every optional field left as `None` is simply
/// absent from the discovery message.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpec {
    pub component: Component,
    pub name: Option<String>,
    pub unique_id: Option<String>,
    pub device_class: Option<String>,
    pub unit_of_measurement: Option<String>,
    pub state_class: Option<String>,
    pub value_template: Option<String>,
    pub min: Option<Number>,
    pub max: Option<Number>,
    pub icon: Option<String>,
    pub attributes: Option<Attributes>,
    pub is_legacy_entity: bool,
    pub brightness_scale: Option<u32>,
    pub fan_modes: Option<Vec<String>>,
    pub modes: Option<Vec<String>>,
    pub options: Option<Vec<String>>,
    /// Read state from another entity's topic, relative to the device topic
    pub parent_state_topic: Option<String>,
}

impl EntitySpec {
    pub fn new(component: Component) -> Self {
        Self {
            component,
            name: None,
            unique_id: None,
            device_class: None,
            unit_of_measurement: None,
            state_class: None,
            value_template: None,
            min: None,
            max: None,
            icon: None,
            attributes: None,
            is_legacy_entity: false,
            brightness_scale: None,
            fan_modes: None,
            modes: None,
            options: None,
            parent_state_topic: None,
        }
    }

    /// Check the fields a component cannot be published without and
    /// compile the attribute filter, if any.
    pub fn validate(&self, key: &str) -> Result<Option<Regex>> {
        let missing = |field: &str| Error::InvalidEntity {
            key: key.to_string(),
            reason: format!("{} entities require '{}'", self.component, field),
        };

        match self.component {
            Component::Climate if self.modes.is_none() => return Err(missing("modes")),
            Component::Select if self.options.is_none() => return Err(missing("options")),
            _ => {}
        }

        match &self.attributes {
            Some(Attributes::Filter(pattern)) => Ok(Some(
                RegexBuilder::new(pattern).case_insensitive(true).build()?,
            )),
            _ => Ok(None),
        }
    }
}
