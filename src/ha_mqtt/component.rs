use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Home Assistant component types an entity can be published as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Component {
    Sensor,
    BinarySensor,
    Switch,
    Number,
    Light,
    Fan,
    Lock,
    AlarmControlPanel,
    Select,
    Camera,
    Climate,
}

impl Component {
    pub const ALL: [Component; 11] = [
        Component::Sensor,
        Component::BinarySensor,
        Component::Switch,
        Component::Number,
        Component::Light,
        Component::Fan,
        Component::Lock,
        Component::AlarmControlPanel,
        Component::Select,
        Component::Camera,
        Component::Climate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Sensor => "sensor",
            Component::BinarySensor => "binary_sensor",
            Component::Switch => "switch",
            Component::Number => "number",
            Component::Light => "light",
            Component::Fan => "fan",
            Component::Lock => "lock",
            Component::AlarmControlPanel => "alarm_control_panel",
            Component::Select => "select",
            Component::Camera => "camera",
            Component::Climate => "climate",
        }
    }

    /// Whether the hub can send commands to entities of this type
    pub fn is_commandable(&self) -> bool {
        matches!(
            self,
            Component::Switch
                | Component::Number
                | Component::Light
                | Component::Fan
                | Component::Lock
                | Component::AlarmControlPanel
                | Component::Select
        )
    }

    /// Discovery field carrying the entity's primary state topic
    pub fn state_topic_field(&self) -> &'static str {
        match self {
            Component::Camera => "topic",
            Component::Climate => "mode_state_topic",
            _ => "state_topic",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Component {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Component::ALL
            .into_iter()
            .find(|component| component.as_str() == s)
            .ok_or_else(|| Error::UnknownComponent(s.to_string()))
    }
}

impl TryFrom<String> for Component {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Component> for String {
    fn from(component: Component) -> Self {
        component.as_str().to_string()
    }
}
