//! Discovery message composition.
//!
//! A discovery message is built by walking [`RULES`] in order. Each rule
//! has a predicate over the entity being described and a function adding
//! its fields. Rules only ever add keys, except that a later rule may
//! overwrite the value of a key an earlier one wrote (climate entities
//! replace their `mode_state_topic`); the key keeps its original position
//! so the serialized output is stable.

use crate::error::Result;
use crate::ha_mqtt::{Attributes, Component, DeviceTopics, EntitySpec};
use serde::Serialize;
use serde_json::{Map, Value};

const INFO_ENTITY: &str = "info";
const INFO_ICON: &str = "mdi:information-outline";
const FAN_PRESET_MODES: [&str; 3] = ["low", "medium", "high"];
const FAN_SPEED_RANGE: (u32, u32) = (11, 100);
const CLIMATE_TEMP_RANGE: (u32, u32) = (10, 37);

/// Device block attached to every discovery message so the hub groups
/// entities under one device
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HomeAssistantDevice {
    #[serde(rename = "ids")]
    pub identifiers: String,
    pub name: String,
    #[serde(rename = "mdl")]
    pub model: String,
    #[serde(rename = "mf")]
    pub manufacturer: String,
    #[serde(rename = "sw", skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_device: Option<String>,
}

/// Everything about the owning device the composer needs
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryContext<'a> {
    pub device_id: &'a str,
    pub device: &'a HomeAssistantDevice,
    pub topics: &'a DeviceTopics,
    pub disarm_code: Option<&'a str>,
}

/// A composed, protocol-ready discovery payload
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct DiscoveryMessage(Map<String, Value>);

impl DiscoveryMessage {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// All `*topic*` fields with their values, in message order
    pub fn topics(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(field, _)| field.contains("topic"))
            .filter_map(|(field, value)| value.as_str().map(|v| (field.as_str(), v)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

struct RuleInput<'a> {
    ctx: DiscoveryContext<'a>,
    key: &'a str,
    spec: &'a EntitySpec,
    entity_topic: String,
    state_topic: String,
    device: Value,
}

impl RuleInput<'_> {
    fn topic(&self, suffix: &str) -> Value {
        Value::String(format!("{}/{}", self.entity_topic, suffix))
    }
}

type Fields = Map<String, Value>;

struct Rule {
    name: &'static str,
    applies: fn(&RuleInput) -> bool,
    fields: fn(&RuleInput, &mut Fields),
}

const RULES: &[Rule] = &[
    Rule {
        name: "name",
        applies: always,
        fields: name_field,
    },
    Rule {
        name: "unique_id",
        applies: always,
        fields: unique_id_field,
    },
    Rule {
        name: "state_topic",
        applies: always,
        fields: state_topic_field,
    },
    Rule {
        name: "command_topic",
        applies: |input| input.spec.component.is_commandable(),
        fields: |input, fields| {
            fields.insert("command_topic".into(), input.topic("command"));
        },
    },
    Rule {
        name: "passthrough",
        applies: always,
        fields: passthrough_fields,
    },
    Rule {
        name: "json_attributes_topic",
        applies: |input| {
            matches!(input.spec.attributes, Some(Attributes::Filter(_))) || input.key == INFO_ENTITY
        },
        fields: attributes_topic_field,
    },
    Rule {
        name: "icon",
        applies: |input| input.spec.icon.is_some() || input.key == INFO_ENTITY,
        fields: |input, fields| {
            let icon = input.spec.icon.as_deref().unwrap_or(INFO_ICON);
            fields.insert("icon".into(), icon.into());
        },
    },
    Rule {
        name: "alarm_code",
        applies: |input| {
            input.spec.component == Component::AlarmControlPanel && input.ctx.disarm_code.is_some()
        },
        fields: |input, fields| {
            if let Some(code) = input.ctx.disarm_code {
                fields.insert("code".into(), code.into());
                fields.insert("code_arm_required".into(), false.into());
                fields.insert("code_disarm_required".into(), true.into());
            }
        },
    },
    Rule {
        name: "brightness",
        applies: |input| input.spec.brightness_scale.is_some(),
        fields: |input, fields| {
            fields.insert("brightness_state_topic".into(), input.topic("brightness_state"));
            fields.insert("brightness_command_topic".into(), input.topic("brightness_command"));
            if let Some(scale) = input.spec.brightness_scale {
                fields.insert("brightness_scale".into(), scale.into());
            }
        },
    },
    Rule {
        name: "fan",
        applies: |input| input.spec.component == Component::Fan,
        fields: fan_fields,
    },
    Rule {
        name: "climate",
        applies: |input| input.spec.component == Component::Climate,
        fields: climate_fields,
    },
    Rule {
        name: "select",
        applies: |input| input.spec.component == Component::Select,
        fields: |input, fields| {
            if let Some(options) = &input.spec.options {
                fields.insert("options".into(), options.clone().into());
            }
        },
    },
    Rule {
        name: "availability",
        applies: always,
        fields: |input, fields| {
            fields.insert(
                "availability_topic".into(),
                input.ctx.topics.availability_topic.clone().into(),
            );
            fields.insert("payload_available".into(), "online".into());
            fields.insert("payload_not_available".into(), "offline".into());
            fields.insert("device".into(), input.device.clone());
        },
    },
];

fn always(_: &RuleInput) -> bool {
    true
}

fn name_field(input: &RuleInput, fields: &mut Fields) {
    let device_name = &input.ctx.device.name;
    let name = match &input.spec.name {
        Some(name) => name.clone(),
        None if input.spec.is_legacy_entity
            || device_name
                .to_lowercase()
                .contains(&input.key.to_lowercase()) =>
        {
            device_name.clone()
        }
        None => format!("{} {}", device_name, title_case(input.key)),
    };
    fields.insert("name".into(), name.into());
}

fn unique_id_field(input: &RuleInput, fields: &mut Fields) {
    let unique_id = match &input.spec.unique_id {
        Some(id) => id.clone(),
        None if input.spec.is_legacy_entity => input.ctx.device_id.to_string(),
        None => format!("{}_{}", input.ctx.device_id, input.key),
    };
    fields.insert("unique_id".into(), unique_id.into());
}

fn state_topic_field(input: &RuleInput, fields: &mut Fields) {
    fields.insert(
        input.spec.component.state_topic_field().into(),
        input.state_topic.clone().into(),
    );
}

fn passthrough_fields(input: &RuleInput, fields: &mut Fields) {
    let spec = input.spec;
    let strings = [
        ("device_class", &spec.device_class),
        ("unit_of_measurement", &spec.unit_of_measurement),
        ("state_class", &spec.state_class),
        ("value_template", &spec.value_template),
    ];
    for (field, value) in strings {
        if let Some(value) = value {
            fields.insert(field.into(), value.clone().into());
        }
    }
    for (field, value) in [("min", &spec.min), ("max", &spec.max)] {
        if let Some(value) = value {
            fields.insert(field.into(), Value::Number(value.clone()));
        }
    }
}

fn attributes_topic_field(input: &RuleInput, fields: &mut Fields) {
    // The info entity reports its attributes on its own state topic
    let topic = match input.spec.attributes {
        Some(Attributes::Filter(_)) => input.topic("attributes"),
        _ => input.state_topic.clone().into(),
    };
    fields.insert("json_attributes_topic".into(), topic);
}

fn fan_fields(input: &RuleInput, fields: &mut Fields) {
    fields.insert("percentage_state_topic".into(), input.topic("percent_speed_state"));
    fields.insert("percentage_command_topic".into(), input.topic("percent_speed_command"));
    fields.insert("preset_mode_state_topic".into(), input.topic("speed_state"));
    fields.insert("preset_mode_command_topic".into(), input.topic("speed_command"));
    fields.insert("preset_modes".into(), FAN_PRESET_MODES.to_vec().into());
    fields.insert("speed_range_min".into(), FAN_SPEED_RANGE.0.into());
    fields.insert("speed_range_max".into(), FAN_SPEED_RANGE.1.into());
}

fn climate_fields(input: &RuleInput, fields: &mut Fields) {
    let modes = input.spec.modes.clone().unwrap_or_default();

    fields.insert("action_topic".into(), input.topic("action_state"));
    fields.insert("aux_state_topic".into(), input.topic("aux_state"));
    fields.insert("aux_command_topic".into(), input.topic("aux_command"));
    fields.insert("current_temperature_topic".into(), input.topic("current_temperature_state"));
    if let Some(fan_modes) = &input.spec.fan_modes {
        fields.insert("fan_modes".into(), fan_modes.clone().into());
    }
    fields.insert("fan_mode_state_topic".into(), input.topic("fan_mode_state"));
    fields.insert("fan_mode_command_topic".into(), input.topic("fan_mode_command"));
    fields.insert("max_temp".into(), CLIMATE_TEMP_RANGE.1.into());
    fields.insert("min_temp".into(), CLIMATE_TEMP_RANGE.0.into());
    fields.insert("modes".into(), modes.clone().into());
    fields.insert("mode_state_topic".into(), input.topic("mode_state"));
    fields.insert("mode_command_topic".into(), input.topic("mode_command"));
    fields.insert("temperature_state_topic".into(), input.topic("temperature_state"));
    fields.insert("temperature_command_topic".into(), input.topic("temperature_command"));
    if modes.iter().any(|mode| mode == "auto") {
        for field in [
            "temperature_high_state",
            "temperature_high_command",
            "temperature_low_state",
            "temperature_low_command",
        ] {
            fields.insert(format!("{}_topic", field), input.topic(field));
        }
    }
    fields.insert("temperature_unit".into(), "C".into());
}

/// `"motion_sensor"` -> `"Motion Sensor"`
pub fn title_case(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the discovery message for one entity. Pure: identical inputs
/// always produce an identical message.
pub fn compose(ctx: DiscoveryContext<'_>, key: &str, spec: &EntitySpec) -> Result<DiscoveryMessage> {
    let input = RuleInput {
        ctx,
        key,
        spec,
        entity_topic: ctx.topics.entity_topic(key),
        state_topic: ctx.topics.state_topic(key, spec),
        device: serde_json::to_value(ctx.device)?,
    };

    let mut fields = Map::new();
    for rule in RULES {
        if (rule.applies)(&input) {
            tracing::trace!("Applying discovery rule '{}' to entity '{}'", rule.name, key);
            (rule.fields)(&input, &mut fields);
        }
    }
    Ok(DiscoveryMessage(fields))
}
