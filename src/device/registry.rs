use crate::error::{Error, Result};
use crate::ha_mqtt::{DiscoveryMessage, EntitySpec};
use regex::Regex;
use std::collections::BTreeMap;

/// One registered entity: its declaration plus the topics derived for it
/// on first discovery publish
#[derive(Debug, Clone)]
pub struct Entity {
    key: String,
    spec: EntitySpec,
    attribute_filter: Option<Regex>,
    topics: BTreeMap<String, String>,
    published: bool,
}

impl Entity {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn spec(&self) -> &EntitySpec {
        &self.spec
    }

    pub fn attribute_filter(&self) -> Option<&Regex> {
        self.attribute_filter.as_ref()
    }

    pub fn is_published(&self) -> bool {
        self.published
    }

    /// A derived topic such as `state_topic` or `json_attributes_topic`
    pub fn topic(&self, field: &str) -> Option<&str> {
        self.topics.get(field).map(String::as_str)
    }

    pub fn topics(&self) -> &BTreeMap<String, String> {
        &self.topics
    }

    pub fn set_topic(&mut self, field: impl Into<String>, topic: impl Into<String>) {
        self.topics.insert(field.into(), topic.into());
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.key.as_str(), "stream" | "event_stream")
    }
}

/// Entities of one device, in declaration order
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<String>, spec: EntitySpec) -> Result<()> {
        let key = key.into();
        if self.get(&key).is_some() {
            return Err(Error::DuplicateEntity(key));
        }
        let attribute_filter = spec.validate(&key)?;
        self.entities.push(Entity {
            key,
            spec,
            attribute_filter,
            topics: BTreeMap::new(),
            published: false,
        });
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.key == key)
    }

    pub fn entity_mut(&mut self, key: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Record a published discovery message for `key`.
    ///
    /// The first call marks the entity published, stores every topic field
    /// of the message and returns the command topics that need wiring.
    /// Later calls return `None` and change nothing.
    pub fn mark_published(&mut self, key: &str, message: &DiscoveryMessage) -> Option<Vec<String>> {
        let entity = self.entity_mut(key)?;
        if entity.published {
            return None;
        }
        entity.published = true;

        let mut command_topics = Vec::new();
        for (field, topic) in message.topics() {
            entity.set_topic(field, topic);
            if field.contains("command_topic") {
                command_topics.push(topic.to_string());
            }
        }
        Some(command_topics)
    }
}
