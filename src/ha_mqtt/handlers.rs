use crate::bus::CommandHandler;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Dispatch table from topic to the handlers registered for it
#[derive(Default)]
pub struct TopicHandlers {
    handlers: RwLock<HashMap<String, Vec<CommandHandler>>>,
}

impl TopicHandlers {
    /// Creates a new empty TopicHandlers instance.
    ///
    /// # Examples
    /// ```
    /// let handlers = ring_bridge::ha_mqtt::TopicHandlers::new();
    /// assert!(handlers.get_subscription_topics().is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, topic: &str, handler: CommandHandler) {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.entry(topic.to_string()).or_default().push(handler);
    }

    pub fn handler_count(&self, topic: &str) -> usize {
        let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        handlers.get(topic).map_or(0, Vec::len)
    }

    /// Handle an incoming message and return true if any handler received it
    pub fn dispatch(&self, topic: &str, payload: &[u8]) -> bool {
        // Clone the handler list so callbacks may register further handlers
        let matched = {
            let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
            handlers.get(topic).cloned()
        };

        let Some(matched) = matched else {
            debug!("No handler registered for topic '{}'", topic);
            return false;
        };

        let payload = String::from_utf8_lossy(payload);
        let message = (!payload.is_empty()).then_some(payload.as_ref());

        for handler in &matched {
            handler(topic, message);
        }
        true
    }

    /// Get all topics that need to be subscribed to
    pub fn get_subscription_topics(&self) -> Vec<String> {
        let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        let mut topics: Vec<String> = handlers.keys().cloned().collect();
        topics.sort();
        topics
    }
}
