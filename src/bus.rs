//! Message bus contract used by devices for every outbound publish and
//! every command subscription.

use std::sync::Arc;

/// Callback invoked with `(topic, payload)` when a message arrives on a
/// subscribed topic. Empty payloads are delivered as `None`.
pub type CommandHandler = Arc<dyn Fn(&str, Option<&str>) + Send + Sync>;

/// Which side a subscription is requested on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// The home-automation broker
    Broker,
    /// Local IPC broker used by stream helper processes
    Ipc,
}

pub trait MessageBus: Send + Sync {
    /// Queue a payload for `topic`. Implementations keep issue order.
    fn publish(&self, topic: &str, payload: String);

    /// Ask the bus to start delivering messages for `topic`.
    fn subscribe(&self, topic: &str, channel: Channel);

    /// Register a handler for messages arriving on `topic`.
    fn on_message(&self, topic: &str, handler: CommandHandler);
}
