pub mod component;
pub mod discovery;
pub mod entity;
pub mod handlers;
pub mod init;
pub mod topics;

pub use component::Component;
pub use discovery::{
    compose, title_case, DiscoveryContext, DiscoveryMessage, HomeAssistantDevice,
};
pub use entity::{Attributes, EntitySpec};
pub use handlers::TopicHandlers;
pub use init::{
    drain_until_disconnect, initialize_mqtt_connection, run_event_loop, MqttBus, OutboundForwarder,
};
pub use topics::{config_topic, stream_debug_topic, DeviceTopics};
