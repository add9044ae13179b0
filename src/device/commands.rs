//! Command-topic wiring, done once per entity on its first discovery publish.

use crate::bus::{Channel, CommandHandler, MessageBus};
use crate::device::{Device, Trace};
use crate::ha_mqtt::stream_debug_topic;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Subscribe to `command_topic` and forward valid messages to the device
/// type's command processing.
pub fn subscribe_command_topic(bus: &dyn MessageBus, device: &Arc<Device>, command_topic: &str) {
    bus.subscribe(command_topic, Channel::Broker);
    bus.on_message(command_topic, command_handler(Arc::downgrade(device), device.name()));
}

/// Stream entities also listen on the local IPC broker, plus a debug
/// channel the stream helper logs through.
pub fn subscribe_stream_topics(bus: &dyn MessageBus, device: &Device, command_topic: &str) {
    bus.subscribe(command_topic, Channel::Ipc);

    let debug_topic = stream_debug_topic(command_topic);
    bus.subscribe(&debug_topic, Channel::Ipc);

    let publisher = device.publisher().clone();
    let name = device.name().to_string();
    let handler: CommandHandler = Arc::new(move |topic, message| match message {
        Some(message) => publisher.trace(Trace::Stream, topic, message),
        None => debug!("[{}] Received invalid or null value to debug log topic {}", name, topic),
    });
    bus.on_message(&debug_topic, handler);
}

fn command_handler(device: Weak<Device>, name: &str) -> CommandHandler {
    let name = name.to_string();
    Arc::new(move |topic, message| {
        let Some(message) = message else {
            debug!("[{}] Received invalid or null value to command topic {}", name, topic);
            return;
        };
        match device.upgrade() {
            Some(device) => device.process_command(topic, message),
            None => debug!("[{}] Dropping command for released device on {}", name, topic),
        }
    })
}
