//! Startup and re-announcement of all devices.

use crate::bus::{Channel, CommandHandler, MessageBus};
use crate::device::Device;
use std::sync::Arc;
use tracing::{error, info};

/// Publish discovery for every device, bring it online and start its
/// attribute refresh.
pub async fn start_devices(devices: &[Arc<Device>]) {
    for device in devices {
        if let Err(e) = device.publish_discovery() {
            error!("Failed to publish discovery for {}: {}", device.device_id(), e);
            continue;
        }
        device.online().await;
        device.publish_attributes();
        device.start();
    }
}

/// Re-publish discovery whenever the hub reports it came back online, so a
/// restarted hub picks every entity up again.
pub fn republish_on_hub_online(bus: &dyn MessageBus, status_topic: &str, devices: Vec<Arc<Device>>) {
    bus.subscribe(status_topic, Channel::Broker);
    let handler: CommandHandler = Arc::new(move |topic, message| {
        if message != Some("online") {
            return;
        }
        info!("Hub status on {} is online, republishing discovery", topic);
        let devices = devices.clone();
        tokio::spawn(async move {
            for device in &devices {
                if let Err(e) = device.publish_discovery() {
                    error!("Failed to republish discovery for {}: {}", device.device_id(), e);
                    continue;
                }
                if device.is_online() {
                    device.online().await;
                }
            }
        });
    });
    bus.on_message(status_topic, handler);
}
