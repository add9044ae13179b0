use rumqttc::EventLoop;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{debug, error, info};

use crate::device::Device;
use crate::error::Result;
use crate::ha_mqtt::{drain_until_disconnect, MqttBus};

pub struct ShutdownHandler {
    sigterm: Signal,
    sigint: Signal,
}

impl ShutdownHandler {
    pub fn new() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate())?;
        let sigint = signal(SignalKind::interrupt())?;

        Ok(ShutdownHandler { sigterm, sigint })
    }

    pub async fn wait_for_shutdown_signal(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.sigint.recv() => ShutdownSignal::Interrupt,
            _ = self.sigterm.recv() => ShutdownSignal::Terminate,
        }
    }
}

#[derive(Debug)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    pub fn description(&self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT (Ctrl+C) received",
            ShutdownSignal::Terminate => "SIGTERM received",
        }
    }
}

/// Upper bound on flushing the final offline messages
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn perform_graceful_shutdown(
    devices: &[Arc<Device>],
    bus: &MqttBus,
    eventloop: &mut EventLoop,
) {
    info!("Shutting down {} device(s)", devices.len());

    // Stop refresh loops first so nothing goes back online
    for device in devices {
        device.shutdown();
        device.offline();
    }

    // The disconnect queues behind every offline message
    info!("Disconnecting from MQTT broker...");
    bus.disconnect();
    if drain_until_disconnect(eventloop, SHUTDOWN_DRAIN_TIMEOUT).await {
        debug!("Successfully disconnected from MQTT broker");
    } else {
        error!("MQTT broker may not have received every offline message");
    }

    info!("Shutdown complete");
}
