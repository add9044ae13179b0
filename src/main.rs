use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use ring_bridge::bridge::{republish_on_hub_online, start_devices};
use ring_bridge::device::BridgeContext;
use ring_bridge::devices::create_devices;
use ring_bridge::ha_mqtt::{initialize_mqtt_connection, run_event_loop};
use ring_bridge::shutdown::{perform_graceful_shutdown, ShutdownHandler};
use ring_bridge::state::{FileStateStore, MemoryStateStore, StateStore};
use ring_bridge::utils::{init_tracing, Config, VersionInfo};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;

    info!("Starting {}", VersionInfo::get().banner());
    info!("Connecting to MQTT broker: {}:{}", config.mqtt_url, config.mqtt_port);

    let (bus, forwarder, mut eventloop) = initialize_mqtt_connection(&config);
    tokio::spawn(forwarder.run());

    let store: Arc<dyn StateStore> = match &config.state_file {
        Some(path) => Arc::new(FileStateStore::open(path)?),
        None => Arc::new(MemoryStateStore::new()),
    };
    let context = BridgeContext::new(bus.clone(), store, &config);

    let handles = create_devices(&config.devices, &context)?;
    let devices: Vec<_> = handles.iter().map(|handle| handle.device().clone()).collect();
    info!("Created {} device(s)", devices.len());

    republish_on_hub_online(bus.as_ref(), &config.hass_status_topic, devices.clone());

    // Startup publishes are queued while the event loop below drains them
    let startup_devices = devices.clone();
    let startup = tokio::spawn(async move { start_devices(&startup_devices).await });

    let mut shutdown_handler = ShutdownHandler::new()?;
    let retry_interval = Duration::from_millis(config.update_interval_ms);

    tokio::select! {
        signal = shutdown_handler.wait_for_shutdown_signal() => {
            info!("{}", signal.description());
        }
        _ = run_event_loop(&bus, &mut eventloop, retry_interval) => {
            warn!("MQTT event loop ended unexpectedly");
        }
    }

    startup.abort();
    perform_graceful_shutdown(&devices, &bus, &mut eventloop).await;

    Ok(())
}
