use crate::device::{AvailabilityState, Device};
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

pub const ONLINE_REFRESH_INTERVAL: Duration = Duration::from_secs(300);
/// Shorter while offline so recovery is picked up sooner
pub const OFFLINE_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

pub fn refresh_interval(state: AvailabilityState) -> Duration {
    match state {
        AvailabilityState::Offline => OFFLINE_REFRESH_INTERVAL,
        AvailabilityState::Online | AvailabilityState::Unpublished => ONLINE_REFRESH_INTERVAL,
    }
}

/// Republish device attributes on a schedule until the device shuts down
/// or is dropped.
pub fn spawn_attribute_refresh(device: Weak<Device>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let Some((interval, shutdown)) = device
                .upgrade()
                .map(|d| (refresh_interval(d.availability_state()), d.shutdown_flag().clone()))
            else {
                break;
            };

            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = shutdown.cancelled() => {
                    debug!("Attribute refresh cancelled");
                    break;
                }
            }

            let Some(device) = device.upgrade() else {
                break;
            };
            if device.is_online() {
                device.publish_attributes();
            }
        }
    })
}
