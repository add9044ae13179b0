//! Bridge between vendor cloud devices and a Home Assistant style MQTT hub.
//!
//! Devices describe their entities declaratively; the engine in [`device`]
//! derives topics, composes discovery messages, wires command topics,
//! tracks availability and refreshes attributes on a schedule.

pub mod bridge;
pub mod bus;
pub mod device;
pub mod devices;
pub mod error;
pub mod ha_mqtt;
pub mod shutdown;
pub mod state;
pub mod utils;

pub use error::{Error, Result};
