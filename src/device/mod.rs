//! Generic device engine shared by every device type.
//!
//! A [`Device`] owns the topic layout, the entity registry, availability and
//! the attribute refresh task. Concrete device types only describe their
//! entities and react to commands through [`DeviceBehavior`].

pub mod availability;
pub mod commands;
pub mod publish;
pub mod refresh;
pub mod registry;
pub mod shutdown;

pub use availability::{AvailabilityState, AvailabilityTracker, ONLINE_SETTLE_DELAY};
pub use publish::{filter_attributes, Publisher, Trace};
pub use refresh::{refresh_interval, OFFLINE_REFRESH_INTERVAL, ONLINE_REFRESH_INTERVAL};
pub use registry::{Entity, EntityRegistry};
pub use shutdown::ShutdownFlag;

use crate::bus::MessageBus;
use crate::error::Result;
use crate::ha_mqtt::{
    compose, config_topic, Component, DeviceTopics, DiscoveryContext, EntitySpec,
    HomeAssistantDevice,
};
use crate::state::StateStore;
use crate::utils::Config;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Shared collaborators and global settings every device is built with
#[derive(Clone)]
pub struct BridgeContext {
    pub bus: Arc<dyn MessageBus>,
    pub store: Arc<dyn StateStore>,
    pub root_topic: String,
    pub disarm_code: Option<String>,
}

impl BridgeContext {
    pub fn new(bus: Arc<dyn MessageBus>, store: Arc<dyn StateStore>, config: &Config) -> Self {
        Self {
            bus,
            store,
            root_topic: config.root_topic.clone(),
            disarm_code: config.disarm_code.as_ref().map(ToString::to_string),
        }
    }
}

/// Identity and descriptive data of a device
#[derive(Clone)]
pub struct DeviceInfo {
    pub device_id: String,
    pub location_id: String,
    pub category: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub parent: Option<Arc<Device>>,
}

/// Attribute the `info` entity shows as its state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryAttribute {
    /// No info entity and no attribute refresh
    Disabled,
    Key(String),
}

/// Hooks a concrete device type provides to the engine
pub trait DeviceBehavior: Send + Sync + 'static {
    /// Entities of this device type, in publication order
    fn entities(&self) -> Vec<(String, EntitySpec)>;

    fn process_command(&self, device: &Device, command_topic: &str, message: &str) {
        debug!(
            "[{}] No command processing for {} (received '{}')",
            device.name(),
            command_topic,
            message
        );
    }

    /// Current device attributes, if any are known
    fn attributes(&self) -> Option<Map<String, Value>> {
        None
    }
}

pub struct Device {
    device_id: String,
    descriptor: HomeAssistantDevice,
    topics: DeviceTopics,
    context: BridgeContext,
    registry: Mutex<EntityRegistry>,
    availability: AvailabilityTracker,
    publisher: Publisher,
    behavior: Arc<dyn DeviceBehavior>,
    primary_attribute: PrimaryAttribute,
    parent: Option<Weak<Device>>,
    children: Mutex<Vec<Weak<Device>>>,
    shutdown: ShutdownFlag,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl Device {
    /// Build a device and its entity registry. Fails if any declared entity
    /// is invalid.
    pub fn new(
        info: DeviceInfo,
        primary_attribute: PrimaryAttribute,
        behavior: Arc<dyn DeviceBehavior>,
        context: &BridgeContext,
    ) -> Result<Arc<Self>> {
        let topics = DeviceTopics::new(
            &context.root_topic,
            &info.location_id,
            &info.category,
            &info.device_id,
        );

        let mut registry = EntityRegistry::new();
        if let PrimaryAttribute::Key(attribute) = &primary_attribute {
            registry.register("info", info_entity(attribute))?;
        }
        for (key, spec) in behavior.entities() {
            registry.register(key, spec)?;
        }

        let descriptor = HomeAssistantDevice {
            identifiers: info.device_id.clone(),
            name: info.name.clone(),
            model: info.model,
            manufacturer: info.manufacturer,
            sw_version: None,
            via_device: info.parent.as_ref().map(|p| p.device_id.clone()),
        };

        let device = Arc::new(Self {
            availability: AvailabilityTracker::new(topics.availability_topic.clone()),
            publisher: Publisher::new(context.bus.clone(), info.name),
            device_id: info.device_id,
            descriptor,
            topics,
            context: context.clone(),
            registry: Mutex::new(registry),
            behavior,
            primary_attribute,
            parent: info.parent.as_ref().map(Arc::downgrade),
            children: Mutex::new(Vec::new()),
            shutdown: ShutdownFlag::new(),
            refresh_task: Mutex::new(None),
        });

        if let Some(parent) = &info.parent {
            parent.attach_child(&device);
        }
        Ok(device)
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &HomeAssistantDevice {
        &self.descriptor
    }

    pub fn topics(&self) -> &DeviceTopics {
        &self.topics
    }

    pub fn parent(&self) -> Option<Arc<Device>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn children(&self) -> Vec<Arc<Device>> {
        lock(&self.children).iter().filter_map(Weak::upgrade).collect()
    }

    pub fn attach_child(&self, child: &Arc<Device>) {
        lock(&self.children).push(Arc::downgrade(child));
    }

    pub fn registry(&self) -> MutexGuard<'_, EntityRegistry> {
        lock(&self.registry)
    }

    pub fn availability_state(&self) -> AvailabilityState {
        self.availability.state()
    }

    pub fn is_online(&self) -> bool {
        self.availability.is_online()
    }

    pub(crate) fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub fn shutdown_flag(&self) -> &ShutdownFlag {
        &self.shutdown
    }

    /// Start the attribute refresh task when the device has an info entity
    pub fn start(self: &Arc<Self>) {
        if self.primary_attribute == PrimaryAttribute::Disabled {
            return;
        }
        let mut task = lock(&self.refresh_task);
        if task.is_none() {
            *task = Some(refresh::spawn_attribute_refresh(Arc::downgrade(self)));
        }
    }

    /// Suppress further online transitions and stop the refresh task
    pub fn shutdown(&self) {
        self.shutdown.trigger();
        if let Some(task) = lock(&self.refresh_task).take() {
            task.abort();
        }
    }

    fn discovery_context(&self) -> DiscoveryContext<'_> {
        DiscoveryContext {
            device_id: &self.device_id,
            device: &self.descriptor,
            topics: &self.topics,
            disarm_code: self.context.disarm_code.as_deref(),
        }
    }

    /// Publish a discovery message for every entity. On the first publish of
    /// an entity its topics are stored and its command topics wired; later
    /// calls only republish the messages.
    pub fn publish_discovery(self: &Arc<Self>) -> Result<()> {
        let verb = match self.availability_state() {
            AvailabilityState::Unpublished => "Publishing new",
            _ => "Republishing existing",
        };
        info!("{} device id: {}", verb, self.device_id);

        let pending = {
            let mut registry = self.registry();
            let ctx = self.discovery_context();
            let keys: Vec<(String, Component, bool)> = registry
                .iter()
                .map(|e| (e.key().to_string(), e.spec().component, e.is_stream()))
                .collect();

            let mut pending = Vec::with_capacity(keys.len());
            for (key, component, is_stream) in keys {
                let Some(spec) = registry.get(&key).map(|e| e.spec().clone()) else {
                    continue;
                };
                let message = compose(ctx, &key, &spec)?;
                let command_topics = registry.mark_published(&key, &message);
                pending.push((key, component, is_stream, message, command_topics));
            }
            pending
        };

        let bus = self.context.bus.as_ref();
        for (key, component, is_stream, message, command_topics) in pending {
            let topic = config_topic(&self.context.root_topic, &self.device_id, component, &key);
            let payload = message.to_json()?;
            self.publisher.publish(&topic, payload, Trace::Discovery, None);

            for command_topic in command_topics.unwrap_or_default() {
                commands::subscribe_command_topic(bus, self, &command_topic);
                if is_stream {
                    commands::subscribe_stream_topics(bus, self, &command_topic);
                }
            }
        }
        Ok(())
    }

    pub async fn online(&self) {
        self.availability.online(&self.publisher, &self.shutdown).await;
    }

    pub fn offline(&self) {
        self.availability.offline(&self.publisher);
    }

    /// Publish through the device's gateway
    pub fn publish(&self, topic: &str, payload: impl Into<String>, trace: Trace) {
        self.publisher.publish(topic, payload, trace, None);
    }

    pub fn publish_masked(&self, topic: &str, payload: impl Into<String>, masked: &str) {
        self.publisher.publish(topic, payload, Trace::Mqtt, Some(masked));
    }

    /// A topic stored for an entity at its first discovery publish
    pub fn entity_topic(&self, key: &str, field: &str) -> Option<String> {
        self.registry()
            .get(key)
            .and_then(|entity| entity.topic(field))
            .map(str::to_string)
    }

    /// Publish to an entity's primary state topic. Entities that have not
    /// been through discovery yet have no topics and publish nothing.
    pub fn publish_entity_state(&self, key: &str, payload: impl Into<String>) -> bool {
        let topic = {
            let registry = self.registry();
            registry.get(key).and_then(|entity| {
                entity
                    .topic(entity.spec().component.state_topic_field())
                    .map(str::to_string)
            })
        };
        match topic {
            Some(topic) => {
                self.publish(&topic, payload, Trace::Mqtt);
                true
            }
            None => {
                debug!("[{}] Entity '{}' is not published yet", self.name(), key);
                false
            }
        }
    }

    /// Publish the full attribute object for the info entity, then the
    /// filtered subsets for attribute entities
    pub fn publish_attributes(&self) {
        let Some(attributes) = self.behavior.attributes() else {
            return;
        };
        if let Some(topic) = self.entity_topic("info", "state_topic") {
            self.publish(&topic, Value::Object(attributes.clone()).to_string(), Trace::Attributes);
        }
        self.publish_attribute_entities(&attributes);
    }

    pub fn publish_attribute_entities(&self, attributes: &Map<String, Value>) {
        let registry = self.registry();
        self.publisher.publish_attribute_entities(&registry, attributes);
    }

    /// `ring/loc/alarm/dev/siren/command` -> `("siren", "command")`
    pub fn parse_command_topic<'a>(&self, topic: &'a str) -> Option<(&'a str, &'a str)> {
        topic
            .strip_prefix(self.topics.device_topic.as_str())?
            .strip_prefix('/')?
            .split_once('/')
    }

    pub fn process_command(&self, command_topic: &str, message: &str) {
        self.behavior.process_command(self, command_topic, message);
    }

    pub fn saved_state(&self) -> Option<Value> {
        self.context.store.get(&self.device_id)
    }

    pub fn set_saved_state(&self, state: Value) {
        self.context.store.set(&self.device_id, state);
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.refresh_task).take() {
            task.abort();
        }
    }
}

fn info_entity(attribute: &str) -> EntitySpec {
    EntitySpec {
        value_template: Some(format!("{{{{value_json[\"{}\"] | default(\"\")}}}}", attribute)),
        ..EntitySpec::new(Component::Sensor)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::testing::{CapturedLogs, RecordingBus};
    use crate::bus::Channel;
    use crate::ha_mqtt::Attributes;
    use crate::state::MemoryStateStore;
    use serde_json::json;
    use std::time::Duration;

    #[derive(Default)]
    struct TestBehavior {
        entities: Vec<(String, EntitySpec)>,
        commands: Mutex<Vec<(String, String)>>,
        attributes: Option<Map<String, Value>>,
    }

    impl DeviceBehavior for TestBehavior {
        fn entities(&self) -> Vec<(String, EntitySpec)> {
            self.entities.clone()
        }

        fn process_command(&self, _device: &Device, command_topic: &str, message: &str) {
            self.commands
                .lock()
                .unwrap()
                .push((command_topic.to_string(), message.to_string()));
        }

        fn attributes(&self) -> Option<Map<String, Value>> {
            self.attributes.clone()
        }
    }

    fn context(bus: Arc<RecordingBus>) -> BridgeContext {
        BridgeContext {
            bus,
            store: Arc::new(MemoryStateStore::new()),
            root_topic: "ring".to_string(),
            disarm_code: None,
        }
    }

    fn info(device_id: &str, parent: Option<Arc<Device>>) -> DeviceInfo {
        DeviceInfo {
            device_id: device_id.to_string(),
            location_id: "loc1".to_string(),
            category: "alarm".to_string(),
            name: "Hallway".to_string(),
            manufacturer: "Ring".to_string(),
            model: "Test Device".to_string(),
            parent,
        }
    }

    fn build(
        bus: &Arc<RecordingBus>,
        primary: PrimaryAttribute,
        behavior: Arc<TestBehavior>,
    ) -> Arc<Device> {
        Device::new(info("dev1", None), primary, behavior, &context(bus.clone())).unwrap()
    }

    fn siren_behavior() -> Arc<TestBehavior> {
        Arc::new(TestBehavior {
            entities: vec![("siren".to_string(), EntitySpec::new(Component::Switch))],
            ..Default::default()
        })
    }

    fn attributes() -> Map<String, Value> {
        match json!({"batteryLevel": 90, "tamperStatus": "ok", "commStatus": "ok"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn primary_attribute_seeds_info_entity() {
        let bus = RecordingBus::new();
        let device = build(&bus, PrimaryAttribute::Key("commStatus".into()), siren_behavior());
        let registry = device.registry();
        let keys: Vec<&str> = registry.iter().map(Entity::key).collect();
        assert_eq!(keys, vec!["info", "siren"]);
        assert_eq!(
            registry.get("info").unwrap().spec().value_template.as_deref(),
            Some("{{value_json[\"commStatus\"] | default(\"\")}}")
        );
    }

    #[test]
    fn disabled_primary_attribute_has_no_info_entity() {
        let bus = RecordingBus::new();
        let device = build(&bus, PrimaryAttribute::Disabled, siren_behavior());
        assert!(device.registry().get("info").is_none());
    }

    #[test]
    fn invalid_entity_fails_construction() {
        let bus = RecordingBus::new();
        let behavior = Arc::new(TestBehavior {
            entities: vec![("thermostat".to_string(), EntitySpec::new(Component::Climate))],
            ..Default::default()
        });
        let result = Device::new(
            info("dev1", None),
            PrimaryAttribute::Disabled,
            behavior,
            &context(bus),
        );
        assert!(result.is_err());
    }

    #[test]
    fn discovery_publishes_one_config_per_entity() {
        let bus = RecordingBus::new();
        let device = build(&bus, PrimaryAttribute::Key("commStatus".into()), siren_behavior());
        device.publish_discovery().unwrap();

        let topics: Vec<String> = bus.published().into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            topics,
            vec![
                "ring/config/dev1/sensor/info",
                "ring/config/dev1/switch/siren",
            ]
        );
        let payload: Value = serde_json::from_str(&bus.published_to("ring/config/dev1/switch/siren")[0]).unwrap();
        assert_eq!(payload["name"], json!("Hallway Siren"));
        assert_eq!(payload["command_topic"], json!("ring/loc1/alarm/dev1/siren/command"));
    }

    #[test]
    fn discovery_wires_command_topics_once() {
        let bus = RecordingBus::new();
        let device = build(&bus, PrimaryAttribute::Disabled, siren_behavior());

        device.publish_discovery().unwrap();
        device.publish_discovery().unwrap();

        assert_eq!(
            bus.subscriptions(),
            vec![("ring/loc1/alarm/dev1/siren/command".to_string(), Channel::Broker)]
        );
        assert_eq!(bus.handler_count("ring/loc1/alarm/dev1/siren/command"), 1);
        assert_eq!(bus.published().len(), 2);
    }

    #[test]
    fn commands_are_forwarded_and_empty_ones_dropped() {
        let bus = RecordingBus::new();
        let behavior = siren_behavior();
        let device = build(&bus, PrimaryAttribute::Disabled, behavior.clone());
        device.publish_discovery().unwrap();

        assert!(bus.deliver("ring/loc1/alarm/dev1/siren/command", "ON"));
        assert!(bus.deliver("ring/loc1/alarm/dev1/siren/command", ""));

        assert_eq!(
            *behavior.commands.lock().unwrap(),
            vec![("ring/loc1/alarm/dev1/siren/command".to_string(), "ON".to_string())]
        );
    }

    #[test]
    fn stream_entities_get_ipc_and_debug_subscriptions() {
        let bus = RecordingBus::new();
        let behavior = Arc::new(TestBehavior {
            entities: vec![("stream".to_string(), EntitySpec::new(Component::Switch))],
            ..Default::default()
        });
        let device = build(&bus, PrimaryAttribute::Disabled, behavior.clone());
        device.publish_discovery().unwrap();

        assert_eq!(
            bus.subscriptions(),
            vec![
                ("ring/loc1/alarm/dev1/stream/command".to_string(), Channel::Broker),
                ("ring/loc1/alarm/dev1/stream/command".to_string(), Channel::Ipc),
                ("ring/loc1/alarm/dev1/stream/debug".to_string(), Channel::Ipc),
            ]
        );
        // Debug messages are logged, never forwarded as commands
        assert!(bus.deliver("ring/loc1/alarm/dev1/stream/debug", "stream started"));
        assert!(behavior.commands.lock().unwrap().is_empty());
    }

    #[test]
    fn discovery_and_stream_debug_are_traced_by_kind() {
        let (logs, _guard) = CapturedLogs::install();
        let bus = RecordingBus::new();
        let behavior = Arc::new(TestBehavior {
            entities: vec![("stream".to_string(), EntitySpec::new(Component::Switch))],
            ..Default::default()
        });
        let device = build(&bus, PrimaryAttribute::Disabled, behavior);
        device.publish_discovery().unwrap();
        bus.deliver("ring/loc1/alarm/dev1/stream/debug", "ffmpeg exited");

        let text = logs.text();
        let disc = text
            .lines()
            .find(|line| line.contains("kind=\"disc\""))
            .unwrap();
        assert!(disc.contains("[Hallway] ring/config/dev1/switch/stream"));
        let rtsp = text
            .lines()
            .find(|line| line.contains("kind=\"rtsp\""))
            .unwrap();
        assert!(rtsp.contains("ffmpeg exited"));
    }

    #[test]
    fn masked_device_publish_hides_code_in_logs() {
        let (logs, _guard) = CapturedLogs::install();
        let bus = RecordingBus::new();
        let device = build(&bus, PrimaryAttribute::Disabled, siren_behavior());

        device.publish_masked("ring/loc1/alarm/dev1/code/state", "1234", "****");

        assert_eq!(bus.published_to("ring/loc1/alarm/dev1/code/state"), vec!["1234"]);
        let text = logs.text();
        assert!(text.contains("[Hallway] ring/loc1/alarm/dev1/code/state ****"));
        assert!(!text.contains("1234"));
    }

    #[test]
    fn entity_state_requires_discovery_first() {
        let bus = RecordingBus::new();
        let device = build(&bus, PrimaryAttribute::Disabled, siren_behavior());

        assert!(!device.publish_entity_state("siren", "ON"));
        assert!(bus.published().is_empty());

        device.publish_discovery().unwrap();
        assert!(device.publish_entity_state("siren", "ON"));
        assert_eq!(bus.published_to("ring/loc1/alarm/dev1/siren/state"), vec!["ON"]);
    }

    #[test]
    fn publish_attributes_targets_info_and_filtered_entities() {
        let bus = RecordingBus::new();
        let behavior = Arc::new(TestBehavior {
            entities: vec![(
                "battery".to_string(),
                EntitySpec {
                    parent_state_topic: Some("info/state".to_string()),
                    attributes: Some(Attributes::Filter("batt".to_string())),
                    ..EntitySpec::new(Component::Sensor)
                },
            )],
            attributes: Some(attributes()),
            ..Default::default()
        });
        let device = build(&bus, PrimaryAttribute::Key("commStatus".into()), behavior);
        device.publish_discovery().unwrap();
        bus.clear();

        device.publish_attributes();

        assert_eq!(
            bus.published(),
            vec![
                (
                    "ring/loc1/alarm/dev1/info/state".to_string(),
                    Value::Object(attributes()).to_string()
                ),
                (
                    "ring/loc1/alarm/dev1/battery/attributes".to_string(),
                    json!({"batteryLevel": 90}).to_string()
                ),
            ]
        );
    }

    #[test]
    fn parent_and_children_are_linked_without_ownership() {
        let bus = RecordingBus::new();
        let ctx = context(bus);
        let parent = Device::new(
            info("hub", None),
            PrimaryAttribute::Disabled,
            Arc::new(TestBehavior::default()),
            &ctx,
        )
        .unwrap();
        let child = Device::new(
            info("sensor", Some(parent.clone())),
            PrimaryAttribute::Disabled,
            Arc::new(TestBehavior::default()),
            &ctx,
        )
        .unwrap();

        assert_eq!(child.descriptor().via_device.as_deref(), Some("hub"));
        assert_eq!(child.parent().unwrap().device_id(), "hub");
        assert_eq!(parent.children().len(), 1);

        drop(child);
        assert!(parent.children().is_empty());
    }

    #[test]
    fn parses_command_topics() {
        let bus = RecordingBus::new();
        let device = build(&bus, PrimaryAttribute::Disabled, siren_behavior());
        assert_eq!(
            device.parse_command_topic("ring/loc1/alarm/dev1/light/brightness_command"),
            Some(("light", "brightness_command"))
        );
        assert_eq!(device.parse_command_topic("ring/other/alarm/dev1/siren/command"), None);
    }

    #[test]
    fn saved_state_round_trips_through_store() {
        let bus = RecordingBus::new();
        let device = build(&bus, PrimaryAttribute::Disabled, siren_behavior());
        assert_eq!(device.saved_state(), None);
        device.set_saved_state(json!({"last_alarm": "2026-01-01"}));
        assert_eq!(device.saved_state(), Some(json!({"last_alarm": "2026-01-01"})));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_publishes_attributes_while_online() {
        let bus = RecordingBus::new();
        let behavior = Arc::new(TestBehavior {
            attributes: Some(attributes()),
            ..Default::default()
        });
        let device = build(&bus, PrimaryAttribute::Key("commStatus".into()), behavior);
        device.publish_discovery().unwrap();
        device.online().await;
        device.start();
        bus.clear();

        tokio::time::sleep(ONLINE_REFRESH_INTERVAL + Duration::from_secs(1)).await;
        assert_eq!(bus.published_to("ring/loc1/alarm/dev1/info/state").len(), 1);

        device.offline();
        bus.clear();
        // The pending 300s wait was armed while online; afterwards the
        // loop waits 60s at a time and never publishes while offline
        tokio::time::sleep(ONLINE_REFRESH_INTERVAL + OFFLINE_REFRESH_INTERVAL * 3).await;
        assert!(bus.published_to("ring/loc1/alarm/dev1/info/state").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_resumes_after_device_recovers() {
        let bus = RecordingBus::new();
        let behavior = Arc::new(TestBehavior {
            attributes: Some(attributes()),
            ..Default::default()
        });
        let device = build(&bus, PrimaryAttribute::Key("commStatus".into()), behavior);
        device.publish_discovery().unwrap();
        device.online().await;
        device.start();
        device.offline();
        bus.clear();

        // The armed 300s wait lapses while offline and re-arms at 60s
        tokio::time::sleep(ONLINE_REFRESH_INTERVAL + Duration::from_secs(1)).await;
        assert!(bus.published_to("ring/loc1/alarm/dev1/info/state").is_empty());

        device.online().await;
        tokio::time::sleep(OFFLINE_REFRESH_INTERVAL).await;

        assert_eq!(bus.published_to("ring/loc1/alarm/dev1/info/state").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_refresh_and_online() {
        let bus = RecordingBus::new();
        let behavior = Arc::new(TestBehavior {
            attributes: Some(attributes()),
            ..Default::default()
        });
        let device = build(&bus, PrimaryAttribute::Key("commStatus".into()), behavior);
        device.publish_discovery().unwrap();
        device.online().await;
        device.start();
        bus.clear();

        device.shutdown();
        device.online().await;
        tokio::time::sleep(ONLINE_REFRESH_INTERVAL * 2).await;

        assert!(bus.published().is_empty());
    }

    #[test]
    fn refresh_interval_backs_off_only_when_offline() {
        assert_eq!(refresh_interval(AvailabilityState::Online), ONLINE_REFRESH_INTERVAL);
        assert_eq!(refresh_interval(AvailabilityState::Unpublished), ONLINE_REFRESH_INTERVAL);
        assert_eq!(refresh_interval(AvailabilityState::Offline), OFFLINE_REFRESH_INTERVAL);
    }
}
