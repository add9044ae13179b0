use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

use crate::bus::{Channel, CommandHandler, MessageBus};
use crate::utils::Config;

use super::TopicHandlers;

/// Capacity of the rumqttc request channel
const REQUEST_CAPACITY: usize = 100;

#[derive(Debug)]
enum Outbound {
    Publish { topic: String, payload: String },
    Subscribe(String),
    Disconnect,
}

/// [`MessageBus`] backed by a rumqttc client. Publishes and subscriptions
/// queue without bound and reach the client in issue order through the
/// [`OutboundForwarder`].
pub struct MqttBus {
    outbound: mpsc::UnboundedSender<Outbound>,
    handlers: TopicHandlers,
    broker_topics: Mutex<Vec<String>>,
}

/// Feeds queued requests into the rumqttc client, waiting whenever the
/// client's request channel is full
pub struct OutboundForwarder {
    client: AsyncClient,
    queue: mpsc::UnboundedReceiver<Outbound>,
}

impl MqttBus {
    pub fn new(client: AsyncClient) -> (Self, OutboundForwarder) {
        let (outbound, queue) = mpsc::unbounded_channel();
        let bus = Self {
            outbound,
            handlers: TopicHandlers::new(),
            broker_topics: Mutex::new(Vec::new()),
        };
        (bus, OutboundForwarder { client, queue })
    }

    pub fn handlers(&self) -> &TopicHandlers {
        &self.handlers
    }

    /// Re-issue every broker subscription, needed after a reconnect
    pub fn resubscribe(&self) {
        let topics = self
            .broker_topics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        debug!("Re-subscribing to {} topic(s)", topics.len());
        for topic in topics {
            self.enqueue(Outbound::Subscribe(topic));
        }
    }

    /// Queue a disconnect behind everything already queued
    pub fn disconnect(&self) {
        self.enqueue(Outbound::Disconnect);
    }

    fn enqueue(&self, request: Outbound) {
        if let Err(e) = self.outbound.send(request) {
            warn!("MQTT forwarder has stopped, dropping {:?}", e.0);
        }
    }
}

impl MessageBus for MqttBus {
    fn publish(&self, topic: &str, payload: String) {
        self.enqueue(Outbound::Publish {
            topic: topic.to_string(),
            payload,
        });
    }

    fn subscribe(&self, topic: &str, channel: Channel) {
        match channel {
            Channel::Broker => {
                debug!("Subscribing to topic: {}", topic);
                self.broker_topics
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(topic.to_string());
                self.enqueue(Outbound::Subscribe(topic.to_string()));
            }
            Channel::Ipc => {
                debug!("Registered local IPC topic: {}", topic);
            }
        }
    }

    fn on_message(&self, topic: &str, handler: CommandHandler) {
        self.handlers.register(topic, handler);
    }
}

impl OutboundForwarder {
    /// Requests waiting to be handed to the client
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Forward requests until a disconnect is sent or the bus is dropped
    pub async fn run(mut self) {
        while let Some(request) = self.queue.recv().await {
            let result = match request {
                Outbound::Publish { topic, payload } => {
                    self.client
                        .publish(topic, QoS::AtLeastOnce, false, payload)
                        .await
                }
                Outbound::Subscribe(topic) => self.client.subscribe(topic, QoS::AtMostOnce).await,
                Outbound::Disconnect => {
                    if let Err(e) = self.client.disconnect().await {
                        warn!("Failed to queue MQTT disconnect: {}", e);
                    }
                    break;
                }
            };
            if let Err(e) = result {
                warn!("MQTT client rejected request: {}", e);
            }
        }
        debug!("MQTT forwarder stopped");
    }
}

pub fn initialize_mqtt_connection(config: &Config) -> (Arc<MqttBus>, OutboundForwarder, EventLoop) {
    // Set up MQTT options
    let mut mqttoptions = MqttOptions::new(&config.hostname, &config.mqtt_url, config.mqtt_port);
    mqttoptions.set_credentials(&config.username, &config.password);
    mqttoptions.set_keep_alive(Duration::from_secs(5));

    // Create MQTT client
    debug!("Creating MQTT client");
    let (client, eventloop) = AsyncClient::new(mqttoptions, REQUEST_CAPACITY);
    debug!("MQTT client created successfully");

    let (bus, forwarder) = MqttBus::new(client);
    (Arc::new(bus), forwarder, eventloop)
}

/// Poll the event loop forever, routing incoming publishes to the
/// registered handlers
pub async fn run_event_loop(bus: &MqttBus, eventloop: &mut EventLoop, retry_interval: Duration) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!("Received message on topic '{}'", publish.topic);
                bus.handlers().dispatch(&publish.topic, &publish.payload);
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Connected to MQTT broker");
                bus.resubscribe();
            }
            Ok(_) => {
                // Other events (pings, acks, outgoing) - nothing to do
            }
            Err(e) => {
                warn!("MQTT error: {}", e);
                // Wait a bit before retrying
                time::sleep(retry_interval).await;
            }
        }
    }
}

/// Poll the event loop until the queued disconnect has gone out, so every
/// publish queued before it reaches the broker. Returns false when the
/// connection fails or `limit` elapses first.
pub async fn drain_until_disconnect(eventloop: &mut EventLoop, limit: Duration) -> bool {
    let drain = async {
        loop {
            match eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) => return true,
                Ok(event) => debug!("Shutdown event: {:?}", event),
                Err(e) => {
                    warn!("MQTT connection closed while draining: {}", e);
                    return false;
                }
            }
        }
    };
    match time::timeout(limit, drain).await {
        Ok(drained) => drained,
        Err(_) => {
            warn!("Timed out draining MQTT events after {:?}", limit);
            false
        }
    }
}
