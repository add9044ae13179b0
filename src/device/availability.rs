use crate::device::{Publisher, ShutdownFlag, Trace};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time;

/// Time given to subscribers after going online before state follows
pub const ONLINE_SETTLE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityState {
    Unpublished,
    Online,
    Offline,
}

impl AvailabilityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityState::Unpublished => "unpublished",
            AvailabilityState::Online => "online",
            AvailabilityState::Offline => "offline",
        }
    }
}

impl fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct AvailabilityTracker {
    topic: String,
    state: Mutex<AvailabilityState>,
    settle_delay: Duration,
}

impl AvailabilityTracker {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            state: Mutex::new(AvailabilityState::Unpublished),
            settle_delay: ONLINE_SETTLE_DELAY,
        }
    }

    pub fn state(&self) -> AvailabilityState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_online(&self) -> bool {
        self.state() == AvailabilityState::Online
    }

    /// Switch to `next`, returning the trace to use: repeated transitions
    /// still publish but without a debug line
    fn transition(&self, next: AvailabilityState) -> Trace {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let previous = std::mem::replace(&mut *state, next);
        if previous == next { Trace::Off } else { Trace::Mqtt }
    }

    pub async fn online(&self, publisher: &Publisher, shutdown: &ShutdownFlag) {
        // Suppress delayed online messages racing a shutdown
        if shutdown.is_set() {
            return;
        }
        let trace = self.transition(AvailabilityState::Online);
        publisher.publish(&self.topic, AvailabilityState::Online.as_str(), trace, None);
        time::sleep(self.settle_delay).await;
    }

    pub fn offline(&self, publisher: &Publisher) {
        let trace = self.transition(AvailabilityState::Offline);
        publisher.publish(&self.topic, AvailabilityState::Offline.as_str(), trace, None);
    }
}
