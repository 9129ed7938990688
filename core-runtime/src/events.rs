//! # Event Bus System
//!
//! Broadcasts focus and volume state changes from the audio core to any
//! number of host-side listeners using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`FocusEvent`] and [`VolumeEvent`], wrapped in [`CoreEvent`]
//! - **EventBus**: cloneable sender handed to coordinators and channel managers
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ```text
//! ┌──────────────────────┐  emit   ┌───────────┐  subscribe  ┌────────────┐
//! │ AudioFocusCoordinator├────────>│           ├────────────>│ Host UI    │
//! └──────────────────────┘         │ EventBus  │             └────────────┘
//! ┌──────────────────────┐  emit   │           │  subscribe  ┌────────────┐
//! │ ChannelVolumeManager ├────────>│           ├────────────>│ Telemetry  │
//! └──────────────────────┘         └───────────┘             └────────────┘
//! ```
//!
//! Emission never blocks and never fails the operation that triggered it: a
//! bus without subscribers simply drops the event.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, FocusEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(32);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Focus(FocusEvent::Released)).ok();
//! assert_eq!(rx.recv().await.unwrap(), CoreEvent::Focus(FocusEvent::Released));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; keep receiving.
//! - **`RecvError::Closed`**: every sender was dropped; stop receiving.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, SendError},
    Receiver,
};

/// Default per-subscriber buffer.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Audio-focus coordinator events
    Focus(FocusEvent),
    /// Channel volume events
    Volume(VolumeEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Focus(e) => e.description(),
            CoreEvent::Volume(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Focus(FocusEvent::ReleaseFailed { .. }) => EventSeverity::Error,
            CoreEvent::Focus(FocusEvent::RequestDenied) => EventSeverity::Warning,
            CoreEvent::Focus(FocusEvent::UnexpectedChange { .. }) => EventSeverity::Warning,
            CoreEvent::Focus(FocusEvent::StateChanged { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Focus Events
// ============================================================================

/// Events raised by the audio-focus coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum FocusEvent {
    /// The focus state machine moved between states.
    StateChanged {
        /// Previous state name (e.g. `"WaitingForAcquisition"`).
        from: String,
        /// New state name.
        to: String,
    },
    /// The platform refused a focus request.
    RequestDenied,
    /// Focus was handed back to the platform.
    Released,
    /// The platform rejected giving focus back; the request is still held.
    ReleaseFailed { reason: String },
    /// A focus change arrived that is not valid for the current state.
    UnexpectedChange {
        /// Platform change name (e.g. `"LOSS_TRANSIENT_CAN_DUCK"`).
        change: String,
        /// State the coordinator stayed in.
        state: String,
    },
    /// Client-side ducking was switched on or off.
    ClientDuckingChanged { ducked: bool },
}

impl FocusEvent {
    fn description(&self) -> &str {
        match self {
            FocusEvent::StateChanged { .. } => "Audio focus state changed",
            FocusEvent::RequestDenied => "Audio focus request denied",
            FocusEvent::Released => "Audio focus released",
            FocusEvent::ReleaseFailed { .. } => "Audio focus release failed",
            FocusEvent::UnexpectedChange { .. } => "Unexpected audio focus change ignored",
            FocusEvent::ClientDuckingChanged { .. } => "Client-side ducking changed",
        }
    }
}

// ============================================================================
// Volume Events
// ============================================================================

/// Events raised by channel volume managers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum VolumeEvent {
    /// Channel attenuated; `volume` is what the speaker received.
    DuckingStarted { channel_id: usize, volume: i8 },
    /// Channel restored; `volume` is the unducked baseline.
    DuckingStopped { channel_id: usize, volume: i8 },
    /// Baseline changed; `applied` is what the speaker received.
    UnduckedVolumeChanged {
        channel_id: usize,
        volume: i8,
        applied: i8,
    },
    /// Mute flag forwarded to the speaker.
    MuteChanged { channel_id: usize, mute: bool },
}

impl VolumeEvent {
    fn description(&self) -> &str {
        match self {
            VolumeEvent::DuckingStarted { .. } => "Channel ducked",
            VolumeEvent::DuckingStopped { .. } => "Channel unducked",
            VolumeEvent::UnduckedVolumeChanged { .. } => "Channel volume changed",
            VolumeEvent::MuteChanged { .. } => "Channel mute changed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Clones share one underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus; `capacity` is the per-subscriber backlog
    /// before a slow subscriber starts lagging.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if nobody is listening.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a receiver for all future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional filter.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let focus_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Focus(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive. `None` when nothing matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
