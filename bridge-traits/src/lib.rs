//! # Host Bridge Traits
//!
//! Capability traits that a host platform implements so the audio core can
//! drive speakers, arbitrate audio focus, and command the media player
//! without knowing anything about the platform underneath.
//!
//! ## Traits
//!
//! ### Audio output
//! - [`Speaker`](speaker::Speaker) - Absolute volume and mute for one channel
//!
//! ### Focus arbitration
//! - [`AudioFocusManager`](focus::AudioFocusManager) - Request/abandon platform audio focus
//! - [`FocusChangeListener`](focus::FocusChangeListener) - Asynchronous focus notifications
//!
//! ### Playback control
//! - [`PlayerController`](player::PlayerController) - Start, pause, resume, stop, volume scaling
//! - [`DuckingObserver`](player::DuckingObserver) - Client-side ducking notifications
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing rather than silently skipping work:
//!
//! ```ignore
//! let manager = config.focus_manager
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "AudioFocusManager".to_string(),
//!         message: "Inject the platform focus adapter before building the core".to_string(),
//!     })?;
//! ```
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. Focus callbacks in particular may
//! arrive on any platform thread.

pub mod error;
pub mod focus;
pub mod logging;
pub mod player;
pub mod speaker;

pub use error::BridgeError;

// Re-export commonly used types
pub use focus::{
    AudioFocusManager, AudioUsage, ContentType, FocusChange, FocusChangeListener, FocusGain,
    FocusRequest, FocusRequestResult,
};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use player::{DuckingObserver, PlayerController};
pub use speaker::{Speaker, SpeakerSettings};
