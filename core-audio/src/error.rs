//! # Audio Error Types
//!
//! Errors surfaced by channel volume managers and the focus coordinator.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur while managing channel volume or audio focus.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Requested volume lies outside the configured range.
    #[error("Invalid volume: {volume} (must be between {min} and {max})")]
    InvalidVolume { volume: i8, min: i8, max: i8 },

    /// A coordinator method was called before a player controller was attached.
    #[error("No player controller attached to the audio focus coordinator")]
    PlayerControllerMissing,

    /// The underlying speaker or focus service rejected the call.
    #[error("Platform call failed: {0}")]
    Bridge(#[from] BridgeError),

    /// Configuration rejected during construction.
    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),
}

impl AudioError {
    /// Returns `true` for caller mistakes that retrying will not fix.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            AudioError::InvalidVolume { .. } | AudioError::PlayerControllerMissing
        )
    }
}

/// Result type for audio operations.
pub type Result<T> = std::result::Result<T, AudioError>;
