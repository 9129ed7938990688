//! Speaker abstraction
//!
//! The lowest-level volume control the core talks to. A host adapter wraps
//! whatever the platform exposes (an ALSA mixer element, an Android stream
//! volume, an SDK speaker object) behind this trait.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Snapshot of a speaker's volume and mute state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeakerSettings {
    /// Volume level in the host's set-volume range.
    pub volume: i8,
    /// Whether output is muted.
    pub mute: bool,
}

impl SpeakerSettings {
    pub fn new(volume: i8, mute: bool) -> Self {
        Self { volume, mute }
    }
}

/// Volume sink for one logical audio channel.
///
/// # Contract
///
/// Callers hold their own channel lock while invoking these methods, so
/// implementations must return quickly and must not call back into the
/// channel that owns them. This is documented, not enforced.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::speaker::{Speaker, SpeakerSettings};
/// use bridge_traits::error::Result;
///
/// struct MixerSpeaker { mixer: Mixer }
///
/// impl Speaker for MixerSpeaker {
///     fn set_volume(&self, volume: i8) -> Result<()> {
///         self.mixer.set_percent(volume as u8)
///             .map_err(|e| BridgeError::OperationFailed(e.to_string()))
///     }
///     fn set_mute(&self, mute: bool) -> Result<()> { /* ... */ }
///     fn speaker_settings(&self) -> Result<SpeakerSettings> { /* ... */ }
/// }
/// ```
pub trait Speaker: Send + Sync {
    /// Apply an absolute volume level.
    fn set_volume(&self, volume: i8) -> Result<()>;

    /// Apply the mute flag.
    fn set_mute(&self, mute: bool) -> Result<()>;

    /// Read the speaker's current settings.
    fn speaker_settings(&self) -> Result<SpeakerSettings>;
}
