//! Platform audio-focus abstractions
//!
//! Audio focus is the platform-arbitrated right to emit audio. A host
//! implements [`AudioFocusManager`] on top of its native arbitration service
//! (Android `AudioManager`, a PulseAudio role policy, a car head-unit audio
//! manager) and delivers focus changes back to the core through the
//! [`FocusChangeListener`] supplied with each request.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of focus being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusGain {
    /// Long-lived focus, e.g. media playback.
    Gain,
    /// Short focus; the previous holder is expected to resume afterwards.
    GainTransient,
    /// Short focus during which nobody else may play, not even ducked.
    GainTransientExclusive,
    /// Short focus during which the previous holder may keep playing ducked.
    GainTransientMayDuck,
}

/// What the audio is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioUsage {
    Media,
    Alarm,
    Notification,
    AssistantSpeech,
}

/// What the audio contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Music,
    Speech,
    Sonification,
    Unknown,
}

/// Attributes of a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FocusRequest {
    pub gain: FocusGain,
    pub usage: AudioUsage,
    pub content_type: ContentType,
    /// When `false` the platform must not duck this client on a transient
    /// loss; it should send a plain transient loss instead.
    pub pause_when_ducked: bool,
}

impl FocusRequest {
    /// Long-lived media focus that never asks to be ducked on loss.
    pub fn media(content_type: ContentType) -> Self {
        Self {
            gain: FocusGain::Gain,
            usage: AudioUsage::Media,
            content_type,
            pause_when_ducked: false,
        }
    }
}

/// Synchronous answer to a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusRequestResult {
    /// Focus is held from now on.
    Granted,
    /// Focus will be delivered later through [`FocusChange::Gain`].
    Delayed,
    /// Focus was refused.
    Failed,
}

/// Asynchronous focus notifications delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusChange {
    Gain,
    GainTransient,
    GainTransientExclusive,
    GainTransientMayDuck,
    /// Focus lost for an unbounded amount of time.
    Loss,
    /// Focus lost briefly; expect a [`FocusChange::Gain`] later.
    LossTransient,
    /// Focus lost briefly, but the platform allows playing on at reduced volume.
    LossTransientCanDuck,
    /// No focus was requested, gained, or lost.
    None,
}

impl fmt::Display for FocusChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FocusChange::Gain => "GAIN",
            FocusChange::GainTransient => "GAIN_TRANSIENT",
            FocusChange::GainTransientExclusive => "GAIN_TRANSIENT_EXCLUSIVE",
            FocusChange::GainTransientMayDuck => "GAIN_TRANSIENT_MAY_DUCK",
            FocusChange::Loss => "LOSS",
            FocusChange::LossTransient => "LOSS_TRANSIENT",
            FocusChange::LossTransientCanDuck => "LOSS_TRANSIENT_CAN_DUCK",
            FocusChange::None => "NONE",
        };
        f.write_str(name)
    }
}

/// Receiver of focus changes for one outstanding request.
///
/// Platforms may invoke this from any thread, including synchronously from
/// inside [`AudioFocusManager::request_focus`].
pub trait FocusChangeListener: Send + Sync {
    fn on_focus_change(&self, change: FocusChange);
}

/// Platform audio-focus arbitration service.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::focus::*;
/// use std::sync::Arc;
///
/// fn acquire(manager: &dyn AudioFocusManager, listener: Arc<dyn FocusChangeListener>) {
///     let request = FocusRequest::media(ContentType::Music);
///     match manager.request_focus(&request, listener) {
///         FocusRequestResult::Granted => { /* play */ }
///         FocusRequestResult::Delayed => { /* wait for Gain */ }
///         FocusRequestResult::Failed => { /* give up */ }
///     }
/// }
/// ```
pub trait AudioFocusManager: Send + Sync {
    /// Ask for focus. `listener` receives every later change for this request.
    fn request_focus(
        &self,
        request: &FocusRequest,
        listener: Arc<dyn FocusChangeListener>,
    ) -> FocusRequestResult;

    /// Give up focus previously requested with `request`.
    fn abandon_focus(&self, request: &FocusRequest) -> Result<()>;
}
