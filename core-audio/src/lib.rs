//! # Audio Focus & Channel Volume
//!
//! Coordinates a media player with the platform's audio focus and manages
//! per-channel speaker volume, including ducking.
//!
//! ## Overview
//!
//! This module handles:
//! - Acquiring and releasing audio focus and mapping focus changes to
//!   playback commands ([`AudioFocusCoordinator`])
//! - Client-side ducking through the player's volume multiplier
//! - Per-channel volume with ducking through a [`VolumeCurve`]
//!   ([`ChannelVolumeManager`])
//!
//! Platform access goes through the capability traits in `bridge-traits`;
//! configuration, events and logging come from `core-runtime`.

pub mod channel_volume;
pub mod error;
pub mod focus;
pub mod volume_curve;

pub use channel_volume::{ChannelVolumeManager, ChannelVolumeManagerBuilder, ChannelVolumeType};
pub use error::{AudioError, Result};
pub use focus::{AudioFocusCoordinator, FocusState};
pub use volume_curve::VolumeCurve;
