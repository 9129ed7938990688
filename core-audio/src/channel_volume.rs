//! # Channel Volume Manager
//!
//! Owns the volume state of one logical audio channel and applies
//! volume-curve attenuation ("ducking") on top of an underlying [`Speaker`].
//!
//! ## Locking
//!
//! Every operation takes the channel's single mutex and keeps it across the
//! speaker call, so concurrent duck/unduck/set-volume requests from focus
//! callbacks and direct API calls are applied in a total order. Speakers must
//! therefore return quickly and must not call back into the channel.
//!
//! ## Consistency
//!
//! The ducked flag and the unducked baseline change only after the speaker
//! accepted the new level. A failed speaker call leaves the manager exactly
//! as it was, matching the last volume the speaker confirmed.
//!
//! ```rust,ignore
//! use core_audio::{ChannelVolumeManager, ChannelVolumeType};
//!
//! let channel = ChannelVolumeManager::builder(speaker)
//!     .channel_type(ChannelVolumeType::AvsSpeakerVolume)
//!     .build()?;
//!
//! channel.set_unducked_volume(50)?; // speaker <- 50
//! channel.start_ducking()?;         // speaker <- 20
//! channel.stop_ducking()?;          // speaker <- 50
//! ```

use crate::error::{AudioError, Result};
use crate::volume_curve::VolumeCurve;
use bridge_traits::{DuckingObserver, Speaker, SpeakerSettings};
use core_runtime::config::{CoreConfig, VolumeSettings};
use core_runtime::events::{CoreEvent, EventBus, VolumeEvent};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_CHANNEL_ID: AtomicUsize = AtomicUsize::new(1);

/// Which volume a channel controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelVolumeType {
    /// Speaker volume managed by the assistant service.
    #[default]
    AvsSpeakerVolume,
    /// Alerts (alarms, timers, reminders) volume.
    AvsAlertsVolume,
}

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    unducked_volume: i8,
    ducked: bool,
}

/// Volume, mute and ducking control for one audio channel.
pub struct ChannelVolumeManager {
    id: usize,
    channel_type: ChannelVolumeType,
    speaker: Arc<dyn Speaker>,
    curve: VolumeCurve,
    range: VolumeSettings,
    ducking_observer: Option<Arc<dyn DuckingObserver>>,
    event_bus: Option<EventBus>,
    state: Mutex<ChannelState>,
}

impl ChannelVolumeManager {
    /// Manage `speaker` with the default type, range and curve.
    ///
    /// The initial unducked volume is read from the speaker.
    pub fn new(speaker: Arc<dyn Speaker>) -> Result<Self> {
        Self::builder(speaker).build()
    }

    pub fn builder(speaker: Arc<dyn Speaker>) -> ChannelVolumeManagerBuilder {
        ChannelVolumeManagerBuilder::new(speaker)
    }

    /// Process-unique channel identifier.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn channel_type(&self) -> ChannelVolumeType {
        self.channel_type
    }

    pub fn is_ducked(&self) -> bool {
        self.state.lock().ducked
    }

    pub fn unducked_volume(&self) -> i8 {
        self.state.lock().unducked_volume
    }

    /// Attenuate the channel to `curve(unducked_volume)`.
    ///
    /// No-op returning `Ok` when already ducked. On a speaker error the
    /// channel stays unducked and the error is returned.
    #[tracing::instrument(skip(self), fields(channel_id = self.id))]
    pub fn start_ducking(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.ducked {
            tracing::trace!("Channel already ducked");
            return Ok(());
        }

        let ducked_volume = self.curve.apply(state.unducked_volume);
        tracing::debug!(
            unducked = state.unducked_volume,
            ducked = ducked_volume,
            "Ducking channel"
        );

        self.speaker.set_volume(ducked_volume).map_err(|e| {
            tracing::warn!(error = %e, "Speaker rejected ducked volume");
            AudioError::from(e)
        })?;
        state.ducked = true;

        self.notify_ducking(true);
        self.emit(VolumeEvent::DuckingStarted {
            channel_id: self.id,
            volume: ducked_volume,
        });
        Ok(())
    }

    /// Restore the unducked volume.
    ///
    /// No-op returning `Ok` when not ducked. On a speaker error the channel
    /// stays ducked and the error is returned.
    #[tracing::instrument(skip(self), fields(channel_id = self.id))]
    pub fn stop_ducking(&self) -> Result<()> {
        let mut state = self.state.lock();
        if !state.ducked {
            tracing::trace!("Channel not ducked");
            return Ok(());
        }

        tracing::debug!(volume = state.unducked_volume, "Restoring unducked volume");
        self.speaker.set_volume(state.unducked_volume).map_err(|e| {
            tracing::warn!(error = %e, "Speaker rejected unducked volume");
            AudioError::from(e)
        })?;
        state.ducked = false;

        self.notify_ducking(false);
        self.emit(VolumeEvent::DuckingStopped {
            channel_id: self.id,
            volume: state.unducked_volume,
        });
        Ok(())
    }

    /// Set the baseline volume.
    ///
    /// While ducked the speaker receives `curve(volume)` so the channel stays
    /// attenuated; `volume` itself is applied on [`stop_ducking`](Self::stop_ducking).
    ///
    /// # Errors
    ///
    /// - [`AudioError::InvalidVolume`] if `volume` is outside the range; the
    ///   speaker is not touched
    /// - [`AudioError::Bridge`] if the speaker rejects the level; the previous
    ///   baseline is kept
    pub fn set_unducked_volume(&self, volume: i8) -> Result<()> {
        if !self.range.contains(volume) {
            return Err(AudioError::InvalidVolume {
                volume,
                min: self.range.min,
                max: self.range.max,
            });
        }

        let mut state = self.state.lock();
        let applied = if state.ducked {
            self.curve.apply(volume)
        } else {
            volume
        };

        tracing::debug!(
            channel_id = self.id,
            volume,
            applied,
            ducked = state.ducked,
            "Setting unducked volume"
        );
        self.speaker.set_volume(applied)?;
        state.unducked_volume = volume;

        self.emit(VolumeEvent::UnduckedVolumeChanged {
            channel_id: self.id,
            volume,
            applied,
        });
        Ok(())
    }

    /// Forward the mute flag to the speaker. Independent of ducking.
    pub fn set_mute(&self, mute: bool) -> Result<()> {
        let _state = self.state.lock();
        tracing::debug!(channel_id = self.id, mute, "Setting mute");
        self.speaker.set_mute(mute)?;

        self.emit(VolumeEvent::MuteChanged {
            channel_id: self.id,
            mute,
        });
        Ok(())
    }

    /// Snapshot of the channel settings.
    ///
    /// `mute` comes from the speaker; `volume` is the unducked baseline, so a
    /// ducked channel still reports the level the user asked for.
    pub fn speaker_settings(&self) -> Result<SpeakerSettings> {
        let state = self.state.lock();
        let settings = self.speaker.speaker_settings()?;
        Ok(SpeakerSettings::new(state.unducked_volume, settings.mute))
    }

    fn notify_ducking(&self, ducked: bool) {
        if let Some(observer) = &self.ducking_observer {
            observer.report_client_ducking_state(ducked);
        }
    }

    fn emit(&self, event: VolumeEvent) {
        if let Some(bus) = &self.event_bus {
            // No subscribers is fine.
            bus.emit(CoreEvent::Volume(event)).ok();
        }
    }
}

impl fmt::Debug for ChannelVolumeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = *self.state.lock();
        f.debug_struct("ChannelVolumeManager")
            .field("id", &self.id)
            .field("channel_type", &self.channel_type)
            .field("unducked_volume", &state.unducked_volume)
            .field("ducked", &state.ducked)
            .field("curve", &self.curve)
            .field("range", &self.range)
            .finish()
    }
}

/// Builder for [`ChannelVolumeManager`].
pub struct ChannelVolumeManagerBuilder {
    speaker: Arc<dyn Speaker>,
    channel_type: ChannelVolumeType,
    curve: Option<VolumeCurve>,
    range: VolumeSettings,
    ducking_observer: Option<Arc<dyn DuckingObserver>>,
    event_bus: Option<EventBus>,
}

impl ChannelVolumeManagerBuilder {
    fn new(speaker: Arc<dyn Speaker>) -> Self {
        Self {
            speaker,
            channel_type: ChannelVolumeType::default(),
            curve: None,
            range: VolumeSettings::default(),
            ducking_observer: None,
            event_bus: None,
        }
    }

    /// Take the volume range and event bus from a core configuration.
    pub fn with_config(mut self, config: &CoreConfig) -> Self {
        self.range = config.volume;
        self.event_bus = config.event_bus.clone();
        self
    }

    pub fn channel_type(mut self, channel_type: ChannelVolumeType) -> Self {
        self.channel_type = channel_type;
        self
    }

    /// Replace the default curve. The curve must be pure and fast.
    pub fn volume_curve(mut self, curve: VolumeCurve) -> Self {
        self.curve = Some(curve);
        self
    }

    pub fn volume_settings(mut self, range: VolumeSettings) -> Self {
        self.range = range;
        self
    }

    pub fn ducking_observer(mut self, observer: Arc<dyn DuckingObserver>) -> Self {
        self.ducking_observer = Some(observer);
        self
    }

    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Validate the range, read the speaker's current volume as the initial
    /// baseline, and build the manager.
    pub fn build(self) -> Result<ChannelVolumeManager> {
        self.range.validate()?;
        let initial = self.speaker.speaker_settings()?;
        if !self.range.contains(initial.volume) {
            return Err(AudioError::InvalidVolume {
                volume: initial.volume,
                min: self.range.min,
                max: self.range.max,
            });
        }
        let curve = self
            .curve
            .unwrap_or_else(|| VolumeCurve::default_for(self.range));

        let id = NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            channel_id = id,
            channel_type = ?self.channel_type,
            volume = initial.volume,
            "Created channel volume manager"
        );

        Ok(ChannelVolumeManager {
            id,
            channel_type: self.channel_type,
            speaker: self.speaker,
            curve,
            range: self.range,
            ducking_observer: self.ducking_observer,
            event_bus: self.event_bus,
            state: Mutex::new(ChannelState {
                unducked_volume: initial.volume,
                ducked: false,
            }),
        })
    }
}
