//! # Core Configuration Module
//!
//! Configuration for the audio core.
//!
//! ## Overview
//!
//! [`CoreConfig`] is built with [`CoreConfigBuilder`] and holds the injected
//! platform capabilities plus the tunables for volume handling and focus
//! requests. The builder validates eagerly so a misconfigured host fails at
//! startup instead of on the first focus change.
//!
//! ## Required Dependencies
//!
//! - `AudioFocusManager` - platform focus arbitration
//!
//! ## Optional Dependencies
//!
//! - `DuckingObserver` - notified when client-side ducking toggles
//! - `EventBus` - receives focus and volume events
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, FocusSettings};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .focus_manager(Arc::new(AndroidFocusManager::new(audio_manager)))
//!     .focus_settings(FocusSettings::default().with_duck_volume_multiplier(0.3))
//!     .build()?;
//! ```
//!
//! Tunables can also come from JSON shipped with the host:
//!
//! ```rust
//! use core_runtime::config::VolumeSettings;
//!
//! let volume = VolumeSettings::from_json(r#"{ "min": 0, "max": 10 }"#).unwrap();
//! assert_eq!(volume.max, 10);
//! ```

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{AudioFocusManager, ContentType, DuckingObserver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lowest level accepted by the set-volume API.
pub const DEFAULT_VOLUME_MIN: i8 = 0;
/// Highest level accepted by the set-volume API.
pub const DEFAULT_VOLUME_MAX: i8 = 100;
/// Fraction of the maximum a ducked channel may play at.
pub const DUCKED_VOLUME_CEILING_FRACTION: f32 = 0.20;
/// Player volume multiplier applied while client-side ducking is active.
pub const DEFAULT_DUCK_VOLUME_MULTIPLIER: f32 = 0.2;
/// Player volume multiplier applied when not ducked.
pub const DEFAULT_NORMAL_VOLUME_MULTIPLIER: f32 = 1.0;

// ============================================================================
// Volume settings
// ============================================================================

/// Legal volume range for channel volume managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSettings {
    #[serde(default = "default_volume_min")]
    pub min: i8,
    #[serde(default = "default_volume_max")]
    pub max: i8,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            min: DEFAULT_VOLUME_MIN,
            max: DEFAULT_VOLUME_MAX,
        }
    }
}

impl VolumeSettings {
    pub fn new(min: i8, max: i8) -> Self {
        Self { min, max }
    }

    /// Parse and validate from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min < 0 {
            return Err(Error::Config(format!(
                "Volume minimum must not be negative (got {})",
                self.min
            )));
        }
        if self.max <= self.min {
            return Err(Error::Config(format!(
                "Volume maximum ({}) must be greater than minimum ({})",
                self.max, self.min
            )));
        }
        if self.min > self.ducked_ceiling() {
            return Err(Error::Config(format!(
                "Volume minimum ({}) must not exceed the ducked ceiling ({}) for maximum {}",
                self.min,
                self.ducked_ceiling(),
                self.max
            )));
        }
        Ok(())
    }

    /// Highest level a ducked channel may play at, `0.2·max` rounded down.
    pub fn ducked_ceiling(&self) -> i8 {
        (f32::from(self.max) * DUCKED_VOLUME_CEILING_FRACTION) as i8
    }

    /// Whether `volume` lies in `min..=max`.
    pub fn contains(&self, volume: i8) -> bool {
        (self.min..=self.max).contains(&volume)
    }
}

fn default_volume_min() -> i8 {
    DEFAULT_VOLUME_MIN
}

fn default_volume_max() -> i8 {
    DEFAULT_VOLUME_MAX
}

// ============================================================================
// Focus settings
// ============================================================================

/// Tunables for the audio-focus coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusSettings {
    /// Multiplier sent to the player by `start_ducking`.
    #[serde(default = "default_duck_volume_multiplier")]
    pub duck_volume_multiplier: f32,

    /// Multiplier sent to the player by `stop_ducking`.
    #[serde(default = "default_normal_volume_multiplier")]
    pub normal_volume_multiplier: f32,

    /// Content type advertised in focus requests.
    #[serde(default)]
    pub content_type: ContentType,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            duck_volume_multiplier: DEFAULT_DUCK_VOLUME_MULTIPLIER,
            normal_volume_multiplier: DEFAULT_NORMAL_VOLUME_MULTIPLIER,
            content_type: ContentType::default(),
        }
    }
}

impl FocusSettings {
    pub fn with_duck_volume_multiplier(mut self, multiplier: f32) -> Self {
        self.duck_volume_multiplier = multiplier;
        self
    }

    pub fn with_normal_volume_multiplier(mut self, multiplier: f32) -> Self {
        self.normal_volume_multiplier = multiplier;
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Parse and validate from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("duck_volume_multiplier", self.duck_volume_multiplier),
            ("normal_volume_multiplier", self.normal_volume_multiplier),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be between 0.0 and 1.0 (got {})",
                    name, value
                )));
            }
        }
        if self.duck_volume_multiplier > self.normal_volume_multiplier {
            return Err(Error::Config(
                "duck_volume_multiplier cannot exceed normal_volume_multiplier".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_duck_volume_multiplier() -> f32 {
    DEFAULT_DUCK_VOLUME_MULTIPLIER
}

fn default_normal_volume_multiplier() -> f32 {
    DEFAULT_NORMAL_VOLUME_MULTIPLIER
}

// ============================================================================
// Core configuration
// ============================================================================

/// Dependencies and settings for the audio core.
#[derive(Clone)]
pub struct CoreConfig {
    /// Platform focus arbitration (required)
    pub focus_manager: Arc<dyn AudioFocusManager>,

    /// Client-side ducking observer (optional)
    pub ducking_observer: Option<Arc<dyn DuckingObserver>>,

    /// Event bus for state change notifications (optional)
    pub event_bus: Option<EventBus>,

    pub volume: VolumeSettings,

    pub focus: FocusSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("focus_manager", &"AudioFocusManager { ... }")
            .field(
                "ducking_observer",
                &self
                    .ducking_observer
                    .as_ref()
                    .map(|_| "DuckingObserver { ... }"),
            )
            .field("event_bus", &self.event_bus)
            .field("volume", &self.volume)
            .field("focus", &self.focus)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    focus_manager: Option<Arc<dyn AudioFocusManager>>,
    ducking_observer: Option<Arc<dyn DuckingObserver>>,
    event_bus: Option<EventBus>,
    volume: Option<VolumeSettings>,
    focus: Option<FocusSettings>,
}

impl CoreConfigBuilder {
    pub fn focus_manager(mut self, manager: Arc<dyn AudioFocusManager>) -> Self {
        self.focus_manager = Some(manager);
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

    pub fn volume_settings(mut self, settings: VolumeSettings) -> Self {
        self.volume = Some(settings);
        self
    }

    pub fn focus_settings(mut self, settings: FocusSettings) -> Self {
        self.focus = Some(settings);
        self
    }

    /// Validate and assemble the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when no `AudioFocusManager` was injected
    /// - [`Error::Config`] when volume or focus settings are out of range
    pub fn build(self) -> Result<CoreConfig> {
        let focus_manager = self
            .focus_manager
            .ok_or_else(|| Error::CapabilityMissing {
                capability: "AudioFocusManager".to_string(),
                message: "No audio focus manager provided. Inject the platform's \
                          focus adapter before building the core."
                    .to_string(),
            })?;

        let volume = self.volume.unwrap_or_default();
        volume.validate()?;

        let focus = self.focus.unwrap_or_default();
        focus.validate()?;

        Ok(CoreConfig {
            focus_manager,
            ducking_observer: self.ducking_observer,
            event_bus: self.event_bus,
            volume,
            focus,
        })
    }
}
