//! # Volume Curves
//!
//! A volume curve maps a channel's unducked volume to the volume it should
//! play at while ducked.

use core_runtime::config::VolumeSettings;
use std::fmt;
use std::sync::Arc;

/// Fraction of the maximum volume above which the ducked volume is flat.
const UPPER_BREAK_FRACTION: f32 = 0.40;

type CurveFn = dyn Fn(i8) -> i8 + Send + Sync;

/// Attenuation function used when a channel is ducked.
///
/// Curves must be pure and fast: they run while the channel lock is held.
///
/// ```rust
/// use core_audio::VolumeCurve;
/// use core_runtime::config::VolumeSettings;
///
/// let curve = VolumeCurve::default_for(VolumeSettings::default());
/// assert_eq!(curve.apply(50), 20);
/// assert_eq!(curve.apply(30), 10);
/// assert_eq!(curve.apply(10), 0);
///
/// let half = VolumeCurve::custom(|v| v / 2);
/// assert_eq!(half.apply(50), 25);
/// ```
#[derive(Clone)]
pub struct VolumeCurve {
    curve: Arc<CurveFn>,
    name: &'static str,
}

impl VolumeCurve {
    /// The piecewise default curve for `range`, with `M = range.max`:
    ///
    /// | unducked volume        | ducked volume     |
    /// |------------------------|-------------------|
    /// | `[0, 0.2·M)`           | `range.min`       |
    /// | `[0.2·M, 0.4·M]`       | `volume − 0.2·M`  |
    /// | above `0.4·M`          | `0.2·M`           |
    ///
    /// Loud channels all land on roughly 20% of maximum; the short linear
    /// ramp keeps quiet channels from jumping up when ducked. For any range
    /// that passes [`VolumeSettings::validate`] the output stays within
    /// `[range.min, range.ducked_ceiling()]`.
    pub fn default_for(range: VolumeSettings) -> Self {
        let min = range.min;
        let lower = range.ducked_ceiling();
        let upper = (f32::from(range.max) * UPPER_BREAK_FRACTION) as i8;

        let curve = move |unducked: i8| -> i8 {
            let ducked = if unducked > upper {
                lower
            } else if unducked >= lower {
                unducked - lower
            } else {
                min
            };
            // Breakpoints are floored, so the ramp can overshoot `lower`
            // when `max` is not a multiple of 5.
            ducked.min(lower).max(min)
        };

        Self {
            curve: Arc::new(curve),
            name: "default",
        }
    }

    /// Wrap a caller-supplied curve.
    pub fn custom<F>(curve: F) -> Self
    where
        F: Fn(i8) -> i8 + Send + Sync + 'static,
    {
        Self {
            curve: Arc::new(curve),
            name: "custom",
        }
    }

    /// Ducked volume for `unducked`.
    pub fn apply(&self, unducked: i8) -> i8 {
        (self.curve)(unducked)
    }
}

impl Default for VolumeCurve {
    fn default() -> Self {
        Self::default_for(VolumeSettings::default())
    }
}

impl fmt::Debug for VolumeCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolumeCurve").field("name", &self.name).finish()
    }
}
