//! Playback control capabilities
//!
//! The focus coordinator never touches audio hardware. It drives playback by
//! issuing commands through [`PlayerController`], and reports client-side
//! ducking through [`DuckingObserver`].

/// Commands the focus coordinator issues to the media player.
///
/// All methods are invoked synchronously from inside coordinator calls or
/// focus callbacks. Implementations may call back into the coordinator.
pub trait PlayerController: Send + Sync {
    /// Intent to play is established and focus is now held. Start playing.
    fn start_playback_now(&self);

    /// Focus came back after a transient loss. Resume if playback was paused
    /// because of that loss.
    fn request_resuming_playback(&self);

    /// Focus was lost transiently. Pause.
    fn request_pause_playback(&self);

    /// Focus was lost permanently. Stop.
    fn request_stop_playback(&self);

    /// Scale playback volume. `volume_multiplier` is in `0.0..=1.0`.
    fn adjust_playback_volume(&self, volume_multiplier: f32);

    /// Focus could not be acquired for a pending playback request.
    fn failed_to_acquire_focus(&self);
}

/// Observer of client-side ducking. Fire-and-forget.
pub trait DuckingObserver: Send + Sync {
    fn report_client_ducking_state(&self, ducked: bool);
}
