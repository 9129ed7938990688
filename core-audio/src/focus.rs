//! # Audio Focus Coordinator
//!
//! Acquires and releases platform audio focus on behalf of a media player and
//! turns focus changes into playback commands.
//!
//! ## Transitions
//!
//! | Current               | Change               | Next            | Command                     |
//! |-----------------------|----------------------|-----------------|-----------------------------|
//! | WaitingForAcquisition | Gain                 | Acquired        | `start_playback_now`        |
//! | LostTransient         | Gain                 | Acquired        | `request_resuming_playback` |
//! | Acquired / Ducked     | Gain                 | Acquired        | none                        |
//! | None                  | Gain                 | Acquired        | `start_playback_now`        |
//! | any                   | Loss                 | None            | `request_stop_playback`     |
//! | any                   | LossTransient        | LostTransient   | `request_pause_playback`    |
//! | any                   | LossTransientCanDuck | unchanged       | none, logged                |
//! | any                   | None                 | None            | none                        |
//!
//! Gain from `None` is a safety net for out-of-order platform callbacks: the
//! platform says we hold focus, so playback starts even though no request is
//! outstanding. Focus is always requested with "pause when ducked" off, so
//! `LossTransientCanDuck` is never expected and is only logged.
//!
//! ## Serialisation
//!
//! Public methods and platform callbacks all run under one re-entrant lock.
//! Calls from different threads are applied one at a time; a player
//! controller that calls back into the coordinator from inside a command, or
//! a platform that delivers the focus callback synchronously inside
//! `request_focus`, re-enters on the same thread without deadlocking.
//!
//! A `Delayed` grant has no timeout: the coordinator waits in
//! `WaitingForAcquisition` until the platform sends `Gain` or a loss, or until
//! focus is relinquished.

use crate::error::{AudioError, Result};
use bridge_traits::{
    AudioFocusManager, ContentType, DuckingObserver, FocusChange, FocusChangeListener,
    FocusRequest, FocusRequestResult, PlayerController,
};
use core_runtime::config::{CoreConfig, FocusSettings};
use core_runtime::events::{CoreEvent, EventBus, FocusEvent};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, Weak};

/// Audio focus state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FocusState {
    /// No focus held or requested.
    #[default]
    None,
    /// Request answered with `Delayed`; waiting for `Gain`.
    WaitingForAcquisition,
    /// Focus held.
    Acquired,
    /// Focus held at reduced volume.
    Ducked,
    /// Focus lost briefly; playback paused until `Gain`.
    LostTransient,
}

impl FocusState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusState::None => "None",
            FocusState::WaitingForAcquisition => "WaitingForAcquisition",
            FocusState::Acquired => "Acquired",
            FocusState::Ducked => "Ducked",
            FocusState::LostTransient => "LostTransient",
        }
    }

    /// States in which a focus request is outstanding or granted.
    pub fn holds_focus(&self) -> bool {
        matches!(
            self,
            FocusState::WaitingForAcquisition | FocusState::Acquired | FocusState::Ducked
        )
    }
}

impl fmt::Display for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct CoordinatorState {
    focus_state: FocusState,
    player_controller: Option<Arc<dyn PlayerController>>,
    ducking_observer: Option<Arc<dyn DuckingObserver>>,
    /// Template for the next request.
    focus_request: FocusRequest,
    /// Request last handed to the platform; abandoned on release.
    outstanding_request: Option<FocusRequest>,
}

/// Drives playback from platform audio-focus changes.
///
/// Created behind an `Arc`; the platform receives a weak listener so it
/// never keeps the coordinator alive.
///
/// ```rust,ignore
/// let coordinator = AudioFocusCoordinator::from_config(&config);
/// coordinator.set_player_controller(player);
/// coordinator.start_playback_after_acquiring_focus()?;
/// // ... platform delivers focus changes ...
/// coordinator.relinquish_audio_focus_if_currently_acquired()?;
/// ```
pub struct AudioFocusCoordinator {
    focus_manager: Arc<dyn AudioFocusManager>,
    settings: FocusSettings,
    event_bus: Option<EventBus>,
    listener: Arc<dyn FocusChangeListener>,
    inner: ReentrantMutex<RefCell<CoordinatorState>>,
}

impl AudioFocusCoordinator {
    /// Coordinator with default focus settings and no event bus.
    pub fn new(focus_manager: Arc<dyn AudioFocusManager>) -> Arc<Self> {
        Self::with_settings(focus_manager, FocusSettings::default(), None)
    }

    /// Coordinator wired from a validated [`CoreConfig`].
    pub fn from_config(config: &CoreConfig) -> Arc<Self> {
        let coordinator = Self::with_settings(
            Arc::clone(&config.focus_manager),
            config.focus,
            config.event_bus.clone(),
        );
        if let Some(observer) = &config.ducking_observer {
            coordinator.set_ducking_observer(Some(Arc::clone(observer)));
        }
        coordinator
    }

    pub fn with_settings(
        focus_manager: Arc<dyn AudioFocusManager>,
        settings: FocusSettings,
        event_bus: Option<EventBus>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| Self {
            focus_manager,
            settings,
            event_bus,
            listener: Arc::new(CoordinatorListener {
                coordinator: weak.clone(),
            }),
            inner: ReentrantMutex::new(RefCell::new(CoordinatorState {
                focus_state: FocusState::None,
                player_controller: None,
                ducking_observer: None,
                focus_request: FocusRequest::media(settings.content_type),
                outstanding_request: None,
            })),
        })
    }

    /// Current focus state.
    pub fn state(&self) -> FocusState {
        self.inner.lock().borrow().focus_state
    }

    /// Attach the player that receives playback commands.
    pub fn set_player_controller(&self, controller: Arc<dyn PlayerController>) {
        let guard = self.inner.lock();
        guard.borrow_mut().player_controller = Some(controller);
    }

    pub fn has_player_controller(&self) -> bool {
        self.inner.lock().borrow().player_controller.is_some()
    }

    /// Observer told about client-side ducking; `None` detaches it.
    pub fn set_ducking_observer(&self, observer: Option<Arc<dyn DuckingObserver>>) {
        let guard = self.inner.lock();
        guard.borrow_mut().ducking_observer = observer;
    }

    /// Rebuild the request used for the next focus acquisition, e.g. to
    /// advertise speech content for spoken-word media.
    ///
    /// A request already handed to the platform is still the one abandoned
    /// on release.
    pub fn reset_focus_request(&self, content_type: ContentType) {
        let guard = self.inner.lock();
        guard.borrow_mut().focus_request = FocusRequest::media(content_type);
        tracing::debug!(?content_type, "Focus request reset");
    }

    /// Start playback once focus is held.
    ///
    /// - `Acquired`/`Ducked`: starts immediately.
    /// - `WaitingForAcquisition`: nothing; the pending request's `Gain` starts playback.
    /// - `LostTransient`/`None`: requests focus. `Granted` starts playback,
    ///   `Delayed` waits, `Failed` reports `failed_to_acquire_focus`.
    ///
    /// # Errors
    ///
    /// [`AudioError::PlayerControllerMissing`] if no player is attached.
    pub fn start_playback_after_acquiring_focus(&self) -> Result<()> {
        let guard = self.inner.lock();
        let controller = Self::require_controller(&guard)?;
        let current = guard.borrow().focus_state;
        tracing::debug!(state = %current, "Start playback after acquiring focus");

        match current {
            FocusState::Acquired | FocusState::Ducked => controller.start_playback_now(),
            FocusState::WaitingForAcquisition => {
                tracing::debug!("Waiting for audio focus from prior request");
            }
            FocusState::LostTransient | FocusState::None => {
                let request = {
                    let mut state = guard.borrow_mut();
                    state.outstanding_request = Some(state.focus_request);
                    state.focus_request
                };

                tracing::debug!(?request, "Requesting audio focus");
                let response = self
                    .focus_manager
                    .request_focus(&request, Arc::clone(&self.listener));
                tracing::debug!(?response, "Audio focus response");

                let after = guard.borrow().focus_state;
                if after != current {
                    // A focus change was delivered from inside request_focus and
                    // has already been acted on.
                    tracing::debug!(state = %after, "Focus changed during request");
                    return Ok(());
                }

                match response {
                    FocusRequestResult::Granted => {
                        self.set_state(&guard, FocusState::Acquired);
                        controller.start_playback_now();
                    }
                    FocusRequestResult::Delayed => {
                        self.set_state(&guard, FocusState::WaitingForAcquisition);
                    }
                    FocusRequestResult::Failed => {
                        tracing::warn!("Audio focus request denied");
                        guard.borrow_mut().outstanding_request = None;
                        self.set_state(&guard, FocusState::None);
                        self.emit(FocusEvent::RequestDenied);
                        controller.failed_to_acquire_focus();
                    }
                }
            }
        }
        Ok(())
    }

    /// Give focus back if it is held or pending; otherwise do nothing.
    ///
    /// # Errors
    ///
    /// A platform error from abandoning focus is returned and the state is
    /// left unchanged.
    pub fn relinquish_audio_focus_if_currently_acquired(&self) -> Result<()> {
        let guard = self.inner.lock();
        let current = guard.borrow().focus_state;
        tracing::debug!(state = %current, "Relinquishing audio focus");

        if !current.holds_focus() {
            return Ok(());
        }

        let request = {
            let state = guard.borrow();
            state.outstanding_request.unwrap_or(state.focus_request)
        };
        self.abandon(&guard, &request)?;
        self.set_state(&guard, FocusState::None);
        Ok(())
    }

    /// Abandon any request still registered with the platform and return to
    /// `None`, whatever the current state. Also runs on drop.
    pub fn close(&self) -> Result<()> {
        let guard = self.inner.lock();
        let outstanding = guard.borrow().outstanding_request;
        match outstanding {
            Some(request) => {
                tracing::info!("Disposing the audio focus coordinator");
                self.abandon(&guard, &request)?;
            }
            None => tracing::debug!("No audio focus request to abandon"),
        }
        self.set_state(&guard, FocusState::None);
        Ok(())
    }

    /// Client-side ducking: scale player volume down. Independent of the
    /// focus state machine.
    pub fn start_ducking(&self) -> Result<()> {
        self.client_ducking(true)
    }

    /// Client-side ducking: restore player volume.
    pub fn stop_ducking(&self) -> Result<()> {
        self.client_ducking(false)
    }

    /// Apply a platform focus change. See the module table.
    pub fn on_focus_change(&self, change: FocusChange) {
        let guard = self.inner.lock();
        let current = guard.borrow().focus_state;
        tracing::debug!(state = %current, %change, "Focus changed");

        match change {
            FocusChange::Gain => {
                self.set_state(&guard, FocusState::Acquired);
                match current {
                    FocusState::WaitingForAcquisition => {
                        self.command(&guard, "start_playback_now", |p| p.start_playback_now())
                    }
                    FocusState::LostTransient => self.command(
                        &guard,
                        "request_resuming_playback",
                        |p| p.request_resuming_playback(),
                    ),
                    FocusState::Acquired | FocusState::Ducked => {}
                    FocusState::None => {
                        tracing::info!("Focus gained while in None state; starting playback");
                        self.command(&guard, "start_playback_now", |p| p.start_playback_now())
                    }
                }
            }
            FocusChange::Loss => {
                self.set_state(&guard, FocusState::None);
                self.command(&guard, "request_stop_playback", |p| {
                    p.request_stop_playback()
                });
            }
            FocusChange::LossTransient => {
                self.set_state(&guard, FocusState::LostTransient);
                self.command(&guard, "request_pause_playback", |p| {
                    p.request_pause_playback()
                });
            }
            FocusChange::None => {
                self.set_state(&guard, FocusState::None);
            }
            FocusChange::LossTransientCanDuck
            | FocusChange::GainTransient
            | FocusChange::GainTransientExclusive
            | FocusChange::GainTransientMayDuck => {
                tracing::warn!(
                    state = %current,
                    %change,
                    "Unexpected focus change ignored; focus is requested without duck-on-loss"
                );
                self.emit(FocusEvent::UnexpectedChange {
                    change: change.to_string(),
                    state: current.to_string(),
                });
            }
        }
    }

    fn client_ducking(&self, ducked: bool) -> Result<()> {
        let guard = self.inner.lock();
        let controller = Self::require_controller(&guard)?;
        let multiplier = if ducked {
            self.settings.duck_volume_multiplier
        } else {
            self.settings.normal_volume_multiplier
        };

        tracing::debug!(ducked, multiplier, "Client-side ducking");
        controller.adjust_playback_volume(multiplier);

        let observer = guard.borrow().ducking_observer.clone();
        if let Some(observer) = observer {
            observer.report_client_ducking_state(ducked);
        }
        self.emit(FocusEvent::ClientDuckingChanged { ducked });
        Ok(())
    }

    fn require_controller(
        cell: &RefCell<CoordinatorState>,
    ) -> Result<Arc<dyn PlayerController>> {
        cell.borrow()
            .player_controller
            .clone()
            .ok_or(AudioError::PlayerControllerMissing)
    }

    fn command(
        &self,
        cell: &RefCell<CoordinatorState>,
        name: &'static str,
        command: impl FnOnce(&dyn PlayerController),
    ) {
        let controller = cell.borrow().player_controller.clone();
        match controller {
            Some(controller) => command(controller.as_ref()),
            None => tracing::error!(command = name, "No player controller attached; command dropped"),
        }
    }

    fn abandon(&self, cell: &RefCell<CoordinatorState>, request: &FocusRequest) -> Result<()> {
        tracing::debug!("Abandoning audio focus");
        self.focus_manager.abandon_focus(request).map_err(|e| {
            tracing::warn!(error = %e, "Failed to abandon audio focus");
            self.emit(FocusEvent::ReleaseFailed {
                reason: e.to_string(),
            });
            AudioError::from(e)
        })?;
        cell.borrow_mut().outstanding_request = None;
        self.emit(FocusEvent::Released);
        Ok(())
    }

    fn set_state(&self, cell: &RefCell<CoordinatorState>, next: FocusState) {
        let previous = std::mem::replace(&mut cell.borrow_mut().focus_state, next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "Focus state changed");
            self.emit(FocusEvent::StateChanged {
                from: previous.to_string(),
                to: next.to_string(),
            });
        }
    }

    fn emit(&self, event: FocusEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Focus(event)).ok();
        }
    }

    #[cfg(test)]
    fn force_state(&self, state: FocusState) {
        self.inner.lock().borrow_mut().focus_state = state;
    }
}

impl FocusChangeListener for AudioFocusCoordinator {
    fn on_focus_change(&self, change: FocusChange) {
        AudioFocusCoordinator::on_focus_change(self, change);
    }
}

impl Drop for AudioFocusCoordinator {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "Failed to release audio focus on drop");
        }
    }
}

impl fmt::Debug for AudioFocusCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFocusCoordinator")
            .field("state", &self.state())
            .field("settings", &self.settings)
            .field("has_player_controller", &self.has_player_controller())
            .finish()
    }
}

/// Listener handed to the platform; holds the coordinator weakly.
struct CoordinatorListener {
    coordinator: Weak<AudioFocusCoordinator>,
}

impl FocusChangeListener for CoordinatorListener {
    fn on_focus_change(&self, change: FocusChange) {
        match self.coordinator.upgrade() {
            Some(coordinator) => coordinator.on_focus_change(change),
            None => tracing::debug!(%change, "Focus change for a dropped coordinator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::BridgeError;
    use core_runtime::events::EventSeverity;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPlayer {
        commands: Mutex<Vec<String>>,
    }

    impl RecordingPlayer {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.commands.lock().unwrap())
        }

        fn push(&self, command: impl Into<String>) {
            self.commands.lock().unwrap().push(command.into());
        }
    }

    impl PlayerController for RecordingPlayer {
        fn start_playback_now(&self) {
            self.push("start");
        }
        fn request_resuming_playback(&self) {
            self.push("resume");
        }
        fn request_pause_playback(&self) {
            self.push("pause");
        }
        fn request_stop_playback(&self) {
            self.push("stop");
        }
        fn adjust_playback_volume(&self, volume_multiplier: f32) {
            self.push(format!("volume:{volume_multiplier}"));
        }
        fn failed_to_acquire_focus(&self) {
            self.push("failed");
        }
    }

    struct FakeFocusManager {
        response: Mutex<FocusRequestResult>,
        requests: Mutex<Vec<FocusRequest>>,
        abandoned: Mutex<usize>,
        fail_abandon: Mutex<bool>,
    }

    impl FakeFocusManager {
        fn new(response: FocusRequestResult) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(response),
                requests: Mutex::new(Vec::new()),
                abandoned: Mutex::new(0),
                fail_abandon: Mutex::new(false),
            })
        }

        fn requests(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn abandoned(&self) -> usize {
            *self.abandoned.lock().unwrap()
        }
    }

    impl AudioFocusManager for FakeFocusManager {
        fn request_focus(
            &self,
            request: &FocusRequest,
            _listener: Arc<dyn FocusChangeListener>,
        ) -> FocusRequestResult {
            self.requests.lock().unwrap().push(*request);
            *self.response.lock().unwrap()
        }

        fn abandon_focus(&self, _request: &FocusRequest) -> bridge_traits::error::Result<()> {
            if *self.fail_abandon.lock().unwrap() {
                return Err(BridgeError::Rejected("abandon refused".into()));
            }
            *self.abandoned.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn setup(
        response: FocusRequestResult,
    ) -> (Arc<AudioFocusCoordinator>, Arc<RecordingPlayer>, Arc<FakeFocusManager>) {
        let manager = FakeFocusManager::new(response);
        let player = Arc::new(RecordingPlayer::default());
        let coordinator = AudioFocusCoordinator::new(manager.clone());
        coordinator.set_player_controller(player.clone());
        (coordinator, player, manager)
    }

    const ALL_STATES: [FocusState; 5] = [
        FocusState::None,
        FocusState::WaitingForAcquisition,
        FocusState::Acquired,
        FocusState::Ducked,
        FocusState::LostTransient,
    ];

    #[test]
    fn test_gain_transitions() {
        let cases = [
            (FocusState::WaitingForAcquisition, vec!["start"]),
            (FocusState::LostTransient, vec!["resume"]),
            (FocusState::Acquired, vec![]),
            (FocusState::Ducked, vec![]),
            (FocusState::None, vec!["start"]),
        ];

        for (from, expected) in cases {
            let (coordinator, player, _) = setup(FocusRequestResult::Granted);
            coordinator.force_state(from);
            coordinator.on_focus_change(FocusChange::Gain);
            assert_eq!(coordinator.state(), FocusState::Acquired, "from {from}");
            assert_eq!(player.take(), expected, "from {from}");
        }
    }

    #[test]
    fn test_loss_transitions_from_every_state() {
        for from in ALL_STATES {
            let (coordinator, player, _) = setup(FocusRequestResult::Granted);

            coordinator.force_state(from);
            coordinator.on_focus_change(FocusChange::Loss);
            assert_eq!(coordinator.state(), FocusState::None);
            assert_eq!(player.take(), vec!["stop"]);

            coordinator.force_state(from);
            coordinator.on_focus_change(FocusChange::LossTransient);
            assert_eq!(coordinator.state(), FocusState::LostTransient);
            assert_eq!(player.take(), vec!["pause"]);
        }
    }

    #[test]
    fn test_ignored_and_none_changes_from_every_state() {
        for from in ALL_STATES {
            let (coordinator, player, _) = setup(FocusRequestResult::Granted);
            coordinator.force_state(from);

            for change in [
                FocusChange::LossTransientCanDuck,
                FocusChange::GainTransient,
                FocusChange::GainTransientExclusive,
                FocusChange::GainTransientMayDuck,
            ] {
                coordinator.on_focus_change(change);
                assert_eq!(coordinator.state(), from, "{change} from {from}");
            }

            coordinator.on_focus_change(FocusChange::None);
            assert_eq!(coordinator.state(), FocusState::None);
            assert!(player.take().is_empty());
        }
    }

    #[test]
    fn test_start_playback_when_focus_already_held() {
        for from in [FocusState::Acquired, FocusState::Ducked] {
            let (coordinator, player, manager) = setup(FocusRequestResult::Granted);
            coordinator.force_state(from);

            coordinator.start_playback_after_acquiring_focus().unwrap();
            assert_eq!(player.take(), vec!["start"]);
            assert_eq!(manager.requests(), 0);
            assert_eq!(coordinator.state(), from);
        }
    }

    #[test]
    fn test_start_playback_while_waiting_is_noop() {
        let (coordinator, player, manager) = setup(FocusRequestResult::Granted);
        coordinator.force_state(FocusState::WaitingForAcquisition);

        coordinator.start_playback_after_acquiring_focus().unwrap();
        assert!(player.take().is_empty());
        assert_eq!(manager.requests(), 0);
    }

    #[test]
    fn test_start_playback_requests_focus_from_lost_transient() {
        let (coordinator, player, manager) = setup(FocusRequestResult::Granted);
        coordinator.force_state(FocusState::LostTransient);

        coordinator.start_playback_after_acquiring_focus().unwrap();
        assert_eq!(manager.requests(), 1);
        assert_eq!(coordinator.state(), FocusState::Acquired);
        assert_eq!(player.take(), vec!["start"]);
    }

    #[test]
    fn test_relinquish_from_holding_states() {
        for from in [
            FocusState::WaitingForAcquisition,
            FocusState::Acquired,
            FocusState::Ducked,
        ] {
            let (coordinator, _, manager) = setup(FocusRequestResult::Granted);
            coordinator.force_state(from);
            coordinator
                .relinquish_audio_focus_if_currently_acquired()
                .unwrap();
            assert_eq!(manager.abandoned(), 1, "from {from}");
            assert_eq!(coordinator.state(), FocusState::None);
        }
    }

    #[test]
    fn test_relinquish_from_lost_transient_is_noop() {
        let (coordinator, _, manager) = setup(FocusRequestResult::Granted);
        coordinator.force_state(FocusState::LostTransient);
        coordinator
            .relinquish_audio_focus_if_currently_acquired()
            .unwrap();
        assert_eq!(manager.abandoned(), 0);
        assert_eq!(coordinator.state(), FocusState::LostTransient);
    }

    #[test]
    fn test_failed_abandon_keeps_state() {
        let (coordinator, _, manager) = setup(FocusRequestResult::Granted);
        coordinator.start_playback_after_acquiring_focus().unwrap();
        *manager.fail_abandon.lock().unwrap() = true;

        let err = coordinator
            .relinquish_audio_focus_if_currently_acquired()
            .unwrap_err();
        assert!(matches!(err, AudioError::Bridge(_)));
        assert_eq!(coordinator.state(), FocusState::Acquired);
    }

    #[test]
    fn test_failed_abandon_emits_error_event() {
        let manager = FakeFocusManager::new(FocusRequestResult::Granted);
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let coordinator =
            AudioFocusCoordinator::with_settings(manager.clone(), FocusSettings::default(), Some(bus));
        coordinator.set_player_controller(Arc::new(RecordingPlayer::default()));
        coordinator.start_playback_after_acquiring_focus().unwrap();
        *manager.fail_abandon.lock().unwrap() = true;

        assert!(coordinator
            .relinquish_audio_focus_if_currently_acquired()
            .is_err());

        let mut failures = Vec::new();
        while let Ok(event) = events.try_recv() {
            if event.severity() == EventSeverity::Error {
                failures.push(event);
            }
        }
        assert_eq!(
            failures,
            vec![CoreEvent::Focus(FocusEvent::ReleaseFailed {
                reason: "Request rejected by platform: abandon refused".into()
            })]
        );
    }

    #[test]
    fn test_close_abandons_outstanding_request_after_loss() {
        let (coordinator, _, manager) = setup(FocusRequestResult::Granted);
        coordinator.start_playback_after_acquiring_focus().unwrap();
        coordinator.on_focus_change(FocusChange::Loss);

        coordinator.close().unwrap();
        assert_eq!(manager.abandoned(), 1);

        // Nothing left to abandon.
        coordinator.close().unwrap();
        assert_eq!(manager.abandoned(), 1);
    }

    #[test]
    fn test_drop_releases_focus() {
        let (coordinator, _, manager) = setup(FocusRequestResult::Delayed);
        coordinator.start_playback_after_acquiring_focus().unwrap();
        drop(coordinator);
        assert_eq!(manager.abandoned(), 1);
    }

    #[test]
    fn test_reset_focus_request_changes_next_request() {
        let (coordinator, _, manager) = setup(FocusRequestResult::Granted);
        coordinator.reset_focus_request(ContentType::Speech);
        coordinator.start_playback_after_acquiring_focus().unwrap();

        let requests = manager.requests.lock().unwrap();
        assert_eq!(requests[0].content_type, ContentType::Speech);
        assert!(!requests[0].pause_when_ducked);
    }

    #[test]
    fn test_callback_without_controller_still_transitions() {
        let manager = FakeFocusManager::new(FocusRequestResult::Granted);
        let coordinator = AudioFocusCoordinator::new(manager);
        coordinator.on_focus_change(FocusChange::Gain);
        assert_eq!(coordinator.state(), FocusState::Acquired);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(FocusState::WaitingForAcquisition.to_string(), "WaitingForAcquisition");
        assert!(!FocusState::LostTransient.holds_focus());
        assert!(FocusState::Ducked.holds_focus());
    }
}
