//! Audio focus walkthrough
//!
//! Wires a coordinator and a speaker channel to an in-process platform and
//! plays through a phone call: transient loss, regained focus, ducking for a
//! notification, and release.
//!
//! Run with:
//! ```bash
//! cargo run -p core-audio --example focus_demo
//!
//! # JSON logs
//! cargo run -p core-audio --example focus_demo -- json
//! ```

use anyhow::Context;
use bridge_traits::{
    AudioFocusManager, FocusChange, FocusChangeListener, FocusRequest, FocusRequestResult,
    LogLevel, PlayerController, Speaker, SpeakerSettings,
};
use core_audio::{AudioFocusCoordinator, ChannelVolumeManager};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use parking_lot::Mutex;
use std::env;
use std::sync::Arc;
use tracing::info;

/// Platform that grants every request and lets the demo push focus changes.
#[derive(Default)]
struct SimulatedPlatform {
    listener: Mutex<Option<Arc<dyn FocusChangeListener>>>,
}

impl SimulatedPlatform {
    fn push(&self, change: FocusChange) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            info!(%change, "Platform focus change");
            listener.on_focus_change(change);
        }
    }
}

impl AudioFocusManager for SimulatedPlatform {
    fn request_focus(
        &self,
        request: &FocusRequest,
        listener: Arc<dyn FocusChangeListener>,
    ) -> FocusRequestResult {
        info!(?request, "Platform granting focus");
        *self.listener.lock() = Some(listener);
        FocusRequestResult::Granted
    }

    fn abandon_focus(&self, _request: &FocusRequest) -> bridge_traits::error::Result<()> {
        info!("Platform focus abandoned");
        *self.listener.lock() = None;
        Ok(())
    }
}

struct ConsolePlayer;

impl PlayerController for ConsolePlayer {
    fn start_playback_now(&self) {
        info!("player: start");
    }
    fn request_resuming_playback(&self) {
        info!("player: resume");
    }
    fn request_pause_playback(&self) {
        info!("player: pause");
    }
    fn request_stop_playback(&self) {
        info!("player: stop");
    }
    fn adjust_playback_volume(&self, volume_multiplier: f32) {
        info!(volume_multiplier, "player: volume");
    }
    fn failed_to_acquire_focus(&self) {
        info!("player: focus denied");
    }
}

struct ConsoleSpeaker {
    settings: Mutex<SpeakerSettings>,
}

impl Speaker for ConsoleSpeaker {
    fn set_volume(&self, volume: i8) -> bridge_traits::error::Result<()> {
        info!(volume, "speaker: volume");
        self.settings.lock().volume = volume;
        Ok(())
    }

    fn set_mute(&self, mute: bool) -> bridge_traits::error::Result<()> {
        info!(mute, "speaker: mute");
        self.settings.lock().mute = mute;
        Ok(())
    }

    fn speaker_settings(&self) -> bridge_traits::error::Result<SpeakerSettings> {
        Ok(*self.settings.lock())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = match env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::default(),
    };
    init_logging(LoggingConfig::default().with_format(format).with_level(LogLevel::Debug))
        .context("failed to initialize logging")?;

    let bus = EventBus::default();
    let mut events = EventStream::new(bus.subscribe());
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(severity = ?event.severity(), "event: {}", event.description());
        }
    });

    let platform = Arc::new(SimulatedPlatform::default());
    let config = CoreConfig::builder()
        .focus_manager(platform.clone())
        .event_bus(bus.clone())
        .build()?;

    let coordinator = AudioFocusCoordinator::from_config(&config);
    coordinator.set_player_controller(Arc::new(ConsolePlayer));

    let speaker = Arc::new(ConsoleSpeaker {
        settings: Mutex::new(SpeakerSettings::new(60, false)),
    });
    let channel = ChannelVolumeManager::builder(speaker)
        .with_config(&config)
        .build()?;

    info!("=== Start playback ===");
    coordinator.start_playback_after_acquiring_focus()?;

    info!("=== Incoming call ===");
    platform.push(FocusChange::LossTransient);
    platform.push(FocusChange::Gain);

    info!("=== Notification over music ===");
    channel.start_ducking()?;
    coordinator.start_ducking()?;
    channel.set_unducked_volume(80)?;
    coordinator.stop_ducking()?;
    channel.stop_ducking()?;
    info!(settings = ?channel.speaker_settings()?, "Channel settings");

    info!("=== Done ===");
    coordinator.relinquish_audio_focus_if_currently_acquired()?;
    info!(state = %coordinator.state(), "Final focus state");

    drop(coordinator);
    drop(channel);
    drop(config);
    drop(bus);
    printer.await?;
    Ok(())
}
