//! Channel volume and ducking behaviour against a mocked speaker.

use bridge_traits::{BridgeError, DuckingObserver, Speaker, SpeakerSettings};
use core_audio::{AudioError, ChannelVolumeManager, ChannelVolumeType, VolumeCurve};
use core_runtime::config::VolumeSettings;
use core_runtime::events::{CoreEvent, EventBus, VolumeEvent};
use mockall::{mock, predicate::eq, Sequence};
use std::sync::{Arc, Mutex};
use std::thread;

mock! {
    pub Speaker {}

    impl Speaker for Speaker {
        fn set_volume(&self, volume: i8) -> bridge_traits::error::Result<()>;
        fn set_mute(&self, mute: bool) -> bridge_traits::error::Result<()>;
        fn speaker_settings(&self) -> bridge_traits::error::Result<SpeakerSettings>;
    }
}

mock! {
    pub Observer {}

    impl DuckingObserver for Observer {
        fn report_client_ducking_state(&self, ducked: bool);
    }
}

fn speaker_at(volume: i8) -> MockSpeaker {
    let mut speaker = MockSpeaker::new();
    speaker
        .expect_speaker_settings()
        .returning(move || Ok(SpeakerSettings::new(volume, false)));
    speaker
}

#[test]
fn test_duck_and_restore_loud_channel() {
    let mut speaker = speaker_at(50);
    let mut seq = Sequence::new();
    speaker
        .expect_set_volume()
        .with(eq(20))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    speaker
        .expect_set_volume()
        .with(eq(50))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let channel = ChannelVolumeManager::new(Arc::new(speaker)).unwrap();
    assert_eq!(channel.channel_type(), ChannelVolumeType::AvsSpeakerVolume);

    channel.start_ducking().unwrap();
    assert!(channel.is_ducked());
    channel.stop_ducking().unwrap();
    assert!(!channel.is_ducked());
    assert_eq!(channel.unducked_volume(), 50);
}

#[test]
fn test_duck_quiet_channel_to_minimum() {
    let mut speaker = speaker_at(10);
    speaker
        .expect_set_volume()
        .with(eq(0))
        .times(1)
        .returning(|_| Ok(()));

    let channel = ChannelVolumeManager::new(Arc::new(speaker)).unwrap();
    channel.start_ducking().unwrap();
}

#[test]
fn test_set_volume_then_duck_and_restore() {
    let mut speaker = speaker_at(35);
    let mut seq = Sequence::new();
    for volume in [50, 20, 50] {
        speaker
            .expect_set_volume()
            .with(eq(volume))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
    }

    let channel = ChannelVolumeManager::new(Arc::new(speaker)).unwrap();
    channel.set_unducked_volume(50).unwrap();
    assert_eq!(channel.unducked_volume(), 50);
    assert!(!channel.is_ducked());

    channel.start_ducking().unwrap();
    channel.stop_ducking().unwrap();
    assert_eq!(channel.unducked_volume(), 50);
}

#[test]
fn test_set_quiet_volume_then_duck_to_minimum() {
    let mut speaker = speaker_at(35);
    let mut seq = Sequence::new();
    for volume in [10, 0] {
        speaker
            .expect_set_volume()
            .with(eq(volume))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
    }

    let channel = ChannelVolumeManager::new(Arc::new(speaker)).unwrap();
    channel.set_unducked_volume(10).unwrap();
    channel.start_ducking().unwrap();
    assert!(channel.is_ducked());
    assert_eq!(channel.unducked_volume(), 10);
}

#[test]
fn test_repeated_start_ducking_touches_speaker_once() {
    let mut speaker = speaker_at(50);
    speaker
        .expect_set_volume()
        .with(eq(20))
        .times(1)
        .returning(|_| Ok(()));

    let mut observer = MockObserver::new();
    observer
        .expect_report_client_ducking_state()
        .with(eq(true))
        .times(1)
        .return_const(());

    let channel = ChannelVolumeManager::builder(Arc::new(speaker))
        .ducking_observer(Arc::new(observer))
        .build()
        .unwrap();

    channel.start_ducking().unwrap();
    channel.start_ducking().unwrap();
    assert!(channel.is_ducked());
}

#[test]
fn test_stop_ducking_when_not_ducked_is_noop() {
    let mut speaker = speaker_at(50);
    speaker.expect_set_volume().never();

    let channel = ChannelVolumeManager::new(Arc::new(speaker)).unwrap();
    channel.stop_ducking().unwrap();
}

#[test]
fn test_set_unducked_volume_while_ducked() {
    let mut speaker = speaker_at(50);
    let mut seq = Sequence::new();
    for volume in [20, 10, 30] {
        speaker
            .expect_set_volume()
            .with(eq(volume))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
    }

    let channel = ChannelVolumeManager::new(Arc::new(speaker)).unwrap();
    channel.start_ducking().unwrap();
    // curve(30) = 10 goes to the speaker, 30 becomes the baseline
    channel.set_unducked_volume(30).unwrap();
    assert!(channel.is_ducked());
    assert_eq!(channel.unducked_volume(), 30);

    channel.stop_ducking().unwrap();
}

#[test]
fn test_out_of_range_volume_is_rejected_without_speaker_call() {
    let mut speaker = speaker_at(50);
    speaker.expect_set_volume().never();

    let channel = ChannelVolumeManager::new(Arc::new(speaker)).unwrap();
    for volume in [-1, 101] {
        let err = channel.set_unducked_volume(volume).unwrap_err();
        assert!(matches!(err, AudioError::InvalidVolume { min: 0, max: 100, .. }));
        assert!(err.is_precondition_violation());
    }
    assert_eq!(channel.unducked_volume(), 50);
}

#[test]
fn test_failed_duck_leaves_channel_unducked() {
    let mut speaker = speaker_at(50);
    let mut seq = Sequence::new();
    speaker
        .expect_set_volume()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(BridgeError::OperationFailed("device busy".into())));
    speaker
        .expect_set_volume()
        .with(eq(20))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let channel = ChannelVolumeManager::new(Arc::new(speaker)).unwrap();
    assert!(matches!(
        channel.start_ducking(),
        Err(AudioError::Bridge(BridgeError::OperationFailed(_)))
    ));
    assert!(!channel.is_ducked());

    channel.start_ducking().unwrap();
    assert!(channel.is_ducked());
}

#[test]
fn test_mute_is_independent_of_ducking() {
    let mut speaker = MockSpeaker::new();
    let muted = Arc::new(Mutex::new(false));
    let reported = Arc::clone(&muted);
    speaker
        .expect_speaker_settings()
        .returning(move || Ok(SpeakerSettings::new(20, *reported.lock().unwrap())));
    let stored = Arc::clone(&muted);
    speaker
        .expect_set_mute()
        .returning(move |mute| {
            *stored.lock().unwrap() = mute;
            Ok(())
        });
    speaker.expect_set_volume().returning(|_| Ok(()));

    let channel = ChannelVolumeManager::builder(Arc::new(speaker))
        .channel_type(ChannelVolumeType::AvsAlertsVolume)
        .build()
        .unwrap();

    channel.start_ducking().unwrap();
    channel.set_mute(true).unwrap();

    let settings = channel.speaker_settings().unwrap();
    assert_eq!(settings, SpeakerSettings::new(20, true));
    assert!(channel.is_ducked());
}

#[test]
fn test_custom_curve_and_events() {
    let mut speaker = speaker_at(80);
    speaker
        .expect_set_volume()
        .with(eq(40))
        .times(1)
        .returning(|_| Ok(()));
    speaker
        .expect_set_volume()
        .with(eq(80))
        .times(1)
        .returning(|_| Ok(()));

    let bus = EventBus::new(16);
    let mut events = bus.subscribe();

    let channel = ChannelVolumeManager::builder(Arc::new(speaker))
        .volume_curve(VolumeCurve::custom(|v| v / 2))
        .event_bus(bus)
        .build()
        .unwrap();
    channel.start_ducking().unwrap();
    channel.stop_ducking().unwrap();

    let id = channel.id();
    assert!(matches!(
        events.try_recv().unwrap(),
        CoreEvent::Volume(VolumeEvent::DuckingStarted { channel_id, volume: 40 }) if channel_id == id
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        CoreEvent::Volume(VolumeEvent::DuckingStopped { volume: 80, .. })
    ));
}

#[test]
fn test_initial_volume_outside_range_is_rejected() {
    let speaker = speaker_at(50);
    let result = ChannelVolumeManager::builder(Arc::new(speaker))
        .volume_settings(VolumeSettings::new(0, 10))
        .build();
    assert!(result.is_err());
}

/// Speaker that remembers its last level, for the concurrency test.
#[derive(Default)]
struct LevelSpeaker {
    volume: Mutex<i8>,
}

impl Speaker for LevelSpeaker {
    fn set_volume(&self, volume: i8) -> bridge_traits::error::Result<()> {
        *self.volume.lock().unwrap() = volume;
        Ok(())
    }

    fn set_mute(&self, _mute: bool) -> bridge_traits::error::Result<()> {
        Ok(())
    }

    fn speaker_settings(&self) -> bridge_traits::error::Result<SpeakerSettings> {
        Ok(SpeakerSettings::new(*self.volume.lock().unwrap(), false))
    }
}

#[test]
fn test_concurrent_ducking_ends_consistent() {
    let speaker = Arc::new(LevelSpeaker::default());
    *speaker.volume.lock().unwrap() = 70;
    let channel = Arc::new(ChannelVolumeManager::new(speaker.clone()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let channel = Arc::clone(&channel);
            thread::spawn(move || {
                for _ in 0..100 {
                    if i % 2 == 0 {
                        channel.start_ducking().unwrap();
                    } else {
                        channel.stop_ducking().unwrap();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let expected = if channel.is_ducked() { 20 } else { 70 };
    assert_eq!(*speaker.volume.lock().unwrap(), expected);
}
