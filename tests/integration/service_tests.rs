//! Integration tests: LedService → channels → mock hardware, including
//! queue-driven reconciliation and shared-pair isolation.

use std::sync::Arc;

use crate::mock_hw::{RecordingRelay, RecordingServo, RecordingSink};
use stripectl::app::commands::ChannelCommand;
use stripectl::app::events::AppEvent;
use stripectl::app::service::LedService;
use stripectl::channel::exclusive::ExclusiveRelay;
use stripectl::channel::shared::{RelaySlot, SharedRelay, share};
use stripectl::channel::{ChannelState, LedChannel, SharedRelayChannel};
use stripectl::config::SystemConfig;
use stripectl::events::PositionEvent;
use stripectl::reconcile::ChannelId;
use stripectl::safeguard::GuardedRelay;

/// Config with the dwell guard disabled so service-level tests are not
/// coupled to the wall clock.
fn unguarded_config() -> SystemConfig {
    SystemConfig {
        relay_safeguard_ms: 0,
        ..SystemConfig::default()
    }
}

fn add_exclusive(
    service: &mut LedService,
    relay: RecordingRelay,
    servo: RecordingServo,
    servo_channel: u8,
    guard_ms: u64,
    reconcile: bool,
) -> ChannelId {
    let channel = LedChannel::new(
        format!("ch{servo_channel}"),
        servo,
        servo_channel,
        ExclusiveRelay::new(GuardedRelay::new(relay, guard_ms, 0)),
        &unguarded_config(),
    );
    service.add_channel(Box::new(channel), reconcile).unwrap()
}

#[test]
fn full_brightness_cycle_through_the_service() {
    let mut service = LedService::new(&unguarded_config());
    let relay = RecordingRelay::new(false, false);
    let servo = RecordingServo::new();
    let id = add_exclusive(&mut service, relay.clone(), servo.clone(), 0, 0, true);
    let mut sink = RecordingSink::new();

    service.start(&mut sink);
    assert_eq!(sink.events, vec![AppEvent::Started { channels: 1 }]);
    assert_eq!(service.state(id), Some(ChannelState::Off));
    assert_eq!(service.name(id), Some("ch0"));

    service.handle_command(
        &ChannelCommand::SetBrightness {
            channel: id,
            brightness: 100,
        },
        &mut sink,
    );
    assert_eq!(service.state(id), Some(ChannelState::On));
    assert_eq!(relay.outputs(), (true, true));
    assert_eq!(service.duty_cycle(id), Some(100));
    assert_eq!(service.color(id), Some(255));
    assert_eq!(
        sink.last(),
        Some(&AppEvent::StateChanged {
            channel: id,
            from: ChannelState::Off,
            to: ChannelState::On,
        })
    );

    // Asymmetric lock-out via the command path.
    service.handle_command(
        &ChannelCommand::SetBrightness {
            channel: id,
            brightness: 10,
        },
        &mut sink,
    );
    assert_eq!(service.state(id), Some(ChannelState::Off));
    assert_eq!(relay.outputs(), (false, false));
    assert_eq!(servo.last_target(), Some(0));
}

#[test]
fn queue_events_promote_and_demote_registered_channels() {
    let mut service = LedService::new(&unguarded_config());
    let relay = RecordingRelay::new(false, true);
    let servo = RecordingServo::new();
    let id = add_exclusive(&mut service, relay.clone(), servo, 3, 0, true);
    let mut sink = RecordingSink::new();

    assert_eq!(service.state(id), Some(ChannelState::Dimmed));
    service.set_brightness(id, 100);
    assert_eq!(service.state(id), Some(ChannelState::Dimmed));

    // Transport reports the ramp completing at full scale.
    let queue = service.event_queue();
    queue.push(PositionEvent {
        servo_channel: 3,
        position: 100,
    });
    service.process_events(&mut sink);
    assert_eq!(service.state(id), Some(ChannelState::On));
    assert_eq!(
        sink.last(),
        Some(&AppEvent::StateChanged {
            channel: id,
            from: ChannelState::Dimmed,
            to: ChannelState::On,
        })
    );

    // And back down through the lock-out plus a bottom-of-ramp event.
    service.set_brightness(id, 30);
    assert_eq!(service.state(id), Some(ChannelState::Off));
    service.set_brightness(id, 30);
    assert_eq!(service.state(id), Some(ChannelState::Dimmed));
    queue.push(PositionEvent {
        servo_channel: 3,
        position: 1,
    });
    service.process_events(&mut sink);
    assert_eq!(service.state(id), Some(ChannelState::Off));
}

#[test]
fn midrange_completions_are_ignored() {
    let mut service = LedService::new(&unguarded_config());
    let relay = RecordingRelay::new(false, true);
    let servo = RecordingServo::new();
    let id = add_exclusive(&mut service, relay.clone(), servo, 0, 0, true);
    let mut sink = RecordingSink::new();

    service.event_queue().push(PositionEvent {
        servo_channel: 0,
        position: 57,
    });
    service.process_events(&mut sink);
    assert_eq!(service.state(id), Some(ChannelState::Dimmed));
    assert!(sink.events.is_empty());
    assert_eq!(relay.write_count(), 0);
}

#[test]
fn dropped_reconciliation_reports_but_keeps_state() {
    let mut service = LedService::new(&unguarded_config());
    let relay = RecordingRelay::new(false, false);
    let servo = RecordingServo::new();
    // Dwell guard far in the future: every switch since "boot" drops.
    let id = add_exclusive(
        &mut service,
        relay.clone(),
        servo,
        0,
        u64::MAX / 2,
        true,
    );
    let mut sink = RecordingSink::new();

    // The direct request drops silently; the channel still believes Off.
    service.set_brightness(id, 100);
    assert_eq!(service.state(id), Some(ChannelState::Off));
    assert_eq!(relay.write_count(), 0);

    // The completion retry drops too, but this path reports it.
    service.event_queue().push(PositionEvent {
        servo_channel: 0,
        position: 100,
    });
    service.process_events(&mut sink);
    assert_eq!(service.state(id), Some(ChannelState::Off));
    assert_eq!(
        sink.last(),
        Some(&AppEvent::SwitchDropped {
            channel: id,
            requested: ChannelState::On,
        })
    );
}

#[test]
fn shared_pair_isolation_through_the_service() {
    let mut service = LedService::new(&unguarded_config());
    let relay = RecordingRelay::new(false, false);
    let pair = share(GuardedRelay::new(relay.clone(), 0, 0));
    let config = unguarded_config();

    let white: SharedRelayChannel<RecordingServo, RecordingRelay> = LedChannel::new(
        "White",
        RecordingServo::new(),
        3,
        SharedRelay::new(Arc::clone(&pair), RelaySlot::Out1),
        &config,
    );
    let table: SharedRelayChannel<RecordingServo, RecordingRelay> = LedChannel::new(
        "Table",
        RecordingServo::new(),
        4,
        SharedRelay::new(pair, RelaySlot::Out2),
        &config,
    );
    // Shared channels use a different dimming topology and stay out of
    // the reconciler.
    let white_id = service.add_channel(Box::new(white), false).unwrap();
    let table_id = service.add_channel(Box::new(table), false).unwrap();
    let mut sink = RecordingSink::new();

    // Both seed Dimmed from their cleared bits.
    assert_eq!(service.state(white_id), Some(ChannelState::Dimmed));
    assert_eq!(service.state(table_id), Some(ChannelState::Dimmed));

    service.handle_command(
        &ChannelCommand::ChangeState {
            channel: white_id,
            target: ChannelState::On,
        },
        &mut sink,
    );
    assert_eq!(relay.outputs(), (true, false));

    service.handle_command(
        &ChannelCommand::ChangeState {
            channel: table_id,
            target: ChannelState::On,
        },
        &mut sink,
    );
    // White's bit survived the sibling's write.
    assert_eq!(relay.outputs(), (true, true));

    service.handle_command(
        &ChannelCommand::ChangeState {
            channel: white_id,
            target: ChannelState::Dimmed,
        },
        &mut sink,
    );
    assert_eq!(relay.outputs(), (false, true));

    // Completion events do not touch unregistered channels.
    service.event_queue().push(PositionEvent {
        servo_channel: 3,
        position: 100,
    });
    service.process_events(&mut sink);
    assert_eq!(service.state(white_id), Some(ChannelState::Dimmed));
}

#[test]
fn color_surface_round_trips_through_the_service() {
    let mut service = LedService::new(&unguarded_config());
    let relay = RecordingRelay::new(false, true);
    let servo = RecordingServo::new();
    let id = add_exclusive(&mut service, relay, servo.clone(), 0, 0, true);
    let mut sink = RecordingSink::new();

    service.handle_command(
        &ChannelCommand::SetColor {
            channel: id,
            color: 128,
        },
        &mut sink,
    );
    assert_eq!(servo.last_target(), Some(50));
    assert_eq!(service.color(id), Some(128));

    // Full scale from Dimmed only moves the ramp; the promotion to On
    // (and the exact 255 report) comes from the completion event.
    service.handle_command(
        &ChannelCommand::SetColor {
            channel: id,
            color: 255,
        },
        &mut sink,
    );
    assert_eq!(servo.last_target(), Some(100));
    service.event_queue().push(PositionEvent {
        servo_channel: 0,
        position: 100,
    });
    service.process_events(&mut sink);
    assert_eq!(service.state(id), Some(ChannelState::On));
    assert_eq!(service.color(id), Some(255));
}
