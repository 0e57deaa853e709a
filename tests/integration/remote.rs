//! Remote-control and idle-loop integration tests

use crate::helpers::*;
use approx::assert_relative_eq;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use ripieno::plugin::PluginError;
use ripieno::prelude::*;
use ripieno::{Error, RemoteNotification};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const N: usize = TEST_BUFFER_SIZE;

struct RemoteFixture {
    engine: Engine,
    events: Receiver<CallbackEvent>,
    sent: Arc<Mutex<Vec<RemoteNotification>>>,
}

fn remote_fixture() -> RemoteFixture {
    let (callback, events) = ChannelCallback::new();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&sent);
    let engine = test_builder()
        .callback(callback)
        .remote(move |notification: RemoteNotification| log.lock().push(notification))
        .build()
        .unwrap();
    RemoteFixture {
        engine,
        events,
        sent,
    }
}

#[test]
fn test_requests_wait_for_idle() {
    let fx = remote_fixture();
    let id = fx.engine.add_native("bypass", None).unwrap();
    let remote = fx.engine.remote_sender();

    remote
        .send(RemoteRequest::SetVolume {
            plugin_id: id,
            value: 0.5,
        })
        .unwrap();
    remote
        .send(RemoteRequest::SetDryWet {
            plugin_id: id,
            value: 0.25,
        })
        .unwrap();

    let plugin = fx.engine.plugin(id).unwrap();
    assert_relative_eq!(plugin.volume(), 1.0);

    fx.engine.idle();
    assert_relative_eq!(plugin.volume(), 0.5);
    assert_relative_eq!(plugin.dry_wet(), 0.25);

    let changes: Vec<CallbackEvent> = fx
        .events
        .try_iter()
        .filter(|e| matches!(e, CallbackEvent::ParameterChanged { .. }))
        .collect();
    assert_eq!(
        changes,
        [
            CallbackEvent::ParameterChanged {
                plugin_id: id,
                target: ParameterTarget::Volume,
                value: 0.5
            },
            CallbackEvent::ParameterChanged {
                plugin_id: id,
                target: ParameterTarget::DryWet,
                value: 0.25
            },
        ]
    );

    // Remote-originated changes are not echoed back.
    assert!(fx.sent.lock().is_empty());
}

#[test]
fn test_local_changes_reach_remote() {
    let fx = remote_fixture();
    let id = fx.engine.add_native("bypass", None).unwrap();

    fx.engine.plugin(id).unwrap().set_volume(0.2, Notify::ALL);
    assert_eq!(
        fx.sent.lock().as_slice(),
        [RemoteNotification::ParameterChanged {
            plugin_id: id,
            target: ParameterTarget::Volume,
            value: 0.2
        }]
    );
}

#[test]
fn test_failed_request_does_not_block_others() {
    let fx = remote_fixture();
    let id = fx.engine.add_native("bypass", None).unwrap();
    let remote = fx.engine.remote_sender();

    remote
        .send(RemoteRequest::SetParameterValue {
            plugin_id: id,
            index: 3,
            value: 1.0,
        })
        .unwrap();
    remote
        .send(RemoteRequest::SetBalanceLeft {
            plugin_id: id,
            value: 0.0,
        })
        .unwrap();
    fx.engine.idle();

    assert_relative_eq!(fx.engine.plugin(id).unwrap().balance_left(), 0.0);
}

#[test]
fn test_apply_remote_errors() {
    let fx = remote_fixture();
    let id = fx.engine.add_native("bypass", None).unwrap();

    let err = fx
        .engine
        .apply_remote(RemoteRequest::SetActive {
            plugin_id: 9,
            active: false,
        })
        .unwrap_err();
    assert!(matches!(err, Error::UnknownPlugin(9)));

    let err = fx
        .engine
        .apply_remote(RemoteRequest::SetMidiProgram {
            plugin_id: id,
            index: 0,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Plugin(PluginError::OutOfRange { .. })
    ));

    let err = fx
        .engine
        .apply_remote(RemoteRequest::NoteOn {
            plugin_id: id,
            channel: 16,
            note: 60,
            velocity: 100,
        })
        .unwrap_err();
    assert!(matches!(err, Error::Plugin(PluginError::Midi(_))));
}

#[test]
fn test_remote_removal() {
    let fx = remote_fixture();
    let id = fx.engine.add_native("bypass", None).unwrap();

    fx.engine
        .remote_sender()
        .send(RemoteRequest::RemovePlugin { plugin_id: id })
        .unwrap();
    fx.engine.idle();

    assert!(fx.engine.plugin(id).is_none());
    assert_eq!(
        fx.sent.lock().as_slice(),
        [RemoteNotification::PluginRemoved { plugin_id: id }]
    );
    assert!(matches!(
        fx.engine
            .apply_remote(RemoteRequest::RemovePlugin { plugin_id: id }),
        Err(Error::UnknownPlugin(_))
    ));
}

#[test]
fn test_remote_note_reaches_plugin() {
    let fx = remote_fixture();
    let notes = Arc::new(AtomicUsize::new(0));
    let id = fx
        .engine
        .add_plugin("tone", Box::new(Tone::with_note_counter(0.1, Arc::clone(&notes))))
        .unwrap();
    let mut rack = fx.engine.rack_processor();
    let silence = generate_dc(0.0, N);

    fx.engine
        .remote_sender()
        .send(RemoteRequest::NoteOn {
            plugin_id: id,
            channel: 0,
            note: 60,
            velocity: 100,
        })
        .unwrap();
    fx.engine.idle();

    let note_events = fx
        .events
        .try_iter()
        .filter(|e| matches!(e, CallbackEvent::NoteOn { note: 60, .. }))
        .count();
    assert_eq!(note_events, 1);

    // Activation cycle, then the queued note is delivered.
    run_cycle(&mut rack, &silence, &silence, &[]);
    run_cycle(&mut rack, &silence, &silence, &[]);
    assert_eq!(notes.load(Ordering::Relaxed), 1);
}

#[test]
fn test_idle_reports_peaks() {
    let fx = remote_fixture();
    let id = fx.engine.add_plugin("tone", Box::new(Tone::new(0.5))).unwrap();
    let mut rack = fx.engine.rack_processor();

    let silence = generate_dc(0.0, N);
    run_cycle(&mut rack, &silence, &silence, &[]);
    fx.engine.idle();

    let peaks: Vec<CallbackEvent> = fx
        .events
        .try_iter()
        .filter(|e| matches!(e, CallbackEvent::PeaksUpdated { .. }))
        .collect();
    assert_eq!(
        peaks,
        [CallbackEvent::PeaksUpdated {
            plugin_id: id,
            input: [0.0, 0.0],
            output: [0.5, 0.5]
        }]
    );
}

#[test]
fn test_idle_dispatches_post_events() {
    let fx = remote_fixture();
    let id = fx.engine.add_plugin("tone", Box::new(Tone::new(0.1))).unwrap();
    let mut rack = fx.engine.rack_processor();
    let silence = generate_dc(0.0, N);

    run_cycle(&mut rack, &silence, &silence, &[]);
    let events = [ControlEvent::control_change(4, 0, 7, 1.0)];
    run_cycle(&mut rack, &silence, &silence, &events);
    while fx.events.try_recv().is_ok() {}

    fx.engine.idle();
    let change = fx
        .events
        .try_iter()
        .find(|e| matches!(e, CallbackEvent::ParameterChanged { .. }));
    assert_eq!(
        change,
        Some(CallbackEvent::ParameterChanged {
            plugin_id: id,
            target: ParameterTarget::Volume,
            value: 1.27
        })
    );
}
