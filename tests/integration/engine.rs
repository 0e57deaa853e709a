//! Engine lifecycle integration tests
//!
//! Builder validation, plugin slots, unique names and load failures.

use crate::helpers::*;
use ripieno::prelude::*;
use ripieno::{Error, RemoteNotification};
use ripieno::plugin::PortType;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

#[test]
fn test_engine_reports_configuration() {
    let engine = test_engine();
    assert_eq!(engine.sample_rate(), TEST_SAMPLE_RATE);
    assert_eq!(engine.buffer_size() as usize, TEST_BUFFER_SIZE);
    assert_eq!(engine.plugin_count(), 0);
    assert_eq!(engine.get_new_plugin_id(), Some(0));
    assert!(engine.last_error().is_empty());
}

#[test]
fn test_builder_rejects_oversized_rack() {
    let result = test_builder().max_plugins(17).build();
    assert!(matches!(result, Err(Error::Core(_))));

    let engine = test_builder()
        .process_mode(ProcessMode::MultipleClients)
        .max_plugins(64)
        .build()
        .unwrap();
    assert_eq!(engine.config().max_plugins, 64);
}

#[test]
fn test_add_native_plugin() {
    let (callback, events) = ChannelCallback::new();
    let engine = test_builder().callback(callback).build().unwrap();

    let id = engine.add_native("bypass", None).unwrap();
    assert_eq!(id, 0);
    assert_eq!(engine.plugin_count(), 1);

    let plugin = engine.plugin(id).unwrap();
    assert_eq!(plugin.name(), "ByPass");
    assert_eq!(plugin.audio_in_count(), 1);
    assert_eq!(plugin.audio_out_count(), 1);
    assert!(plugin.is_active());

    // The program table is announced while loading, before the plugin is added.
    let events: Vec<CallbackEvent> = events.try_iter().collect();
    assert_eq!(
        events,
        [
            CallbackEvent::ReloadPrograms { plugin_id: 0 },
            CallbackEvent::PluginAdded {
                plugin_id: 0,
                name: "ByPass".into()
            },
        ]
    );
}

#[test]
fn test_callback_may_reenter_engine_while_loading() {
    let engine_slot: Arc<OnceLock<Arc<Engine>>> = Arc::default();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let callback = {
        let engine_slot = Arc::clone(&engine_slot);
        let seen = Arc::clone(&seen);
        move |event: CallbackEvent| {
            if let (CallbackEvent::ReloadPrograms { .. }, Some(engine)) = (&event, engine_slot.get())
            {
                seen.lock().push((engine.plugin_count(), engine.get_new_plugin_id()));
            }
        }
    };
    let engine = Arc::new(test_builder().callback(callback).build().unwrap());
    let _ = engine_slot.set(Arc::clone(&engine));

    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    let worker = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            let id = engine.add_native("bypass", None);
            let _ = done_tx.send(id);
        })
    };

    let id = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("adding a plugin must not block on its own callbacks");
    worker.join().unwrap();

    assert_eq!(id, Some(0));
    // While loading, slot 0 is reserved but not yet visible.
    assert_eq!(*seen.lock(), [(0, Some(1))]);
    assert_eq!(engine.plugin_count(), 1);
}

#[test]
fn test_failed_load_releases_reserved_slot() {
    let engine = test_builder().max_plugins(1).build().unwrap();
    assert!(engine.add_native("no-such-plugin", None).is_none());
    assert_eq!(engine.get_new_plugin_id(), Some(0));
    assert_eq!(engine.get_unique_name("no-such-plugin"), "no-such-plugin");
    assert_eq!(engine.add_native("bypass", None), Some(0));
}

#[test]
fn test_duplicate_names_get_suffixes() {
    let engine = test_engine();
    for _ in 0..3 {
        engine.add_native("bypass", None).unwrap();
    }

    let names: Vec<String> = engine.plugins().iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, ["ByPass", "ByPass (2)", "ByPass (3)"]);
    assert_eq!(engine.get_unique_name("ByPass"), "ByPass (4)");
    assert_eq!(engine.get_unique_name("Other"), "Other");
}

#[test]
fn test_names_are_sanitized() {
    let engine = test_builder().max_name_length(16).build().unwrap();

    let id = engine.add_native("bypass", Some("left:right")).unwrap();
    assert_eq!(engine.plugin(id).unwrap().name(), "left.right");

    let id = engine
        .add_native("bypass", Some("a very long plugin name"))
        .unwrap();
    assert_eq!(engine.plugin(id).unwrap().name(), "a very lon");
}

#[test]
fn test_port_names_follow_process_mode() {
    let engine = test_engine();
    let id = engine.add_native("bypass", None).unwrap();
    let ports = engine.plugin(id).unwrap().registry().ports();
    assert!(ports
        .iter()
        .filter(|p| p.port_type == PortType::Audio)
        .all(|p| p.name.starts_with("ByPass:")));

    let engine = test_builder()
        .process_mode(ProcessMode::MultipleClients)
        .build()
        .unwrap();
    let id = engine.add_native("bypass", None).unwrap();
    let ports = engine.plugin(id).unwrap().registry().ports();
    assert!(ports.iter().all(|p| !p.name.contains(':')));
}

#[test]
fn test_max_plugins_reached() {
    let engine = test_builder().max_plugins(2).build().unwrap();
    assert!(engine.add_native("bypass", None).is_some());
    assert!(engine.add_native("bypass", None).is_some());
    assert_eq!(engine.get_new_plugin_id(), None);

    assert_eq!(engine.add_native("bypass", None), None);
    assert_eq!(engine.last_error(), "Maximum number of plugins reached");
    assert_eq!(engine.plugin_count(), 2);
}

#[test]
fn test_unknown_native_label() {
    let engine = test_engine();
    assert_eq!(engine.add_native("nope", None), None);
    assert_eq!(engine.last_error(), "Unknown plugin label: nope");
    assert_eq!(engine.plugin_count(), 0);
}

#[cfg(feature = "soundfont")]
#[test]
fn test_invalid_soundfont_is_rejected() {
    let path = std::env::temp_dir().join(format!("ripieno-engine-{}.sf2", std::process::id()));
    std::fs::write(&path, b"definitely not a soundfont").unwrap();

    let engine = test_engine();
    assert_eq!(engine.add_soundfont(&path, None, "broken"), None);
    assert_eq!(engine.last_error(), "Requested file is not a valid SoundFont");
    assert_eq!(engine.plugin_count(), 0);
    assert_eq!(engine.get_new_plugin_id(), Some(0));

    assert_eq!(engine.add_soundfont("/nonexistent/file.sf2", None, "missing"), None);
    assert_eq!(engine.last_error(), "Requested file is not a valid SoundFont");

    let _ = std::fs::remove_file(path);
}

#[cfg(feature = "soundfont")]
#[test]
fn test_slot_check_comes_before_file_check() {
    let engine = test_builder().max_plugins(1).build().unwrap();
    engine.add_native("bypass", None).unwrap();

    assert_eq!(engine.add_soundfont("/nonexistent/file.sf2", None, "gm"), None);
    assert_eq!(engine.last_error(), "Maximum number of plugins reached");
}

#[test]
fn test_remove_plugin_frees_slot() {
    let (callback, events) = ChannelCallback::new();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&sent);
    let engine = test_builder()
        .callback(callback)
        .remote(move |notification: RemoteNotification| log.lock().push(notification))
        .build()
        .unwrap();

    let first = engine.add_native("bypass", None).unwrap();
    let second = engine.add_native("bypass", None).unwrap();
    let plugin = engine.plugin(first).unwrap();

    assert!(engine.remove_plugin(first));
    assert!(!engine.remove_plugin(first));
    assert!(!plugin.is_enabled());
    assert!(engine.plugin(first).is_none());
    assert_eq!(engine.get_new_plugin_id(), Some(first));

    let removed: Vec<CallbackEvent> = events
        .try_iter()
        .filter(|e| matches!(e, CallbackEvent::PluginRemoved { .. }))
        .collect();
    assert_eq!(removed, [CallbackEvent::PluginRemoved { plugin_id: first }]);
    assert_eq!(
        sent.lock().as_slice(),
        [RemoteNotification::PluginRemoved { plugin_id: first }]
    );

    let third = engine.add_native("bypass", None).unwrap();
    assert_eq!(third, first);
    assert_eq!(engine.plugin(third).unwrap().name(), "ByPass");
    assert_eq!(engine.plugins().len(), 2);
    assert_eq!(engine.plugins()[1].id(), second);
}

#[test]
fn test_remove_all_plugins() {
    let engine = test_engine();
    engine.add_native("bypass", None).unwrap();
    engine.add_plugin("tone", Box::new(Tone::new(0.5))).unwrap();

    engine.remove_all_plugins();
    assert_eq!(engine.plugin_count(), 0);
    assert!(engine.plugins().is_empty());
}
