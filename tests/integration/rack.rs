//! Rack signal-flow integration tests
//!
//! Plugins run in id order on one stereo bus; every test drives the
//! processor cycle by cycle.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use approx::assert_relative_eq;
use ripieno::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const N: usize = TEST_BUFFER_SIZE;

#[test]
fn test_empty_rack_is_transparent() {
    let engine = test_engine();
    let mut rack = engine.rack_processor();

    let left = generate_normalized_staircase(N);
    let right = generate_dc(0.3, N);
    let (out_l, out_r) = run_cycle(&mut rack, &left, &right, &[]);

    assert!(signals_approx_equal(&out_l, &left, FLOAT_EPSILON));
    assert_constant(&out_r, 0.3, FLOAT_EPSILON);
}

#[test]
fn test_bypass_passes_left_and_leaves_right() {
    let engine = test_engine();
    engine.add_native("bypass", None).unwrap();
    let mut rack = engine.rack_processor();

    let left = generate_normalized_staircase(N);
    let right = generate_dc(-0.25, N);
    let (out_l, out_r) = run_cycle(&mut rack, &left, &right, &[]);

    assert!(signals_approx_equal(&out_l, &left, FLOAT_EPSILON));
    assert_constant(&out_r, -0.25, FLOAT_EPSILON);
}

#[test]
fn test_force_stereo_duplicates_mono_output() {
    let engine = test_builder().force_stereo(true).build().unwrap();
    engine.add_native("bypass", None).unwrap();
    let mut rack = engine.rack_processor();

    let left = generate_dc(0.6, N);
    let right = generate_dc(0.1, N);
    let (out_l, out_r) = run_cycle(&mut rack, &left, &right, &[]);

    assert_constant(&out_l, 0.6, FLOAT_EPSILON);
    assert_constant(&out_r, 0.6, FLOAT_EPSILON);
}

#[test]
fn test_generator_is_mixed_onto_input() {
    let engine = test_engine();
    engine.add_plugin("tone", Box::new(Tone::new(0.5))).unwrap();
    let mut rack = engine.rack_processor();

    let input = generate_dc(0.25, N);
    let (out_l, out_r) = run_cycle(&mut rack, &input, &input, &[]);

    assert_constant(&out_l, 0.75, FLOAT_EPSILON);
    assert_constant(&out_r, 0.75, FLOAT_EPSILON);
}

#[test]
fn test_plugins_chain_in_id_order() {
    let engine = test_engine();
    engine.add_plugin("tone", Box::new(Tone::new(0.5))).unwrap();
    engine.add_plugin("half", Box::new(Gain::new(0.5))).unwrap();
    engine.add_native("bypass", None).unwrap();
    let mut rack = engine.rack_processor();

    let input = generate_dc(0.25, N);
    let (out_l, out_r) = run_cycle(&mut rack, &input, &input, &[]);

    // (0.25 + 0.5) * 0.5
    assert_constant(&out_l, 0.375, FLOAT_EPSILON);
    assert_constant(&out_r, 0.375, FLOAT_EPSILON);
}

#[test]
fn test_disabled_plugin_is_skipped() {
    let engine = test_engine();
    engine.add_plugin("tone", Box::new(Tone::new(0.5))).unwrap();
    let gain = engine.add_plugin("half", Box::new(Gain::new(0.5))).unwrap();
    engine.plugin(gain).unwrap().set_enabled(false);
    let mut rack = engine.rack_processor();

    let input = generate_dc(0.25, N);
    let (out_l, _) = run_cycle(&mut rack, &input, &input, &[]);

    assert_constant(&out_l, 0.75, FLOAT_EPSILON);
    assert_eq!(engine.skipped_cycles(), 0);
}

#[test]
fn test_inactive_plugin_outputs_silence() {
    let engine = test_engine();
    let id = engine.add_plugin("half", Box::new(Gain::new(0.5))).unwrap();
    engine.plugin(id).unwrap().set_active(false, Notify::NONE);
    let mut rack = engine.rack_processor();

    let input = generate_dc(0.8, N);
    let (out_l, out_r) = run_cycle(&mut rack, &input, &input, &[]);

    assert_silence(&out_l, SILENCE_THRESHOLD);
    assert_silence(&out_r, SILENCE_THRESHOLD);
}

#[test]
fn test_unfeedable_plugin_counts_as_skipped() {
    let engine = test_engine();
    engine.add_plugin("wide", Box::new(Gain::with_inputs(1.0, 3))).unwrap();
    let mut rack = engine.rack_processor();

    let input = generate_dc(0.5, N);
    let (out_l, _) = run_cycle(&mut rack, &input, &input, &[]);

    assert_silence(&out_l, SILENCE_THRESHOLD);
    assert_eq!(engine.skipped_cycles(), 1);
}

#[test]
fn test_volume_applies_in_rack() {
    let engine = test_engine();
    let id = engine.add_plugin("tone", Box::new(Tone::new(0.5))).unwrap();
    engine.plugin(id).unwrap().set_volume(0.5, Notify::NONE);
    let mut rack = engine.rack_processor();

    let silence = generate_dc(0.0, N);
    let (out_l, _) = run_cycle(&mut rack, &silence, &silence, &[]);

    assert_constant(&out_l, 0.25, GAIN_EPSILON);
}

#[test]
fn test_control_input_is_shared() {
    let engine = test_engine();
    let first = engine.add_plugin("one", Box::new(Tone::new(0.1))).unwrap();
    let second = engine.add_plugin("two", Box::new(Tone::new(0.1))).unwrap();
    let mut rack = engine.rack_processor();
    let silence = generate_dc(0.0, N);

    // First cycle only activates; control events are read from the next one.
    run_cycle(&mut rack, &silence, &silence, &[]);

    let events = [ControlEvent::control_change(0, 0, 7, 0.5)];
    run_cycle(&mut rack, &silence, &silence, &events);

    for id in [first, second] {
        assert_relative_eq!(engine.plugin(id).unwrap().volume(), 0.635, epsilon = 1e-9);
    }
}

#[test]
fn test_output_parameters_reach_control_out() {
    let engine = test_engine();
    engine.add_plugin("tone", Box::new(Tone::new(0.25))).unwrap();
    let mut rack = engine.rack_processor();

    let silence = generate_dc(0.0, N);
    run_cycle(&mut rack, &silence, &silence, &[]);

    let out = rack.control_out();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].controller as i32, TONE_LEVEL_CC);
    assert_eq!(out[0].time, 0);
    assert_relative_eq!(out[0].value, 0.25);

    run_cycle(&mut rack, &silence, &silence, &[]);
    assert_eq!(rack.control_out().len(), 1);
}

#[test]
fn test_offline_cycle_waits_for_process_lock() {
    let engine = test_builder().offline(true).build().unwrap();
    engine.add_native("bypass", None).unwrap();
    let mut rack = engine.rack_processor();
    let done = Arc::new(AtomicBool::new(false));

    let lock = engine.host().lock_process();
    let handle = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let input = generate_dc(0.5, N);
            let (out_l, _) = run_cycle(&mut rack, &input, &input, &[]);
            done.store(true, Ordering::SeqCst);
            out_l
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!done.load(Ordering::SeqCst));

    drop(lock);
    let out_l = handle.join().unwrap();
    assert!(done.load(Ordering::SeqCst));
    assert_constant(&out_l, 0.5, FLOAT_EPSILON);
}

#[test]
fn test_removed_plugin_leaves_the_chain() {
    let engine = test_engine();
    let tone = engine.add_plugin("tone", Box::new(Tone::new(0.5))).unwrap();
    let mut rack = engine.rack_processor();
    let silence = generate_dc(0.0, N);

    let (out_l, _) = run_cycle(&mut rack, &silence, &silence, &[]);
    assert_constant(&out_l, 0.5, FLOAT_EPSILON);

    engine.remove_plugin(tone);
    let (out_l, _) = run_cycle(&mut rack, &silence, &silence, &[]);
    assert_silence(&out_l, SILENCE_THRESHOLD);
}
