use std::fs;
use std::path::{Path, PathBuf};

use ibf_core::{DecodeOptions, LogRecord, Report, analyze_record_files};

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn load_expected_report(dir: &str) -> Report {
    let expected_path = repo_root().join(dir).join("expected_report.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(dir: &str) {
    let input = repo_root().join(dir).join("input.bin");
    let expected = load_expected_report(dir);

    let mut actual = analyze_record_files(&[&input], &DecodeOptions::default())
        .expect("analyze record file");
    for (entry, expected_entry) in actual.records.iter_mut().zip(&expected.records) {
        entry.source = expected_entry.source.clone();
    }

    let actual_value = serde_json::to_value(actual).expect("serialize actual");
    let expected_value = serde_json::to_value(expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");
}

#[test]
fn golden_carb() {
    run_golden("tests/golden/carb");
}

#[test]
fn golden_basal() {
    run_golden("tests/golden/basal");
}

#[test]
fn golden_blood_glucose() {
    run_golden("tests/golden/blood_glucose");
}

#[test]
fn golden_activate() {
    run_golden("tests/golden/activate");
}

#[test]
fn golden_pump_alarm() {
    run_golden("tests/golden/pump_alarm");
}

#[test]
fn golden_unknown_history_kind() {
    run_golden("tests/golden/unknown_history_kind");
}

#[test]
fn golden_insufficient_data() {
    run_golden("tests/golden/insufficient_data");
}

#[test]
fn golden_carb_matches_device_scenario() {
    let report = load_expected_report("tests/golden/carb");
    let Some(LogRecord::Carb(carb)) = &report.records[0].record else {
        panic!("expected a carb record");
    };
    assert_eq!(carb.history.header.log_index, 7);
    assert_eq!(carb.history.header.record_size, 30);
    assert_eq!(carb.history.header.secs_since_powerup, 1000);
    assert_eq!(carb.carbs, 45);
    assert_eq!((carb.was_preset, carb.preset_type), (1, 2));
    assert!(carb.history.flags.is_empty());
}

#[test]
fn golden_basal_drops_unknown_flag_bits() {
    let report = load_expected_report("tests/golden/basal");
    let Some(LogRecord::Basal(basal)) = &report.records[0].record else {
        panic!("expected a basal record");
    };
    assert_eq!(basal.rate_per_hour, 1.5);
    assert_eq!(basal.percent, 1.0);
    assert_eq!(basal.duration_minutes, 30);
    assert_eq!(basal.history.flags.len(), 1);
    assert_eq!(basal.history.header.record_size, 34);
}

#[test]
fn golden_failures_have_no_time_bounds() {
    let report = load_expected_report("tests/golden/unknown_history_kind");
    assert_eq!(report.summary.failed, 1);
    assert!(report.summary.time_start.is_none());
    assert_eq!(report.summary.errors.get("IBF-UNKNOWN-HISTORY-KIND"), Some(&1));
}
