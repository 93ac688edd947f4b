use std::fs;
use std::path::{Path, PathBuf};

use ibf_core::record::layout;
use ibf_core::{DeviceDate, HistoryKind};

const TIMESTAMP: DeviceDate = DeviceDate {
    year: 2015,
    month: 1,
    day: 16,
    hour: 23,
    minute: 43,
    second: 29,
};
const SECS_SINCE_POWERUP: u32 = 1000;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_history_fixtures(&root)?;
    write_pump_alarm_fixtures(&root)?;
    write_invalid_fixtures(&root)?;
    Ok(())
}

fn write_history_fixtures(root: &Path) -> Result<(), String> {
    let mut carb = Vec::new();
    carb.extend_from_slice(&45u16.to_le_bytes());
    carb.extend_from_slice(&[1, 2]);
    write_window(
        root.join("carb").join("input.bin"),
        history_record(7, HistoryKind::Carb.as_raw(), 0, &carb),
    )?;

    let mut basal = Vec::new();
    basal.extend_from_slice(&150u32.to_le_bytes());
    basal.extend_from_slice(&30u16.to_le_bytes());
    basal.extend_from_slice(&100u16.to_le_bytes());
    write_window(
        root.join("basal").join("input.bin"),
        history_record(8, HistoryKind::Basal.as_raw(), 0x0102, &basal),
    )?;

    let mut bg = Vec::new();
    bg.extend_from_slice(&0u32.to_le_bytes());
    bg.extend_from_slice(&142u16.to_le_bytes());
    bg.extend_from_slice(&text_tag("before meal"));
    bg.extend_from_slice(&text_tag(""));
    bg.push(0x04);
    write_window(
        root.join("blood_glucose").join("input.bin"),
        history_record(9, HistoryKind::BloodGlucose.as_raw(), 0, &bg),
    )?;

    let mut activate = Vec::new();
    for part in [41u16, 1234, 2, 7, 0, 2, 7, 1] {
        activate.extend_from_slice(&part.to_le_bytes());
    }
    write_window(
        root.join("activate").join("input.bin"),
        history_record(13, HistoryKind::Activate.as_raw(), 0, &activate),
    )?;
    Ok(())
}

fn write_pump_alarm_fixtures(root: &Path) -> Result<(), String> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&TIMESTAMP.to_packed().to_le_bytes());
    payload.extend_from_slice(&[0x00, 2, 0x00, 0x21]);
    payload.extend_from_slice(&41_000u32.to_le_bytes());
    payload.extend_from_slice(&99u32.to_le_bytes());
    for part in [2u16, 7, 0, 2, 7, 1] {
        payload.extend_from_slice(&part.to_le_bytes());
    }
    let mut bytes = header(
        layout::RECORD_KIND_PUMP_ALARM,
        10,
        layout::PUMP_ALARM_PAYLOAD_OFFSET + payload.len(),
    );
    bytes.extend_from_slice(&payload);
    write_window(root.join("pump_alarm").join("input.bin"), bytes)
}

fn write_invalid_fixtures(root: &Path) -> Result<(), String> {
    write_window(
        root.join("unknown_history_kind").join("input.bin"),
        history_record(11, 0x0003, 0, &[]),
    )?;
    let mut short = header(layout::RECORD_KIND_HISTORY, 12, layout::HEADER_LEN);
    short.truncate(10);
    write_window(root.join("insufficient_data").join("input.bin"), short)
}

fn header(kind: u8, log_index: i32, total_len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; layout::HEADER_LEN];
    bytes[layout::KIND_OFFSET] = kind;
    bytes[layout::LOG_INDEX_RANGE].copy_from_slice(&log_index.to_be_bytes());
    bytes[layout::RECORD_SIZE_RANGE].copy_from_slice(&(total_len as u16).to_be_bytes());
    bytes[layout::TIMESTAMP_RANGE].copy_from_slice(&TIMESTAMP.to_packed().to_le_bytes());
    bytes[layout::SECS_SINCE_POWERUP_RANGE].copy_from_slice(&SECS_SINCE_POWERUP.to_le_bytes());
    bytes
}

fn history_record(log_index: i32, history_kind: u32, flags: u16, payload: &[u8]) -> Vec<u8> {
    let total_len = layout::HISTORY_PAYLOAD_OFFSET + payload.len();
    let mut bytes = header(layout::RECORD_KIND_HISTORY, log_index, total_len);
    bytes.extend_from_slice(&history_kind.to_le_bytes());
    bytes.extend_from_slice(&flags.to_le_bytes());
    bytes.extend_from_slice(&[0u8; layout::HISTORY_RESERVED_LEN]);
    bytes.extend_from_slice(payload);
    bytes
}

fn text_tag(text: &str) -> [u8; layout::TEXT_TAG_LEN] {
    let mut out = [0u8; layout::TEXT_TAG_LEN];
    let len = text.len().min(layout::TEXT_TAG_LEN);
    out[..len].copy_from_slice(&text.as_bytes()[..len]);
    out
}

fn write_window(path: PathBuf, bytes: Vec<u8>) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {}", parent.display(), err))?;
    }
    fs::write(&path, bytes).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}
