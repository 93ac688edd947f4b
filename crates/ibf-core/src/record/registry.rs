//! Closed sets of discriminators known to the decoder.
//!
//! Each set is a static table; membership and lookup are derived from it so
//! the parser never compares against literal values.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::layout;

/// Outer record kind stored in the first byte of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRecordKind {
    History,
    PumpAlarm,
}

impl LogRecordKind {
    pub const ALL: [LogRecordKind; 2] = [LogRecordKind::History, LogRecordKind::PumpAlarm];

    pub const fn as_raw(self) -> u8 {
        match self {
            LogRecordKind::History => layout::RECORD_KIND_HISTORY,
            LogRecordKind::PumpAlarm => layout::RECORD_KIND_PUMP_ALARM,
        }
    }

    pub fn from_raw(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_raw() == value)
    }

    pub const fn name(self) -> &'static str {
        match self {
            LogRecordKind::History => "history",
            LogRecordKind::PumpAlarm => "pump_alarm",
        }
    }
}

impl fmt::Display for LogRecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_known_outer_kind(value: u8) -> bool {
    LogRecordKind::from_raw(value).is_some()
}

/// History record sub-kind, stored as a little-endian `u32` after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum HistoryKind {
    Deactivate = 0x0000,
    TimeChange = 0x0001,
    Bolus = 0x0002,
    Basal = 0x0004,
    SuggestedCalc = 0x0008,
    RemoteHazardAlarm = 0x0010,
    Alarm = 0x0020,
    BloodGlucose = 0x0040,
    Carb = 0x0080,
    TerminateBolus = 0x0100,
    TerminateBasal = 0x0200,
    Activate = 0x0400,
    Resume = 0x0800,
    Download = 0x1000,
    Occlusion = 0x2000,
    Suspend = 0x4000,
    DateChange = 0x8000,
}

impl HistoryKind {
    pub const ALL: [HistoryKind; 17] = [
        HistoryKind::Deactivate,
        HistoryKind::TimeChange,
        HistoryKind::Bolus,
        HistoryKind::Basal,
        HistoryKind::SuggestedCalc,
        HistoryKind::RemoteHazardAlarm,
        HistoryKind::Alarm,
        HistoryKind::BloodGlucose,
        HistoryKind::Carb,
        HistoryKind::TerminateBolus,
        HistoryKind::TerminateBasal,
        HistoryKind::Activate,
        HistoryKind::Resume,
        HistoryKind::Download,
        HistoryKind::Occlusion,
        HistoryKind::Suspend,
        HistoryKind::DateChange,
    ];

    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    pub fn from_raw(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_raw() == value)
    }

    pub const fn name(self) -> &'static str {
        match self {
            HistoryKind::Deactivate => "deactivate",
            HistoryKind::TimeChange => "time_change",
            HistoryKind::Bolus => "bolus",
            HistoryKind::Basal => "basal",
            HistoryKind::SuggestedCalc => "suggested_calc",
            HistoryKind::RemoteHazardAlarm => "remote_hazard_alarm",
            HistoryKind::Alarm => "alarm",
            HistoryKind::BloodGlucose => "blood_glucose",
            HistoryKind::Carb => "carb",
            HistoryKind::TerminateBolus => "terminate_bolus",
            HistoryKind::TerminateBasal => "terminate_basal",
            HistoryKind::Activate => "activate",
            HistoryKind::Resume => "resume",
            HistoryKind::Download => "download",
            HistoryKind::Occlusion => "occlusion",
            HistoryKind::Suspend => "suspend",
            HistoryKind::DateChange => "date_change",
        }
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_known_history_kind(value: u32) -> bool {
    HistoryKind::from_raw(value).is_some()
}

/// Independent flag bits carried by every history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum HistoryFlag {
    Deleted = 0x0001,
    Edited = 0x0002,
    Canceled = 0x0004,
    Interrupted = 0x0008,
    PodFault = 0x0010,
}

impl HistoryFlag {
    pub const ALL: [HistoryFlag; 5] = [
        HistoryFlag::Deleted,
        HistoryFlag::Edited,
        HistoryFlag::Canceled,
        HistoryFlag::Interrupted,
        HistoryFlag::PodFault,
    ];

    pub const fn bits(self) -> u16 {
        self as u16
    }

    /// Known flags whose bit is set in `mask`. Unknown bits are dropped.
    pub fn from_bitmask(mask: u16) -> BTreeSet<HistoryFlag> {
        Self::ALL
            .into_iter()
            .filter(|flag| mask & flag.bits() != 0)
            .collect()
    }

    /// Inverse of [`HistoryFlag::from_bitmask`] for recognized flags.
    pub fn to_bitmask<'a>(flags: impl IntoIterator<Item = &'a HistoryFlag>) -> u16 {
        flags.into_iter().fold(0, |mask, flag| mask | flag.bits())
    }
}

/// Alarm identifiers reported by pump alarm records.
///
/// Lookup is total: ids outside the table resolve to `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmCode {
    PodExpired,
    Occlusion,
    EmptyReservoir,
    AutoOff,
    PodError,
    PdmError,
    LowReservoir,
    PodExpirationAdvisory,
    SuspendEnded,
    LowBattery,
    Unrecognized(u8),
}

impl AlarmCode {
    pub const KNOWN: [(u8, AlarmCode); 10] = [
        (1, AlarmCode::PodExpired),
        (2, AlarmCode::Occlusion),
        (3, AlarmCode::EmptyReservoir),
        (4, AlarmCode::AutoOff),
        (5, AlarmCode::PodError),
        (6, AlarmCode::PdmError),
        (7, AlarmCode::LowReservoir),
        (8, AlarmCode::PodExpirationAdvisory),
        (9, AlarmCode::SuspendEnded),
        (10, AlarmCode::LowBattery),
    ];

    pub fn from_raw(value: u8) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|(id, _)| *id == value)
            .map(|(_, code)| code)
            .unwrap_or(AlarmCode::Unrecognized(value))
    }

    pub fn as_raw(self) -> u8 {
        match self {
            AlarmCode::Unrecognized(value) => value,
            known => Self::KNOWN
                .into_iter()
                .find(|(_, code)| *code == known)
                .map(|(id, _)| id)
                .unwrap_or_default(),
        }
    }

    pub fn is_recognized(self) -> bool {
        !matches!(self, AlarmCode::Unrecognized(_))
    }
}

/// Blood-glucose reading qualifier.
///
/// The device stores a single code in the flags byte, so values map one to
/// one rather than being decoded as a bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BgFlag {
    None,
    ManualEntry,
    TemperatureOutOfRange,
    BelowRange,
    AboveRange,
    ControlSolution,
    Other(u8),
}

impl BgFlag {
    pub fn from_byte(value: u8) -> Self {
        match value {
            0x00 => BgFlag::None,
            0x01 => BgFlag::ManualEntry,
            0x02 => BgFlag::TemperatureOutOfRange,
            0x04 => BgFlag::BelowRange,
            0x08 => BgFlag::AboveRange,
            0x10 => BgFlag::ControlSolution,
            other => BgFlag::Other(other),
        }
    }

    pub fn as_raw(self) -> u8 {
        match self {
            BgFlag::None => 0x00,
            BgFlag::ManualEntry => 0x01,
            BgFlag::TemperatureOutOfRange => 0x02,
            BgFlag::BelowRange => 0x04,
            BgFlag::AboveRange => 0x08,
            BgFlag::ControlSolution => 0x10,
            BgFlag::Other(value) => value,
        }
    }
}
