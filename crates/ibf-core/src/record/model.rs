use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, PrimitiveDateTime, Time};

use super::layout;
use super::registry::{AlarmCode, BgFlag, HistoryFlag, HistoryKind, LogRecordKind};

/// Calendar timestamp as stored by the device.
///
/// Components are kept exactly as packed on the device; use
/// [`DeviceDate::to_datetime`] to validate them as a calendar value.
///
/// # Examples
/// ```
/// use ibf_core::DeviceDate;
///
/// let date = DeviceDate {
///     year: 2015,
///     month: 1,
///     day: 16,
///     hour: 23,
///     minute: 43,
///     second: 29,
/// };
/// assert_eq!(DeviceDate::from_packed(date.to_packed()), date);
/// assert_eq!(date.to_rfc3339().as_deref(), Some("2015-01-16T23:43:29Z"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DeviceDate {
    /// Unpack the little-endian `u32` bit layout used on the wire.
    pub fn from_packed(raw: u32) -> Self {
        Self {
            year: layout::DATE_EPOCH_YEAR + bits(raw, layout::DATE_YEAR_BITS) as u16,
            month: bits(raw, layout::DATE_MONTH_BITS) as u8,
            day: bits(raw, layout::DATE_DAY_BITS) as u8,
            hour: bits(raw, layout::DATE_HOUR_BITS) as u8,
            minute: bits(raw, layout::DATE_MINUTE_BITS) as u8,
            second: bits(raw, layout::DATE_SECOND_BITS) as u8,
        }
    }

    /// Pack components back into the wire layout. Out-of-range components are
    /// masked to their field width.
    pub fn to_packed(&self) -> u32 {
        let year = u32::from(self.year.saturating_sub(layout::DATE_EPOCH_YEAR));
        place(year, layout::DATE_YEAR_BITS)
            | place(u32::from(self.month), layout::DATE_MONTH_BITS)
            | place(u32::from(self.day), layout::DATE_DAY_BITS)
            | place(u32::from(self.hour), layout::DATE_HOUR_BITS)
            | place(u32::from(self.minute), layout::DATE_MINUTE_BITS)
            | place(u32::from(self.second), layout::DATE_SECOND_BITS)
    }

    /// Returns `None` when the components do not form a valid calendar value.
    pub fn to_datetime(&self) -> Option<PrimitiveDateTime> {
        let month = Month::try_from(self.month).ok()?;
        let date = Date::from_calendar_date(i32::from(self.year), month, self.day).ok()?;
        let time = Time::from_hms(self.hour, self.minute, self.second).ok()?;
        Some(PrimitiveDateTime::new(date, time))
    }

    /// RFC 3339 rendering, interpreting the device clock as UTC.
    pub fn to_rfc3339(&self) -> Option<String> {
        self.to_datetime()?.assume_utc().format(&Rfc3339).ok()
    }
}

impl fmt::Display for DeviceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

fn bits(raw: u32, (shift, width): (u32, u32)) -> u32 {
    (raw >> shift) & ((1 << width) - 1)
}

fn place(value: u32, (shift, width): (u32, u32)) -> u32 {
    (value & ((1 << width) - 1)) << shift
}

/// Firmware version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Fields shared by every log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogHeader {
    pub kind: LogRecordKind,
    /// Monotonic index assigned by the device.
    pub log_index: i32,
    /// Size declared by the device; informational unless a strict size check
    /// is requested.
    pub record_size: u16,
    pub error_code: u16,
    pub timestamp: DeviceDate,
    pub secs_since_powerup: u32,
}

/// Header of a history record: the common header plus its sub-kind and flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryHeader {
    pub header: LogHeader,
    pub history_kind: HistoryKind,
    pub flags: BTreeSet<HistoryFlag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasalRecord {
    pub history: HistoryHeader,
    pub rate_per_hour: f64,
    pub duration_minutes: u16,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BolusRecord {
    pub history: HistoryHeader,
    pub units: f64,
    pub extended_duration_minutes: u16,
    pub calculation_record_offset: u16,
    pub immediate_duration_seconds: u16,
}

/// Date or time change; which one is carried by the [`LogRecord`] variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockChangeRecord {
    pub history: HistoryHeader,
    pub new_time: DeviceDate,
}

/// Bolus calculator suggestion.
///
/// Insulin amounts are in units; `correction_iob` and `meal_iob` are raw
/// device counters and are not scaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedCalcRecord {
    pub history: HistoryHeader,
    pub correction_delivered: f64,
    pub carb_bolus_delivered: f64,
    pub correction_programmed: f64,
    pub carb_bolus_programmed: f64,
    pub correction_suggested: f64,
    pub carb_bolus_suggested: f64,
    pub correction_iob: u32,
    pub meal_iob: u32,
    pub correction_factor_used: u16,
    pub current_bg: u16,
    pub target_bg: u16,
    pub bg_correction_threshold: u16,
    pub carb_grams: i16,
    pub ic_ratio_used: u16,
}

/// Alarm logged into history. Shared by remote hazard alarms and alarms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub history: HistoryHeader,
    pub alarm_time: DeviceDate,
    pub alarm_type: u16,
    pub file_number: u16,
    pub line_number: u16,
    pub alarm_error_code: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodGlucoseRecord {
    pub history: HistoryHeader,
    pub bg_error_code: u32,
    pub bg_reading: u16,
    pub user_tag_1: String,
    pub user_tag_2: String,
    pub flags: BgFlag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbRecord {
    pub history: HistoryHeader,
    pub carbs: u16,
    pub was_preset: i8,
    pub preset_type: i8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminateBolusRecord {
    pub history: HistoryHeader,
    pub insulin_left: f64,
    pub time_left_minutes: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminateBasalRecord {
    pub history: HistoryHeader,
    pub time_left_minutes: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivateRecord {
    pub history: HistoryHeader,
    pub lot_number: u16,
    pub serial_number: u16,
    pub pod_version: Version,
    pub interlock_version: Version,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpAlarmRecord {
    pub header: LogHeader,
    pub alarm_time: DeviceDate,
    pub alarm: AlarmCode,
    pub alarm_error_code: i8,
    pub lot_number: u32,
    pub sequence_number: u32,
    pub processor_version: Version,
    pub interlock_version: Version,
}

/// A fully decoded log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogRecord {
    Basal(BasalRecord),
    Bolus(BolusRecord),
    DateChange(ClockChangeRecord),
    TimeChange(ClockChangeRecord),
    SuggestedCalc(SuggestedCalcRecord),
    RemoteHazardAlarm(AlarmRecord),
    Alarm(AlarmRecord),
    BloodGlucose(BloodGlucoseRecord),
    Carb(CarbRecord),
    TerminateBolus(TerminateBolusRecord),
    TerminateBasal(TerminateBasalRecord),
    Activate(ActivateRecord),
    /// History sub-kinds without a payload of their own.
    History(HistoryHeader),
    PumpAlarm(PumpAlarmRecord),
}

impl LogRecord {
    pub fn header(&self) -> &LogHeader {
        match self.split() {
            Ok(history) => &history.header,
            Err(alarm) => &alarm.header,
        }
    }

    pub fn history(&self) -> Option<&HistoryHeader> {
        self.split().ok()
    }

    fn split(&self) -> Result<&HistoryHeader, &PumpAlarmRecord> {
        match self {
            LogRecord::Basal(record) => Ok(&record.history),
            LogRecord::Bolus(record) => Ok(&record.history),
            LogRecord::DateChange(record) | LogRecord::TimeChange(record) => Ok(&record.history),
            LogRecord::SuggestedCalc(record) => Ok(&record.history),
            LogRecord::RemoteHazardAlarm(record) | LogRecord::Alarm(record) => Ok(&record.history),
            LogRecord::BloodGlucose(record) => Ok(&record.history),
            LogRecord::Carb(record) => Ok(&record.history),
            LogRecord::TerminateBolus(record) => Ok(&record.history),
            LogRecord::TerminateBasal(record) => Ok(&record.history),
            LogRecord::Activate(record) => Ok(&record.history),
            LogRecord::History(history) => Ok(history),
            LogRecord::PumpAlarm(record) => Err(record),
        }
    }

    /// Stable name of the record shape: the history sub-kind for history
    /// records, `pump_alarm` otherwise.
    pub fn kind_name(&self) -> &'static str {
        match self.history() {
            Some(history) => history.history_kind.name(),
            None => LogRecordKind::PumpAlarm.name(),
        }
    }
}
