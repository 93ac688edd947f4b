//! IBF core library for decoding insulin-pump log records.
//!
//! The crate turns one record window (the bytes of a single device log
//! entry) into a typed [`LogRecord`], or into a [`DecodeError`] explaining why
//! the window could not be classified. Decoding is byte-oriented and side-effect
//! free; file access is isolated in `source` modules and batch aggregation in
//! `analysis`.
//!
//! Invariants:
//! - A decode either returns a complete record or an error, never a partial
//!   record.
//! - Fields are read strictly in wire order; fixed-point values are scaled on
//!   read.
//! - A failing window never affects other windows in a batch.
//!
//! # Examples
//! ```
//! use ibf_core::{DecodeError, decode_log_record};
//!
//! let err = decode_log_record(&[0x03, 0x00]).unwrap_err();
//! assert!(matches!(err, DecodeError::InsufficientData { actual: 2, .. }));
//! ```
//!
//! ```no_run
//! use ibf_core::{DecodeOptions, analyze_record_files};
//!
//! let report = analyze_record_files(&["record-0001.bin"], &DecodeOptions::default())?;
//! println!("decoded {} of {}", report.summary.decoded, report.summary.records_total);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod analysis;
pub mod record;
mod source;

pub use analysis::{AnalysisError, analyze_record_files, analyze_source};
pub use record::model::{
    ActivateRecord, AlarmRecord, BasalRecord, BloodGlucoseRecord, BolusRecord, CarbRecord,
    ClockChangeRecord, DeviceDate, HistoryHeader, LogHeader, LogRecord, PumpAlarmRecord,
    SuggestedCalcRecord, TerminateBasalRecord, TerminateBolusRecord, Version,
};
pub use record::registry::{AlarmCode, BgFlag, HistoryFlag, HistoryKind, LogRecordKind};
pub use record::{DecodeError, DecodeOptions, SizeCheck, decode_log_record, decode_log_record_with};
pub use source::{MemorySource, RecordFileSource, RecordSource, RecordWindow, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Batch decode report: one entry per record window, in input order.
///
/// # Examples
/// ```
/// use ibf_core::make_stub_report;
///
/// let report = make_stub_report();
/// assert_eq!(report.report_version, ibf_core::REPORT_VERSION);
/// assert!(report.records.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// Aggregate counts over all windows.
    pub summary: DecodeSummary,
    /// Per-window outcomes in input order.
    pub records: Vec<RecordEntry>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "ibf").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Aggregate counts for a report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeSummary {
    /// Number of windows processed.
    pub records_total: u64,
    /// Windows that decoded into a record.
    pub decoded: u64,
    /// Windows that produced a decode error.
    pub failed: u64,
    /// Decoded records per kind name (history sub-kind or `pump_alarm`).
    pub by_kind: BTreeMap<String, u64>,
    /// Failures per error id.
    pub errors: BTreeMap<String, u64>,
    /// RFC3339 timestamp of the earliest valid record header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the latest valid record header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Outcome for a single record window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Window label (usually the input path).
    pub source: String,
    /// Window size in bytes.
    pub bytes: u64,
    /// Decoded record, when decoding succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<LogRecord>,
    /// Decode failure, when decoding failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
}

/// Serialized form of a [`DecodeError`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Stable error identifier (e.g., `IBF-UNKNOWN-HISTORY-KIND`).
    pub id: String,
    /// Human-readable message.
    pub message: String,
}

/// Build a report with base fields filled and no records.
pub fn make_stub_report() -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "ibf".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        summary: DecodeSummary::default(),
        records: vec![],
    }
}
