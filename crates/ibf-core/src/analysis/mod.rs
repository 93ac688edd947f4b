use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::record::{DecodeError, DecodeOptions, decode_log_record_with};
use crate::record::model::LogRecord;
use crate::source::{RecordFileSource, RecordSource, RecordWindow, SourceError};
use crate::{ErrorSummary, RecordEntry, Report, make_stub_report};

mod summary;

use summary::SummaryStats;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Decode every file in `paths` as one record window each.
pub fn analyze_record_files<P: AsRef<Path>>(
    paths: &[P],
    options: &DecodeOptions,
) -> Result<Report, AnalysisError> {
    let source = RecordFileSource::open(paths)?;
    analyze_source(source, options)
}

/// Decode all windows of `source` into a report.
///
/// A window that fails to decode is recorded with its error and the scan
/// continues; only source errors abort.
pub fn analyze_source<S: RecordSource>(
    mut source: S,
    options: &DecodeOptions,
) -> Result<Report, AnalysisError> {
    let mut stats = SummaryStats::default();
    let mut records = Vec::new();

    while let Some(RecordWindow { label, data }) = source.next_window()? {
        let outcome = decode_log_record_with(&data, options);
        debug!(
            source = %label,
            len = data.len(),
            ok = outcome.is_ok(),
            "processed record window"
        );
        stats.add(&outcome);
        records.push(build_entry(label, data.len(), outcome));
    }

    let mut report = make_stub_report();
    report.summary = stats.into_summary();
    report.records = records;
    info!(
        records = report.summary.records_total,
        decoded = report.summary.decoded,
        failed = report.summary.failed,
        "decode report ready"
    );
    Ok(report)
}

fn build_entry(
    source: String,
    len: usize,
    outcome: Result<LogRecord, DecodeError>,
) -> RecordEntry {
    let (record, error) = match outcome {
        Ok(record) => (Some(record), None),
        Err(err) => (
            None,
            Some(ErrorSummary {
                id: err.id().to_string(),
                message: err.to_string(),
            }),
        ),
    };
    RecordEntry {
        source,
        bytes: len as u64,
        record,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::analyze_source;
    use crate::record::DecodeOptions;
    use crate::record::layout;
    use crate::source::MemorySource;

    fn header_only_resume() -> Vec<u8> {
        let mut bytes = vec![0u8; layout::HISTORY_PAYLOAD_OFFSET];
        bytes[layout::KIND_OFFSET] = layout::RECORD_KIND_HISTORY;
        bytes[layout::LOG_INDEX_RANGE].copy_from_slice(&3i32.to_be_bytes());
        bytes[layout::HISTORY_KIND_RANGE].copy_from_slice(&0x0800u32.to_le_bytes());
        bytes
    }

    #[test]
    fn failures_do_not_stop_the_scan() {
        let source = MemorySource::from_buffers([
            header_only_resume(),
            vec![0u8; 4],
            vec![0xffu8; layout::HEADER_LEN],
            header_only_resume(),
        ]);
        let report = analyze_source(source, &DecodeOptions::default()).unwrap();

        assert_eq!(report.summary.records_total, 4);
        assert_eq!(report.summary.decoded, 2);
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.by_kind.get("resume"), Some(&2));
        assert_eq!(
            report.summary.errors.get("IBF-INSUFFICIENT-DATA"),
            Some(&1)
        );
        assert_eq!(
            report.summary.errors.get("IBF-UNKNOWN-RECORD-KIND"),
            Some(&1)
        );

        assert_eq!(report.records.len(), 4);
        assert_eq!(report.records[1].source, "#1");
        assert_eq!(report.records[1].bytes, 4);
        assert!(report.records[1].record.is_none());
        assert!(report.records[0].error.is_none());
        assert_eq!(
            report.records[3].record.as_ref().map(|r| r.header().log_index),
            Some(3)
        );
    }

    #[test]
    fn empty_source_yields_empty_report() {
        let report = analyze_source(MemorySource::default(), &DecodeOptions::default()).unwrap();
        assert_eq!(report.summary.records_total, 0);
        assert!(report.records.is_empty());
        assert!(report.summary.time_start.is_none());
    }
}
