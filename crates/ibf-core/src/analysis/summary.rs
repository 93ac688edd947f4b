use std::collections::BTreeMap;

use time::PrimitiveDateTime;
use time::format_description::well_known::Rfc3339;

use crate::DecodeSummary;
use crate::record::DecodeError;
use crate::record::model::LogRecord;

#[derive(Debug, Default)]
pub(crate) struct SummaryStats {
    total: u64,
    decoded: u64,
    failed: u64,
    by_kind: BTreeMap<String, u64>,
    errors: BTreeMap<String, u64>,
    first_ts: Option<PrimitiveDateTime>,
    last_ts: Option<PrimitiveDateTime>,
}

impl SummaryStats {
    pub(crate) fn add(&mut self, outcome: &Result<LogRecord, DecodeError>) {
        self.total += 1;
        match outcome {
            Ok(record) => {
                self.decoded += 1;
                *self.by_kind.entry(record.kind_name().to_string()).or_default() += 1;
                if let Some(ts) = record.header().timestamp.to_datetime() {
                    update_ts_bounds(&mut self.first_ts, &mut self.last_ts, ts);
                }
            }
            Err(err) => {
                self.failed += 1;
                *self.errors.entry(err.id().to_string()).or_default() += 1;
            }
        }
    }

    pub(crate) fn into_summary(self) -> DecodeSummary {
        DecodeSummary {
            records_total: self.total,
            decoded: self.decoded,
            failed: self.failed,
            by_kind: self.by_kind,
            errors: self.errors,
            time_start: ts_to_rfc3339(self.first_ts),
            time_end: ts_to_rfc3339(self.last_ts),
        }
    }
}

fn update_ts_bounds(
    first: &mut Option<PrimitiveDateTime>,
    last: &mut Option<PrimitiveDateTime>,
    ts: PrimitiveDateTime,
) {
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<PrimitiveDateTime>) -> Option<String> {
    ts?.assume_utc().format(&Rfc3339).ok()
}
