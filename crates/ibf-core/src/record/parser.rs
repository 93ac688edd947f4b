use tracing::{debug, trace};

use super::error::DecodeError;
use super::layout;
use super::model::{
    ActivateRecord, AlarmRecord, BasalRecord, BloodGlucoseRecord, BolusRecord, CarbRecord,
    ClockChangeRecord, HistoryHeader, LogHeader, LogRecord, PumpAlarmRecord, SuggestedCalcRecord,
    TerminateBasalRecord, TerminateBolusRecord,
};
use super::options::{DecodeOptions, SizeCheck};
use super::reader::ByteCursor;
use super::registry::{AlarmCode, BgFlag, HistoryFlag, HistoryKind, LogRecordKind};

/// Decode one record window with default options.
pub fn decode_log_record(bytes: &[u8]) -> Result<LogRecord, DecodeError> {
    decode_log_record_with(bytes, &DecodeOptions::default())
}

/// Decode one record window.
///
/// Returns either a fully populated record or the first error met; partial
/// records are never returned.
pub fn decode_log_record_with(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<LogRecord, DecodeError> {
    let result = decode(bytes, options);
    match &result {
        Ok(record) => debug!(
            log_index = record.header().log_index,
            kind = record.kind_name(),
            "decoded log record"
        ),
        Err(err) => debug!(error = %err, len = bytes.len(), "rejected log record"),
    }
    result
}

fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<LogRecord, DecodeError> {
    let mut cursor = ByteCursor::new(bytes);
    if cursor.remaining() < layout::HEADER_LEN {
        return Err(DecodeError::InsufficientData {
            needed: layout::HEADER_LEN,
            actual: cursor.remaining(),
        });
    }

    let raw_kind = cursor.next_u8()?;
    let kind = LogRecordKind::from_raw(raw_kind)
        .ok_or(DecodeError::UnknownRecordKind { value: raw_kind })?;
    let header = read_header(&mut cursor, kind)?;
    trace!(%kind, log_index = header.log_index, "classified log record");

    let record = match kind {
        LogRecordKind::History => read_history(&mut cursor, header)?,
        LogRecordKind::PumpAlarm => LogRecord::PumpAlarm(read_pump_alarm(&mut cursor, header)?),
    };

    if options.size_check == SizeCheck::Strict {
        let declared = record.header().record_size;
        if usize::from(declared) != cursor.position() {
            return Err(DecodeError::RecordSizeMismatch {
                declared,
                consumed: cursor.position(),
            });
        }
    }
    Ok(record)
}

fn read_header(
    cursor: &mut ByteCursor<'_>,
    kind: LogRecordKind,
) -> Result<LogHeader, DecodeError> {
    let log_index = cursor.next_i32_be()?;
    let record_size = cursor.next_u16_be()?;
    let error_code = cursor.next_u16_be()?;
    let timestamp = cursor.next_date()?;
    cursor.skip(layout::HEADER_RESERVED_LEN)?;
    let secs_since_powerup = cursor.next_u32_le()?;
    Ok(LogHeader {
        kind,
        log_index,
        record_size,
        error_code,
        timestamp,
        secs_since_powerup,
    })
}

fn read_history(
    cursor: &mut ByteCursor<'_>,
    header: LogHeader,
) -> Result<LogRecord, DecodeError> {
    let raw_kind = cursor.next_u32_le()?;
    let history_kind = HistoryKind::from_raw(raw_kind)
        .ok_or(DecodeError::UnknownHistoryKind { value: raw_kind })?;
    let flags = HistoryFlag::from_bitmask(cursor.next_u16_le()?);
    cursor.skip(layout::HISTORY_RESERVED_LEN)?;
    let history = HistoryHeader {
        header,
        history_kind,
        flags,
    };

    let record = match history_kind {
        HistoryKind::Basal => LogRecord::Basal(read_basal(cursor, history)?),
        HistoryKind::Bolus => LogRecord::Bolus(read_bolus(cursor, history)?),
        HistoryKind::DateChange => LogRecord::DateChange(read_clock_change(cursor, history)?),
        HistoryKind::TimeChange => LogRecord::TimeChange(read_clock_change(cursor, history)?),
        HistoryKind::SuggestedCalc => {
            LogRecord::SuggestedCalc(read_suggested_calc(cursor, history)?)
        }
        HistoryKind::RemoteHazardAlarm => {
            LogRecord::RemoteHazardAlarm(read_alarm(cursor, history)?)
        }
        HistoryKind::Alarm => LogRecord::Alarm(read_alarm(cursor, history)?),
        HistoryKind::BloodGlucose => {
            LogRecord::BloodGlucose(read_blood_glucose(cursor, history)?)
        }
        HistoryKind::Carb => LogRecord::Carb(read_carb(cursor, history)?),
        HistoryKind::TerminateBolus => {
            LogRecord::TerminateBolus(read_terminate_bolus(cursor, history)?)
        }
        HistoryKind::TerminateBasal => {
            LogRecord::TerminateBasal(read_terminate_basal(cursor, history)?)
        }
        HistoryKind::Activate => LogRecord::Activate(read_activate(cursor, history)?),
        HistoryKind::Deactivate
        | HistoryKind::Resume
        | HistoryKind::Download
        | HistoryKind::Occlusion
        | HistoryKind::Suspend => LogRecord::History(history),
    };
    Ok(record)
}

fn hundredths(raw: impl Into<f64>) -> f64 {
    raw.into() / layout::FIXED_POINT_SCALE
}

fn read_basal(
    cursor: &mut ByteCursor<'_>,
    history: HistoryHeader,
) -> Result<BasalRecord, DecodeError> {
    let rate_per_hour = hundredths(cursor.next_u32_le()?);
    let duration_minutes = cursor.next_u16_le()?;
    let percent = hundredths(cursor.next_u16_le()?);
    Ok(BasalRecord {
        history,
        rate_per_hour,
        duration_minutes,
        percent,
    })
}

fn read_bolus(
    cursor: &mut ByteCursor<'_>,
    history: HistoryHeader,
) -> Result<BolusRecord, DecodeError> {
    let units = hundredths(cursor.next_u32_le()?);
    let extended_duration_minutes = cursor.next_u16_le()?;
    let calculation_record_offset = cursor.next_u16_le()?;
    let immediate_duration_seconds = cursor.next_u16_le()?;
    Ok(BolusRecord {
        history,
        units,
        extended_duration_minutes,
        calculation_record_offset,
        immediate_duration_seconds,
    })
}

fn read_clock_change(
    cursor: &mut ByteCursor<'_>,
    history: HistoryHeader,
) -> Result<ClockChangeRecord, DecodeError> {
    let new_time = cursor.next_date()?;
    Ok(ClockChangeRecord { history, new_time })
}

fn read_suggested_calc(
    cursor: &mut ByteCursor<'_>,
    history: HistoryHeader,
) -> Result<SuggestedCalcRecord, DecodeError> {
    let correction_delivered = hundredths(cursor.next_u32_le()?);
    let carb_bolus_delivered = hundredths(cursor.next_u32_le()?);
    let correction_programmed = hundredths(cursor.next_u32_le()?);
    let carb_bolus_programmed = hundredths(cursor.next_u32_le()?);
    // Negative when the calculator reverses a correction below target.
    let correction_suggested = hundredths(cursor.next_i32_le()?);
    let carb_bolus_suggested = hundredths(cursor.next_u32_le()?);
    let correction_iob = cursor.next_u32_le()?;
    let meal_iob = cursor.next_u32_le()?;
    let correction_factor_used = cursor.next_u16_le()?;
    let current_bg = cursor.next_u16_le()?;
    let target_bg = cursor.next_u16_le()?;
    let bg_correction_threshold = cursor.next_u16_le()?;
    let carb_grams = cursor.next_i16_le()?;
    let ic_ratio_used = cursor.next_u16_le()?;
    Ok(SuggestedCalcRecord {
        history,
        correction_delivered,
        carb_bolus_delivered,
        correction_programmed,
        carb_bolus_programmed,
        correction_suggested,
        carb_bolus_suggested,
        correction_iob,
        meal_iob,
        correction_factor_used,
        current_bg,
        target_bg,
        bg_correction_threshold,
        carb_grams,
        ic_ratio_used,
    })
}

fn read_alarm(
    cursor: &mut ByteCursor<'_>,
    history: HistoryHeader,
) -> Result<AlarmRecord, DecodeError> {
    let alarm_time = cursor.next_date()?;
    cursor.skip(layout::ALARM_RESERVED_LEN)?;
    let alarm_type = cursor.next_u16_le()?;
    let file_number = cursor.next_u16_le()?;
    let line_number = cursor.next_u16_le()?;
    let alarm_error_code = cursor.next_u16_le()?;
    Ok(AlarmRecord {
        history,
        alarm_time,
        alarm_type,
        file_number,
        line_number,
        alarm_error_code,
    })
}

fn read_blood_glucose(
    cursor: &mut ByteCursor<'_>,
    history: HistoryHeader,
) -> Result<BloodGlucoseRecord, DecodeError> {
    let bg_error_code = cursor.next_u32_le()?;
    let bg_reading = cursor.next_u16_le()?;
    let user_tag_1 = cursor.next_string(layout::TEXT_TAG_LEN)?;
    let user_tag_2 = cursor.next_string(layout::TEXT_TAG_LEN)?;
    let flags = BgFlag::from_byte(cursor.next_u8()?);
    Ok(BloodGlucoseRecord {
        history,
        bg_error_code,
        bg_reading,
        user_tag_1,
        user_tag_2,
        flags,
    })
}

fn read_carb(
    cursor: &mut ByteCursor<'_>,
    history: HistoryHeader,
) -> Result<CarbRecord, DecodeError> {
    let carbs = cursor.next_u16_le()?;
    let was_preset = cursor.next_i8()?;
    let preset_type = cursor.next_i8()?;
    Ok(CarbRecord {
        history,
        carbs,
        was_preset,
        preset_type,
    })
}

fn read_terminate_bolus(
    cursor: &mut ByteCursor<'_>,
    history: HistoryHeader,
) -> Result<TerminateBolusRecord, DecodeError> {
    let insulin_left = hundredths(cursor.next_u32_le()?);
    let time_left_minutes = cursor.next_u16_le()?;
    Ok(TerminateBolusRecord {
        history,
        insulin_left,
        time_left_minutes,
    })
}

fn read_terminate_basal(
    cursor: &mut ByteCursor<'_>,
    history: HistoryHeader,
) -> Result<TerminateBasalRecord, DecodeError> {
    let time_left_minutes = cursor.next_u16_le()?;
    Ok(TerminateBasalRecord {
        history,
        time_left_minutes,
    })
}

fn read_activate(
    cursor: &mut ByteCursor<'_>,
    history: HistoryHeader,
) -> Result<ActivateRecord, DecodeError> {
    let lot_number = cursor.next_u16_le()?;
    let serial_number = cursor.next_u16_le()?;
    let pod_version = cursor.next_version()?;
    let interlock_version = cursor.next_version()?;
    Ok(ActivateRecord {
        history,
        lot_number,
        serial_number,
        pod_version,
        interlock_version,
    })
}

fn read_pump_alarm(
    cursor: &mut ByteCursor<'_>,
    header: LogHeader,
) -> Result<PumpAlarmRecord, DecodeError> {
    let alarm_time = cursor.next_date()?;
    cursor.skip(layout::ALARM_RESERVED_LEN)?;
    let alarm = AlarmCode::from_raw(cursor.next_u8()?);
    cursor.skip(layout::ALARM_RESERVED_LEN)?;
    let alarm_error_code = cursor.next_i8()?;
    let lot_number = cursor.next_u32_le()?;
    let sequence_number = cursor.next_u32_le()?;
    let processor_version = cursor.next_version()?;
    let interlock_version = cursor.next_version()?;
    Ok(PumpAlarmRecord {
        header,
        alarm_time,
        alarm,
        alarm_error_code,
        lot_number,
        sequence_number,
        processor_version,
        interlock_version,
    })
}
