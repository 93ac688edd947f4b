//! Byte widths, offsets and discriminator values of the on-device log format.

pub const KIND_OFFSET: usize = 0;
pub const LOG_INDEX_RANGE: std::ops::Range<usize> = 1..5;
pub const RECORD_SIZE_RANGE: std::ops::Range<usize> = 5..7;
pub const ERROR_CODE_RANGE: std::ops::Range<usize> = 7..9;
pub const TIMESTAMP_RANGE: std::ops::Range<usize> = 9..13;
pub const SECS_SINCE_POWERUP_RANGE: std::ops::Range<usize> = 14..18;
pub const HEADER_LEN: usize = 18;

pub const HISTORY_KIND_RANGE: std::ops::Range<usize> = 18..22;
pub const HISTORY_FLAGS_RANGE: std::ops::Range<usize> = 22..24;
pub const HISTORY_PAYLOAD_OFFSET: usize = 26;

pub const PUMP_ALARM_PAYLOAD_OFFSET: usize = HEADER_LEN;

pub const DATE_LEN: usize = 4;
pub const VERSION_LEN: usize = 6;
pub const TEXT_TAG_LEN: usize = 24;

pub const HEADER_RESERVED_LEN: usize = 1;
pub const HISTORY_RESERVED_LEN: usize = 2;
pub const ALARM_RESERVED_LEN: usize = 1;

pub const RECORD_KIND_HISTORY: u8 = 0x03;
pub const RECORD_KIND_PUMP_ALARM: u8 = 0x04;

/// Device dates count years from this epoch.
pub const DATE_EPOCH_YEAR: u16 = 2000;
pub const DATE_SECOND_BITS: (u32, u32) = (0, 6);
pub const DATE_MINUTE_BITS: (u32, u32) = (6, 6);
pub const DATE_HOUR_BITS: (u32, u32) = (12, 5);
pub const DATE_DAY_BITS: (u32, u32) = (17, 5);
pub const DATE_MONTH_BITS: (u32, u32) = (22, 4);
pub const DATE_YEAR_BITS: (u32, u32) = (26, 6);

/// Divisor for fixed-point fields stored in hundredths.
pub const FIXED_POINT_SCALE: f64 = 100.0;
