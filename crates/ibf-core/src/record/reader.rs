use super::error::DecodeError;
use super::layout;
use super::model::{DeviceDate, Version};

/// Sequential reader over one record window.
///
/// Every read is bounds-checked: when fewer bytes remain than the read needs,
/// it returns [`DecodeError::Truncated`] and the position does not move.
///
/// # Examples
/// ```
/// use ibf_core::record::reader::ByteCursor;
///
/// let bytes = [0x01, 0x02, 0x03, 0x04, 0x05];
/// let mut cursor = ByteCursor::new(&bytes);
/// assert_eq!(cursor.next_u16_be().unwrap(), 0x0102);
/// assert_eq!(cursor.next_u16_le().unwrap(), 0x0403);
/// assert_eq!(cursor.remaining(), 1);
/// assert!(cursor.next_u32_le().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn require_remaining(&self, needed: usize) -> Result<(), DecodeError> {
        if self.remaining() < needed {
            return Err(DecodeError::Truncated {
                offset: self.position,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.next_bytes(len).map(|_| ())
    }

    pub fn next_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.require_remaining(len)?;
        let start = self.position;
        self.position += len;
        Ok(&self.bytes[start..self.position])
    }

    fn next_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.next_bytes(N)?);
        Ok(out)
    }

    pub fn next_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.next_array::<1>()?[0])
    }

    pub fn next_i8(&mut self) -> Result<i8, DecodeError> {
        self.next_array().map(i8::from_le_bytes)
    }

    pub fn next_u16_be(&mut self) -> Result<u16, DecodeError> {
        self.next_array().map(u16::from_be_bytes)
    }

    pub fn next_u16_le(&mut self) -> Result<u16, DecodeError> {
        self.next_array().map(u16::from_le_bytes)
    }

    pub fn next_i16_le(&mut self) -> Result<i16, DecodeError> {
        self.next_array().map(i16::from_le_bytes)
    }

    pub fn next_i32_be(&mut self) -> Result<i32, DecodeError> {
        self.next_array().map(i32::from_be_bytes)
    }

    pub fn next_i32_le(&mut self) -> Result<i32, DecodeError> {
        self.next_array().map(i32::from_le_bytes)
    }

    pub fn next_u32_be(&mut self) -> Result<u32, DecodeError> {
        self.next_array().map(u32::from_be_bytes)
    }

    pub fn next_u32_le(&mut self) -> Result<u32, DecodeError> {
        self.next_array().map(u32::from_le_bytes)
    }

    /// Fixed-length text field. Decoding stops at the first NUL; invalid
    /// UTF-8 is replaced and trailing whitespace trimmed.
    pub fn next_string(&mut self, len: usize) -> Result<String, DecodeError> {
        let bytes = self.next_bytes(len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let raw = String::from_utf8_lossy(&bytes[..end]);
        Ok(raw.trim_end().to_string())
    }

    pub fn next_date(&mut self) -> Result<DeviceDate, DecodeError> {
        let raw = self.next_array::<{ layout::DATE_LEN }>()?;
        Ok(DeviceDate::from_packed(u32::from_le_bytes(raw)))
    }

    pub fn next_version(&mut self) -> Result<Version, DecodeError> {
        self.require_remaining(layout::VERSION_LEN)?;
        Ok(Version {
            major: self.next_u16_le()?,
            minor: self.next_u16_le()?,
            patch: self.next_u16_le()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ByteCursor;
    use crate::record::error::DecodeError;
    use crate::record::model::{DeviceDate, Version};

    #[test]
    fn reads_advance_by_width() {
        let bytes = [0xff, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.next_i8().unwrap(), -1);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.next_u32_be().unwrap(), 0x0102_0304);
        assert_eq!(cursor.next_u32_le().unwrap(), 0x0807_0605);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn signed_reads_respect_endianness() {
        let bytes = [0xff, 0xff, 0xff, 0xfe, 0xfe, 0xff, 0xff, 0xff, 0x38, 0xff];
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.next_i32_be().unwrap(), -2);
        assert_eq!(cursor.next_i32_le().unwrap(), -2);
        assert_eq!(cursor.next_i16_le().unwrap(), -200);
    }

    #[test]
    fn short_read_fails_without_moving() {
        let bytes = [0x01, 0x02, 0x03];
        let mut cursor = ByteCursor::new(&bytes);
        cursor.skip(1).unwrap();
        let err = cursor.next_u32_le().unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                offset: 1,
                needed: 4,
                remaining: 2,
            }
        );
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.next_u16_be().unwrap(), 0x0203);
    }

    #[test]
    fn skip_past_end_fails() {
        let bytes = [0u8; 2];
        let mut cursor = ByteCursor::new(&bytes);
        assert!(matches!(
            cursor.skip(3),
            Err(DecodeError::Truncated { needed: 3, .. })
        ));
        assert_eq!(cursor.remaining(), 2);
    }

    #[test]
    fn string_stops_at_nul_and_trims() {
        let mut bytes = [0u8; 8];
        bytes[..6].copy_from_slice(b"meal  ");
        bytes[7] = b'x';
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.next_string(8).unwrap(), "meal");
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn string_replaces_invalid_utf8() {
        let bytes = [b'a', 0xff, b'b', 0x00];
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.next_string(4).unwrap(), "a\u{fffd}b");
    }

    #[test]
    fn date_reads_packed_little_endian() {
        let date = DeviceDate {
            year: 2015,
            month: 1,
            day: 16,
            hour: 23,
            minute: 43,
            second: 29,
        };
        let bytes = date.to_packed().to_le_bytes();
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.next_date().unwrap(), date);
    }

    #[test]
    fn version_is_read_as_a_unit() {
        let bytes = [2, 0, 7, 0, 1, 0];
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(
            cursor.next_version().unwrap(),
            Version {
                major: 2,
                minor: 7,
                patch: 1,
            }
        );

        let mut short = ByteCursor::new(&bytes[..5]);
        assert!(short.next_version().is_err());
        assert_eq!(short.position(), 0);
    }
}
