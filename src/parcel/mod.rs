//! Transport buffer marshaling.
//!
//! A parcel is a flat sequence of typed values with no field tags: producer
//! and consumer agree on the order. Layout, all little-endian:
//!
//! | type   | encoding                                              |
//! |--------|-------------------------------------------------------|
//! | i32    | 4 bytes                                               |
//! | i64    | 8 bytes                                               |
//! | f64    | 8 bytes, IEEE-754 bits                                |
//! | string | i32 byte length (-1 for null), then UTF-8 bytes       |

use bytes::{Buf, BufMut, BytesMut};
use crate::core::{ModelError, Result};

const NULL_STRING_LEN: i32 = -1;

/// Sequential typed writes.
pub trait ParcelWriter {
    fn write_i32(&mut self, value: i32) -> Result<()>;

    fn write_i64(&mut self, value: i64) -> Result<()>;

    fn write_f64(&mut self, value: f64) -> Result<()>;

    /// `None` is written as a null string.
    fn write_string(&mut self, value: Option<&str>) -> Result<()>;
}

/// Sequential typed reads, mirroring `ParcelWriter`.
pub trait ParcelReader {
    fn read_i32(&mut self) -> Result<i32>;

    fn read_i64(&mut self) -> Result<i64>;

    fn read_f64(&mut self) -> Result<f64>;

    fn read_string(&mut self) -> Result<Option<String>>;
}

/// A type that can flatten itself into a parcel and be rebuilt from one.
pub trait Parcelable: Sized {
    /// Bitmask of special objects in the flattened form. Plain records return 0.
    fn describe_contents(&self) -> i32 {
        0
    }

    fn write_to_parcel(&self, parcel: &mut dyn ParcelWriter, flags: i32) -> Result<()>;

    fn create_from_parcel(parcel: &mut dyn ParcelReader) -> Result<Self>;

    fn new_array(size: usize) -> Vec<Option<Self>> {
        std::iter::repeat_with(|| None).take(size).collect()
    }
}

/// In-memory parcel backed by a growable byte buffer.
///
/// Writes append at the end; reads consume from the data position.
#[derive(Debug, Clone, Default)]
pub struct Parcel {
    data: BytesMut,
    position: usize,
}

impl Parcel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps raw bytes, positioned at the start.
    pub fn unmarshall(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
            position: 0,
        }
    }

    /// Copy of the raw bytes written so far.
    pub fn marshall(&self) -> Vec<u8> {
        self.data.to_vec()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn data_position(&self) -> usize {
        self.position
    }

    pub fn data_avail(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Moves the read position; clamped to the data size.
    pub fn set_data_position(&mut self, position: usize) {
        self.position = position.min(self.data.len());
    }

    /// Writes `value` and rewinds, ready for `T::create_from_parcel`.
    pub fn from_parcelable<T: Parcelable>(value: &T, flags: i32) -> Result<Self> {
        let mut parcel = Self::new();
        value.write_to_parcel(&mut parcel, flags)?;
        parcel.set_data_position(0);
        Ok(parcel)
    }

    fn take(&mut self, needed: usize) -> Result<&[u8]> {
        let available = self.data_avail();
        if needed > available {
            return Err(ModelError::BufferUnderflow { needed, available });
        }
        let start = self.position;
        self.position += needed;
        Ok(&self.data[start..self.position])
    }
}

impl ParcelWriter for Parcel {
    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.data.put_i32_le(value);
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.data.put_i64_le(value);
        Ok(())
    }

    fn write_f64(&mut self, value: f64) -> Result<()> {
        self.data.put_f64_le(value);
        Ok(())
    }

    fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        match value {
            None => self.data.put_i32_le(NULL_STRING_LEN),
            Some(s) => {
                let len = i32::try_from(s.len()).map_err(|_| {
                    ModelError::InvalidEncoding(format!("string of {} bytes is too long", s.len()))
                })?;
                self.data.put_i32_le(len);
                self.data.put_slice(s.as_bytes());
            }
        }
        Ok(())
    }
}

impl ParcelReader for Parcel {
    fn read_i32(&mut self) -> Result<i32> {
        let mut bytes = self.take(4)?;
        Ok(bytes.get_i32_le())
    }

    fn read_i64(&mut self) -> Result<i64> {
        let mut bytes = self.take(8)?;
        Ok(bytes.get_i64_le())
    }

    fn read_f64(&mut self) -> Result<f64> {
        let mut bytes = self.take(8)?;
        Ok(bytes.get_f64_le())
    }

    fn read_string(&mut self) -> Result<Option<String>> {
        let len = self.read_i32()?;
        if len == NULL_STRING_LEN {
            return Ok(None);
        }
        let len = usize::try_from(len)
            .map_err(|_| ModelError::InvalidEncoding(format!("negative string length {}", len)))?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|e| ModelError::InvalidEncoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_layout() {
        let mut parcel = Parcel::new();
        parcel.write_i32(1).unwrap();
        parcel.write_i64(-2).unwrap();
        parcel.write_f64(0.5).unwrap();
        assert_eq!(parcel.data_size(), 20);
        assert_eq!(&parcel.as_bytes()[..4], &[1, 0, 0, 0]);

        assert_eq!(parcel.read_i32().unwrap(), 1);
        assert_eq!(parcel.read_i64().unwrap(), -2);
        assert_eq!(parcel.read_f64().unwrap(), 0.5);
        assert_eq!(parcel.data_avail(), 0);
    }

    #[test]
    fn test_strings() {
        let mut parcel = Parcel::new();
        parcel.write_string(Some("Zoë")).unwrap();
        parcel.write_string(None).unwrap();
        parcel.write_string(Some("")).unwrap();

        assert_eq!(parcel.read_string().unwrap().as_deref(), Some("Zoë"));
        assert_eq!(parcel.read_string().unwrap(), None);
        assert_eq!(parcel.read_string().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_underflow() {
        let mut parcel = Parcel::unmarshall(&[1, 2, 3]);
        assert_eq!(
            parcel.read_i32(),
            Err(ModelError::BufferUnderflow { needed: 4, available: 3 })
        );
        // failed read does not consume
        assert_eq!(parcel.data_position(), 0);
    }

    #[test]
    fn test_bad_string_length() {
        let mut parcel = Parcel::new();
        parcel.write_i32(-7).unwrap();
        assert!(matches!(parcel.read_string(), Err(ModelError::InvalidEncoding(_))));

        let mut parcel = Parcel::new();
        parcel.write_i32(2).unwrap();
        parcel.data.put_slice(&[0xff, 0xfe]);
        assert!(matches!(parcel.read_string(), Err(ModelError::InvalidEncoding(_))));
    }

    #[test]
    fn test_set_data_position_clamps() {
        let mut parcel = Parcel::new();
        parcel.write_i64(9).unwrap();
        parcel.set_data_position(100);
        assert_eq!(parcel.data_position(), 8);
        parcel.set_data_position(0);
        assert_eq!(parcel.read_i64().unwrap(), 9);
    }

    #[test]
    fn test_marshall_unmarshall() {
        let mut parcel = Parcel::new();
        parcel.write_string(Some("Ann")).unwrap();
        let mut copy = Parcel::unmarshall(&parcel.marshall());
        assert_eq!(copy.read_string().unwrap().as_deref(), Some("Ann"));
    }
}
