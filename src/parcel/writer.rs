//! Parcel encoder.
//!
//! Values are written little-endian and every item is padded to a 4-byte
//! boundary, so a stream produced here lines up with what the platform's own
//! parcel implementation writes for the same sequence of calls.

use super::Parcelable;

/// Sentinel length written in place of an absent string, array or record.
pub const NULL_LENGTH: i32 = -1;

/// Round a byte count up to the next 4-byte boundary.
#[inline]
pub(crate) const fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

/// Append-only parcel buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parcel {
    data: Vec<u8>,
}

impl Parcel {
    /// Create an empty parcel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty parcel with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the parcel and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Number of bytes written.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a boolean as an `i32` 0 or 1.
    pub fn write_bool(&mut self, value: bool) {
        self.write_i32(i32::from(value));
    }

    /// Write a length prefix for a present collection.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds `i32::MAX`, the largest length a parcel can
    /// carry.
    pub fn write_len(&mut self, len: usize) {
        let Ok(len) = i32::try_from(len) else {
            panic!("collection length {} does not fit a parcel length prefix", len);
        };
        self.write_i32(len);
    }

    /// Write an optional string.
    ///
    /// Layout: `[units:i32][utf16le:units*2][nul:2][pad]`, or `-1` if absent.
    pub fn write_string(&mut self, value: Option<&str>) {
        let Some(s) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };

        let units: Vec<u16> = s.encode_utf16().collect();
        self.write_len(units.len());

        let start = self.data.len();
        for unit in &units {
            self.data.extend_from_slice(&unit.to_le_bytes());
        }
        self.data.extend_from_slice(&[0, 0]);
        self.pad_from(start);
    }

    /// Write an optional byte array.
    ///
    /// Layout: `[len:i32][bytes:len][pad]`, or `-1` if absent.
    pub fn write_byte_array(&mut self, value: Option<&[u8]>) {
        let Some(bytes) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };

        self.write_len(bytes.len());
        let start = self.data.len();
        self.data.extend_from_slice(bytes);
        self.pad_from(start);
    }

    /// Write an optional array of 64-bit integers.
    pub fn write_i64_array(&mut self, value: Option<&[i64]>) {
        let Some(values) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };

        self.write_len(values.len());
        for v in values {
            self.write_i64(*v);
        }
    }

    /// Write an optional array of strings. Elements are always present.
    pub fn write_string_array(&mut self, value: Option<&[String]>) {
        let Some(values) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };

        self.write_len(values.len());
        for v in values {
            self.write_string(Some(v));
        }
    }

    /// Write an optional nested record, prefixed by its class name.
    pub fn write_parcelable<T: Parcelable>(&mut self, value: Option<&T>) {
        match value {
            Some(record) => {
                self.write_string(Some(T::CLASS_NAME));
                record.write_to_parcel(self);
            }
            None => self.write_string(None),
        }
    }

    fn pad_from(&mut self, start: usize) {
        let written = self.data.len() - start;
        let padded = pad4(written);
        self.data.resize(start + padded, 0);
    }
}
