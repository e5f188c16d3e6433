//! Bounds-checked parcel decoder.
//!
//! Every read checks the remaining input before touching it, and every
//! length prefix is checked against [`ParcelLimits`] before anything is
//! allocated. A malformed stream ends the decode with a [`ParcelError`].

use super::writer::{pad4, NULL_LENGTH};
use super::Parcelable;
use crate::material::CertificateError;

/// Default maximum number of elements in a decoded array or map.
pub const DEFAULT_MAX_ARRAY_LEN: usize = 4096;

/// Default maximum string length in UTF-16 code units.
pub const DEFAULT_MAX_STRING_LEN: usize = 4096;

/// Default maximum byte-array length (certificates and keys).
pub const DEFAULT_MAX_BYTE_ARRAY_LEN: usize = 64 * 1024;

/// Upper bounds applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParcelLimits {
    /// Maximum element count for arrays, maps and certificate chains.
    pub max_array_len: usize,
    /// Maximum string length in UTF-16 code units.
    pub max_string_len: usize,
    /// Maximum byte-array length.
    pub max_byte_array_len: usize,
}

impl Default for ParcelLimits {
    fn default() -> Self {
        Self {
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_byte_array_len: DEFAULT_MAX_BYTE_ARRAY_LEN,
        }
    }
}

impl ParcelLimits {
    /// Validate limit values.
    ///
    /// # Errors
    ///
    /// Returns an error if any limit is 0.
    pub fn validate(&self) -> Result<(), ParcelError> {
        if self.max_array_len == 0 {
            return Err(ParcelError::InvalidLimits(
                "max_array_len must be greater than 0",
            ));
        }
        if self.max_string_len == 0 {
            return Err(ParcelError::InvalidLimits(
                "max_string_len must be greater than 0",
            ));
        }
        if self.max_byte_array_len == 0 {
            return Err(ParcelError::InvalidLimits(
                "max_byte_array_len must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Errors produced while decoding a parcel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParcelError {
    /// The stream ended before a value was complete.
    #[error("unexpected end of parcel at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    /// A length prefix was negative and not the null sentinel.
    #[error("invalid length {len} at offset {offset}")]
    InvalidLength { len: i32, offset: usize },
    /// A length prefix exceeded the configured limit.
    #[error("{kind} length {len} at offset {offset} exceeds limit {max}")]
    LimitExceeded {
        kind: &'static str,
        len: usize,
        max: usize,
        offset: usize,
    },
    /// A string was not valid UTF-16.
    #[error("invalid UTF-16 string at offset {offset}")]
    InvalidString { offset: usize },
    /// A string was not followed by its NUL terminator.
    #[error("missing string terminator at offset {offset}")]
    MissingTerminator { offset: usize },
    /// A present element of an array was encoded as absent.
    #[error("unexpected null element at offset {offset}")]
    UnexpectedNull { offset: usize },
    /// A nested record carried a different class name than expected.
    #[error("unexpected record class: expected {expected}, found {found}")]
    UnexpectedClass {
        expected: &'static str,
        found: String,
    },
    /// Certificate bytes were not a well-formed DER `SEQUENCE`.
    #[error("invalid certificate at offset {offset}: {source}")]
    InvalidCertificate {
        offset: usize,
        source: CertificateError,
    },
    /// Bytes were left over after the top-level record.
    #[error("{0} trailing bytes after parcel contents")]
    TrailingData(usize),
    /// Decoder limits were invalid.
    #[error("invalid parcel limits: {0}")]
    InvalidLimits(&'static str),
}

/// Cursor over an encoded parcel.
#[derive(Debug, Clone)]
pub struct ParcelReader<'a> {
    data: &'a [u8],
    pos: usize,
    limits: ParcelLimits,
}

impl<'a> ParcelReader<'a> {
    /// Create a reader with default limits.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            limits: ParcelLimits::default(),
        }
    }

    /// Create a reader with custom limits.
    pub fn with_limits(data: &'a [u8], limits: ParcelLimits) -> Result<Self, ParcelError> {
        limits.validate()?;
        Ok(Self {
            data,
            pos: 0,
            limits,
        })
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn limits(&self) -> ParcelLimits {
        self.limits
    }

    /// Check that the whole input has been consumed.
    pub fn finish(&self) -> Result<(), ParcelError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ParcelError::TrailingData(n)),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ParcelError> {
        if n > self.remaining() {
            return Err(ParcelError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ParcelError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_i32(&mut self) -> Result<i32, ParcelError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, ParcelError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    /// Read an `i32` as a boolean; any non-zero value is true.
    pub fn read_bool(&mut self) -> Result<bool, ParcelError> {
        Ok(self.read_i32()? != 0)
    }

    /// Read a length prefix. `None` means the value is absent.
    ///
    /// `min_item_size` is the smallest encoded size of one element, used to
    /// reject counts the remaining input cannot possibly hold.
    fn read_len(
        &mut self,
        kind: &'static str,
        max: usize,
        min_item_size: usize,
    ) -> Result<Option<usize>, ParcelError> {
        let offset = self.pos;
        let len = self.read_i32()?;
        if len == NULL_LENGTH {
            return Ok(None);
        }
        let len = usize::try_from(len).map_err(|_| ParcelError::InvalidLength { len, offset })?;
        if len > max {
            return Err(ParcelError::LimitExceeded {
                kind,
                len,
                max,
                offset,
            });
        }
        let needed = len.saturating_mul(min_item_size);
        if needed > self.remaining() {
            return Err(ParcelError::UnexpectedEof {
                offset: self.pos,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(Some(len))
    }

    /// Read a length prefix for a collection whose elements the caller
    /// decodes one by one (maps, certificate chains).
    pub fn read_collection_len(&mut self, min_item_size: usize) -> Result<Option<usize>, ParcelError> {
        self.read_len("array", self.limits.max_array_len, min_item_size)
    }

    /// Read an optional string.
    pub fn read_string(&mut self) -> Result<Option<String>, ParcelError> {
        let Some(units_len) = self.read_len("string", self.limits.max_string_len, 2)? else {
            return Ok(None);
        };

        let start = self.pos;
        let raw_len = (units_len + 1) * 2;
        let raw = self.take(pad4(raw_len))?;

        let units: Vec<u16> = raw[..raw_len]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        if units[units_len] != 0 {
            return Err(ParcelError::MissingTerminator {
                offset: start + units_len * 2,
            });
        }

        String::from_utf16(&units[..units_len])
            .map(Some)
            .map_err(|_| ParcelError::InvalidString { offset: start })
    }

    /// Read a string that must be present.
    fn read_required_string(&mut self) -> Result<String, ParcelError> {
        let offset = self.pos;
        self.read_string()?
            .ok_or(ParcelError::UnexpectedNull { offset })
    }

    /// Read an optional byte array.
    pub fn read_byte_array(&mut self) -> Result<Option<Vec<u8>>, ParcelError> {
        let Some(len) = self.read_len("byte array", self.limits.max_byte_array_len, 1)? else {
            return Ok(None);
        };
        let raw = self.take(pad4(len))?;
        Ok(Some(raw[..len].to_vec()))
    }

    /// Read an optional array of 64-bit integers.
    pub fn read_i64_array(&mut self) -> Result<Option<Vec<i64>>, ParcelError> {
        let Some(len) = self.read_len("array", self.limits.max_array_len, 8)? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.read_i64()?);
        }
        Ok(Some(values))
    }

    /// Read an optional array of strings.
    ///
    /// Elements of a present array must themselves be present.
    pub fn read_string_array(&mut self) -> Result<Option<Vec<String>>, ParcelError> {
        let Some(len) = self.read_len("array", self.limits.max_array_len, 4)? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.read_required_string()?);
        }
        Ok(Some(values))
    }

    /// Read an optional nested record, checking its class name.
    pub fn read_parcelable<T: Parcelable>(&mut self) -> Result<Option<T>, ParcelError> {
        let Some(class_name) = self.read_string()? else {
            return Ok(None);
        };
        if class_name != T::CLASS_NAME {
            log::debug!(
                "Parcel record class mismatch: expected {}, found {}",
                T::CLASS_NAME,
                class_name
            );
            return Err(ParcelError::UnexpectedClass {
                expected: T::CLASS_NAME,
                found: class_name,
            });
        }
        T::create_from_parcel(self).map(Some)
    }
}
