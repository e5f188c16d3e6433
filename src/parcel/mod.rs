//! Parcel encoding.
//!
//! A parcel is a flat, fixed-order field stream: 32/64-bit little-endian
//! integers, length-prefixed UTF-16 strings and byte arrays, all aligned to
//! 4 bytes. Absent strings, arrays and nested records are encoded with a
//! `-1` length, which keeps "absent" distinct from "empty" on the wire.
//!
//! # Components
//!
//! - [`Parcel`] - append-only encoder
//! - [`ParcelReader`] - bounds-checked decoder
//! - [`ParcelLimits`] - allocation limits applied while decoding
//! - [`Parcelable`] - encode/decode capability implemented per record type
//!
//! # Example
//!
//! ```
//! use passpoint_config::parcel::{Parcel, ParcelReader};
//!
//! let mut parcel = Parcel::new();
//! parcel.write_string(Some("fqdn"));
//! parcel.write_i64_array(None);
//!
//! let mut reader = ParcelReader::new(parcel.as_bytes());
//! assert_eq!(reader.read_string().unwrap().as_deref(), Some("fqdn"));
//! assert_eq!(reader.read_i64_array().unwrap(), None);
//! assert!(reader.finish().is_ok());
//! ```

mod reader;
mod writer;

pub use reader::{
    ParcelError, ParcelLimits, ParcelReader, DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_BYTE_ARRAY_LEN,
    DEFAULT_MAX_STRING_LEN,
};
pub use writer::{Parcel, NULL_LENGTH};

/// A record that can be written to and read back from a parcel.
///
/// Implementations write their fields in a fixed order and read them back in
/// the same order. When nested inside another record the body is preceded by
/// [`Parcelable::CLASS_NAME`] (see [`Parcel::write_parcelable`]).
pub trait Parcelable: Sized {
    /// Class name written ahead of a nested record.
    const CLASS_NAME: &'static str;

    /// Append this record's fields to `dest`.
    fn write_to_parcel(&self, dest: &mut Parcel);

    /// Read a record's fields from `src`.
    fn create_from_parcel(src: &mut ParcelReader<'_>) -> Result<Self, ParcelError>;

    /// Encode this record as a standalone parcel body.
    fn to_parcel_bytes(&self) -> Vec<u8> {
        let mut parcel = Parcel::new();
        self.write_to_parcel(&mut parcel);
        parcel.into_bytes()
    }

    /// Decode a standalone parcel body, rejecting trailing bytes.
    fn from_parcel_bytes(bytes: &[u8]) -> Result<Self, ParcelError> {
        Self::from_parcel_bytes_with_limits(bytes, ParcelLimits::default())
    }

    /// Decode a standalone parcel body under custom limits.
    fn from_parcel_bytes_with_limits(bytes: &[u8], limits: ParcelLimits) -> Result<Self, ParcelError> {
        let mut reader = ParcelReader::with_limits(bytes, limits)?;
        let record = Self::create_from_parcel(&mut reader).map_err(|e| {
            log::debug!("Failed to decode {}: {}", Self::CLASS_NAME, e);
            e
        })?;
        reader.finish()?;
        Ok(record)
    }
}
