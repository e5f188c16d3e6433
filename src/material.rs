//! Certificate and private-key material attached to a credential.
//!
//! Certificates and keys are carried as opaque bytes. A certificate is only
//! checked to be a single well-formed DER `SEQUENCE` when it is built or
//! decoded; its contents are never parsed. Every [`X509Certificate`] in the
//! model therefore has a canonical encoding, and equality on it is total.
//!
//! Wire layout:
//!
//! ```text
//! certificate  = byte_array(der)                  ; -1 if absent
//! certificates = [count:i32] certificate*         ; -1 if absent
//! private_key  = string(algorithm) byte_array(encoded)
//!                                                  ; algorithm -1 if absent
//! ```

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::parcel::{Parcel, ParcelError, ParcelReader, NULL_LENGTH};

/// DER tag for a constructed `SEQUENCE`.
const DER_SEQUENCE_TAG: u8 = 0x30;

/// Largest number of length octets accepted in a DER long-form length.
const MAX_LENGTH_OCTETS: usize = 4;

/// Size of a SHA-256 fingerprint in bytes.
pub const SHA256_FINGERPRINT_LEN: usize = 32;

/// Errors reported when certificate bytes are not a canonical DER encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertificateError {
    #[error("certificate encoding is empty")]
    Empty,
    #[error("certificate does not start with a DER SEQUENCE (tag {0:#04x})")]
    NotASequence(u8),
    #[error("certificate DER header is truncated")]
    TruncatedHeader,
    #[error("certificate uses an indefinite or oversized DER length")]
    UnsupportedLength,
    #[error("certificate DER length is not minimally encoded")]
    NonCanonicalLength,
    #[error("certificate DER length {declared} does not match {actual} bytes of content")]
    LengthMismatch { declared: usize, actual: usize },
}

/// An X.509 certificate in DER form.
#[derive(Clone)]
pub struct X509Certificate {
    der: Vec<u8>,
}

impl X509Certificate {
    /// Wrap DER bytes after checking that they are exactly one DER
    /// `SEQUENCE` with a minimally encoded definite length.
    ///
    /// # Errors
    ///
    /// Returns the first encoding problem found in `der`.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, CertificateError> {
        let der = der.into();
        check_der_sequence(&der)?;
        Ok(Self { der })
    }

    /// Raw bytes exactly as stored.
    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    /// Canonical DER encoding of the certificate.
    pub fn encoded(&self) -> &[u8] {
        &self.der
    }

    /// SHA-256 digest of the stored bytes.
    pub fn sha256_fingerprint(&self) -> [u8; SHA256_FINGERPRINT_LEN] {
        Sha256::digest(&self.der).into()
    }
}

/// Check that `der` is one DER `SEQUENCE` whose declared length covers the
/// rest of the input exactly.
fn check_der_sequence(der: &[u8]) -> Result<(), CertificateError> {
    let (&tag, rest) = der.split_first().ok_or(CertificateError::Empty)?;
    if tag != DER_SEQUENCE_TAG {
        return Err(CertificateError::NotASequence(tag));
    }

    let (&first, rest) = rest.split_first().ok_or(CertificateError::TruncatedHeader)?;
    let (declared, content) = if first < 0x80 {
        (usize::from(first), rest)
    } else {
        let octets = usize::from(first & 0x7f);
        if octets == 0 || octets > MAX_LENGTH_OCTETS {
            return Err(CertificateError::UnsupportedLength);
        }
        if rest.len() < octets {
            return Err(CertificateError::TruncatedHeader);
        }
        let (len_bytes, content) = rest.split_at(octets);
        if len_bytes[0] == 0 {
            return Err(CertificateError::NonCanonicalLength);
        }
        let declared = len_bytes
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
        if declared < 0x80 {
            return Err(CertificateError::NonCanonicalLength);
        }
        (declared, content)
    };

    if declared != content.len() {
        return Err(CertificateError::LengthMismatch {
            declared,
            actual: content.len(),
        });
    }
    Ok(())
}

impl PartialEq for X509Certificate {
    /// Certificates are equal when their canonical encodings are equal.
    fn eq(&self, other: &Self) -> bool {
        self.encoded() == other.encoded()
    }
}

impl Eq for X509Certificate {}

impl fmt::Debug for X509Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X509Certificate")
            .field("len", &self.der.len())
            .field("sha256", &hex::encode(self.sha256_fingerprint()))
            .finish()
    }
}

impl Serialize for X509Certificate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("X509Certificate", 2)?;
        state.serialize_field("length", &self.der.len())?;
        state.serialize_field("sha256", &hex::encode(self.sha256_fingerprint()))?;
        state.end()
    }
}

/// A client private key: algorithm name plus encoded key bytes.
///
/// Key bytes are zeroed when the value is dropped and never appear in
/// `Debug` or serialized output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    algorithm: String,
    encoded: Vec<u8>,
}

impl PrivateKey {
    pub fn new(algorithm: impl Into<String>, encoded: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm: algorithm.into(),
            encoded: encoded.into(),
        }
    }

    /// Key algorithm name, e.g. `"RSA"` or `"EC"`.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Encoded key bytes.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.encoded == other.encoded
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm)
            .field("encoded", &format_args!("<{} bytes>", self.encoded.len()))
            .finish()
    }
}

impl Serialize for PrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PrivateKey", 1)?;
        state.serialize_field("algorithm", &self.algorithm)?;
        state.end()
    }
}

/// Write an optional certificate.
pub fn write_certificate(dest: &mut Parcel, cert: Option<&X509Certificate>) {
    dest.write_byte_array(cert.map(X509Certificate::as_bytes));
}

/// Read an optional certificate. Present bytes must be a well-formed DER
/// `SEQUENCE`.
pub fn read_certificate(src: &mut ParcelReader<'_>) -> Result<Option<X509Certificate>, ParcelError> {
    let offset = src.position();
    let Some(der) = src.read_byte_array()? else {
        return Ok(None);
    };
    X509Certificate::from_der(der)
        .map(Some)
        .map_err(|source| ParcelError::InvalidCertificate { offset, source })
}

/// Write an optional certificate chain.
pub fn write_certificates(dest: &mut Parcel, certs: Option<&[X509Certificate]>) {
    let Some(certs) = certs else {
        dest.write_i32(NULL_LENGTH);
        return;
    };
    dest.write_len(certs.len());
    for cert in certs {
        write_certificate(dest, Some(cert));
    }
}

/// Read an optional certificate chain. Every certificate in a present chain
/// must itself be present.
pub fn read_certificates(
    src: &mut ParcelReader<'_>,
) -> Result<Option<Vec<X509Certificate>>, ParcelError> {
    let Some(count) = src.read_collection_len(4)? else {
        return Ok(None);
    };
    let mut chain = Vec::with_capacity(count);
    for _ in 0..count {
        let offset = src.position();
        let cert = read_certificate(src)?.ok_or(ParcelError::UnexpectedNull { offset })?;
        chain.push(cert);
    }
    Ok(Some(chain))
}

/// Write an optional private key.
pub fn write_private_key(dest: &mut Parcel, key: Option<&PrivateKey>) {
    let Some(key) = key else {
        dest.write_string(None);
        return;
    };
    dest.write_string(Some(key.algorithm()));
    dest.write_byte_array(Some(key.encoded()));
}

/// Read an optional private key.
pub fn read_private_key(src: &mut ParcelReader<'_>) -> Result<Option<PrivateKey>, ParcelError> {
    let Some(algorithm) = src.read_string()? else {
        return Ok(None);
    };
    let offset = src.position();
    let encoded = src
        .read_byte_array()?
        .ok_or(ParcelError::UnexpectedNull { offset })?;
    Ok(Some(PrivateKey::new(algorithm, encoded)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal DER `SEQUENCE` wrapping `content`.
    pub(crate) fn der_sequence(content: &[u8]) -> Vec<u8> {
        let mut der = vec![DER_SEQUENCE_TAG];
        if content.len() < 0x80 {
            der.push(content.len() as u8);
        } else if content.len() <= 0xff {
            der.extend_from_slice(&[0x81, content.len() as u8]);
        } else {
            der.push(0x82);
            der.extend_from_slice(&(content.len() as u16).to_be_bytes());
        }
        der.extend_from_slice(content);
        der
    }

    /// Certificate wrapping `content` in a DER `SEQUENCE`.
    pub(crate) fn test_cert(content: &[u8]) -> X509Certificate {
        X509Certificate::from_der(der_sequence(content)).unwrap()
    }

    // ==================== Certificate Tests ====================

    #[test]
    fn test_encoded_short_form() {
        let cert = test_cert(&[0x02, 0x01, 0x05]);
        assert_eq!(cert.encoded(), &[0x30, 0x03, 0x02, 0x01, 0x05]);
    }

    #[test]
    fn test_encoded_long_form() {
        let cert = test_cert(&[0xaa; 300]);
        assert_eq!(cert.encoded().len(), 4 + 300);

        let cert = test_cert(&[0xbb; 200]);
        assert_eq!(cert.encoded().len(), 3 + 200);
    }

    #[test]
    fn test_from_der_errors() {
        assert_eq!(
            X509Certificate::from_der(vec![]).err(),
            Some(CertificateError::Empty)
        );
        assert_eq!(
            X509Certificate::from_der(vec![0x31, 0x00]).err(),
            Some(CertificateError::NotASequence(0x31))
        );
        assert_eq!(
            X509Certificate::from_der(vec![0x30]).err(),
            Some(CertificateError::TruncatedHeader)
        );
        assert_eq!(
            X509Certificate::from_der(vec![0x30, 0x80, 0x00, 0x00]).err(),
            Some(CertificateError::UnsupportedLength)
        );
        assert_eq!(
            X509Certificate::from_der(vec![0x30, 0x81, 0x05, 1, 2, 3, 4, 5]).err(),
            Some(CertificateError::NonCanonicalLength)
        );
        assert_eq!(
            X509Certificate::from_der(vec![0x30, 0x05, 0x01]).err(),
            Some(CertificateError::LengthMismatch {
                declared: 5,
                actual: 1
            })
        );
        assert_eq!(
            X509Certificate::from_der(b"opaque-ca".to_vec()).err(),
            Some(CertificateError::NotASequence(b'o'))
        );
    }

    #[test]
    fn test_certificate_equality() {
        let a = test_cert(b"cert-a");
        let b = test_cert(b"cert-b");
        assert_eq!(a, test_cert(b"cert-a"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint() {
        let cert = test_cert(b"");
        assert_eq!(cert.sha256_fingerprint().len(), SHA256_FINGERPRINT_LEN);
        assert_eq!(
            cert.sha256_fingerprint(),
            <[u8; SHA256_FINGERPRINT_LEN]>::from(Sha256::digest([0x30, 0x00]))
        );
        assert_ne!(cert.sha256_fingerprint(), test_cert(b"x").sha256_fingerprint());
    }

    #[test]
    fn test_certificate_serialize_hex_fingerprint() {
        let cert = test_cert(b"ca");
        let json = serde_json::to_value(&cert).unwrap();
        assert_eq!(json["length"], 4);
        assert_eq!(json["sha256"], hex::encode(cert.sha256_fingerprint()));
        assert_eq!(json["sha256"].as_str().map(str::len), Some(64));
    }

    #[test]
    fn test_certificate_debug_hides_bytes() {
        let cert = test_cert(b"secret-ish");
        let debug_str = format!("{:?}", cert);
        assert!(debug_str.contains("len"));
        assert!(!debug_str.contains("secret-ish"));
    }

    // ==================== Private Key Tests ====================

    #[test]
    fn test_private_key_equality() {
        let key = PrivateKey::new("RSA", vec![1, 2, 3]);
        assert_eq!(key, PrivateKey::new("RSA", vec![1, 2, 3]));
        assert_ne!(key, PrivateKey::new("EC", vec![1, 2, 3]));
        assert_ne!(key, PrivateKey::new("RSA", vec![1, 2, 4]));
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let key = PrivateKey::new("EC", vec![0x42; 16]);
        let debug_str = format!("{:?}", key);
        assert!(debug_str.contains("EC"));
        assert!(debug_str.contains("<16 bytes>"));
        assert!(!debug_str.contains("66"));
    }

    #[test]
    fn test_private_key_serialize_algorithm_only() {
        let key = PrivateKey::new("RSA", vec![7; 8]);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"algorithm":"RSA"}"#);
    }

    // ==================== Codec Tests ====================

    #[test]
    fn test_certificate_chain_roundtrip() {
        let chain = vec![
            test_cert(b"leaf"),
            test_cert(b"intermediate"),
        ];
        let ca = test_cert(b"root");

        let mut parcel = Parcel::new();
        write_certificate(&mut parcel, Some(&ca));
        write_certificate(&mut parcel, None);
        write_certificates(&mut parcel, Some(&chain));
        write_certificates(&mut parcel, None);
        write_certificates(&mut parcel, Some(&[]));

        let mut reader = ParcelReader::new(parcel.as_bytes());
        assert_eq!(read_certificate(&mut reader).unwrap(), Some(ca));
        assert_eq!(read_certificate(&mut reader).unwrap(), None);
        assert_eq!(read_certificates(&mut reader).unwrap(), Some(chain));
        assert_eq!(read_certificates(&mut reader).unwrap(), None);
        assert_eq!(read_certificates(&mut reader).unwrap(), Some(vec![]));
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_certificate_chain_null_entry() {
        let mut parcel = Parcel::new();
        parcel.write_i32(1);
        parcel.write_byte_array(None);
        let mut reader = ParcelReader::new(parcel.as_bytes());
        assert_eq!(
            read_certificates(&mut reader),
            Err(ParcelError::UnexpectedNull { offset: 4 })
        );
    }

    #[test]
    fn test_malformed_certificate_rejected_on_decode() {
        let mut parcel = Parcel::new();
        parcel.write_i32(0);
        parcel.write_byte_array(Some(b"opaque-ca"));
        let mut reader = ParcelReader::new(parcel.as_bytes());
        assert_eq!(reader.read_i32().unwrap(), 0);
        assert_eq!(
            read_certificate(&mut reader),
            Err(ParcelError::InvalidCertificate {
                offset: 4,
                source: CertificateError::NotASequence(b'o'),
            })
        );
    }

    #[test]
    fn test_malformed_certificate_in_chain_rejected() {
        let mut parcel = Parcel::new();
        parcel.write_i32(2);
        write_certificate(&mut parcel, Some(&test_cert(b"leaf")));
        parcel.write_byte_array(Some(&[0x30, 0x05, 0x01]));
        let mut reader = ParcelReader::new(parcel.as_bytes());
        assert!(matches!(
            read_certificates(&mut reader),
            Err(ParcelError::InvalidCertificate {
                source: CertificateError::LengthMismatch { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_private_key_roundtrip() {
        let key = PrivateKey::new("RSA", vec![0x30, 0x82, 0x01]);
        let mut parcel = Parcel::new();
        write_private_key(&mut parcel, Some(&key));
        write_private_key(&mut parcel, None);

        let mut reader = ParcelReader::new(parcel.as_bytes());
        assert_eq!(read_private_key(&mut reader).unwrap(), Some(key));
        assert_eq!(read_private_key(&mut reader).unwrap(), None);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_private_key_missing_bytes() {
        let mut parcel = Parcel::new();
        parcel.write_string(Some("RSA"));
        parcel.write_byte_array(None);
        let mut reader = ParcelReader::new(parcel.as_bytes());
        assert!(matches!(
            read_private_key(&mut reader),
            Err(ParcelError::UnexpectedNull { .. })
        ));
    }
}
