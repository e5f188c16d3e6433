//! Credential subtree of the PerProviderSubscription management object.
//!
//! A [`Credential`] carries the realm and validity window of the
//! subscription, up to three kinds of authentication material (username and
//! password, client certificate, SIM), and the certificates and key used for
//! EAP-TLS style methods. The three kinds are not mutually exclusive here;
//! choosing one is up to the authentication layer.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::material::{
    read_certificate, read_certificates, read_private_key, write_certificate,
    write_certificates, write_private_key, PrivateKey, X509Certificate,
};
use crate::parcel::{Parcel, ParcelError, ParcelReader, Parcelable};

/// No EAP method.
pub const EAP_NONE: i32 = -1;
/// EAP-TLS.
pub const EAP_TLS: i32 = 13;
/// EAP-SIM.
pub const EAP_SIM: i32 = 18;
/// EAP-TTLS.
pub const EAP_TTLS: i32 = 21;
/// EAP-AKA.
pub const EAP_AKA: i32 = 23;
/// EAP-AKA'.
pub const EAP_AKA_PRIME: i32 = 50;

/// Timestamp value meaning "not set".
pub const UNSET_TIMESTAMP: i64 = -1;

/// Vendor ID value meaning "not an expanded EAP method".
pub const EAP_VENDOR_ID_UNSET: i32 = -1;

/// Vendor type value meaning "not an expanded EAP method".
pub const EAP_VENDOR_TYPE_UNSET: i32 = -1;

/// Username/password credential (`Credential/UsernamePassword`).
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredential {
    /// Username, at most 63 octets by convention.
    pub username: Option<String>,
    /// Base64-encoded password, at most 255 octets by convention.
    #[serde(serialize_with = "serialize_redacted")]
    pub password: Option<String>,
    pub machine_managed: bool,
    /// Application used to generate the password.
    pub soft_token_app: Option<String>,
    /// Whether the credential may be used on other devices too.
    pub able_to_share: bool,
    pub eap_type: i32,
    pub eap_vendor_id: i32,
    pub eap_vendor_type: i32,
    pub inner_eap_type: i32,
    pub inner_eap_vendor_id: i32,
    pub inner_eap_vendor_type: i32,
    /// Non-EAP inner method: "PAP", "CHAP", "MS-CHAP" or "MS-CHAP-V2".
    pub non_eap_inner_method: Option<String>,
}

impl Default for UserCredential {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            machine_managed: false,
            soft_token_app: None,
            able_to_share: false,
            eap_type: EAP_NONE,
            eap_vendor_id: EAP_VENDOR_ID_UNSET,
            eap_vendor_type: EAP_VENDOR_TYPE_UNSET,
            inner_eap_type: EAP_NONE,
            inner_eap_vendor_id: EAP_VENDOR_ID_UNSET,
            inner_eap_vendor_type: EAP_VENDOR_TYPE_UNSET,
            non_eap_inner_method: None,
        }
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("machine_managed", &self.machine_managed)
            .field("soft_token_app", &self.soft_token_app)
            .field("able_to_share", &self.able_to_share)
            .field("eap_type", &self.eap_type)
            .field("eap_vendor_id", &self.eap_vendor_id)
            .field("eap_vendor_type", &self.eap_vendor_type)
            .field("inner_eap_type", &self.inner_eap_type)
            .field("inner_eap_vendor_id", &self.inner_eap_vendor_id)
            .field("inner_eap_vendor_type", &self.inner_eap_vendor_type)
            .field("non_eap_inner_method", &self.non_eap_inner_method)
            .finish()
    }
}

impl Parcelable for UserCredential {
    const CLASS_NAME: &'static str = "android.net.wifi.hotspot2.pps.Credential$UserCredential";

    fn write_to_parcel(&self, dest: &mut Parcel) {
        dest.write_string(self.username.as_deref());
        dest.write_string(self.password.as_deref());
        dest.write_bool(self.machine_managed);
        dest.write_string(self.soft_token_app.as_deref());
        dest.write_bool(self.able_to_share);
        dest.write_i32(self.eap_type);
        dest.write_i32(self.eap_vendor_id);
        dest.write_i32(self.eap_vendor_type);
        dest.write_i32(self.inner_eap_type);
        dest.write_i32(self.inner_eap_vendor_id);
        dest.write_i32(self.inner_eap_vendor_type);
        dest.write_string(self.non_eap_inner_method.as_deref());
    }

    fn create_from_parcel(src: &mut ParcelReader<'_>) -> Result<Self, ParcelError> {
        Ok(Self {
            username: src.read_string()?,
            password: src.read_string()?,
            machine_managed: src.read_bool()?,
            soft_token_app: src.read_string()?,
            able_to_share: src.read_bool()?,
            eap_type: src.read_i32()?,
            eap_vendor_id: src.read_i32()?,
            eap_vendor_type: src.read_i32()?,
            inner_eap_type: src.read_i32()?,
            inner_eap_vendor_id: src.read_i32()?,
            inner_eap_vendor_type: src.read_i32()?,
            non_eap_inner_method: src.read_string()?,
        })
    }
}

/// Client certificate credential (`Credential/DigitalCertificate`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateCredential {
    /// Certificate type: "802.1ar" or "x509v3".
    pub cert_type: Option<String>,
    /// SHA-256 fingerprint of the client certificate.
    #[serde(serialize_with = "serialize_hex")]
    pub cert_sha256_fingerprint: Option<Vec<u8>>,
}

impl CertificateCredential {
    /// Check if `cert` has the fingerprint recorded in this credential.
    pub fn matches_certificate(&self, cert: &X509Certificate) -> bool {
        self.cert_sha256_fingerprint
            .as_deref()
            .is_some_and(|fp| fp == cert.sha256_fingerprint().as_slice())
    }
}

impl Parcelable for CertificateCredential {
    const CLASS_NAME: &'static str =
        "android.net.wifi.hotspot2.pps.Credential$CertificateCredential";

    fn write_to_parcel(&self, dest: &mut Parcel) {
        dest.write_string(self.cert_type.as_deref());
        dest.write_byte_array(self.cert_sha256_fingerprint.as_deref());
    }

    fn create_from_parcel(src: &mut ParcelReader<'_>) -> Result<Self, ParcelError> {
        Ok(Self {
            cert_type: src.read_string()?,
            cert_sha256_fingerprint: src.read_byte_array()?,
        })
    }
}

/// SIM credential (`Credential/SIM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimCredential {
    /// International Mobile Subscriber Identity.
    pub imsi: Option<String>,
    /// EAP method used with the SIM, normally EAP-SIM, EAP-AKA or EAP-AKA'.
    pub eap_type: i32,
}

impl Default for SimCredential {
    fn default() -> Self {
        Self {
            imsi: None,
            eap_type: EAP_NONE,
        }
    }
}

impl Parcelable for SimCredential {
    const CLASS_NAME: &'static str = "android.net.wifi.hotspot2.pps.Credential$SimCredential";

    fn write_to_parcel(&self, dest: &mut Parcel) {
        dest.write_string(self.imsi.as_deref());
        dest.write_i32(self.eap_type);
    }

    fn create_from_parcel(src: &mut ParcelReader<'_>) -> Result<Self, ParcelError> {
        Ok(Self {
            imsi: src.read_string()?,
            eap_type: src.read_i32()?,
        })
    }
}

/// Authentication material for the home service provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Creation time in milliseconds since the Unix epoch, or [`UNSET_TIMESTAMP`].
    pub creation_time_in_ms: i64,
    /// Expiration time in milliseconds since the Unix epoch, or [`UNSET_TIMESTAMP`].
    pub expiration_time_in_ms: i64,
    /// Realm matched against the hotspot's NAI realm list.
    pub realm: Option<String>,
    /// Whether the AAA server certificate must be checked during EAP.
    #[serde(rename = "checkAAAServerCertStatus")]
    pub check_aaa_server_cert_status: bool,
    pub user_credential: Option<UserCredential>,
    pub cert_credential: Option<CertificateCredential>,
    pub sim_credential: Option<SimCredential>,
    /// CA certificate used to verify the AAA server.
    pub ca_certificate: Option<X509Certificate>,
    pub client_certificate_chain: Option<Vec<X509Certificate>>,
    pub client_private_key: Option<PrivateKey>,
}

impl Default for Credential {
    fn default() -> Self {
        Self {
            creation_time_in_ms: UNSET_TIMESTAMP,
            expiration_time_in_ms: UNSET_TIMESTAMP,
            realm: None,
            check_aaa_server_cert_status: false,
            user_credential: None,
            cert_credential: None,
            sim_credential: None,
            ca_certificate: None,
            client_certificate_chain: None,
            client_private_key: None,
        }
    }
}

impl Credential {
    /// Check if the credential has expired at `now_ms` (milliseconds since
    /// the Unix epoch). A credential without an expiration never expires.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expiration_time_in_ms != UNSET_TIMESTAMP && now_ms >= self.expiration_time_in_ms
    }
}

impl Parcelable for Credential {
    const CLASS_NAME: &'static str = "android.net.wifi.hotspot2.pps.Credential";

    fn write_to_parcel(&self, dest: &mut Parcel) {
        dest.write_i64(self.creation_time_in_ms);
        dest.write_i64(self.expiration_time_in_ms);
        dest.write_string(self.realm.as_deref());
        dest.write_bool(self.check_aaa_server_cert_status);
        dest.write_parcelable(self.user_credential.as_ref());
        dest.write_parcelable(self.cert_credential.as_ref());
        dest.write_parcelable(self.sim_credential.as_ref());
        write_certificate(dest, self.ca_certificate.as_ref());
        write_certificates(dest, self.client_certificate_chain.as_deref());
        write_private_key(dest, self.client_private_key.as_ref());
    }

    fn create_from_parcel(src: &mut ParcelReader<'_>) -> Result<Self, ParcelError> {
        Ok(Self {
            creation_time_in_ms: src.read_i64()?,
            expiration_time_in_ms: src.read_i64()?,
            realm: src.read_string()?,
            check_aaa_server_cert_status: src.read_bool()?,
            user_credential: src.read_parcelable()?,
            cert_credential: src.read_parcelable()?,
            sim_credential: src.read_parcelable()?,
            ca_certificate: read_certificate(src)?,
            client_certificate_chain: read_certificates(src)?,
            client_private_key: read_private_key(src)?,
        })
    }
}

fn serialize_redacted<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    value.as_ref().map(|_| "****").serialize(serializer)
}

fn serialize_hex<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    value.as_deref().map(hex::encode).serialize(serializer)
}
