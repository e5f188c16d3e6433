//! Hotspot 2.0 (Passpoint) provider configuration model.
//!
//! This library contains the PerProviderSubscription data model (home
//! service provider identity and credential), its parcel encoding, and the
//! OMA-DM XML tree it is provisioned from. Everything here is plain data and
//! can be tested on the host machine.

pub mod material;
pub mod omadm;
pub mod parcel;
pub mod passpoint;
pub mod pps;

// Re-export commonly used items
pub use material::{CertificateError, PrivateKey, X509Certificate};
pub use parcel::{Parcel, ParcelError, ParcelLimits, ParcelReader, Parcelable};
pub use passpoint::PasspointConfiguration;
pub use pps::{CertificateCredential, Credential, HomeSp, SimCredential, UserCredential};
