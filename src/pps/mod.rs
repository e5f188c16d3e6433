//! PerProviderSubscription (PPS) management object subtrees.
//!
//! Only the HomeSP and Credential subtrees are modelled.
//!
//! # Components
//!
//! - [`home_sp`] - home service provider identity and OI matching
//! - [`credential`] - authentication material and EAP method constants

mod credential;
mod home_sp;

pub use credential::{
    CertificateCredential, Credential, SimCredential, UserCredential, EAP_AKA, EAP_AKA_PRIME,
    EAP_NONE, EAP_SIM, EAP_TLS, EAP_TTLS, EAP_VENDOR_ID_UNSET, EAP_VENDOR_TYPE_UNSET,
    UNSET_TIMESTAMP,
};
pub use home_sp::HomeSp;
