//! Passpoint configuration root.
//!
//! # Example
//!
//! ```
//! use passpoint_config::parcel::Parcelable;
//! use passpoint_config::pps::HomeSp;
//! use passpoint_config::PasspointConfiguration;
//!
//! let config = PasspointConfiguration {
//!     home_sp: Some(HomeSp {
//!         fqdn: Some("example.com".to_string()),
//!         ..HomeSp::default()
//!     }),
//!     credential: None,
//! };
//!
//! let bytes = config.to_parcel_bytes();
//! let restored = PasspointConfiguration::from_parcel_bytes(&bytes).unwrap();
//! assert_eq!(restored, config);
//! ```

use serde::Serialize;

use crate::parcel::{Parcel, ParcelError, ParcelReader, Parcelable};
use crate::pps::{Credential, HomeSp};

/// A Hotspot 2.0 provider profile: home network identity plus credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasspointConfiguration {
    pub home_sp: Option<HomeSp>,
    pub credential: Option<Credential>,
}

impl Parcelable for PasspointConfiguration {
    const CLASS_NAME: &'static str = "android.net.wifi.hotspot2.PasspointConfiguration";

    fn write_to_parcel(&self, dest: &mut Parcel) {
        dest.write_parcelable(self.home_sp.as_ref());
        dest.write_parcelable(self.credential.as_ref());
    }

    fn create_from_parcel(src: &mut ParcelReader<'_>) -> Result<Self, ParcelError> {
        Ok(Self {
            home_sp: src.read_parcelable()?,
            credential: src.read_parcelable()?,
        })
    }
}
