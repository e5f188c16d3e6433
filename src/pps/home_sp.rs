//! HomeSP subtree of the PerProviderSubscription management object.
//!
//! Identifies the home service provider: its FQDN and display name, the
//! SSID/HESSID pairs of its own networks, and the organization identifiers
//! used to decide whether a hotspot belongs to the provider.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::parcel::{Parcel, ParcelError, ParcelReader, Parcelable, NULL_LENGTH};

/// Smallest encoding of one home-network entry: an empty-or-null key
/// prefix (4 bytes) plus the HESSID (8 bytes).
const MIN_NETWORK_ID_ENTRY_SIZE: usize = 12;

/// Home service provider identity.
///
/// Every field is optional. For the collection fields, `None` means "not
/// specified" and is kept distinct from an empty collection through encode
/// and decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSp {
    /// Fully qualified domain name of the provider.
    pub fqdn: Option<String>,
    /// Display name of the provider.
    pub friendly_name: Option<String>,
    /// URL of the provider's icon.
    pub icon_url: Option<String>,
    /// SSID to HESSID pairs of networks considered home networks.
    pub home_network_ids: Option<BTreeMap<String, i64>>,
    /// OIs that must all be advertised by a hotspot for the provider to be
    /// a member of it. Takes precedence over `match_any_ois` when non-empty.
    pub match_all_ois: Option<Vec<i64>>,
    /// OIs of which at least one must be advertised by a hotspot.
    pub match_any_ois: Option<Vec<i64>>,
    /// FQDNs of partner providers that also count as home operators.
    pub other_home_partners: Option<Vec<String>>,
    /// OIs of the roaming consortiums this provider belongs to.
    pub roaming_consortium_ois: Option<Vec<i64>>,
}

impl HomeSp {
    /// Check if this provider is a member of a hotspot advertising the given
    /// roaming consortium OIs.
    ///
    /// A non-empty `match_all_ois` requires every listed OI to be advertised.
    /// Otherwise a non-empty `match_any_ois` requires at least one. With
    /// neither list populated the provider is not a member.
    pub fn is_member_of(&self, advertised_ois: &[i64]) -> bool {
        if let Some(all) = self.match_all_ois.as_deref().filter(|ois| !ois.is_empty()) {
            return all.iter().all(|oi| advertised_ois.contains(oi));
        }
        if let Some(any) = self.match_any_ois.as_deref().filter(|ois| !ois.is_empty()) {
            return any.iter().any(|oi| advertised_ois.contains(oi));
        }
        false
    }

    /// Check if the SSID/HESSID pair is one of the provider's home networks.
    pub fn is_home_network(&self, ssid: &str, hessid: i64) -> bool {
        self.home_network_ids
            .as_ref()
            .and_then(|ids| ids.get(ssid))
            .is_some_and(|id| *id == hessid)
    }

    /// Check if `fqdn` names this provider or one of its home partners.
    ///
    /// Domain names compare case-insensitively.
    pub fn is_home_partner(&self, fqdn: &str) -> bool {
        let own = self
            .fqdn
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(fqdn));
        own || self
            .other_home_partners
            .iter()
            .flatten()
            .any(|partner| partner.eq_ignore_ascii_case(fqdn))
    }
}

impl Parcelable for HomeSp {
    const CLASS_NAME: &'static str = "android.net.wifi.hotspot2.pps.HomeSP";

    fn write_to_parcel(&self, dest: &mut Parcel) {
        dest.write_string(self.fqdn.as_deref());
        dest.write_string(self.friendly_name.as_deref());
        dest.write_string(self.icon_url.as_deref());
        write_home_network_ids(dest, self.home_network_ids.as_ref());
        dest.write_i64_array(self.match_all_ois.as_deref());
        dest.write_i64_array(self.match_any_ois.as_deref());
        dest.write_string_array(self.other_home_partners.as_deref());
        dest.write_i64_array(self.roaming_consortium_ois.as_deref());
    }

    fn create_from_parcel(src: &mut ParcelReader<'_>) -> Result<Self, ParcelError> {
        Ok(Self {
            fqdn: src.read_string()?,
            friendly_name: src.read_string()?,
            icon_url: src.read_string()?,
            home_network_ids: read_home_network_ids(src)?,
            match_all_ois: src.read_i64_array()?,
            match_any_ois: src.read_i64_array()?,
            other_home_partners: src.read_string_array()?,
            roaming_consortium_ois: src.read_i64_array()?,
        })
    }
}

/// Layout: `[count:i32]` then `count` x `[ssid:string][hessid:i64]`, or `-1`
/// if absent.
fn write_home_network_ids(dest: &mut Parcel, ids: Option<&BTreeMap<String, i64>>) {
    let Some(ids) = ids else {
        dest.write_i32(NULL_LENGTH);
        return;
    };
    dest.write_len(ids.len());
    for (ssid, hessid) in ids {
        dest.write_string(Some(ssid));
        dest.write_i64(*hessid);
    }
}

fn read_home_network_ids(
    src: &mut ParcelReader<'_>,
) -> Result<Option<BTreeMap<String, i64>>, ParcelError> {
    let Some(count) = src.read_collection_len(MIN_NETWORK_ID_ENTRY_SIZE)? else {
        return Ok(None);
    };
    let mut ids = BTreeMap::new();
    for _ in 0..count {
        let offset = src.position();
        let ssid = src
            .read_string()?
            .ok_or(ParcelError::UnexpectedNull { offset })?;
        let hessid = src.read_i64()?;
        if ids.insert(ssid, hessid).is_some() {
            log::trace!("Duplicate home network SSID at offset {}, keeping last", offset);
        }
    }
    Ok(Some(ids))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home_network_ids() -> BTreeMap<String, i64> {
        BTreeMap::from([("ssid".to_string(), 0x1234)])
    }

    fn home_sp(home_network_ids: Option<BTreeMap<String, i64>>) -> HomeSp {
        HomeSp {
            fqdn: Some("fqdn".to_string()),
            friendly_name: Some("friendly name".to_string()),
            icon_url: Some("icon.url".to_string()),
            home_network_ids,
            match_all_ois: Some(vec![0x11, 0x22]),
            match_any_ois: Some(vec![0x33, 0x44]),
            other_home_partners: Some(vec!["partner1".to_string(), "partner2".to_string()]),
            roaming_consortium_ois: Some(vec![0x55, 0x66]),
        }
    }

    fn roundtrip(home_sp: &HomeSp) -> HomeSp {
        HomeSp::from_parcel_bytes(&home_sp.to_parcel_bytes()).unwrap()
    }

    // ==================== Serialization Tests ====================

    #[test]
    fn test_roundtrip_default() {
        let original = HomeSp::default();
        assert_eq!(roundtrip(&original), original);
    }

    #[test]
    fn test_roundtrip_with_home_network_ids() {
        let original = home_sp(Some(home_network_ids()));
        let restored = roundtrip(&original);
        assert_eq!(restored, original);
        assert_eq!(restored.fqdn.as_deref(), Some("fqdn"));
        assert_eq!(restored.friendly_name.as_deref(), Some("friendly name"));
        assert_eq!(restored.icon_url.as_deref(), Some("icon.url"));
        assert_eq!(restored.home_network_ids, Some(home_network_ids()));
        assert_eq!(restored.match_all_ois, Some(vec![0x11, 0x22]));
        assert_eq!(restored.match_any_ois, Some(vec![0x33, 0x44]));
        assert_eq!(
            restored.other_home_partners,
            Some(vec!["partner1".to_string(), "partner2".to_string()])
        );
        assert_eq!(restored.roaming_consortium_ois, Some(vec![0x55, 0x66]));
    }

    #[test]
    fn test_roundtrip_without_home_network_ids() {
        let original = home_sp(None);
        let restored = roundtrip(&original);
        assert_eq!(restored, original);
        assert_eq!(restored.home_network_ids, None);
    }

    #[test]
    fn test_empty_home_network_ids_stay_empty() {
        let original = home_sp(Some(BTreeMap::new()));
        let restored = roundtrip(&original);
        assert_eq!(restored.home_network_ids, Some(BTreeMap::new()));
        assert_ne!(restored, home_sp(None));
    }

    #[test]
    fn test_empty_arrays_distinct_from_absent() {
        let original = HomeSp {
            match_all_ois: Some(vec![]),
            other_home_partners: Some(vec![]),
            ..HomeSp::default()
        };
        let restored = roundtrip(&original);
        assert_eq!(restored.match_all_ois, Some(vec![]));
        assert_eq!(restored.match_any_ois, None);
        assert_eq!(restored.other_home_partners, Some(vec![]));
        assert_ne!(restored, HomeSp::default());
    }

    #[test]
    fn test_null_home_network_ids_count() {
        let bytes = home_sp(None).to_parcel_bytes();
        let mut reader = ParcelReader::new(&bytes);
        for _ in 0..3 {
            reader.read_string().unwrap();
        }
        assert_eq!(reader.read_i32().unwrap(), NULL_LENGTH);
    }

    #[test]
    fn test_truncated_stream() {
        let bytes = home_sp(Some(home_network_ids())).to_parcel_bytes();
        for cut in [0, 3, bytes.len() / 2, bytes.len() - 1] {
            assert!(
                HomeSp::from_parcel_bytes(&bytes[..cut]).is_err(),
                "decoding {} of {} bytes should fail",
                cut,
                bytes.len()
            );
        }
    }

    #[test]
    fn test_null_ssid_rejected() {
        let mut parcel = Parcel::new();
        for _ in 0..3 {
            parcel.write_string(None);
        }
        parcel.write_i32(1);
        parcel.write_string(None);
        parcel.write_i64(0x1234);
        assert!(matches!(
            HomeSp::from_parcel_bytes(parcel.as_bytes()),
            Err(ParcelError::UnexpectedNull { .. })
        ));
    }

    // ==================== Equality Tests ====================

    #[test]
    fn test_match_all_ois_equal() {
        let a = HomeSp {
            match_all_ois: Some(vec![0x11, 0x22]),
            ..HomeSp::default()
        };
        let b = HomeSp {
            match_all_ois: Some(vec![0x11, 0x22]),
            ..HomeSp::default()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_match_all_ois_order_sensitive() {
        let a = HomeSp {
            match_all_ois: Some(vec![0x11, 0x22]),
            ..HomeSp::default()
        };
        let b = HomeSp {
            match_all_ois: Some(vec![0x22, 0x11]),
            ..HomeSp::default()
        };
        assert_ne!(a, b);
    }

    #[test]
    fn test_roaming_consortium_difference_detected_when_network_ids_absent_precedence_defect_fixed() {
        let a = HomeSp {
            roaming_consortium_ois: Some(vec![0x55, 0x66]),
            ..home_sp(None)
        };
        let b = HomeSp {
            roaming_consortium_ois: Some(vec![0x77]),
            ..home_sp(None)
        };
        assert_ne!(a, b);
    }

    #[test]
    fn test_fields_after_network_ids_compared_when_present() {
        let a = home_sp(Some(home_network_ids()));
        let b = HomeSp {
            match_any_ois: Some(vec![0x99]),
            ..home_sp(Some(home_network_ids()))
        };
        assert_ne!(a, b);
    }

    // ==================== Matching Tests ====================

    #[test]
    fn test_match_all_takes_precedence() {
        let sp = HomeSp {
            match_all_ois: Some(vec![0x11, 0x22]),
            match_any_ois: Some(vec![0x33]),
            ..HomeSp::default()
        };
        assert!(sp.is_member_of(&[0x11, 0x22, 0x99]));
        assert!(!sp.is_member_of(&[0x11, 0x33]));
    }

    #[test]
    fn test_match_any_when_match_all_empty() {
        let sp = HomeSp {
            match_all_ois: Some(vec![]),
            match_any_ois: Some(vec![0x33, 0x44]),
            ..HomeSp::default()
        };
        assert!(sp.is_member_of(&[0x44]));
        assert!(!sp.is_member_of(&[0x55]));
    }

    #[test]
    fn test_no_oi_lists_not_member() {
        assert!(!HomeSp::default().is_member_of(&[0x11]));
    }

    #[test]
    fn test_is_home_network() {
        let sp = home_sp(Some(home_network_ids()));
        assert!(sp.is_home_network("ssid", 0x1234));
        assert!(!sp.is_home_network("ssid", 0x4321));
        assert!(!sp.is_home_network("other", 0x1234));
        assert!(!home_sp(None).is_home_network("ssid", 0x1234));
    }

    #[test]
    fn test_is_home_partner() {
        let sp = home_sp(None);
        assert!(sp.is_home_partner("FQDN"));
        assert!(sp.is_home_partner("partner2"));
        assert!(!sp.is_home_partner("stranger"));
        assert!(!HomeSp::default().is_home_partner("fqdn"));
    }

    #[test]
    fn test_serialize_camel_case() {
        let json = serde_json::to_value(home_sp(Some(home_network_ids()))).unwrap();
        assert_eq!(json["friendlyName"], "friendly name");
        assert_eq!(json["homeNetworkIds"]["ssid"], 0x1234);
        assert!(json["roamingConsortiumOis"].is_array());
    }
}
