//! Station identifier type.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of characters in a station identifier.
pub const STATION_ID_LEN: usize = 6;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id {input:?}: {reason}")]
pub struct InvalidStationId {
    input: String,
    reason: &'static str,
}

/// A valid 6-character meteor camera station identifier.
///
/// Station ids are the directory names the camera network uses on its
/// data server, e.g. `HR0001` or `US000A`: exactly six ASCII letters or
/// digits. The id is kept exactly as written, since it doubles as a path
/// on a case-sensitive server.
///
/// # Examples
///
/// ```
/// use meteor_map::domain::StationId;
///
/// let id = StationId::parse("HR0001").unwrap();
/// assert_eq!(id.as_str(), "HR0001");
///
/// // Case is preserved
/// assert_ne!(StationId::parse("hr0001").unwrap(), id);
///
/// assert!(StationId::parse("HR001").is_err());
/// assert!(StationId::parse("HR-001").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId([u8; STATION_ID_LEN]);

impl StationId {
    /// Parse a station id from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let bytes = s.as_bytes();

        if bytes.len() != STATION_ID_LEN {
            return Err(InvalidStationId {
                input: s.to_string(),
                reason: "must be exactly 6 characters",
            });
        }

        let mut id = [0u8; STATION_ID_LEN];
        for (slot, &b) in id.iter_mut().zip(bytes) {
            if !b.is_ascii_alphanumeric() {
                return Err(InvalidStationId {
                    input: s.to_string(),
                    reason: "must be ASCII letters or digits",
                });
            }
            *slot = b;
        }

        Ok(StationId(id))
    }

    /// Returns the station id as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII alphanumerics are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.as_str())
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        StationId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse a comma-joined id list such as `"HR0001,HR0002"`.
///
/// Whitespace around each id is ignored and empty segments are skipped.
pub fn parse_id_list(s: &str) -> Result<Vec<StationId>, InvalidStationId> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(StationId::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(StationId::parse("HR0001").is_ok());
        assert!(StationId::parse("US000A").is_ok());
        assert!(StationId::parse("AB0001").is_ok());
        assert!(StationId::parse("000000").is_ok());
    }

    #[test]
    fn case_is_preserved() {
        let id = StationId::parse("nl000c").unwrap();
        assert_eq!(id.as_str(), "nl000c");
        assert_ne!(id, StationId::parse("NL000C").unwrap());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse("HR001").is_err());
        assert!(StationId::parse("HR00001").is_err());
    }

    #[test]
    fn reject_punctuation() {
        assert!(StationId::parse("HR-001").is_err());
        assert!(StationId::parse("HR 001").is_err());
        assert!(StationId::parse(".confi").is_err());
        assert!(StationId::parse("HRÖ01").is_err());
    }

    #[test]
    fn error_mentions_input() {
        let err = StationId::parse("bad").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid station id \"bad\": must be exactly 6 characters"
        );
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = StationId::parse("AB0001").unwrap();
        let b = StationId::parse("AB0002").unwrap();
        let c = StationId::parse("BA0000").unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn id_list_skips_blanks() {
        let ids = parse_id_list("HR0001, HR0002,,HR0003").unwrap();
        assert_eq!(ids.len(), 3);
        let strs: Vec<&str> = ids.iter().map(StationId::as_str).collect();
        assert_eq!(strs, vec!["HR0001", "HR0002", "HR0003"]);
    }

    #[test]
    fn id_list_rejects_bad_member() {
        assert!(parse_id_list("HR0001,oops").is_err());
    }

    #[test]
    fn serde_as_string() {
        let id = StationId::parse("HR0001").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"HR0001\"");
        let back: StationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<StationId>("\"HR01\"").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any six ASCII alphanumerics parse and print back unchanged
        #[test]
        fn roundtrip(s in "[A-Za-z0-9]{6}") {
            let id = StationId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Wrong-length strings are always rejected
        #[test]
        fn wrong_length_rejected(s in "[A-Z0-9]{0,5}|[A-Z0-9]{7,12}") {
            prop_assert!(StationId::parse(&s).is_err());
        }

        /// Splitting a comma-joined list yields every id in order
        #[test]
        fn id_list_lossless(ids in prop::collection::vec("[A-Z0-9]{6}", 1..8)) {
            let parsed: Vec<StationId> = ids.iter().map(|s| StationId::parse(s).unwrap()).collect();
            prop_assert_eq!(parse_id_list(&ids.join(",")).unwrap(), parsed);
        }
    }
}
