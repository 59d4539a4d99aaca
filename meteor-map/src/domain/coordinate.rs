//! Geographic coordinate types.
//!
//! Exact coordinates are kept as the decimal strings read from station
//! configuration files, so equality is textual: two stations are at the
//! same site only if their configs carry the same digits. Approximate
//! coordinates are plain floats rounded for publication.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Error returned when a coordinate string is not a usable angle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidCoordinate {
    /// Value could not be parsed as a decimal number
    #[error("{axis} {value:?} is not a number")]
    NotANumber { axis: &'static str, value: String },

    /// Value is outside the valid range for its axis
    #[error("{axis} {value} is out of range")]
    OutOfRange { axis: &'static str, value: f64 },
}

/// The authoritative location of a station, never published verbatim.
///
/// Equality and hashing use the source strings only.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "(String, String)", into = "(String, String)")]
pub struct ExactCoordinate {
    lon: String,
    lat: String,
    lon_deg: f64,
    lat_deg: f64,
}

impl PartialEq for ExactCoordinate {
    fn eq(&self, other: &Self) -> bool {
        self.lon == other.lon && self.lat == other.lat
    }
}

impl Eq for ExactCoordinate {}

impl Hash for ExactCoordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lon.hash(state);
        self.lat.hash(state);
    }
}

impl ExactCoordinate {
    /// Build an exact coordinate from longitude and latitude strings.
    ///
    /// Surrounding whitespace is trimmed; the remaining text is kept as-is.
    pub fn new(lon: impl AsRef<str>, lat: impl AsRef<str>) -> Result<Self, InvalidCoordinate> {
        let lon = lon.as_ref().trim().to_string();
        let lat = lat.as_ref().trim().to_string();
        let lon_deg = parse_angle("longitude", &lon, 180.0)?;
        let lat_deg = parse_angle("latitude", &lat, 90.0)?;

        Ok(Self {
            lon,
            lat,
            lon_deg,
            lat_deg,
        })
    }

    /// Longitude as written in the source.
    pub fn lon_str(&self) -> &str {
        &self.lon
    }

    /// Latitude as written in the source.
    pub fn lat_str(&self) -> &str {
        &self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon_deg
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat_deg
    }
}

fn parse_angle(axis: &'static str, value: &str, limit: f64) -> Result<f64, InvalidCoordinate> {
    let deg: f64 = value.parse().map_err(|_| InvalidCoordinate::NotANumber {
        axis,
        value: value.to_string(),
    })?;
    if !deg.is_finite() || deg.abs() > limit {
        return Err(InvalidCoordinate::OutOfRange { axis, value: deg });
    }
    Ok(deg)
}

impl TryFrom<(String, String)> for ExactCoordinate {
    type Error = InvalidCoordinate;

    fn try_from((lon, lat): (String, String)) -> Result<Self, Self::Error> {
        Self::new(lon, lat)
    }
}

impl From<ExactCoordinate> for (String, String) {
    fn from(c: ExactCoordinate) -> Self {
        (c.lon, c.lat)
    }
}

impl fmt::Debug for ExactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExactCoordinate({}, {})", self.lon, self.lat)
    }
}

impl fmt::Display for ExactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}

/// A public, jittered stand-in for a station location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ApproxCoordinate {
    pub lon: f64,
    pub lat: f64,
}

impl ApproxCoordinate {
    /// Create an approximate coordinate, rounding both axes to 3 decimals.
    pub fn rounded(lon: f64, lat: f64) -> Self {
        Self {
            lon: round3(lon),
            lat: round3(lat),
        }
    }

    /// Great-circle distance to an exact coordinate, in kilometres.
    pub fn distance_km(&self, exact: &ExactCoordinate) -> f64 {
        haversine_km(self.lat, self.lon, exact.lat(), exact.lon())
    }
}

impl From<[f64; 2]> for ApproxCoordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<ApproxCoordinate> for [f64; 2] {
    fn from(c: ApproxCoordinate) -> Self {
        [c.lon, c.lat]
    }
}

impl fmt::Display for ApproxCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Haversine distance between two points given in degrees, in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_keeps_source_text() {
        let c = ExactCoordinate::new(" 10.000 ", "45.0").unwrap();
        assert_eq!(c.lon_str(), "10.000");
        assert_eq!(c.lat_str(), "45.0");
        assert_eq!(c.lon(), 10.0);
        assert_eq!(c.lat(), 45.0);
    }

    #[test]
    fn exact_equality_is_textual() {
        let a = ExactCoordinate::new("10.0", "45.0").unwrap();
        let b = ExactCoordinate::new("10.0", "45.0").unwrap();
        let c = ExactCoordinate::new("10.00", "45.0").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn exact_rejects_garbage() {
        assert!(matches!(
            ExactCoordinate::new("east", "45.0"),
            Err(InvalidCoordinate::NotANumber { .. })
        ));
        assert!(matches!(
            ExactCoordinate::new("10.0", "91.0"),
            Err(InvalidCoordinate::OutOfRange { .. })
        ));
        assert!(ExactCoordinate::new("NaN", "0").is_err());
    }

    #[test]
    fn exact_serialises_as_string_pair() {
        let c = ExactCoordinate::new("10.000", "45.000").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"["10.000","45.000"]"#);
        let back: ExactCoordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        assert_eq!(back.lat(), 45.0);
    }

    #[test]
    fn approx_rounds_to_three_decimals() {
        let c = ApproxCoordinate::rounded(10.12345, -45.98765);
        assert_eq!(c.lon, 10.123);
        assert_eq!(c.lat, -45.988);
    }

    #[test]
    fn approx_serialises_as_lon_lat_array() {
        let c = ApproxCoordinate { lon: 5.5, lat: 52.25 };
        assert_eq!(serde_json::to_string(&c).unwrap(), "[5.5,52.25]");
    }

    #[test]
    fn haversine_known_distance() {
        // One degree of latitude is about 111.2 km.
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01, "got {d}");
        assert_eq!(haversine_km(52.0, 5.0, 52.0, 5.0), 0.0);
    }

    #[test]
    fn distance_to_exact() {
        let exact = ExactCoordinate::new("0.0", "0.0").unwrap();
        let approx = ApproxCoordinate { lon: 0.0, lat: 0.01 };
        let d = approx.distance_km(&exact);
        assert!((d - 1.112).abs() < 0.001, "got {d}");
    }
}
