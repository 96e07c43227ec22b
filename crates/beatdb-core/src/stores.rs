use serde::{Deserialize, Serialize};

/// Coordinates are compared at six decimal places (~0.11 m at the equator)
/// when deciding whether two records describe the same physical store.
const COORDINATE_SCALE: f64 = 1_000_000.0;

/// A store as produced by the importer and handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub salesman_name: String,
    pub beat_name: String,
}

impl StoreRecord {
    /// Returns the dedup identity of this record.
    #[must_use]
    pub fn key(&self) -> StoreKey {
        StoreKey::new(&self.display_name, self.latitude, self.longitude)
    }
}

/// Round a coordinate to six decimal places.
///
/// `NaN` and infinities pass through unchanged.
#[must_use]
pub fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

/// Hashable dedup identity: display name plus the bit patterns of the
/// rounded coordinates.
///
/// Any finite magnitude keys distinctly; `-0.0` is folded into `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub name: String,
    pub latitude_bits: u64,
    pub longitude_bits: u64,
}

impl StoreKey {
    #[must_use]
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_owned(),
            latitude_bits: coordinate_bits(latitude),
            longitude_bits: coordinate_bits(longitude),
        }
    }
}

fn coordinate_bits(value: f64) -> u64 {
    let rounded = round_coordinate(value);
    // `+ 0.0` turns -0.0 into 0.0 and leaves every other value unchanged.
    (rounded + 0.0).to_bits()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, latitude: f64, longitude: f64) -> StoreRecord {
        StoreRecord {
            display_name: name.to_owned(),
            latitude,
            longitude,
            salesman_name: "Unassigned".to_owned(),
            beat_name: "Unassigned".to_owned(),
        }
    }

    #[test]
    fn round_coordinate_truncates_to_six_places() {
        assert!((round_coordinate(1.000_000_1) - 1.0).abs() < f64::EPSILON);
        assert!((round_coordinate(12.345_678_9) - 12.345_679).abs() < 1e-12);
        assert!((round_coordinate(-77.123_456_4) + 77.123_456).abs() < 1e-12);
    }

    #[test]
    fn round_coordinate_passes_nan_through() {
        assert!(round_coordinate(f64::NAN).is_nan());
    }

    #[test]
    fn keys_match_when_coordinates_agree_at_six_places() {
        let a = record("Corner Shop", 1.0, 2.0);
        let b = record("Corner Shop", 1.000_000_1, 2.000_000_1);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn keys_differ_by_name_or_seventh_place_rollover() {
        let a = record("Corner Shop", 1.0, 2.0);
        assert_ne!(a.key(), record("Corner Shop 2", 1.0, 2.0).key());
        assert_ne!(a.key(), record("Corner Shop", 1.000_001, 2.0).key());
    }

    #[test]
    fn keys_stay_distinct_for_huge_coordinates() {
        assert_ne!(
            record("Far", 1e20, 0.0).key(),
            record("Far", 2e20, 0.0).key()
        );
    }

    #[test]
    fn keys_treat_negative_zero_as_zero() {
        assert_eq!(
            record("Origin", -0.000_000_1, 0.0).key(),
            record("Origin", 0.0, 0.0).key()
        );
    }
}
