//! Geographic cache keys.
//!
//! Nearby-station queries arrive with arbitrary floating-point coordinates,
//! usually from a map being panned or zoomed. Rounding both axes to a
//! 0.1-degree grid (roughly 11 km at the equator) collapses neighbouring
//! queries onto one cache bucket.

use std::fmt;

/// A quantized (latitude, longitude, radius) cache key.
///
/// Rendered as `"<lat>,<lng>,<radius>"`, e.g. `"41.0,29.0,50"`. Latitude and
/// longitude always carry exactly one decimal digit. The radius is kept
/// verbatim: `"50"` and `"50.0"` are different keys.
///
/// # Examples
///
/// ```
/// use charge_server::domain::GeoCacheKey;
///
/// let a = GeoCacheKey::quantize(41.0123, 28.9781, "50");
/// let b = GeoCacheKey::quantize(40.9612, 29.0449, "50");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "41.0,29.0,50");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GeoCacheKey(String);

impl GeoCacheKey {
    /// Quantize a query into its cache key.
    ///
    /// Never fails. A NaN coordinate yields the component `NaN`, which is
    /// stable but meaningless; callers are expected to reject it first.
    pub fn quantize(lat: f64, lng: f64, radius: &str) -> Self {
        GeoCacheKey(format!(
            "{:.1},{:.1},{}",
            round_to_tenth(lat),
            round_to_tenth(lng),
            radius
        ))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Round to the nearest 0.1, half away from zero.
fn round_to_tenth(value: f64) -> f64 {
    // Adding 0.0 turns -0.0 into 0.0 so "-0.0" never appears in a key.
    (value * 10.0).round() / 10.0 + 0.0
}

impl fmt::Debug for GeoCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoCacheKey({})", self.0)
    }
}

impl fmt::Display for GeoCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
