//! Dew point and cloud-base estimates
//!
//! Both values are recomputed on every read and never stored.

/// Magnus coefficient `a`
const MAGNUS_A: f64 = 17.27;
/// Magnus coefficient `b` in °C
const MAGNUS_B: f64 = 237.7;

/// Temperature/dew-point spread per 1000 ft of lift, °C
const SPREAD_PER_STEP: f64 = 2.5;
/// Height of one 1000 ft step in meters, as used by the estimate
const METERS_PER_STEP: f64 = 122.0;

/// Shown next to every cloud-base value.
pub const CLOUD_BASE_NOTE: &str = "Cloud base is estimated as ((T - Td) / 2.5) x 122 m \
from air temperature T and dew point Td. Rough figure for cumulus only, not for \
operational aviation use. The smaller the spread, the lower the clouds.";

/// Dew point in °C using the Magnus approximation.
///
/// Humidity ≤ 0 yields NaN or an infinity; callers decide how to present it.
#[must_use]
pub fn dew_point(temp_c: f64, humidity_pct: f64) -> f64 {
    let alpha = (MAGNUS_A * temp_c) / (MAGNUS_B + temp_c) + (humidity_pct / 100.0).ln();
    (MAGNUS_B * alpha) / (MAGNUS_A - alpha)
}

/// Estimated cumulus cloud base in meters above ground.
///
/// Saturated air (`temp_c <= dew_point_c`) reports 0. NaN inputs stay NaN.
#[must_use]
pub fn cloud_base_height(temp_c: f64, dew_point_c: f64) -> f64 {
    let spread = temp_c - dew_point_c;
    if spread <= 0.0 {
        return 0.0;
    }
    ((spread / SPREAD_PER_STEP) * METERS_PER_STEP).round()
}

/// Native dew point when present, otherwise synthesized from humidity
#[must_use]
pub fn dew_point_or_synthesized(native: Option<f64>, temp_c: f64, humidity_pct: f64) -> f64 {
    native.unwrap_or_else(|| dew_point(temp_c, humidity_pct))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_dew_point_reference() {
        let td = dew_point(20.0, 50.0);
        assert!((td - 9.2543).abs() < 1e-3, "got {td}");
    }

    #[test]
    fn test_dew_point_saturated_equals_temperature() {
        assert!((dew_point(15.0, 100.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_dew_point_zero_humidity_is_not_finite() {
        assert!(!dew_point(20.0, 0.0).is_finite());
    }

    #[rstest]
    #[case(20.0, 15.0, 244.0)]
    #[case(20.0, 20.0, 0.0)]
    #[case(10.0, 12.0, 0.0)]
    #[case(25.0, 10.0, 732.0)]
    #[case(10.0, 9.0, 49.0)]
    fn test_cloud_base(#[case] t: f64, #[case] td: f64, #[case] expected: f64) {
        assert_eq!(cloud_base_height(t, td), expected);
    }

    #[test]
    fn test_cloud_base_propagates_nan() {
        assert!(cloud_base_height(20.0, f64::NAN).is_nan());
    }

    #[test]
    fn test_native_dew_point_preferred() {
        assert_eq!(dew_point_or_synthesized(Some(3.0), 20.0, 50.0), 3.0);
        assert!((dew_point_or_synthesized(None, 20.0, 50.0) - 9.2543).abs() < 1e-3);
    }
}
