//! Exact unit conversions between provider-native units and the canonical ones.
//!
//! All constants are exact multiplicative factors, no provider-specific fudging:
//! the apparent inconsistencies of the upstream feeds are resolved here, once.
//!

/// Feet to meters.
#[inline]
pub fn ft_to_m(ft: f64) -> f64 {
    ft * 0.3048
}

/// Knots to km/h.
#[inline]
pub fn kt_to_kmh(kt: f64) -> f64 {
    kt * 1.852
}

/// Feet per minute to m/s (0.3048 / 60).
#[inline]
pub fn fpm_to_ms(fpm: f64) -> f64 {
    fpm * 0.00508
}

/// m/s to km/h.
#[inline]
pub fn ms_to_kmh(ms: f64) -> f64 {
    ms * 3.6
}

/// Nautical miles to meters.
#[inline]
pub fn nm_to_m(nm: f64) -> f64 {
    nm * 1852.
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0., 0.)]
    #[case(1000., 304.8)]
    #[case(38_000., 11_582.4)]
    fn test_ft_to_m(#[case] ft: f64, #[case] m: f64) {
        assert!((ft_to_m(ft) - m).abs() < 1e-9);
    }

    #[rstest]
    #[case(100., 185.2)]
    #[case(486.6, 901.1832)]
    fn test_kt_to_kmh(#[case] kt: f64, #[case] kmh: f64) {
        assert!((kt_to_kmh(kt) - kmh).abs() < 1e-9);
    }

    #[test]
    fn test_fpm_to_ms() {
        // 1000 ft/min is 5.08 m/s exactly
        assert!((fpm_to_ms(1000.) - 5.08).abs() < 1e-9);
    }

    #[test]
    fn test_nm_to_m() {
        assert_eq!(1852., nm_to_m(1.));
    }

    // Round-trip within +/- 1 unit after rounding, both ways.
    //
    #[rstest]
    #[case(0.)]
    #[case(900.)]
    #[case(12_345.)]
    #[case(38_975.)]
    fn test_ft_round_trip(#[case] ft: f64) {
        let m = ft_to_m(ft).round();
        let back = (m / 0.3048).round();
        assert!((back - ft).abs() <= 1., "{ft} -> {m} -> {back}");
    }

    #[rstest]
    #[case(0.)]
    #[case(145.)]
    #[case(486.)]
    fn test_kt_round_trip(#[case] kt: f64) {
        let kmh = kt_to_kmh(kt).round();
        let back = (kmh / 1.852).round();
        assert!((back - kt).abs() <= 1., "{kt} -> {kmh} -> {back}");
    }
}
