//! Geodetic reference point for a monitored airspace.
//!
//! All computations use a spherical earth model with R = 6 371 000 m.  This is
//! deliberate: every provider rounds its own positions well below the ellipsoidal
//! error margin and the bounding box over-covers anyway.
//!

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// Mean earth radius in meters, spherical model.
pub const EARTH_RADIUS_M: f64 = 6_371_000.;

/// Geo-specific error type.
///
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("coordinate out of range: lat={lat} lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// Observer location plus radar range.  Immutable for the duration of a
/// polling session, shared by the adapters (area queries) and the
/// normalization step (derived distance & bearing).
///
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeoRef {
    /// Latitude in decimal degrees (WGS-84)
    pub lat: f64,
    /// Longitude in decimal degrees (WGS-84)
    pub lon: f64,
    /// Radar range in meters
    pub range: f64,
}

/// Smallest lat/lon rectangle guaranteed to contain every point within range
/// of the reference.  Over-covers, never under-covers.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Plain rectangle test.
    ///
    #[inline]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

impl GeoRef {
    /// Validating constructor, `range` is in meters.
    ///
    pub fn new(lat: f64, lon: f64, range: f64) -> Result<Self, GeoError> {
        if !(-90. ..=90.).contains(&lat) || !(-180. ..=180.).contains(&lon) {
            return Err(GeoError::InvalidCoordinate { lat, lon });
        }
        Ok(GeoRef { lat, lon, range })
    }

    /// Great-circle distance in meters between the reference and a target
    /// point, haversine formulation.
    ///
    pub fn distance_to(&self, lat: f64, lon: f64) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), lat.to_radians());
        let dlat = (lat - self.lat).to_radians();
        let dlon = (lon - self.lon).to_radians();

        let a = (dlat / 2.).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.).sin().powi(2);
        2. * EARTH_RADIUS_M * a.sqrt().asin()
    }

    /// Initial bearing in degrees [0, 360) from the reference towards a
    /// target point, clockwise from true north.
    ///
    pub fn bearing_to(&self, lat: f64, lon: f64) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), lat.to_radians());
        let dlon = (lon - self.lon).to_radians();

        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        (y.atan2(x).to_degrees() + 360.) % 360.
    }

    /// Bounding coordinates for the range circle, after Matuschek.  The
    /// longitude delta is widened through `asin(sin(r/R)/cos(lat))` so the
    /// box still covers the circle at high latitudes.  Crossing a pole or
    /// the antimeridian degrades to the full longitude span: false
    /// positives are acceptable, false negatives are not.
    ///
    #[tracing::instrument]
    pub fn bbox(&self) -> BoundingBox {
        trace!("bbox for {:.2}/{:.2} r={}m", self.lat, self.lon, self.range);

        let rad = self.range / EARTH_RADIUS_M;
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();

        let min_lat = lat - rad;
        let max_lat = lat + rad;

        if min_lat > -FRAC_PI_2 && max_lat < FRAC_PI_2 {
            let dlon = (rad.sin() / lat.cos()).asin();
            let min_lon = lon - dlon;
            let max_lon = lon + dlon;
            if min_lon > -PI && max_lon < PI {
                return BoundingBox {
                    min_lat: min_lat.to_degrees(),
                    min_lon: min_lon.to_degrees(),
                    max_lat: max_lat.to_degrees(),
                    max_lon: max_lon.to_degrees(),
                };
            }
        }

        // Pole or antimeridian inside the circle
        //
        BoundingBox {
            min_lat: min_lat.max(-FRAC_PI_2).to_degrees(),
            min_lon: -180.,
            max_lat: max_lat.min(FRAC_PI_2).to_degrees(),
            max_lon: 180.,
        }
    }
}

/// 8-point compass direction for a bearing in degrees, used for the
/// human-readable capability values.
///
pub fn compass(bearing: f64) -> &'static str {
    if !bearing.is_finite() {
        return "-";
    }
    let brg = (bearing % 360. + 360.) % 360.;
    match brg {
        b if b < 22.5 => "N",
        b if b < 67.5 => "NE",
        b if b < 112.5 => "E",
        b if b < 157.5 => "SE",
        b if b < 202.5 => "S",
        b if b < 247.5 => "SW",
        b if b < 292.5 => "W",
        b if b < 337.5 => "NW",
        _ => "N",
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    /// Forward geodesic on the same sphere, test-only.
    ///
    fn destination(lat: f64, lon: f64, bearing: f64, dist: f64) -> (f64, f64) {
        let delta = dist / EARTH_RADIUS_M;
        let theta = bearing.to_radians();
        let lat1 = lat.to_radians();
        let lon1 = lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());
        (lat2.to_degrees(), lon2.to_degrees())
    }

    #[rstest]
    #[case(91., 0.)]
    #[case(-90.1, 0.)]
    #[case(0., 180.1)]
    #[case(52., -181.)]
    fn test_georef_invalid(#[case] lat: f64, #[case] lon: f64) {
        assert!(GeoRef::new(lat, lon, 1000.).is_err());
    }

    #[test]
    fn test_georef_valid_extremes() {
        assert!(GeoRef::new(90., 180., 0.).is_ok());
        assert!(GeoRef::new(-90., -180., 0.).is_ok());
    }

    #[test]
    fn test_distance_ams_bru() {
        // Amsterdam to Brussels, roughly 173 km
        //
        let amsterdam = GeoRef::new(52.3676, 4.9041, 0.).unwrap();
        let d = amsterdam.distance_to(50.8503, 4.3517);
        assert!((d - 173_000.).abs() < 2_000., "got {d}");
    }

    #[test]
    fn test_distance_zero() {
        let here = GeoRef::new(52., 5., 0.).unwrap();
        assert_eq!(0., here.distance_to(52., 5.));
    }

    #[rstest]
    #[case(1., 0., 0.)]
    #[case(0., 1., 90.)]
    #[case(- 1., 0., 180.)]
    #[case(0., - 1., 270.)]
    fn test_bearing_cardinal(#[case] lat: f64, #[case] lon: f64, #[case] expected: f64) {
        let origin = GeoRef::new(0., 0., 0.).unwrap();
        let b = origin.bearing_to(lat, lon);
        assert!((b - expected).abs() < 0.01, "got {b}");
    }

    #[test]
    fn test_bbox_over_coverage() {
        // Every point on the 10 km circle around (52.0, 5.0) must fall
        // inside the box.
        //
        let obs = GeoRef::new(52.0, 5.0, 10_000.).unwrap();
        let bb = obs.bbox();

        // epsilon absorbs float round-off for points exactly on the circle
        let eps = 1e-9;
        for step in 0..72 {
            let brg = step as f64 * 5.;
            let (lat, lon) = destination(obs.lat, obs.lon, brg, obs.range);
            assert!(
                lat >= bb.min_lat - eps
                    && lat <= bb.max_lat + eps
                    && lon >= bb.min_lon - eps
                    && lon <= bb.max_lon + eps,
                "point at bearing {brg} ({lat}, {lon}) outside {bb:?}"
            );
            let d = obs.distance_to(lat, lon);
            assert!((d - 10_000.).abs() < 1., "round trip distance {d}");
        }
    }

    #[test]
    fn test_bbox_widens_longitude() {
        // At 52° north the longitude delta must exceed the latitude delta.
        //
        let obs = GeoRef::new(52.0, 5.0, 10_000.).unwrap();
        let bb = obs.bbox();
        assert!((bb.max_lon - bb.min_lon) > (bb.max_lat - bb.min_lat));
    }

    #[test]
    fn test_bbox_pole_clamp() {
        let obs = GeoRef::new(89.99, 0., 50_000.).unwrap();
        let bb = obs.bbox();
        assert_eq!(90., bb.max_lat);
        assert_eq!(-180., bb.min_lon);
        assert_eq!(180., bb.max_lon);
    }

    #[test]
    fn test_bbox_antimeridian() {
        let obs = GeoRef::new(0., 179.99, 50_000.).unwrap();
        let bb = obs.bbox();
        assert_eq!(-180., bb.min_lon);
        assert_eq!(180., bb.max_lon);
    }

    #[rstest]
    #[case(0., "N")]
    #[case(350., "N")]
    #[case(45., "NE")]
    #[case(90., "E")]
    #[case(135., "SE")]
    #[case(180., "S")]
    #[case(225., "SW")]
    #[case(270., "W")]
    #[case(315., "NW")]
    #[case(- 45., "NW")]
    fn test_compass(#[case] brg: f64, #[case] expected: &str) {
        assert_eq!(expected, compass(brg));
    }

    #[test]
    fn test_compass_nan() {
        assert_eq!("-", compass(f64::NAN));
    }
}
