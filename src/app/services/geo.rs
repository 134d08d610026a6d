//! Great-circle helpers and bezier sampling used to derive geometries from
//! record fields.
//!
//! All functions work on a sphere of fixed radius, so distance, bearing and
//! destination-point are mutually consistent: extending a position by `d`
//! along a bearing and measuring back yields `d` again. That consistency is
//! what runway-polygon construction and length backfilling rely on.

use crate::app::models::geometry::{LineString, Point};
use crate::constants::BEZIER_STEPS;

/// Mean Earth radius in meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two positions (haversine)
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing in degrees, normalized to `[0, 360)`, from the first
/// position towards the second
pub fn track(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    let bearing = y.atan2(x).to_degrees();
    (bearing + 360.0) % 360.0
}

/// Destination point after travelling `distance_m` meters from
/// `(lat, lon)` along the given initial heading. Returns `(lat, lon)`.
pub fn extend_position(lat: f64, lon: f64, distance_m: f64, heading_deg: f64) -> (f64, f64) {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = heading_deg.to_radians();
    let phi1 = lat.to_radians();
    let lambda1 = lon.to_radians();

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    let lon2 = (lambda2.to_degrees() + 540.0) % 360.0 - 180.0;
    (phi2.to_degrees(), lon2)
}

/// Four corners, as `(lat, lon)` pairs, of the rectangle spanned by a
/// centerline from `(lat1, lon1)` to `(lat2, lon2)` and a total width.
/// Corners are emitted in ring order.
pub fn centerline_rectangle(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    width_m: f64,
) -> [(f64, f64); 4] {
    let track12 = track(lat1, lon1, lat2, lon2);
    let track21 = track(lat2, lon2, lat1, lon1);
    [
        extend_position(lat1, lon1, width_m / 2.0, track12 - 90.0),
        extend_position(lat2, lon2, width_m / 2.0, track21 + 90.0),
        extend_position(lat2, lon2, width_m / 2.0, track21 - 90.0),
        extend_position(lat1, lon1, width_m / 2.0, track12 + 90.0),
    ]
}

/// Four corners of the rectangle centered on `(lat, lon)`, aligned with
/// `heading_deg`, of the given length and width. Used for taxiway
/// rectangles and helipad polygons.
pub fn midpoint_rectangle(
    lat: f64,
    lon: f64,
    heading_deg: f64,
    length_m: f64,
    width_m: f64,
) -> [(f64, f64); 4] {
    let (before_lat, before_lon) = extend_position(lat, lon, length_m / 2.0, heading_deg + 180.0);
    let (after_lat, after_lon) = extend_position(lat, lon, length_m / 2.0, heading_deg);
    [
        extend_position(before_lat, before_lon, width_m / 2.0, heading_deg - 90.0),
        extend_position(after_lat, after_lon, width_m / 2.0, heading_deg - 90.0),
        extend_position(after_lat, after_lon, width_m / 2.0, heading_deg + 90.0),
        extend_position(before_lat, before_lon, width_m / 2.0, heading_deg + 90.0),
    ]
}

/// Build a closed ring from four `(lat, lon)` corners
pub fn corners_to_ring(corners: &[(f64, f64); 4]) -> LineString {
    let mut ring = LineString::new();
    for (lat, lon) in corners {
        ring.push(Point::new(*lon, *lat));
    }
    ring.close_ring();
    ring
}

/// Sample a quadratic bezier from `(lat_a, lon_a)` to `(lat_b, lon_b)` with
/// one control point, appending `BEZIER_STEPS + 1` points (both endpoints
/// included) to the line string. Latitude and longitude are interpolated
/// independently.
#[allow(clippy::too_many_arguments)]
pub fn add_quadratic_bezier(
    line: &mut LineString,
    lat_a: f64,
    lon_a: f64,
    ctrl_lat: f64,
    ctrl_lon: f64,
    lat_b: f64,
    lon_b: f64,
) {
    for step in 0..=BEZIER_STEPS {
        let a = step as f64 / BEZIER_STEPS as f64;
        let b = 1.0 - a;
        let lon = lon_a * b * b + 2.0 * ctrl_lon * b * a + lon_b * a * a;
        let lat = lat_a * b * b + 2.0 * ctrl_lat * b * a + lat_b * a * a;
        line.push(Point::new(lon, lat));
    }
}

/// Sample a cubic bezier from `(lat_a, lon_a)` to `(lat_b, lon_b)`.
///
/// The second control point is given as the *symmetric* control point of B
/// (the outgoing one carried on B's record); the effective incoming control
/// is its mirror image about B, matching how the format stores curvature.
#[allow(clippy::too_many_arguments)]
pub fn add_cubic_bezier(
    line: &mut LineString,
    lat_a: f64,
    lon_a: f64,
    ctrl_a_lat: f64,
    ctrl_a_lon: f64,
    sym_ctrl_b_lat: f64,
    sym_ctrl_b_lon: f64,
    lat_b: f64,
    lon_b: f64,
) {
    let ctrl_b_lon = lon_b - (sym_ctrl_b_lon - lon_b);
    let ctrl_b_lat = lat_b - (sym_ctrl_b_lat - lat_b);
    for step in 0..=BEZIER_STEPS {
        let a = step as f64 / BEZIER_STEPS as f64;
        let b = 1.0 - a;
        let lon = lon_a * b * b * b
            + 3.0 * ctrl_a_lon * b * b * a
            + 3.0 * ctrl_b_lon * b * a * a
            + lon_b * a * a * a;
        let lat = lat_a * b * b * b
            + 3.0 * ctrl_a_lat * b * b * a
            + 3.0 * ctrl_b_lat * b * a * a
            + lat_b * a * a * a;
        line.push(Point::new(lon, lat));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS_M: f64 = 0.01;

    #[test]
    fn test_distance_equator_degree() {
        // one degree of longitude at the equator
        let d = distance(0.0, 0.0, 0.0, 1.0);
        let expected = EARTH_RADIUS_M * 1.0_f64.to_radians();
        assert!((d - expected).abs() < EPS_M);
    }

    #[test]
    fn test_track_cardinal_directions() {
        assert!((track(0.0, 0.0, 1.0, 0.0) - 0.0).abs() < 1e-9);
        assert!((track(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 1e-9);
        assert!((track(1.0, 0.0, 0.0, 0.0) - 180.0).abs() < 1e-9);
        assert!((track(0.0, 1.0, 0.0, 0.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_extend_then_measure_back() {
        let (lat, lon) = extend_position(45.0, 7.0, 2500.0, 123.0);
        assert!((distance(45.0, 7.0, lat, lon) - 2500.0).abs() < EPS_M);
        let back = track(lat, lon, 45.0, 7.0);
        let fwd = track(45.0, 7.0, lat, lon);
        let diff = ((back - fwd - 180.0).abs() + 180.0) % 360.0 - 180.0;
        assert!(diff.abs() < 0.1);
    }

    #[test]
    fn test_extend_wraps_longitude() {
        let (_, lon) = extend_position(0.0, 179.9, 50_000.0, 90.0);
        assert!((-180.0..=180.0).contains(&lon));
        assert!(lon < -179.0);
    }

    #[test]
    fn test_centerline_rectangle_corner_distances() {
        let (lat1, lon1, lat2, lon2) = (47.0, 11.0, 47.02, 11.0);
        let width = 45.0;
        let corners = centerline_rectangle(lat1, lon1, lat2, lon2, width);
        // corners 0 and 3 sit beside endpoint 1, corners 1 and 2 beside endpoint 2
        for (corner, (elat, elon)) in [
            (corners[0], (lat1, lon1)),
            (corners[3], (lat1, lon1)),
            (corners[1], (lat2, lon2)),
            (corners[2], (lat2, lon2)),
        ] {
            let d = distance(corner.0, corner.1, elat, elon);
            assert!((d - width / 2.0).abs() < EPS_M, "corner offset {}", d);
        }
    }

    #[test]
    fn test_corners_to_ring_closes() {
        let corners = centerline_rectangle(47.0, 11.0, 47.02, 11.0, 45.0);
        let ring = corners_to_ring(&corners);
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_quadratic_bezier_sample_count_and_endpoints() {
        let mut line = LineString::new();
        add_quadratic_bezier(&mut line, 0.0, 0.0, 1.0, 1.0, 0.0, 2.0);
        assert_eq!(line.len(), 11);
        assert_eq!(line.first().unwrap(), Point::new(0.0, 0.0));
        assert_eq!(line.last().unwrap(), Point::new(2.0, 0.0));
        // midpoint of a quadratic bezier: (A + 2C + B) / 4
        let mid = line.points()[5];
        assert!((mid.lat - 0.5).abs() < 1e-12);
        assert!((mid.lon - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cubic_bezier_sample_count_and_mirroring() {
        let mut line = LineString::new();
        add_cubic_bezier(&mut line, 0.0, 0.0, 1.0, 0.5, 1.0, 3.0, 0.0, 2.0);
        assert_eq!(line.len(), 11);
        assert_eq!(line.first().unwrap(), Point::new(0.0, 0.0));
        assert_eq!(line.last().unwrap(), Point::new(2.0, 0.0));
    }
}
