//! Distance and bounding-box helpers for radius searches.
//!
//! Both functions share one equirectangular approximation: a degree of
//! latitude spans [`KM_PER_DEGREE`] kilometres and a degree of longitude spans
//! `KM_PER_DEGREE * cos(latitude)` kilometres, evaluated at the search centre.
//! Because the prefilter box and the exact distance use the same scale
//! factors, every point within `radius_km` of the centre falls inside
//! [`bounding_box`]. The box may admit extra points near its corners; callers
//! remove those with [`distance_km`].
//!
//! The longitude scale collapses towards the poles. Searches are expected to
//! stay within `|latitude| < 75°`, which covers every urban area the engine
//! targets.

use geo::{Coord, Rect};

/// Kilometres spanned by one degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Distance in kilometres between `reference` and `other`.
///
/// The longitude difference is scaled by the cosine of the reference latitude,
/// so pass the search centre first to stay consistent with
/// [`bounding_box`]. Identical points are `0.0` apart.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use runsafe_core::distance_km;
///
/// let centre = Coord { x: -73.9855, y: 40.7580 };
/// assert_eq!(distance_km(centre, centre), 0.0);
///
/// let north = Coord { x: -73.9855, y: 40.7680 };
/// assert!((distance_km(centre, north) - 1.11).abs() < 1e-9);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "equirectangular projection is floating-point maths"
)]
pub fn distance_km(reference: Coord<f64>, other: Coord<f64>) -> f64 {
    let dy = (other.y - reference.y) * KM_PER_DEGREE;
    let dx = (other.x - reference.x) * KM_PER_DEGREE * reference.y.to_radians().cos();
    dx.hypot(dy)
}

/// Axis-aligned box guaranteed to contain every point within `radius_km` of
/// `center`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use runsafe_core::bounding_box;
///
/// let bbox = bounding_box(Coord { x: 0.0, y: 0.0 }, 111.0);
/// assert!((bbox.min().y + 1.0).abs() < 1e-12);
/// assert!((bbox.max().x - 1.0).abs() < 1e-12);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "degree buffers are derived from the radius in kilometres"
)]
pub fn bounding_box(center: Coord<f64>, radius_km: f64) -> Rect<f64> {
    let lat_buffer = radius_km / KM_PER_DEGREE;
    let lng_buffer = radius_km / (KM_PER_DEGREE * center.y.to_radians().cos().abs());
    Rect::new(
        Coord {
            x: center.x - lng_buffer,
            y: center.y - lat_buffer,
        },
        Coord {
            x: center.x + lng_buffer,
            y: center.y + lat_buffer,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Intersects;
    use rstest::rstest;

    const TOLERANCE: f64 = 1e-9;

    #[rstest]
    fn identical_points_are_zero_apart() {
        let point = Coord { x: 12.5, y: 51.2 };
        assert_eq!(distance_km(point, point), 0.0);
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "assertion tolerance")]
    fn one_degree_of_latitude_is_constant() {
        let a = Coord { x: 10.0, y: 60.0 };
        let b = Coord { x: 10.0, y: 61.0 };
        assert!((distance_km(a, b) - KM_PER_DEGREE).abs() < TOLERANCE);
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "assertion tolerance")]
    fn longitude_shrinks_with_latitude() {
        let a = Coord { x: 0.0, y: 60.0 };
        let b = Coord { x: 1.0, y: 60.0 };
        // cos(60°) = 0.5
        assert!((distance_km(a, b) - KM_PER_DEGREE / 2.0).abs() < 1e-6);
    }

    #[rstest]
    #[case(0.0)]
    #[case(40.758)]
    #[case(-33.87)]
    #[case(74.9)]
    #[expect(clippy::float_arithmetic, reason = "assertion tolerance")]
    fn box_edges_sit_exactly_one_radius_away(#[case] lat: f64) {
        let center = Coord { x: 5.0, y: lat };
        let bbox = bounding_box(center, 0.5);
        let east = Coord {
            x: bbox.max().x,
            y: lat,
        };
        let north = Coord {
            x: 5.0,
            y: bbox.max().y,
        };
        assert!((distance_km(center, east) - 0.5).abs() < 1e-6);
        assert!((distance_km(center, north) - 0.5).abs() < 1e-6);
    }

    #[rstest]
    fn box_contains_its_centre() {
        let center = Coord {
            x: -73.9855,
            y: 40.758,
        };
        assert!(bounding_box(center, 0.5).intersects(&center));
    }
}
