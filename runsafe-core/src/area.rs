//! Validated search areas: a centre point plus a radius in kilometres.

use geo::{Coord, Rect};
use thiserror::Error;

use crate::geometry::bounding_box;

/// Errors returned by [`SearchArea::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SearchAreaError {
    /// Latitude was non-finite or outside `-90..=90`.
    #[error("latitude {lat} is outside -90..=90")]
    InvalidLatitude {
        /// Rejected latitude in degrees.
        lat: f64,
    },
    /// Longitude was non-finite or outside `-180..=180`.
    #[error("longitude {lng} is outside -180..=180")]
    InvalidLongitude {
        /// Rejected longitude in degrees.
        lng: f64,
    },
    /// Radius was non-finite, zero, or negative.
    #[error("search radius must be a positive number of kilometres, got {radius_km}")]
    InvalidRadius {
        /// Rejected radius.
        radius_km: f64,
    },
}

/// A circle on the map around which crashes are located and scored.
///
/// # Examples
/// ```
/// use runsafe_core::SearchArea;
///
/// let area = SearchArea::new(40.7580, -73.9855, 0.5).expect("valid area");
/// assert_eq!(area.radius_km(), 0.5);
/// assert!(SearchArea::new(40.7580, -73.9855, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    center: Coord<f64>,
    radius_km: f64,
}

impl SearchArea {
    /// Validate and construct a search area from degrees and kilometres.
    ///
    /// # Errors
    /// Returns [`SearchAreaError`] when a coordinate is non-finite or out of
    /// range, or when the radius is not strictly positive.
    pub fn new(lat: f64, lng: f64, radius_km: f64) -> Result<Self, SearchAreaError> {
        Self::around(Coord { x: lng, y: lat }, radius_km)
    }

    /// Validate and construct a search area around a `geo` coordinate.
    ///
    /// # Errors
    /// See [`SearchArea::new`].
    pub fn around(center: Coord<f64>, radius_km: f64) -> Result<Self, SearchAreaError> {
        if !center.y.is_finite() || !(-90.0..=90.0).contains(&center.y) {
            return Err(SearchAreaError::InvalidLatitude { lat: center.y });
        }
        if !center.x.is_finite() || !(-180.0..=180.0).contains(&center.x) {
            return Err(SearchAreaError::InvalidLongitude { lng: center.x });
        }
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(SearchAreaError::InvalidRadius { radius_km });
        }
        Ok(Self { center, radius_km })
    }

    /// Centre of the area.
    #[must_use]
    pub const fn center(&self) -> Coord<f64> {
        self.center
    }

    /// Latitude of the centre in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.center.y
    }

    /// Longitude of the centre in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.center.x
    }

    /// Radius in kilometres.
    #[must_use]
    pub const fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Prefilter rectangle covering the whole area.
    #[must_use]
    pub fn bounding_box(&self) -> Rect<f64> {
        bounding_box(self.center, self.radius_km)
    }

    /// Same radius, centred on `center`.
    ///
    /// Used to sample neighbouring areas; the caller is responsible for
    /// keeping the new centre within valid coordinates.
    #[must_use]
    pub const fn recentred(&self, center: Coord<f64>) -> Self {
        Self {
            center,
            radius_km: self.radius_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn accepts_times_square() {
        let area = SearchArea::new(40.758, -73.9855, 0.5).expect("valid area");
        assert_eq!(area.lat(), 40.758);
        assert_eq!(area.lng(), -73.9855);
    }

    #[rstest]
    #[case(f64::NAN, 0.0)]
    #[case(90.5, 0.0)]
    #[case(-91.0, 0.0)]
    fn rejects_bad_latitude(#[case] lat: f64, #[case] lng: f64) {
        let err = SearchArea::new(lat, lng, 1.0).expect_err("latitude must be rejected");
        assert!(matches!(err, SearchAreaError::InvalidLatitude { .. }));
    }

    #[rstest]
    #[case(f64::INFINITY)]
    #[case(180.01)]
    #[case(-200.0)]
    fn rejects_bad_longitude(#[case] lng: f64) {
        let err = SearchArea::new(0.0, lng, 1.0).expect_err("longitude must be rejected");
        assert!(matches!(err, SearchAreaError::InvalidLongitude { .. }));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_non_positive_radius(#[case] radius_km: f64) {
        let err = SearchArea::new(0.0, 0.0, radius_km).expect_err("radius must be rejected");
        assert!(matches!(err, SearchAreaError::InvalidRadius { .. }));
    }
}
