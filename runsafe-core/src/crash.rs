//! Crash records as persisted by ingestion, and the values derived from them
//! during a radius search.

use geo::Coord;
use thiserror::Error;

use crate::Metric;

/// Errors returned by [`CrashRecord::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CrashRecordError {
    /// Latitude was non-finite or outside `-90..=90`.
    #[error("crash {id} has invalid latitude {lat}")]
    InvalidLatitude {
        /// Identifier of the rejected record.
        id: u64,
        /// Offending latitude.
        lat: f64,
    },
    /// Longitude was non-finite or outside `-180..=180`.
    #[error("crash {id} has invalid longitude {lng}")]
    InvalidLongitude {
        /// Identifier of the rejected record.
        id: u64,
        /// Offending longitude.
        lng: f64,
    },
}

/// A single historical traffic collision.
///
/// Records are keyed by the collision identifier assigned by the upstream
/// dataset and are never mutated once stored. Coordinates are always finite
/// and within WGS84 bounds.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use runsafe_core::CrashRecord;
///
/// let crash = CrashRecord::new(4_000_123, "2025-01-14", Coord { x: -73.98, y: 40.75 })
///     .expect("valid coordinates")
///     .with_casualties(2, 0);
/// assert_eq!(crash.injuries(), 2);
/// assert_eq!(crash.fatalities(), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CrashRecord {
    id: u64,
    crash_date: String,
    location: Coord<f64>,
    injuries: u32,
    fatalities: u32,
}

impl CrashRecord {
    /// Validate coordinates and construct a record with no casualties.
    ///
    /// # Errors
    /// Returns [`CrashRecordError`] when the latitude or longitude is
    /// non-finite or out of range.
    pub fn new(
        id: u64,
        crash_date: impl Into<String>,
        location: Coord<f64>,
    ) -> Result<Self, CrashRecordError> {
        if !location.y.is_finite() || !(-90.0..=90.0).contains(&location.y) {
            return Err(CrashRecordError::InvalidLatitude {
                id,
                lat: location.y,
            });
        }
        if !location.x.is_finite() || !(-180.0..=180.0).contains(&location.x) {
            return Err(CrashRecordError::InvalidLongitude {
                id,
                lng: location.x,
            });
        }
        Ok(Self {
            id,
            crash_date: crash_date.into(),
            location,
            injuries: 0,
            fatalities: 0,
        })
    }

    /// Set the number of persons injured and killed.
    #[must_use]
    pub fn with_casualties(mut self, injuries: u32, fatalities: u32) -> Self {
        self.injuries = injuries;
        self.fatalities = fatalities;
        self
    }

    /// Upstream collision identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Date of the crash as recorded upstream (ISO-8601).
    #[must_use]
    pub fn crash_date(&self) -> &str {
        &self.crash_date
    }

    /// Crash position (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn location(&self) -> Coord<f64> {
        self.location
    }

    /// Persons injured.
    #[must_use]
    pub const fn injuries(&self) -> u32 {
        self.injuries
    }

    /// Persons killed.
    #[must_use]
    pub const fn fatalities(&self) -> u32 {
        self.fatalities
    }

    /// This record's contribution to `metric`.
    #[must_use]
    pub const fn metric_value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Crashes => 1,
            Metric::Injuries => self.injuries as u64,
            Metric::Fatalities => self.fatalities as u64,
        }
    }
}

/// A crash found within a search radius, annotated with its distance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NearbyCrash {
    /// Upstream collision identifier.
    #[cfg_attr(feature = "serde", serde(rename = "crash_id"))]
    pub id: u64,
    /// Crash date as recorded upstream.
    pub date: String,
    /// Distance from the search centre in kilometres, rounded to 2 decimals.
    pub distance_km: f64,
    /// Crash position (`x = longitude`, `y = latitude`).
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_lat_lng"))]
    pub location: Coord<f64>,
    /// Persons injured.
    pub injuries: u32,
    /// Persons killed.
    pub fatalities: u32,
}

impl NearbyCrash {
    /// Annotate `record` with its exact distance from the search centre.
    #[must_use]
    pub fn from_record(record: &CrashRecord, distance_km: f64) -> Self {
        Self {
            id: record.id,
            date: record.crash_date.clone(),
            distance_km: round_to_centi(distance_km),
            location: record.location,
            injuries: record.injuries,
            fatalities: record.fatalities,
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "rounding to two decimal places scales by 100"
)]
fn round_to_centi(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(feature = "serde")]
fn serialize_lat_lng<S>(location: &Coord<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeStruct;

    let mut state = serializer.serialize_struct("Location", 2)?;
    state.serialize_field("lat", &location.y)?;
    state.serialize_field("lng", &location.x)?;
    state.end()
}

/// Per-metric totals over a set of crashes.
///
/// # Examples
/// ```
/// use runsafe_core::{CrashTotals, Metric};
///
/// let totals = CrashTotals::new(3, 1, 0);
/// assert_eq!(totals.get(Metric::Crashes), 3);
/// assert_eq!(totals.get(Metric::Injuries), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrashTotals {
    /// Number of crashes.
    pub crashes: u64,
    /// Persons injured across all crashes.
    pub injuries: u64,
    /// Persons killed across all crashes.
    pub fatalities: u64,
}

impl CrashTotals {
    /// Construct totals from explicit values.
    #[must_use]
    pub const fn new(crashes: u64, injuries: u64, fatalities: u64) -> Self {
        Self {
            crashes,
            injuries,
            fatalities,
        }
    }

    /// Total for a single metric.
    #[must_use]
    pub const fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Crashes => self.crashes,
            Metric::Injuries => self.injuries,
            Metric::Fatalities => self.fatalities,
        }
    }

    /// Add one located crash to the totals.
    pub const fn record(&mut self, crash: &NearbyCrash) {
        self.crashes = self.crashes.saturating_add(1);
        self.injuries = self.injuries.saturating_add(crash.injuries as u64);
        self.fatalities = self.fatalities.saturating_add(crash.fatalities as u64);
    }
}
