//! Crash metrics aggregated by stores and compared against baselines.

use std::fmt;

/// A quantity that can be totalled over the crashes in an area.
///
/// `Crashes` counts records; `Injuries` and `Fatalities` sum the per-record
/// casualty counts.
///
/// # Examples
/// ```
/// use runsafe_core::Metric;
///
/// assert_eq!(Metric::ALL.len(), 3);
/// assert_eq!(Metric::Injuries.to_string(), "injuries");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Metric {
    /// Number of crash records.
    Crashes,
    /// Sum of persons injured.
    Injuries,
    /// Sum of persons killed.
    Fatalities,
}

impl Metric {
    /// Every metric, in reporting order.
    pub const ALL: [Self; 3] = [Self::Crashes, Self::Injuries, Self::Fatalities];

    /// Lowercase name used in logs and serialised output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crashes => "crashes",
            Self::Injuries => "injuries",
            Self::Fatalities => "fatalities",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Metric::Crashes, "crashes")]
    #[case(Metric::Injuries, "injuries")]
    #[case(Metric::Fatalities, "fatalities")]
    fn displays_lowercase_names(#[case] metric: Metric, #[case] expected: &str) {
        assert_eq!(metric.to_string(), expected);
    }
}
