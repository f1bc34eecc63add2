//! Client-side quake search.
//!
//! A [`QuakeSearch`] narrows an already-fetched [`QuakeResponse`]: magnitude
//! range, then MMI range, then result limit. The filters are pure, so
//! [`Client::search_quakes`](crate::Client::search_quakes) is a fetch followed
//! by `map`; a failed fetch short-circuits and the filters never run.

use crate::models::QuakeResponse;
use crate::{Error, Result};

/// Magnitude, MMI and limit criteria for [`Client::search_quakes`](crate::Client::search_quakes).
///
/// # Examples
///
/// ```
/// use gnet::QuakeSearch;
///
/// let search = QuakeSearch::new()
///     .min_magnitude(4.0)
///     .max_mmi(6)
///     .limit(10);
///
/// assert!(search.validate().is_ok());
/// assert!(QuakeSearch::new().min_magnitude(5.0).max_magnitude(3.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuakeSearch {
    /// Lowest magnitude kept, inclusive.
    pub min_magnitude: Option<f64>,
    /// Highest magnitude kept, inclusive.
    pub max_magnitude: Option<f64>,
    /// Lowest MMI kept, inclusive.
    pub min_mmi: Option<i32>,
    /// Highest MMI kept, inclusive.
    pub max_mmi: Option<i32>,
    /// Maximum number of quakes; `None` or `Some(0)` means no limit.
    pub limit: Option<usize>,
}

impl QuakeSearch {
    /// Creates a search with no criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lowest magnitude kept.
    pub fn min_magnitude(mut self, min: f64) -> Self {
        self.min_magnitude = Some(min);
        self
    }

    /// Sets the highest magnitude kept.
    pub fn max_magnitude(mut self, max: f64) -> Self {
        self.max_magnitude = Some(max);
        self
    }

    /// Sets the lowest MMI kept.
    pub fn min_mmi(mut self, min: i32) -> Self {
        self.min_mmi = Some(min);
        self
    }

    /// Sets the highest MMI kept.
    pub fn max_mmi(mut self, max: i32) -> Self {
        self.max_mmi = Some(max);
        self
    }

    /// Sets the maximum number of quakes; `0` keeps them all.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns `true` if an MMI bound is set.
    ///
    /// The MMI filter drops quakes without an MMI, so it only runs when asked for.
    pub fn filters_mmi(&self) -> bool {
        self.min_mmi.is_some() || self.max_mmi.is_some()
    }

    fn filters_magnitude(&self) -> bool {
        self.min_magnitude.is_some() || self.max_magnitude.is_some()
    }

    /// Checks the bounds are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a non-finite magnitude, an MMI
    /// outside `-1..=12`, or a minimum above its maximum.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_magnitude", self.min_magnitude),
            ("max_magnitude", self.max_magnitude),
        ] {
            if let Some(value) = value.filter(|v| !v.is_finite()) {
                return Err(Error::InvalidParameter {
                    name,
                    reason: format!("{value} is not a finite number"),
                });
            }
        }

        for (name, value) in [("min_mmi", self.min_mmi), ("max_mmi", self.max_mmi)] {
            if let Some(value) = value.filter(|v| !(-1..=12).contains(v)) {
                return Err(Error::InvalidParameter {
                    name,
                    reason: format!("{value} is outside -1..=12"),
                });
            }
        }

        if let (Some(min), Some(max)) = (self.min_magnitude, self.max_magnitude) {
            if min > max {
                return Err(Error::InvalidParameter {
                    name: "min_magnitude",
                    reason: format!("{min} exceeds max_magnitude {max}"),
                });
            }
        }

        if let (Some(min), Some(max)) = (self.min_mmi, self.max_mmi) {
            if min > max {
                return Err(Error::InvalidParameter {
                    name: "min_mmi",
                    reason: format!("{min} exceeds max_mmi {max}"),
                });
            }
        }

        Ok(())
    }

    /// Applies the criteria to `quakes`, keeping server order.
    pub fn apply(&self, quakes: QuakeResponse) -> QuakeResponse {
        let quakes = if self.filters_magnitude() {
            quakes.filter_by_magnitude(self.min_magnitude, self.max_magnitude)
        } else {
            quakes
        };

        let quakes = if self.filters_mmi() {
            quakes.filter_by_mmi(self.min_mmi, self.max_mmi)
        } else {
            quakes
        };

        quakes.limit(self.limit)
    }
}
