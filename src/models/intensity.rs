//! Shaking intensity schemas for the `intensity` endpoint.

use super::Feature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Source of intensity values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityKind {
    /// Felt reports submitted by the public.
    Reported,
    /// Instrumental values from the strong-motion network.
    Measured,
}

impl IntensityKind {
    /// Returns the value sent as the `type` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            IntensityKind::Reported => "reported",
            IntensityKind::Measured => "measured",
        }
    }
}

impl fmt::Display for IntensityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntensityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reported" => Ok(IntensityKind::Reported),
            "measured" => Ok(IntensityKind::Measured),
            other => Err(format!(
                "unknown intensity type `{other}` (expected reported or measured)"
            )),
        }
    }
}

/// How reported intensities are aggregated per location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Highest intensity reported at each location.
    Max,
    /// Median intensity reported at each location.
    Median,
}

impl Aggregation {
    /// Returns the value sent as the `aggregation` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Max => "max",
            Aggregation::Median => "median",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(Aggregation::Max),
            "median" => Ok(Aggregation::Median),
            other => Err(format!(
                "unknown aggregation `{other}` (expected max or median)"
            )),
        }
    }
}

/// Intensity at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityProperties {
    /// Modified Mercalli Intensity at this location.
    pub mmi: i32,
    /// Number of felt reports behind this value; reported intensity only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// Intensity values per location, plus report totals per MMI for felt reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityResponse {
    /// One feature per location.
    pub features: Vec<Feature<IntensityProperties>>,
    /// Number of felt reports per MMI value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_mmi: Option<BTreeMap<String, u64>>,
}

impl IntensityResponse {
    /// Number of locations.
    pub fn count(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if there are no locations.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Highest MMI among all locations.
    pub fn max_mmi(&self) -> Option<i32> {
        self.features.iter().map(|f| f.properties.mmi).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_and_aggregation() {
        assert_eq!("Reported".parse::<IntensityKind>(), Ok(IntensityKind::Reported));
        assert_eq!(" measured ".parse::<IntensityKind>(), Ok(IntensityKind::Measured));
        assert!("felt".parse::<IntensityKind>().is_err());

        assert_eq!("median".parse::<Aggregation>(), Ok(Aggregation::Median));
        assert!("mean".parse::<Aggregation>().is_err());
    }

    #[test]
    fn test_reported_intensity() {
        let response: IntensityResponse = serde_json::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature",
                     "geometry": {"type": "Point", "coordinates": [174.78, -41.29]},
                     "properties": {"mmi": 4, "count": 12}},
                    {"type": "Feature",
                     "geometry": {"type": "Point", "coordinates": [172.63, -43.53]},
                     "properties": {"mmi": 6, "count": 3}}
                ],
                "count_mmi": {"4": 12, "6": 3}
            }"#,
        )
        .unwrap();

        assert_eq!(response.count(), 2);
        assert_eq!(response.max_mmi(), Some(6));
        assert_eq!(response.count_mmi.as_ref().and_then(|c| c.get("4")), Some(&12));
    }

    #[test]
    fn test_measured_intensity_has_no_counts() {
        let response: IntensityResponse = serde_json::from_str(
            r#"{"features": [
                {"geometry": {"coordinates": [175.0, -40.0]}, "properties": {"mmi": 3}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(response.features[0].properties.count, None);
        assert_eq!(response.count_mmi, None);
    }
}
