//! Earthquake schemas: `quake`, `quake/{id}`, `quake/history/{id}` and `quake/stats`.

use super::{non_empty_trimmed, optional_mmi, trimmed, Feature, FeatureCollection, FeatureId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Review status of a quake solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Reviewed by a seismologist.
    Best,
    /// Reviewed, subject to change.
    Preliminary,
    /// Computed automatically, not yet reviewed.
    Automatic,
    /// Withdrawn; not a real quake.
    Deleted,
}

impl Quality {
    /// Returns the wire name of this quality.
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Best => "best",
            Quality::Preliminary => "preliminary",
            Quality::Automatic => "automatic",
            Quality::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Properties of one quake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuakeProperties {
    /// GeoNet public identifier, e.g. `2016p858000`.
    #[serde(rename = "publicID", deserialize_with = "non_empty_trimmed")]
    pub public_id: String,
    /// Origin time (UTC).
    pub time: DateTime<Utc>,
    /// Depth in kilometres.
    pub depth: f64,
    /// Summary magnitude.
    pub magnitude: f64,
    /// Nearest locality description.
    #[serde(deserialize_with = "trimmed")]
    pub locality: String,
    /// Modified Mercalli Intensity, absent when not computed.
    #[serde(
        default,
        alias = "MMI",
        deserialize_with = "optional_mmi",
        skip_serializing_if = "Option::is_none"
    )]
    pub mmi: Option<i32>,
    /// Review status of the solution.
    pub quality: Quality,
    /// Set on quakes returned by `volcano/quake`.
    #[serde(rename = "volcanoID", default, skip_serializing_if = "Option::is_none")]
    pub volcano_id: Option<String>,
}

impl FeatureId for QuakeProperties {
    fn feature_id(&self) -> &str {
        &self.public_id
    }
}

/// One quake as GeoJSON.
pub type QuakeFeature = Feature<QuakeProperties>;
/// Quakes in server order.
pub type QuakeResponse = FeatureCollection<QuakeProperties>;

impl FeatureCollection<QuakeProperties> {
    /// Keeps quakes with `min <= magnitude <= max`; an absent bound is unconstrained.
    pub fn filter_by_magnitude(&self, min: Option<f64>, max: Option<f64>) -> Self {
        self.filter(|feature| {
            let magnitude = feature.properties.magnitude;
            min.map_or(true, |min| magnitude >= min) && max.map_or(true, |max| magnitude <= max)
        })
    }

    /// Keeps quakes whose MMI lies within the bounds.
    ///
    /// Quakes without an MMI never match, even when both bounds are absent.
    pub fn filter_by_mmi(&self, min: Option<i32>, max: Option<i32>) -> Self {
        self.filter(|feature| match feature.properties.mmi {
            Some(mmi) => min.map_or(true, |min| mmi >= min) && max.map_or(true, |max| mmi <= max),
            None => false,
        })
    }
}

/// One revision of a quake's solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryProperties {
    /// GeoNet public identifier.
    #[serde(rename = "publicID", deserialize_with = "non_empty_trimmed")]
    pub public_id: String,
    /// Origin time of this revision (UTC).
    pub time: DateTime<Utc>,
    /// Depth in kilometres.
    pub depth: f64,
    /// Magnitude of this revision.
    pub magnitude: f64,
    /// When this revision was made.
    #[serde(
        rename = "modificationTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub modification_time: Option<DateTime<Utc>>,
    /// Magnitude scale, e.g. `ML` or `Mw`.
    #[serde(rename = "magnitudeType", default, skip_serializing_if = "Option::is_none")]
    pub magnitude_type: Option<String>,
    /// Nearest locality description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    /// Modified Mercalli Intensity, when computed.
    #[serde(
        default,
        alias = "MMI",
        deserialize_with = "optional_mmi",
        skip_serializing_if = "Option::is_none"
    )]
    pub mmi: Option<i32>,
    /// Review status of this revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
}

impl FeatureId for HistoryProperties {
    fn feature_id(&self) -> &str {
        &self.public_id
    }
}

/// Revisions of one quake's solution, oldest first as sent.
pub type QuakeHistory = FeatureCollection<HistoryProperties>;

/// The history endpoint has answered both as a collection and as a bare feature array.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum HistoryBody {
    Collection(QuakeHistory),
    Features(Vec<Feature<HistoryProperties>>),
}

impl From<HistoryBody> for QuakeHistory {
    fn from(body: HistoryBody) -> Self {
        match body {
            HistoryBody::Collection(history) => history,
            HistoryBody::Features(features) => FeatureCollection::new(features),
        }
    }
}

/// Quake counts per magnitude bucket and per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuakeStats {
    /// Counts by magnitude bucket.
    #[serde(rename = "magnitudeCount")]
    pub magnitude_count: MagnitudeCount,
    /// Counts per day.
    pub rate: Rate,
}

/// Counts keyed by integer magnitude bucket, over three windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeCount {
    /// Last 7 days.
    pub days7: BTreeMap<String, u64>,
    /// Last 28 days.
    pub days28: BTreeMap<String, u64>,
    /// Last 365 days.
    pub days365: BTreeMap<String, u64>,
}

/// Daily quake rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    /// Quakes per day keyed by the day's timestamp.
    #[serde(rename = "perDay")]
    pub per_day: BTreeMap<String, u64>,
}
