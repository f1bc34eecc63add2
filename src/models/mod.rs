//! Typed response schemas for the GeoNet API.
//!
//! Parsing is all-or-nothing: a body either produces a complete model or a
//! [`Error::Parse`](crate::Error::Parse). Optional fields are `Option`s and are
//! never filled with a sentinel value. Every query on a collection returns a
//! new value and leaves the receiver untouched.

pub mod cap;
pub mod geometry;
pub mod intensity;
pub mod quake;
pub mod strong_motion;
pub mod volcano;

pub use cap::{CapEntry, CapFeed};
pub use geometry::Point;
pub use intensity::{Aggregation, IntensityKind, IntensityProperties, IntensityResponse};
pub use quake::{
    HistoryProperties, Quality, QuakeFeature, QuakeHistory, QuakeProperties, QuakeResponse,
    QuakeStats,
};
pub use strong_motion::{StationFeature, StationProperties, StrongMotionMetadata, StrongMotionResponse};
pub use volcano::{VolcanoAlert, VolcanoAlerts};

use serde::{Deserialize, Deserializer, Serialize};

/// Properties that carry a natural identifier.
pub trait FeatureId {
    /// Returns the identifier used by [`FeatureCollection::get_by_id`].
    fn feature_id(&self) -> &str;
}

/// One GeoJSON feature: a point geometry plus typed properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    /// Feature identifier, when the server sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Location of the feature.
    pub geometry: Point,
    /// Endpoint-specific attributes.
    pub properties: P,
}

/// An ordered GeoJSON feature collection.
///
/// The feature list is private so that [`count`](Self::count) can never
/// disagree with it. Filters and truncation consume or borrow the collection
/// and hand back a new one in server order.
///
/// # Examples
///
/// ```
/// use gnet::models::{Feature, FeatureCollection, Point};
///
/// let collection = FeatureCollection::new(
///     (1..=5)
///         .map(|n| Feature { id: None, geometry: Point::new(174.0, -41.0), properties: n })
///         .collect(),
/// );
///
/// let odd = collection.filter(|f| f.properties % 2 == 1);
/// assert_eq!(odd.count(), 3);
/// assert_eq!(collection.count(), 5);
///
/// let first_two = odd.truncate(2);
/// assert_eq!(first_two.iter().map(|f| f.properties).collect::<Vec<_>>(), vec![1, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    /// Wraps `features` in server order.
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self { features }
    }

    /// Number of features.
    pub fn count(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if there are no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Returns the features as a slice.
    pub fn features(&self) -> &[Feature<P>] {
        &self.features
    }

    /// Iterates over the features in server order.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature<P>> {
        self.features.iter()
    }

    /// Consumes the collection, returning its features.
    pub fn into_features(self) -> Vec<Feature<P>> {
        self.features
    }

    /// Returns the features matching `predicate`, in their original order.
    pub fn filter(&self, predicate: impl Fn(&Feature<P>) -> bool) -> Self
    where
        P: Clone,
    {
        Self::new(
            self.features
                .iter()
                .filter(|feature| predicate(feature))
                .cloned()
                .collect(),
        )
    }

    /// Keeps the first `len` features.
    pub fn truncate(mut self, len: usize) -> Self {
        self.features.truncate(len);
        self
    }

    /// Applies an optional result limit, where `None` and `Some(0)` mean unlimited.
    pub fn limit(self, limit: Option<usize>) -> Self {
        match limit {
            Some(len) if len > 0 => self.truncate(len),
            _ => self,
        }
    }
}

impl<P: FeatureId> FeatureCollection<P> {
    /// Returns the feature whose properties carry `id`.
    pub fn get_by_id(&self, id: &str) -> Option<&Feature<P>> {
        self.features
            .iter()
            .find(|feature| feature.properties.feature_id() == id)
    }
}

impl<P> Default for FeatureCollection<P> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<P> FromIterator<Feature<P>> for FeatureCollection<P> {
    fn from_iter<I: IntoIterator<Item = Feature<P>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, P> IntoIterator for &'a FeatureCollection<P> {
    type Item = &'a Feature<P>;
    type IntoIter = std::slice::Iter<'a, Feature<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

impl<P> IntoIterator for FeatureCollection<P> {
    type Item = Feature<P>;
    type IntoIter = std::vec::IntoIter<Feature<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

/// Deserializes a string, trimming it and rejecting it if nothing is left.
pub(crate) fn non_empty_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(serde::de::Error::custom("identifier must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Deserializes a string and trims surrounding whitespace.
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|value| value.trim().to_string())
}

/// Deserializes an optional MMI, which must lie in `-1..=12` when present.
pub(crate) fn optional_mmi<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<i32>::deserialize(deserializer)? {
        Some(mmi) if !(-1..=12).contains(&mmi) => Err(serde::de::Error::custom(format!(
            "MMI {mmi} is outside -1..=12"
        ))),
        mmi => Ok(mmi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Named {
        name: String,
    }

    impl FeatureId for Named {
        fn feature_id(&self) -> &str {
            &self.name
        }
    }

    fn collection(names: &[&str]) -> FeatureCollection<Named> {
        names
            .iter()
            .map(|name| Feature {
                id: None,
                geometry: Point::new(174.7, -36.8),
                properties: Named {
                    name: name.to_string(),
                },
            })
            .collect()
    }

    #[test]
    fn test_count_tracks_features() {
        let empty = FeatureCollection::<Named>::default();
        assert_eq!(empty.count(), 0);
        assert!(empty.is_empty());

        let three = collection(&["a", "b", "c"]);
        assert_eq!(three.count(), three.features().len());
        assert!(!three.is_empty());

        let filtered = three.filter(|f| f.properties.name != "b");
        assert_eq!(filtered.count(), 2);
        assert_eq!(filtered.count(), filtered.features().len());
    }

    #[test]
    fn test_get_by_id() {
        let features = collection(&["taupo", "ruapehu"]);

        let found = features.get_by_id("ruapehu").unwrap();
        assert_eq!(found.properties.name, "ruapehu");
        assert!(features.get_by_id("tongariro").is_none());
    }

    #[test]
    fn test_limit_zero_is_unlimited() {
        let features = collection(&["a", "b", "c", "d", "e"]);

        assert_eq!(features.clone().limit(Some(0)).count(), 5);
        assert_eq!(features.clone().limit(None).count(), 5);

        let limited = features.limit(Some(3));
        let names: Vec<_> = limited.iter().map(|f| f.properties.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_deserializes_geojson_collection() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": "x1",
                 "geometry": {"type": "Point", "coordinates": [170.0, -45.0]},
                 "properties": {"name": "x"}}
            ]
        }"#;

        let parsed: FeatureCollection<Named> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.count(), 1);
        assert_eq!(parsed.features()[0].id.as_deref(), Some("x1"));
    }
}
