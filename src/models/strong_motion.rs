//! Processed strong-motion station data for one quake.

use super::{Feature, FeatureId};
use serde::{Deserialize, Serialize};

/// Peak ground motion recorded at one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationProperties {
    /// Station code, e.g. `WEMS`.
    pub station: String,
    /// Network code.
    pub network: String,
    /// Sensor location code.
    pub location: String,
    /// Distance from the epicentre in kilometres.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Instrumental intensity at the station.
    #[serde(default)]
    pub mmi: Option<f64>,
    /// Horizontal peak ground acceleration, %g.
    #[serde(default)]
    pub pga_horizontal: Option<f64>,
    /// Vertical peak ground acceleration, %g.
    #[serde(default)]
    pub pga_vertical: Option<f64>,
    /// Horizontal peak ground velocity, cm/s.
    #[serde(default)]
    pub pgv_horizontal: Option<f64>,
    /// Vertical peak ground velocity, cm/s.
    #[serde(default)]
    pub pgv_vertical: Option<f64>,
}

impl FeatureId for StationProperties {
    fn feature_id(&self) -> &str {
        &self.station
    }
}

/// One station reading as GeoJSON.
pub type StationFeature = Feature<StationProperties>;

/// Source solution the station values were processed against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrongMotionMetadata {
    /// Agency that computed the solution.
    #[serde(default)]
    pub author: Option<String>,
    /// Depth in kilometres.
    #[serde(default)]
    pub depth: Option<f64>,
    /// Human-readable description of the quake.
    #[serde(default)]
    pub description: Option<String>,
    /// Epicentre latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Epicentre longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Summary magnitude.
    #[serde(default)]
    pub magnitude: Option<f64>,
    /// Processing version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Station readings for one quake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrongMotionResponse {
    /// Source solution.
    pub metadata: StrongMotionMetadata,
    /// One feature per station.
    pub features: Vec<StationFeature>,
}

impl StrongMotionResponse {
    /// Number of stations.
    pub fn count(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if there are no stations.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Returns the reading for `station`.
    pub fn get_by_station(&self, station: &str) -> Option<&StationFeature> {
        self.features
            .iter()
            .find(|f| f.properties.feature_id() == station)
    }

    /// Keeps stations of `network`, compared case-insensitively.
    pub fn by_network(&self, network: &str) -> Self {
        self.retain(|p| p.network.eq_ignore_ascii_case(network))
    }

    /// Keeps stations with an MMI of at least `min_mmi`.
    pub fn with_min_mmi(&self, min_mmi: f64) -> Self {
        self.retain(|p| p.mmi.is_some_and(|mmi| mmi >= min_mmi))
    }

    /// Keeps stations no further than `max_distance` km from the epicentre.
    pub fn within_distance(&self, max_distance: f64) -> Self {
        self.retain(|p| p.distance.is_some_and(|d| d <= max_distance))
    }

    fn retain(&self, keep: impl Fn(&StationProperties) -> bool) -> Self {
        Self {
            metadata: self.metadata.clone(),
            features: self
                .features
                .iter()
                .filter(|f| keep(&f.properties))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> StrongMotionResponse {
        serde_json::from_str(
            r#"{
                "type": "FeatureCollection",
                "metadata": {"author": "GeoNet", "magnitude": 7.8, "depth": 15.1,
                             "latitude": -42.69, "longitude": 173.02, "version": "0.1"},
                "features": [
                    {"id": "KIKS", "type": "Feature",
                     "geometry": {"type": "Point", "coordinates": [173.68, -42.42]},
                     "properties": {"station": "KIKS", "network": "NZ", "location": "20",
                                    "distance": 29.8, "mmi": 8.2,
                                    "pga_horizontal": 135.4, "pga_vertical": 52.1,
                                    "pgv_horizontal": 96.2, "pgv_vertical": 30.0}},
                    {"id": "WEL", "type": "Feature",
                     "geometry": {"type": "Point", "coordinates": [174.77, -41.28]},
                     "properties": {"station": "WEL", "network": "nz", "location": "20",
                                    "distance": 180.5, "mmi": 5.1}},
                    {"id": "XX1", "type": "Feature",
                     "geometry": {"type": "Point", "coordinates": [172.0, -43.0]},
                     "properties": {"station": "XX1", "network": "SM", "location": "10"}}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse() {
        let response = response();

        assert_eq!(response.count(), 3);
        assert_eq!(response.metadata.magnitude, Some(7.8));
        assert_eq!(response.metadata.description, None);

        let kiks = response.get_by_station("KIKS").unwrap();
        assert_eq!(kiks.id.as_deref(), Some("KIKS"));
        assert_eq!(kiks.properties.pga_horizontal, Some(135.4));
    }

    #[test]
    fn test_filters_exclude_missing_values() {
        let response = response();

        assert_eq!(response.by_network("NZ").count(), 2);
        assert_eq!(response.with_min_mmi(5.0).count(), 2);
        assert_eq!(response.with_min_mmi(6.0).count(), 1);
        assert_eq!(response.within_distance(1000.0).count(), 2);

        let near = response.within_distance(50.0);
        assert_eq!(near.features[0].properties.station, "KIKS");
        assert_eq!(near.metadata, response.metadata);
        assert_eq!(response.count(), 3);
    }
}
