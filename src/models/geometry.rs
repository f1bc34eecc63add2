//! GeoJSON point geometry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A GeoJSON `Point`: longitude, latitude and an optional third coordinate.
///
/// GeoNet uses the third coordinate for depth (quakes) or elevation
/// (stations); it is kept as-is and absent when the server sends only two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct Point {
    /// Degrees east.
    pub longitude: f64,
    /// Degrees north.
    pub latitude: f64,
    /// Third coordinate: depth in km for quakes, elevation for stations.
    pub depth: Option<f64>,
}

impl Point {
    /// Creates a two-coordinate point.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            depth: None,
        }
    }

    /// Adds the third coordinate.
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Returns the coordinates in GeoJSON order.
    pub fn coordinates(&self) -> Vec<f64> {
        let mut coordinates = vec![self.longitude, self.latitude];
        coordinates.extend(self.depth);
        coordinates
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Serialize, Deserialize)]
struct RawPoint {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    coordinates: Vec<f64>,
}

impl TryFrom<RawPoint> for Point {
    type Error = String;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        if let Some(kind) = raw.kind.as_deref() {
            if kind != "Point" {
                return Err(format!("expected geometry type `Point`, found `{kind}`"));
            }
        }

        match raw.coordinates[..] {
            [longitude, latitude] => Ok(Point::new(longitude, latitude)),
            [longitude, latitude, depth] => Ok(Point::new(longitude, latitude).with_depth(depth)),
            _ => Err(format!(
                "a point needs 2 or 3 coordinates, found {}",
                raw.coordinates.len()
            )),
        }
    }
}

impl From<Point> for RawPoint {
    fn from(point: Point) -> Self {
        RawPoint {
            kind: Some("Point".to_string()),
            coordinates: point.coordinates(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_with_depth() {
        let point: Point =
            serde_json::from_str(r#"{"type":"Point","coordinates":[172.5,-43.5,12.3]}"#).unwrap();

        assert_eq!(point.longitude, 172.5);
        assert_eq!(point.latitude, -43.5);
        assert_eq!(point.depth, Some(12.3));
    }

    #[test]
    fn test_point_without_type_or_depth() {
        let point: Point = serde_json::from_str(r#"{"coordinates":[175.1,-39.2]}"#).unwrap();

        assert_eq!(point, Point::new(175.1, -39.2));
        assert_eq!(point.depth, None);
    }

    #[test]
    fn test_rejects_wrong_shape() {
        assert!(serde_json::from_str::<Point>(r#"{"coordinates":[175.1]}"#).is_err());
        assert!(
            serde_json::from_str::<Point>(r#"{"type":"LineString","coordinates":[1.0,2.0]}"#)
                .is_err()
        );
    }

    #[test]
    fn test_serializes_as_geojson() {
        let json = serde_json::to_value(Point::new(174.0, -41.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Point", "coordinates": [174.0, -41.0]})
        );
    }
}
