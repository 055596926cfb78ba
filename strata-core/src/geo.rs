//! GeoJSON-shaped geometry containers
//!
//! The geocoding collaborator returns a bare latitude/longitude pair; these
//! types wrap it into the geometry container persisted alongside documents.

use serde::{Deserialize, Serialize};

/// A geographic coordinate pair.
///
/// Stored as longitude/latitude to match GeoJSON coordinate order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// GeoJSON geometry value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Point { coordinates: [f64; 2] },
    GeometryCollection { geometries: Vec<GeoJson> },
}

impl GeoJson {
    /// A collection wrapping a single point, the shape stored for a
    /// geocoded address.
    pub fn collection_of(point: GeoPoint) -> Self {
        GeoJson::GeometryCollection {
            geometries: vec![point.into()],
        }
    }
}

impl From<GeoPoint> for GeoJson {
    fn from(p: GeoPoint) -> Self {
        GeoJson::Point {
            coordinates: [p.longitude, p.latitude],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_serializes_to_geojson_shape() {
        let point: GeoJson = GeoPoint::new(-3.7038, 40.4168).into();
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(
            value,
            json!({ "type": "Point", "coordinates": [-3.7038, 40.4168] })
        );
    }

    #[test]
    fn test_collection_wraps_single_point() {
        let gc = GeoJson::collection_of(GeoPoint::new(-6.9447, 37.2614));
        let value = serde_json::to_value(&gc).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "GeometryCollection",
                "geometries": [
                    { "type": "Point", "coordinates": [-6.9447, 37.2614] }
                ]
            })
        );
    }

    #[test]
    fn test_geojson_round_trips_through_serde() {
        let gc = GeoJson::collection_of(GeoPoint::new(2.1686, 41.3874));
        let text = serde_json::to_string(&gc).unwrap();
        let back: GeoJson = serde_json::from_str(&text).unwrap();
        assert_eq!(gc, back);
    }
}
