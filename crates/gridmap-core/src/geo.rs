//! Geographic positions stored as GeoJSON blobs.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("malformed geometry '{text}': {reason}")]
    Malformed { text: String, reason: String },

    #[error("expected a Point geometry, got {0}")]
    NotAPoint(String),

    #[error("coordinate ({lon}, {lat}) is outside the WGS84 range")]
    OutOfRange { lon: f64, lat: f64 },
}

#[derive(Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

/// A WGS84 position (longitude first, as in GeoJSON).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Result<Self, GeoError> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::OutOfRange { lon, lat });
        }
        Ok(Self { lon, lat })
    }

    /// Parse a GeoJSON `Point`. Blank text means "no point".
    pub fn from_geojson(text: &str) -> Result<Option<GeoPoint>, GeoError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let malformed = |reason: String| GeoError::Malformed {
            text: text.to_string(),
            reason,
        };

        let geometry: Geometry =
            serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
        if geometry.kind != "Point" {
            return Err(GeoError::NotAPoint(geometry.kind));
        }
        let coordinates: Vec<f64> = serde_json::from_value(geometry.coordinates)
            .map_err(|e| malformed(e.to_string()))?;
        // a third (altitude) ordinate is allowed and dropped
        match coordinates.as_slice() {
            [lon, lat] | [lon, lat, _] => GeoPoint::new(*lon, *lat).map(Some),
            other => Err(malformed(format!(
                "a point needs 2 or 3 ordinates, found {}",
                other.len()
            ))),
        }
    }

    pub fn to_geojson(&self) -> String {
        serde_json::json!({ "type": "Point", "coordinates": [self.lon, self.lat] }).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        let p = GeoPoint::from_geojson(r#"{"type":"Point","coordinates":[7.4116482,51.4843281]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(p.lon, 7.4116482);
        assert_eq!(p.lat, 51.4843281);
    }

    #[test]
    fn test_blank_is_no_point() {
        assert_eq!(GeoPoint::from_geojson("").unwrap(), None);
        assert_eq!(GeoPoint::from_geojson("   ").unwrap(), None);
    }

    #[test]
    fn test_rejects_other_geometries() {
        let line = r#"{"type":"LineString","coordinates":[[7.0,51.0],[7.1,51.1]]}"#;
        assert!(matches!(
            GeoPoint::from_geojson(line),
            Err(GeoError::NotAPoint(kind)) if kind == "LineString"
        ));
    }

    #[test]
    fn test_rejects_malformed_and_out_of_range() {
        assert!(matches!(
            GeoPoint::from_geojson("POINT(7 51)"),
            Err(GeoError::Malformed { .. })
        ));
        assert!(matches!(
            GeoPoint::from_geojson(r#"{"type":"Point","coordinates":[7.0]}"#),
            Err(GeoError::Malformed { .. })
        ));
        assert!(matches!(
            GeoPoint::from_geojson(r#"{"type":"Point","coordinates":[7.0,91.0]}"#),
            Err(GeoError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_geojson_round_trip() {
        let p = GeoPoint::new(7.4116482, 51.4843281).unwrap();
        let parsed = GeoPoint::from_geojson(&p.to_geojson()).unwrap();
        assert_eq!(parsed, Some(p));
    }
}
