//! Geometry primitives for observation queries.
//!
//! Query inputs arrive either as parsed coordinates or as WKT text
//! (`POINT`, `POLYGON`, `MULTIPOLYGON`); outputs carry the same types back
//! to the encoder. All coordinates are WGS84 lon/lat degrees.

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, Result};

/// A geographic point with optional altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
    /// Altitude in meters, when the query carries a vertical coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
}

impl Point {
    /// Create a 2D point.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            alt: None,
        }
    }

    /// Create a 3D point with altitude.
    pub fn with_alt(lon: f64, lat: f64, alt: f64) -> Self {
        Self {
            lon,
            lat,
            alt: Some(alt),
        }
    }

    /// Parse a WKT `POINT (lon lat)` or plain `lon,lat` string.
    pub fn parse_wkt(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.to_uppercase().starts_with("POINT") {
            let inner = wkt_inner(text)?;
            let coords = parse_lon_lat(inner)?;
            return Ok(Self::new(coords.0, coords.1));
        }

        if text.contains(',') {
            let parts: Vec<&str> = text.split(',').collect();
            if parts.len() != 2 {
                return Err(CommonError::InvalidWkt(format!(
                    "expected lon,lat, got {} parts",
                    parts.len()
                )));
            }
            let lon = parse_coord(parts[0])?;
            let lat = parse_coord(parts[1])?;
            validate_lon_lat(lon, lat)?;
            return Ok(Self::new(lon, lat));
        }

        Err(CommonError::InvalidWkt(
            "expected POINT(lon lat) or lon,lat".to_string(),
        ))
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Get the width in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Get the height in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Check if a point is contained within this bounding box.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Check if this bounding box intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.max_lon < other.min_lon
            || self.min_lon > other.max_lon
            || self.max_lat < other.min_lat
            || self.min_lat > other.max_lat)
    }

    /// Get the center point of the bounding box.
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Expand the bounding box by a buffer amount (in degrees).
    pub fn expand(&self, buffer: f64) -> Self {
        Self {
            min_lon: self.min_lon - buffer,
            min_lat: self.min_lat - buffer,
            max_lon: self.max_lon + buffer,
            max_lat: self.max_lat + buffer,
        }
    }

    /// Clamp this bounding box to valid geographic coordinates.
    pub fn clamp_to_valid(&self) -> Self {
        Self {
            min_lon: self.min_lon.clamp(-180.0, 180.0),
            min_lat: self.min_lat.clamp(-90.0, 90.0),
            max_lon: self.max_lon.clamp(-180.0, 180.0),
            max_lat: self.max_lat.clamp(-90.0, 90.0),
        }
    }

    /// Parse a `min_lon,min_lat,max_lon,max_lat` string.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(',').collect();
        if parts.len() != 4 {
            return Err(CommonError::InvalidWkt(format!(
                "expected 4 bbox values, got {}",
                parts.len()
            )));
        }
        let min_lon = parse_coord(parts[0])?;
        let min_lat = parse_coord(parts[1])?;
        let max_lon = parse_coord(parts[2])?;
        let max_lat = parse_coord(parts[3])?;
        validate_lon_lat(min_lon, min_lat)?;
        validate_lon_lat(max_lon, max_lat)?;
        if min_lon > max_lon || min_lat > max_lat {
            return Err(CommonError::InvalidWkt(
                "bbox minimum exceeds maximum".to_string(),
            ));
        }
        Ok(Self::new(min_lon, min_lat, max_lon, max_lat))
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        // Global coverage
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }
}

/// A multi-polygon area with its precomputed bounding box.
///
/// Each polygon is an outer ring of `(lon, lat)` vertices; the first and last
/// vertex close the ring. Interior holes are not modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    rings: Vec<Vec<(f64, f64)>>,
    bbox: BoundingBox,
}

impl MultiPolygon {
    /// Build a multi-polygon from rings, computing the bounding box.
    ///
    /// Every ring must have at least 4 vertices (closing vertex included).
    pub fn new(rings: Vec<Vec<(f64, f64)>>) -> Result<Self> {
        if rings.is_empty() {
            return Err(CommonError::InvalidWkt(
                "multi-polygon must contain at least one ring".to_string(),
            ));
        }
        let mut min_lon = f64::MAX;
        let mut min_lat = f64::MAX;
        let mut max_lon = f64::MIN;
        let mut max_lat = f64::MIN;
        for ring in &rings {
            if ring.len() < 4 {
                return Err(CommonError::InvalidWkt(
                    "polygon ring must have at least 4 vertices".to_string(),
                ));
            }
            for &(lon, lat) in ring {
                min_lon = min_lon.min(lon);
                max_lon = max_lon.max(lon);
                min_lat = min_lat.min(lat);
                max_lat = max_lat.max(lat);
            }
        }
        Ok(Self {
            rings,
            bbox: BoundingBox::new(min_lon, min_lat, max_lon, max_lat),
        })
    }

    /// The rings of this multi-polygon.
    pub fn rings(&self) -> &[Vec<(f64, f64)>] {
        &self.rings
    }

    /// The precomputed bounding box.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Check if a point falls inside any ring, using ray casting.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        if !self.bbox.contains(lon, lat) {
            return false;
        }
        self.rings.iter().any(|ring| ring_contains(ring, lon, lat))
    }

    /// Parse a WKT `POLYGON ((...))` or `MULTIPOLYGON (((...)))` string.
    pub fn parse_wkt(text: &str) -> Result<Self> {
        let text = text.trim();
        let upper = text.to_uppercase();

        if upper.starts_with("MULTIPOLYGON") {
            let inner = wkt_inner(text)?;
            let rings = split_wkt_groups(inner)?
                .into_iter()
                .map(|ring_text| {
                    let ring_text = ring_text
                        .trim()
                        .trim_start_matches('(')
                        .trim_end_matches(')');
                    parse_ring(ring_text)
                })
                .collect::<Result<Vec<_>>>()?;
            return Self::new(rings);
        }

        if upper.starts_with("POLYGON") {
            let inner = wkt_inner(text)?;
            let ring_text = inner.trim().trim_start_matches('(').trim_end_matches(')');
            return Self::new(vec![parse_ring(ring_text)?]);
        }

        Err(CommonError::InvalidWkt(
            "expected POLYGON or MULTIPOLYGON".to_string(),
        ))
    }
}

/// Ray-casting point-in-ring test.
fn ring_contains(ring: &[(f64, f64)], lon: f64, lat: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Extract the text between the outermost parentheses of a WKT literal.
fn wkt_inner(text: &str) -> Result<&str> {
    let start = text
        .find('(')
        .ok_or_else(|| CommonError::InvalidWkt("missing opening parenthesis".to_string()))?;
    let end = text
        .rfind(')')
        .ok_or_else(|| CommonError::InvalidWkt("missing closing parenthesis".to_string()))?;
    if end <= start {
        return Err(CommonError::InvalidWkt(
            "invalid parenthesis order".to_string(),
        ));
    }
    Ok(text[start + 1..end].trim())
}

/// Split a WKT group list into its top-level parenthesized groups.
///
/// For the inner text of `MULTIPOLYGON(((r1)),((r2)))` this yields one
/// string per polygon, keeping each group's own inner parentheses.
fn split_wkt_groups(inner: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in inner.chars() {
        match ch {
            '(' => {
                depth += 1;
                if depth > 1 {
                    current.push(ch);
                }
            }
            ')' => {
                if depth == 0 {
                    return Err(CommonError::InvalidWkt(
                        "unbalanced parentheses".to_string(),
                    ));
                }
                depth -= 1;
                if depth == 0 {
                    if !current.trim().is_empty() {
                        groups.push(current.trim().to_string());
                    }
                    current.clear();
                } else {
                    current.push(ch);
                }
            }
            ',' if depth == 0 => {}
            _ => {
                if depth > 0 {
                    current.push(ch);
                }
            }
        }
    }
    if depth != 0 {
        return Err(CommonError::InvalidWkt(
            "unbalanced parentheses".to_string(),
        ));
    }
    if groups.is_empty() {
        return Err(CommonError::InvalidWkt(
            "expected at least one parenthesized group".to_string(),
        ));
    }
    Ok(groups)
}

/// Parse a ring of `lon lat, lon lat, ...` vertex pairs.
fn parse_ring(text: &str) -> Result<Vec<(f64, f64)>> {
    let vertices = text
        .split(',')
        .map(|pair| {
            let (lon, lat) = parse_lon_lat(pair)?;
            Ok((lon, lat))
        })
        .collect::<Result<Vec<_>>>()?;
    if vertices.len() < 4 {
        return Err(CommonError::InvalidWkt(
            "polygon ring must have at least 4 vertices".to_string(),
        ));
    }
    Ok(vertices)
}

/// Parse a whitespace-separated `lon lat` pair and validate ranges.
fn parse_lon_lat(pair: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = pair.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(CommonError::InvalidWkt(format!(
            "expected 'lon lat', got '{}'",
            pair.trim()
        )));
    }
    let lon = parse_coord(parts[0])?;
    let lat = parse_coord(parts[1])?;
    validate_lon_lat(lon, lat)?;
    Ok((lon, lat))
}

fn parse_coord(token: &str) -> Result<f64> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| CommonError::InvalidCoordinate(token.trim().to_string()))
}

fn validate_lon_lat(lon: f64, lat: f64) -> Result<()> {
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CommonError::OutOfRange(format!(
            "longitude {lon} is out of range [-180, 180]"
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CommonError::OutOfRange(format!(
            "latitude {lat} is out of range [-90, 90]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_contains() {
        let bbox = BoundingBox::new(-100.0, 30.0, -90.0, 40.0);
        assert!(bbox.contains(-95.0, 35.0));
        assert!(!bbox.contains(-105.0, 35.0));
        assert!(!bbox.contains(-95.0, 45.0));
    }

    #[test]
    fn test_bbox_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_bbox_parse() {
        let bbox = BoundingBox::parse("5.0,47.0,11.0,55.0").unwrap();
        assert_eq!(bbox, BoundingBox::new(5.0, 47.0, 11.0, 55.0));

        assert!(BoundingBox::parse("5.0,47.0,11.0").is_err());
        assert!(BoundingBox::parse("11.0,47.0,5.0,55.0").is_err());
        assert!(BoundingBox::parse("x,47.0,5.0,55.0").is_err());
    }

    #[test]
    fn test_point_parse_wkt() {
        let p = Point::parse_wkt("POINT(8.5 49.1)").unwrap();
        assert!((p.lon - 8.5).abs() < f64::EPSILON);
        assert!((p.lat - 49.1).abs() < f64::EPSILON);

        let p = Point::parse_wkt("8.5,49.1").unwrap();
        assert!((p.lon - 8.5).abs() < f64::EPSILON);

        assert!(Point::parse_wkt("POINT(8.5)").is_err());
        assert!(matches!(
            Point::parse_wkt("POINT(200.0 49.1)"),
            Err(CommonError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_polygon_parse_and_contains() {
        let area =
            MultiPolygon::parse_wkt("POLYGON((0 0, 10 0, 10 10, 0 10, 0 0))").unwrap();
        assert!(area.contains_point(5.0, 5.0));
        assert!(!area.contains_point(15.0, 5.0));
        assert_eq!(*area.bbox(), BoundingBox::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_multipolygon_parse() {
        let area = MultiPolygon::parse_wkt(
            "MULTIPOLYGON(((0 0, 4 0, 4 4, 0 4, 0 0)),((10 10, 14 10, 14 14, 10 14, 10 10)))",
        )
        .unwrap();
        assert_eq!(area.rings().len(), 2);
        assert!(area.contains_point(2.0, 2.0));
        assert!(area.contains_point(12.0, 12.0));
        assert!(!area.contains_point(7.0, 7.0));
    }

    #[test]
    fn test_ring_too_short() {
        assert!(MultiPolygon::parse_wkt("POLYGON((0 0, 10 0, 0 0))").is_err());
    }

    #[test]
    fn test_geometry_serde_round_trip() {
        let point = Point::with_alt(8.5, 49.1, 110.0);
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json["lon"], 8.5);
        assert_eq!(json["alt"], 110.0);
        let back: Point = serde_json::from_value(json).unwrap();
        assert_eq!(back, point);

        let area = MultiPolygon::parse_wkt("POLYGON((0 0, 10 0, 10 10, 0 10, 0 0))").unwrap();
        let json = serde_json::to_string(&area).unwrap();
        let back: MultiPolygon = serde_json::from_str(&json).unwrap();
        assert_eq!(back, area);
    }
}
