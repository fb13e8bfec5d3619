use serde::{Deserialize, Serialize};

/// Reserved position reported when a collar has dropped off or stopped reporting.
pub const SENTINEL_POSITION: GridPos = GridPos { x: -99, y: -99 };

/// Containment status of a tracked animal. On the wire 0 is contained and
/// any other code is escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Status {
    Contained,
    Escaped,
}

impl Status {
    pub fn from_code(code: i64) -> Self {
        if code == 0 {
            Status::Contained
        } else {
            Status::Escaped
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Status::Contained => 0,
            Status::Escaped => 1,
        }
    }
}

impl From<u8> for Status {
    fn from(code: u8) -> Self {
        Status::from_code(code as i64)
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Contained => write!(f, "Safe (Inner)"),
            Status::Escaped => write!(f, "Escaped (Outer)"),
        }
    }
}

/// Logical grid position, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        GridPos { x, y }
    }

    pub fn is_sentinel(self) -> bool {
        self == SENTINEL_POSITION
    }
}

impl From<[i32; 2]> for GridPos {
    fn from([x, y]: [i32; 2]) -> Self {
        GridPos { x, y }
    }
}

impl From<GridPos> for [i32; 2] {
    fn from(pos: GridPos) -> Self {
        [pos.x, pos.y]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub position: GridPos,
    pub status: Status,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, x: i32, y: i32, status: Status) -> Self {
        EntityRecord {
            id: id.into(),
            position: GridPos::new(x, y),
            status,
        }
    }

    pub fn location_unknown(&self) -> bool {
        self.position.is_sentinel()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A virtual fence drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paddock {
    pub name: String,
    pub polygon: Vec<LatLng>,
}

impl Paddock {
    /// Centre of the polygon's bounding box.
    pub fn center(&self) -> Option<LatLng> {
        let first = self.polygon.first()?;
        let (mut min_lat, mut max_lat) = (first.lat, first.lat);
        let (mut min_lng, mut max_lng) = (first.lng, first.lng);
        for p in &self.polygon[1..] {
            min_lat = min_lat.min(p.lat);
            max_lat = max_lat.max(p.lat);
            min_lng = min_lng.min(p.lng);
            max_lng = max_lng.max(p.lng);
        }
        Some(LatLng {
            lat: (min_lat + max_lat) / 2.0,
            lng: (min_lng + max_lng) / 2.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::from_code(0), Status::Contained);
        assert_eq!(Status::from_code(1), Status::Escaped);
        assert_eq!(Status::from_code(7), Status::Escaped);
        assert_eq!(Status::Escaped.code(), 1);
    }

    #[test]
    fn test_entity_record_wire_shape() {
        let rec = EntityRecord::new("cow1", 3, 5, Status::Contained);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json, serde_json::json!({"id": "cow1", "position": [3, 5], "status": 0}));

        let back: EntityRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_sentinel_detection() {
        assert!(EntityRecord::new("B", -99, -99, Status::Escaped).location_unknown());
        assert!(!EntityRecord::new("B", -99, 0, Status::Escaped).location_unknown());
    }

    #[test]
    fn test_paddock_center() {
        let paddock = Paddock {
            name: "Test Field".to_string(),
            polygon: vec![
                LatLng { lat: -1.0, lng: 10.0 },
                LatLng { lat: -3.0, lng: 10.0 },
                LatLng { lat: -3.0, lng: 14.0 },
                LatLng { lat: -1.0, lng: 14.0 },
            ],
        };
        let c = paddock.center().unwrap();
        assert!((c.lat + 2.0).abs() < 1e-9);
        assert!((c.lng - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_paddock_center_empty() {
        let paddock = Paddock {
            name: "Empty".to_string(),
            polygon: vec![],
        };
        assert!(paddock.center().is_none());
    }
}
