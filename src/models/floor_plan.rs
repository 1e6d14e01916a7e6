//! Floor plan definitions from `floorPlans.json`.

use serde::{Deserialize, Serialize};

/// One mapped level of a building.
///
/// Width and height are the pixel dimensions of the floor's background image;
/// access point coordinates on this floor live in the same space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlan {
    /// Floor plan identifier (referenced by `location.floorPlanId`)
    pub id: String,
    /// Human-readable floor name (e.g., "Level 2")
    pub name: String,
    /// Image width in pixels
    pub width: f64,
    /// Image height in pixels
    pub height: f64,
}

impl FloorPlan {
    /// Creates a new `FloorPlan`.
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
        }
    }
}

/// Wire wrapper: `{"floorPlans": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlansDocument {
    /// Floor plans in document order
    #[serde(default)]
    pub floor_plans: Vec<FloorPlan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_floor_plans_ignores_unknown_fields() {
        let json = r#"{
            "floorPlans": [
                {"id": "f1", "name": "Ground", "width": 2000, "height": 1000.5,
                 "imageId": "img-1", "metersPerUnit": 0.05}
            ]
        }"#;
        let doc: FloorPlansDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.floor_plans.len(), 1);
        assert_eq!(doc.floor_plans[0], FloorPlan::new("f1", "Ground", 2000.0, 1000.5));
    }

    #[test]
    fn test_missing_floor_plans_key_is_empty() {
        let doc: FloorPlansDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.floor_plans.is_empty());
    }
}
