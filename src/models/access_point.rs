//! Access point definitions from `accessPoints.json`.
//!
//! These are read-only views: writes go through the raw document held by
//! [`Project`](super::Project) so that every field other than `name` survives
//! a rename untouched.

use serde::{Deserialize, Serialize};

use super::tag::TagValue;

/// Label used for an AP without a `model` field.
pub const UNKNOWN_MODEL: &str = "Unknown";

/// A point on a floor plan image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    /// Horizontal position (grows to the right)
    pub x: f64,
    /// Vertical position (grows downwards)
    pub y: f64,
}

/// Where an access point is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Floor plan the AP sits on
    pub floor_plan_id: String,
    /// Position on that floor's image
    pub coord: Coord,
}

/// One user tag attached to an AP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApTag {
    /// Tag key identifier (see `tagKeys.json`)
    pub tag_key_id: String,
    /// Tag value, possibly empty
    #[serde(default)]
    pub value: String,
}

/// A wireless access point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPoint {
    /// AP identifier
    pub id: String,
    /// Display name (the only field a rename changes)
    #[serde(default)]
    pub name: String,
    /// Hardware model, if known
    #[serde(default)]
    pub model: Option<String>,
    /// User tags
    #[serde(default)]
    pub tags: Vec<ApTag>,
    /// Placement; `None` means the AP is unplaced
    #[serde(default)]
    pub location: Option<Location>,
}

impl AccessPoint {
    /// Creates an unplaced AP with no model or tags.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            model: None,
            tags: Vec::new(),
            location: None,
        }
    }

    /// Places the AP on a floor.
    #[must_use]
    pub fn at(mut self, floor_plan_id: impl Into<String>, x: f64, y: f64) -> Self {
        self.location = Some(Location {
            floor_plan_id: floor_plan_id.into(),
            coord: Coord { x, y },
        });
        self
    }

    /// Sets the hardware model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag_key_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(ApTag {
            tag_key_id: tag_key_id.into(),
            value: value.into(),
        });
        self
    }

    /// Returns true if the AP has a location.
    pub const fn is_placed(&self) -> bool {
        self.location.is_some()
    }

    /// Floor plan id, if placed.
    pub fn floor_plan_id(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.floor_plan_id.as_str())
    }

    /// Coordinates, if placed.
    pub fn coord(&self) -> Option<Coord> {
        self.location.as_ref().map(|l| l.coord)
    }

    /// Model label, `"Unknown"` when absent.
    pub fn model_label(&self) -> &str {
        self.model.as_deref().unwrap_or(UNKNOWN_MODEL)
    }

    /// Looks up the value for a tag key.
    ///
    /// `None` as key id (the key name could not be resolved) always yields
    /// [`TagValue::Missing`]. When an AP carries the same key twice the first
    /// occurrence wins.
    pub fn tag_value(&self, tag_key_id: Option<&str>) -> TagValue {
        let Some(key_id) = tag_key_id else {
            return TagValue::Missing;
        };
        TagValue::from_raw(
            self.tags
                .iter()
                .find(|t| t.tag_key_id == key_id)
                .map(|t| t.value.as_str()),
        )
    }
}

/// Wire wrapper: `{"accessPoints": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPointsDocument {
    /// Access points in document order
    #[serde(default)]
    pub access_points: Vec<AccessPoint>,
}
