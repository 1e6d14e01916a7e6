//! In-memory project: floor plans, access points and tag keys.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::HashMap;

use crate::constants::UTF8_BOM;

use super::access_point::{AccessPoint, AccessPointsDocument};
use super::floor_plan::{FloorPlan, FloorPlansDocument};
use super::tag::{TagKey, TagKeysDocument};

/// A loaded `.esx` project.
///
/// The typed views are what the rest of the crate reads. The raw
/// `accessPoints.json` document is kept alongside so it can be written back
/// with only `name` fields changed.
#[derive(Debug, Clone)]
pub struct Project {
    /// Floor plans in `floorPlans.json` order
    pub floor_plans: Vec<FloorPlan>,
    /// Access points in `accessPoints.json` order
    pub access_points: Vec<AccessPoint>,
    /// Tag keys, empty when `tagKeys.json` is absent
    pub tag_keys: Vec<TagKey>,
    access_points_raw: Value,
    layout: JsonLayout,
}

/// Formatting of a JSON document as it was read, reused when writing it
/// back so that untouched members keep their text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonLayout {
    bom: bool,
    /// Indentation unit, `None` for single-line documents
    indent: Option<Vec<u8>>,
    /// Whitespace after the closing bracket
    trailer: Vec<u8>,
}

impl Default for JsonLayout {
    fn default() -> Self {
        Self {
            bom: false,
            indent: Some(b"  ".to_vec()),
            trailer: Vec::new(),
        }
    }
}

impl JsonLayout {
    /// Detects the layout of a serialized document.
    ///
    /// A document without line breaks is compact. Otherwise the leading
    /// whitespace of its second line is the indentation unit.
    pub fn detect(data: &[u8]) -> Self {
        let bom = data.starts_with(UTF8_BOM);
        let body = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        let end = body
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |i| i + 1);
        let (content, trailer) = body.split_at(end);

        let indent = content.iter().position(|&b| b == b'\n').map(|nl| {
            content[nl + 1..]
                .iter()
                .take_while(|&&b| b == b' ' || b == b'\t')
                .copied()
                .collect()
        });

        Self {
            bom,
            indent,
            trailer: trailer.to_vec(),
        }
    }

    /// Returns true for single-line documents.
    pub const fn is_compact(&self) -> bool {
        self.indent.is_none()
    }

    /// Serializes `value` in this layout.
    pub fn write(&self, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        if self.bom {
            out.extend_from_slice(UTF8_BOM);
        }
        match &self.indent {
            None => serde_json::to_writer(&mut out, value)?,
            Some(indent) => {
                let mut serializer = serde_json::Serializer::with_formatter(
                    &mut out,
                    PrettyFormatter::with_indent(indent),
                );
                value.serialize(&mut serializer)?;
            }
        }
        out.extend_from_slice(&self.trailer);
        Ok(out)
    }
}

impl Project {
    /// Builds a project from its parsed documents.
    ///
    /// `access_points_raw` must be the full `accessPoints.json` document.
    pub fn from_documents(
        floor_plans: FloorPlansDocument,
        access_points_raw: Value,
        tag_keys: Option<TagKeysDocument>,
    ) -> Result<Self> {
        let access_points: AccessPointsDocument =
            serde_json::from_value(access_points_raw.clone())
                .context("Unexpected accessPoints.json shape")?;

        if !access_points_raw
            .get("accessPoints")
            .is_some_and(Value::is_array)
        {
            anyhow::bail!("accessPoints.json has no \"accessPoints\" array");
        }

        Ok(Self {
            floor_plans: floor_plans.floor_plans,
            access_points: access_points.access_points,
            tag_keys: tag_keys.map(|t| t.tag_keys).unwrap_or_default(),
            access_points_raw,
            layout: JsonLayout::default(),
        })
    }

    /// Builds a project directly from typed values (mainly for tests).
    pub fn new(floor_plans: Vec<FloorPlan>, access_points: Vec<AccessPoint>) -> Self {
        let access_points_raw = serde_json::json!({ "accessPoints": access_points });
        Self {
            floor_plans,
            access_points,
            tag_keys: Vec::new(),
            access_points_raw,
            layout: JsonLayout::default(),
        }
    }

    /// Sets the layout used when writing `accessPoints.json` back.
    #[must_use]
    pub fn with_layout(mut self, layout: JsonLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Adds tag keys (builder style).
    #[must_use]
    pub fn with_tag_keys(mut self, tag_keys: Vec<TagKey>) -> Self {
        self.tag_keys = tag_keys;
        self
    }

    /// Gets a floor plan by id.
    pub fn floor(&self, id: &str) -> Option<&FloorPlan> {
        self.floor_plans.iter().find(|f| f.id == id)
    }

    /// Resolves a tag key name (e.g., "Building") to its id.
    pub fn tag_key_id(&self, key_name: &str) -> Option<&str> {
        self.tag_keys
            .iter()
            .find(|k| k.key == key_name)
            .map(|k| k.id.as_str())
    }

    /// Placed APs on one floor, in collection order.
    pub fn placed_on<'a>(&'a self, floor_id: &'a str) -> impl Iterator<Item = &'a AccessPoint> {
        self.access_points
            .iter()
            .filter(move |ap| ap.floor_plan_id() == Some(floor_id))
    }

    /// APs without a location, in collection order.
    pub fn unplaced(&self) -> impl Iterator<Item = &AccessPoint> {
        self.access_points.iter().filter(|ap| !ap.is_placed())
    }

    /// Rewrites AP names by id.
    ///
    /// Only the `name` member of matching entries in the raw document is
    /// replaced; every other byte of the AP objects is left as loaded.
    /// Returns the number of APs whose name actually changed.
    pub fn apply_names<'a, I>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let names: HashMap<&str, &str> = names.into_iter().collect();
        let mut changed = 0;

        if let Some(entries) = self
            .access_points_raw
            .get_mut("accessPoints")
            .and_then(Value::as_array_mut)
        {
            for entry in entries.iter_mut() {
                let Some(id) = entry.get("id").and_then(Value::as_str) else {
                    continue;
                };
                let Some(new_name) = names.get(id).copied() else {
                    continue;
                };
                if let Some(object) = entry.as_object_mut() {
                    let unchanged = object.get("name").and_then(Value::as_str) == Some(new_name);
                    if !unchanged {
                        object.insert("name".to_string(), Value::String(new_name.to_string()));
                        changed += 1;
                    }
                }
            }
        }

        for ap in &mut self.access_points {
            if let Some(new_name) = names.get(ap.id.as_str()) {
                ap.name = (*new_name).to_string();
            }
        }

        changed
    }

    /// The raw `accessPoints.json` document.
    pub const fn access_points_raw(&self) -> &Value {
        &self.access_points_raw
    }

    /// Serializes `accessPoints.json` for writing back, in the layout it was
    /// loaded with. Number tokens keep their original text.
    pub fn access_points_json(&self) -> Result<Vec<u8>> {
        self.layout
            .write(&self.access_points_raw)
            .context("Failed to serialize accessPoints.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_project() -> Project {
        let raw = json!({
            "accessPoints": [
                {"id": "a1", "name": "old-1", "vendor": "Acme", "mine": true,
                 "location": {"floorPlanId": "f1", "coord": {"x": 1, "y": 2}}},
                {"id": "a2", "name": "old-2", "hidden": false}
            ]
        });
        let floors = FloorPlansDocument {
            floor_plans: vec![FloorPlan::new("f1", "Ground", 100.0, 50.0)],
        };
        Project::from_documents(floors, raw, None).unwrap()
    }

    #[test]
    fn test_from_documents() {
        let project = raw_project();
        assert_eq!(project.floor_plans.len(), 1);
        assert_eq!(project.access_points.len(), 2);
        assert!(project.tag_keys.is_empty());
        assert_eq!(project.placed_on("f1").count(), 1);
        assert_eq!(project.unplaced().count(), 1);
    }

    #[test]
    fn test_from_documents_rejects_missing_array() {
        let result = Project::from_documents(
            FloorPlansDocument::default(),
            json!({"somethingElse": []}),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_names_only_touches_name() {
        let mut project = raw_project();
        let before = project.access_points_raw().clone();

        let changed = project.apply_names([("a1", "AP-001")]);
        assert_eq!(changed, 1);

        let after = project.access_points_raw();
        let mut expected = before;
        expected["accessPoints"][0]["name"] = json!("AP-001");
        assert_eq!(after, &expected);
        assert_eq!(project.access_points[0].name, "AP-001");
        assert_eq!(project.access_points[1].name, "old-2");
    }

    #[test]
    fn test_apply_names_keeps_key_order() {
        let mut project = raw_project();
        project.apply_names([("a1", "AP-001")]);

        let keys: Vec<&String> = project.access_points_raw()["accessPoints"][0]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, ["id", "name", "vendor", "mine", "location"]);
    }

    #[test]
    fn test_apply_same_name_counts_nothing() {
        let mut project = raw_project();
        assert_eq!(project.apply_names([("a1", "old-1")]), 0);
    }

    fn loaded(text: &str) -> Project {
        let raw: Value = serde_json::from_str(text).unwrap();
        Project::from_documents(FloorPlansDocument::default(), raw, None)
            .unwrap()
            .with_layout(JsonLayout::detect(text.as_bytes()))
    }

    #[test]
    fn test_compact_document_keeps_number_text() {
        let text = r#"{"accessPoints":[{"id":"a","name":"old","location":{"floorPlanId":"f1","coord":{"x":10.10,"y":1e2}},"z":1234.56789012345678}]}"#;
        let mut project = loaded(text);
        assert!(project.layout.is_compact());
        assert_eq!(project.access_points[0].coord().map(|c| c.y), Some(100.0));

        project.apply_names([("a", "AP-001")]);
        let written = String::from_utf8(project.access_points_json().unwrap()).unwrap();
        assert_eq!(written, text.replace(r#""name":"old""#, r#""name":"AP-001""#));
    }

    #[test]
    fn test_pretty_document_keeps_indent_and_trailer() {
        let text = "{\n    \"accessPoints\": [\n        {\n            \"id\": \"a\",\n            \"name\": \"old\",\n            \"height\": 2.50\n        }\n    ]\n}\n";
        let mut project = loaded(text);
        assert!(!project.layout.is_compact());

        project.apply_names([("a", "AP-001")]);
        let written = String::from_utf8(project.access_points_json().unwrap()).unwrap();
        assert_eq!(written, text.replace("\"old\"", "\"AP-001\""));
    }

    #[test]
    fn test_layout_detects_bom() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(br#"{"accessPoints":[]}"#);
        let layout = JsonLayout::detect(&data);
        assert!(layout.is_compact());

        let value: Value = serde_json::from_slice(&data[UTF8_BOM.len()..]).unwrap();
        assert_eq!(layout.write(&value).unwrap(), data);
    }

    #[test]
    fn test_tag_key_lookup() {
        let project = raw_project().with_tag_keys(vec![TagKey {
            id: "k1".to_string(),
            key: "Building".to_string(),
        }]);
        assert_eq!(project.tag_key_id("Building"), Some("k1"));
        assert_eq!(project.tag_key_id("Zone"), None);
    }
}
