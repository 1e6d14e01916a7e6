//! Data models for `.esx` projects.
//!
//! This module contains typed views over the JSON documents inside a project
//! archive. Models are independent of archive I/O and of the renaming logic.

pub mod access_point;
pub mod floor_plan;
pub mod project;
pub mod tag;

// Re-export all model types
pub use access_point::{AccessPoint, AccessPointsDocument, ApTag, Coord, Location, UNKNOWN_MODEL};
pub use floor_plan::{FloorPlan, FloorPlansDocument};
pub use project::{JsonLayout, Project};
pub use tag::{TagKey, TagKeysDocument, TagValue};
