//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the entry names inside `.esx` archives.

/// The display name of the application.
pub const APP_NAME: &str = "esxkit";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "esxkit";

/// Extension of project archives (without the dot).
pub const ESX_EXTENSION: &str = "esx";

/// Floor plan descriptors (required).
pub const FLOOR_PLANS_JSON: &str = "floorPlans.json";

/// Access point descriptors (required, rewritten by `rename`).
pub const ACCESS_POINTS_JSON: &str = "accessPoints.json";

/// Simulated radio settings (optional, passed through untouched).
pub const SIMULATED_RADIOS_JSON: &str = "simulatedRadios.json";

/// User tag key definitions (optional).
pub const TAG_KEYS_JSON: &str = "tagKeys.json";

/// Project notes (optional, passed through untouched).
pub const NOTES_JSON: &str = "notes.json";

/// Project-level settings (optional, passed through untouched).
pub const PROJECT_CONFIGURATION_JSON: &str = "projectConfiguration.json";

/// Prefix of floor plan image blobs (`image-<imageId>`).
pub const IMAGE_ENTRY_PREFIX: &str = "image-";

/// Suffix appended to the file stem of a renamed archive.
pub const RENAMED_SUFFIX: &str = "_renamed";

/// UTF-8 byte order mark some exporters put in front of JSON documents.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
