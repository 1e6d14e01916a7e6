//! Service layer for project I/O and reports.
//!
//! Services coordinate between the archive layer, the models and the
//! rename engine so that the CLI stays thin.

pub mod bom;
pub mod project;

pub use bom::BillOfMaterials;
pub use project::{ProjectService, SaveTarget};
