//! Deterministic access point renaming.
//!
//! A run bands each floor's APs with [`crate::cluster`], orders them by the
//! strategy's keys and hands out sequence numbers through a [`NameTemplate`].
//! The result is a [`RenamePlan`]; applying it is a separate step.

pub mod engine;
pub mod naming;
pub mod options;
pub mod strategy;

pub use engine::{
    rename_project, CancelFlag, Cancelled, FloorSummary, RenameEntry, RenamePlan, SkipReason,
    SkippedAp,
};
pub use naming::{NameTemplate, DEFAULT_PATTERN, DEFAULT_WIDTH, TAG_PREFIXED_PATTERN};
pub use options::StrategyOptions;
pub use strategy::{
    Banding, SecondaryKey, SequenceScope, Strategy, StrategyKind, DEFAULT_DIVISOR, DEFAULT_PIXELS,
};
