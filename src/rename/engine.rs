//! Rename engine: bands every floor, orders the bands and assigns names.

use anyhow::{Context, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::strategy::{SecondaryKey, SequenceScope, Strategy};
use crate::cluster::{band_count, cluster_floor};
use crate::models::{AccessPoint, FloorPlan, Project, TagValue};

/// Cooperative cancellation flag shared between a worker and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }
}

/// Error returned when a run stops because its [`CancelFlag`] was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operation cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// One renamed access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    /// AP identifier
    pub ap_id: String,
    /// Floor the AP sits on
    pub floor_id: String,
    /// Name before the run
    pub old_name: String,
    /// Name assigned by the run
    pub new_name: String,
    /// Band numbers, leading axis first
    pub bands: Vec<u32>,
    /// Grouping tag label, when the strategy groups by tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Why an access point was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The AP has no location
    Unplaced,
    /// The AP's floor plan id is not in `floorPlans.json`
    UnknownFloor,
}

/// An access point the run did not rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAp {
    /// AP identifier
    pub ap_id: String,
    /// Current (unchanged) name
    pub name: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Per-floor statistics of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorSummary {
    /// Floor plan identifier
    pub floor_id: String,
    /// Floor plan name
    pub floor_name: String,
    /// Number of renamed APs
    pub ap_count: usize,
    /// Band count per banded axis, leading axis first
    pub band_counts: Vec<u32>,
}

/// Result of a rename run. Nothing is written until the plan is applied.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenamePlan {
    /// Strategy summary
    pub strategy: String,
    /// Renamed APs in naming order
    pub entries: Vec<RenameEntry>,
    /// APs left untouched
    pub skipped: Vec<SkippedAp>,
    /// Per-floor statistics, in floor document order
    pub floors: Vec<FloorSummary>,
}

impl RenamePlan {
    /// Entries whose name changes.
    pub fn changed(&self) -> impl Iterator<Item = &RenameEntry> {
        self.entries.iter().filter(|e| e.old_name != e.new_name)
    }

    /// New names assigned more than once, sorted.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates: Vec<String> = self
            .entries
            .iter()
            .filter(|e| !seen.insert(e.new_name.as_str()))
            .map(|e| e.new_name.clone())
            .collect();
        duplicates.sort();
        duplicates.dedup();
        duplicates
    }

    /// New name for an AP, if the plan renames it.
    pub fn name_for(&self, ap_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.ap_id == ap_id)
            .map(|e| e.new_name.as_str())
    }

    /// `(id, new name)` pairs, ready for [`Project::apply_names`].
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.ap_id.as_str(), e.new_name.as_str()))
    }
}

/// Computes new names for every placed AP of `project`.
///
/// Floors are processed in `floorPlans.json` order and `cancel` is checked
/// before each one; a cancelled run returns a [`Cancelled`] error and no
/// plan. The project itself is not modified.
pub fn rename_project(
    project: &Project,
    strategy: &Strategy,
    cancel: &CancelFlag,
) -> Result<RenamePlan> {
    strategy.validate()?;

    let tags = TagIds::resolve(project, strategy);
    let mut plan = RenamePlan {
        strategy: strategy.describe(),
        ..RenamePlan::default()
    };

    for ap in &project.access_points {
        let reason = match ap.floor_plan_id() {
            None => Some(SkipReason::Unplaced),
            Some(floor_id) if project.floor(floor_id).is_none() => {
                warn!(
                    "AP '{}' references unknown floor plan '{}'; leaving it unchanged",
                    ap.name, floor_id
                );
                Some(SkipReason::UnknownFloor)
            }
            Some(_) => None,
        };
        if let Some(reason) = reason {
            plan.skipped.push(SkippedAp {
                ap_id: ap.id.clone(),
                name: ap.name.clone(),
                reason,
            });
        }
    }

    let mut counters = Counters::new(strategy.scope);

    for floor in &project.floor_plans {
        if cancel.is_cancelled() {
            return Err(Cancelled.into());
        }

        let members: Vec<&AccessPoint> = project.placed_on(&floor.id).collect();
        if members.is_empty() {
            debug!(floor = %floor.name, "no placed APs");
            continue;
        }

        let ordered = order_floor(floor, &members, strategy, &tags)
            .with_context(|| format!("Failed to order APs on floor '{}'", floor.name))?;

        counters.start_floor();
        for member in &ordered.members {
            let ap = members[member.index];
            let tag_label = member.tag.as_ref().map_or("", TagValue::label);
            let seq = counters.next(member.tag.as_ref());
            plan.entries.push(RenameEntry {
                ap_id: ap.id.clone(),
                floor_id: floor.id.clone(),
                old_name: ap.name.clone(),
                new_name: strategy.template.render(seq, tag_label, &floor.name),
                bands: member.bands.clone(),
                tag: member.tag.as_ref().map(|t| t.label().to_string()),
            });
        }

        info!(
            floor = %floor.name,
            aps = members.len(),
            bands = ?ordered.band_counts,
            "ordered floor"
        );
        plan.floors.push(FloorSummary {
            floor_id: floor.id.clone(),
            floor_name: floor.name.clone(),
            ap_count: members.len(),
            band_counts: ordered.band_counts,
        });
    }

    Ok(plan)
}

/// Tag key ids resolved from the strategy's key names.
struct TagIds {
    group: Option<Option<String>>,
    by_name: BTreeMap<String, Option<String>>,
}

impl TagIds {
    fn resolve(project: &Project, strategy: &Strategy) -> Self {
        let mut by_name = BTreeMap::new();
        for name in strategy.tag_keys() {
            let id = project.tag_key_id(name).map(str::to_string);
            if id.is_none() {
                warn!("Tag key '{name}' not found in project; every AP sorts as untagged");
            }
            by_name.insert(name.to_string(), id);
        }

        let group = strategy
            .group_tag
            .as_ref()
            .map(|name| by_name.get(name).cloned().flatten());

        Self { group, by_name }
    }

    fn id_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).and_then(|id| id.as_deref())
    }
}

/// Sequence counters for one run.
struct Counters {
    scope: SequenceScope,
    shared: u32,
    per_tag: BTreeMap<TagValue, u32>,
}

impl Counters {
    const fn new(scope: SequenceScope) -> Self {
        Self {
            scope,
            shared: 0,
            per_tag: BTreeMap::new(),
        }
    }

    fn start_floor(&mut self) {
        if self.scope == SequenceScope::Floor {
            self.shared = 0;
        }
    }

    fn next(&mut self, tag: Option<&TagValue>) -> u32 {
        match (self.scope, tag) {
            (SequenceScope::Tag, Some(tag)) => {
                let counter = self.per_tag.entry(tag.clone()).or_insert(0);
                *counter += 1;
                *counter
            }
            _ => {
                self.shared += 1;
                self.shared
            }
        }
    }
}

/// One component of an in-band sort key.
#[derive(Debug, Clone)]
enum KeyPart {
    Number(f64),
    Text(String),
    Tag(TagValue),
}

impl KeyPart {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Tag(a), Self::Tag(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Full ordering key of one AP on a floor.
#[derive(Debug, Clone)]
struct OrderedMember {
    index: usize,
    tag: Option<TagValue>,
    bands: Vec<u32>,
    parts: Vec<KeyPart>,
    primary_value: f64,
}

impl OrderedMember {
    fn compare(&self, other: &Self) -> Ordering {
        self.tag
            .cmp(&other.tag)
            .then_with(|| self.bands.cmp(&other.bands))
            .then_with(|| {
                self.parts
                    .iter()
                    .zip(&other.parts)
                    .map(|(a, b)| a.compare(b))
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.primary_value.total_cmp(&other.primary_value))
    }
}

struct OrderedFloor {
    members: Vec<OrderedMember>,
    band_counts: Vec<u32>,
}

/// Bands and sorts the APs of one floor.
///
/// The sort is stable, so APs with identical keys keep collection order.
fn order_floor(
    floor: &FloorPlan,
    members: &[&AccessPoint],
    strategy: &Strategy,
    tags: &TagIds,
) -> Result<OrderedFloor> {
    let coords: Vec<_> = members
        .iter()
        .map(|ap| ap.coord().context("placed AP without coordinates"))
        .collect::<Result<_>>()?;

    let axes = strategy.banding.axes();
    let mut per_axis = Vec::with_capacity(axes.len());
    for axis in &axes {
        per_axis.push(cluster_floor(
            &coords,
            floor,
            *axis,
            strategy.threshold,
            strategy.anchor,
        )?);
    }
    let band_counts = per_axis.iter().map(|b| band_count(b)).collect();
    let primary = strategy.banding.primary();

    let mut ordered: Vec<OrderedMember> = members
        .iter()
        .enumerate()
        .map(|(index, ap)| OrderedMember {
            index,
            tag: tags.group.as_ref().map(|id| ap.tag_value(id.as_deref())),
            bands: per_axis.iter().map(|bands| bands[index]).collect(),
            parts: strategy
                .within
                .iter()
                .map(|key| match key {
                    SecondaryKey::Coordinate(axis) => KeyPart::Number(axis.value(coords[index])),
                    SecondaryKey::Model => KeyPart::Text(ap.model_label().to_string()),
                    SecondaryKey::Tag(name) => KeyPart::Tag(ap.tag_value(tags.id_for(name))),
                })
                .collect(),
            primary_value: primary.value(coords[index]),
        })
        .collect();

    ordered.sort_by(OrderedMember::compare);

    Ok(OrderedFloor {
        members: ordered,
        band_counts,
    })
}
