//! Renaming strategies.
//!
//! A strategy fixes every choice a rename run makes: which axis (or axes)
//! to band on, how far apart points may be within a band, how points are
//! ordered inside a band, and how sequence numbers become names. Strategies
//! start from one of a closed set of named presets ([`StrategyKind`]) and
//! can then be adjusted field by field.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::naming::NameTemplate;
use crate::cluster::{AnchorPolicy, Axis, Threshold};

/// Default division factor for floor-relative thresholds.
pub const DEFAULT_DIVISOR: f64 = 20.0;

/// Default absolute threshold, in pixels, for the `dynamic` preset.
pub const DEFAULT_PIXELS: f64 = 100.0;

/// Which bands a strategy builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banding {
    /// Bands along one axis only
    Single(Axis),
    /// Bands along both axes; `primary` bands are ordered first
    Grid {
        /// Axis whose bands lead the ordering
        primary: Axis,
    },
}

impl Banding {
    /// Axes to cluster on, leading axis first.
    pub fn axes(self) -> Vec<Axis> {
        match self {
            Self::Single(axis) => vec![axis],
            Self::Grid { primary } => vec![primary, primary.other()],
        }
    }

    /// The leading axis.
    pub const fn primary(self) -> Axis {
        match self {
            Self::Single(axis) | Self::Grid { primary: axis } => axis,
        }
    }
}

impl fmt::Display for Banding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(axis) => write!(f, "{axis} bands"),
            Self::Grid { primary } => write!(f, "{primary} then {} bands", primary.other()),
        }
    }
}

/// Orders points inside a band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryKey {
    /// Coordinate along an axis, ascending
    Coordinate(Axis),
    /// Model name, ascending
    Model,
    /// Value of a user tag, by key name (untagged last)
    Tag(String),
}

impl fmt::Display for SecondaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coordinate(axis) => write!(f, "{axis}"),
            Self::Model => write!(f, "model"),
            Self::Tag(key) => write!(f, "tag:{key}"),
        }
    }
}

impl FromStr for SecondaryKey {
    type Err = anyhow::Error;

    /// Parses `x`, `y`, `model` or `tag:<key name>`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(key) = s.strip_prefix("tag:") {
            if key.trim().is_empty() {
                anyhow::bail!("Tag sort key needs a key name, e.g. 'tag:Building'");
            }
            return Ok(Self::Tag(key.trim().to_string()));
        }
        match s.to_lowercase().as_str() {
            "model" => Ok(Self::Model),
            other => other
                .parse::<Axis>()
                .map(Self::Coordinate)
                .map_err(|_| anyhow::anyhow!("Invalid sort key '{s}'. Use x, y, model or tag:<key>")),
        }
    }
}

/// Where sequence numbers restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceScope {
    /// Restart at 1 on every floor
    Floor,
    /// One counter for the whole project, floors in document order
    #[default]
    Project,
    /// One counter per grouping-tag value
    Tag,
}

impl fmt::Display for SequenceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floor => write!(f, "floor"),
            Self::Project => write!(f, "project"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

impl FromStr for SequenceScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "floor" => Ok(Self::Floor),
            "project" => Ok(Self::Project),
            "tag" => Ok(Self::Tag),
            other => anyhow::bail!("Invalid scope '{other}'. Must be 'floor', 'project' or 'tag'"),
        }
    }
}

/// Named strategy presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Columns left to right, top to bottom inside a column
    Columns,
    /// Rows top to bottom, left to right inside a row
    #[default]
    Rows,
    /// Rows, then columns inside each row
    Grid,
    /// Rows per grouping-tag value, names prefixed with the tag
    TagRows,
    /// Rows, grouped by model inside each row
    ModelRows,
    /// Rows with a fixed pixel threshold instead of a floor fraction
    Dynamic,
}

impl StrategyKind {
    /// Every preset, in display order.
    pub const ALL: [Self; 6] = [
        Self::Columns,
        Self::Rows,
        Self::Grid,
        Self::TagRows,
        Self::ModelRows,
        Self::Dynamic,
    ];

    /// Preset name as used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Columns => "columns",
            Self::Rows => "rows",
            Self::Grid => "grid",
            Self::TagRows => "tag-rows",
            Self::ModelRows => "model-rows",
            Self::Dynamic => "dynamic",
        }
    }

    /// One-line description.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Columns => "Band on x (columns), order by y inside each column",
            Self::Rows => "Band on y (rows), order by x inside each row",
            Self::Grid => "Band on y, then on x inside each row",
            Self::TagRows => "Group by a tag value, then band on y; names are prefixed with the tag",
            Self::ModelRows => "Band on y, order by model then x inside each row",
            Self::Dynamic => "Band on y with an absolute pixel threshold",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|k| k.name()).collect();
                anyhow::anyhow!("Unknown strategy '{s}'. Available: {}", names.join(", "))
            })
    }
}

/// A fully resolved renaming configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    /// Preset this strategy started from
    pub kind: StrategyKind,
    /// Axes to band on
    pub banding: Banding,
    /// Band threshold
    pub threshold: Threshold,
    /// Anchor policy for every banded axis
    pub anchor: AnchorPolicy,
    /// In-band ordering, most significant first
    pub within: Vec<SecondaryKey>,
    /// Tag key name whose value leads the ordering and fills `{tag}`
    pub group_tag: Option<String>,
    /// Name template
    pub template: NameTemplate,
    /// Where sequence numbers restart
    pub scope: SequenceScope,
}

impl Strategy {
    /// Builds the preset configuration for `kind`.
    pub fn preset(kind: StrategyKind) -> Self {
        let floor_fraction = Threshold::FloorFraction {
            divisor: DEFAULT_DIVISOR,
        };
        let base = Self {
            kind,
            banding: Banding::Single(Axis::Y),
            threshold: floor_fraction,
            anchor: AnchorPolicy::Fixed,
            within: vec![SecondaryKey::Coordinate(Axis::X)],
            group_tag: None,
            template: NameTemplate::sequential(),
            scope: SequenceScope::Project,
        };

        match kind {
            StrategyKind::Columns => Self {
                banding: Banding::Single(Axis::X),
                within: vec![SecondaryKey::Coordinate(Axis::Y)],
                ..base
            },
            StrategyKind::Rows => base,
            StrategyKind::Grid => Self {
                banding: Banding::Grid { primary: Axis::Y },
                ..base
            },
            StrategyKind::TagRows => Self {
                template: NameTemplate::tag_prefixed(),
                scope: SequenceScope::Tag,
                ..base
            },
            StrategyKind::ModelRows => Self {
                within: vec![SecondaryKey::Model, SecondaryKey::Coordinate(Axis::X)],
                ..base
            },
            StrategyKind::Dynamic => Self {
                threshold: Threshold::Absolute {
                    pixels: DEFAULT_PIXELS,
                },
                ..base
            },
        }
    }

    /// Sets the threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the anchor policy.
    #[must_use]
    pub const fn with_anchor(mut self, anchor: AnchorPolicy) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the grouping tag.
    #[must_use]
    pub fn with_group_tag(mut self, key_name: impl Into<String>) -> Self {
        self.group_tag = Some(key_name.into());
        self
    }

    /// Replaces the in-band ordering.
    #[must_use]
    pub fn with_within(mut self, within: Vec<SecondaryKey>) -> Self {
        self.within = within;
        self
    }

    /// Sets the name template.
    #[must_use]
    pub fn with_template(mut self, template: NameTemplate) -> Self {
        self.template = template;
        self
    }

    /// Sets the sequence scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: SequenceScope) -> Self {
        self.scope = scope;
        self
    }

    /// Checks that the settings fit together.
    pub fn validate(&self) -> Result<()> {
        self.threshold.validate()?;

        if self.group_tag.is_none() {
            if self.kind == StrategyKind::TagRows {
                anyhow::bail!(
                    "Strategy '{}' needs a tag key to group by (--tag <KEY>)",
                    self.kind
                );
            }
            if self.scope == SequenceScope::Tag {
                anyhow::bail!("Sequence scope 'tag' needs a tag key to group by (--tag <KEY>)");
            }
            if self.template.uses_tag() {
                anyhow::bail!(
                    "Name pattern '{}' uses {{tag}} but no tag key is set (--tag <KEY>)",
                    self.template.pattern()
                );
            }
        }

        if let Some(tag) = &self.group_tag {
            if tag.trim().is_empty() {
                anyhow::bail!("Tag key name must not be empty");
            }
        }

        Ok(())
    }

    /// Tag key names this strategy reads, grouping tag first.
    pub fn tag_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.group_tag.iter().map(String::as_str).collect();
        for key in &self.within {
            if let SecondaryKey::Tag(name) = key {
                if !keys.contains(&name.as_str()) {
                    keys.push(name);
                }
            }
        }
        keys
    }

    /// Human-readable summary.
    pub fn describe(&self) -> String {
        let within: Vec<String> = self.within.iter().map(ToString::to_string).collect();
        let mut text = format!(
            "{} ({}, threshold {}, {} anchor, within [{}], names {}, per {})",
            self.kind,
            self.banding,
            self.threshold,
            self.anchor,
            within.join(", "),
            self.template.pattern(),
            self.scope
        );
        if let Some(tag) = &self.group_tag {
            text.push_str(&format!(", grouped by tag '{tag}'"));
        }
        text
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::preset(StrategyKind::default())
    }
}
