//! Partial strategy settings, as stored in the config file or given as flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::naming::NameTemplate;
use super::strategy::{SecondaryKey, SequenceScope, Strategy, StrategyKind};
use crate::cluster::{AnchorPolicy, Threshold};

/// Optional overrides on top of a strategy preset.
///
/// Every `None` field keeps the preset's value. Layers are combined with
/// [`StrategyOptions::overridden_by`] and turned into a [`Strategy`] with
/// [`StrategyOptions::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOptions {
    /// Preset to start from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,
    /// Floor-fraction threshold divisor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divisor: Option<f64>,
    /// Absolute threshold in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixels: Option<f64>,
    /// Anchor policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorPolicy>,
    /// Grouping tag key name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// In-band ordering keys (`x`, `y`, `model`, `tag:<key>`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within: Option<Vec<String>>,
    /// Name pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Sequence width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    /// Sequence scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SequenceScope>,
}

impl StrategyOptions {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    ///
    /// Divisor and pixels form one threshold setting: if `other` sets either,
    /// both are taken from `other`.
    #[must_use]
    pub fn overridden_by(self, other: Self) -> Self {
        let (divisor, pixels) = if other.divisor.is_some() || other.pixels.is_some() {
            (other.divisor, other.pixels)
        } else {
            (self.divisor, self.pixels)
        };

        Self {
            strategy: other.strategy.or(self.strategy),
            divisor,
            pixels,
            anchor: other.anchor.or(self.anchor),
            tag: other.tag.or(self.tag),
            within: other.within.or(self.within),
            pattern: other.pattern.or(self.pattern),
            width: other.width.or(self.width),
            scope: other.scope.or(self.scope),
        }
    }

    /// Builds the final strategy and validates it.
    pub fn resolve(&self) -> Result<Strategy> {
        let mut strategy = Strategy::preset(self.strategy.unwrap_or_default());

        match (self.divisor, self.pixels) {
            (Some(_), Some(_)) => {
                anyhow::bail!("Set either a threshold divisor or an absolute pixel threshold, not both")
            }
            (Some(divisor), None) => {
                strategy.threshold = Threshold::FloorFraction { divisor };
            }
            (None, Some(pixels)) => {
                strategy.threshold = Threshold::Absolute { pixels };
            }
            (None, None) => {}
        }

        if let Some(anchor) = self.anchor {
            strategy.anchor = anchor;
        }
        if let Some(tag) = &self.tag {
            strategy.group_tag = Some(tag.clone());
        }
        if let Some(within) = &self.within {
            strategy.within = within
                .iter()
                .map(|key| key.parse::<SecondaryKey>())
                .collect::<Result<_>>()?;
        }
        if self.pattern.is_some() || self.width.is_some() {
            let pattern = self
                .pattern
                .clone()
                .unwrap_or_else(|| strategy.template.pattern().to_string());
            let width = self.width.unwrap_or(strategy.template.width());
            strategy.template = NameTemplate::parse(&pattern, width)
                .with_context(|| format!("Invalid name pattern '{pattern}'"))?;
        }
        if let Some(scope) = self.scope {
            strategy.scope = scope;
        }

        strategy.validate()?;
        Ok(strategy)
    }
}
