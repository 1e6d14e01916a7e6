//! Axes, thresholds and anchor policies for band clustering.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Coord, FloorPlan};

/// A coordinate axis on a floor plan image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal; bands are columns
    X,
    /// Vertical; bands are rows
    Y,
}

impl Axis {
    /// Reads this axis' component of a coordinate.
    pub const fn value(self, coord: Coord) -> f64 {
        match self {
            Self::X => coord.x,
            Self::Y => coord.y,
        }
    }

    /// The perpendicular axis.
    pub const fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// Floor extent along this axis (width for X, height for Y).
    pub const fn dimension(self, floor: &FloorPlan) -> f64 {
        match self {
            Self::X => floor.width,
            Self::Y => floor.height,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
        }
    }
}

impl FromStr for Axis {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            other => anyhow::bail!("Invalid axis '{other}'. Must be 'x' or 'y'"),
        }
    }
}

/// How a band's anchor moves as members are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPolicy {
    /// The first member anchors the band for its whole life; a point joins
    /// while its distance from that first member is within the threshold.
    #[default]
    Fixed,
    /// The anchor moves to every accepted member; a point joins while its
    /// distance from the previous member is within the threshold.
    Sliding,
}

impl fmt::Display for AnchorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Sliding => write!(f, "sliding"),
        }
    }
}

impl FromStr for AnchorPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "sliding" => Ok(Self::Sliding),
            other => anyhow::bail!("Invalid anchor policy '{other}'. Must be 'fixed' or 'sliding'"),
        }
    }
}

/// Maximum coordinate delta for two points to share a band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Floor extent along the clustering axis divided by `divisor`
    FloorFraction {
        /// Division factor (typically 10-40)
        divisor: f64,
    },
    /// Fixed distance in image pixels
    Absolute {
        /// Distance in pixels
        pixels: f64,
    },
}

impl Threshold {
    /// Validates the threshold parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::FloorFraction { divisor } => {
                if !divisor.is_finite() || divisor <= 0.0 {
                    anyhow::bail!("Threshold divisor must be a positive number, got {divisor}");
                }
            }
            Self::Absolute { pixels } => {
                if !pixels.is_finite() || pixels < 0.0 {
                    anyhow::bail!("Threshold must be a non-negative number of pixels, got {pixels}");
                }
            }
        }
        Ok(())
    }

    /// Resolves the threshold in pixels for one floor and axis.
    pub fn resolve(&self, axis: Axis, floor: &FloorPlan) -> Result<f64> {
        self.validate()?;
        match *self {
            Self::FloorFraction { divisor } => {
                let extent = axis.dimension(floor);
                if !extent.is_finite() || extent < 0.0 {
                    anyhow::bail!(
                        "Floor '{}' has an invalid {} extent: {}",
                        floor.name,
                        axis,
                        extent
                    );
                }
                Ok(extent / divisor)
            }
            Self::Absolute { pixels } => Ok(pixels),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FloorFraction { divisor } => write!(f, "floor extent / {divisor}"),
            Self::Absolute { pixels } => write!(f, "{pixels} px"),
        }
    }
}
