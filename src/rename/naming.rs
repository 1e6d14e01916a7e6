//! Name templates for renamed access points.

use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;

/// Default template for plain sequential names (`AP-001`).
pub const DEFAULT_PATTERN: &str = "AP-{seq}";

/// Default template for tag-prefixed names (`North-AP001`).
pub const TAG_PREFIXED_PATTERN: &str = "{tag}-AP{seq}";

/// Default zero-padding width of the sequence number.
pub const DEFAULT_WIDTH: usize = 3;

const MAX_WIDTH: usize = 9;
const PLACEHOLDERS: [&str; 3] = ["seq", "tag", "floor"];

/// A validated name pattern.
///
/// Placeholders:
/// - `{seq}`: sequence number, zero-padded to `width` (required)
/// - `{tag}`: value of the grouping tag
/// - `{floor}`: floor plan name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    pattern: String,
    width: usize,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Seq,
    Tag,
    Floor,
}

impl NameTemplate {
    /// Parses and validates a pattern.
    pub fn parse(pattern: &str, width: usize) -> Result<Self> {
        if width == 0 || width > MAX_WIDTH {
            anyhow::bail!("Sequence width must be between 1 and {MAX_WIDTH}, got {width}");
        }

        let placeholder = Regex::new(r"\{([^{}]*)\}").context("Invalid placeholder regex")?;
        let mut segments = Vec::new();
        let mut last = 0;
        for capture in placeholder.captures_iter(pattern) {
            let (Some(whole), Some(name)) = (capture.get(0), capture.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(pattern[last..whole.start()].to_string()));
            }
            segments.push(match name.as_str() {
                "seq" => Segment::Seq,
                "tag" => Segment::Tag,
                "floor" => Segment::Floor,
                other => anyhow::bail!(
                    "Unknown placeholder '{{{other}}}' in name pattern '{pattern}'. Allowed: {}",
                    PLACEHOLDERS.map(|p| format!("{{{p}}}")).join(", ")
                ),
            });
            last = whole.end();
        }
        if last < pattern.len() {
            segments.push(Segment::Literal(pattern[last..].to_string()));
        }

        if !segments.contains(&Segment::Seq) {
            anyhow::bail!("Name pattern '{pattern}' must contain {{seq}}");
        }

        Ok(Self {
            pattern: pattern.to_string(),
            width,
            segments,
        })
    }

    /// Plain `AP-{seq}` names with three digits.
    pub fn sequential() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            width: DEFAULT_WIDTH,
            segments: vec![Segment::Literal("AP-".to_string()), Segment::Seq],
        }
    }

    /// `{tag}-AP{seq}` names with three digits.
    pub fn tag_prefixed() -> Self {
        Self {
            pattern: TAG_PREFIXED_PATTERN.to_string(),
            width: DEFAULT_WIDTH,
            segments: vec![
                Segment::Tag,
                Segment::Literal("-AP".to_string()),
                Segment::Seq,
            ],
        }
    }

    /// The raw pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Zero-padding width of `{seq}`.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns true if the pattern uses `{tag}`.
    pub fn uses_tag(&self) -> bool {
        self.segments.contains(&Segment::Tag)
    }

    /// Renders a name. Substituted values are inserted verbatim, never
    /// re-scanned for placeholders.
    pub fn render(&self, seq: u32, tag: &str, floor: &str) -> String {
        let mut name = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => name.push_str(text),
                Segment::Seq => name.push_str(&format!("{:0width$}", seq, width = self.width)),
                Segment::Tag => name.push_str(tag),
                Segment::Floor => name.push_str(floor),
            }
        }
        name
    }
}

impl Default for NameTemplate {
    fn default() -> Self {
        Self::sequential()
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (width {})", self.pattern, self.width)
    }
}
