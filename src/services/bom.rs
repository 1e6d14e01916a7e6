//! Bill of materials: access point counts per model and floor.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;

use crate::models::Project;

/// Row label for APs without a location.
pub const UNPLACED_LABEL: &str = "(unplaced)";

/// Row label for APs on a floor plan id that does not exist.
pub const UNKNOWN_FLOOR_LABEL: &str = "(unknown floor)";

/// One `(floor, model, count)` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BomLine {
    /// Floor name, or one of the placeholder labels
    pub floor: String,
    /// Model label
    pub model: String,
    /// Number of APs
    pub count: usize,
}

/// AP counts grouped by floor and model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BillOfMaterials {
    /// Per-floor lines, sorted by floor then model
    pub lines: Vec<BomLine>,
    /// Project-wide count per model
    pub totals: BTreeMap<String, usize>,
    /// Total number of APs
    pub total: usize,
}

/// Counts every AP in the project.
pub fn build(project: &Project) -> BillOfMaterials {
    let mut per_floor: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut totals: BTreeMap<String, usize> = BTreeMap::new();

    for ap in &project.access_points {
        let floor = match ap.floor_plan_id() {
            None => UNPLACED_LABEL.to_string(),
            Some(id) => project
                .floor(id)
                .map_or_else(|| UNKNOWN_FLOOR_LABEL.to_string(), |f| f.name.clone()),
        };
        let model = ap.model_label().to_string();
        *per_floor.entry((floor, model.clone())).or_insert(0) += 1;
        *totals.entry(model).or_insert(0) += 1;
    }

    BillOfMaterials {
        lines: per_floor
            .into_iter()
            .map(|((floor, model), count)| BomLine {
                floor,
                model,
                count,
            })
            .collect(),
        totals,
        total: project.access_points.len(),
    }
}

impl BillOfMaterials {
    /// Renders an aligned text table.
    pub fn to_table(&self) -> String {
        let floor_width = self
            .lines
            .iter()
            .map(|l| l.floor.len())
            .chain(std::iter::once("Floor".len()))
            .max()
            .unwrap_or(0);
        let model_width = self
            .lines
            .iter()
            .map(|l| l.model.len())
            .chain(self.totals.keys().map(String::len))
            .chain(std::iter::once("Model".len()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(out, "{:<floor_width$}  {:<model_width$}  Count", "Floor", "Model");
        for line in &self.lines {
            let _ = writeln!(
                out,
                "{:<floor_width$}  {:<model_width$}  {}",
                line.floor, line.model, line.count
            );
        }
        out.push('\n');
        let _ = writeln!(out, "{:<model_width$}  Count", "Model");
        for (model, count) in &self.totals {
            let _ = writeln!(out, "{model:<model_width$}  {count}");
        }
        let _ = writeln!(out, "\nTotal APs: {}", self.total);
        out
    }

    /// Writes `floor,model,count` rows with a header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["floor", "model", "count"])
            .context("Failed to write CSV header")?;
        for line in &self.lines {
            csv.write_record([&line.floor, &line.model, &line.count.to_string()])
                .context("Failed to write CSV row")?;
        }
        csv.flush().context("Failed to flush CSV output")?;
        Ok(())
    }
}
