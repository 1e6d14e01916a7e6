//! Inspect command: list floors and access points of a project.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::constants::{
    ACCESS_POINTS_JSON, FLOOR_PLANS_JSON, NOTES_JSON, PROJECT_CONFIGURATION_JSON,
    SIMULATED_RADIOS_JSON, TAG_KEYS_JSON,
};
use crate::models::{AccessPoint, Project};
use crate::services::ProjectService;
use clap::Args;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Show floors and access points of a project
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Project file (.esx) or unpacked project directory
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only show one floor (name or id)
    #[arg(short, long, value_name = "NAME")]
    pub floor: Option<String>,

    /// Only show APs whose name matches this regular expression
    #[arg(short = 'm', long = "match", value_name = "REGEX")]
    pub name_match: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

const KNOWN_DOCUMENTS: [&str; 6] = [
    PROJECT_CONFIGURATION_JSON,
    FLOOR_PLANS_JSON,
    ACCESS_POINTS_JSON,
    SIMULATED_RADIOS_JSON,
    TAG_KEYS_JSON,
    NOTES_JSON,
];

#[derive(Debug, Serialize)]
struct InspectOutput {
    path: String,
    documents: Vec<&'static str>,
    images: usize,
    tag_keys: Vec<String>,
    floors: Vec<FloorOutput>,
    access_points: Vec<ApOutput>,
}

#[derive(Debug, Serialize)]
struct FloorOutput {
    id: String,
    name: String,
    width: f64,
    height: f64,
    ap_count: usize,
}

#[derive(Debug, Serialize)]
struct ApOutput {
    id: String,
    name: String,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    tags: BTreeMap<String, String>,
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self) -> CliResult<()> {
        let pattern = self
            .name_match
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| CliError::validation(format!("Invalid --match pattern: {e}")))?;

        let (source, project) =
            ProjectService::load(&self.file).map_err(|e| CliError::from_error(&e))?;

        let floor_id = match &self.floor {
            None => None,
            Some(wanted) => Some(
                project
                    .floor_plans
                    .iter()
                    .find(|f| f.id == *wanted || f.name.eq_ignore_ascii_case(wanted))
                    .map(|f| f.id.clone())
                    .ok_or_else(|| CliError::validation(format!("Floor '{wanted}' not found")))?,
            ),
        };

        let output = InspectOutput {
            path: self.file.display().to_string(),
            documents: KNOWN_DOCUMENTS
                .into_iter()
                .filter(|name| source.has_document(name))
                .collect(),
            images: source.image_count().map_err(|e| CliError::from_error(&e))?,
            tag_keys: project.tag_keys.iter().map(|k| k.key.clone()).collect(),
            floors: project
                .floor_plans
                .iter()
                .filter(|f| floor_id.as_ref().map_or(true, |id| *id == f.id))
                .map(|f| FloorOutput {
                    id: f.id.clone(),
                    name: f.name.clone(),
                    width: f.width,
                    height: f.height,
                    ap_count: project.placed_on(&f.id).count(),
                })
                .collect(),
            access_points: project
                .access_points
                .iter()
                .filter(|ap| floor_id.is_none() || ap.floor_plan_id() == floor_id.as_deref())
                .filter(|ap| pattern.as_ref().map_or(true, |re| re.is_match(&ap.name)))
                .map(|ap| ap_output(&project, ap))
                .collect(),
        };

        if self.json {
            print_json(&output)?;
        } else {
            print_human(&output);
        }

        Ok(())
    }
}

fn ap_output(project: &Project, ap: &AccessPoint) -> ApOutput {
    let floor = ap.floor_plan_id().map(|id| {
        project
            .floor(id)
            .map_or_else(|| id.to_string(), |f| f.name.clone())
    });
    let tags = ap
        .tags
        .iter()
        .map(|tag| {
            let key = project
                .tag_keys
                .iter()
                .find(|k| k.id == tag.tag_key_id)
                .map_or_else(|| tag.tag_key_id.clone(), |k| k.key.clone());
            (key, tag.value.clone())
        })
        .collect();

    ApOutput {
        id: ap.id.clone(),
        name: ap.name.clone(),
        model: ap.model_label().to_string(),
        floor,
        x: ap.coord().map(|c| c.x),
        y: ap.coord().map(|c| c.y),
        tags,
    }
}

fn print_human(output: &InspectOutput) {
    println!("Project: {}", output.path);
    println!("Documents: {}", output.documents.join(", "));
    println!("Images: {}", output.images);
    if !output.tag_keys.is_empty() {
        println!("Tag keys: {}", output.tag_keys.join(", "));
    }
    println!();

    println!("Floors ({}):", output.floors.len());
    for floor in &output.floors {
        println!(
            "  {} [{}] {}x{} px, {} APs",
            floor.name, floor.id, floor.width, floor.height, floor.ap_count
        );
    }
    println!();

    println!("Access points ({}):", output.access_points.len());
    for ap in &output.access_points {
        let position = match (&ap.floor, ap.x, ap.y) {
            (Some(floor), Some(x), Some(y)) => format!("{floor} @ ({x:.1}, {y:.1})"),
            _ => "unplaced".to_string(),
        };
        let tags: Vec<String> = ap.tags.iter().map(|(k, v)| format!("{k}={v}")).collect();
        if tags.is_empty() {
            println!("  {:<24} {:<16} {}", ap.name, ap.model, position);
        } else {
            println!(
                "  {:<24} {:<16} {} [{}]",
                ap.name,
                ap.model,
                position,
                tags.join(", ")
            );
        }
    }
}
