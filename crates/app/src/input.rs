use anyhow::{Context, Result};
use lineage_data::{FamilyGraph, PeopleFile, UnionsFile};
use lineage_layout::LayeredLayout;
use std::fs;
use std::path::Path;
use tracing::debug;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Load the family graph from the people and marriages JSON files
pub fn load_graph(people: &Path, unions: &Path) -> Result<FamilyGraph> {
    let people = read(people)?;
    let unions = read(unions)?;
    parse_graph(&people, &unions)
}

pub fn parse_graph(people: &str, unions: &str) -> Result<FamilyGraph> {
    let people: PeopleFile = serde_json::from_str(people).context("Invalid people file")?;
    let unions: UnionsFile = serde_json::from_str(unions).context("Invalid marriages file")?;
    debug!(
        "Loaded {} people and {} marriages",
        people.people.len(),
        unions.unions.len()
    );
    FamilyGraph::from_records(people.people, unions.unions).context("Inconsistent family records")
}

/// Load a RON layout configuration, missing fields taking their defaults
pub fn load_config(path: &Path) -> Result<LayeredLayout> {
    let text = read(path)?;
    ron::from_str(&text).with_context(|| format!("Invalid layout configuration in {}", path.display()))
}
