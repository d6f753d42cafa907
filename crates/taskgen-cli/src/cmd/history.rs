use crate::output::{print_json, print_table, truncate};
use anyhow::Context;
use std::path::Path;
use taskgen_core::config::Config;
use taskgen_core::history::History;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load taskgen.yaml")?;
    let records = History::open(config.history_path(root)).list();

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No specs generated yet.");
        return Ok(());
    }

    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.created_at.format("%Y-%m-%d %H:%M").to_string(),
                r.template.clone(),
                truncate(&r.goal, 40),
                r.stories.len().to_string(),
                r.tasks.len().to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "CREATED", "TEMPLATE", "GOAL", "STORIES", "TASKS"], rows);
    Ok(())
}
