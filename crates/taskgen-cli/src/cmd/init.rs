use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use taskgen_core::config::Config;
use taskgen_core::paths;

/// Write `taskgen.yaml` with default settings. An existing file is left alone.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let path = paths::config_path(root);
    let created = !path.exists();
    if created {
        Config::default()
            .save(root)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if json {
        print_json(&serde_json::json!({
            "config": path,
            "created": created,
        }))?;
    } else if created {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists", path.display());
    }
    Ok(())
}
