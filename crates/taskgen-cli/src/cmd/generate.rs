use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use std::path::Path;
use taskgen_core::config::Config;
use taskgen_core::history::History;
use taskgen_core::service::SpecService;
use taskgen_core::types::ProjectRequest;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// What to build (e.g. "user authentication")
    #[arg(long)]
    pub goal: Option<String>,

    /// Who will use it (e.g. "customers")
    #[arg(long)]
    pub users: Option<String>,

    /// Project type: web, mobile, or internal
    #[arg(long, default_value = "web")]
    pub template: String,

    /// Constraints to plan around
    #[arg(long)]
    pub constraints: Option<String>,

    /// Known risks to mitigate
    #[arg(long)]
    pub risks: Option<String>,
}

impl From<GenerateArgs> for ProjectRequest {
    fn from(args: GenerateArgs) -> Self {
        ProjectRequest::from_parts(
            args.goal,
            args.users,
            Some(args.template),
            args.constraints,
            args.risks,
        )
    }
}

pub fn run(root: &Path, args: GenerateArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load taskgen.yaml")?;
    let service = SpecService::new(History::open(config.history_path(root)));
    let record = service.generate(args.into())?;

    if json {
        return print_json(&record);
    }

    println!("Spec {} ({})", record.id, record.template);
    println!();
    println!("User stories:");
    for (i, story) in record.stories.iter().enumerate() {
        println!("  {}. {story}", i + 1);
    }
    println!();
    println!("Engineering tasks:");
    for (i, task) in record.tasks.iter().enumerate() {
        println!("  {:>2}. {task}", i + 1);
    }
    Ok(())
}
