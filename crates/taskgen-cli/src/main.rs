mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::generate::GenerateArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "taskgen",
    about = "Expand a project description into user stories and engineering tasks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from taskgen.yaml or .git/)
    #[arg(long, global = true, env = "TASKGEN_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default taskgen.yaml in the project root
    Init,

    /// Run the HTTP API
    Serve {
        /// Port to listen on (default: taskgen.yaml, then PORT, then 5001)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
    },

    /// Generate stories and tasks and record them in history
    Generate(GenerateArgs),

    /// Show the most recent generations, newest first
    History,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Serve { port, bind } => cmd::serve::run(&root, port, bind),
        Commands::Generate(args) => cmd::generate::run(&root, args, cli.json),
        Commands::History => cmd::history::run(&root, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
