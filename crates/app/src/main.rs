mod input;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lineage_data::PersonId;
use lineage_layout::{LayeredLayout, LayoutEngine};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with the people, `{"People": [...]}`
    #[arg(long)]
    people: PathBuf,

    /// JSON file with the marriages, `{"Marriages": [...]}`
    #[arg(long)]
    unions: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lay out the family around a focus person
    Layout {
        /// Id of the focus person
        #[arg(long)]
        center: u64,

        #[arg(long)]
        max_up: Option<u32>,

        #[arg(long)]
        max_down: Option<u32>,

        #[arg(long)]
        max_nodes: Option<usize>,

        #[arg(long)]
        sweeps: Option<usize>,

        /// RON file with a layout configuration
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Export the whole graph in DOT format
    Dot,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Ron,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let graph = input::load_graph(&args.people, &args.unions)?;

    match args.command {
        Command::Layout {
            center,
            max_up,
            max_down,
            max_nodes,
            sweeps,
            config,
            format,
        } => {
            let mut engine = match config {
                Some(path) => input::load_config(&path)?,
                None => LayeredLayout::default(),
            };
            engine.max_up = max_up.unwrap_or(engine.max_up);
            engine.max_down = max_down.unwrap_or(engine.max_down);
            engine.max_nodes = max_nodes.unwrap_or(engine.max_nodes);
            engine.sweeps = sweeps.unwrap_or(engine.sweeps);
            debug!("Layout configuration: {engine:?}");

            let layout = engine
                .layout(&graph, PersonId(center))
                .with_context(|| format!("Failed to lay out the family of {center}"))?;
            let output = match format {
                Format::Json => serde_json::to_string_pretty(&layout)?,
                Format::Ron => ron::ser::to_string_pretty(&layout, ron::ser::PrettyConfig::default())?,
            };
            println!("{output}");
        }
        Command::Dot => print!("{}", graph.to_dot().context("Failed to render DOT")?),
    }

    Ok(())
}
