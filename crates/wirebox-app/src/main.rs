//! wirebox CLI
//!
//! Loads a container file, compiles it and either prints the compiled
//! container (`resolve`) or a summary of the inheritance chains created for
//! each definition (`check`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use tracing::info;
use wirebox::loader::{self, ContainerFormat};
use wirebox::{ContainerBuilder, ContainerFile, Definition, is_synthetic_id};

#[derive(Parser)]
#[command(name = "wirebox")]
#[command(author, version, about = "Compile service container files")]
struct Cli {
	/// Log debug output for every definition touched
	#[arg(short, long, global = true)]
	verbose: bool,

	/// Emit logs as JSON lines
	#[arg(long, global = true)]
	json_logs: bool,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Compile a container file and print the result
	Resolve {
		/// Input file (.json, .yaml or .yml)
		file: PathBuf,

		/// Output format, defaults to the input format
		#[arg(short, long)]
		format: Option<ContainerFormat>,
	},

	/// Compile a container file and report the resolved parent chains
	Check {
		/// Input file (.json, .yaml or .yml)
		file: PathBuf,
	},
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose, cli.json_logs);

	match cli.command {
		Commands::Resolve { file, format } => {
			let format = match format {
				Some(format) => format,
				None => ContainerFormat::from_path(&file)?,
			};
			let builder = compile(&file)?;
			let out = loader::to_string(&ContainerFile::from_builder(&builder), format)?;
			println!("{}", out.trim_end());
		},
		Commands::Check { file } => {
			let builder = compile(&file)?;
			let rewritten = rewritten_ids(&builder);
			let synthetic = builder.definitions().keys().filter(|id| is_synthetic_id(id)).count();

			println!("{}: {} definitions, {} synthetic", file.display(), builder.len(), synthetic);
			for id in &rewritten {
				println!("  {} -> {}", id, parent_chain(&builder, id).iter().join(" -> "));
			}
			println!("{} definitions received instanceof parents", rewritten.len());
		},
	}

	Ok(())
}

fn compile(file: &Path) -> Result<ContainerBuilder> {
	let mut builder = loader::load_builder(file).with_context(|| format!("failed to load {}", file.display()))?;
	builder
		.compile()
		.with_context(|| format!("failed to compile {}", file.display()))?;
	info!(target: "wirebox", definitions = builder.len(), "container compiled");
	Ok(builder)
}

/// User definitions whose parent is now a synthetic chain link
fn rewritten_ids(builder: &ContainerBuilder) -> Vec<&str> {
	builder
		.definitions()
		.iter()
		.filter(|(id, def)| !is_synthetic_id(id) && def.parent().is_some_and(is_synthetic_id))
		.map(|(id, _)| id.as_str())
		.collect_vec()
}

/// Parent ids of `id`, nearest first
fn parent_chain<'a>(builder: &'a ContainerBuilder, id: &str) -> Vec<&'a str> {
	let mut chain: Vec<&'a str> = Vec::new();
	let mut next = builder.definition(id).and_then(Definition::parent);
	while let Some(parent) = next {
		if chain.contains(&parent) {
			break;
		}
		chain.push(parent);
		next = builder.definition(parent).and_then(Definition::parent);
	}
	chain
}

fn setup_tracing(verbose: bool, json: bool) {
	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("wirebox=debug,info")
		} else {
			EnvFilter::new("wirebox=warn,warn")
		}
	});

	let registry = tracing_subscriber::registry().with(filter);
	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}
}
