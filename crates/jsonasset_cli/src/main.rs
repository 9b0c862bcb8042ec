#![allow(missing_docs)]

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod cmd;

#[derive(Parser)]
#[command(name = "jsonasset", about = "JSON asset export import and inspection tools")]
struct Cli {
	/// Raise log verbosity; overrides JSONASSET_LOG.
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// List export records of a file.
	Exports(cmd::exports::Args),
	/// List types declared by a schema.
	Types(cmd::types::Args),
	/// Import an export file into a fresh object world.
	Import(cmd::import::Args),
	/// Report which exports would change a previously imported baseline.
	Check(cmd::check::Args),
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_tracing(verbose: u8) {
	let level = match verbose {
		0 => None,
		1 => Some("info"),
		2 => Some("debug"),
		_ => Some("trace"),
	};
	let filter = match level {
		Some(level) => EnvFilter::new(level),
		None => EnvFilter::try_from_env("JSONASSET_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_target(false)
				.with_filter(filter),
		)
		.init();
}

fn run(command: Commands) -> jsonasset::asset::Result<()> {
	match command {
		Commands::Exports(args) => cmd::exports::run(args),
		Commands::Types(args) => cmd::types::run(args),
		Commands::Import(args) => cmd::import::run(args),
		Commands::Check(args) => cmd::check::run(args),
	}
}
