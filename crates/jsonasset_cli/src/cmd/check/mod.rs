use std::path::PathBuf;

use jsonasset::asset::{AssetSession, CompareStatus, ExportFile, ImportOptions, ObjectWorld, OfflineResolver, Result};

use crate::cmd::util::{emit_json, load_registries, marshal_options};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub schema: PathBuf,
	/// Export file imported first to build the live world.
	#[arg(long)]
	pub against: PathBuf,
	#[arg(long, default_value = "/Game")]
	pub package: String,
	#[arg(long)]
	pub permissive: bool,
	#[arg(long)]
	pub json: bool,
}

/// Compare an export file against the world produced by importing a baseline.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		schema,
		against,
		package,
		permissive,
		json,
	} = args;

	let (types, serializers) = load_registries(&schema)?;
	let baseline = ExportFile::open(&against)?;
	let candidate = ExportFile::open(&path)?;

	let mut session = AssetSession::new(&types, &serializers, marshal_options(permissive, false));
	let mut world = ObjectWorld::new();
	let options = ImportOptions::for_package(&package);
	session.import(&baseline, &mut world, &mut OfflineResolver, &options)?;
	let entries = session.compare_with(&candidate, &world, &options)?;

	let rows: Vec<CheckRow> = entries
		.into_iter()
		.map(|entry| CheckRow {
			index: entry.index,
			type_name: entry.type_name,
			name: entry.name,
			status: entry.status,
		})
		.collect();
	let count = |status: CompareStatus| rows.iter().filter(|row| row.status == status).count();
	let summary = CheckSummary {
		unchanged: count(CompareStatus::Unchanged),
		changed: count(CompareStatus::Changed),
		missing: count(CompareStatus::Missing),
	};

	if json {
		emit_json(&CheckJson {
			path: path.display().to_string(),
			against: against.display().to_string(),
			summary,
			entries: rows,
		});
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("against: {}", against.display());
	println!(
		"unchanged: {} changed: {} missing: {}",
		summary.unchanged, summary.changed, summary.missing
	);
	for row in rows {
		println!("  [{}] {} {}: {}", row.index, row.type_name, row.name, status_label(row.status));
	}
	Ok(())
}

fn status_label(status: CompareStatus) -> &'static str {
	match status {
		CompareStatus::Unchanged => "unchanged",
		CompareStatus::Changed => "changed",
		CompareStatus::Missing => "missing",
	}
}

#[derive(serde::Serialize)]
struct CheckRow {
	index: usize,
	type_name: String,
	name: String,
	status: CompareStatus,
}

#[derive(Clone, Copy, serde::Serialize)]
struct CheckSummary {
	unchanged: usize,
	changed: usize,
	missing: usize,
}

#[derive(serde::Serialize)]
struct CheckJson {
	path: String,
	against: String,
	summary: CheckSummary,
	entries: Vec<CheckRow>,
}
