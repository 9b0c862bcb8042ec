use std::path::PathBuf;

use jsonasset::asset::{
	AssetSession, ExportFile, FailedPropertyRecord, ImportOptions, ObjectWorld, OfflineResolver, RemoteFetchQueue,
	RemoteImportRequest, Result, SoftReferenceResolver, Value,
};

use crate::cmd::util::{emit_json, load_registries, marshal_options};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub schema: PathBuf,
	#[arg(long, default_value = "/Game")]
	pub package: String,
	#[arg(long = "exclude")]
	pub exclude: Vec<String>,
	#[arg(long)]
	pub permissive: bool,
	#[arg(long)]
	pub no_soft: bool,
	/// Record missing soft references as failures instead of queueing remote imports.
	#[arg(long)]
	pub offline: bool,
	/// Write the imported objects back out as export records.
	#[arg(long)]
	pub roundtrip: bool,
	#[arg(long)]
	pub json: bool,
}

/// Import an export file into a fresh world and report what was created.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		schema,
		package,
		exclude,
		permissive,
		no_soft,
		offline,
		roundtrip,
		json,
	} = args;

	let (types, serializers) = load_registries(&schema)?;
	let file = ExportFile::open(&path)?;
	let options = ImportOptions {
		package_path: package,
		excluded_properties: exclude,
		..ImportOptions::default()
	};

	let mut session = AssetSession::new(&types, &serializers, marshal_options(permissive, no_soft));
	let mut world = ObjectWorld::new();
	let mut offline_resolver = OfflineResolver;
	let mut fetch = RemoteFetchQueue::with_default_accepted_types();
	let resolver: &mut dyn SoftReferenceResolver = if offline { &mut offline_resolver } else { &mut fetch };
	let report = session.import(&file, &mut world, resolver, &options)?;

	let mut created = Vec::with_capacity(report.created.len());
	for item in &report.created {
		let object = world.get(item.id)?;
		created.push(CreatedRow {
			index: item.index,
			class: types.name_of(object.class).to_owned(),
			name: object.name.clone(),
			path: world.path_of(item.id)?,
		});
	}

	let exports = if roundtrip {
		let roots: Vec<_> = report.created.iter().map(|item| item.id).collect();
		Some(session.export_objects(&world, &roots)?)
	} else {
		None
	};

	let payload = ImportJson {
		path: path.display().to_string(),
		created,
		skipped: report.skipped,
		failed: report.failed,
		queued: fetch.drain(),
		exports,
	};

	if json {
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", payload.path);
	println!("created: {}", payload.created.len());
	for row in &payload.created {
		println!("  [{}] {} {} ({})", row.index, row.class, row.name, row.path);
	}
	println!("skipped: {:?}", payload.skipped);
	println!("failed: {}", payload.failed.len());
	for record in &payload.failed {
		println!("  {} ({}) {}", record.type_name, record.super_type_name, record.source_path);
	}
	println!("queued: {}", payload.queued.len());
	for request in &payload.queued {
		println!("  {} {} {}", request.class_name, request.asset_name, request.package_path);
	}
	if let Some(exports) = &payload.exports {
		emit_json(exports);
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct CreatedRow {
	index: usize,
	class: String,
	name: String,
	path: String,
}

#[derive(serde::Serialize)]
struct ImportJson {
	path: String,
	created: Vec<CreatedRow>,
	skipped: Vec<usize>,
	failed: Vec<FailedPropertyRecord>,
	queued: Vec<RemoteImportRequest>,
	#[serde(skip_serializing_if = "Option::is_none")]
	exports: Option<Vec<Value>>,
}
