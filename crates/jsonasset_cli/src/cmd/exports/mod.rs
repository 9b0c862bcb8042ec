use std::path::PathBuf;

use jsonasset::asset::{ExportFile, Result, Value, is_proper_export};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long = "type")]
	pub type_name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List export records with their class, name, and outer.
pub fn run(args: Args) -> Result<()> {
	let Args { path, type_name, json } = args;
	let file = ExportFile::open(&path)?;

	let rows: Vec<ExportRow> = file
		.exports
		.iter()
		.enumerate()
		.filter(|(_, export)| type_name.as_deref().is_none_or(|wanted| export.get_str("Type") == Some(wanted)))
		.map(|(index, export)| ExportRow::from_export(index, export))
		.collect();

	if json {
		emit_json(&ExportsJson {
			path: path.display().to_string(),
			compression: file.compression.as_str(),
			export_count: file.len(),
			exports: rows,
		});
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("compression: {}", file.compression.as_str());
	println!("export_count: {}", file.len());
	for row in rows {
		let outer = row.outer.as_deref().map(|outer| format!(" outer={outer}")).unwrap_or_default();
		let marker = if row.proper { "" } else { " (no properties)" };
		println!(
			"  [{}] {} {}{outer} properties={}{marker}",
			row.index,
			row.type_name.as_deref().unwrap_or("-"),
			row.name.as_deref().unwrap_or("-"),
			row.property_count
		);
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct ExportRow {
	index: usize,
	type_name: Option<String>,
	name: Option<String>,
	outer: Option<String>,
	proper: bool,
	property_count: usize,
}

impl ExportRow {
	fn from_export(index: usize, export: &Value) -> Self {
		let text = |key: &str| export.get_str(key).map(str::to_owned);
		Self {
			index,
			type_name: text("Type"),
			name: text("Name"),
			outer: text("Outer"),
			proper: is_proper_export(export),
			property_count: export.get("Properties").and_then(Value::as_object).map_or(0, |properties| properties.len()),
		}
	}
}

#[derive(serde::Serialize)]
struct ExportsJson {
	path: String,
	compression: &'static str,
	export_count: usize,
	exports: Vec<ExportRow>,
}

#[cfg(test)]
mod tests;
