use std::path::PathBuf;

use jsonasset::asset::{AssetError, Kind, Result, SerializerRegistry, TypeDef, TypeIdx, TypeRegistry, should_include};

use crate::cmd::util::{emit_json, load_registries};

#[derive(clap::Args)]
pub struct Args {
	#[arg(long)]
	pub schema: PathBuf,
	#[arg(long)]
	pub name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List schema types, or the flattened fields of one type.
pub fn run(args: Args) -> Result<()> {
	let Args { schema, name, json } = args;
	let (types, serializers) = load_registries(&schema)?;

	match name {
		Some(name) => show_type(&types, &serializers, &name, json),
		None => {
			list_types(&types, json);
			Ok(())
		}
	}
}

fn list_types(types: &TypeRegistry, json: bool) {
	let rows: Vec<TypeRow> = types.iter().map(|(_, def)| TypeRow::new(types, def)).collect();
	if json {
		emit_json(&TypesJson {
			type_count: rows.len(),
			types: rows,
		});
		return;
	}

	println!("type_count: {}", rows.len());
	for row in rows {
		let parent = row.super_type.map(|name| format!(" : {name}")).unwrap_or_default();
		println!("  {} {}{parent} ({} {})", row.category, row.name, row.member_count, row.member_label);
	}
}

fn show_type(types: &TypeRegistry, serializers: &SerializerRegistry, name: &str, json: bool) -> Result<()> {
	let idx = types.require(name)?;
	let def = match types.get(idx)? {
		TypeDef::Struct(def) => def,
		TypeDef::Enum(def) => {
			return show_enum(def.name.as_ref(), &def.members, json);
		}
		TypeDef::Interface(_) => {
			return Err(AssetError::WrongTypeCategory {
				name: name.to_owned(),
				expected: "struct",
			});
		}
	};

	let fields: Vec<FieldRow> = def
		.fields
		.iter()
		.map(|field| FieldRow {
			name: field.name.to_string(),
			kind: render_kind(types, &field.kind),
			array_dim: field.array_dim,
			owner: types.name_of(field.owner).to_owned(),
			transient: field.flags.transient,
			editor_only: field.flags.editor_only,
			deprecated: field.flags.deprecated,
			blacklisted: serializers.is_blacklisted(field),
			included: should_include(serializers, field),
			custom_codec: match field.kind {
				Kind::Struct(inner) => serializers.has_custom(inner),
				_ => false,
			},
		})
		.collect();

	if json {
		emit_json(&TypeDetailJson {
			name: def.name.to_string(),
			is_class: def.is_class,
			super_type: def.super_type.map(|parent| types.name_of(parent).to_owned()),
			interfaces: def.interfaces.iter().map(|item| types.name_of(*item).to_owned()).collect(),
			fields,
		});
		return Ok(());
	}

	println!("name: {}", def.name);
	println!("category: {}", if def.is_class { "class" } else { "struct" });
	println!("super: {}", types.super_name(idx));
	println!("fields:");
	for field in fields {
		let dim = if field.array_dim > 1 { format!("[{}]", field.array_dim) } else { String::new() };
		let skipped = if field.included { "" } else { " (excluded)" };
		println!("  {}{dim}: {} (owner={}){skipped}", field.name, field.kind, field.owner);
	}
	Ok(())
}

fn show_enum(name: &str, members: &[(Box<str>, i64)], json: bool) -> Result<()> {
	if json {
		emit_json(&EnumJson {
			name: name.to_owned(),
			members: members.iter().map(|(member, value)| (member.to_string(), *value)).collect(),
		});
		return Ok(());
	}

	println!("name: {name}");
	println!("category: enum");
	for (member, value) in members {
		println!("  {member} = {value}");
	}
	Ok(())
}

/// Render a kind with the names of the types it references.
pub(crate) fn render_kind(types: &TypeRegistry, kind: &Kind) -> String {
	let named = |label: &str, idx: TypeIdx| format!("{label}<{}>", types.name_of(idx));
	match kind {
		Kind::Byte { enum_type: Some(idx) } => named("Byte", *idx),
		Kind::Enum { enum_type } => named("Enum", *enum_type),
		Kind::Struct(idx) => named("Struct", *idx),
		Kind::Object { class } => named("Object", *class),
		Kind::Interface { interface } => named("Interface", *interface),
		Kind::SoftObject { class } => named("SoftObject", *class),
		Kind::Map { key, value } => format!("Map<{}, {}>", render_kind(types, key), render_kind(types, value)),
		Kind::Set(elem) => format!("Set<{}>", render_kind(types, elem)),
		Kind::Array(elem) => format!("Array<{}>", render_kind(types, elem)),
		other => other.label().to_owned(),
	}
}

#[derive(serde::Serialize)]
struct TypeRow {
	name: String,
	category: &'static str,
	super_type: Option<String>,
	member_count: usize,
	member_label: &'static str,
}

impl TypeRow {
	fn new(types: &TypeRegistry, def: &TypeDef) -> Self {
		let (category, super_type, member_count, member_label) = match def {
			TypeDef::Struct(item) => (
				if item.is_class { "class" } else { "struct" },
				item.super_type.map(|parent| types.name_of(parent).to_owned()),
				item.fields.len(),
				"fields",
			),
			TypeDef::Enum(item) => ("enum", None, item.members.len(), "members"),
			TypeDef::Interface(_) => ("interface", None, 0, "fields"),
		};
		Self {
			name: def.name().to_owned(),
			category,
			super_type,
			member_count,
			member_label,
		}
	}
}

#[derive(serde::Serialize)]
struct TypesJson {
	type_count: usize,
	types: Vec<TypeRow>,
}

#[derive(serde::Serialize)]
struct FieldRow {
	name: String,
	kind: String,
	array_dim: usize,
	owner: String,
	transient: bool,
	editor_only: bool,
	deprecated: bool,
	blacklisted: bool,
	included: bool,
	custom_codec: bool,
}

#[derive(serde::Serialize)]
struct TypeDetailJson {
	name: String,
	is_class: bool,
	super_type: Option<String>,
	interfaces: Vec<String>,
	fields: Vec<FieldRow>,
}

#[derive(serde::Serialize)]
struct EnumJson {
	name: String,
	members: Vec<(String, i64)>,
}
