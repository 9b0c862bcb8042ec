use crate::asset::data::{PropertyValue, SoftObjectPath, StructData};
use crate::asset::export::ExportReference;
use crate::asset::marshal::MarshalEnv;
use crate::asset::text::TextValue;
use crate::asset::types::{Kind, TypeIdx, TypeRegistry};
use crate::asset::value::Value;
use crate::asset::world::{ObjectId, ObjectWorld};
use crate::asset::{AssetError, Result};

pub(super) fn shape(context: &str, expected: &'static str, got: &Value) -> AssetError {
	AssetError::UnexpectedShape {
		context: context.to_owned(),
		expected,
		got: got.kind_name(),
	}
}

pub(super) fn unsupported(kind: &str, field: &str) -> AssetError {
	AssetError::UnsupportedKind {
		kind: kind.to_owned(),
		field: field.to_owned(),
	}
}

fn number(context: &str, input: &Value) -> Result<f64> {
	match input {
		Value::Number(number) => Ok(*number),
		Value::String(text) => text.trim().parse().map_err(|_| shape(context, "Number", input)),
		other => Err(shape(context, "Number", other)),
	}
}

fn string<'v>(context: &str, input: &'v Value) -> Result<&'v str> {
	input.as_str().ok_or_else(|| shape(context, "String", input))
}

fn enum_value(env: &MarshalEnv<'_>, enum_type: TypeIdx, member: &str) -> Result<i64> {
	let def = env.types.enum_def(enum_type)?;
	def.value_of(member).ok_or_else(|| AssetError::UnknownEnumMember {
		enum_name: def.name.to_string(),
		member: member.to_owned(),
	})
}

/// Decode a value of a leaf kind without side effects.
pub(super) fn decode_leaf(env: &MarshalEnv<'_>, context: &str, kind: &Kind, input: &Value) -> Result<PropertyValue> {
	Ok(match kind {
		Kind::Bool => PropertyValue::Bool(input.as_bool().ok_or_else(|| shape(context, "Bool", input))?),
		Kind::Int => PropertyValue::Int(number(context, input)? as i64),
		Kind::Float => PropertyValue::Float(number(context, input)?),
		Kind::Byte { enum_type } => match (input, enum_type) {
			(Value::String(member), Some(enum_type)) => {
				let value = enum_value(env, *enum_type, member)?;
				PropertyValue::Byte(u8::try_from(value).map_err(|_| shape(context, "Byte", input))?)
			}
			(Value::String(member), None) if member.parse::<u8>().is_err() => {
				return Err(AssetError::MissingEnumMetadata {
					field: context.to_owned(),
					member: member.clone(),
				});
			}
			_ => {
				let value = number(context, input)?;
				if value.fract() != 0.0 || !(0.0..=255.0).contains(&value) {
					return Err(shape(context, "Byte", input));
				}
				PropertyValue::Byte(value as u8)
			}
		},
		Kind::Enum { enum_type } => match input {
			Value::String(member) => PropertyValue::Enum(enum_value(env, *enum_type, member)?),
			other => PropertyValue::Enum(number(context, other)? as i64),
		},
		Kind::Name => PropertyValue::Name(string(context, input)?.into()),
		Kind::String => PropertyValue::String(string(context, input)?.to_owned()),
		Kind::Text => PropertyValue::Text(decode_text(context, input)?),
		Kind::FieldPath => PropertyValue::FieldPath(string(context, input)?.to_owned()),
		Kind::SoftObject { .. } => PropertyValue::SoftObject(soft_path(context, input)?),
		other => {
			return Err(AssetError::StorageMismatch {
				field: context.to_owned(),
				expected: other.storage_label(),
			});
		}
	})
}

fn decode_text(context: &str, input: &Value) -> Result<TextValue> {
	match input {
		Value::String(text) => Ok(TextValue::parse_export_string(text)),
		Value::Object(object) => {
			let field = |key: &str| object.get(key).and_then(Value::as_str).unwrap_or_default().to_owned();
			Ok(TextValue::Literal {
				namespace: field("Namespace"),
				key: field("Key"),
				source: field("SourceString"),
			})
		}
		other => Err(shape(context, "String", other)),
	}
}

/// Decode `{AssetPathName[, SubPathString]}` or a bare path string.
pub(super) fn soft_path(context: &str, input: &Value) -> Result<SoftObjectPath> {
	match input {
		Value::String(path) => Ok(SoftObjectPath::parse(path)),
		Value::Object(object) => {
			let asset_path = object.get("AssetPathName").and_then(Value::as_str).unwrap_or_default();
			let mut path = SoftObjectPath::parse(asset_path);
			match object.get("SubPathString").and_then(Value::as_str) {
				Some(sub_path) if !sub_path.is_empty() => path.sub_path = sub_path.to_owned(),
				_ => {}
			}
			Ok(path)
		}
		other => Err(shape(context, "Object", other)),
	}
}

/// Return the registered class an export record materializes as.
pub(super) fn export_class(types: &TypeRegistry, source: &Value) -> Option<TypeIdx> {
	source.get_str("Name")?;
	let type_name = source.get_str("Type")?;
	types.find(type_name).filter(|idx| types.class_def(*idx).is_ok())
}

/// Find a loaded object by the export name of a package reference.
///
/// `Distribution*` references fall back to the alias after the first `.`, quotes removed.
pub(super) fn find_named(world: &ObjectWorld, object_name: &str) -> Option<ObjectId> {
	if let Some(id) = world.find_by_name(&ExportReference::parse(object_name).name) {
		return Some(id);
	}
	if !object_name.starts_with("Distribution") {
		return None;
	}
	let (_, alias) = object_name.split_once('.')?;
	world.find_by_name(&alias.replace('\'', ""))
}

/// Build a `GameplayTag` struct from a tag name.
pub(super) fn gameplay_tag(types: &TypeRegistry, tag_type: TypeIdx, name: &str) -> Result<StructData> {
	let mut tag = StructData::default_of(types, tag_type)?;
	tag.set(types, "TagName", PropertyValue::Name(name.into()))?;
	Ok(tag)
}

/// Append tag names to a `GameplayTagContainer`, skipping tags already present.
pub(super) fn append_gameplay_tags(types: &TypeRegistry, context: &str, container: &mut StructData, input: &[Value]) -> Result<()> {
	let (tag_type, tags) = container_tags(types, container).ok_or_else(|| AssetError::StorageMismatch {
		field: context.to_owned(),
		expected: "Array",
	})?;
	for item in input {
		let tag = PropertyValue::Struct(gameplay_tag(types, tag_type, string(context, item)?)?);
		if !tags.contains(&tag) {
			tags.push(tag);
		}
	}
	Ok(())
}

fn container_tags<'d>(types: &TypeRegistry, container: &'d mut StructData) -> Option<(TypeIdx, &'d mut Vec<PropertyValue>)> {
	let def = types.struct_def(container.type_idx).ok()?;
	let idx = def.field_index("GameplayTags")?;
	let Kind::Array(elem) = &def.fields[idx].kind else {
		return None;
	};
	let Kind::Struct(tag_type) = elem.as_ref() else {
		return None;
	};
	match container.fields.get_mut(idx)? {
		PropertyValue::Array(tags) => Some((*tag_type, tags)),
		_ => None,
	}
}

/// Write a path into a `SoftObjectPath` struct.
pub(super) fn set_soft_path_struct(types: &TypeRegistry, dest: &mut StructData, path: &SoftObjectPath) -> Result<()> {
	dest.set(types, "AssetPathName", PropertyValue::Name(path.asset_path.as_str().into()))?;
	dest.set(types, "SubPathString", PropertyValue::String(path.sub_path.clone()))
}
