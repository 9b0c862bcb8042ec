//! JSON schema files describing host types.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::asset::registry::SerializerRegistry;
use crate::asset::types::{FieldDescriptor, FieldFlags, Kind, TypeDef, TypeIdx, TypeRegistry, builtin};
use crate::asset::{AssetError, Result};

/// Declarative description of the host types an import may target.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeSchema {
	/// Enum declarations.
	pub enums: Vec<EnumSpec>,
	/// Interface names.
	pub interfaces: Vec<String>,
	/// Plain struct declarations.
	pub structs: Vec<StructSpec>,
	/// Class declarations.
	pub classes: Vec<ClassSpec>,
	/// Fields excluded from marshalling.
	pub blacklist: Vec<BlacklistSpec>,
}

/// Enum declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumSpec {
	/// Enum name.
	pub name: String,
	/// Member names with values, in declaration order.
	pub members: IndexMap<String, i64>,
	/// Whether names are written as `Enum::Member`.
	#[serde(default)]
	pub qualified: bool,
}

/// Struct declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructSpec {
	/// Struct name.
	pub name: String,
	/// Fields in declaration order.
	#[serde(default)]
	pub fields: Vec<FieldSpec>,
}

/// Class declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassSpec {
	/// Class name.
	pub name: String,
	/// Parent class; `Object` when omitted.
	#[serde(default, rename = "super")]
	pub super_type: Option<String>,
	/// Implemented interfaces.
	#[serde(default)]
	pub interfaces: Vec<String>,
	/// Own fields in declaration order.
	#[serde(default)]
	pub fields: Vec<FieldSpec>,
}

/// Field declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
	/// Field name.
	pub name: String,
	/// Value shape.
	pub kind: KindSpec,
	/// Fixed-size array arity.
	#[serde(default = "one")]
	pub array_dim: usize,
	/// Transient flag.
	#[serde(default)]
	pub transient: bool,
	/// Editor-only flag.
	#[serde(default)]
	pub editor_only: bool,
	/// Deprecated flag.
	#[serde(default)]
	pub deprecated: bool,
}

fn one() -> usize {
	1
}

/// Field kind with type references by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
#[allow(missing_docs)]
pub enum KindSpec {
	Bool,
	Int,
	Float,
	Byte {
		#[serde(default)]
		enum_type: Option<String>,
	},
	Enum {
		enum_type: String,
	},
	Name,
	String,
	Text,
	FieldPath,
	Struct {
		struct_type: String,
	},
	Object {
		class: String,
	},
	Interface {
		interface: String,
	},
	SoftObject {
		class: String,
	},
	Delegate {
		#[serde(default)]
		multicast: bool,
	},
	Map {
		key: Box<KindSpec>,
		value: Box<KindSpec>,
	},
	Set {
		element: Box<KindSpec>,
	},
	Array {
		element: Box<KindSpec>,
	},
	Opaque {
		name: String,
	},
}

/// Field excluded from marshalling.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlacklistSpec {
	/// Type declaring or inheriting the field.
	#[serde(rename = "type")]
	pub type_name: String,
	/// Field name.
	pub field: String,
}

impl TypeSchema {
	/// Read a schema file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
		let text = fs::read_to_string(path)?;
		Self::from_json_str(&text)
	}

	/// Parse schema JSON text.
	pub fn from_json_str(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Build the type registry: built-ins plus every declared type.
	pub fn to_registry(&self) -> Result<TypeRegistry> {
		let mut types = TypeRegistry::with_builtins()?;

		for item in &self.enums {
			let members: Vec<(&str, i64)> = item.members.iter().map(|(name, value)| (name.as_str(), *value)).collect();
			types.add_enum(&item.name, &members, item.qualified)?;
		}
		for name in &self.interfaces {
			types.declare_interface(name)?;
		}
		let structs = self
			.structs
			.iter()
			.map(|item| Ok((types.declare_struct(&item.name)?, item)))
			.collect::<Result<Vec<_>>>()?;
		let classes = self.declare_classes(&mut types)?;

		for (idx, item) in &classes {
			for interface in &item.interfaces {
				let interface = types.require(interface)?;
				types.add_interface_impl(*idx, interface)?;
			}
		}
		for (idx, item) in &structs {
			let fields = resolve_fields(&types, &item.fields)?;
			types.define_fields(*idx, fields)?;
		}
		for (idx, item) in &classes {
			let fields = resolve_fields(&types, &item.fields)?;
			types.define_fields(*idx, fields)?;
		}

		Ok(types)
	}

	/// Build the serializer registry with built-in codecs and the declared blacklist.
	pub fn to_serializers(&self, types: &TypeRegistry) -> Result<SerializerRegistry> {
		let mut serializers = SerializerRegistry::with_builtins(types)?;
		for entry in &self.blacklist {
			serializers.blacklist(types, types.require(&entry.type_name)?, &entry.field)?;
		}
		Ok(serializers)
	}

	fn declare_classes<'s>(&'s self, types: &mut TypeRegistry) -> Result<Vec<(TypeIdx, &'s ClassSpec)>> {
		let mut pending: Vec<&ClassSpec> = self.classes.iter().collect();
		let mut declared = Vec::with_capacity(pending.len());

		while !pending.is_empty() {
			let before = pending.len();
			let mut waiting = Vec::new();
			for item in pending {
				let parent = item.super_type.as_deref().unwrap_or(builtin::OBJECT);
				match types.find(parent) {
					Some(parent) => declared.push((types.declare_class(&item.name, Some(parent))?, item)),
					None => waiting.push(item),
				}
			}
			if waiting.len() == before {
				let names: Vec<_> = waiting.iter().map(|item| item.name.as_str()).collect();
				return Err(AssetError::InvalidSchema {
					detail: format!("unresolved parent classes for {}", names.join(", ")),
				});
			}
			pending = waiting;
		}
		Ok(declared)
	}
}

fn resolve_fields(types: &TypeRegistry, fields: &[FieldSpec]) -> Result<Vec<FieldDescriptor>> {
	fields
		.iter()
		.map(|spec| {
			let kind = resolve_kind(types, &spec.kind)?;
			Ok(FieldDescriptor::new(&spec.name, kind).with_array_dim(spec.array_dim).with_flags(FieldFlags {
				transient: spec.transient,
				editor_only: spec.editor_only,
				deprecated: spec.deprecated,
			}))
		})
		.collect()
}

fn resolve_kind(types: &TypeRegistry, spec: &KindSpec) -> Result<Kind> {
	let class = |name: &str| -> Result<TypeIdx> {
		let idx = types.require(name)?;
		types.class_def(idx)?;
		Ok(idx)
	};
	let enumeration = |name: &str| -> Result<TypeIdx> {
		let idx = types.require(name)?;
		types.enum_def(idx)?;
		Ok(idx)
	};

	Ok(match spec {
		KindSpec::Bool => Kind::Bool,
		KindSpec::Int => Kind::Int,
		KindSpec::Float => Kind::Float,
		KindSpec::Byte { enum_type } => Kind::Byte {
			enum_type: enum_type.as_deref().map(enumeration).transpose()?,
		},
		KindSpec::Enum { enum_type } => Kind::Enum {
			enum_type: enumeration(enum_type)?,
		},
		KindSpec::Name => Kind::Name,
		KindSpec::String => Kind::String,
		KindSpec::Text => Kind::Text,
		KindSpec::FieldPath => Kind::FieldPath,
		KindSpec::Struct { struct_type } => {
			let idx = types.require(struct_type)?;
			if types.struct_def(idx)?.is_class {
				return Err(AssetError::WrongTypeCategory {
					name: struct_type.clone(),
					expected: "struct",
				});
			}
			Kind::Struct(idx)
		}
		KindSpec::Object { class: name } => Kind::Object { class: class(name)? },
		KindSpec::Interface { interface } => {
			let idx = types.require(interface)?;
			if !matches!(types.get(idx)?, TypeDef::Interface(_)) {
				return Err(AssetError::WrongTypeCategory {
					name: interface.clone(),
					expected: "interface",
				});
			}
			Kind::Interface { interface: idx }
		}
		KindSpec::SoftObject { class: name } => Kind::SoftObject { class: class(name)? },
		KindSpec::Delegate { multicast } => Kind::Delegate { multicast: *multicast },
		KindSpec::Map { key, value } => Kind::Map {
			key: Box::new(resolve_kind(types, key)?),
			value: Box::new(resolve_kind(types, value)?),
		},
		KindSpec::Set { element } => Kind::Set(Box::new(resolve_kind(types, element)?)),
		KindSpec::Array { element } => Kind::Array(Box::new(resolve_kind(types, element)?)),
		KindSpec::Opaque { name } => Kind::Opaque(name.as_str().into()),
	})
}
