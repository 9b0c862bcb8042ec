use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::asset::{AssetError, Result};

/// Built-in type names the engine treats specially.
pub mod builtin {
	/// Root class every object class derives from.
	pub const OBJECT: &str = "Object";
	/// Class used for remote imports requested by soft object path structs.
	pub const DATA_ASSET: &str = "DataAsset";
	/// Four-part GUID struct (`A`, `B`, `C`, `D`).
	pub const GUID: &str = "Guid";
	/// Absolute point in time stored as ticks.
	pub const DATE_TIME: &str = "DateTime";
	/// Duration stored as ticks.
	pub const TIMESPAN: &str = "Timespan";
	/// Single hierarchical gameplay tag.
	pub const GAMEPLAY_TAG: &str = "GameplayTag";
	/// Container of gameplay tags.
	pub const GAMEPLAY_TAG_CONTAINER: &str = "GameplayTagContainer";
	/// Path-based reference carried as a struct.
	pub const SOFT_OBJECT_PATH: &str = "SoftObjectPath";
}

/// Index of a type inside a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdx(pub u32);

/// Closed classification of how a field's value is shaped.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
	/// Boolean.
	Bool,
	/// Signed integer of any width.
	Int,
	/// Floating-point of any width.
	Float,
	/// Byte, optionally carrying enum metadata.
	Byte {
		/// Enum supplying symbolic names.
		enum_type: Option<TypeIdx>,
	},
	/// Enum with an integral underlying value.
	Enum {
		/// Enum type.
		enum_type: TypeIdx,
	},
	/// Interned name.
	Name,
	/// Owned string.
	String,
	/// Localizable text.
	Text,
	/// Path naming a property.
	FieldPath,
	/// Inline struct value.
	Struct(TypeIdx),
	/// Direct object reference.
	Object {
		/// Declared referenced class.
		class: TypeIdx,
	},
	/// Interface reference carried by an object.
	Interface {
		/// Declared interface.
		interface: TypeIdx,
	},
	/// Path-based lazily resolved object reference.
	SoftObject {
		/// Declared referenced class.
		class: TypeIdx,
	},
	/// Delegate binding; never reconstructed from input.
	Delegate {
		/// Whether the delegate supports multiple bindings.
		multicast: bool,
	},
	/// Associative container.
	Map {
		/// Key element kind.
		key: Box<Kind>,
		/// Value element kind.
		value: Box<Kind>,
	},
	/// Unordered unique-element container.
	Set(Box<Kind>),
	/// Ordered dynamic array.
	Array(Box<Kind>),
	/// Host property class without a marshalling path.
	Opaque(Box<str>),
}

impl Kind {
	/// Return a stable label for the kind.
	pub fn label(&self) -> &str {
		match self {
			Self::Bool => "Bool",
			Self::Int => "Int",
			Self::Float => "Float",
			Self::Byte { .. } => "Byte",
			Self::Enum { .. } => "Enum",
			Self::Name => "Name",
			Self::String => "String",
			Self::Text => "Text",
			Self::FieldPath => "FieldPath",
			Self::Struct(_) => "Struct",
			Self::Object { .. } => "Object",
			Self::Interface { .. } => "Interface",
			Self::SoftObject { .. } => "SoftObject",
			Self::Delegate { multicast: false } => "Delegate",
			Self::Delegate { multicast: true } => "MulticastDelegate",
			Self::Map { .. } => "Map",
			Self::Set(_) => "Set",
			Self::Array(_) => "Array",
			Self::Opaque(name) => name,
		}
	}

	/// Return the storage variant label values of this kind use.
	pub fn storage_label(&self) -> &'static str {
		match self {
			Self::Bool => "Bool",
			Self::Int => "Int",
			Self::Float => "Float",
			Self::Byte { .. } => "Byte",
			Self::Enum { .. } => "Enum",
			Self::Name => "Name",
			Self::String => "String",
			Self::Text => "Text",
			Self::FieldPath => "FieldPath",
			Self::Struct(_) => "Struct",
			Self::Object { .. } => "Object",
			Self::Interface { .. } => "Interface",
			Self::SoftObject { .. } => "SoftObject",
			Self::Delegate { .. } => "Delegate",
			Self::Map { .. } => "Map",
			Self::Set(_) => "Set",
			Self::Array(_) => "Array",
			Self::Opaque(_) => "Opaque",
		}
	}
}

/// Inclusion-related flags carried by a field descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFlags {
	/// Field is not saved by the host.
	pub transient: bool,
	/// Field only exists in editor builds.
	pub editor_only: bool,
	/// Field is deprecated.
	pub deprecated: bool,
}

/// One reflected field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
	/// Field name as it appears in exports.
	pub name: Box<str>,
	/// Value shape.
	pub kind: Kind,
	/// Fixed-size array arity; `1` for scalar fields.
	pub array_dim: usize,
	/// Inclusion flags.
	pub flags: FieldFlags,
	/// Type that declared the field; set when fields are defined.
	pub owner: TypeIdx,
}

impl FieldDescriptor {
	/// Create a scalar field with no flags.
	pub fn new(name: &str, kind: Kind) -> Self {
		Self {
			name: name.into(),
			kind,
			array_dim: 1,
			flags: FieldFlags::default(),
			owner: TypeIdx(u32::MAX),
		}
	}

	/// Turn the field into a fixed-size array of `dim` slots.
	pub fn with_array_dim(mut self, dim: usize) -> Self {
		self.array_dim = dim.max(1);
		self
	}

	/// Replace the field flags.
	pub fn with_flags(mut self, flags: FieldFlags) -> Self {
		self.flags = flags;
		self
	}

	/// Mark the field transient.
	pub fn transient(mut self) -> Self {
		self.flags.transient = true;
		self
	}

	/// Mark the field editor-only.
	pub fn editor_only(mut self) -> Self {
		self.flags.editor_only = true;
		self
	}

	/// Mark the field deprecated.
	pub fn deprecated(mut self) -> Self {
		self.flags.deprecated = true;
		self
	}

	/// Return whether the field is a fixed-size array.
	pub fn is_fixed_array(&self) -> bool {
		self.array_dim > 1
	}
}

/// Struct or class declaration.
#[derive(Debug, Clone)]
pub struct StructDescriptor {
	/// Type name.
	pub name: Box<str>,
	/// Whether instances are standalone objects.
	pub is_class: bool,
	/// Parent type for classes.
	pub super_type: Option<TypeIdx>,
	/// Interfaces implemented by a class.
	pub interfaces: Vec<TypeIdx>,
	/// Flattened fields, inherited fields first.
	pub fields: Vec<FieldDescriptor>,
	defined: bool,
}

impl StructDescriptor {
	/// Return the position of a field in the flattened layout.
	pub fn field_index(&self, name: &str) -> Option<usize> {
		self.fields.iter().position(|field| field.name.as_ref() == name)
	}

	/// Look up a field by name.
	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|field| field.name.as_ref() == name)
	}
}

/// Enum declaration.
#[derive(Debug, Clone)]
pub struct EnumDescriptor {
	/// Enum type name.
	pub name: Box<str>,
	/// Short member names with values, in declaration order.
	pub members: Vec<(Box<str>, i64)>,
	/// Whether member names are written as `Enum::Member`.
	pub qualified: bool,
}

impl EnumDescriptor {
	/// Render the name for a value, if a member carries it.
	pub fn name_of(&self, value: i64) -> Option<String> {
		let (member, _) = self.members.iter().find(|(_, candidate)| *candidate == value)?;
		if self.qualified {
			Some(format!("{}::{member}", self.name))
		} else {
			Some(member.to_string())
		}
	}

	/// Look up a member value by short or `Enum::`-qualified name.
	pub fn value_of(&self, name: &str) -> Option<i64> {
		let short = match name.split_once("::") {
			Some((prefix, member)) if prefix == self.name.as_ref() => member,
			_ => name,
		};
		self.members.iter().find(|(member, _)| member.as_ref() == short).map(|(_, value)| *value)
	}
}

/// Interface declaration.
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
	/// Interface type name.
	pub name: Box<str>,
}

/// One registered host type.
#[derive(Debug, Clone)]
pub enum TypeDef {
	/// Struct or class.
	Struct(StructDescriptor),
	/// Enum.
	Enum(EnumDescriptor),
	/// Interface.
	Interface(InterfaceDescriptor),
}

impl TypeDef {
	/// Return the type name.
	pub fn name(&self) -> &str {
		match self {
			Self::Struct(item) => &item.name,
			Self::Enum(item) => &item.name,
			Self::Interface(item) => &item.name,
		}
	}
}

/// Read-only host reflection: every type the engine may marshal.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
	types: Vec<TypeDef>,
	by_name: HashMap<Box<str>, TypeIdx>,
}

impl TypeRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a registry holding the built-in structs and root classes.
	pub fn with_builtins() -> Result<Self> {
		let mut types = Self::new();
		types.install_builtins()?;
		Ok(types)
	}

	fn install_builtins(&mut self) -> Result<()> {
		let object = self.declare_class(builtin::OBJECT, None)?;
		self.define_fields(object, Vec::new())?;
		let data_asset = self.declare_class(builtin::DATA_ASSET, Some(object))?;
		self.define_fields(data_asset, Vec::new())?;

		let guid = self.declare_struct(builtin::GUID)?;
		self.define_fields(
			guid,
			["A", "B", "C", "D"].into_iter().map(|name| FieldDescriptor::new(name, Kind::Int)).collect(),
		)?;

		for name in [builtin::DATE_TIME, builtin::TIMESPAN] {
			let idx = self.declare_struct(name)?;
			self.define_fields(idx, vec![FieldDescriptor::new("Ticks", Kind::Int)])?;
		}

		let tag = self.declare_struct(builtin::GAMEPLAY_TAG)?;
		self.define_fields(tag, vec![FieldDescriptor::new("TagName", Kind::Name)])?;
		let container = self.declare_struct(builtin::GAMEPLAY_TAG_CONTAINER)?;
		self.define_fields(
			container,
			vec![FieldDescriptor::new("GameplayTags", Kind::Array(Box::new(Kind::Struct(tag))))],
		)?;

		let soft_path = self.declare_struct(builtin::SOFT_OBJECT_PATH)?;
		self.define_fields(
			soft_path,
			vec![
				FieldDescriptor::new("AssetPathName", Kind::Name),
				FieldDescriptor::new("SubPathString", Kind::String),
			],
		)?;
		Ok(())
	}

	/// Declare a plain struct; fields are supplied later with [`Self::define_fields`].
	pub fn declare_struct(&mut self, name: &str) -> Result<TypeIdx> {
		self.push(TypeDef::Struct(StructDescriptor {
			name: name.into(),
			is_class: false,
			super_type: None,
			interfaces: Vec::new(),
			fields: Vec::new(),
			defined: false,
		}))
	}

	/// Declare a class deriving from `super_type`.
	pub fn declare_class(&mut self, name: &str, super_type: Option<TypeIdx>) -> Result<TypeIdx> {
		if let Some(parent) = super_type {
			self.struct_def(parent)?;
		}
		self.push(TypeDef::Struct(StructDescriptor {
			name: name.into(),
			is_class: true,
			super_type,
			interfaces: Vec::new(),
			fields: Vec::new(),
			defined: false,
		}))
	}

	/// Declare an interface.
	pub fn declare_interface(&mut self, name: &str) -> Result<TypeIdx> {
		self.push(TypeDef::Interface(InterfaceDescriptor { name: name.into() }))
	}

	/// Register an enum with its members.
	pub fn add_enum(&mut self, name: &str, members: &[(&str, i64)], qualified: bool) -> Result<TypeIdx> {
		self.push(TypeDef::Enum(EnumDescriptor {
			name: name.into(),
			members: members.iter().map(|(member, value)| ((*member).into(), *value)).collect(),
			qualified,
		}))
	}

	/// Record that class `class` implements `interface`.
	pub fn add_interface_impl(&mut self, class: TypeIdx, interface: TypeIdx) -> Result<()> {
		self.interface_def(interface)?;
		let item = self.struct_def_mut(class)?;
		if !item.interfaces.contains(&interface) {
			item.interfaces.push(interface);
		}
		Ok(())
	}

	/// Define the own fields of a declared struct or class.
	///
	/// Inherited fields are prepended from the parent, which must already be defined. Fields that
	/// would nest the struct inside itself by value are rejected.
	pub fn define_fields(&mut self, idx: TypeIdx, own: Vec<FieldDescriptor>) -> Result<()> {
		let item = self.struct_def(idx)?;
		if item.defined {
			return Err(AssetError::FieldsAlreadyDefined { name: item.name.to_string() });
		}

		let mut fields = match item.super_type {
			Some(parent) => {
				let parent_def = self.struct_def(parent)?;
				if !parent_def.defined {
					return Err(AssetError::InvalidSchema {
						detail: format!("parent {} of {} must be defined first", parent_def.name, item.name),
					});
				}
				parent_def.fields.clone()
			}
			None => Vec::new(),
		};

		for mut field in own {
			field.owner = idx;
			fields.push(field);
		}
		if self.nests_by_value(idx, &fields) {
			return Err(AssetError::RecursiveStruct {
				name: self.name_of(idx).to_owned(),
			});
		}

		let item = self.struct_def_mut(idx)?;
		item.fields = fields;
		item.defined = true;
		Ok(())
	}

	/// Return whether `fields` reach `idx` through inline struct values.
	///
	/// Containers allocate their elements, so only direct struct fields count.
	fn nests_by_value(&self, idx: TypeIdx, fields: &[FieldDescriptor]) -> bool {
		let mut pending: Vec<TypeIdx> = fields.iter().filter_map(inline_struct).collect();
		let mut seen = HashSet::new();
		while let Some(next) = pending.pop() {
			if next == idx {
				return true;
			}
			if !seen.insert(next) {
				continue;
			}
			if let Ok(TypeDef::Struct(def)) = self.get(next) {
				pending.extend(def.fields.iter().filter_map(inline_struct));
			}
		}
		false
	}

	fn push(&mut self, def: TypeDef) -> Result<TypeIdx> {
		if self.by_name.contains_key(def.name()) {
			return Err(AssetError::DuplicateType { name: def.name().to_owned() });
		}
		let idx = TypeIdx(self.types.len() as u32);
		self.by_name.insert(def.name().into(), idx);
		self.types.push(def);
		Ok(idx)
	}

	/// Look up a type index by name.
	pub fn find(&self, name: &str) -> Option<TypeIdx> {
		self.by_name.get(name).copied()
	}

	/// Look up a type index by name, failing when missing.
	pub fn require(&self, name: &str) -> Result<TypeIdx> {
		self.find(name).ok_or_else(|| AssetError::TypeNotFound { name: name.to_owned() })
	}

	/// Return the type definition for an index.
	pub fn get(&self, idx: TypeIdx) -> Result<&TypeDef> {
		self.types.get(idx.0 as usize).ok_or(AssetError::TypeIndexOutOfRange { idx: idx.0 })
	}

	/// Return the type name for an index, or `<unknown>`.
	pub fn name_of(&self, idx: TypeIdx) -> &str {
		self.get(idx).map(TypeDef::name).unwrap_or("<unknown>")
	}

	/// Return the struct or class definition for an index.
	pub fn struct_def(&self, idx: TypeIdx) -> Result<&StructDescriptor> {
		match self.get(idx)? {
			TypeDef::Struct(item) => Ok(item),
			other => Err(AssetError::WrongTypeCategory {
				name: other.name().to_owned(),
				expected: "struct",
			}),
		}
	}

	fn struct_def_mut(&mut self, idx: TypeIdx) -> Result<&mut StructDescriptor> {
		match self.types.get_mut(idx.0 as usize) {
			Some(TypeDef::Struct(item)) => Ok(item),
			Some(other) => Err(AssetError::WrongTypeCategory {
				name: other.name().to_owned(),
				expected: "struct",
			}),
			None => Err(AssetError::TypeIndexOutOfRange { idx: idx.0 }),
		}
	}

	/// Return the class definition for an index.
	pub fn class_def(&self, idx: TypeIdx) -> Result<&StructDescriptor> {
		let item = self.struct_def(idx)?;
		if !item.is_class {
			return Err(AssetError::WrongTypeCategory {
				name: item.name.to_string(),
				expected: "class",
			});
		}
		Ok(item)
	}

	/// Return the enum definition for an index.
	pub fn enum_def(&self, idx: TypeIdx) -> Result<&EnumDescriptor> {
		match self.get(idx)? {
			TypeDef::Enum(item) => Ok(item),
			other => Err(AssetError::WrongTypeCategory {
				name: other.name().to_owned(),
				expected: "enum",
			}),
		}
	}

	fn interface_def(&self, idx: TypeIdx) -> Result<&InterfaceDescriptor> {
		match self.get(idx)? {
			TypeDef::Interface(item) => Ok(item),
			other => Err(AssetError::WrongTypeCategory {
				name: other.name().to_owned(),
				expected: "interface",
			}),
		}
	}

	/// Return the parent type name, or `None` as the host prints it.
	pub fn super_name(&self, idx: TypeIdx) -> &str {
		self.struct_def(idx)
			.ok()
			.and_then(|item| item.super_type)
			.map(|parent| self.name_of(parent))
			.unwrap_or("None")
	}

	/// Return whether `class` is `base` or derives from it.
	pub fn is_a(&self, class: TypeIdx, base: TypeIdx) -> bool {
		let mut current = Some(class);
		while let Some(idx) = current {
			if idx == base {
				return true;
			}
			current = self.struct_def(idx).ok().and_then(|item| item.super_type);
		}
		false
	}

	/// Return whether `class` or any ancestor implements `interface`.
	pub fn implements(&self, class: TypeIdx, interface: TypeIdx) -> bool {
		let mut current = Some(class);
		while let Some(idx) = current {
			let Ok(item) = self.struct_def(idx) else {
				return false;
			};
			if item.interfaces.contains(&interface) {
				return true;
			}
			current = item.super_type;
		}
		false
	}

	/// Iterate all registered types in registration order.
	pub fn iter(&self) -> impl Iterator<Item = (TypeIdx, &TypeDef)> {
		self.types.iter().enumerate().map(|(idx, def)| (TypeIdx(idx as u32), def))
	}

	/// Return number of registered types.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Return whether no types are registered.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

impl fmt::Display for TypeIdx {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

fn inline_struct(field: &FieldDescriptor) -> Option<TypeIdx> {
	match field.kind {
		Kind::Struct(inner) => Some(inner),
		_ => None,
	}
}
