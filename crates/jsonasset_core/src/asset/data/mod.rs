use std::collections::HashMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::asset::text::TextValue;
use crate::asset::types::{FieldDescriptor, Kind, TypeIdx, TypeRegistry};
use crate::asset::world::ObjectId;
use crate::asset::{AssetError, Result};

/// Path-based object reference: `Package.Asset` plus optional sub-object path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SoftObjectPath {
	/// `Package.Asset` part.
	pub asset_path: String,
	/// Sub-object path after `:`; empty when absent.
	pub sub_path: String,
}

impl SoftObjectPath {
	/// Split `Package.Asset[:SubPath]`.
	pub fn parse(input: &str) -> Self {
		match input.split_once(':') {
			Some((asset_path, sub_path)) => Self {
				asset_path: asset_path.to_owned(),
				sub_path: sub_path.to_owned(),
			},
			None => Self {
				asset_path: input.to_owned(),
				sub_path: String::new(),
			},
		}
	}

	/// Return whether no asset is referenced.
	pub fn is_null(&self) -> bool {
		self.asset_path.is_empty()
	}
}

impl fmt::Display for SoftObjectPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.sub_path.is_empty() {
			f.write_str(&self.asset_path)
		} else {
			write!(f, "{}:{}", self.asset_path, self.sub_path)
		}
	}
}

/// Bound delegate target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelegateBinding {
	/// Bound object.
	pub object: Option<ObjectId>,
	/// Function name.
	pub function: Box<str>,
}

/// Host storage for one field or container element.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
	/// Boolean.
	Bool(bool),
	/// Integer.
	Int(i64),
	/// Floating-point.
	Float(f64),
	/// Byte.
	Byte(u8),
	/// Enum underlying value.
	Enum(i64),
	/// Interned name.
	Name(Box<str>),
	/// Owned string.
	String(String),
	/// Localizable text.
	Text(TextValue),
	/// Property path.
	FieldPath(String),
	/// Inline struct.
	Struct(StructData),
	/// Object reference.
	Object(Option<ObjectId>),
	/// Interface reference.
	Interface(Option<ObjectId>),
	/// Soft object reference.
	SoftObject(SoftObjectPath),
	/// Delegate binding.
	Delegate(Option<DelegateBinding>),
	/// Map container.
	Map(ScriptMap),
	/// Set container.
	Set(ScriptSet),
	/// Dynamic array.
	Array(Vec<PropertyValue>),
	/// Fixed-size array slots.
	Static(Vec<PropertyValue>),
	/// Storage of a kind without a marshalling path.
	Opaque,
}

impl PropertyValue {
	/// Return a stable storage label.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Bool(_) => "Bool",
			Self::Int(_) => "Int",
			Self::Float(_) => "Float",
			Self::Byte(_) => "Byte",
			Self::Enum(_) => "Enum",
			Self::Name(_) => "Name",
			Self::String(_) => "String",
			Self::Text(_) => "Text",
			Self::FieldPath(_) => "FieldPath",
			Self::Struct(_) => "Struct",
			Self::Object(_) => "Object",
			Self::Interface(_) => "Interface",
			Self::SoftObject(_) => "SoftObject",
			Self::Delegate(_) => "Delegate",
			Self::Map(_) => "Map",
			Self::Set(_) => "Set",
			Self::Array(_) => "Array",
			Self::Static(_) => "Static",
			Self::Opaque => "Opaque",
		}
	}
}

impl Hash for PropertyValue {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			Self::Bool(value) => value.hash(state),
			Self::Int(value) | Self::Enum(value) => value.hash(state),
			// +0.0 and -0.0 compare equal
			Self::Float(value) => (if *value == 0.0 { 0 } else { value.to_bits() }).hash(state),
			Self::Byte(value) => value.hash(state),
			Self::Name(value) => value.hash(state),
			Self::String(value) | Self::FieldPath(value) => value.hash(state),
			Self::Text(value) => value.source().hash(state),
			Self::Struct(value) => value.hash(state),
			Self::Object(value) | Self::Interface(value) => value.hash(state),
			Self::SoftObject(value) => value.hash(state),
			Self::Delegate(value) => value.hash(state),
			Self::Map(map) => map.len().hash(state),
			Self::Set(set) => set.len().hash(state),
			Self::Array(items) | Self::Static(items) => items.hash(state),
			Self::Opaque => {}
		}
	}
}

/// Struct storage aligned with the flattened field layout of its type.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct StructData {
	/// Struct or class type.
	pub type_idx: TypeIdx,
	/// One value per flattened field.
	pub fields: Vec<PropertyValue>,
}

impl StructData {
	/// Build default-constructed storage for a struct or class.
	pub fn default_of(types: &TypeRegistry, type_idx: TypeIdx) -> Result<Self> {
		let def = types.struct_def(type_idx)?;
		let fields = def.fields.iter().map(|field| default_for_field(field, types)).collect::<Result<_>>()?;
		Ok(Self { type_idx, fields })
	}

	/// Borrow a field by name.
	pub fn get(&self, types: &TypeRegistry, name: &str) -> Option<&PropertyValue> {
		let idx = types.struct_def(self.type_idx).ok()?.field_index(name)?;
		self.fields.get(idx)
	}

	/// Mutably borrow a field by name.
	pub fn get_mut(&mut self, types: &TypeRegistry, name: &str) -> Option<&mut PropertyValue> {
		let idx = types.struct_def(self.type_idx).ok()?.field_index(name)?;
		self.fields.get_mut(idx)
	}

	/// Replace a field by name.
	pub fn set(&mut self, types: &TypeRegistry, name: &str, value: PropertyValue) -> Result<()> {
		let type_idx = self.type_idx;
		let slot = self.get_mut(types, name).ok_or_else(|| AssetError::FieldNotFound {
			type_name: types.name_of(type_idx).to_owned(),
			field: name.to_owned(),
		})?;
		*slot = value;
		Ok(())
	}
}

/// Return the default-constructed storage for one element of `kind`.
pub fn default_for(kind: &Kind, types: &TypeRegistry) -> Result<PropertyValue> {
	Ok(match kind {
		Kind::Bool => PropertyValue::Bool(false),
		Kind::Int => PropertyValue::Int(0),
		Kind::Float => PropertyValue::Float(0.0),
		Kind::Byte { .. } => PropertyValue::Byte(0),
		Kind::Enum { .. } => PropertyValue::Enum(0),
		Kind::Name => PropertyValue::Name("None".into()),
		Kind::String => PropertyValue::String(String::new()),
		Kind::Text => PropertyValue::Text(TextValue::default()),
		Kind::FieldPath => PropertyValue::FieldPath(String::new()),
		Kind::Struct(idx) => PropertyValue::Struct(StructData::default_of(types, *idx)?),
		Kind::Object { .. } => PropertyValue::Object(None),
		Kind::Interface { .. } => PropertyValue::Interface(None),
		Kind::SoftObject { .. } => PropertyValue::SoftObject(SoftObjectPath::default()),
		Kind::Delegate { .. } => PropertyValue::Delegate(None),
		Kind::Map { .. } => PropertyValue::Map(ScriptMap::default()),
		Kind::Set(_) => PropertyValue::Set(ScriptSet::default()),
		Kind::Array(_) => PropertyValue::Array(Vec::new()),
		Kind::Opaque(_) => PropertyValue::Opaque,
	})
}

/// Return the default storage for a whole field, expanding fixed-size arrays.
pub fn default_for_field(field: &FieldDescriptor, types: &TypeRegistry) -> Result<PropertyValue> {
	if field.is_fixed_array() {
		let slots = (0..field.array_dim).map(|_| default_for(&field.kind, types)).collect::<Result<_>>()?;
		return Ok(PropertyValue::Static(slots));
	}
	default_for(&field.kind, types)
}

fn hash_of(value: &PropertyValue) -> u64 {
	let mut hasher = DefaultHasher::new();
	value.hash(&mut hasher);
	hasher.finish()
}

/// Map storage: entries in insertion order plus a hash index.
///
/// Entries added with [`ScriptMap::push_unhashed`] are invisible to lookups until [`ScriptMap::rehash`] runs.
#[derive(Debug, Clone, Default)]
pub struct ScriptMap {
	entries: Vec<(PropertyValue, PropertyValue)>,
	buckets: HashMap<u64, Vec<usize>>,
}

impl ScriptMap {
	/// Return number of stored entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Return whether the map is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Remove every entry.
	pub fn clear(&mut self) {
		self.entries.clear();
		self.buckets.clear();
	}

	/// Iterate entries in native order.
	pub fn iter(&self) -> impl Iterator<Item = (&PropertyValue, &PropertyValue)> {
		self.entries.iter().map(|(key, value)| (key, value))
	}

	/// Append an entry without updating the hash index.
	pub fn push_unhashed(&mut self, key: PropertyValue, value: PropertyValue) {
		self.entries.push((key, value));
	}

	/// Rebuild the hash index; a later duplicate key replaces the earlier value in place.
	pub fn rehash(&mut self) {
		let entries = std::mem::take(&mut self.entries);
		self.buckets.clear();
		for (key, value) in entries {
			self.insert(key, value);
		}
	}

	/// Insert or replace an entry, keeping the index current.
	pub fn insert(&mut self, key: PropertyValue, value: PropertyValue) {
		if let Some(pos) = self.position(&key) {
			self.entries[pos].1 = value;
			return;
		}
		let pos = self.entries.len();
		self.buckets.entry(hash_of(&key)).or_default().push(pos);
		self.entries.push((key, value));
	}

	fn position(&self, key: &PropertyValue) -> Option<usize> {
		let bucket = self.buckets.get(&hash_of(key))?;
		bucket.iter().copied().find(|pos| self.entries[*pos].0 == *key)
	}

	/// Look up a value by key through the hash index.
	pub fn get(&self, key: &PropertyValue) -> Option<&PropertyValue> {
		self.position(key).map(|pos| &self.entries[pos].1)
	}
}

/// Maps are equal when they hold the same key/value pairs in any order.
impl PartialEq for ScriptMap {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().all(|(key, value)| other.iter().any(|(k, v)| k == key && v == value))
	}
}

/// Set storage: unique elements in insertion order plus a hash index.
#[derive(Debug, Clone, Default)]
pub struct ScriptSet {
	elements: Vec<PropertyValue>,
	buckets: HashMap<u64, Vec<usize>>,
}

impl ScriptSet {
	/// Return number of stored elements.
	pub fn len(&self) -> usize {
		self.elements.len()
	}

	/// Return whether the set is empty.
	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}

	/// Remove every element.
	pub fn clear(&mut self) {
		self.elements.clear();
		self.buckets.clear();
	}

	/// Iterate elements in native order.
	pub fn iter(&self) -> impl Iterator<Item = &PropertyValue> {
		self.elements.iter()
	}

	/// Append an element without updating the hash index.
	pub fn push_unhashed(&mut self, element: PropertyValue) {
		self.elements.push(element);
	}

	/// Rebuild the hash index, dropping later duplicates.
	pub fn rehash(&mut self) {
		let elements = std::mem::take(&mut self.elements);
		self.buckets.clear();
		for element in elements {
			self.insert(element);
		}
	}

	/// Insert an element if absent; returns whether it was added.
	pub fn insert(&mut self, element: PropertyValue) -> bool {
		if self.contains(&element) {
			return false;
		}
		let pos = self.elements.len();
		self.buckets.entry(hash_of(&element)).or_default().push(pos);
		self.elements.push(element);
		true
	}

	/// Return whether an element is present through the hash index.
	pub fn contains(&self, element: &PropertyValue) -> bool {
		self.buckets
			.get(&hash_of(element))
			.is_some_and(|bucket| bucket.iter().any(|pos| self.elements[*pos] == *element))
	}
}

/// Sets are equal when they hold the same elements in any order.
impl PartialEq for ScriptSet {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().all(|element| other.iter().any(|candidate| candidate == element))
	}
}

#[cfg(test)]
mod tests;
