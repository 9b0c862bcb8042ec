use crate::asset::data::{PropertyValue, StructData};
use crate::asset::export::export_properties;
use crate::asset::guid::guid_object;
use crate::asset::marshal::deserialize::map_pair;
use crate::asset::marshal::leaf::{self, shape, unsupported};
use crate::asset::marshal::{CompareContext, MarshalEnv, element_context};
use crate::asset::table::ObjectTable;
use crate::asset::types::{FieldDescriptor, Kind, builtin};
use crate::asset::value::Value;
use crate::asset::world::{ObjectId, ObjectWorld};
use crate::asset::{AssetError, Result};

/// Structural equality oracle: would decoding a value change live storage.
///
/// Never mutates the world or the table; object identity verdicts are cached in the context.
pub struct Comparator<'a> {
	env: MarshalEnv<'a>,
	table: &'a ObjectTable,
	world: &'a ObjectWorld,
	context: &'a mut CompareContext,
	merge_lod_data: bool,
}

impl<'a> Comparator<'a> {
	/// Create a comparator over `table` exports and `world` objects.
	pub fn new(env: MarshalEnv<'a>, table: &'a ObjectTable, world: &'a ObjectWorld, context: &'a mut CompareContext) -> Self {
		Self {
			env,
			table,
			world,
			context,
			merge_lod_data: true,
		}
	}

	/// Set whether an export's `LODData` joins its properties, matching the import being predicted.
	pub fn with_lod_merge(mut self, merge_lod_data: bool) -> Self {
		self.merge_lod_data = merge_lod_data;
		self
	}

	/// Return the shared registries and options.
	pub fn env(&self) -> MarshalEnv<'a> {
		self.env
	}

	/// Compare one encoded field against live storage.
	pub fn compare_field(&mut self, field: &FieldDescriptor, input: &Value, live: &PropertyValue) -> Result<bool> {
		if !field.is_fixed_array() {
			return self.compare_kind(&field.name, &field.kind, input, live);
		}
		if let Kind::Opaque(name) = &field.kind {
			return Err(unsupported(name, &field.name));
		}
		if input.is_null() {
			return Ok(true);
		}

		let PropertyValue::Static(slots) = live else {
			return self.mismatch(&field.name, "Static");
		};
		let Some(items) = input.as_array() else {
			return self.reject(shape(&field.name, "Array", input));
		};
		if items.len() != slots.len() {
			return self.reject(AssetError::ArityMismatch {
				field: field.name.to_string(),
				expected: slots.len(),
				got: items.len(),
			});
		}
		for (idx, (item, slot)) in items.iter().zip(slots).enumerate() {
			if !self.compare_kind(&element_context(&field.name, idx), &field.kind, item, slot)? {
				return Ok(false);
			}
		}
		Ok(true)
	}

	/// Compare one encoded value of `kind` against live storage.
	pub fn compare_kind(&mut self, context: &str, kind: &Kind, input: &Value, live: &PropertyValue) -> Result<bool> {
		if let Kind::Opaque(name) = kind {
			return Err(unsupported(name, context));
		}
		if input.is_null() {
			return Ok(true);
		}

		match (kind, live) {
			(Kind::Delegate { .. }, _) => Ok(true),
			(Kind::Array(elem), PropertyValue::Array(items)) => {
				let Some(inputs) = input.as_array() else {
					return self.reject(shape(context, "Array", input));
				};
				if inputs.len() != items.len() {
					return Ok(false);
				}
				for (idx, (item, live_item)) in inputs.iter().zip(items).enumerate() {
					if !self.compare_kind(&element_context(context, idx), elem, item, live_item)? {
						return Ok(false);
					}
				}
				Ok(true)
			}
			(Kind::Set(elem), PropertyValue::Set(set)) => {
				let Some(inputs) = input.as_array() else {
					return self.reject(shape(context, "Array", input));
				};
				if inputs.len() != set.len() {
					return Ok(false);
				}
				for (idx, item) in inputs.iter().enumerate() {
					let item_context = element_context(context, idx);
					let mut found = false;
					for live_item in set.iter() {
						if self.compare_kind(&item_context, elem, item, live_item)? {
							found = true;
							break;
						}
					}
					if !found {
						return Ok(false);
					}
				}
				Ok(true)
			}
			(Kind::Map { key, value }, PropertyValue::Map(map)) => {
				let Some(inputs) = input.as_array() else {
					return self.reject(shape(context, "Array", input));
				};
				if inputs.len() != map.len() {
					return Ok(false);
				}
				for (idx, item) in inputs.iter().enumerate() {
					let entry_context = element_context(context, idx);
					let Some((key_input, value_input)) = self.env.tolerate(map_pair(&entry_context, item))? else {
						return Ok(false);
					};
					let mut found = false;
					for (live_key, live_value) in map.iter() {
						if self.compare_kind(&entry_context, key, key_input, live_key)?
							&& self.compare_kind(&entry_context, value, value_input, live_value)?
						{
							found = true;
							break;
						}
					}
					if !found {
						return Ok(false);
					}
				}
				Ok(true)
			}
			(Kind::Struct(idx), PropertyValue::Struct(data)) if data.type_idx == *idx => self.compare_struct(context, input, data),
			(Kind::Object { .. }, PropertyValue::Object(target)) => self.compare_reference(context, input, *target),
			(Kind::Interface { .. }, PropertyValue::Interface(target)) => {
				let Some(index) = input.as_index() else {
					return self.reject(shape(context, "Number", input));
				};
				match target {
					Some(id) => self.compare_object(index, *id),
					None => Ok(!self.resolves(index)),
				}
			}
			(Kind::SoftObject { .. }, PropertyValue::SoftObject(path)) => {
				let Some(decoded) = self.env.tolerate(leaf::soft_path(context, input))? else {
					return Ok(false);
				};
				Ok(decoded.is_null() || decoded == *path)
			}
			(
				Kind::Bool
				| Kind::Int
				| Kind::Float
				| Kind::Byte { .. }
				| Kind::Enum { .. }
				| Kind::Name
				| Kind::String
				| Kind::Text
				| Kind::FieldPath,
				_,
			) => {
				let Some(decoded) = self.env.tolerate(leaf::decode_leaf(&self.env, context, kind, input))? else {
					return Ok(false);
				};
				Ok(decoded == *live)
			}
			(kind, _) => self.mismatch(context, kind.storage_label()),
		}
	}

	/// Compare an encoded struct, decoding shortcut shapes into scratch storage.
	pub fn compare_struct(&mut self, context: &str, input: &Value, live: &StructData) -> Result<bool> {
		let types = self.env.types;
		match (types.name_of(live.type_idx), input) {
			(builtin::GAMEPLAY_TAG, Value::String(tag)) => {
				let mut scratch = live.clone();
				scratch.set(types, "TagName", PropertyValue::Name(tag.as_str().into()))?;
				Ok(scratch == *live)
			}
			(builtin::GAMEPLAY_TAG_CONTAINER, Value::Array(tags)) => {
				let mut scratch = live.clone();
				if self.env.tolerate(leaf::append_gameplay_tags(types, context, &mut scratch, tags))?.is_none() {
					return Ok(false);
				}
				Ok(scratch == *live)
			}
			(builtin::SOFT_OBJECT_PATH, Value::String(_) | Value::Object(_)) => {
				let Some(path) = self.env.tolerate(leaf::soft_path(context, input))? else {
					return Ok(false);
				};
				if path.is_null() {
					return Ok(true);
				}
				let mut scratch = live.clone();
				leaf::set_soft_path_struct(types, &mut scratch, &path)?;
				Ok(scratch == *live)
			}
			(_, Value::String(text)) => {
				let Some(normalized) = self.env.tolerate(guid_object(text))? else {
					return Ok(false);
				};
				let codec = self.env.serializers.get(live.type_idx);
				codec.compare(self, &normalized, live)
			}
			(_, Value::Object(object)) => {
				let codec = self.env.serializers.get(live.type_idx);
				codec.compare(self, object, live)
			}
			(_, other) => self.reject(shape(context, "Object", other)),
		}
	}

	fn compare_reference(&mut self, context: &str, input: &Value, live: Option<ObjectId>) -> Result<bool> {
		let index = match input {
			Value::Number(_) => match input.as_index() {
				Some(index) => index,
				None => return self.reject(shape(context, "Number", input)),
			},
			Value::Object(reference) => match self.table.find_export(reference) {
				Some(index) => index,
				None => {
					let object_name = reference.get("ObjectName").and_then(Value::as_str).unwrap_or_default();
					return Ok(leaf::find_named(self.world, object_name) == live);
				}
			},
			other => return self.reject(shape(context, "Object", other)),
		};
		match live {
			Some(id) => self.compare_object(index, id),
			None => Ok(!self.resolves(index)),
		}
	}

	/// Return whether importing would produce an instance for an export index.
	fn resolves(&self, index: usize) -> bool {
		self.table.instance(index).is_some()
			|| self.table.source(index).and_then(|source| leaf::export_class(self.env.types, source)).is_some()
	}

	/// Compare the export at `index` with a live object, caching the verdict.
	///
	/// A pair already under evaluation is reported equal.
	pub fn compare_object(&mut self, index: usize, id: ObjectId) -> Result<bool> {
		if self.table.instance(index) == Some(id) {
			return Ok(true);
		}
		if let Some(verdict) = self.context.get(index, id) {
			return Ok(verdict);
		}
		let table = self.table;
		let world = self.world;
		let Some(source) = table.source(index) else {
			return Ok(false);
		};
		let object = world.get(id)?;

		self.context.set(index, id, true);
		let types = self.env.types;
		let mut equal =
			source.get_str("Type") == Some(types.name_of(object.class)) && source.get_str("Name") == Some(object.name.as_str());
		if equal {
			if let Some(properties) = export_properties(source, self.merge_lod_data) {
				let codec = self.env.serializers.get(object.class);
				equal = codec.compare(self, &properties, &object.properties)?;
			}
		}
		self.context.set(index, id, equal);
		Ok(equal)
	}

	fn reject(&self, err: AssetError) -> Result<bool> {
		self.env.violation(err).map(|()| false)
	}

	fn mismatch(&self, context: &str, expected: &'static str) -> Result<bool> {
		self.reject(AssetError::StorageMismatch {
			field: context.to_owned(),
			expected,
		})
	}
}
