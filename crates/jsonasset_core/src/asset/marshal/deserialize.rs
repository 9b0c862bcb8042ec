use crate::asset::data::{PropertyValue, SoftObjectPath, StructData, default_for};
use crate::asset::diagnostics::{Diagnostics, FailedPropertyRecord};
use crate::asset::export::{export_index_from_path, export_properties};
use crate::asset::guid::guid_object;
use crate::asset::marshal::leaf::{self, shape, unsupported};
use crate::asset::marshal::{MarshalEnv, element_context};
use crate::asset::session::ImportOptions;
use crate::asset::soft::{RemoteImportRequest, SoftReferenceResolver};
use crate::asset::table::ObjectTable;
use crate::asset::types::{FieldDescriptor, Kind, TypeIdx, builtin};
use crate::asset::value::{Object, Value, remove_keys};
use crate::asset::world::{ObjectId, ObjectWorld};
use crate::asset::{AssetError, Result};

/// Decoder from values into host storage and live objects.
///
/// Referenced exports are materialized through the object table and populated once, right after
/// they are registered.
pub struct Deserializer<'a> {
	env: MarshalEnv<'a>,
	table: &'a mut ObjectTable,
	world: &'a mut ObjectWorld,
	diagnostics: &'a mut Diagnostics,
	resolver: &'a mut dyn SoftReferenceResolver,
	import: &'a ImportOptions,
}

impl<'a> Deserializer<'a> {
	/// Create a decoder for one import session.
	pub fn new(
		env: MarshalEnv<'a>,
		table: &'a mut ObjectTable,
		world: &'a mut ObjectWorld,
		diagnostics: &'a mut Diagnostics,
		resolver: &'a mut dyn SoftReferenceResolver,
		import: &'a ImportOptions,
	) -> Self {
		Self {
			env,
			table,
			world,
			diagnostics,
			resolver,
			import,
		}
	}

	/// Return the shared registries and options.
	pub fn env(&self) -> MarshalEnv<'a> {
		self.env
	}

	/// Borrow the live object world.
	pub fn world(&self) -> &ObjectWorld {
		self.world
	}

	/// Decode one field into its storage. `Null` input leaves the field untouched.
	pub fn deserialize_field(&mut self, field: &FieldDescriptor, input: &Value, dest: &mut PropertyValue) -> Result<()> {
		if !field.is_fixed_array() {
			return self.deserialize_kind(&field.name, &field.kind, input, dest);
		}
		if let Kind::Opaque(name) = &field.kind {
			return Err(unsupported(name, &field.name));
		}
		if input.is_null() {
			return Ok(());
		}

		let PropertyValue::Static(slots) = dest else {
			return self.env.violation(AssetError::StorageMismatch {
				field: field.name.to_string(),
				expected: "Static",
			});
		};
		let Some(items) = input.as_array() else {
			return self.env.violation(shape(&field.name, "Array", input));
		};
		if items.len() != slots.len() {
			self.env.violation(AssetError::ArityMismatch {
				field: field.name.to_string(),
				expected: slots.len(),
				got: items.len(),
			})?;
		}

		for (idx, (item, slot)) in items.iter().zip(slots.iter_mut()).enumerate() {
			self.deserialize_kind(&element_context(&field.name, idx), &field.kind, item, slot)?;
		}
		Ok(())
	}

	/// Decode one value of `kind` into `dest`.
	pub fn deserialize_kind(&mut self, context: &str, kind: &Kind, input: &Value, dest: &mut PropertyValue) -> Result<()> {
		if let Kind::Opaque(name) = kind {
			return Err(unsupported(name, context));
		}
		if input.is_null() {
			return Ok(());
		}

		let types = self.env.types;
		match kind {
			Kind::Delegate { .. } => Ok(()),
			Kind::Array(elem) => {
				let PropertyValue::Array(items) = dest else {
					return self.mismatch(context, kind);
				};
				let Some(inputs) = input.as_array() else {
					return self.env.violation(shape(context, "Array", input));
				};
				items.clear();
				for (idx, item) in inputs.iter().enumerate() {
					let mut slot = default_for(elem, types)?;
					self.deserialize_kind(&element_context(context, idx), elem, item, &mut slot)?;
					items.push(slot);
				}
				Ok(())
			}
			Kind::Set(elem) => {
				let PropertyValue::Set(set) = dest else {
					return self.mismatch(context, kind);
				};
				let Some(inputs) = input.as_array() else {
					return self.env.violation(shape(context, "Array", input));
				};
				set.clear();
				for (idx, item) in inputs.iter().enumerate() {
					let mut staged = default_for(elem, types)?;
					self.deserialize_kind(&element_context(context, idx), elem, item, &mut staged)?;
					set.push_unhashed(staged);
				}
				set.rehash();
				Ok(())
			}
			Kind::Map { key, value } => {
				let PropertyValue::Map(map) = dest else {
					return self.mismatch(context, kind);
				};
				let Some(inputs) = input.as_array() else {
					return self.env.violation(shape(context, "Array", input));
				};
				map.clear();
				for (idx, item) in inputs.iter().enumerate() {
					let entry_context = element_context(context, idx);
					let Some((key_input, value_input)) = self.env.tolerate(map_pair(&entry_context, item))? else {
						continue;
					};
					let mut staged_key = default_for(key, types)?;
					let mut staged_value = default_for(value, types)?;
					self.deserialize_kind(&entry_context, key, key_input, &mut staged_key)?;
					self.deserialize_kind(&entry_context, value, value_input, &mut staged_value)?;
					map.push_unhashed(staged_key, staged_value);
				}
				map.rehash();
				Ok(())
			}
			Kind::Struct(idx) => {
				let PropertyValue::Struct(data) = dest else {
					return self.mismatch(context, kind);
				};
				if data.type_idx != *idx {
					return self.mismatch(context, kind);
				}
				self.deserialize_struct(context, input, data)
			}
			Kind::Object { class } => {
				let PropertyValue::Object(target) = dest else {
					return self.mismatch(context, kind);
				};
				if let Some(id) = self.resolve_object(context, *class, input)? {
					*target = Some(id);
				}
				Ok(())
			}
			Kind::Interface { interface } => {
				let PropertyValue::Interface(target) = dest else {
					return self.mismatch(context, kind);
				};
				let Some(index) = input.as_index() else {
					return self.env.violation(shape(context, "Number", input));
				};
				let Some(id) = self.resolve_index(index)? else {
					self.diagnostics.push(FailedPropertyRecord {
						type_name: types.name_of(*interface).to_owned(),
						super_type_name: "None".to_owned(),
						source_path: index.to_string(),
					});
					return Ok(());
				};
				let class = self.world.get(id)?.class;
				if !types.implements(class, *interface) {
					return self.env.violation(AssetError::InterfaceNotImplemented {
						class: types.name_of(class).to_owned(),
						interface: types.name_of(*interface).to_owned(),
					});
				}
				*target = Some(id);
				Ok(())
			}
			Kind::SoftObject { class } => {
				let PropertyValue::SoftObject(slot) = dest else {
					return self.mismatch(context, kind);
				};
				let Some(path) = self.env.tolerate(leaf::soft_path(context, input))? else {
					return Ok(());
				};
				if path.is_null() {
					return Ok(());
				}
				*slot = path.clone();
				self.resolve_soft(*class, &path);
				Ok(())
			}
			_ => {
				let Some(decoded) = self.env.tolerate(leaf::decode_leaf(&self.env, context, kind, input))? else {
					return Ok(());
				};
				if decoded.label() != dest.label() {
					return self.mismatch(context, kind);
				}
				*dest = decoded;
				Ok(())
			}
		}
	}

	/// Decode a struct value, applying the built-in shortcut shapes before codec dispatch.
	pub fn deserialize_struct(&mut self, context: &str, input: &Value, data: &mut StructData) -> Result<()> {
		let types = self.env.types;
		match (types.name_of(data.type_idx), input) {
			(builtin::GAMEPLAY_TAG, Value::String(tag)) => data.set(types, "TagName", PropertyValue::Name(tag.as_str().into())),
			(builtin::GAMEPLAY_TAG_CONTAINER, Value::Array(tags)) => {
				self.env.tolerate(leaf::append_gameplay_tags(types, context, data, tags))?;
				Ok(())
			}
			(builtin::SOFT_OBJECT_PATH, Value::String(_) | Value::Object(_)) => {
				let Some(path) = self.env.tolerate(leaf::soft_path(context, input))? else {
					return Ok(());
				};
				if path.is_null() {
					return Ok(());
				}
				leaf::set_soft_path_struct(types, data, &path)?;
				match types.find(builtin::DATA_ASSET) {
					Some(data_asset) => self.resolve_soft(data_asset, &path),
					None => self.request_soft(builtin::DATA_ASSET, "None", &path),
				}
				Ok(())
			}
			(_, Value::String(text)) => {
				let Some(normalized) = self.env.tolerate(guid_object(text))? else {
					return Ok(());
				};
				let codec = self.env.serializers.get(data.type_idx);
				codec.deserialize(self, &normalized, data)
			}
			(_, Value::Object(object)) => {
				let codec = self.env.serializers.get(data.type_idx);
				codec.deserialize(self, object, data)
			}
			(_, other) => self.env.violation(shape(context, "Object", other)),
		}
	}

	/// Return the instance for an export index, materializing and populating it on first sight.
	pub fn resolve_index(&mut self, index: usize) -> Result<Option<ObjectId>> {
		if let Some(id) = self.table.instance(index) {
			return Ok(Some(id));
		}
		let Some(source) = self.table.source(index).cloned() else {
			return Ok(None);
		};
		self.materialize(index, &source)
	}

	fn materialize(&mut self, index: usize, source: &Value) -> Result<Option<ObjectId>> {
		let types = self.env.types;
		let (Some(type_name), Some(name)) = (source.get_str("Type"), source.get_str("Name")) else {
			tracing::debug!(index, "export lacks Type or Name");
			return Ok(None);
		};
		let Some(class) = leaf::export_class(types, source) else {
			tracing::debug!(index, type_name, "export class is not registered");
			return Ok(None);
		};

		let outer = source.get_str("Outer").and_then(|outer| self.find_materialized(outer));
		let id = self.world.spawn(types, class, name, &self.import.package_path, outer)?;
		self.table.register(index, id);
		tracing::trace!(index, type_name, name, "materialized export");

		if let Some(properties) = export_properties(source, self.import.merge_lod_data) {
			let properties = if self.import.excluded_properties.is_empty() {
				properties
			} else {
				let excluded: Vec<&str> = self.import.excluded_properties.iter().map(String::as_str).collect();
				remove_keys(&properties, &excluded)
			};
			self.populate(id, &properties)?;
		}
		Ok(Some(id))
	}

	fn find_materialized(&self, name: &str) -> Option<ObjectId> {
		self.table
			.materialized()
			.find(|(_, id)| self.world.get(*id).is_ok_and(|object| object.name == name))
			.map(|(_, id)| id)
			.or_else(|| self.world.find_by_name(name))
	}

	/// Decode `properties` into a live object through its class codec.
	///
	/// Properties are written back to the object before an error propagates.
	pub fn populate(&mut self, id: ObjectId, properties: &Object) -> Result<()> {
		let instance = self.world.get_mut(id)?;
		let class = instance.class;
		let mut data = std::mem::replace(
			&mut instance.properties,
			StructData {
				type_idx: class,
				fields: Vec::new(),
			},
		);

		let codec = self.env.serializers.get(class);
		let result = codec.deserialize(self, properties, &mut data);
		self.world.get_mut(id)?.properties = data;
		result
	}

	fn resolve_object(&mut self, context: &str, class: TypeIdx, input: &Value) -> Result<Option<ObjectId>> {
		let (resolved, source_path) = match input {
			Value::Number(_) => {
				let Some(index) = input.as_index() else {
					self.env.violation(shape(context, "Number", input))?;
					return Ok(None);
				};
				(self.resolve_index(index)?, index.to_string())
			}
			Value::Object(reference) => {
				let path = reference.get("ObjectPath").and_then(Value::as_str).unwrap_or_default().to_owned();
				(self.resolve_reference(reference)?, path)
			}
			other => {
				self.env.violation(shape(context, "Object", other))?;
				return Ok(None);
			}
		};

		if resolved.is_none() {
			let types = self.env.types;
			self.diagnostics.push(FailedPropertyRecord {
				type_name: types.name_of(class).to_owned(),
				super_type_name: types.super_name(class).to_owned(),
				source_path,
			});
		}
		Ok(resolved)
	}

	fn resolve_reference(&mut self, reference: &Object) -> Result<Option<ObjectId>> {
		if let Some(index) = self.table.find_export(reference) {
			if let Some(id) = self.resolve_index(index)? {
				return Ok(Some(id));
			}
		}

		let object_path = reference.get("ObjectPath").and_then(Value::as_str).unwrap_or_default();
		if let Some((package, index)) = export_index_from_path(object_path) {
			if !self.import.package_path.is_empty() && package == self.import.package_path {
				if let Some(id) = self.resolve_index(index)? {
					return Ok(Some(id));
				}
			}
		}

		let object_name = reference.get("ObjectName").and_then(Value::as_str).unwrap_or_default();
		Ok(leaf::find_named(self.world, object_name))
	}

	fn resolve_soft(&mut self, class: TypeIdx, path: &SoftObjectPath) {
		let types = self.env.types;
		self.request_soft(types.name_of(class), types.super_name(class), path);
	}

	fn request_soft(&mut self, class_name: &str, super_name: &str, path: &SoftObjectPath) {
		if !self.env.options.resolve_soft_references {
			return;
		}
		let full = path.to_string();
		if self.resolver.try_local_load(self.world, &full).is_some() {
			return;
		}
		let request = RemoteImportRequest::from_path(class_name, &path.asset_path);
		if !self.resolver.request_remote_import(request) {
			self.diagnostics.push(FailedPropertyRecord {
				type_name: class_name.to_owned(),
				super_type_name: super_name.to_owned(),
				source_path: full,
			});
		}
	}

	fn mismatch(&self, context: &str, kind: &Kind) -> Result<()> {
		self.env.violation(AssetError::StorageMismatch {
			field: context.to_owned(),
			expected: kind.storage_label(),
		})
	}
}

pub(super) fn map_pair<'v>(context: &str, item: &'v Value) -> Result<(&'v Value, &'v Value)> {
	let Some(pair) = item.as_object() else {
		return Err(shape(context, "Object", item));
	};
	let missing = |key| AssetError::MissingPairField {
		field: context.to_owned(),
		key,
	};
	let key = pair.get("Key").ok_or_else(|| missing("Key"))?;
	let value = pair.get("Value").ok_or_else(|| missing("Value"))?;
	Ok((key, value))
}
