use crate::asset::data::{PropertyValue, StructData};
use crate::asset::marshal::leaf::unsupported;
use crate::asset::marshal::{MarshalEnv, element_context};
use crate::asset::table::ObjectTable;
use crate::asset::types::{FieldDescriptor, Kind, TypeIdx};
use crate::asset::value::{Object, Value};
use crate::asset::world::ObjectId;
use crate::asset::{AssetError, Result};

/// Literal emitted for delegate fields, which never round-trip.
pub const DELEGATE_SENTINEL: &str = "##NOT SERIALIZED##";

/// Encoder from host storage to values.
///
/// Object references are written as table indices, assigned on first sight.
#[derive(Debug)]
pub struct Serializer<'a> {
	env: MarshalEnv<'a>,
	table: &'a mut ObjectTable,
}

impl<'a> Serializer<'a> {
	/// Create an encoder writing references into `table`.
	pub fn new(env: MarshalEnv<'a>, table: &'a mut ObjectTable) -> Self {
		Self { env, table }
	}

	/// Return the shared registries and options.
	pub fn env(&self) -> MarshalEnv<'a> {
		self.env
	}

	/// Borrow the object table.
	pub fn table(&self) -> &ObjectTable {
		self.table
	}

	/// Encode one field, expanding fixed-size arrays to exactly `array_dim` values.
	pub fn serialize_field(&mut self, field: &FieldDescriptor, value: &PropertyValue, mut referenced: Option<&mut Vec<usize>>) -> Result<Value> {
		if !field.is_fixed_array() {
			return self.serialize_kind(&field.name, &field.kind, value, referenced);
		}

		let slots = match value {
			PropertyValue::Static(slots) if slots.len() == field.array_dim => slots,
			_ => {
				self.env.violation(AssetError::StorageMismatch {
					field: field.name.to_string(),
					expected: "Static",
				})?;
				return Ok(Value::Null);
			}
		};

		let mut out = Vec::with_capacity(field.array_dim);
		for (idx, slot) in slots.iter().enumerate() {
			out.push(self.serialize_kind(&element_context(&field.name, idx), &field.kind, slot, referenced.as_deref_mut())?);
		}
		Ok(Value::Array(out))
	}

	/// Encode struct storage through its registered codec.
	pub fn serialize_struct(&mut self, data: &StructData, referenced: Option<&mut Vec<usize>>) -> Result<Object> {
		let codec = self.env.serializers.get(data.type_idx);
		codec.serialize(self, data, referenced)
	}

	/// Encode one value of `kind`.
	pub fn serialize_kind(&mut self, context: &str, kind: &Kind, value: &PropertyValue, mut referenced: Option<&mut Vec<usize>>) -> Result<Value> {
		let mismatch = |expected: &'static str| AssetError::StorageMismatch {
			field: context.to_owned(),
			expected,
		};

		let encoded = match (kind, value) {
			(Kind::Opaque(name), _) => return Err(unsupported(name, context)),
			(Kind::Bool, PropertyValue::Bool(value)) => Value::Bool(*value),
			(Kind::Int, PropertyValue::Int(value)) => Value::from(*value),
			(Kind::Float, PropertyValue::Float(value)) => Value::Number(*value),
			(Kind::Byte { enum_type }, PropertyValue::Byte(value)) => self.enum_name(*enum_type, i64::from(*value))?,
			(Kind::Enum { enum_type }, PropertyValue::Enum(value)) => self.enum_name(Some(*enum_type), *value)?,
			(Kind::Name, PropertyValue::Name(value)) => Value::from(value.as_ref()),
			(Kind::String, PropertyValue::String(value)) | (Kind::FieldPath, PropertyValue::FieldPath(value)) => Value::from(value.as_str()),
			(Kind::Text, PropertyValue::Text(text)) => Value::String(text.to_export_string()),
			(Kind::Struct(idx), PropertyValue::Struct(data)) if data.type_idx == *idx => Value::Object(self.serialize_struct(data, referenced)?),
			(Kind::Object { .. }, PropertyValue::Object(target)) | (Kind::Interface { .. }, PropertyValue::Interface(target)) => {
				self.reference(*target, referenced)
			}
			(Kind::SoftObject { .. }, PropertyValue::SoftObject(path)) => Value::String(path.to_string()),
			(Kind::Delegate { .. }, PropertyValue::Delegate(_)) => Value::from(DELEGATE_SENTINEL),
			(Kind::Map { key, value: value_kind }, PropertyValue::Map(map)) => {
				let mut out = Vec::with_capacity(map.len());
				for (idx, (entry_key, entry_value)) in map.iter().enumerate() {
					let entry_context = element_context(context, idx);
					let mut pair = Object::new();
					pair.insert("Key".to_owned(), self.serialize_kind(&entry_context, key, entry_key, referenced.as_deref_mut())?);
					pair.insert(
						"Value".to_owned(),
						self.serialize_kind(&entry_context, value_kind, entry_value, referenced.as_deref_mut())?,
					);
					out.push(Value::Object(pair));
				}
				Value::Array(out)
			}
			(Kind::Set(elem), PropertyValue::Set(set)) => {
				let mut out = Vec::with_capacity(set.len());
				for (idx, item) in set.iter().enumerate() {
					out.push(self.serialize_kind(&element_context(context, idx), elem, item, referenced.as_deref_mut())?);
				}
				Value::Array(out)
			}
			(Kind::Array(elem), PropertyValue::Array(items)) => {
				let mut out = Vec::with_capacity(items.len());
				for (idx, item) in items.iter().enumerate() {
					out.push(self.serialize_kind(&element_context(context, idx), elem, item, referenced.as_deref_mut())?);
				}
				Value::Array(out)
			}
			(kind, _) => {
				self.env.violation(mismatch(kind.storage_label()))?;
				Value::Null
			}
		};
		Ok(encoded)
	}

	fn enum_name(&self, enum_type: Option<TypeIdx>, value: i64) -> Result<Value> {
		let Some(enum_type) = enum_type else {
			return Ok(Value::from(value));
		};
		let def = self.env.types.enum_def(enum_type)?;
		Ok(match def.name_of(value) {
			Some(name) => Value::String(name),
			None => Value::from(value),
		})
	}

	fn reference(&mut self, target: Option<ObjectId>, referenced: Option<&mut Vec<usize>>) -> Value {
		let Some(id) = target else {
			return Value::Null;
		};
		let index = self.table.index_for(id);
		if let Some(list) = referenced {
			if !list.contains(&index) {
				list.push(index);
			}
		}
		Value::from(index as i64)
	}
}
