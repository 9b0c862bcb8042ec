use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::asset::data::{PropertyValue, StructData};
use crate::asset::gate::should_include;
use crate::asset::marshal::{Comparator, Deserializer, Serializer};
use crate::asset::types::{FieldDescriptor, TypeIdx, TypeRegistry, builtin};
use crate::asset::value::{Object, Value};
use crate::asset::{AssetError, Result};

/// Codec for one struct type.
pub trait StructSerializer: fmt::Debug {
	/// Encode struct storage as a value object.
	fn serialize(&self, ser: &mut Serializer<'_>, data: &StructData, referenced: Option<&mut Vec<usize>>) -> Result<Object>;

	/// Decode a value object into existing struct storage.
	fn deserialize(&self, de: &mut Deserializer<'_>, input: &Object, dest: &mut StructData) -> Result<()>;

	/// Return whether decoding `input` would leave `live` unchanged.
	fn compare(&self, cmp: &mut Comparator<'_>, input: &Object, live: &StructData) -> Result<bool>;
}

/// Fallback codec iterating every included field in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericStructSerializer;

impl StructSerializer for GenericStructSerializer {
	fn serialize(&self, ser: &mut Serializer<'_>, data: &StructData, mut referenced: Option<&mut Vec<usize>>) -> Result<Object> {
		let env = ser.env();
		let def = env.types.struct_def(data.type_idx)?;
		let mut out = Object::new();
		for (field, value) in def.fields.iter().zip(&data.fields) {
			if !should_include(env.serializers, field) {
				continue;
			}
			let encoded = ser.serialize_field(field, value, referenced.as_deref_mut())?;
			out.insert(field.name.to_string(), encoded);
		}
		Ok(out)
	}

	fn deserialize(&self, de: &mut Deserializer<'_>, input: &Object, dest: &mut StructData) -> Result<()> {
		let env = de.env();
		let def = env.types.struct_def(dest.type_idx)?;
		for (field, slot) in def.fields.iter().zip(dest.fields.iter_mut()) {
			if !should_include(env.serializers, field) {
				continue;
			}
			if let Some(value) = input.get(field.name.as_ref()) {
				de.deserialize_field(field, value, slot)?;
			}
		}
		Ok(())
	}

	fn compare(&self, cmp: &mut Comparator<'_>, input: &Object, live: &StructData) -> Result<bool> {
		let env = cmp.env();
		let def = env.types.struct_def(live.type_idx)?;
		for (field, value) in def.fields.iter().zip(&live.fields) {
			if !should_include(env.serializers, field) {
				continue;
			}
			let Some(encoded) = input.get(field.name.as_ref()) else {
				continue;
			};
			if !cmp.compare_field(field, encoded, value)? {
				return Ok(false);
			}
		}
		Ok(true)
	}
}

/// Codec packing an `i64` tick count into a decimal `Ticks` string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicksSerializer;

const TICKS: &str = "Ticks";

impl TicksSerializer {
	fn ticks(types: &TypeRegistry, data: &StructData) -> Result<i64> {
		match data.get(types, TICKS) {
			Some(PropertyValue::Int(ticks)) => Ok(*ticks),
			Some(_) => Err(AssetError::StorageMismatch {
				field: TICKS.to_owned(),
				expected: "Int",
			}),
			None => Err(AssetError::FieldNotFound {
				type_name: types.name_of(data.type_idx).to_owned(),
				field: TICKS.to_owned(),
			}),
		}
	}

	fn parse(value: &Value) -> Result<i64> {
		match value {
			Value::String(text) => text.trim().parse().map_err(|_| AssetError::InvalidTicks { input: text.clone() }),
			Value::Number(number) if number.fract() == 0.0 => Ok(*number as i64),
			other => Err(AssetError::UnexpectedShape {
				context: TICKS.to_owned(),
				expected: "String",
				got: other.kind_name(),
			}),
		}
	}
}

impl StructSerializer for TicksSerializer {
	fn serialize(&self, ser: &mut Serializer<'_>, data: &StructData, _referenced: Option<&mut Vec<usize>>) -> Result<Object> {
		let ticks = Self::ticks(ser.env().types, data)?;
		let mut out = Object::new();
		out.insert(TICKS.to_owned(), Value::String(ticks.to_string()));
		Ok(out)
	}

	fn deserialize(&self, de: &mut Deserializer<'_>, input: &Object, dest: &mut StructData) -> Result<()> {
		let Some(encoded) = input.get(TICKS) else {
			return Ok(());
		};
		let env = de.env();
		if let Some(ticks) = env.tolerate(Self::parse(encoded))? {
			dest.set(env.types, TICKS, PropertyValue::Int(ticks))?;
		}
		Ok(())
	}

	fn compare(&self, cmp: &mut Comparator<'_>, input: &Object, live: &StructData) -> Result<bool> {
		let Some(encoded) = input.get(TICKS) else {
			return Ok(true);
		};
		let env = cmp.env();
		let live_ticks = Self::ticks(env.types, live)?;
		Ok(env.tolerate(Self::parse(encoded))? == Some(live_ticks))
	}
}

/// Explicit registry of struct codecs and blacklisted fields.
#[derive(Debug, Default)]
pub struct SerializerRegistry {
	custom: HashMap<TypeIdx, Box<dyn StructSerializer>>,
	generic: GenericStructSerializer,
	blacklisted: HashMap<TypeIdx, HashSet<Box<str>>>,
}

impl SerializerRegistry {
	/// Create a registry with only the generic fallback.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a registry with the tick codecs for `DateTime` and `Timespan`.
	pub fn with_builtins(types: &TypeRegistry) -> Result<Self> {
		let mut registry = Self::new();
		for name in [builtin::DATE_TIME, builtin::TIMESPAN] {
			let idx = types.require(name)?;
			registry.register(idx, Box::new(TicksSerializer));
		}
		Ok(registry)
	}

	/// Return the codec for a struct type, falling back to the generic one.
	pub fn get(&self, type_idx: TypeIdx) -> &dyn StructSerializer {
		match self.custom.get(&type_idx) {
			Some(codec) => codec.as_ref(),
			None => &self.generic,
		}
	}

	/// Return whether a custom codec is registered for a struct type.
	pub fn has_custom(&self, type_idx: TypeIdx) -> bool {
		self.custom.contains_key(&type_idx)
	}

	/// Register a custom codec, replacing any previous one.
	pub fn register(&mut self, type_idx: TypeIdx, codec: Box<dyn StructSerializer>) {
		self.custom.insert(type_idx, codec);
	}

	/// Exclude a field of `type_idx` from marshalling.
	///
	/// Inherited fields are blacklisted on the type that declared them.
	pub fn blacklist(&mut self, types: &TypeRegistry, type_idx: TypeIdx, field_name: &str) -> Result<()> {
		let def = types.struct_def(type_idx)?;
		let field = def.field(field_name).ok_or_else(|| AssetError::FieldNotFound {
			type_name: def.name.to_string(),
			field: field_name.to_owned(),
		})?;
		self.blacklisted.entry(field.owner).or_default().insert(field.name.clone());
		Ok(())
	}

	/// Return whether a field was blacklisted.
	pub fn is_blacklisted(&self, field: &FieldDescriptor) -> bool {
		self.blacklisted.get(&field.owner).is_some_and(|names| names.contains(field.name.as_ref()))
	}
}
