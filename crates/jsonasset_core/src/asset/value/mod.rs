use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered string-keyed object payload.
pub type Object = IndexMap<String, Value>;

/// Dynamic tagged value used for both the wire format and staging values.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
	/// Explicit null marker.
	#[default]
	Null,
	/// Boolean scalar.
	Bool(bool),
	/// Numeric scalar; integers are carried as `f64`.
	Number(f64),
	/// UTF-8 string.
	String(String),
	/// Ordered sequence.
	Array(Vec<Value>),
	/// Ordered object with unique keys.
	Object(Object),
}

impl Value {
	/// Return a stable label for the value shape.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Null => "Null",
			Self::Bool(_) => "Bool",
			Self::Number(_) => "Number",
			Self::String(_) => "String",
			Self::Array(_) => "Array",
			Self::Object(_) => "Object",
		}
	}

	/// Return whether this value is `Null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Borrow the boolean payload.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			_ => None,
		}
	}

	/// Borrow the numeric payload.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number(value) => Some(*value),
			_ => None,
		}
	}

	/// Borrow the string payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Borrow the array payload.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Borrow the object payload.
	pub fn as_object(&self) -> Option<&Object> {
		match self {
			Self::Object(object) => Some(object),
			_ => None,
		}
	}

	/// Look up an object field by key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.as_object().and_then(|object| object.get(key))
	}

	/// Look up an object field and borrow it as a string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	/// Interpret the value as a non-negative integer index.
	pub fn as_index(&self) -> Option<usize> {
		let number = self.as_f64()?;
		if number < 0.0 || number.fract() != 0.0 || number > u32::MAX as f64 {
			return None;
		}
		Some(number as usize)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Number(value as f64)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Self::Array(items)
	}
}

impl From<Object> for Value {
	fn from(object: Object) -> Self {
		Self::Object(object)
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(value) => Self::Bool(value),
			serde_json::Value::Number(number) => Self::Number(number.as_f64().unwrap_or(0.0)),
			serde_json::Value::String(value) => Self::String(value),
			serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Value::from).collect()),
			serde_json::Value::Object(map) => Self::Object(map.into_iter().map(|(key, value)| (key, Value::from(value))).collect()),
		}
	}
}

impl From<&Value> for serde_json::Value {
	fn from(value: &Value) -> Self {
		match value {
			Value::Null => serde_json::Value::Null,
			Value::Bool(value) => serde_json::Value::Bool(*value),
			Value::Number(number) => number_to_json(*number),
			Value::String(value) => serde_json::Value::String(value.clone()),
			Value::Array(items) => serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect()),
			Value::Object(object) => serde_json::Value::Object(
				object
					.iter()
					.map(|(key, value)| (key.clone(), serde_json::Value::from(value)))
					.collect(),
			),
		}
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self {
			Self::Null => serializer.serialize_unit(),
			Self::Bool(value) => serializer.serialize_bool(*value),
			Self::Number(number) => match integral(*number) {
				Some(value) => serializer.serialize_i64(value),
				None => serializer.serialize_f64(*number),
			},
			Self::String(value) => serializer.serialize_str(value),
			Self::Array(items) => serializer.collect_seq(items),
			Self::Object(object) => serializer.collect_map(object),
		}
	}
}

impl<'de> Deserialize<'de> for Value {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		serde_json::Value::deserialize(deserializer).map(Value::from)
	}
}

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn integral(number: f64) -> Option<i64> {
	(number.fract() == 0.0 && number.abs() <= MAX_EXACT_INTEGER).then_some(number as i64)
}

fn number_to_json(number: f64) -> serde_json::Value {
	if let Some(value) = integral(number) {
		return serde_json::Value::from(value);
	}
	serde_json::Number::from_f64(number)
		.map(serde_json::Value::Number)
		.unwrap_or(serde_json::Value::Null)
}

/// Return a copy of `object` without the listed keys.
pub fn remove_keys(object: &Object, removed: &[&str]) -> Object {
	object
		.iter()
		.filter(|(key, _)| !removed.contains(&key.as_str()))
		.map(|(key, value)| (key.clone(), value.clone()))
		.collect()
}

/// Return a new object holding only the listed keys, in list order.
pub fn keep_keys(object: &Object, kept: &[&str]) -> Object {
	kept.iter()
		.filter_map(|key| object.get(*key).map(|value| ((*key).to_owned(), value.clone())))
		.collect()
}
