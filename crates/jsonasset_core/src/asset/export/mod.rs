use std::fs;
use std::path::Path;

use crate::asset::compression::{Compression, decode_bytes};
use crate::asset::value::{Object, Value};
use crate::asset::{AssetError, Result};

/// Loaded export file: the top-level array of export records.
#[derive(Debug, Clone)]
pub struct ExportFile {
	/// Compression mode detected for source bytes.
	pub compression: Compression,
	/// Export records in file order; indices are reference targets.
	pub exports: Vec<Value>,
}

impl ExportFile {
	/// Read, decode, and parse an export file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let raw = fs::read(path)?;
		let (compression, bytes) = decode_bytes(raw)?;
		let value: Value = serde_json::from_slice(&bytes)?;
		let mut file = Self::from_value(value)?;
		file.compression = compression;
		Ok(file)
	}

	/// Parse export JSON text.
	pub fn from_json_str(text: &str) -> Result<Self> {
		Self::from_value(serde_json::from_str(text)?)
	}

	/// Wrap an already parsed top-level value.
	pub fn from_value(value: Value) -> Result<Self> {
		let Value::Array(exports) = value else {
			return Err(AssetError::InvalidExportFile {
				reason: "top level is not an array",
			});
		};
		if !exports.iter().all(|export| matches!(export, Value::Object(_))) {
			return Err(AssetError::InvalidExportFile {
				reason: "export record is not an object",
			});
		}
		Ok(Self {
			compression: Compression::None,
			exports,
		})
	}

	/// Return number of export records.
	pub fn len(&self) -> usize {
		self.exports.len()
	}

	/// Return whether the file holds no exports.
	pub fn is_empty(&self) -> bool {
		self.exports.is_empty()
	}

	/// Borrow an export record by index.
	pub fn get(&self, index: usize) -> Option<&Value> {
		self.exports.get(index)
	}

	/// Locate the export a package reference points at.
	pub fn find_export(&self, reference: &Object) -> Option<usize> {
		find_export(reference, &self.exports)
	}
}

/// Return whether an export record carries `Type`, `Name`, and `Properties`.
pub fn is_proper_export(export: &Value) -> bool {
	["Type", "Name", "Properties"].iter().all(|key| export.get(key).is_some())
}

/// Export name and optional outer parsed from a package reference `ObjectName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReference {
	/// Outer export name; empty when absent.
	pub outer: String,
	/// Export name.
	pub name: String,
}

impl ExportReference {
	/// Parse `Class'Asset:Outer.Export'` style names.
	pub fn parse(object_name: &str) -> Self {
		let mut name = object_name;
		if let Some((_, rest)) = name.split_once('\'') {
			name = rest;
		}
		if let Some((inner, _)) = name.split_once('\'') {
			name = inner;
		}
		if let Some((_, rest)) = name.split_once(':') {
			name = rest;
		}
		if let Some((_, rest)) = name.split_once('.') {
			name = rest;
		}
		let (outer, name) = name.split_once('.').unwrap_or(("", name));
		Self {
			outer: outer.to_owned(),
			name: name.to_owned(),
		}
	}

	/// Parse the `ObjectName` of a package reference object.
	pub fn from_object(reference: &Object) -> Option<Self> {
		reference.get("ObjectName").and_then(Value::as_str).map(Self::parse)
	}

	/// Return whether an export record is the referenced one.
	///
	/// Outers are only compared when both sides carry one.
	pub fn matches(&self, export: &Value) -> bool {
		if export.get_str("Name") != Some(self.name.as_str()) {
			return false;
		}
		match export.get_str("Outer") {
			Some(outer) if !self.outer.is_empty() => outer == self.outer,
			_ => true,
		}
	}
}

/// Locate the export a package reference `{ObjectName, ObjectPath}` points at.
pub fn find_export(reference: &Object, exports: &[Value]) -> Option<usize> {
	let target = ExportReference::from_object(reference)?;
	exports.iter().position(|export| target.matches(export))
}

/// Split an `ObjectPath` of the form `Package/Asset.N` into package and export index.
pub fn export_index_from_path(object_path: &str) -> Option<(&str, usize)> {
	let (package, index) = object_path.split_once('.')?;
	Some((package, index.trim().parse().ok()?))
}

/// Return the `Properties` of an export, with `LODData` merged in when requested.
pub fn export_properties(export: &Value, merge_lod_data: bool) -> Option<Object> {
	let mut properties = export.get("Properties")?.as_object()?.clone();
	if let Some(lod) = export.get("LODData").filter(|_| merge_lod_data) {
		properties.insert("LODData".to_owned(), lod.clone());
	}
	Some(properties)
}
