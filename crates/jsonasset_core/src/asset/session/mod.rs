use crate::asset::diagnostics::{Diagnostics, FailedPropertyRecord};
use crate::asset::export::{ExportFile, is_proper_export};
use crate::asset::marshal::{CompareContext, Comparator, Deserializer, MarshalEnv, MarshalOptions, Serializer};
use crate::asset::registry::SerializerRegistry;
use crate::asset::soft::SoftReferenceResolver;
use crate::asset::table::ObjectTable;
use crate::asset::types::TypeRegistry;
use crate::asset::value::{Object, Value};
use crate::asset::world::{ObjectId, ObjectWorld};
use crate::asset::Result;

/// Per-import settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
	/// Package path new objects are created in.
	pub package_path: String,
	/// Property keys dropped from every export before decoding.
	pub excluded_properties: Vec<String>,
	/// Whether an export's `LODData` is merged into its properties.
	pub merge_lod_data: bool,
}

impl Default for ImportOptions {
	fn default() -> Self {
		Self {
			package_path: "/Game".to_owned(),
			excluded_properties: Vec::new(),
			merge_lod_data: true,
		}
	}
}

impl ImportOptions {
	/// Preset creating objects in `package_path`.
	pub fn for_package(package_path: &str) -> Self {
		Self {
			package_path: package_path.to_owned(),
			..Self::default()
		}
	}
}

/// Object created by an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedObject {
	/// Export index the object came from.
	pub index: usize,
	/// Live object handle.
	pub id: ObjectId,
}

/// Result of one import.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
	/// Materialized exports in index order.
	pub created: Vec<ImportedObject>,
	/// Indices of records that are not proper exports and were not referenced.
	pub skipped: Vec<usize>,
	/// Unresolved references this import hit, including ones an earlier import already recorded.
	pub failed: Vec<FailedPropertyRecord>,
}

/// Outcome of comparing one export against the live world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareStatus {
	/// Re-importing would not change the object.
	Unchanged,
	/// Re-importing would change the object.
	Changed,
	/// No live object carries the export's class and name.
	Missing,
}

/// Per-export comparison verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareEntry {
	/// Export index.
	pub index: usize,
	/// Export class name.
	pub type_name: String,
	/// Export name.
	pub name: String,
	/// Verdict.
	pub status: CompareStatus,
	/// Live object compared against.
	pub live: Option<ObjectId>,
}

/// Driver for import, export, and compare passes sharing one pair of registries.
///
/// Diagnostics accumulate across imports until [`AssetSession::clear_cached_data`].
#[derive(Debug)]
pub struct AssetSession<'a> {
	env: MarshalEnv<'a>,
	diagnostics: Diagnostics,
}

impl<'a> AssetSession<'a> {
	/// Create a session over shared registries.
	pub fn new(types: &'a TypeRegistry, serializers: &'a SerializerRegistry, options: MarshalOptions) -> Self {
		Self {
			env: MarshalEnv::new(types, serializers, options),
			diagnostics: Diagnostics::new(),
		}
	}

	/// Return the shared registries and options.
	pub fn env(&self) -> MarshalEnv<'a> {
		self.env
	}

	/// Borrow accumulated diagnostics.
	pub fn diagnostics(&self) -> &Diagnostics {
		&self.diagnostics
	}

	/// Drop accumulated diagnostics.
	pub fn clear_cached_data(&mut self) {
		self.diagnostics.clear();
	}

	/// Import every export of `file` into `world`.
	///
	/// Fatal errors abort the import; objects and fields written before the failure stay in place.
	pub fn import(
		&mut self,
		file: &ExportFile,
		world: &mut ObjectWorld,
		resolver: &mut dyn SoftReferenceResolver,
		options: &ImportOptions,
	) -> Result<ImportReport> {
		tracing::debug!(exports = file.len(), package = %options.package_path, "import start");
		// Drop leftovers of an import that aborted.
		self.diagnostics.take_recent();
		let mut table = ObjectTable::from_exports(&file.exports);

		{
			let mut de = Deserializer::new(self.env, &mut table, world, &mut self.diagnostics, resolver, options);
			for (index, export) in file.exports.iter().enumerate() {
				if is_proper_export(export) {
					de.resolve_index(index)?;
				}
			}
		}

		let created: Vec<_> = table.materialized().map(|(index, id)| ImportedObject { index, id }).collect();
		let skipped = (0..table.len()).filter(|index| table.instance(*index).is_none()).collect();
		let failed = self.diagnostics.take_recent();
		tracing::debug!(created = created.len(), failed = failed.len(), "import done");

		Ok(ImportReport { created, skipped, failed })
	}

	/// Write `roots` and every object they reference as export records.
	///
	/// Record positions equal the reference indices written into properties.
	pub fn export_objects(&self, world: &ObjectWorld, roots: &[ObjectId]) -> Result<Vec<Value>> {
		let types = self.env.types;
		let mut table = ObjectTable::new();
		for root in roots {
			table.index_for(*root);
		}

		let mut ser = Serializer::new(self.env, &mut table);
		let mut exports = Vec::new();
		let mut index = 0;
		while let Some(id) = ser.table().instance(index) {
			let object = world.get(id)?;
			let properties = ser.serialize_struct(&object.properties, None)?;

			let mut record = Object::new();
			record.insert("Type".to_owned(), Value::from(types.name_of(object.class)));
			record.insert("Name".to_owned(), Value::from(object.name.as_str()));
			if let Some(outer) = object.outer {
				record.insert("Outer".to_owned(), Value::from(world.get(outer)?.name.as_str()));
			}
			record.insert("Properties".to_owned(), Value::Object(properties));
			exports.push(Value::Object(record));
			index += 1;
		}
		tracing::debug!(exports = exports.len(), "export done");
		Ok(exports)
	}

	/// Decide for every proper export of `file` whether re-importing it would change `world`.
	///
	/// Exports are matched to live objects by class and name.
	pub fn compare(&self, file: &ExportFile, world: &ObjectWorld) -> Result<Vec<CompareEntry>> {
		self.compare_with(file, world, &ImportOptions::default())
	}

	/// Like [`AssetSession::compare`], predicting an import run with `options`.
	pub fn compare_with(&self, file: &ExportFile, world: &ObjectWorld, options: &ImportOptions) -> Result<Vec<CompareEntry>> {
		let types = self.env.types;
		let table = ObjectTable::from_exports(&file.exports);
		let mut context = CompareContext::new();
		let mut cmp = Comparator::new(self.env, &table, world, &mut context).with_lod_merge(options.merge_lod_data);

		let mut entries = Vec::new();
		for (index, export) in file.exports.iter().enumerate() {
			if !is_proper_export(export) {
				continue;
			}
			let type_name = export.get_str("Type").unwrap_or_default();
			let name = export.get_str("Name").unwrap_or_default();
			let live = world
				.iter()
				.find(|(_, object)| object.name == name && types.name_of(object.class) == type_name)
				.map(|(id, _)| id);

			let status = match live {
				None => CompareStatus::Missing,
				Some(id) if cmp.compare_object(index, id)? => CompareStatus::Unchanged,
				Some(_) => CompareStatus::Changed,
			};
			entries.push(CompareEntry {
				index,
				type_name: type_name.to_owned(),
				name: name.to_owned(),
				status,
				live,
			});
		}
		Ok(entries)
	}
}
