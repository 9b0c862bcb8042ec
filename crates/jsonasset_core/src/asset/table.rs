use std::collections::HashMap;

use crate::asset::export::ExportReference;
use crate::asset::value::{Object, Value};
use crate::asset::world::ObjectId;

/// One slot of the object table.
#[derive(Debug, Clone, Default)]
pub struct TableEntry {
	/// Export record backing the slot, when imported.
	pub source: Option<Value>,
	/// Live instance, once materialized.
	pub instance: Option<ObjectId>,
}

/// Session-scoped, append-only registry mapping export indices to live instances.
///
/// An instance is registered before its properties are populated; a second visit of the same
/// index returns the registered instance, which is what breaks reference cycles.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
	entries: Vec<TableEntry>,
	by_instance: HashMap<ObjectId, usize>,
}

impl ObjectTable {
	/// Create an empty table for an export session.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a table whose slots mirror an export file.
	pub fn from_exports(exports: &[Value]) -> Self {
		Self {
			entries: exports
				.iter()
				.map(|export| TableEntry {
					source: Some(export.clone()),
					instance: None,
				})
				.collect(),
			by_instance: HashMap::new(),
		}
	}

	/// Return number of slots.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Return whether the table has no slots.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Borrow a slot by index.
	pub fn entry(&self, index: usize) -> Option<&TableEntry> {
		self.entries.get(index)
	}

	/// Borrow the export record of a slot.
	pub fn source(&self, index: usize) -> Option<&Value> {
		self.entries.get(index).and_then(|entry| entry.source.as_ref())
	}

	/// Return the instance materialized for a slot.
	pub fn instance(&self, index: usize) -> Option<ObjectId> {
		self.entries.get(index).and_then(|entry| entry.instance)
	}

	/// Return the slot an instance occupies.
	pub fn index_of(&self, id: ObjectId) -> Option<usize> {
		self.by_instance.get(&id).copied()
	}

	/// Record the instance materialized for an existing slot.
	///
	/// Returns `false` when the index is out of range.
	pub fn register(&mut self, index: usize, id: ObjectId) -> bool {
		let Some(entry) = self.entries.get_mut(index) else {
			return false;
		};
		entry.instance = Some(id);
		self.by_instance.entry(id).or_insert(index);
		true
	}

	/// Return the slot of an instance, appending one on first sight.
	pub fn index_for(&mut self, id: ObjectId) -> usize {
		if let Some(index) = self.index_of(id) {
			return index;
		}
		let index = self.entries.len();
		self.entries.push(TableEntry {
			source: None,
			instance: Some(id),
		});
		self.by_instance.insert(id, index);
		index
	}

	/// Locate the slot whose export a package reference points at.
	pub fn find_export(&self, reference: &Object) -> Option<usize> {
		let target = ExportReference::from_object(reference)?;
		self.entries
			.iter()
			.position(|entry| entry.source.as_ref().is_some_and(|source| target.matches(source)))
	}

	/// Iterate slot indices whose instance is materialized.
	pub fn materialized(&self) -> impl Iterator<Item = (usize, ObjectId)> + '_ {
		self.entries.iter().enumerate().filter_map(|(index, entry)| entry.instance.map(|id| (index, id)))
	}
}
