/// Property whose referenced object could not be resolved during import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FailedPropertyRecord {
	/// Declared class of the reference.
	pub type_name: String,
	/// Parent of the declared class, or `None`.
	pub super_type_name: String,
	/// Path the reference pointed at.
	pub source_path: String,
}

/// Session-spanning list of unresolved references, deduplicated on insert.
///
/// A second list holds what was pushed since the last [`Diagnostics::take_recent`],
/// including records the session list already had.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
	records: Vec<FailedPropertyRecord>,
	recent: Vec<FailedPropertyRecord>,
}

impl Diagnostics {
	/// Create an empty sink.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a record unless an identical one exists; returns whether it was added.
	pub fn push(&mut self, record: FailedPropertyRecord) -> bool {
		if !self.recent.contains(&record) {
			self.recent.push(record.clone());
		}
		if self.records.contains(&record) {
			return false;
		}
		tracing::warn!(
			type_name = %record.type_name,
			source_path = %record.source_path,
			"unresolved property reference"
		);
		self.records.push(record);
		true
	}

	/// Borrow all records in insertion order.
	pub fn records(&self) -> &[FailedPropertyRecord] {
		&self.records
	}

	/// Take records pushed since the previous call, each once.
	pub fn take_recent(&mut self) -> Vec<FailedPropertyRecord> {
		std::mem::take(&mut self.recent)
	}

	/// Return number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Return whether no records exist.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Drop every record.
	pub fn clear(&mut self) {
		self.records.clear();
		self.recent.clear();
	}
}
