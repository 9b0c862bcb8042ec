//! Recursive property marshalling over every field kind.

use std::collections::HashMap;

use crate::asset::registry::SerializerRegistry;
use crate::asset::types::TypeRegistry;
use crate::asset::world::ObjectId;
use crate::asset::{AssetError, Result};

mod compare;
mod deserialize;
mod leaf;
mod serialize;

pub use compare::Comparator;
pub use deserialize::Deserializer;
pub use serialize::{DELEGATE_SENTINEL, Serializer};

/// How structural contract violations are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContractPolicy {
	/// Return the violation as an error.
	#[default]
	Strict,
	/// Log the violation and continue best-effort.
	Permissive,
}

/// Marshalling configuration shared by every pass of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarshalOptions {
	/// Contract violation handling.
	pub contract_policy: ContractPolicy,
	/// Whether soft references are resolved locally or requested remotely during import.
	pub resolve_soft_references: bool,
}

impl Default for MarshalOptions {
	fn default() -> Self {
		Self {
			contract_policy: ContractPolicy::Strict,
			resolve_soft_references: true,
		}
	}
}

impl MarshalOptions {
	/// Preset that logs contract violations instead of failing.
	pub fn permissive() -> Self {
		Self {
			contract_policy: ContractPolicy::Permissive,
			..Self::default()
		}
	}
}

/// Read-only registries and options every marshalling pass borrows.
#[derive(Debug, Clone, Copy)]
pub struct MarshalEnv<'a> {
	/// Host reflection.
	pub types: &'a TypeRegistry,
	/// Struct codecs and blacklist.
	pub serializers: &'a SerializerRegistry,
	/// Marshalling options.
	pub options: MarshalOptions,
}

impl<'a> MarshalEnv<'a> {
	/// Bundle registries with options.
	pub fn new(types: &'a TypeRegistry, serializers: &'a SerializerRegistry, options: MarshalOptions) -> Self {
		Self { types, serializers, options }
	}

	/// Apply the contract policy to a failed check.
	///
	/// Errors other than contract violations are always returned.
	pub fn violation(&self, err: AssetError) -> Result<()> {
		if err.is_contract_violation() && self.options.contract_policy == ContractPolicy::Permissive {
			tracing::warn!(error = %err, "contract violation ignored");
			return Ok(());
		}
		Err(err)
	}

	/// Apply the contract policy to a fallible step, yielding `None` for a tolerated violation.
	pub fn tolerate<T>(&self, result: Result<T>) -> Result<Option<T>> {
		match result {
			Ok(value) => Ok(Some(value)),
			Err(err) => self.violation(err).map(|()| None),
		}
	}
}

/// Object-identity cache threaded through one comparison tree.
///
/// A pair under evaluation is recorded as equal, which terminates reference cycles.
#[derive(Debug, Clone, Default)]
pub struct CompareContext {
	decided: HashMap<(usize, ObjectId), bool>,
}

impl CompareContext {
	/// Create an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Return the cached verdict for a pair.
	pub fn get(&self, index: usize, id: ObjectId) -> Option<bool> {
		self.decided.get(&(index, id)).copied()
	}

	/// Record a verdict for a pair.
	pub fn set(&mut self, index: usize, id: ObjectId, equal: bool) {
		self.decided.insert((index, id), equal);
	}

	/// Return number of cached pairs.
	pub fn len(&self) -> usize {
		self.decided.len()
	}

	/// Return whether nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.decided.is_empty()
	}
}

fn element_context(field: &str, index: usize) -> String {
	format!("{field}[{index}]")
}

#[cfg(test)]
mod tests;
