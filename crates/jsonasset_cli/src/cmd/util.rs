use std::path::Path;

use jsonasset::asset::{ContractPolicy, MarshalOptions, Result, SerializerRegistry, TypeRegistry, TypeSchema};

/// Print a value as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(value: &T) {
	match serde_json::to_string_pretty(value) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to encode json output: {err}"),
	}
}

/// Build type and serializer registries from a schema file.
pub(crate) fn load_registries(schema: &Path) -> Result<(TypeRegistry, SerializerRegistry)> {
	let schema = TypeSchema::from_path(schema)?;
	let types = schema.to_registry()?;
	let serializers = schema.to_serializers(&types)?;
	tracing::debug!(types = types.len(), "schema loaded");
	Ok((types, serializers))
}

/// Marshal options for the shared `--permissive` and `--no-soft` flags.
pub(crate) fn marshal_options(permissive: bool, no_soft: bool) -> MarshalOptions {
	MarshalOptions {
		contract_policy: if permissive { ContractPolicy::Permissive } else { ContractPolicy::Strict },
		resolve_soft_references: !no_soft,
	}
}
