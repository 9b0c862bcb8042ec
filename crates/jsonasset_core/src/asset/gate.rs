use crate::asset::registry::SerializerRegistry;
use crate::asset::types::FieldDescriptor;

/// Decide whether a field takes part in marshalling.
///
/// Rules apply in order: transient and editor-only fields are included, deprecated fields are
/// excluded, blacklisted fields are excluded, everything else is included.
pub fn should_include(serializers: &SerializerRegistry, field: &FieldDescriptor) -> bool {
	if field.flags.transient || field.flags.editor_only {
		return true;
	}
	if field.flags.deprecated {
		return false;
	}
	!serializers.is_blacklisted(field)
}

#[cfg(test)]
mod tests {
	use super::should_include;
	use crate::asset::registry::SerializerRegistry;
	use crate::asset::types::{FieldDescriptor, Kind, TypeRegistry};

	fn setup() -> (TypeRegistry, SerializerRegistry) {
		let mut types = TypeRegistry::with_builtins().expect("builtins");
		let item = types.declare_struct("Item").expect("item");
		types
			.define_fields(
				item,
				vec![
					FieldDescriptor::new("Plain", Kind::Int),
					FieldDescriptor::new("Cache", Kind::Int).transient(),
					FieldDescriptor::new("Old", Kind::Int).deprecated(),
					FieldDescriptor::new("Hidden", Kind::Int),
					FieldDescriptor::new("EditorNote", Kind::String).editor_only().deprecated(),
				],
			)
			.expect("fields");
		let mut serializers = SerializerRegistry::with_builtins(&types).expect("serializers");
		serializers.blacklist(&types, item, "Hidden").expect("blacklist hidden");
		serializers.blacklist(&types, item, "Cache").expect("blacklist cache");
		(types, serializers)
	}

	fn include(name: &str) -> bool {
		let (types, serializers) = setup();
		let item = types.require("Item").expect("item");
		let field = types.struct_def(item).expect("struct").field(name).expect("field").clone();
		should_include(&serializers, &field)
	}

	#[test]
	fn rules_apply_in_order() {
		assert!(include("Plain"));
		assert!(!include("Old"));
		assert!(!include("Hidden"));
	}

	// Transient and editor-only inclusion is deliberate and pending product confirmation.
	#[test]
	fn transient_and_editor_only_win_over_later_rules() {
		assert!(include("Cache"));
		assert!(include("EditorNote"));
	}
}
