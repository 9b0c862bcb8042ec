use super::{PropertyValue, ScriptMap, ScriptSet, SoftObjectPath, StructData, default_for_field};
use crate::asset::AssetError;
use crate::asset::types::{FieldDescriptor, Kind, TypeRegistry, builtin};

fn name(text: &str) -> PropertyValue {
	PropertyValue::Name(text.into())
}

#[test]
fn unhashed_entries_are_found_after_rehash() {
	let mut map = ScriptMap::default();
	map.push_unhashed(name("a"), PropertyValue::Int(1));
	assert_eq!(map.get(&name("a")), None);

	map.rehash();
	assert_eq!(map.get(&name("a")), Some(&PropertyValue::Int(1)));
}

#[test]
fn rehash_keeps_later_duplicate_value() {
	let mut map = ScriptMap::default();
	map.push_unhashed(name("a"), PropertyValue::Int(1));
	map.push_unhashed(name("b"), PropertyValue::Int(2));
	map.push_unhashed(name("a"), PropertyValue::Int(3));
	map.rehash();

	assert_eq!(map.len(), 2);
	let entries: Vec<_> = map.iter().map(|(key, value)| (key.clone(), value.clone())).collect();
	assert_eq!(entries, [(name("a"), PropertyValue::Int(3)), (name("b"), PropertyValue::Int(2))]);
}

#[test]
fn map_equality_ignores_order() {
	let mut left = ScriptMap::default();
	left.insert(name("a"), PropertyValue::Int(1));
	left.insert(name("b"), PropertyValue::Int(2));
	let mut right = ScriptMap::default();
	right.insert(name("b"), PropertyValue::Int(2));
	right.insert(name("a"), PropertyValue::Int(1));
	assert_eq!(left, right);

	right.insert(name("a"), PropertyValue::Int(5));
	assert_ne!(left, right);
}

#[test]
fn set_drops_duplicates_on_rehash() {
	let mut set = ScriptSet::default();
	for value in [1, 2, 1, 3] {
		set.push_unhashed(PropertyValue::Int(value));
	}
	set.rehash();
	let items: Vec<_> = set.iter().cloned().collect();
	assert_eq!(items, [PropertyValue::Int(1), PropertyValue::Int(2), PropertyValue::Int(3)]);
	assert!(set.contains(&PropertyValue::Int(3)));
	assert!(!set.insert(PropertyValue::Int(2)));
}

#[test]
fn float_zero_signs_hash_alike() {
	let mut set = ScriptSet::default();
	set.insert(PropertyValue::Float(0.0));
	assert!(set.contains(&PropertyValue::Float(-0.0)));
}

#[test]
fn struct_defaults_follow_field_layout() {
	let mut types = TypeRegistry::with_builtins().expect("builtins");
	let guid = types.require(builtin::GUID).expect("guid");
	let item = types.declare_struct("Item").expect("item");
	types
		.define_fields(
			item,
			vec![
				FieldDescriptor::new("Id", Kind::Struct(guid)),
				FieldDescriptor::new("Slots", Kind::Int).with_array_dim(3),
				FieldDescriptor::new("Label", Kind::Name),
			],
		)
		.expect("fields");

	let mut data = StructData::default_of(&types, item).expect("defaults");
	assert!(matches!(data.get(&types, "Id"), Some(PropertyValue::Struct(inner)) if inner.fields.len() == 4));
	assert_eq!(data.get(&types, "Slots"), Some(&PropertyValue::Static(vec![PropertyValue::Int(0); 3])));
	assert_eq!(data.get(&types, "Label"), Some(&name("None")));

	data.set(&types, "Label", name("Sword")).expect("set");
	assert_eq!(data.get(&types, "Label"), Some(&name("Sword")));
	let err = data.set(&types, "Missing", name("x")).expect_err("unknown field");
	assert!(matches!(err, AssetError::FieldNotFound { ref type_name, ref field } if type_name == "Item" && field == "Missing"));

	let field = FieldDescriptor::new("One", Kind::Bool);
	assert_eq!(default_for_field(&field, &types).expect("default"), PropertyValue::Bool(false));
}

#[test]
fn soft_path_splits_sub_path() {
	let path = SoftObjectPath::parse("/Game/Maps/Arena.Arena:PersistentLevel.Light");
	assert_eq!(path.asset_path, "/Game/Maps/Arena.Arena");
	assert_eq!(path.sub_path, "PersistentLevel.Light");
	assert_eq!(path.to_string(), "/Game/Maps/Arena.Arena:PersistentLevel.Light");
	assert!(SoftObjectPath::parse("").is_null());
}
