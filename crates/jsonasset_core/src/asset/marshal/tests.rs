use serde_json::json;

use super::{CompareContext, Comparator, DELEGATE_SENTINEL, Deserializer, MarshalEnv, MarshalOptions, Serializer};
use crate::asset::data::PropertyValue;
use crate::asset::diagnostics::Diagnostics;
use crate::asset::export::{ExportFile, is_proper_export};
use crate::asset::registry::SerializerRegistry;
use crate::asset::session::ImportOptions;
use crate::asset::soft::{OfflineResolver, RemoteFetchQueue, RemoteImportRequest, SoftReferenceResolver};
use crate::asset::table::ObjectTable;
use crate::asset::text::TextValue;
use crate::asset::types::{FieldDescriptor, Kind, TypeIdx, TypeRegistry, builtin};
use crate::asset::value::{Object, Value};
use crate::asset::world::{ObjectId, ObjectWorld};
use crate::asset::{AssetError, Result};

struct Fixture {
	types: TypeRegistry,
	serializers: SerializerRegistry,
	node: TypeIdx,
	texture: TypeIdx,
}

fn fixture() -> Fixture {
	let mut types = TypeRegistry::with_builtins().expect("builtins register");
	let object = types.require(builtin::OBJECT).expect("object");
	let guid = types.require(builtin::GUID).expect("guid");
	let mode = types.add_enum("EMode", &[("Off", 0), ("On", 1), ("Auto", 2)], false).expect("mode");
	let quality = types.add_enum("EQuality", &[("Low", 0), ("High", 1)], true).expect("quality");
	let wide = types.add_enum("EWide", &[("Small", 3), ("Huge", 300)], false).expect("wide");
	let usable = types.declare_interface("Usable").expect("usable");
	let tag = types.require(builtin::GAMEPLAY_TAG).expect("tag");
	let soft_path = types.require(builtin::SOFT_OBJECT_PATH).expect("soft path");

	let point = types.declare_struct("Point").expect("point");
	types
		.define_fields(point, vec![FieldDescriptor::new("X", Kind::Float), FieldDescriptor::new("Y", Kind::Float)])
		.expect("point fields");

	let texture = types.declare_class("Texture2D", Some(object)).expect("texture");
	types.define_fields(texture, Vec::new()).expect("texture fields");
	let plain = types.declare_class("Plain", Some(object)).expect("plain");
	types.define_fields(plain, vec![FieldDescriptor::new("Count", Kind::Int)]).expect("plain fields");
	let broken = types.declare_class("Broken", Some(object)).expect("broken");
	types
		.define_fields(broken, vec![FieldDescriptor::new("Blob", Kind::Opaque("LazyObjectProperty".into()))])
		.expect("broken fields");
	let mesh = types.declare_class("Mesh", Some(object)).expect("mesh");
	types
		.define_fields(mesh, vec![FieldDescriptor::new("LODData", Kind::Array(Box::new(Kind::Int)))])
		.expect("mesh fields");

	let node = types.declare_class("Node", Some(object)).expect("node");
	types.add_interface_impl(node, usable).expect("implements usable");
	types
		.define_fields(
			node,
			vec![
				FieldDescriptor::new("Count", Kind::Int),
				FieldDescriptor::new("Label", Kind::String),
				FieldDescriptor::new("Title", Kind::Text),
				FieldDescriptor::new("Mode", Kind::Enum { enum_type: mode }),
				FieldDescriptor::new("Quality", Kind::Byte { enum_type: Some(quality) }),
				FieldDescriptor::new("Other", Kind::Object { class: node }),
				FieldDescriptor::new("Tool", Kind::Interface { interface: usable }),
				FieldDescriptor::new("Items", Kind::Array(Box::new(Kind::Int))),
				FieldDescriptor::new("Unique", Kind::Set(Box::new(Kind::Int))),
				FieldDescriptor::new(
					"Lookup",
					Kind::Map {
						key: Box::new(Kind::Name),
						value: Box::new(Kind::Int),
					},
				),
				FieldDescriptor::new("Slots", Kind::Int).with_array_dim(3),
				FieldDescriptor::new("Origin", Kind::Struct(point)),
				FieldDescriptor::new("Id", Kind::Struct(guid)),
				FieldDescriptor::new("Icon", Kind::SoftObject { class: texture }),
				FieldDescriptor::new("OnFire", Kind::Delegate { multicast: true }),
				FieldDescriptor::new("Scratch", Kind::Int).transient(),
				FieldDescriptor::new("Legacy", Kind::Int).deprecated(),
				FieldDescriptor::new("Level", Kind::Byte { enum_type: Some(wide) }),
				FieldDescriptor::new("Tag", Kind::Struct(tag)),
				FieldDescriptor::new("Asset", Kind::Struct(soft_path)),
			],
		)
		.expect("node fields");

	let serializers = SerializerRegistry::with_builtins(&types).expect("codecs");
	Fixture {
		types,
		serializers,
		node,
		texture,
	}
}

struct Imported {
	result: Result<()>,
	world: ObjectWorld,
	table: ObjectTable,
	diagnostics: Diagnostics,
}

impl Imported {
	fn instance(&self, index: usize) -> ObjectId {
		self.table.instance(index).expect("export materialized")
	}

	fn value(&self, types: &TypeRegistry, index: usize, name: &str) -> &PropertyValue {
		let object = self.world.get(self.instance(index)).expect("live object");
		object.properties.get(types, name).expect("field storage")
	}
}

fn export(class: &str, name: &str, properties: serde_json::Value) -> serde_json::Value {
	json!({"Type": class, "Name": name, "Properties": properties})
}

impl Fixture {
	fn env(&self, options: MarshalOptions) -> MarshalEnv<'_> {
		MarshalEnv::new(&self.types, &self.serializers, options)
	}

	fn field(&self, name: &str) -> &FieldDescriptor {
		self.types.class_def(self.node).expect("node").field(name).expect("node field")
	}

	fn import_into(
		&self,
		world: ObjectWorld,
		options: MarshalOptions,
		resolver: &mut dyn SoftReferenceResolver,
		exports: serde_json::Value,
	) -> Imported {
		self.import_with(world, options, &ImportOptions::default(), resolver, exports)
	}

	fn import_with(
		&self,
		mut world: ObjectWorld,
		options: MarshalOptions,
		import: &ImportOptions,
		resolver: &mut dyn SoftReferenceResolver,
		exports: serde_json::Value,
	) -> Imported {
		let file = ExportFile::from_value(Value::from(exports)).expect("export file");
		let mut table = ObjectTable::from_exports(&file.exports);
		let mut diagnostics = Diagnostics::new();
		let result = {
			let mut de = Deserializer::new(self.env(options), &mut table, &mut world, &mut diagnostics, resolver, import);
			(0..file.len())
				.filter(|index| is_proper_export(&file.exports[*index]))
				.try_for_each(|index| de.resolve_index(index).map(|_| ()))
		};
		Imported {
			result,
			world,
			table,
			diagnostics,
		}
	}

	fn import(&self, exports: serde_json::Value) -> Imported {
		self.import_into(ObjectWorld::new(), MarshalOptions::default(), &mut OfflineResolver, exports)
	}

	fn import_permissive(&self, exports: serde_json::Value) -> Imported {
		self.import_into(ObjectWorld::new(), MarshalOptions::permissive(), &mut OfflineResolver, exports)
	}

	fn compare_field(&self, imported: &Imported, name: &str, input: serde_json::Value) -> bool {
		let mut context = CompareContext::new();
		let mut cmp = Comparator::new(self.env(MarshalOptions::default()), &imported.table, &imported.world, &mut context);
		let live = imported.value(&self.types, 0, name);
		cmp.compare_field(self.field(name), &Value::from(input), live).expect("compare")
	}

	fn serialize(&self, world: &ObjectWorld, id: ObjectId) -> Result<Object> {
		let mut table = ObjectTable::new();
		table.index_for(id);
		let mut ser = Serializer::new(self.env(MarshalOptions::default()), &mut table);
		ser.serialize_struct(&world.get(id)?.properties, None)
	}
}

#[test]
fn scalar_fields_decode_from_numbers_and_names() {
	let fx = fixture();
	let imported = fx.import(json!([export(
		"Node",
		"A",
		json!({
			"Count": 5,
			"Label": "first",
			"Title": "NSLOCTEXT(\"Game\", \"Greeting\", \"Hello\")",
			"Mode": "Auto",
			"Quality": "EQuality::High",
			"Origin": {"X": 1.5, "Y": -2.0}
		})
	)]));
	imported.result.as_ref().expect("import");

	assert_eq!(imported.value(&fx.types, 0, "Count"), &PropertyValue::Int(5));
	assert_eq!(imported.value(&fx.types, 0, "Label"), &PropertyValue::String("first".into()));
	assert_eq!(
		imported.value(&fx.types, 0, "Title"),
		&PropertyValue::Text(TextValue::Localized {
			namespace: "Game".into(),
			key: "Greeting".into(),
			source: "Hello".into(),
		})
	);
	assert_eq!(imported.value(&fx.types, 0, "Mode"), &PropertyValue::Enum(2));
	assert_eq!(imported.value(&fx.types, 0, "Quality"), &PropertyValue::Byte(1));

	let PropertyValue::Struct(origin) = imported.value(&fx.types, 0, "Origin") else {
		panic!("origin is a struct");
	};
	assert_eq!(origin.get(&fx.types, "Y"), Some(&PropertyValue::Float(-2.0)));
}

#[test]
fn arrays_compare_in_order_while_sets_and_maps_do_not() {
	let fx = fixture();
	let imported = fx.import(json!([export(
		"Node",
		"A",
		json!({
			"Items": [1, 2, 3],
			"Unique": [1, 2, 3],
			"Lookup": [{"Key": "a", "Value": 1}, {"Key": "b", "Value": 2}]
		})
	)]));
	imported.result.as_ref().expect("import");

	assert!(fx.compare_field(&imported, "Items", json!([1, 2, 3])));
	assert!(!fx.compare_field(&imported, "Items", json!([3, 2, 1])));
	assert!(fx.compare_field(&imported, "Unique", json!([3, 2, 1])));
	assert!(!fx.compare_field(&imported, "Unique", json!([3, 2])));
	assert!(fx.compare_field(&imported, "Lookup", json!([{"Key": "b", "Value": 2}, {"Key": "a", "Value": 1}])));
	assert!(!fx.compare_field(&imported, "Lookup", json!([{"Key": "b", "Value": 3}, {"Key": "a", "Value": 1}])));
}

#[test]
fn decoded_sets_and_maps_are_rehashed() {
	let fx = fixture();
	let imported = fx.import(json!([export(
		"Node",
		"A",
		json!({
			"Unique": [4, 4, 5],
			"Lookup": [{"Key": "a", "Value": 1}, {"Key": "a", "Value": 9}]
		})
	)]));
	imported.result.as_ref().expect("import");

	let PropertyValue::Set(set) = imported.value(&fx.types, 0, "Unique") else {
		panic!("set storage");
	};
	assert_eq!(set.len(), 2);
	assert!(set.contains(&PropertyValue::Int(5)));

	let PropertyValue::Map(map) = imported.value(&fx.types, 0, "Lookup") else {
		panic!("map storage");
	};
	assert_eq!(map.len(), 1);
	assert_eq!(map.get(&PropertyValue::Name("a".into())), Some(&PropertyValue::Int(9)));
}

#[test]
fn fixed_arrays_keep_exactly_array_dim_elements() {
	let fx = fixture();
	let imported = fx.import(json!([export("Node", "A", json!({"Slots": [4, 5, 6]}))]));
	imported.result.as_ref().expect("import");

	let out = fx.serialize(&imported.world, imported.instance(0)).expect("serialize");
	assert_eq!(out.get("Slots"), Some(&Value::from(json!([4, 5, 6]))));

	let strict = fx.import(json!([export("Node", "A", json!({"Slots": [1, 2]}))]));
	let err = strict.result.expect_err("arity mismatch");
	assert!(matches!(err, AssetError::ArityMismatch { expected: 3, got: 2, .. }));

	let permissive = fx.import_permissive(json!([export("Node", "A", json!({"Slots": [1, 2]}))]));
	permissive.result.as_ref().expect("permissive import");
	assert_eq!(
		permissive.value(&fx.types, 0, "Slots"),
		&PropertyValue::Static(vec![PropertyValue::Int(1), PropertyValue::Int(2), PropertyValue::Int(0)])
	);
}

#[test]
fn deprecated_fields_are_skipped_and_transient_fields_kept() {
	let fx = fixture();
	let imported = fx.import(json!([export("Node", "A", json!({"Legacy": 9, "Scratch": 4}))]));
	imported.result.as_ref().expect("import");
	assert_eq!(imported.value(&fx.types, 0, "Legacy"), &PropertyValue::Int(0));
	assert_eq!(imported.value(&fx.types, 0, "Scratch"), &PropertyValue::Int(4));

	let out = fx.serialize(&imported.world, imported.instance(0)).expect("serialize");
	assert!(!out.contains_key("Legacy"));
	assert_eq!(out.get("Scratch"), Some(&Value::from(4_i64)));
}

#[test]
fn unresolved_reference_is_recorded_once_and_siblings_continue() {
	let fx = fixture();
	let imported = fx.import(json!([export("Node", "A", json!({"Count": 3, "Other": 7, "Items": [8]}))]));
	imported.result.as_ref().expect("import");

	assert_eq!(imported.diagnostics.len(), 1);
	let record = &imported.diagnostics.records()[0];
	assert_eq!((record.type_name.as_str(), record.super_type_name.as_str()), ("Node", "Object"));
	assert_eq!(record.source_path, "7");
	assert_eq!(imported.value(&fx.types, 0, "Other"), &PropertyValue::Object(None));
	assert_eq!(imported.value(&fx.types, 0, "Items"), &PropertyValue::Array(vec![PropertyValue::Int(8)]));
}

#[test]
fn reference_cycles_resolve_and_compare() {
	let fx = fixture();
	let exports = json!([export("Node", "A", json!({"Other": 1})), export("Node", "B", json!({"Other": 0}))]);
	let imported = fx.import(exports.clone());
	imported.result.as_ref().expect("import");

	let (a, b) = (imported.instance(0), imported.instance(1));
	assert_eq!(imported.world.len(), 2);
	assert_eq!(imported.value(&fx.types, 0, "Other"), &PropertyValue::Object(Some(b)));
	assert_eq!(imported.value(&fx.types, 1, "Other"), &PropertyValue::Object(Some(a)));

	let same = ObjectTable::from_exports(&ExportFile::from_value(Value::from(exports)).expect("file").exports);
	let mut context = CompareContext::new();
	let mut cmp = Comparator::new(fx.env(MarshalOptions::default()), &same, &imported.world, &mut context);
	assert!(cmp.compare_object(0, a).expect("compare"));

	let changed = json!([export("Node", "A", json!({"Other": 1})), export("Node", "B", json!({"Other": 0, "Count": 5}))]);
	let changed = ObjectTable::from_exports(&ExportFile::from_value(Value::from(changed)).expect("file").exports);
	let mut context = CompareContext::new();
	let mut cmp = Comparator::new(fx.env(MarshalOptions::default()), &changed, &imported.world, &mut context);
	assert!(!cmp.compare_object(0, a).expect("compare"));
	assert_eq!(context.get(1, b), Some(false));
}

#[test]
fn guid_strings_and_objects_decode_identically() {
	let fx = fixture();
	let imported = fx.import(json!([
		export("Node", "A", json!({"Id": "0A1B2C3D-4E5F-6071-8293-A4B5C6D7E8F9"})),
		export("Node", "B", json!({"Id": {"A": 169552957, "B": 1314873457, "C": 2190714037_u64, "D": 3336038649_u64}})),
		export("Node", "C", json!({"Id": "{0A1B2C3D-4E5F6071-8293A4B5-C6D7E8F9}"}))
	]));
	imported.result.as_ref().expect("import");

	let a = imported.value(&fx.types, 0, "Id");
	assert_eq!(a, imported.value(&fx.types, 1, "Id"));
	assert_eq!(a, imported.value(&fx.types, 2, "Id"));
	assert!(fx.compare_field(&imported, "Id", json!("0A1B2C3D4E5F60718293A4B5C6D7E8F9")));

	let bad = fx.import(json!([export("Node", "A", json!({"Id": "not-a-guid"}))]));
	assert!(matches!(bad.result, Err(AssetError::InvalidGuid { .. })));
}

#[test]
fn opaque_fields_fail_even_when_permissive() {
	let fx = fixture();
	let imported = fx.import_permissive(json!([export("Broken", "X", json!({"Blob": 1}))]));
	let err = imported.result.expect_err("opaque import");
	assert!(matches!(err, AssetError::UnsupportedKind { ref kind, .. } if kind == "LazyObjectProperty"));

	let id = imported.table.instance(0).expect("spawned before failure");
	let err = fx.serialize(&imported.world, id).expect_err("opaque export");
	assert!(matches!(err, AssetError::UnsupportedKind { .. }));
}

#[test]
fn permissive_policy_skips_malformed_values() {
	let fx = fixture();
	let exports = json!([export("Node", "A", json!({"Count": "lots", "Label": "kept", "Mode": "Turbo"}))]);

	let strict = fx.import(exports.clone());
	assert!(matches!(strict.result, Err(AssetError::UnexpectedShape { .. })));

	let permissive = fx.import_permissive(exports);
	permissive.result.as_ref().expect("permissive import");
	assert_eq!(permissive.value(&fx.types, 0, "Count"), &PropertyValue::Int(0));
	assert_eq!(permissive.value(&fx.types, 0, "Label"), &PropertyValue::String("kept".into()));
	assert_eq!(permissive.value(&fx.types, 0, "Mode"), &PropertyValue::Enum(0));
}

#[test]
fn unknown_enum_member_is_a_violation() {
	let fx = fixture();
	let imported = fx.import(json!([export("Node", "A", json!({"Mode": "Turbo"}))]));
	let err = imported.result.expect_err("strict");
	assert!(matches!(err, AssetError::UnknownEnumMember { ref member, .. } if member == "Turbo"));
}

#[test]
fn enums_serialize_by_member_name() {
	let fx = fixture();
	let imported = fx.import(json!([export("Node", "A", json!({"Mode": 1, "Quality": 1}))]));
	imported.result.as_ref().expect("import");

	let out = fx.serialize(&imported.world, imported.instance(0)).expect("serialize");
	assert_eq!(out.get("Mode"), Some(&Value::from("On")));
	assert_eq!(out.get("Quality"), Some(&Value::from("EQuality::High")));
}

#[test]
fn delegates_write_sentinel_and_never_decode() {
	let fx = fixture();
	let imported = fx.import(json!([export("Node", "A", json!({"OnFire": DELEGATE_SENTINEL}))]));
	imported.result.as_ref().expect("import");
	assert_eq!(imported.value(&fx.types, 0, "OnFire"), &PropertyValue::Delegate(None));
	assert!(fx.compare_field(&imported, "OnFire", json!("anything")));

	let out = fx.serialize(&imported.world, imported.instance(0)).expect("serialize");
	assert_eq!(out.get("OnFire"), Some(&Value::from(DELEGATE_SENTINEL)));
}

#[test]
fn map_entries_need_key_and_value() {
	let fx = fixture();
	let exports = json!([export("Node", "A", json!({"Lookup": [{"Key": "a"}, {"Key": "b", "Value": 2}]}))]);

	let strict = fx.import(exports.clone());
	assert!(matches!(strict.result, Err(AssetError::MissingPairField { key: "Value", .. })));

	let permissive = fx.import_permissive(exports);
	permissive.result.as_ref().expect("permissive import");
	let PropertyValue::Map(map) = permissive.value(&fx.types, 0, "Lookup") else {
		panic!("map storage");
	};
	assert_eq!(map.len(), 1);
	assert_eq!(map.get(&PropertyValue::Name("b".into())), Some(&PropertyValue::Int(2)));
}

#[test]
fn interface_targets_must_implement_the_interface() {
	let fx = fixture();
	let rejected = fx.import(json!([export("Node", "A", json!({"Tool": 1})), export("Plain", "P", json!({}))]));
	assert!(matches!(rejected.result, Err(AssetError::InterfaceNotImplemented { .. })));

	let accepted = fx.import(json!([export("Node", "A", json!({"Tool": 1})), export("Node", "B", json!({}))]));
	accepted.result.as_ref().expect("import");
	assert_eq!(imported_target(&accepted, &fx.types), Some(accepted.instance(1)));
}

fn imported_target(imported: &Imported, types: &TypeRegistry) -> Option<ObjectId> {
	match imported.value(types, 0, "Tool") {
		PropertyValue::Interface(target) => *target,
		_ => None,
	}
}

#[test]
fn soft_references_queue_remote_imports() {
	let fx = fixture();
	let exports = json!([export("Node", "A", json!({"Icon": "/Game/Tex/T_Icon.T_Icon"}))]);

	let mut queue = RemoteFetchQueue::with_default_accepted_types();
	let imported = fx.import_into(ObjectWorld::new(), MarshalOptions::default(), &mut queue, exports.clone());
	imported.result.as_ref().expect("import");
	assert!(imported.diagnostics.is_empty());
	assert_eq!(
		queue.queued(),
		[RemoteImportRequest {
			class_name: "Texture2D".into(),
			asset_name: "T_Icon".into(),
			package_path: "/Game/Tex/T_Icon".into(),
		}]
	);
	let PropertyValue::SoftObject(path) = imported.value(&fx.types, 0, "Icon") else {
		panic!("soft storage");
	};
	assert_eq!(path.to_string(), "/Game/Tex/T_Icon.T_Icon");

	let offline = fx.import(exports.clone());
	assert_eq!(offline.diagnostics.len(), 1);
	assert_eq!(offline.diagnostics.records()[0].source_path, "/Game/Tex/T_Icon.T_Icon");

	let disabled = MarshalOptions {
		resolve_soft_references: false,
		..MarshalOptions::default()
	};
	let mut queue = RemoteFetchQueue::new();
	let skipped = fx.import_into(ObjectWorld::new(), disabled, &mut queue, exports);
	assert!(skipped.diagnostics.is_empty());
	assert!(queue.queued().is_empty());
}

#[test]
fn loaded_soft_targets_are_not_requested() {
	let fx = fixture();
	let mut world = ObjectWorld::new();
	world.spawn(&fx.types, fx.texture, "T_Icon", "/Game/Tex/T_Icon", None).expect("texture");

	let mut queue = RemoteFetchQueue::new();
	let imported = fx.import_into(
		world,
		MarshalOptions::default(),
		&mut queue,
		json!([export("Node", "A", json!({"Icon": {"AssetPathName": "/Game/Tex/T_Icon.T_Icon", "SubPathString": ""}}))]),
	);
	imported.result.as_ref().expect("import");
	assert!(queue.queued().is_empty());
	assert!(imported.diagnostics.is_empty());
}

#[test]
fn serializer_collects_referenced_indices_once() {
	let fx = fixture();
	let imported = fx.import(json!([
		export("Node", "A", json!({"Other": 1, "Tool": 1})),
		export("Node", "B", json!({"Other": 0}))
	]));
	imported.result.as_ref().expect("import");

	let mut table = ObjectTable::new();
	let root = table.index_for(imported.instance(0));
	let mut referenced = Vec::new();
	let mut ser = Serializer::new(fx.env(MarshalOptions::default()), &mut table);
	let world = &imported.world;
	let out = ser
		.serialize_struct(&world.get(imported.instance(0)).expect("a").properties, Some(&mut referenced))
		.expect("serialize");

	assert_eq!(root, 0);
	assert_eq!(out.get("Other"), Some(&Value::from(1_i64)));
	assert_eq!(out.get("Tool"), Some(&Value::from(1_i64)));
	assert_eq!(referenced, [1]);
	assert_eq!(ser.table().instance(1), Some(imported.instance(1)));
}

#[test]
fn null_inputs_leave_storage_and_compare_unchanged() {
	let fx = fixture();
	let imported = fx.import(json!([export("Node", "A", json!({"Count": 2}))]));
	imported.result.as_ref().expect("import");
	assert!(fx.compare_field(&imported, "Count", json!(null)));
	assert!(fx.compare_field(&imported, "Count", json!(2)));
	assert!(!fx.compare_field(&imported, "Count", json!(3)));

	let mut world = imported.world.clone();
	let mut table = imported.table.clone();
	let mut diagnostics = Diagnostics::new();
	let mut resolver = OfflineResolver;
	let import = ImportOptions::default();
	let mut de = Deserializer::new(fx.env(MarshalOptions::default()), &mut table, &mut world, &mut diagnostics, &mut resolver, &import);
	let mut properties = Object::new();
	properties.insert("Count".into(), Value::Null);
	de.populate(imported.instance(0), &properties).expect("populate");
	assert_eq!(
		de.world().get(imported.instance(0)).expect("a").properties.get(&fx.types, "Count"),
		Some(&PropertyValue::Int(2))
	);
}

#[test]
fn byte_enum_members_must_fit_in_a_byte() {
	let fx = fixture();
	let exports = json!([export("Node", "A", json!({"Level": "Huge", "Count": 1}))]);

	let strict = fx.import(exports.clone());
	assert!(matches!(strict.result, Err(AssetError::UnexpectedShape { expected: "Byte", .. })));

	let permissive = fx.import_permissive(exports);
	permissive.result.as_ref().expect("permissive import");
	assert_eq!(permissive.value(&fx.types, 0, "Level"), &PropertyValue::Byte(0));
	assert_eq!(permissive.value(&fx.types, 0, "Count"), &PropertyValue::Int(1));

	let small = fx.import(json!([export("Node", "A", json!({"Level": "Small"}))]));
	small.result.as_ref().expect("import");
	assert_eq!(small.value(&fx.types, 0, "Level"), &PropertyValue::Byte(3));
	assert!(fx.compare_field(&small, "Level", json!("Small")));
}

#[test]
fn unresolvable_references_compare_unchanged_against_null() {
	let fx = fixture();
	let imported = fx.import(json!([
		export("Node", "A", json!({"Other": 9, "Tool": 9, "Items": [1]})),
		json!({"Type": "Unregistered", "Name": "U"})
	]));
	imported.result.as_ref().expect("import");
	assert_eq!(imported.value(&fx.types, 0, "Other"), &PropertyValue::Object(None));

	assert!(fx.compare_field(&imported, "Other", json!(9)));
	assert!(fx.compare_field(&imported, "Tool", json!(9)));
	assert!(fx.compare_field(&imported, "Other", json!(1)));
	assert!(!fx.compare_field(&imported, "Other", json!(0)));
	assert!(!fx.compare_field(&imported, "Tool", json!(0)));
}

#[test]
fn distribution_references_fall_back_to_their_alias() {
	let fx = fixture();
	let mut world = ObjectWorld::new();
	let curve = world.spawn(&fx.types, fx.node, "Dist.Curve_0", "/Game/Fx", None).expect("curve");
	let reference = json!({"ObjectName": "DistributionFloatConstant'Emitter.Dist.Curve_0'", "ObjectPath": "/Game/Fx/Emitter.4"});

	let imported = fx.import_into(
		world.clone(),
		MarshalOptions::default(),
		&mut OfflineResolver,
		json!([export("Node", "A", json!({"Other": reference.clone()}))]),
	);
	imported.result.as_ref().expect("import");
	assert!(imported.diagnostics.is_empty());
	assert_eq!(imported.value(&fx.types, 0, "Other"), &PropertyValue::Object(Some(curve)));
	assert!(fx.compare_field(&imported, "Other", reference));

	let plain = json!({"ObjectName": "FloatConstant'Emitter.Dist.Curve_0'", "ObjectPath": "/Game/Fx/Emitter.4"});
	let missed = fx.import_into(world, MarshalOptions::default(), &mut OfflineResolver, json!([export("Node", "A", json!({"Other": plain}))]));
	missed.result.as_ref().expect("import");
	assert_eq!(missed.diagnostics.len(), 1);
	assert!(!fx.compare_field(&imported, "Other", json!({"ObjectName": "FloatConstant'Emitter.Dist.Curve_0'"})));
}

#[test]
fn gameplay_tags_decode_from_a_bare_name() {
	let fx = fixture();
	let imported = fx.import(json!([export("Node", "A", json!({"Tag": "Status.Burning"}))]));
	imported.result.as_ref().expect("import");

	let PropertyValue::Struct(tag) = imported.value(&fx.types, 0, "Tag") else {
		panic!("tag is a struct");
	};
	assert_eq!(tag.get(&fx.types, "TagName"), Some(&PropertyValue::Name("Status.Burning".into())));
	assert!(fx.compare_field(&imported, "Tag", json!("Status.Burning")));
	assert!(fx.compare_field(&imported, "Tag", json!({"TagName": "Status.Burning"})));
	assert!(!fx.compare_field(&imported, "Tag", json!("Status.Frozen")));
}

#[test]
fn soft_path_structs_decode_from_strings_and_request_data_assets() {
	let fx = fixture();
	let mut queue = RemoteFetchQueue::new();
	let imported = fx.import_into(
		ObjectWorld::new(),
		MarshalOptions::default(),
		&mut queue,
		json!([export("Node", "A", json!({"Asset": "/Game/Data/DA_Loot.DA_Loot:Table"}))]),
	);
	imported.result.as_ref().expect("import");

	let PropertyValue::Struct(asset) = imported.value(&fx.types, 0, "Asset") else {
		panic!("soft path is a struct");
	};
	assert_eq!(asset.get(&fx.types, "AssetPathName"), Some(&PropertyValue::Name("/Game/Data/DA_Loot.DA_Loot".into())));
	assert_eq!(asset.get(&fx.types, "SubPathString"), Some(&PropertyValue::String("Table".into())));
	assert_eq!(
		queue.queued(),
		[RemoteImportRequest {
			class_name: "DataAsset".into(),
			asset_name: "DA_Loot".into(),
			package_path: "/Game/Data/DA_Loot".into(),
		}]
	);

	assert!(fx.compare_field(&imported, "Asset", json!("/Game/Data/DA_Loot.DA_Loot:Table")));
	assert!(fx.compare_field(
		&imported,
		"Asset",
		json!({"AssetPathName": "/Game/Data/DA_Loot.DA_Loot", "SubPathString": "Table"})
	));
	assert!(!fx.compare_field(&imported, "Asset", json!("/Game/Data/DA_Other.DA_Other")));
}

#[test]
fn text_objects_decode_as_literals() {
	let fx = fixture();
	let title = json!({"Namespace": "Menu", "Key": "Start", "SourceString": "Start Game"});
	let imported = fx.import(json!([export("Node", "A", json!({"Title": title.clone()}))]));
	imported.result.as_ref().expect("import");

	assert_eq!(
		imported.value(&fx.types, 0, "Title"),
		&PropertyValue::Text(TextValue::Literal {
			namespace: "Menu".into(),
			key: "Start".into(),
			source: "Start Game".into(),
		})
	);
	assert!(fx.compare_field(&imported, "Title", title));
	assert!(!fx.compare_field(&imported, "Title", json!({"Namespace": "Menu", "Key": "Start", "SourceString": "Quit"})));
}

#[test]
fn lod_data_is_compared_only_when_merged() {
	let fx = fixture();
	let exports = json!([{"Type": "Mesh", "Name": "M", "Properties": {}, "LODData": [4, 2]}]);

	let import = ImportOptions {
		merge_lod_data: false,
		..ImportOptions::default()
	};
	let imported = fx.import_with(ObjectWorld::new(), MarshalOptions::default(), &import, &mut OfflineResolver, exports.clone());
	imported.result.as_ref().expect("import");
	let mesh = imported.instance(0);
	assert_eq!(
		imported.world.get(mesh).expect("mesh").properties.get(&fx.types, "LODData"),
		Some(&PropertyValue::Array(Vec::new()))
	);

	let mut context = CompareContext::new();
	let mut cmp = Comparator::new(fx.env(MarshalOptions::default()), &imported.table, &imported.world, &mut context).with_lod_merge(false);
	assert!(cmp.compare_object(0, mesh).expect("compare"));

	let mut context = CompareContext::new();
	let mut cmp = Comparator::new(fx.env(MarshalOptions::default()), &imported.table, &imported.world, &mut context);
	assert!(!cmp.compare_object(0, mesh).expect("compare"));

	let merged = fx.import(exports);
	merged.result.as_ref().expect("import");
	let mut context = CompareContext::new();
	let mut cmp = Comparator::new(fx.env(MarshalOptions::default()), &merged.table, &merged.world, &mut context);
	assert!(cmp.compare_object(0, merged.instance(0)).expect("compare"));
}
