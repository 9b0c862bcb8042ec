mod compression;
mod data;
mod diagnostics;
mod error;
mod export;
mod gate;
mod guid;
mod marshal;
mod registry;
mod schema;
mod session;
mod soft;
mod table;
mod text;
mod types;
mod value;
mod world;

/// Export stream encoding detection result.
pub use compression::Compression;
/// Host property storage and hashed containers.
pub use data::{DelegateBinding, PropertyValue, ScriptMap, ScriptSet, SoftObjectPath, StructData, default_for, default_for_field};
/// Unresolved-reference records.
pub use diagnostics::{Diagnostics, FailedPropertyRecord};
/// Error and result aliases.
pub use error::{AssetError, Result};
/// Export files and package-reference lookup.
pub use export::{ExportFile, ExportReference, export_index_from_path, export_properties, find_export, is_proper_export};
/// Field inclusion rules.
pub use gate::should_include;
/// GUID string parsing and formatting.
pub use guid::{format_guid, guid_object, parse_guid};
/// Marshalling passes, options, and contract policy.
pub use marshal::{CompareContext, Comparator, ContractPolicy, DELEGATE_SENTINEL, Deserializer, MarshalEnv, MarshalOptions, Serializer};
/// Struct codecs and their registry.
pub use registry::{GenericStructSerializer, SerializerRegistry, StructSerializer, TicksSerializer};
/// Declarative type schema files.
pub use schema::{BlacklistSpec, ClassSpec, EnumSpec, FieldSpec, KindSpec, StructSpec, TypeSchema};
/// Import, export, and compare drivers.
pub use session::{AssetSession, CompareEntry, CompareStatus, ImportOptions, ImportReport, ImportedObject};
/// Soft reference resolution.
pub use soft::{DEFAULT_ACCEPTED_TYPES, OfflineResolver, RemoteFetchQueue, RemoteImportRequest, SoftReferenceResolver};
/// Export index to live instance table.
pub use table::{ObjectTable, TableEntry};
/// Localizable text values.
pub use text::TextValue;
/// Host reflection descriptors and registry.
pub use types::{EnumDescriptor, FieldDescriptor, FieldFlags, InterfaceDescriptor, Kind, StructDescriptor, TypeDef, TypeIdx, TypeRegistry, builtin};
/// Dynamic value model.
pub use value::{Object, Value, keep_keys, remove_keys};
/// Live object arena.
pub use world::{ObjectId, ObjectInstance, ObjectWorld};
