use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Errors produced while loading exports and marshalling property values.
#[derive(Debug, Error)]
pub enum AssetError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// JSON text could not be parsed or written.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Input is neither JSON text nor a zstd frame.
	#[error("unsupported export encoding (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Export file top level was not an array of export records.
	#[error("invalid export file: {reason}")]
	InvalidExportFile {
		/// Short description of the structural problem.
		reason: &'static str,
	},
	/// Encountered a property kind without a marshalling path.
	#[error("unsupported property kind {kind} on field {field}")]
	UnsupportedKind {
		/// Host kind label.
		kind: String,
		/// Field or element path being processed.
		field: String,
	},
	/// Requested type name is not registered.
	#[error("type not found: {name}")]
	TypeNotFound {
		/// Requested type name.
		name: String,
	},
	/// Type index does not belong to the registry.
	#[error("type index out of range: {idx}")]
	TypeIndexOutOfRange {
		/// Offending type index.
		idx: u32,
	},
	/// Type exists but has the wrong category for the operation.
	#[error("type {name} is not a {expected}")]
	WrongTypeCategory {
		/// Type name.
		name: String,
		/// Required category label.
		expected: &'static str,
	},
	/// Type name registered twice.
	#[error("duplicate type name: {name}")]
	DuplicateType {
		/// Duplicated type name.
		name: String,
	},
	/// Struct fields were defined more than once.
	#[error("fields already defined for type {name}")]
	FieldsAlreadyDefined {
		/// Type name.
		name: String,
	},
	/// Requested field is missing on a struct type.
	#[error("field {field} not found on {type_name}")]
	FieldNotFound {
		/// Struct type name.
		type_name: String,
		/// Missing field name.
		field: String,
	},
	/// Struct would contain itself by value.
	#[error("struct {name} contains itself by value")]
	RecursiveStruct {
		/// Struct type name.
		name: String,
	},
	/// Schema file could not be turned into type descriptors.
	#[error("invalid schema: {detail}")]
	InvalidSchema {
		/// Human-readable description of the problem.
		detail: String,
	},
	/// Object identifier does not belong to the world.
	#[error("object id out of range: {id}")]
	ObjectNotFound {
		/// Offending object id.
		id: u32,
	},
	/// Value shape does not match what the field kind requires.
	#[error("unexpected value shape at {context}: expected {expected}, got {got}")]
	UnexpectedShape {
		/// Field or element path being processed.
		context: String,
		/// Expected value shape.
		expected: &'static str,
		/// Actual value shape.
		got: &'static str,
	},
	/// Fixed-size array input did not match declared arity.
	#[error("arity mismatch on {field}: expected {expected}, got {got}")]
	ArityMismatch {
		/// Field name.
		field: String,
		/// Declared number of slots.
		expected: usize,
		/// Number of values supplied.
		got: usize,
	},
	/// Map entry object lacked `Key` or `Value`.
	#[error("map entry on {field} is missing {key}")]
	MissingPairField {
		/// Field name.
		field: String,
		/// Missing entry key.
		key: &'static str,
	},
	/// Enum member name is not declared on the enum.
	#[error("enum {enum_name} has no member {member}")]
	UnknownEnumMember {
		/// Enum type name.
		enum_name: String,
		/// Requested member name.
		member: String,
	},
	/// Symbolic byte value supplied for a byte field without enum metadata.
	#[error("field {field} has no enum metadata for symbolic value {member}")]
	MissingEnumMetadata {
		/// Field name.
		field: String,
		/// Supplied member name.
		member: String,
	},
	/// GUID string could not be parsed.
	#[error("invalid guid string: {input}")]
	InvalidGuid {
		/// Original input text.
		input: String,
	},
	/// Tick count string could not be parsed.
	#[error("invalid tick count: {input}")]
	InvalidTicks {
		/// Original input text.
		input: String,
	},
	/// Object assigned to an interface field does not implement it.
	#[error("class {class} does not implement interface {interface}")]
	InterfaceNotImplemented {
		/// Resolved object class name.
		class: String,
		/// Required interface name.
		interface: String,
	},
	/// Host storage does not match the declared field kind.
	#[error("storage mismatch on {field}: expected {expected} storage")]
	StorageMismatch {
		/// Field or element path being processed.
		field: String,
		/// Expected storage label.
		expected: &'static str,
	},
}

impl AssetError {
	/// Return whether this error is a structural contract violation.
	///
	/// Contract violations are governed by [`ContractPolicy`](crate::asset::ContractPolicy);
	/// every other error always aborts.
	pub fn is_contract_violation(&self) -> bool {
		matches!(
			self,
			Self::UnexpectedShape { .. }
				| Self::ArityMismatch { .. }
				| Self::MissingPairField { .. }
				| Self::UnknownEnumMember { .. }
				| Self::MissingEnumMetadata { .. }
				| Self::InvalidGuid { .. }
				| Self::InvalidTicks { .. }
				| Self::InterfaceNotImplemented { .. }
				| Self::StorageMismatch { .. }
		)
	}
}
