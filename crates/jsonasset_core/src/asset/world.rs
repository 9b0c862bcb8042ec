use std::collections::HashMap;
use std::fmt;

use crate::asset::data::StructData;
use crate::asset::types::{TypeIdx, TypeRegistry};
use crate::asset::{AssetError, Result};

/// Stable handle to a live object inside an [`ObjectWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "obj#{}", self.0)
	}
}

/// One live object and its reflected property storage.
#[derive(Debug, Clone)]
pub struct ObjectInstance {
	/// Object class.
	pub class: TypeIdx,
	/// Object name.
	pub name: String,
	/// Owning object, when nested.
	pub outer: Option<ObjectId>,
	/// Package path the object lives in.
	pub package: String,
	/// Property storage laid out per the class fields.
	pub properties: StructData,
}

/// Arena of live objects addressed by [`ObjectId`].
#[derive(Debug, Clone, Default)]
pub struct ObjectWorld {
	objects: Vec<ObjectInstance>,
	by_name: HashMap<String, Vec<ObjectId>>,
	by_path: HashMap<String, ObjectId>,
}

impl ObjectWorld {
	/// Create an empty world.
	pub fn new() -> Self {
		Self::default()
	}

	/// Construct a default-initialized instance of `class`.
	pub fn spawn(&mut self, types: &TypeRegistry, class: TypeIdx, name: &str, package: &str, outer: Option<ObjectId>) -> Result<ObjectId> {
		types.class_def(class)?;
		if let Some(outer) = outer {
			self.get(outer)?;
		}
		let properties = StructData::default_of(types, class)?;
		let id = ObjectId(self.objects.len() as u32);

		self.objects.push(ObjectInstance {
			class,
			name: name.to_owned(),
			outer,
			package: package.to_owned(),
			properties,
		});
		self.by_name.entry(name.to_owned()).or_default().push(id);
		let path = self.path_of(id)?;
		self.by_path.entry(path).or_insert(id);
		Ok(id)
	}

	/// Borrow an object by id.
	pub fn get(&self, id: ObjectId) -> Result<&ObjectInstance> {
		self.objects.get(id.0 as usize).ok_or(AssetError::ObjectNotFound { id: id.0 })
	}

	/// Mutably borrow an object by id.
	pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut ObjectInstance> {
		self.objects.get_mut(id.0 as usize).ok_or(AssetError::ObjectNotFound { id: id.0 })
	}

	/// Find the first object spawned with `name`.
	pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
		self.by_name.get(name).and_then(|ids| ids.first().copied())
	}

	/// Find an object by its full path (`Package.Name` or `Package.Outer:Name`).
	pub fn find_by_path(&self, path: &str) -> Option<ObjectId> {
		self.by_path.get(path).copied()
	}

	/// Build the full path of an object.
	pub fn path_of(&self, id: ObjectId) -> Result<String> {
		let object = self.get(id)?;
		match object.outer {
			Some(outer) => {
				let outer_path = self.path_of(outer)?;
				let sep = if self.get(outer)?.outer.is_some() { '.' } else { ':' };
				Ok(format!("{outer_path}{sep}{}", object.name))
			}
			None => Ok(format!("{}.{}", object.package, object.name)),
		}
	}

	/// Iterate all objects in spawn order.
	pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &ObjectInstance)> {
		self.objects.iter().enumerate().map(|(idx, object)| (ObjectId(idx as u32), object))
	}

	/// Return number of live objects.
	pub fn len(&self) -> usize {
		self.objects.len()
	}

	/// Return whether the world holds no objects.
	pub fn is_empty(&self) -> bool {
		self.objects.is_empty()
	}
}
