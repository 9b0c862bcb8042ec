use std::collections::HashSet;

use crate::asset::world::{ObjectId, ObjectWorld};

/// Class names the remote fetch service knows how to import.
pub const DEFAULT_ACCEPTED_TYPES: &[&str] = &[
	"Texture2D",
	"TextureRenderTarget2D",
	"Material",
	"MaterialInterface",
	"MaterialFunction",
	"MaterialInstanceConstant",
	"MaterialParameterCollection",
	"NiagaraParameterCollection",
	"CurveFloat",
	"CurveTable",
	"CurveVector",
	"CurveLinearColorAtlas",
	"CurveLinearColor",
	"SoundWave",
	"SoundCue",
	"ReverbEffect",
	"SoundAttenuation",
	"SoundConcurrency",
	"SoundClass",
	"SoundMix",
	"SoundModulationPatch",
	"PhysicalMaterial",
	"SubsurfaceProfile",
	"LandscapeGrassType",
	"DataTable",
];

/// Request to create a missing asset through the fetch-and-import service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RemoteImportRequest {
	/// Declared class of the reference.
	pub class_name: String,
	/// Asset name (text after the first `.`).
	pub asset_name: String,
	/// Package path (text before the first `.`).
	pub package_path: String,
}

impl RemoteImportRequest {
	/// Build a request from a `Package.Asset` path.
	pub fn from_path(class_name: &str, path: &str) -> Self {
		let (package_path, asset_name) = match path.split_once('.') {
			Some((package, asset)) => (package, asset),
			None => (path, path.rsplit('/').next().unwrap_or(path)),
		};
		Self {
			class_name: class_name.to_owned(),
			asset_name: asset_name.to_owned(),
			package_path: package_path.to_owned(),
		}
	}
}

/// Boundary to asset lookup and the remote fetch-and-import collaborator.
pub trait SoftReferenceResolver {
	/// Try to resolve a path against already loaded objects.
	fn try_local_load(&mut self, world: &ObjectWorld, path: &str) -> Option<ObjectId> {
		world.find_by_path(path)
	}

	/// Ask the collaborator to create a missing asset; `false` means the request was rejected.
	///
	/// The call never blocks and never fixes up the current reference.
	fn request_remote_import(&mut self, request: RemoteImportRequest) -> bool;
}

/// Resolver without a remote collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineResolver;

impl SoftReferenceResolver for OfflineResolver {
	fn request_remote_import(&mut self, request: RemoteImportRequest) -> bool {
		tracing::debug!(class = %request.class_name, asset = %request.asset_name, "remote import unavailable offline");
		false
	}
}

/// Resolver that queues remote imports for the fetch service.
#[derive(Debug, Clone, Default)]
pub struct RemoteFetchQueue {
	accepted: Option<HashSet<String>>,
	queued: Vec<RemoteImportRequest>,
	rejected: Vec<RemoteImportRequest>,
}

impl RemoteFetchQueue {
	/// Create a queue accepting every class.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a queue accepting only the classes the fetch service supports.
	pub fn with_default_accepted_types() -> Self {
		Self::with_accepted_types(DEFAULT_ACCEPTED_TYPES.iter().copied())
	}

	/// Create a queue accepting only the listed classes.
	pub fn with_accepted_types<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
		Self {
			accepted: Some(classes.into_iter().map(str::to_owned).collect()),
			..Self::default()
		}
	}

	/// Borrow queued requests in arrival order.
	pub fn queued(&self) -> &[RemoteImportRequest] {
		&self.queued
	}

	/// Borrow rejected requests in arrival order.
	pub fn rejected(&self) -> &[RemoteImportRequest] {
		&self.rejected
	}

	/// Take queued requests, leaving the queue empty.
	pub fn drain(&mut self) -> Vec<RemoteImportRequest> {
		std::mem::take(&mut self.queued)
	}
}

impl SoftReferenceResolver for RemoteFetchQueue {
	fn request_remote_import(&mut self, request: RemoteImportRequest) -> bool {
		let accepted = self.accepted.as_ref().is_none_or(|classes| classes.contains(&request.class_name));
		if !accepted {
			tracing::debug!(class = %request.class_name, "class not accepted by fetch service");
			self.rejected.push(request);
			return false;
		}
		if !self.queued.contains(&request) {
			tracing::trace!(class = %request.class_name, package = %request.package_path, "queued remote import");
			self.queued.push(request);
		}
		true
	}
}
