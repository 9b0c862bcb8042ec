use std::io::Read;

use crate::asset::{AssetError, Result};

const MAX_DECOMPRESSED_BYTES: usize = 512 * 1024 * 1024;
/// zstd frame magic used by compressed export files.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Compression mode detected for an export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// Plain JSON text.
	None,
	/// zstd-compressed JSON text.
	Zstd,
}

impl Compression {
	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}
}

/// Detect and decode compression, returning `(mode, json_bytes)`.
pub fn decode_bytes(raw: Vec<u8>) -> Result<(Compression, Vec<u8>)> {
	if raw.starts_with(&ZSTD_MAGIC) {
		let out = decode_zstd(&raw)?;
		if !looks_like_json(&out) {
			return Err(AssetError::InvalidExportFile {
				reason: "decompressed stream is not JSON",
			});
		}
		return Ok((Compression::Zstd, out));
	}

	if looks_like_json(&raw) {
		return Ok((Compression::None, raw));
	}

	Err(AssetError::UnknownMagic { magic: first4(&raw) })
}

fn looks_like_json(bytes: &[u8]) -> bool {
	let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
	bytes
		.iter()
		.find(|byte| !byte.is_ascii_whitespace())
		.is_some_and(|byte| matches!(byte, b'[' | b'{'))
}

fn decode_zstd(raw: &[u8]) -> Result<Vec<u8>> {
	let mut decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf)?;
		if read == 0 {
			break;
		}

		if out.len() + read > MAX_DECOMPRESSED_BYTES {
			return Err(AssetError::DecompressedTooLarge { limit: MAX_DECOMPRESSED_BYTES });
		}

		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}

fn first4(bytes: &[u8]) -> [u8; 4] {
	let mut magic = [0_u8; 4];
	let take = bytes.len().min(4);
	magic[..take].copy_from_slice(&bytes[..take]);
	magic
}
