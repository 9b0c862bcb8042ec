use crate::asset::value::{Object, Value};
use crate::asset::{AssetError, Result};

/// Parse a GUID string into its four 32-bit components.
///
/// Accepts 32 bare hex digits, `8-4-4-4-12`, and `8-8-8-8` groupings, optionally wrapped in braces or parentheses.
pub fn parse_guid(input: &str) -> Result<[u32; 4]> {
	let invalid = || AssetError::InvalidGuid { input: input.to_owned() };

	let trimmed = input.trim();
	let inner = trimmed
		.strip_prefix('{')
		.and_then(|rest| rest.strip_suffix('}'))
		.or_else(|| trimmed.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')))
		.unwrap_or(trimmed);

	let groups: Vec<&str> = inner.split('-').collect();
	let lengths: Vec<usize> = groups.iter().map(|group| group.len()).collect();
	if !groups.iter().all(|group| group.chars().all(|ch| ch.is_ascii_hexdigit())) {
		return Err(invalid());
	}

	let hex = |text: &str| u32::from_str_radix(text, 16).map_err(|_| invalid());
	match lengths.as_slice() {
		[32] => {
			let digits = groups[0];
			Ok([hex(&digits[0..8])?, hex(&digits[8..16])?, hex(&digits[16..24])?, hex(&digits[24..32])?])
		}
		[8, 8, 8, 8] => Ok([hex(groups[0])?, hex(groups[1])?, hex(groups[2])?, hex(groups[3])?]),
		[8, 4, 4, 4, 12] => {
			let last = groups[4];
			Ok([
				hex(groups[0])?,
				(hex(groups[1])? << 16) | hex(groups[2])?,
				(hex(groups[3])? << 16) | hex(&last[0..4])?,
				hex(&last[4..12])?,
			])
		}
		_ => Err(invalid()),
	}
}

/// Format GUID components as 32 uppercase hex digits.
pub fn format_guid(parts: [u32; 4]) -> String {
	format!("{:08X}{:08X}{:08X}{:08X}", parts[0], parts[1], parts[2], parts[3])
}

/// Rewrite a GUID string into the `{A, B, C, D}` object form.
pub fn guid_object(input: &str) -> Result<Object> {
	let parts = parse_guid(input)?;
	Ok(["A", "B", "C", "D"]
		.into_iter()
		.zip(parts)
		.map(|(key, part)| (key.to_owned(), Value::from(i64::from(part))))
		.collect())
}

#[cfg(test)]
mod tests {
	use super::{format_guid, guid_object, parse_guid};
	use crate::asset::AssetError;
	use crate::asset::value::Value;

	const PARTS: [u32; 4] = [0x0123_4567, 0x89AB_CDEF, 0x0011_2233, 0x4455_6677];

	#[test]
	fn all_groupings_parse_to_same_parts() {
		for input in [
			"0123456789ABCDEF0011223344556677",
			"01234567-89ABCDEF-00112233-44556677",
			"01234567-89ab-cdef-0011-223344556677",
			"{01234567-89AB-CDEF-0011-223344556677}",
			"(0123456789abcdef0011223344556677)",
		] {
			assert_eq!(parse_guid(input).expect(input), PARTS, "{input}");
		}
	}

	#[test]
	fn format_round_trips() {
		assert_eq!(parse_guid(&format_guid(PARTS)).expect("parses"), PARTS);
	}

	#[test]
	fn malformed_strings_are_rejected() {
		for input in ["", "xyz", "0123456789ABCDEF", "01234567-89AB-CDEF-0011-22334455667G", "{0123456789ABCDEF0011223344556677"] {
			assert!(matches!(parse_guid(input), Err(AssetError::InvalidGuid { .. })), "{input}");
		}
	}

	#[test]
	fn object_form_has_numeric_fields() {
		let object = guid_object("0123456789ABCDEF0011223344556677").expect("guid");
		assert_eq!(object.keys().map(String::as_str).collect::<Vec<_>>(), ["A", "B", "C", "D"]);
		assert_eq!(object.get("B"), Some(&Value::Number(f64::from(0x89AB_CDEF_u32))));
	}
}
