/// Host localizable text value.
#[derive(Debug, Clone)]
pub enum TextValue {
	/// Culture-invariant text; the empty text is `Invariant("")`.
	Invariant(String),
	/// Text bound to a localization table entry.
	Localized {
		/// Localization namespace.
		namespace: String,
		/// Key inside the namespace.
		key: String,
		/// Source string.
		source: String,
	},
	/// Text created from a namespace/key/source triple for static data; not tracked by live localization.
	Literal {
		/// Localization namespace.
		namespace: String,
		/// Key inside the namespace.
		key: String,
		/// Source string.
		source: String,
	},
}

impl Default for TextValue {
	fn default() -> Self {
		Self::Invariant(String::new())
	}
}

impl TextValue {
	/// Return the display string.
	pub fn source(&self) -> &str {
		match self {
			Self::Invariant(text) => text,
			Self::Localized { source, .. } | Self::Literal { source, .. } => source,
		}
	}

	/// Return whether the display string is empty.
	pub fn is_empty(&self) -> bool {
		self.source().is_empty()
	}

	fn identity(&self) -> Option<(&str, &str, &str)> {
		match self {
			Self::Invariant(_) => None,
			Self::Localized { namespace, key, source } | Self::Literal { namespace, key, source } => Some((namespace, key, source)),
		}
	}

	/// Encode to the canonical reversible string form.
	pub fn to_export_string(&self) -> String {
		match self {
			Self::Invariant(text) if text.is_empty() => String::new(),
			Self::Invariant(text) => format!("INVTEXT({})", quote(text)),
			Self::Localized { namespace, key, source } | Self::Literal { namespace, key, source } => {
				format!("NSLOCTEXT({}, {}, {})", quote(namespace), quote(key), quote(source))
			}
		}
	}

	/// Decode the canonical string form.
	///
	/// Text without a recognized macro is taken verbatim as invariant text.
	pub fn parse_export_string(input: &str) -> Self {
		let trimmed = input.trim();
		if let Some([namespace, key, source]) = macro_args(trimmed, "NSLOCTEXT").as_deref() {
			return Self::Localized {
				namespace: namespace.clone(),
				key: key.clone(),
				source: source.clone(),
			};
		}
		if let Some([key, source]) = macro_args(trimmed, "LOCTEXT").as_deref() {
			return Self::Localized {
				namespace: String::new(),
				key: key.clone(),
				source: source.clone(),
			};
		}
		if let Some([text]) = macro_args(trimmed, "INVTEXT").as_deref() {
			return Self::Invariant(text.clone());
		}
		Self::Invariant(input.to_owned())
	}
}

/// Two empty texts are equal whatever their history; localized and literal texts compare by identity.
impl PartialEq for TextValue {
	fn eq(&self, other: &Self) -> bool {
		if self.is_empty() && other.is_empty() {
			return true;
		}
		match (self.identity(), other.identity()) {
			(Some(left), Some(right)) => left == right,
			(None, None) => self.source() == other.source(),
			_ => false,
		}
	}
}

fn quote(text: &str) -> String {
	let mut out = String::with_capacity(text.len() + 2);
	out.push('"');
	for ch in text.chars() {
		match ch {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\t' => out.push_str("\\t"),
			other => out.push(other),
		}
	}
	out.push('"');
	out
}

fn macro_args(input: &str, name: &str) -> Option<Vec<String>> {
	let body = input.strip_prefix(name)?.trim_start().strip_prefix('(')?.strip_suffix(')')?;
	let mut args = Vec::new();
	let mut chars = body.chars().peekable();

	loop {
		while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
		if chars.next()? != '"' {
			return None;
		}

		let mut arg = String::new();
		loop {
			match chars.next()? {
				'"' => break,
				'\\' => match chars.next()? {
					'n' => arg.push('\n'),
					't' => arg.push('\t'),
					other => arg.push(other),
				},
				other => arg.push(other),
			}
		}
		args.push(arg);

		while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
		match chars.next() {
			Some(',') => continue,
			None => return Some(args),
			Some(_) => return None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::TextValue;

	#[test]
	fn empty_text_encodes_to_empty_string() {
		assert_eq!(TextValue::default().to_export_string(), "");
		assert_eq!(TextValue::parse_export_string(""), TextValue::default());
	}

	#[test]
	fn localized_text_round_trips_with_escapes() {
		let text = TextValue::Localized {
			namespace: "UI".into(),
			key: "Greeting".into(),
			source: "Say \"hi\"\n".into(),
		};
		let encoded = text.to_export_string();
		assert_eq!(encoded, r#"NSLOCTEXT("UI", "Greeting", "Say \"hi\"\n")"#);
		assert_eq!(TextValue::parse_export_string(&encoded), text);
	}

	#[test]
	fn invariant_and_loctext_forms_parse() {
		assert!(matches!(TextValue::parse_export_string(r#"INVTEXT("plain")"#), TextValue::Invariant(text) if text == "plain"));
		assert!(matches!(
			TextValue::parse_export_string(r#"LOCTEXT("K", "Src")"#),
			TextValue::Localized { namespace, key, source } if namespace.is_empty() && key == "K" && source == "Src"
		));
	}

	#[test]
	fn unrecognized_text_is_taken_verbatim() {
		assert!(matches!(TextValue::parse_export_string("NSLOCTEXT(broken"), TextValue::Invariant(text) if text == "NSLOCTEXT(broken"));
		assert!(matches!(TextValue::parse_export_string("Hello"), TextValue::Invariant(text) if text == "Hello"));
	}

	#[test]
	fn equality_uses_identity_and_empty_rule() {
		let literal = TextValue::Literal {
			namespace: "ns".into(),
			key: "k".into(),
			source: "Src".into(),
		};
		let localized = TextValue::Localized {
			namespace: "ns".into(),
			key: "k".into(),
			source: "Src".into(),
		};
		assert_eq!(literal, localized);
		assert_ne!(literal, TextValue::Invariant("Src".into()));

		let empty_literal = TextValue::Literal {
			namespace: "ns".into(),
			key: "k".into(),
			source: String::new(),
		};
		assert_eq!(empty_literal, TextValue::default());
	}
}
