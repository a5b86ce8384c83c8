use std::path::Path;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::error::{MarkovError, Result};
use crate::io::read_corpus_file;

// Should not panic: the pattern is a constant
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Ordered, case-insensitive pattern → replacement rewrites.
#[derive(Debug, Clone, Default)]
pub struct Replacements {
	patterns: Vec<(Regex, String)>,
}

impl Replacements {
	/// Compiles `(pattern, replacement)` pairs, keeping their order.
	///
	/// # Errors
	/// Returns `Pattern` on the first pattern that does not compile.
	pub fn new<I, P, R>(pairs: I) -> Result<Self>
	where
		I: IntoIterator<Item = (P, R)>,
		P: AsRef<str>,
		R: Into<String>,
	{
		let patterns = pairs
			.into_iter()
			.map(|(pattern, replacement)| {
				let regex = RegexBuilder::new(pattern.as_ref()).case_insensitive(true).build()?;
				Ok((regex, replacement.into()))
			})
			.collect::<Result<Vec<_>>>()?;
		Ok(Self { patterns })
	}

	/// Parses a JSON object of `"pattern": "replacement"` entries.
	///
	/// # Errors
	/// Returns `InvalidConfig` for malformed JSON or a non-string value.
	pub fn from_json(text: &str) -> Result<Self> {
		let object: Map<String, Value> = serde_json::from_str(text)?;
		let mut pairs = Vec::with_capacity(object.len());
		for (pattern, value) in object {
			match value {
				Value::String(replacement) => pairs.push((pattern, replacement)),
				other => {
					return Err(MarkovError::InvalidConfig(format!(
						"replacement for {:?} must be a string, got {}",
						pattern, other
					)));
				}
			}
		}
		Self::new(pairs)
	}

	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		Self::from_json(&read_corpus_file(path)?)
	}

	pub fn len(&self) -> usize {
		self.patterns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}

	/// Applies every rewrite in order.
	pub fn apply(&self, text: &str) -> String {
		let mut result = text.to_owned();
		for (regex, replacement) in &self.patterns {
			result = regex.replace_all(&result, replacement.as_str()).into_owned();
		}
		result
	}
}

/// Cleans one chat message into a single corpus line.
///
/// Rewrites are applied first, then whitespace runs (newlines included)
/// collapse to one space and the result is trimmed.
pub fn sanitize_message(text: &str, replacements: &Replacements) -> String {
	let replaced = replacements.apply(text);
	WHITESPACE.replace_all(&replaced, " ").trim().to_owned()
}
