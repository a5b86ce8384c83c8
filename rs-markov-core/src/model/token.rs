use std::sync::LazyLock;

use regex::{Captures, Match, Regex};
use serde::{Deserialize, Serialize};

/// Sentence-terminal punctuation, used by the sampler's early stop.
pub const TERMINALS: &[&str] = &[".", "!", "?"];

// Alternatives are tried left to right at each position, so the order of the
// groups is the recognition priority.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
	// Should not panic: the pattern is a constant
	Regex::new(concat!(
		r"(?P<url>[A-Za-z][A-Za-z0-9+.\-]*://\S+)",
		r"|(?P<reference><a?:\w+:\d+>|<(?:@[!&]?|#)\d+>)",
		r"|(?P<word>[\p{L}\p{N}]+(?:'[\p{L}\p{N}]+)*)",
		r#"|(?P<punct>[.,!?;:"'()\[\]{}…\-“”‘’])"#,
	))
	.unwrap()
});

/// Class assigned to a token at tokenization time.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
	Url,
	/// Custom emoji (`<:name:id>`, `<a:name:id>`) or mention (`<@id>`, `<#id>`, ...).
	Reference,
	Word,
	Punctuation,
}

impl TokenKind {
	/// Classifies a single token, as produced by [`tokenize`].
	///
	/// Returns `None` unless the whole text is exactly one token.
	pub fn of(text: &str) -> Option<Self> {
		let caps = TOKEN_PATTERN.captures(text)?;
		let (kind, m) = classify(&caps)?;
		(m.start() == 0 && m.end() == text.len()).then_some(kind)
	}
}

fn classify<'t>(caps: &Captures<'t>) -> Option<(TokenKind, Match<'t>)> {
	if let Some(m) = caps.name("url") {
		Some((TokenKind::Url, m))
	} else if let Some(m) = caps.name("reference") {
		Some((TokenKind::Reference, m))
	} else if let Some(m) = caps.name("word") {
		Some((TokenKind::Word, m))
	} else {
		caps.name("punct").map(|m| (TokenKind::Punctuation, m))
	}
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Token {
	pub text: String,
	pub kind: TokenKind,
}

impl Token {
	pub fn into_text(self) -> String {
		self.text
	}
}

/// Splits one sentence into typed tokens.
///
/// - URLs and platform references are never decomposed.
/// - Contractions (`don't`) stay one word.
/// - Unrecognised characters are silently dropped.
pub fn tokenize(sentence: &str) -> Vec<Token> {
	TOKEN_PATTERN
		.captures_iter(sentence)
		.filter_map(|caps| {
			let (kind, m) = classify(&caps)?;
			Some(Token { text: m.as_str().to_owned(), kind })
		})
		.collect()
}

/// Convenience wrapper returning only token texts.
pub fn tokenize_text(sentence: &str) -> Vec<String> {
	tokenize(sentence).into_iter().map(Token::into_text).collect()
}
