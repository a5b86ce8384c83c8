use super::token::TokenKind;

/// Tokens glued to whatever precedes them.
const CLOSING_PUNCTUATION: &[&str] = &[",", ".", "!", "?", ";", ":", ")", "]", "}", "…"];

const OPENING_BRACKETS: &[&str] = &["(", "[", "{"];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum QuoteDirection {
	Opening,
	Closing,
}

/// Tracks how many straight quotes have been seen, to orient the next one.
#[derive(Default)]
struct QuoteCounter {
	double: usize,
	single: usize,
}

impl QuoteCounter {
	/// Typographic quotes carry their direction. A straight quote opens when
	/// an even number of the same character precedes it, and closes otherwise.
	fn direction(&mut self, token: &str) -> Option<QuoteDirection> {
		let seen = match token {
			"“" | "‘" => return Some(QuoteDirection::Opening),
			"”" | "’" => return Some(QuoteDirection::Closing),
			"\"" => &mut self.double,
			"'" => &mut self.single,
			_ => return None,
		};
		let direction = if *seen % 2 == 0 { QuoteDirection::Opening } else { QuoteDirection::Closing };
		*seen += 1;
		Some(direction)
	}
}

fn push_spaced(output: &mut String, token: &str) {
	if !output.is_empty() && !output.ends_with(' ') {
		output.push(' ');
	}
	output.push_str(token);
}

/// Glues `token` to an opening quote, or spaces it.
fn push_after_quote(output: &mut String, token: &str, quote_open: &mut bool) {
	if *quote_open {
		output.push_str(token);
		*quote_open = false;
	} else {
		push_spaced(output, token);
	}
}

/// Rebuilds readable text from a token sequence.
///
/// Closing punctuation is glued to the left, an opening quote is glued to the
/// token after it, everything else is separated by one space. The result is
/// trimmed and its first character uppercased.
pub fn detokenize<S: AsRef<str>>(tokens: &[S]) -> String {
	let mut output = String::new();
	let mut quote_open = false;
	let mut quotes = QuoteCounter::default();

	for token in tokens {
		let token = token.as_ref();

		if TokenKind::of(token) != Some(TokenKind::Punctuation) {
			push_after_quote(&mut output, token, &mut quote_open);
			continue;
		}

		if CLOSING_PUNCTUATION.contains(&token) {
			output.push_str(token);
			continue;
		}

		if OPENING_BRACKETS.contains(&token) {
			push_spaced(&mut output, token);
			continue;
		}

		match quotes.direction(token) {
			Some(QuoteDirection::Opening) => {
				push_spaced(&mut output, token);
				quote_open = true;
				continue;
			}
			Some(QuoteDirection::Closing) if !quote_open => {
				output.push_str(token);
				continue;
			}
			_ => {}
		}

		push_after_quote(&mut output, token, &mut quote_open);
	}

	capitalize_first(&collapse_spaces(&output))
}

fn collapse_spaces(text: &str) -> String {
	let mut collapsed = String::with_capacity(text.len());
	for c in text.chars() {
		if c == ' ' && collapsed.ends_with(' ') {
			continue;
		}
		collapsed.push(c);
	}
	collapsed.trim().to_owned()
}

fn capitalize_first(text: &str) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
