//! Bracket and quote balancing for generated text.
//!
//! This is a heuristic: the side a missing quote goes on is decided from the
//! single character before the first quote. Nested or mixed quoting is not
//! parsed and may be balanced on the wrong side.

const OPENING_BRACKETS: &[char] = &['(', '[', '{'];

/// Balances parentheses, double quotes and non-contraction single quotes.
///
/// Always succeeds. The result has as many `(` as `)`, and an even number
/// of `"` and of `'` not sitting between two alphanumerics.
pub fn repair(text: &str) -> String {
	let text = balance_parentheses(text);
	let text = balance_quote(text, '"', false);
	balance_quote(text, '\'', true)
}

/// Prepends `(` for every unmatched `)` and appends `)` for every unclosed `(`.
fn balance_parentheses(text: &str) -> String {
	let mut balance = 0usize;
	let mut excess_closes = 0usize;
	for c in text.chars() {
		match c {
			'(' => balance += 1,
			')' if balance == 0 => excess_closes += 1,
			')' => balance -= 1,
			_ => {}
		}
	}

	let mut repaired = String::with_capacity(text.len() + balance + excess_closes);
	repaired.extend(std::iter::repeat_n('(', excess_closes));
	repaired.push_str(text);
	repaired.extend(std::iter::repeat_n(')', balance));
	repaired
}

fn is_contraction(chars: &[char], index: usize) -> bool {
	index > 0
		&& chars[index - 1].is_alphanumeric()
		&& chars.get(index + 1).is_some_and(|c| c.is_alphanumeric())
}

/// Adds one `quote` when the counted occurrences are odd.
///
/// If the first counted quote follows a character that is neither
/// whitespace nor an opening bracket, it reads as an orphaned closer and the
/// missing quote is prepended; otherwise it is appended.
fn balance_quote(text: String, quote: char, skip_contractions: bool) -> String {
	let chars: Vec<char> = text.chars().collect();
	let positions: Vec<usize> = chars
		.iter()
		.enumerate()
		.filter(|(i, c)| **c == quote && !(skip_contractions && is_contraction(&chars, *i)))
		.map(|(i, _)| i)
		.collect();

	let Some(&first) = positions.first() else {
		return text;
	};
	if positions.len() % 2 == 0 {
		return text;
	}

	let orphaned_closer = first
		.checked_sub(1)
		.map(|i| chars[i])
		.is_some_and(|prev| !prev.is_whitespace() && !OPENING_BRACKETS.contains(&prev));

	if orphaned_closer {
		format!("{quote}{text}")
	} else {
		format!("{text}{quote}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn count(text: &str, c: char) -> usize {
		text.chars().filter(|x| *x == c).count()
	}

	fn loose_apostrophes(text: &str) -> usize {
		let chars: Vec<char> = text.chars().collect();
		(0..chars.len()).filter(|i| chars[*i] == '\'' && !is_contraction(&chars, *i)).count()
	}

	#[test]
	fn test_parentheses() {
		assert_eq!(repair("hello) world"), "(hello) world");
		assert_eq!(repair("(hello world"), "(hello world)");
		assert_eq!(repair(")) a (("), "(()) a (())");
		assert_eq!(repair("(fine)"), "(fine)");
	}

	#[test]
	fn test_double_quotes() {
		assert_eq!(repair("he said hi\" ok"), "\"he said hi\" ok");
		assert_eq!(repair("\"hello there"), "\"hello there\"");
		assert_eq!(repair("say (\"hi"), "say (\"hi)\"");
		assert_eq!(repair("a \"b\" c"), "a \"b\" c");
	}

	#[test]
	fn test_single_quotes_skip_contractions() {
		assert_eq!(repair("don't stop"), "don't stop");
		assert_eq!(repair("don't 'go"), "don't 'go'");
		assert_eq!(repair("dogs' bowl"), "'dogs' bowl");
		assert_eq!(repair("rock 'n' roll"), "rock 'n' roll");
	}

	#[test]
	fn test_empty_and_plain() {
		assert_eq!(repair(""), "");
		assert_eq!(repair("nothing to do"), "nothing to do");
	}

	#[test]
	fn test_always_balanced() {
		let inputs = [
			"((a\"b'c)",
			")\"'(",
			"it's \"x) (y' z\"\"",
			"'''\"\"\"(((",
			"he's 'there' (or \"not",
			"«(» don't ) ' \"",
			"l'été \"",
		];
		for input in inputs {
			let out = repair(input);
			assert_eq!(count(&out, '('), count(&out, ')'), "{:?} -> {:?}", input, out);
			assert_eq!(count(&out, '"') % 2, 0, "{:?} -> {:?}", input, out);
			assert_eq!(loose_apostrophes(&out) % 2, 0, "{:?} -> {:?}", input, out);
		}
	}
}
