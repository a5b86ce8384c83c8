use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use std::thread;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::snapshot::ModelSnapshot;
use super::successors::Successors;
use super::token::tokenize_text;
use crate::error::{MarkovError, Result};

/// Below this many sentences the chain is built on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

/// Chunks per CPU for the parallel build.
const CHUNK_FACTOR: usize = 4;

static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
	// Should not panic: the pattern is a constant
	Regex::new(r"[.!?]\s+|\n+").unwrap()
});

/// Joins `order` tokens into the canonical key form (single spaces).
pub fn join_key<S: AsRef<str>>(tokens: &[S]) -> String {
	tokens.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}

/// Splits corpus text into trimmed, non-empty sentences.
///
/// A boundary is a run of whitespace after `.`, `!` or `?` (the terminator
/// stays with its sentence), or any run of newlines.
pub fn split_sentences(text: &str) -> Vec<&str> {
	let mut sentences = Vec::new();
	let mut start = 0;
	for m in SENTENCE_BOUNDARY.find_iter(text) {
		let end = if m.as_str().starts_with(['.', '!', '?']) { m.start() + 1 } else { m.start() };
		sentences.push(&text[start..end]);
		start = m.end();
	}
	sentences.push(&text[start..]);

	sentences.into_iter().map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Lowercases, collapses whitespace runs and trims.
pub fn normalize_sentence(sentence: &str) -> String {
	sentence.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// N-gram transition table.
///
/// # Invariants
/// - Every key holds exactly `order` tokens
/// - A key is present only with at least one successor
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionTable {
	entries: BTreeMap<String, Successors>,
}

impl TransitionTable {
	/// Records `successor` after `key`.
	pub fn add(&mut self, key: String, successor: &str) {
		self.entries.entry(key).or_default().add(successor);
	}

	pub fn get(&self, key: &str) -> Option<&Successors> {
		self.entries.get(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Merges another table into this one, summing shared counts.
	///
	/// Keys only present in `other` are moved, not copied.
	pub fn merge(&mut self, other: Self) {
		for (key, successors) in other.entries {
			match self.entries.entry(key) {
				Entry::Occupied(mut entry) => entry.get_mut().merge(successors),
				Entry::Vacant(entry) => {
					entry.insert(successors);
				}
			}
		}
	}
}

/// Partial result of building over a run of sentences.
#[derive(Default)]
struct ChainPart {
	table: TransitionTable,
	start_keys: Vec<String>,
}

impl ChainPart {
	fn add_sentence(&mut self, order: usize, sentence: &str) {
		let tokens = tokenize_text(sentence);
		if tokens.len() <= order {
			// Too short for a single transition
			return;
		}

		self.start_keys.push(join_key(&tokens[..order]));
		for window in tokens.windows(order + 1) {
			self.table.add(join_key(&window[..order]), &window[order]);
		}
	}

	fn append(&mut self, other: ChainPart) {
		self.table.merge(other.table);
		self.start_keys.extend(other.start_keys);
	}
}

/// Builds model snapshots from corpus text for a fixed order.
#[derive(Clone, Copy, Debug)]
pub struct ChainBuilder {
	order: usize,
}

impl ChainBuilder {
	/// # Errors
	/// Returns `InvalidOrder` if `order` is 0.
	pub fn new(order: usize) -> Result<Self> {
		if order == 0 {
			return Err(MarkovError::InvalidOrder);
		}
		Ok(Self { order })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Builds a complete snapshot from corpus text.
	///
	/// Identical text always yields an identical snapshot, including the
	/// order and multiplicity of start keys. Large corpora are split into
	/// chunks built on scoped threads and merged back in chunk order.
	pub fn build(&self, text: &str) -> ModelSnapshot {
		let sentences = split_sentences(text);

		let corpus_sentences: HashSet<String> = sentences.iter().map(|s| normalize_sentence(s)).collect();

		let part = if sentences.len() < PARALLEL_THRESHOLD {
			self.build_part(&sentences)
		} else {
			self.build_parallel(&sentences)
		};

		ModelSnapshot::new(self.order, part.table, part.start_keys, corpus_sentences)
	}

	fn build_part(&self, sentences: &[&str]) -> ChainPart {
		let mut part = ChainPart::default();
		for sentence in sentences {
			part.add_sentence(self.order, sentence);
		}
		part
	}

	fn build_parallel(&self, sentences: &[&str]) -> ChainPart {
		let chunks = num_cpus::get() * CHUNK_FACTOR;
		let chunk_size = sentences.len().div_ceil(chunks).max(1);

		thread::scope(|scope| {
			let handles: Vec<_> = sentences
				.chunks(chunk_size)
				.map(|chunk| scope.spawn(move || self.build_part(chunk)))
				.collect();

			let mut merged = ChainPart::default();
			for handle in handles {
				let part = handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
				merged.append(part);
			}
			merged
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_split_sentences() {
		assert_eq!(
			split_sentences("the cat sat. the cat ran! ok?  yes\n\nnext line\r\nlast"),
			vec!["the cat sat.", "the cat ran!", "ok?", "yes", "next line", "last"]
		);
		assert_eq!(split_sentences("3.14 is pi"), vec!["3.14 is pi"]);
		assert!(split_sentences("  \n \n").is_empty());
	}

	#[test]
	fn test_normalize_sentence() {
		assert_eq!(normalize_sentence("  The   Cat\tSat. "), "the cat sat.");
	}

	#[test]
	fn test_reference_corpus() {
		let snapshot = ChainBuilder::new(2).unwrap().build("the cat sat. the cat ran. the dog sat.");
		let table = snapshot.table();

		let cat = table.get("the cat").unwrap();
		assert_eq!(cat.count("sat"), 1);
		assert_eq!(cat.count("ran"), 1);
		assert_eq!(cat.len(), 2);

		let dog = table.get("the dog").unwrap();
		assert_eq!(dog.count("sat"), 1);
		assert_eq!(dog.len(), 1);

		assert_eq!(snapshot.start_keys(), ["the cat", "the cat", "the dog"]);
		assert!(snapshot.contains_sentence("the cat ran."));
	}

	#[test]
	fn test_merge_sums_and_moves() {
		let mut left = TransitionTable::default();
		left.add("the cat".to_owned(), "sat");
		let mut right = TransitionTable::default();
		right.add("the cat".to_owned(), "sat");
		right.add("the cat".to_owned(), "ran");
		right.add("the dog".to_owned(), "sat");

		left.merge(right);
		assert_eq!(left.len(), 2);
		assert_eq!(left.get("the cat").unwrap().count("sat"), 2);
		assert_eq!(left.get("the cat").unwrap().count("ran"), 1);
		assert_eq!(left.get("the dog").unwrap().count("sat"), 1);
	}

	#[test]
	fn test_keys_have_order_tokens() {
		let text = "a b c d e. f g, h i! (j k) l \"m\" n? short. x";
		for order in 1..=4 {
			let snapshot = ChainBuilder::new(order).unwrap().build(text);
			for key in snapshot.table().keys() {
				assert_eq!(key.split(' ').count(), order, "key {:?}", key);
			}
		}
	}

	#[test]
	fn test_one_start_key_per_long_sentence() {
		let text = "one two three. a b. c d e f\nx y\nsolo";
		let snapshot = ChainBuilder::new(2).unwrap().build(text);
		// "x y" and "solo" have no more than two tokens
		assert_eq!(snapshot.start_keys(), ["one two", "a b", "c d"]);
	}

	#[test]
	fn test_short_sentences_only_is_empty() {
		let snapshot = ChainBuilder::new(3).unwrap().build("hi there\nok\nyes no");
		assert!(snapshot.is_empty());
		assert!(snapshot.start_keys().is_empty());
		assert_eq!(snapshot.sentence_count(), 3);
	}

	#[test]
	fn test_empty_corpus() {
		let snapshot = ChainBuilder::new(2).unwrap().build("");
		assert!(snapshot.is_empty());
		assert_eq!(snapshot.sentence_count(), 0);
	}

	#[test]
	fn test_zero_order_rejected() {
		assert!(matches!(ChainBuilder::new(0), Err(MarkovError::InvalidOrder)));
	}

	#[test]
	fn test_build_is_deterministic() {
		let text = "the cat sat. the cat ran. the dog sat. a dog ran off. the cat sat down.";
		let builder = ChainBuilder::new(2).unwrap();
		assert_eq!(builder.build(text), builder.build(text));
	}

	#[test]
	fn test_parallel_build_matches_sequential() {
		let mut text = String::new();
		for i in 0..(PARALLEL_THRESHOLD + 100) {
			text.push_str(&format!("line {} goes to {} now.\n", i % 37, i % 11));
		}
		let builder = ChainBuilder::new(2).unwrap();
		let sentences = split_sentences(&text);

		let sequential = builder.build_part(&sentences);
		let parallel = builder.build_parallel(&sentences);
		assert_eq!(sequential.table, parallel.table);
		assert_eq!(sequential.start_keys, parallel.start_keys);
	}
}
