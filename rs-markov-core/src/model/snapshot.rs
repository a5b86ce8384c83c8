use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::chain::{TransitionTable, normalize_sentence};

/// Immutable result of one model build.
///
/// Holds the transition table, the start-key list and the normalized corpus
/// sentences as a single value. A reload replaces the whole snapshot, it is
/// never mutated after construction.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelSnapshot {
	order: usize,
	table: TransitionTable,
	/// One entry per qualifying sentence; duplicates carry weight.
	start_keys: Vec<String>,
	/// Normalized training sentences, only used for anti-repeat checks.
	sentences: HashSet<String>,
}

impl ModelSnapshot {
	pub(crate) fn new(order: usize, table: TransitionTable, start_keys: Vec<String>, sentences: HashSet<String>) -> Self {
		Self { order, table, start_keys, sentences }
	}

	/// An empty snapshot, active before any successful reload.
	pub fn empty(order: usize) -> Self {
		Self { order, ..Default::default() }
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn table(&self) -> &TransitionTable {
		&self.table
	}

	pub fn start_keys(&self) -> &[String] {
		&self.start_keys
	}

	/// `true` when no transition has been learned.
	pub fn is_empty(&self) -> bool {
		self.table.is_empty()
	}

	pub fn sentence_count(&self) -> usize {
		self.sentences.len()
	}

	pub fn has_sentences(&self) -> bool {
		!self.sentences.is_empty()
	}

	/// Checks whether `text` is, once normalized, a training sentence.
	pub fn contains_sentence(&self, text: &str) -> bool {
		self.sentences.contains(&normalize_sentence(text))
	}
}
