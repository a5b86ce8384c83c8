use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lowest temperature used when sampling; anything smaller is clamped.
pub const MIN_TEMPERATURE: f32 = 0.05;

/// Successor multiset of one n-gram key.
///
/// Conceptually the outgoing edges of a Markov chain node, weighted by the
/// number of times each successor token was observed.
///
/// # Invariants
/// - Each occurrence count is strictly positive
/// - Iteration order is the token order, so a seeded RNG gives reproducible draws
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Successors {
	counts: BTreeMap<String, usize>,
}

impl Successors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `token` after this key.
	pub fn add(&mut self, token: &str) {
		if let Some(count) = self.counts.get_mut(token) {
			*count += 1;
		} else {
			self.counts.insert(token.to_owned(), 1);
		}
	}

	pub fn count(&self, token: &str) -> usize {
		self.counts.get(token).copied().unwrap_or(0)
	}

	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
		self.counts.iter().map(|(token, count)| (token.as_str(), *count))
	}

	/// Picks a successor with probability proportional to `count^(1/t)`.
	///
	/// `t` is `temperature` clamped to [`MIN_TEMPERATURE`]. Low values sharpen the
	/// distribution toward the most frequent successor, high values flatten it
	/// toward a uniform choice.
	///
	/// Weights are computed on `count / max_count` so large counts at low
	/// temperature cannot overflow; the ratios are unchanged.
	///
	/// Returns `None` if there are no successors.
	pub fn sample<R: Rng + ?Sized>(&self, temperature: f32, rng: &mut R) -> Option<&str> {
		let max_count = self.counts.values().copied().max()?;
		let exponent = 1.0 / f64::from(temperature.max(MIN_TEMPERATURE));

		let weights: Vec<(&str, f64)> = self
			.counts
			.iter()
			.map(|(token, count)| (token.as_str(), (*count as f64 / max_count as f64).powf(exponent)))
			.collect();
		let total: f64 = weights.iter().map(|(_, w)| w).sum();

		let mut r = rng.random::<f64>() * total;
		let mut fallback = None;
		for (token, weight) in weights {
			if r < weight {
				return Some(token);
			}
			r -= weight;
			fallback = Some(token);
		}

		// Only reachable through float rounding on the last bucket
		fallback
	}

	/// Adds the counts of `other` to this multiset.
	pub fn merge(&mut self, other: Self) {
		for (token, count) in other.counts {
			*self.counts.entry(token).or_insert(0) += count;
		}
	}
}
