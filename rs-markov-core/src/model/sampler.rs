use rand::Rng;
use rand::seq::IndexedRandom;

use super::chain::join_key;
use super::snapshot::ModelSnapshot;
use super::token::TERMINALS;
use crate::error::{MarkovError, Result};

/// Extra tokens past the start key before a terminal symbol may end the walk.
const EARLY_STOP_SLACK: usize = 4;

/// Weighted random walk over a snapshot's transition table.
///
/// The state is the last `order` tokens generated. The walk stops on a dead
/// end, after `max_tokens` appended tokens, or once the output is longer than
/// `order + 4` tokens and ends with `.`, `!` or `?`.
pub struct Sampler<'a> {
	snapshot: &'a ModelSnapshot,
	temperature: f32,
}

impl<'a> Sampler<'a> {
	pub fn new(snapshot: &'a ModelSnapshot, temperature: f32) -> Self {
		Self { snapshot, temperature }
	}

	/// Keys a walk may start from.
	///
	/// Without a prompt this is the start-key list. With one, it is every
	/// table key containing the prompt (case-insensitive), or the start-key
	/// list again if none does.
	pub fn start_candidates(&self, prompt: Option<&str>) -> Vec<&'a str> {
		let start_keys = || -> Vec<&'a str> { self.snapshot.start_keys().iter().map(String::as_str).collect() };

		// A blank prompt counts as none; otherwise it matches as given, spaces included
		let prompt = match prompt {
			Some(p) if !p.trim().is_empty() => p.to_lowercase(),
			_ => return start_keys(),
		};

		let matched: Vec<&'a str> = self
			.snapshot
			.table()
			.keys()
			.filter(|key| key.to_lowercase().contains(&prompt))
			.collect();

		if matched.is_empty() { start_keys() } else { matched }
	}

	/// Picks the initial key uniformly from the candidates.
	///
	/// # Errors
	/// Returns `NoData` if there is nothing to start from.
	pub fn choose_start<R: Rng + ?Sized>(&self, prompt: Option<&str>, rng: &mut R) -> Result<&'a str> {
		self.start_candidates(prompt).choose(rng).copied().ok_or(MarkovError::NoData)
	}

	/// Walks the chain from `start`, returning every token including the start key's.
	pub fn walk<R: Rng + ?Sized>(&self, start: &str, max_tokens: usize, rng: &mut R) -> Vec<String> {
		let order = self.snapshot.order();
		let mut output: Vec<String> = start.split(' ').map(str::to_owned).collect();
		let mut key = start.to_owned();

		for _ in 0..max_tokens {
			let next = match self.snapshot.table().get(&key) {
				Some(successors) => successors.sample(self.temperature, rng),
				None => None,
			};
			let Some(next) = next else {
				// Terminal state
				break;
			};

			output.push(next.to_owned());
			key = join_key(&output[output.len().saturating_sub(order)..]);

			if output.len() > order + EARLY_STOP_SLACK && TERMINALS.contains(&next) {
				break;
			}
		}

		output
	}

	/// Chooses a start key and walks from it.
	///
	/// # Errors
	/// Returns `NoData` when the snapshot offers no start key.
	pub fn sample<R: Rng + ?Sized>(&self, prompt: Option<&str>, max_tokens: usize, rng: &mut R) -> Result<Vec<String>> {
		let start = self.choose_start(prompt, rng)?;
		Ok(self.walk(start, max_tokens, rng))
	}
}
