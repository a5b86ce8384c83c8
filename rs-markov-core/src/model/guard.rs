use log::{debug, warn};

use super::snapshot::ModelSnapshot;
use crate::error::Result;

/// Bounded retry loop rejecting verbatim training sentences.
///
/// At most `retries` candidates are produced. The first one whose normalized
/// form is not a corpus sentence is returned; if every attempt collides, the
/// last candidate is returned anyway.
#[derive(Debug, Clone, Copy)]
pub struct AntiRepeatGuard {
	retries: usize,
}

impl AntiRepeatGuard {
	/// A budget of 0 still makes one attempt.
	pub fn new(retries: usize) -> Self {
		Self { retries: retries.max(1) }
	}

	pub fn retries(&self) -> usize {
		self.retries
	}

	/// Runs `candidate` until it yields something new or the budget is spent.
	///
	/// # Errors
	/// Propagates the first error returned by `candidate`.
	pub fn run<F>(&self, snapshot: &ModelSnapshot, mut candidate: F) -> Result<String>
	where
		F: FnMut() -> Result<String>,
	{
		let mut last = candidate()?;
		if !snapshot.has_sentences() {
			return Ok(last);
		}

		for attempt in 1..=self.retries {
			if !snapshot.contains_sentence(&last) {
				return Ok(last);
			}
			if attempt == self.retries {
				break;
			}
			debug!("Candidate {} of {} repeats a corpus sentence, retrying", attempt, self.retries);
			last = candidate()?;
		}

		warn!("All {} candidates repeat the corpus, returning the last one", self.retries);
		Ok(last)
	}
}
