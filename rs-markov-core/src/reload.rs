use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, error, info};
use parking_lot::{Mutex, RwLock};

use crate::config::GeneratorConfig;
use crate::error::{MarkovError, Result};
use crate::io::read_corpus_file;
use crate::model::chain::ChainBuilder;
use crate::model::snapshot::ModelSnapshot;

/// Where a reload gets its corpus text from.
pub trait CorpusSource: Send + Sync {
	fn read_corpus(&self) -> Result<String>;
}

/// Corpus stored in a UTF-8 text file, read in full on every reload.
#[derive(Debug, Clone)]
pub struct FileCorpus {
	path: PathBuf,
}

impl FileCorpus {
	pub fn new<P: AsRef<Path>>(path: P) -> Self {
		Self { path: path.as_ref().to_path_buf() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl CorpusSource for FileCorpus {
	fn read_corpus(&self) -> Result<String> {
		read_corpus_file(&self.path)
	}
}

/// In-memory corpus.
#[derive(Debug, Clone, Default)]
pub struct TextCorpus(pub String);

impl CorpusSource for TextCorpus {
	fn read_corpus(&self) -> Result<String> {
		Ok(self.0.clone())
	}
}

/// What a call to [`ReloadScheduler::reload`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
	/// Too soon after the last successful reload.
	Skipped,
	Reloaded { keys: usize, start_keys: usize, sentences: usize },
}

/// Owns the active snapshot and rebuilds it, rate-limited.
///
/// Readers clone the current `Arc` and keep using it for as long as they
/// need; a reload builds the new snapshot aside and swaps the pointer in one
/// write, so a reader sees either the old snapshot or the new one in full.
///
/// # Invariants
/// - The active snapshot always has the scheduler's order
/// - A failed reload leaves the active snapshot untouched
/// - A non-forced reload never waits for one already in progress
pub struct ReloadScheduler {
	builder: ChainBuilder,
	min_interval: Duration,
	current: RwLock<Arc<ModelSnapshot>>,
	/// Time of the last successful reload. Held for the whole reload, which
	/// also serializes concurrent reloads.
	last_reload: Mutex<Option<Instant>>,
	/// Set while reads keep failing, so only the first failure logs an error.
	failing: AtomicBool,
}

impl ReloadScheduler {
	/// Creates a scheduler holding an empty snapshot.
	///
	/// # Errors
	/// Returns `InvalidOrder` if `order` is 0.
	pub fn new(order: usize, min_interval: Duration) -> Result<Self> {
		let builder = ChainBuilder::new(order)?;
		Ok(Self {
			builder,
			min_interval,
			current: RwLock::new(Arc::new(ModelSnapshot::empty(order))),
			last_reload: Mutex::new(None),
			failing: AtomicBool::new(false),
		})
	}

	pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
		Self::new(config.order, config.reload_interval())
	}

	pub fn order(&self) -> usize {
		self.builder.order()
	}

	/// Returns the active snapshot.
	pub fn current(&self) -> Arc<ModelSnapshot> {
		self.current.read().clone()
	}

	pub fn last_reload(&self) -> Option<Instant> {
		*self.last_reload.lock()
	}

	/// Whether the most recent reload attempt failed to read the corpus.
	pub fn is_failing(&self) -> bool {
		self.failing.load(Ordering::Relaxed)
	}

	/// Installs a prebuilt snapshot (for example one loaded from a cache).
	///
	/// Does not count as a reload for rate limiting.
	///
	/// # Errors
	/// Returns `InvalidConfig` if the snapshot was built with another order.
	pub fn install(&self, snapshot: ModelSnapshot) -> Result<()> {
		if snapshot.order() != self.order() {
			return Err(MarkovError::InvalidConfig(format!(
				"snapshot order {} does not match scheduler order {}",
				snapshot.order(),
				self.order()
			)));
		}
		*self.current.write() = Arc::new(snapshot);
		Ok(())
	}

	/// Rebuilds the snapshot from `source` unless the last successful reload
	/// is more recent than the minimum interval and `force` is not set.
	///
	/// A non-forced call that finds another reload in progress is skipped
	/// rather than blocked. A forced call waits its turn.
	///
	/// # Errors
	/// Returns the source error if the corpus cannot be read; the active
	/// snapshot stays in place.
	pub fn reload(&self, source: &dyn CorpusSource, force: bool) -> Result<ReloadOutcome> {
		let mut last_reload = if force {
			self.last_reload.lock()
		} else {
			let Some(guard) = self.last_reload.try_lock() else {
				debug!("Reload skipped, another one is in progress");
				return Ok(ReloadOutcome::Skipped);
			};
			if let Some(last) = *guard {
				if last.elapsed() < self.min_interval {
					debug!("Reload skipped, last one was {:?} ago", last.elapsed());
					return Ok(ReloadOutcome::Skipped);
				}
			}
			guard
		};

		let started = Instant::now();
		let text = source.read_corpus().inspect_err(|e| {
			if self.failing.swap(true, Ordering::Relaxed) {
				debug!("Corpus still unreadable: {}", e);
			} else {
				error!("Failed to read corpus, keeping the current snapshot: {}", e);
			}
		})?;
		if self.failing.swap(false, Ordering::Relaxed) {
			info!("Corpus readable again after failed reloads");
		}

		let snapshot = self.builder.build(&text);
		let (keys, start_keys, sentences) =
			(snapshot.table().len(), snapshot.start_keys().len(), snapshot.sentence_count());

		*self.current.write() = Arc::new(snapshot);
		*last_reload = Some(Instant::now());

		info!(
			"Rebuilt Markov chain ({} keys, {} start keys, {} sentences) in {:?}",
			keys,
			start_keys,
			sentences,
			started.elapsed()
		);
		Ok(ReloadOutcome::Reloaded { keys, start_keys, sentences })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io;
	use std::thread;

	struct FailingCorpus;

	impl CorpusSource for FailingCorpus {
		fn read_corpus(&self) -> Result<String> {
			Err(MarkovError::Io(io::Error::new(io::ErrorKind::NotFound, "gone")))
		}
	}

	fn corpus(text: &str) -> TextCorpus {
		TextCorpus(text.to_owned())
	}

	#[test]
	fn test_starts_empty() {
		let scheduler = ReloadScheduler::new(2, Duration::from_secs(60)).unwrap();
		assert!(scheduler.current().is_empty());
		assert!(scheduler.last_reload().is_none());
	}

	#[test]
	fn test_first_reload_runs_then_rate_limited() {
		let scheduler = ReloadScheduler::new(2, Duration::from_secs(3600)).unwrap();

		let outcome = scheduler.reload(&corpus("the cat sat. the dog sat."), false).unwrap();
		assert_eq!(outcome, ReloadOutcome::Reloaded { keys: 4, start_keys: 2, sentences: 2 });

		let outcome = scheduler.reload(&corpus("something else entirely."), false).unwrap();
		assert_eq!(outcome, ReloadOutcome::Skipped);
		assert!(scheduler.current().table().get("the cat").is_some());

		let outcome = scheduler.reload(&corpus("something else entirely."), true).unwrap();
		assert!(matches!(outcome, ReloadOutcome::Reloaded { .. }));
		assert!(scheduler.current().table().get("the cat").is_none());
	}

	#[test]
	fn test_zero_interval_always_reloads() {
		let scheduler = ReloadScheduler::new(2, Duration::ZERO).unwrap();
		scheduler.reload(&corpus("a b c"), false).unwrap();
		let outcome = scheduler.reload(&corpus("a b c"), false).unwrap();
		assert!(matches!(outcome, ReloadOutcome::Reloaded { .. }));
	}

	#[test]
	fn test_failure_keeps_last_good_snapshot() {
		let scheduler = ReloadScheduler::new(2, Duration::ZERO).unwrap();
		scheduler.reload(&corpus("the cat sat."), true).unwrap();
		let before = scheduler.current();
		let last = scheduler.last_reload();

		assert!(scheduler.reload(&FailingCorpus, true).is_err());
		assert!(Arc::ptr_eq(&before, &scheduler.current()));
		assert_eq!(scheduler.last_reload(), last);
	}

	#[test]
	fn test_failing_flag_clears_on_success() {
		let scheduler = ReloadScheduler::new(2, Duration::ZERO).unwrap();
		assert!(!scheduler.is_failing());
		assert!(scheduler.reload(&FailingCorpus, false).is_err());
		assert!(scheduler.reload(&FailingCorpus, false).is_err());
		assert!(scheduler.is_failing());

		scheduler.reload(&corpus("the cat sat."), false).unwrap();
		assert!(!scheduler.is_failing());
	}

	#[test]
	fn test_reload_in_progress_skips_unforced() {
		let scheduler = ReloadScheduler::new(2, Duration::ZERO).unwrap();
		let source = corpus("the cat sat.");

		let running = scheduler.last_reload.lock();
		assert_eq!(scheduler.reload(&source, false).unwrap(), ReloadOutcome::Skipped);
		assert!(scheduler.current().is_empty());
		drop(running);

		assert!(matches!(scheduler.reload(&source, false).unwrap(), ReloadOutcome::Reloaded { .. }));
	}

	#[test]
	fn test_failure_before_any_load_stays_empty() {
		let scheduler = ReloadScheduler::new(2, Duration::ZERO).unwrap();
		assert!(scheduler.reload(&FailingCorpus, false).is_err());
		assert!(scheduler.current().is_empty());
	}

	#[test]
	fn test_install_checks_order() {
		let scheduler = ReloadScheduler::new(2, Duration::ZERO).unwrap();
		let snapshot = ChainBuilder::new(3).unwrap().build("a b c d");
		assert!(scheduler.install(snapshot).is_err());

		let snapshot = ChainBuilder::new(2).unwrap().build("a b c d");
		scheduler.install(snapshot).unwrap();
		assert!(!scheduler.current().is_empty());
		assert!(scheduler.last_reload().is_none());
	}

	#[test]
	fn test_readers_never_see_mixed_snapshots() {
		let scheduler = ReloadScheduler::new(2, Duration::ZERO).unwrap();
		let first = corpus("alpha beta gamma.");
		let second = corpus("delta epsilon zeta.");
		scheduler.reload(&first, true).unwrap();
		let done = AtomicBool::new(false);

		thread::scope(|scope| {
			for _ in 0..4 {
				scope.spawn(|| {
					while !done.load(Ordering::Relaxed) {
						let snapshot = scheduler.current();
						let has_first = snapshot.table().get("alpha beta").is_some();
						assert_eq!(has_first, snapshot.contains_sentence("alpha beta gamma."));
						assert_eq!(!has_first, snapshot.contains_sentence("delta epsilon zeta."));
					}
				});
			}

			for i in 0..200 {
				let source = if i % 2 == 0 { &second } else { &first };
				scheduler.reload(source, true).unwrap();
			}
			done.store(true, Ordering::Relaxed);
		});
	}
}
