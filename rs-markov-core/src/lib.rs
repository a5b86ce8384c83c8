//! Markov chain text generation library.
//!
//! This crate provides a word-level Markov generator including:
//! - Tokenization of short texts into words, punctuation, URLs and references
//! - Order-N transition tables built into immutable snapshots
//! - Temperature-controlled sampling with an optional prompt bias
//! - Anti-repeat retries and bracket/quote repair of the output
//! - Rate-limited reloads with an atomic snapshot swap
//!
//! Generation never fails: with nothing learned, the configured sentinel
//! string is returned.

/// Core chain models and generation logic.
pub mod model;

/// Generation and reload settings.
pub mod config;

/// Error type shared by the crate.
pub mod error;

/// Corpus sources and the rate-limited snapshot scheduler.
pub mod reload;

/// Message cleanup applied before text enters the corpus.
pub mod sanitize;

/// File helpers (corpus reading, snapshot cache).
pub mod io;

pub use config::GeneratorConfig;
pub use error::{MarkovError, Result};
pub use model::generator::Generator;
pub use model::request::GenerateRequest;
pub use model::snapshot::ModelSnapshot;
pub use reload::{CorpusSource, FileCorpus, ReloadOutcome, ReloadScheduler, TextCorpus};
