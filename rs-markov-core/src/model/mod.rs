//! Top-level module for the Markov text generation system.
//!
//! Pipeline, leaves first:
//! - Tokenization of sentences into typed tokens (`token`)
//! - Chain construction into an immutable snapshot (`chain`, `snapshot`)
//! - Weighted random walk with a temperature (`sampler`, `successors`)
//! - Text reconstruction and punctuation repair (`detokenizer`, `repair`)
//! - Anti-repeat retries and the high-level interface (`guard`, `generator`)

/// Word, punctuation, URL and platform-reference tokenizer.
pub mod token;

/// Successor multiset of one n-gram key, with temperature sampling.
pub mod successors;

/// Sentence splitting, transition table and the chain builder.
pub mod chain;

/// Immutable (table, start keys, corpus sentences) snapshot.
pub mod snapshot;

/// Random walk over a snapshot.
pub mod sampler;

/// Token sequence to readable text.
pub mod detokenizer;

/// Bracket and quote balancing.
pub mod repair;

/// Bounded retry loop rejecting verbatim corpus sentences.
pub mod guard;

/// Per-request parameters.
pub mod request;

/// High-level generation interface.
pub mod generator;
