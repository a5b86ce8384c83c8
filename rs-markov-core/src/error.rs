use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the Markov core.
///
/// Text generation itself never fails: `NoData` is mapped to the configured
/// sentinel by the generator. Only configuration and corpus/snapshot I/O
/// errors reach the caller.
#[derive(Error, Debug)]
pub enum MarkovError {
	#[error("order must be >= 1")]
	InvalidOrder,

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("no data: the model has not learned anything yet")]
	NoData,

	#[error("failed to read corpus {}: {}", .path.display(), .source)]
	CorpusSource {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("snapshot error: {0}")]
	Snapshot(String),

	#[error("io error: {0}")]
	Io(#[from] io::Error),

	#[error("invalid pattern: {0}")]
	Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, MarkovError>;

impl From<postcard::Error> for MarkovError {
	fn from(e: postcard::Error) -> Self {
		MarkovError::Snapshot(e.to_string())
	}
}

impl From<serde_json::Error> for MarkovError {
	fn from(e: serde_json::Error) -> Self {
		MarkovError::InvalidConfig(e.to_string())
	}
}
