use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use rs_markov_core::GeneratorConfig;
use rs_markov_core::io::build_output_path;
use serde::Deserialize;

/// Server settings, read from a TOML file.
///
/// ```toml
/// port = 5000
/// corpus_path = "./data/message_log.txt"
///
/// [generator]
/// order = 2
/// reload_interval_secs = 3600
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,
	pub corpus_path: PathBuf,
	/// JSON object of regex → replacement applied to incoming messages.
	pub replacements_path: Option<PathBuf>,
	pub cache_snapshot: bool,
	/// Defaults to the corpus path with a `.bin` extension.
	pub snapshot_cache: Option<PathBuf>,
	pub generator: GeneratorConfig,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_owned(),
			port: 5000,
			corpus_path: PathBuf::from("./data/message_log.txt"),
			replacements_path: None,
			cache_snapshot: true,
			snapshot_cache: None,
			generator: GeneratorConfig::default(),
		}
	}
}

impl ServerConfig {
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
		let text = fs::read_to_string(path)?;
		Self::parse(&text)
	}

	pub fn parse(text: &str) -> Result<Self, Box<dyn Error>> {
		let config: Self = toml::from_str(text)?;
		config.generator.validate()?;
		Ok(config)
	}

	/// Where the snapshot cache lives, or `None` when caching is off.
	pub fn snapshot_cache_path(&self) -> Option<PathBuf> {
		if !self.cache_snapshot {
			return None;
		}
		match &self.snapshot_cache {
			Some(path) => Some(path.clone()),
			None => build_output_path(&self.corpus_path, "bin").ok(),
		}
	}
}
