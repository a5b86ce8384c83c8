use log::debug;
use rand::Rng;

use super::detokenizer::detokenize;
use super::guard::AntiRepeatGuard;
use super::repair::repair;
use super::request::GenerateRequest;
use super::sampler::Sampler;
use super::snapshot::ModelSnapshot;
use crate::config::GeneratorConfig;
use crate::error::Result;

/// High-level text generation over a model snapshot.
///
/// # Responsibilities
/// - Resolve request parameters against the configuration
/// - Run sampler, detokenizer and repair inside the anti-repeat guard
/// - Always answer with a string, the configured sentinel when there is no data
#[derive(Debug, Clone)]
pub struct Generator {
	config: GeneratorConfig,
	guard: AntiRepeatGuard,
}

impl Generator {
	/// # Errors
	/// Returns an error if the configuration does not validate.
	pub fn new(config: GeneratorConfig) -> Result<Self> {
		config.validate()?;
		let guard = AntiRepeatGuard::new(config.retries);
		Ok(Self { config, guard })
	}

	pub fn config(&self) -> &GeneratorConfig {
		&self.config
	}

	/// Generates one sentence using the thread-local RNG.
	pub fn generate(&self, snapshot: &ModelSnapshot, request: &GenerateRequest) -> String {
		self.generate_with(snapshot, request, &mut rand::rng())
	}

	/// Generates one sentence with the given RNG.
	///
	/// Never fails: an empty snapshot yields `no_data_message`.
	pub fn generate_with<R: Rng + ?Sized>(&self, snapshot: &ModelSnapshot, request: &GenerateRequest, rng: &mut R) -> String {
		if snapshot.is_empty() {
			return self.config.no_data_message.clone();
		}

		let length = match request.length {
			Some(length) => length.min(self.config.length_cap),
			None => rng.random_range(self.config.min_length..=self.config.max_length),
		};
		let temperature = request.temperature().unwrap_or(self.config.temperature);
		let sampler = Sampler::new(snapshot, temperature);
		let prompt = request.prompt.as_deref();

		let result = self.guard.run(snapshot, || {
			let tokens = sampler.sample(prompt, length, rng)?;
			Ok(repair(&detokenize(&tokens)))
		});

		match result {
			Ok(text) => text,
			Err(e) => {
				debug!("Generation fell back to the sentinel: {}", e);
				self.config.no_data_message.clone()
			}
		}
	}
}
