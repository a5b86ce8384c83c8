use crate::error::{MarkovError, Result};

/// Per-request generation parameters.
///
/// Anything left unset falls back to the generator's `GeneratorConfig`.
///
/// # Invariants
/// - `temperature`, when set, is finite and >= 0.0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
	/// Substring used to bias the start key (case-insensitive).
	pub prompt: Option<String>,

	/// Maximum number of tokens appended after the start key.
	/// Clamped to `length_cap`; a random length is drawn when unset.
	pub length: Option<usize>,

	temperature: Option<f32>,
}

impl GenerateRequest {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the prompt. Blank prompts are kept as `None`.
	pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
		let prompt = prompt.into();
		self.prompt = if prompt.trim().is_empty() { None } else { Some(prompt) };
		self
	}

	pub fn with_length(mut self, length: usize) -> Self {
		self.length = Some(length);
		self
	}

	pub fn temperature(&self) -> Option<f32> {
		self.temperature
	}

	/// Overrides the configured temperature for this request.
	///
	/// # Errors
	/// Returns an error if the value is negative or not finite.
	pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
		if !temperature.is_finite() || temperature < 0.0 {
			return Err(MarkovError::InvalidConfig(format!(
				"temperature must be a finite value >= 0.0, got {}",
				temperature
			)));
		}
		self.temperature = Some(temperature);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_blank_prompt_is_none() {
		assert_eq!(GenerateRequest::new().with_prompt("  ").prompt, None);
		assert_eq!(GenerateRequest::new().with_prompt("cat").prompt.as_deref(), Some("cat"));
	}

	#[test]
	fn test_set_temperature() {
		let mut request = GenerateRequest::new();
		assert!(request.set_temperature(0.0).is_ok());
		assert_eq!(request.temperature(), Some(0.0));
		assert!(request.set_temperature(-0.5).is_err());
		assert!(request.set_temperature(f32::INFINITY).is_err());
		assert_eq!(request.temperature(), Some(0.0));
	}
}
