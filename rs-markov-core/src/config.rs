use std::time::Duration;

use serde::Deserialize;

use crate::error::{MarkovError, Result};

/// Sentinel returned when the active snapshot has learned nothing yet.
pub const DEFAULT_NO_DATA_MESSAGE: &str = "i don't have any messages to learn from yet :(";

/// Generation and reload settings.
///
/// Every field has a default, so a partial TOML/JSON table is enough:
/// ```toml
/// order = 2
/// temperature = 0.8
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
	/// Number of trailing tokens used as chain state.
	pub order: usize,

	/// Minimum time between two non-forced reloads.
	pub reload_interval_secs: u64,

	/// Lower bound of the random per-request length.
	pub min_length: usize,

	/// Upper bound of the random per-request length.
	pub max_length: usize,

	/// Hard cap on a caller-supplied length.
	pub length_cap: usize,

	/// Sampling sharpness (see `Successors::sample`).
	pub temperature: f32,

	/// Anti-repeat retry budget.
	pub retries: usize,

	/// Returned instead of a sentence when no data has been learned.
	pub no_data_message: String,
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self {
			order: 2,
			reload_interval_secs: 60 * 60,
			min_length: 10,
			max_length: 16,
			length_cap: 200,
			temperature: 1.0,
			retries: 12,
			no_data_message: DEFAULT_NO_DATA_MESSAGE.to_owned(),
		}
	}
}

impl GeneratorConfig {
	/// Checks the configuration for values the generator cannot work with.
	///
	/// # Errors
	/// - `InvalidOrder` if `order` is 0.
	/// - `InvalidConfig` for an inverted length range or a bad temperature.
	pub fn validate(&self) -> Result<()> {
		if self.order == 0 {
			return Err(MarkovError::InvalidOrder);
		}
		if self.min_length > self.max_length {
			return Err(MarkovError::InvalidConfig(format!(
				"min_length ({}) is greater than max_length ({})",
				self.min_length, self.max_length
			)));
		}
		if self.max_length > self.length_cap {
			return Err(MarkovError::InvalidConfig(format!(
				"max_length ({}) is greater than length_cap ({})",
				self.max_length, self.length_cap
			)));
		}
		if !self.temperature.is_finite() || self.temperature < 0.0 {
			return Err(MarkovError::InvalidConfig(format!(
				"temperature must be a finite value >= 0.0, got {}",
				self.temperature
			)));
		}
		Ok(())
	}

	pub fn reload_interval(&self) -> Duration {
		Duration::from_secs(self.reload_interval_secs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_is_valid() {
		let config = GeneratorConfig::default();
		assert!(config.validate().is_ok());
		assert_eq!(config.order, 2);
		assert_eq!(config.retries, 12);
		assert_eq!(config.reload_interval(), Duration::from_secs(3600));
	}

	#[test]
	fn test_partial_table_uses_defaults() {
		let config: GeneratorConfig = serde_json::from_str(r#"{"order": 3, "temperature": 0.5}"#).unwrap();
		assert_eq!(config.order, 3);
		assert_eq!(config.temperature, 0.5);
		assert_eq!(config.max_length, 16);
		assert_eq!(config.no_data_message, DEFAULT_NO_DATA_MESSAGE);
	}

	#[test]
	fn test_validate_rejects_bad_values() {
		let config = GeneratorConfig { order: 0, ..Default::default() };
		assert!(matches!(config.validate(), Err(MarkovError::InvalidOrder)));

		let config = GeneratorConfig { min_length: 20, max_length: 10, ..Default::default() };
		assert!(matches!(config.validate(), Err(MarkovError::InvalidConfig(_))));

		let config = GeneratorConfig { temperature: f32::NAN, ..Default::default() };
		assert!(config.validate().is_err());

		let config = GeneratorConfig { temperature: -1.0, ..Default::default() };
		assert!(config.validate().is_err());
	}
}
