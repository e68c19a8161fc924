//! Generation parameter configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::ports::GenerationParams;

/// Sampling and length parameters sent with every request
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

impl GenerationConfig {
    /// Convert to the port's parameter type
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
        }
    }

    /// Validate generation parameters
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_output_tokens == 0 {
            return Err(ValidationError::InvalidMaxOutputTokens);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ValidationError::InvalidTopP);
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

fn default_max_output_tokens() -> u32 {
    GenerationParams::default().max_output_tokens
}

fn default_temperature() -> f32 {
    GenerationParams::default().temperature
}

fn default_top_p() -> f32 {
    GenerationParams::default().top_p
}

fn default_top_k() -> u32 {
    GenerationParams::default().top_k
}
