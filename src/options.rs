use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Options snapshot captured when a session starts.
///
/// The serde defaults match the persisted configuration shape, so a partial
/// JSON document (or an empty one) deserializes into a usable set of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingOptions {
    /// Full content to insert.
    pub text: String,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Probability per character of a typo-and-correct sub-step, in percent.
    /// The session loop tolerates the full 0..=100 domain; the configuration
    /// surface caps it at 25 (see [`TypingOptions::sanitized`]).
    pub mistake_rate_percent: u8,
    pub press_enter_at_end: bool,
    pub smart_punctuation: bool,
}

impl Default for TypingOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            min_delay_ms: 20,
            max_delay_ms: 120,
            mistake_rate_percent: 2,
            press_enter_at_end: true,
            smart_punctuation: true,
        }
    }
}

impl TypingOptions {
    /// Effective inclusive delay range for inter-character pacing.
    ///
    /// An inverted configuration (max below min) collapses to `min_delay_ms`
    /// instead of failing.
    pub fn delay_bounds(&self) -> (u64, u64) {
        let lo = self.min_delay_ms;
        (lo, self.max_delay_ms.max(lo))
    }

    /// Mistake probability clamped to the 0..=100 domain.
    pub fn mistake_rate(&self) -> u32 {
        u32::from(self.mistake_rate_percent.min(100))
    }

    /// Apply the limits the configuration surface exposes: the mistake rate
    /// is capped at 25 percent.
    pub fn sanitized(mut self) -> Self {
        self.mistake_rate_percent = self.mistake_rate_percent.min(25);
        self
    }
}

pub fn load(path: &Path) -> Result<TypingOptions> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).context("failed to parse options JSON")
}

pub fn save(path: &Path, options: &TypingOptions) -> Result<()> {
    let json = serde_json::to_string_pretty(options).context("failed to serialize options")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
