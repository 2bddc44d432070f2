// ⚙️ Match Configuration - Heuristic constants as data
//
// Every weight and threshold the scorer and policy use lives here. Defaults
// reproduce the tuned values; a JSON file can override any subset of them.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Words ignored when comparing tokenized account names
pub const DEFAULT_STOP_WORDS: [&str; 6] = ["inc", "the", "dev", "of", "and", ""];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Added when both emails are present and equal ignoring case (default: 20)
    pub email_weight: u32,

    /// Added when both phones are present and identical (default: 20)
    pub phone_weight: u32,

    /// Added for an exact name or full token containment (default: 50)
    pub name_exact_weight: u32,

    /// Added when more than `partial_ratio` of the smaller token set matches (default: 30)
    pub name_partial_weight: u32,

    /// Added when at least `min_shared_tokens` tokens match (default: 20)
    pub name_weak_weight: u32,

    /// Scores at or above this merge without asking (default: 50)
    pub auto_merge_threshold: u32,

    /// Scores at or above this (and below auto) go to the resolver (default: 20)
    pub ask_threshold: u32,

    /// Token overlap ratio for the partial name weight (default: 0.5, exclusive)
    pub partial_ratio: f64,

    /// Shared tokens needed for the weak name weight (default: 2)
    pub min_shared_tokens: usize,

    /// Tokens dropped before name comparison
    pub stop_words: Vec<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            email_weight: 20,
            phone_weight: 20,
            name_exact_weight: 50,
            name_partial_weight: 30,
            name_weak_weight: 20,
            auto_merge_threshold: 50,
            ask_threshold: 20,
            partial_ratio: 0.5,
            min_shared_tokens: 2,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl MatchConfig {
    /// Load overrides from a JSON file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read match config: {:?}", path.as_ref()))?;

        let config: MatchConfig =
            serde_json::from_str(&content).context("Failed to parse match config JSON")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the policy cannot apply consistently
    pub fn validate(&self) -> Result<()> {
        if self.ask_threshold > self.auto_merge_threshold {
            bail!(
                "ask_threshold ({}) must not exceed auto_merge_threshold ({})",
                self.ask_threshold,
                self.auto_merge_threshold
            );
        }

        if !(self.partial_ratio > 0.0 && self.partial_ratio <= 1.0) {
            bail!("partial_ratio must be in (0, 1], got {}", self.partial_ratio);
        }

        Ok(())
    }

    /// Highest score the current weights can produce
    pub fn max_score(&self) -> u32 {
        self.email_weight + self.phone_weight + self.name_exact_weight
    }
}

// ============================================================================
// TESTS
// ============================================================================
