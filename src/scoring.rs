// 🔍 Confidence Scorer - How likely two account records describe one business
//
// Score = email signal + phone signal + name signal (name dominates).
// Pure and stateless apart from the configured weights.

use crate::account::{is_blank, Account};
use crate::config::MatchConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper display bound for a confidence score
pub const MAX_CONFIDENCE: u32 = 100;

// ============================================================================
// NAME MATCH STRATEGY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameMatch {
    /// Names equal ignoring case
    Exact,

    /// Smaller token set fully contained in the other
    FullTokenOverlap,

    /// More than the partial ratio of the smaller token set shared
    PartialTokenOverlap,

    /// At least the minimum number of shared tokens
    SharedTokens,

    /// Names missing on either side, or nothing meaningful in common
    NoMatch,
}

// ============================================================================
// SCORE BREAKDOWN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub email: u32,
    pub phone: u32,
    pub name: u32,

    /// Which name rule fired
    pub name_match: NameMatch,

    /// Shared tokens / size of the smaller token set (0 when not tokenized)
    pub matched_tokens: usize,
    pub total_tokens: usize,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        (self.email + self.phone + self.name).min(MAX_CONFIDENCE)
    }

    pub fn reason(&self) -> String {
        format!(
            "email +{} | phone +{} | name +{} ({:?}, {}/{} tokens)",
            self.email,
            self.phone,
            self.name,
            self.name_match,
            self.matched_tokens,
            self.total_tokens
        )
    }
}

// ============================================================================
// MATCH SCORER
// ============================================================================

pub struct MatchScorer {
    config: MatchConfig,

    /// Lowercased stop words for token filtering
    stop_words: HashSet<String>,
}

impl MatchScorer {
    /// Create scorer with default weights
    pub fn new() -> Self {
        Self::with_config(MatchConfig::default())
    }

    pub fn with_config(config: MatchConfig) -> Self {
        let stop_words = config.stop_words.iter().map(|w| w.to_lowercase()).collect();
        MatchScorer { config, stop_words }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Confidence in [0, 100] that `a` and `b` are the same business
    pub fn score(&self, a: &Account, b: &Account) -> u32 {
        self.breakdown(a, b).total()
    }

    /// Score with per-signal contributions
    pub fn breakdown(&self, a: &Account, b: &Account) -> ScoreBreakdown {
        let email = match (present(&a.email), present(&b.email)) {
            (Some(e1), Some(e2)) if e1.to_lowercase() == e2.to_lowercase() => {
                self.config.email_weight
            }
            _ => 0,
        };

        // Phones compare verbatim, no normalization
        let phone = match (present(&a.phone), present(&b.phone)) {
            (Some(p1), Some(p2)) if p1 == p2 => self.config.phone_weight,
            _ => 0,
        };

        let (name_match, matched_tokens, total_tokens) =
            match (present(&a.name), present(&b.name)) {
                (Some(n1), Some(n2)) => self.compare_names(n1, n2),
                _ => (NameMatch::NoMatch, 0, 0),
            };

        let name = match name_match {
            NameMatch::Exact | NameMatch::FullTokenOverlap => self.config.name_exact_weight,
            NameMatch::PartialTokenOverlap => self.config.name_partial_weight,
            NameMatch::SharedTokens => self.config.name_weak_weight,
            NameMatch::NoMatch => 0,
        };

        ScoreBreakdown {
            email,
            phone,
            name,
            name_match,
            matched_tokens,
            total_tokens,
        }
    }

    /// Returns (rule, shared tokens, size of smaller token set)
    fn compare_names(&self, n1: &str, n2: &str) -> (NameMatch, usize, usize) {
        if n1.to_lowercase() == n2.to_lowercase() {
            return (NameMatch::Exact, 0, 0);
        }

        let tokens1 = self.name_tokens(n1);
        let tokens2 = self.name_tokens(n2);

        let matched = tokens1.intersection(&tokens2).count();
        let total = tokens1.len().min(tokens2.len());

        // Names made only of stop words carry no signal
        if total == 0 {
            return (NameMatch::NoMatch, matched, total);
        }

        let rule = if matched == total {
            NameMatch::FullTokenOverlap
        } else if matched as f64 / total as f64 > self.config.partial_ratio {
            NameMatch::PartialTokenOverlap
        } else if matched >= self.config.min_shared_tokens {
            NameMatch::SharedTokens
        } else {
            NameMatch::NoMatch
        };

        (rule, matched, total)
    }

    /// Lowercase, keep alphanumerics and whitespace, split on single spaces,
    /// drop stop words. Duplicates collapse.
    pub fn name_tokens(&self, name: &str) -> HashSet<String> {
        let sanitized: String = name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();

        sanitized
            .split(' ')
            .filter(|token| !self.stop_words.contains(*token))
            .map(|token| token.to_string())
            .collect()
    }
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Blank values carry no signal
fn present(value: &Option<String>) -> Option<&str> {
    if is_blank(value) {
        None
    } else {
        value.as_deref()
    }
}

/// Score a pair with the default weights
pub fn score(a: &Account, b: &Account) -> u32 {
    MatchScorer::new().score(a, b)
}

// ============================================================================
// TESTS
// ============================================================================
