// ⚖️ Merge Decision Policy - Confidence → action, and resolver verdicts
//
// High confidence merges automatically, mid-range confidence asks a
// resolver (usually a human), anything lower is left alone.

use crate::account::Account;
use crate::config::MatchConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// DECISIONS & VERDICTS
// ============================================================================

/// What the policy wants done with a scored pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeDecision {
    /// Merge without asking
    AutoMerge,

    /// Ambiguous: ask the resolver if one is available
    AskResolver,

    /// Not the same business
    NoMatch,
}

/// Resolver answer for an ambiguous pair (left = list A, right = list B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    NoMatch,
    Merge,
    LeftIsParentOfRight,
    RightIsParentOfLeft,
}

impl Verdict {
    /// Parse the console shorthand: "y", "p1", "p2"; anything else is NoMatch.
    /// Only the line terminator is stripped.
    pub fn from_input(input: &str) -> Self {
        match input.trim_end_matches(&['\r', '\n'][..]) {
            "y" => Verdict::Merge,
            "p1" => Verdict::LeftIsParentOfRight,
            "p2" => Verdict::RightIsParentOfLeft,
            _ => Verdict::NoMatch,
        }
    }
}

// ============================================================================
// RESOLVER PORT
// ============================================================================

/// Collaborator consulted for ambiguous pairs
pub trait MergeResolver {
    fn resolve(&mut self, left: &Account, right: &Account) -> Verdict;
}

impl<F> MergeResolver for F
where
    F: FnMut(&Account, &Account) -> Verdict,
{
    fn resolve(&mut self, left: &Account, right: &Account) -> Verdict {
        self(left, right)
    }
}

/// Table-driven resolver keyed by (left name, right name)
///
/// Unlisted pairs get `default`. Every question asked is recorded so tests
/// can check which pairs reached the resolver.
#[derive(Debug, Clone)]
pub struct ScriptedResolver {
    answers: HashMap<(String, String), Verdict>,
    default: Verdict,
    asked: Vec<(String, String)>,
}

impl ScriptedResolver {
    pub fn new(default: Verdict) -> Self {
        ScriptedResolver {
            answers: HashMap::new(),
            default,
            asked: Vec::new(),
        }
    }

    /// Builder pattern: script the answer for one pair
    pub fn answer(mut self, left: &str, right: &str, verdict: Verdict) -> Self {
        self.answers
            .insert((left.to_string(), right.to_string()), verdict);
        self
    }

    /// Pairs asked so far, in order
    pub fn asked(&self) -> &[(String, String)] {
        &self.asked
    }
}

impl MergeResolver for ScriptedResolver {
    fn resolve(&mut self, left: &Account, right: &Account) -> Verdict {
        let key = (
            left.display_name().to_string(),
            right.display_name().to_string(),
        );
        let verdict = self.answers.get(&key).copied().unwrap_or(self.default);
        self.asked.push(key);
        verdict
    }
}

// ============================================================================
// MERGE POLICY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    /// Default: 50
    pub auto_merge_threshold: u32,

    /// Default: 20
    pub ask_threshold: u32,
}

impl MergePolicy {
    pub fn new() -> Self {
        Self::from_config(&MatchConfig::default())
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        MergePolicy {
            auto_merge_threshold: config.auto_merge_threshold,
            ask_threshold: config.ask_threshold,
        }
    }

    /// Thresholds are checked high to low, first match wins
    pub fn decide(&self, confidence: u32) -> MergeDecision {
        if confidence >= self.auto_merge_threshold {
            MergeDecision::AutoMerge
        } else if confidence >= self.ask_threshold {
            MergeDecision::AskResolver
        } else {
            MergeDecision::NoMatch
        }
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        let policy = MergePolicy::new();

        assert_eq!(policy.decide(100), MergeDecision::AutoMerge);
        assert_eq!(policy.decide(50), MergeDecision::AutoMerge);
        assert_eq!(policy.decide(49), MergeDecision::AskResolver);
        assert_eq!(policy.decide(20), MergeDecision::AskResolver);
        assert_eq!(policy.decide(19), MergeDecision::NoMatch);
        assert_eq!(policy.decide(0), MergeDecision::NoMatch);
    }

    #[test]
    fn test_policy_from_config() {
        let config = MatchConfig {
            auto_merge_threshold: 70,
            ask_threshold: 40,
            ..MatchConfig::default()
        };
        let policy = MergePolicy::from_config(&config);

        assert_eq!(policy.decide(60), MergeDecision::AskResolver);
        assert_eq!(policy.decide(30), MergeDecision::NoMatch);
    }

    #[test]
    fn test_verdict_from_input() {
        assert_eq!(Verdict::from_input("y"), Verdict::Merge);
        assert_eq!(Verdict::from_input("y\n"), Verdict::Merge);
        assert_eq!(Verdict::from_input("p1"), Verdict::LeftIsParentOfRight);
        assert_eq!(Verdict::from_input("p2"), Verdict::RightIsParentOfLeft);
        assert_eq!(Verdict::from_input("Y"), Verdict::NoMatch);
        assert_eq!(Verdict::from_input(""), Verdict::NoMatch);
        assert_eq!(Verdict::from_input("n"), Verdict::NoMatch);
        assert_eq!(Verdict::from_input("p2\r\n"), Verdict::RightIsParentOfLeft);
        assert_eq!(Verdict::from_input(" y "), Verdict::NoMatch);
        assert_eq!(Verdict::from_input("p1 \n"), Verdict::NoMatch);
    }

    #[test]
    fn test_closure_is_a_resolver() {
        let mut calls = 0;
        let mut resolver = |_: &Account, _: &Account| {
            calls += 1;
            Verdict::Merge
        };

        let a = Account::new();
        let b = Account::new();
        assert_eq!(resolver.resolve(&a, &b), Verdict::Merge);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_scripted_resolver() {
        let mut resolver = ScriptedResolver::new(Verdict::NoMatch)
            .answer("Acme", "Acme West", Verdict::LeftIsParentOfRight);

        let acme = Account::new().with_name("Acme");
        let west = Account::new().with_name("Acme West");
        let other = Account::new().with_name("Globex");

        assert_eq!(resolver.resolve(&acme, &west), Verdict::LeftIsParentOfRight);
        assert_eq!(resolver.resolve(&acme, &other), Verdict::NoMatch);
        assert_eq!(resolver.asked().len(), 2);
        assert_eq!(resolver.asked()[1].1, "Globex");
    }
}
