// ⚖️ Reconciliation Engine - Merge two account lists into one
//
// Basic algorithm (greedy, order-dependent):
//   for every account A in list A (in order):
//       scan the not-yet-consumed accounts B of list B (in order)
//           score >= auto threshold  → merge, consume B, stop scanning
//           score >= ask threshold   → ask the resolver (if any):
//               Merge                → merge, consume B, stop scanning
//               parent verdicts      → link parent, keep scanning
//       no merge → A passes through
//   every unconsumed B passes through, in order
//
// The first B reaching the auto threshold wins, even if a later B would
// score higher. List B is never mutated while it is scanned: consumption is
// tracked with an index-based marker set.

use crate::account::Account;
use crate::config::MatchConfig;
use crate::merge::merge_accounts;
use crate::policy::{MergeDecision, MergePolicy, MergeResolver, Verdict};
use crate::sanitize::sanitized;
use crate::scoring::MatchScorer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

// ============================================================================
// STATS & REPORT
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Output records (merged + passed through)
    pub total: usize,

    /// Merged without asking
    pub auto_merged: usize,

    /// Merged after a resolver said so
    pub manually_merged: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// A-derived records in A's order, then leftover B records in B's order
    pub accounts: Vec<Account>,
    pub stats: MergeStats,

    /// A records with no merge partner
    pub pass_through_a: usize,

    /// B records never consumed
    pub pass_through_b: usize,

    /// Parent links set from resolver verdicts
    pub parent_links: usize,

    pub reconciled_at: DateTime<Utc>,
}

impl ReconciliationReport {
    pub fn summary(&self) -> String {
        format!(
            "Reconciled {} accounts: {} auto-merged, {} manually merged, {} + {} passed through, {} parent links",
            self.stats.total,
            self.stats.auto_merged,
            self.stats.manually_merged,
            self.pass_through_a,
            self.pass_through_b,
            self.parent_links
        )
    }

    /// total == merges + pass-throughs == accounts.len()
    pub fn is_consistent(&self) -> bool {
        self.stats.total == self.accounts.len()
            && self.stats.total
                == self.stats.auto_merged
                    + self.stats.manually_merged
                    + self.pass_through_a
                    + self.pass_through_b
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeKind {
    Auto,
    Manual,
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    scorer: MatchScorer,
    policy: MergePolicy,
}

impl ReconciliationEngine {
    /// Engine with default weights and thresholds
    pub fn new() -> Self {
        Self::with_config(MatchConfig::default())
    }

    pub fn with_config(config: MatchConfig) -> Self {
        let policy = MergePolicy::from_config(&config);
        ReconciliationEngine {
            scorer: MatchScorer::with_config(config),
            policy,
        }
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    /// Reconcile list A (e.g. CRM) against list B (e.g. ad server).
    ///
    /// Without a resolver, ambiguous pairs are treated as no-match.
    pub fn reconcile(
        &self,
        list_a: Vec<Account>,
        list_b: Vec<Account>,
        mut resolver: Option<&mut dyn MergeResolver>,
    ) -> ReconciliationReport {
        let mut list_a = list_a;
        let mut list_b = list_b;
        let mut consumed = vec![false; list_b.len()];

        let mut accounts = Vec::with_capacity(list_a.len() + list_b.len());
        let mut stats = MergeStats::default();
        let mut pass_through_a = 0;
        let mut parent_links = 0;

        // source id → merged record id, for parent re-pointing
        let mut merged_ids: HashMap<Uuid, Uuid> = HashMap::new();

        for a_idx in 0..list_a.len() {
            let mut matched: Option<(usize, MergeKind)> = None;

            for b_idx in 0..list_b.len() {
                if consumed[b_idx] {
                    continue;
                }

                let confidence = self.scorer.score(&list_a[a_idx], &list_b[b_idx]);

                match self.policy.decide(confidence) {
                    MergeDecision::AutoMerge => {
                        debug!(
                            left = list_a[a_idx].display_name(),
                            right = list_b[b_idx].display_name(),
                            confidence,
                            "auto-merge"
                        );
                        matched = Some((b_idx, MergeKind::Auto));
                        break;
                    }
                    MergeDecision::AskResolver => {
                        let Some(resolver) = resolver.as_deref_mut() else {
                            continue;
                        };

                        let verdict = resolver.resolve(&list_a[a_idx], &list_b[b_idx]);
                        debug!(
                            left = list_a[a_idx].display_name(),
                            right = list_b[b_idx].display_name(),
                            confidence,
                            ?verdict,
                            "resolver verdict"
                        );

                        match verdict {
                            Verdict::Merge => {
                                matched = Some((b_idx, MergeKind::Manual));
                                break;
                            }
                            Verdict::LeftIsParentOfRight => {
                                if list_b[b_idx].parent_id.is_none() {
                                    list_b[b_idx].parent_id = Some(list_a[a_idx].id);
                                    parent_links += 1;
                                }
                            }
                            Verdict::RightIsParentOfLeft => {
                                if list_a[a_idx].parent_id.is_none() {
                                    list_a[a_idx].parent_id = Some(list_b[b_idx].id);
                                    parent_links += 1;
                                }
                            }
                            Verdict::NoMatch => {}
                        }
                    }
                    MergeDecision::NoMatch => {}
                }
            }

            match matched {
                Some((b_idx, kind)) => {
                    consumed[b_idx] = true;

                    let merged = merge_accounts(&list_a[a_idx], &list_b[b_idx]);
                    merged_ids.insert(list_a[a_idx].id, merged.id);
                    merged_ids.insert(list_b[b_idx].id, merged.id);

                    match kind {
                        MergeKind::Auto => stats.auto_merged += 1,
                        MergeKind::Manual => stats.manually_merged += 1,
                    }
                    accounts.push(sanitized(merged));
                }
                None => {
                    pass_through_a += 1;
                    accounts.push(sanitized(list_a[a_idx].clone()));
                }
            }
        }

        let mut pass_through_b = 0;
        for (account, used) in list_b.into_iter().zip(consumed) {
            if !used {
                pass_through_b += 1;
                accounts.push(sanitized(account));
            }
        }

        // Parents that were merged away now live under the merged id
        for account in accounts.iter_mut() {
            if let Some(parent) = account.parent_id {
                if let Some(merged) = merged_ids.get(&parent) {
                    account.parent_id = Some(*merged);
                }
            }
        }

        stats.total = accounts.len();

        let report = ReconciliationReport {
            accounts,
            stats,
            pass_through_a,
            pass_through_b,
            parent_links,
            reconciled_at: Utc::now(),
        };

        info!("{}", report.summary());
        report
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconcile with default settings
pub fn reconcile(
    list_a: Vec<Account>,
    list_b: Vec<Account>,
    resolver: Option<&mut dyn MergeResolver>,
) -> ReconciliationReport {
    ReconciliationEngine::new().reconcile(list_a, list_b, resolver)
}

// ============================================================================
// TESTS
// ============================================================================
