//! Weighted score fusion with per-candidate merge
//!
//! Batches are folded in the order given. A candidate's fused score is the
//! sum of `weight × score` over every signal naming it. Reasons from
//! `Accumulate` batches are always appended; a `Corroborate` reason is kept
//! only when that batch is the first to introduce the candidate.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use super::{AggregateRecommendation, MergePolicy, Signal};

/// All signals from one strategy, with that strategy's fusion settings
#[derive(Debug, Clone)]
pub struct SignalBatch {
    pub source: &'static str,
    pub policy: MergePolicy,
    pub weight: f64,
    pub signals: Vec<Signal>,
}

/// Fold batches into at most `limit` aggregates, best first
///
/// Equal fused scores are ordered by candidate id ascending.
pub fn fuse(batches: Vec<SignalBatch>, limit: usize) -> Vec<AggregateRecommendation> {
    let mut merged: HashMap<String, AggregateRecommendation> = HashMap::new();

    for batch in batches {
        debug!(
            "Folding {} signals from {} (weight {})",
            batch.signals.len(),
            batch.source,
            batch.weight
        );
        for signal in batch.signals {
            let weighted = signal.score * batch.weight;
            match merged.entry(signal.candidate.id.clone()) {
                Entry::Occupied(mut entry) => {
                    let aggregate = entry.get_mut();
                    aggregate.score += weighted;
                    if batch.policy == MergePolicy::Accumulate {
                        aggregate.reasons.push(signal.reason);
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(AggregateRecommendation {
                        candidate: signal.candidate,
                        score: weighted,
                        reasons: vec![signal.reason],
                    });
                }
            }
        }
    }

    let mut ranked: Vec<AggregateRecommendation> = merged.into_values().collect();
    ranked.sort_by(compare_ranked);
    ranked.truncate(limit);
    ranked
}

fn compare_ranked(a: &AggregateRecommendation, b: &AggregateRecommendation) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}
