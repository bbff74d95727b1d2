// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Reduction of raw samples into comparable, ranked statistics.

use std::collections::BTreeMap;

use netbench_core::Protocol;

use crate::harness::SuiteResult;
use crate::metrics::{ConditionReport, FailureRecord, OperationKind, Sample, Stats};

/// Minimum success rate, exclusive, for a protocol to be ranked.
pub const RANKING_SUCCESS_THRESHOLD: f64 = 50.0;

/// Aggregate a sample set.
///
/// An empty set, or one without any success, yields the all-zero `Stats`
/// (with `total_ops` still counting the failures).
pub fn calculate_stats(samples: &[Sample]) -> Stats {
    let total_ops = samples.len() as u64;
    let successes: Vec<&Sample> = samples.iter().filter(|s| s.success).collect();

    if successes.is_empty() {
        return Stats {
            total_ops,
            ..Stats::default()
        };
    }

    let count = successes.len() as f64;
    let mut min_time = f64::INFINITY;
    let mut max_time = f64::NEG_INFINITY;
    let mut total_time = 0.0;
    let mut total_payload = 0.0;

    for sample in &successes {
        min_time = min_time.min(sample.duration_ms);
        max_time = max_time.max(sample.duration_ms);
        total_time += sample.duration_ms;
        total_payload += sample.payload_bytes as f64;
    }

    Stats {
        avg_time: total_time / count,
        min_time,
        max_time,
        avg_payload_bytes: total_payload / count,
        success_rate_percent: 100.0 * count / total_ops as f64,
        total_ops,
        successful_ops: successes.len() as u64,
    }
}

/// Pick the fastest protocol among those above the success threshold.
///
/// Candidates are visited in protocol order and only a strictly lower
/// average replaces the current best, so ties go to the earlier protocol.
pub fn rank_best_protocol<'a>(
    stats: impl IntoIterator<Item = (&'a Protocol, &'a Stats)>,
) -> Option<Protocol> {
    let mut best: Option<(Protocol, f64)> = None;

    for (protocol, stats) in stats {
        if stats.success_rate_percent <= RANKING_SUCCESS_THRESHOLD {
            continue;
        }
        match best {
            Some((_, avg)) if stats.avg_time >= avg => {}
            _ => best = Some((*protocol, stats.avg_time)),
        }
    }

    best.map(|(protocol, _)| protocol)
}

/// Turn one condition suite into its report.
pub fn aggregate(suite: SuiteResult) -> ConditionReport {
    let mut per_protocol_stats = BTreeMap::new();
    let mut per_operation_stats = BTreeMap::new();
    let mut failures = Vec::new();

    for (protocol, samples) in &suite.samples {
        per_protocol_stats.insert(*protocol, calculate_stats(samples));

        let mut by_operation: BTreeMap<OperationKind, Vec<Sample>> = BTreeMap::new();
        for sample in samples {
            by_operation
                .entry(sample.operation)
                .or_default()
                .push(sample.clone());

            if !sample.success {
                failures.push(FailureRecord {
                    protocol: *protocol,
                    operation: sample.operation,
                    iteration: sample.iteration,
                    message: sample.error.clone().unwrap_or_default(),
                });
            }
        }

        let operation_stats = by_operation
            .into_iter()
            .map(|(operation, samples)| (operation, calculate_stats(&samples)))
            .collect();
        per_operation_stats.insert(*protocol, operation_stats);
    }

    let best_protocol = rank_best_protocol(&per_protocol_stats);

    ConditionReport {
        condition_name: suite.profile.name.clone(),
        profile: suite.profile,
        timestamp: suite.timestamp,
        per_protocol_stats,
        per_operation_stats,
        best_protocol,
        failures,
    }
}
