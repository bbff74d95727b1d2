// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Netbench Benchmarking Framework
//!
//! Drives timed operation chains against each protocol client under each
//! network condition and reduces the samples into a ranked report.
//!
//! # Pipeline
//!
//! - **Harness**: readiness probing and the per-iteration operation chain
//! - **Stats**: per-protocol and per-operation aggregation, best-protocol ranking
//! - **Reporter**: ordered ledger, atomic JSON persistence, console summary
//! - **Orchestrator**: condition matrix with fault injection between suites

pub mod harness;
pub mod metrics;
pub mod orchestrator;
pub mod reporter;
pub mod stats;

pub use harness::{BenchmarkRunner, SuiteResult};
pub use metrics::{
    AbortedCondition, BenchmarkReport, ConditionReport, FailureRecord, OperationKind, Sample,
    Stats, SystemInfo,
};
pub use orchestrator::{Orchestrator, RunSettings};
pub use reporter::ReportGenerator;
pub use stats::{calculate_stats, rank_best_protocol};
