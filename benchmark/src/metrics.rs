// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Metrics types for benchmark results.
//!
//! Raw `Sample`s are reduced to `Stats` per protocol (and per operation),
//! which are collected into one `ConditionReport` per network condition.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;
use uuid::Uuid;

use netbench_core::{NetworkProfile, Protocol};

/// Operations of the fixed per-iteration chain, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateEntity,
    ListItems,
    CreateComposite,
}

impl OperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationKind::CreateEntity => "create_entity",
            OperationKind::ListItems => "list_items",
            OperationKind::CreateComposite => "create_composite",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timed outcome of a single operation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub operation: OperationKind,
    pub protocol: Protocol,
    /// Zero-based iteration index within the operation set.
    pub iteration: u32,
    pub duration_ms: f64,
    pub success: bool,
    pub payload_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Sample {
    pub fn success(
        operation: OperationKind,
        protocol: Protocol,
        iteration: u32,
        elapsed: Duration,
        payload_bytes: u64,
    ) -> Self {
        Self {
            operation,
            protocol,
            iteration,
            duration_ms: elapsed.as_secs_f64() * 1000.0,
            success: true,
            payload_bytes,
            error: None,
        }
    }

    /// A failed attempt, recorded with the fixed penalty duration.
    pub fn failure(
        operation: OperationKind,
        protocol: Protocol,
        iteration: u32,
        penalty: Duration,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            operation,
            protocol,
            iteration,
            duration_ms: penalty.as_secs_f64() * 1000.0,
            success: false,
            payload_bytes: 0,
            error: Some(error.to_string()),
        }
    }
}

/// Aggregated statistics over a set of samples.
///
/// Time and payload figures cover successful samples only; the success
/// rate is taken over all samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub avg_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub avg_payload_bytes: f64,
    pub success_rate_percent: f64,
    pub total_ops: u64,
    pub successful_ops: u64,
}

/// A failed sample with enough context to explain it from the report alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub protocol: Protocol,
    pub operation: OperationKind,
    pub iteration: u32,
    pub message: String,
}

/// Results for one network condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionReport {
    pub condition_name: String,
    pub profile: NetworkProfile,
    pub timestamp: DateTime<Utc>,
    pub per_protocol_stats: BTreeMap<Protocol, Stats>,
    #[serde(default)]
    pub per_operation_stats: BTreeMap<Protocol, BTreeMap<OperationKind, Stats>>,
    #[serde(default)]
    pub best_protocol: Option<Protocol>,
    #[serde(default)]
    pub failures: Vec<FailureRecord>,
}

/// A condition whose suite never ran because fault injection failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbortedCondition {
    pub condition: String,
    pub error: String,
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub kernel_version: Option<String>,
    pub cpu_model: String,
    pub cpu_cores: usize,
    pub memory_bytes: u64,
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        let unknown = || "Unknown".to_string();
        Self {
            os: System::name().unwrap_or_else(unknown),
            os_version: System::os_version().unwrap_or_else(unknown),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(unknown),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(unknown),
        }
    }
}

/// The persisted report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub benchmark_suite: String,
    pub version: String,
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    /// Condition reports in test order.
    pub conditions: Vec<ConditionReport>,
    #[serde(default)]
    pub aborted_conditions: Vec<AbortedCondition>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self {
            benchmark_suite: "netbench-network-performance".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            conditions: Vec::new(),
            aborted_conditions: Vec::new(),
        }
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Format milliseconds for console output.
pub fn format_ms(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.0}μs", ms * 1000.0)
    } else if ms < 1000.0 {
        format!("{:.0}ms", ms)
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}
