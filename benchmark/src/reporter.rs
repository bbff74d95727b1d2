// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report ledger, persistence and console summary.
//!
//! Condition reports are appended in test order and never reordered. The
//! whole ledger is written once, atomically, at the end of a run.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use netbench_core::{NetBenchError, NetBenchResult, Protocol};

use crate::metrics::{format_ms, AbortedCondition, BenchmarkReport, ConditionReport};
use crate::stats;

/// Append-only ledger of condition reports.
pub struct ReportGenerator {
    report: BenchmarkReport,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            report: BenchmarkReport::new(),
        }
    }

    /// Wrap an existing document, e.g. one read back with [`ReportGenerator::load`].
    pub fn from_report(report: BenchmarkReport) -> Self {
        Self { report }
    }

    pub fn record(&mut self, condition: ConditionReport) {
        self.report.conditions.push(condition);
    }

    /// Note a condition whose suite was skipped.
    pub fn record_aborted(&mut self, condition: impl Into<String>, error: impl ToString) {
        self.report.aborted_conditions.push(AbortedCondition {
            condition: condition.into(),
            error: error.to_string(),
        });
    }

    pub fn conditions(&self) -> &[ConditionReport] {
        &self.report.conditions
    }

    pub fn report(&self) -> &BenchmarkReport {
        &self.report
    }

    /// Fastest protocol above the success threshold for one condition.
    pub fn rank_best_protocol(condition: &ConditionReport) -> Option<Protocol> {
        stats::rank_best_protocol(&condition.per_protocol_stats)
    }

    /// Write the full document to `path`.
    ///
    /// The document goes to a temporary file in the target directory which
    /// is flushed, synced and renamed over `path`, so a failure never leaves
    /// a partial document behind.
    pub fn persist(&self, path: impl AsRef<Path>) -> NetBenchResult<()> {
        let path = path.as_ref();
        let fail = |reason: String| NetBenchError::ReportPersist {
            path: path.to_path_buf(),
            reason,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| fail(e.to_string()))?;

        let temp = NamedTempFile::new_in(dir).map_err(|e| fail(e.to_string()))?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, &self.report)
                .map_err(|e| fail(e.to_string()))?;
            writer.flush().map_err(|e| fail(e.to_string()))?;
        }
        temp.as_file().sync_all().map_err(|e| fail(e.to_string()))?;
        temp.persist(path).map_err(|e| fail(e.error.to_string()))?;

        tracing::info!(
            path = %path.display(),
            conditions = self.report.conditions.len(),
            "Report saved"
        );
        Ok(())
    }

    /// Read a persisted document.
    pub fn load(path: impl AsRef<Path>) -> NetBenchResult<BenchmarkReport> {
        let path = path.as_ref();
        let fail = |reason: String| NetBenchError::ReportLoad {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::open(path).map_err(|e| fail(e.to_string()))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| fail(e.to_string()))
    }

    /// Per-condition comparison table followed by the winners list.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let conditions = &self.report.conditions;

        let _ = writeln!(out, "NETWORK PERFORMANCE TEST RESULTS");
        let _ = writeln!(out, "================================");

        if conditions.is_empty() {
            let _ = writeln!(out, "No conditions were measured.");
        } else {
            let protocols: Vec<Protocol> = Protocol::ALL
                .into_iter()
                .filter(|p| conditions.iter().any(|c| c.per_protocol_stats.contains_key(p)))
                .collect();

            let _ = write!(
                out,
                "{:<20} {:>9} {:>10} {:>7}",
                "Condition", "Latency", "Bandwidth", "Loss"
            );
            for protocol in &protocols {
                let _ = write!(out, " {:>18}", protocol.as_str().to_uppercase());
            }
            let _ = writeln!(out);

            for condition in conditions {
                let profile = &condition.profile;
                let _ = write!(
                    out,
                    "{:<20} {:>9} {:>10} {:>7}",
                    profile.label,
                    format!("{}ms", profile.latency_ms),
                    format!("{}Mbps", profile.bandwidth_mbps),
                    format!("{}%", profile.packet_loss_percent)
                );
                for protocol in &protocols {
                    let cell = match condition.per_protocol_stats.get(protocol) {
                        Some(s) if s.success_rate_percent > 0.0 => format!(
                            "{} / {:.0}%",
                            format_ms(s.avg_time),
                            s.success_rate_percent
                        ),
                        _ => "FAIL".to_string(),
                    };
                    let _ = write!(out, " {:>18}", cell);
                }
                let _ = writeln!(out);
            }

            let _ = writeln!(out);
            let _ = writeln!(out, "Best protocol by condition:");
            for condition in conditions {
                if let Some(best) = Self::rank_best_protocol(condition) {
                    let avg = condition
                        .per_protocol_stats
                        .get(&best)
                        .map(|s| s.avg_time)
                        .unwrap_or_default();
                    let _ = writeln!(
                        out,
                        "  {}: {} ({})",
                        condition.profile.label,
                        best.as_str().to_uppercase(),
                        format_ms(avg)
                    );
                }
            }
        }

        if !self.report.aborted_conditions.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Aborted conditions:");
            for aborted in &self.report.aborted_conditions {
                let _ = writeln!(out, "  {}: {}", aborted.condition, aborted.error);
            }
        }

        out
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
