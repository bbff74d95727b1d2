// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Full-matrix run: every condition, every protocol, one report.
//!
//! Conditions are tested one at a time since the proxies are shared by all
//! protocols. A fault-injection failure skips only the current condition;
//! readiness exhaustion aborts the whole run.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use netbench_core::{
    BenchmarkConfig, FaultInjectionController, HardValidationError, NetBenchError,
    NetBenchResult, ProxyEndpoint, SharedClient,
};

use crate::harness::BenchmarkRunner;
use crate::reporter::ReportGenerator;
use crate::stats;

/// Pacing and output settings for a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub settle: Duration,
    pub suite_pause: Duration,
    pub readiness_attempts: u32,
    pub readiness_delay: Duration,
    /// Explicit condition order; `None` runs the whole catalog.
    pub conditions: Option<Vec<String>>,
    pub report_path: PathBuf,
}

impl RunSettings {
    pub fn from_config(config: &BenchmarkConfig) -> Self {
        Self {
            settle: config.settle,
            suite_pause: config.suite_pause,
            readiness_attempts: config.readiness_attempts,
            readiness_delay: config.readiness_delay,
            conditions: config.conditions.clone(),
            report_path: config.report_path.clone(),
        }
    }
}

/// Owns the controller, the clients and the report ledger for one run.
pub struct Orchestrator {
    controller: FaultInjectionController,
    clients: Vec<SharedClient>,
    runner: BenchmarkRunner,
    reporter: ReportGenerator,
    settings: RunSettings,
}

impl Orchestrator {
    /// Fails when two clients speak the same protocol, since samples are
    /// keyed by protocol.
    pub fn new(
        controller: FaultInjectionController,
        clients: Vec<SharedClient>,
        runner: BenchmarkRunner,
        settings: RunSettings,
    ) -> NetBenchResult<Self> {
        let mut seen = BTreeSet::new();
        for client in &clients {
            let protocol = client.protocol();
            if !seen.insert(protocol) {
                return Err(HardValidationError::DuplicateProtocol { protocol }.into());
            }
        }

        Ok(Self {
            controller,
            clients,
            runner,
            reporter: ReportGenerator::new(),
            settings,
        })
    }

    pub fn controller(&self) -> &FaultInjectionController {
        &self.controller
    }

    pub fn reporter(&self) -> &ReportGenerator {
        &self.reporter
    }

    /// Register every proxy with the control plane.
    pub async fn setup(
        &mut self,
        proxies: impl IntoIterator<Item = ProxyEndpoint>,
    ) -> NetBenchResult<()> {
        for endpoint in proxies {
            self.controller.register_proxy(endpoint).await?;
        }
        Ok(())
    }

    /// Condition names in run order, validated against the catalog.
    pub fn condition_order(&self) -> NetBenchResult<Vec<String>> {
        let catalog = self.controller.catalog();
        match &self.settings.conditions {
            Some(names) => {
                for name in names {
                    catalog.lookup(name)?;
                }
                Ok(names.clone())
            }
            None => Ok(catalog.names().into_iter().map(str::to_string).collect()),
        }
    }

    /// Wait until the first configured client answers the readiness check.
    ///
    /// Only one client gates the run; a protocol that is down later shows up
    /// as a zero success rate rather than aborting every condition.
    pub async fn await_services(&self) -> NetBenchResult<()> {
        let Some(client) = self.clients.first() else {
            return Ok(());
        };
        tracing::info!(protocol = %client.protocol(), "Waiting for services to be ready");
        BenchmarkRunner::await_readiness(
            client.as_ref(),
            self.settings.readiness_attempts,
            self.settings.readiness_delay,
        )
        .await?;
        Ok(())
    }

    /// Run every condition and collect one report per completed suite.
    ///
    /// Proxies are reset at the end even when conditions were aborted.
    pub async fn run_matrix(&mut self) -> NetBenchResult<()> {
        let order = self.condition_order()?;
        self.await_services().await?;

        tracing::info!(conditions = order.len(), "Starting network performance run");

        for (index, name) in order.iter().enumerate() {
            let profile = match self.controller.apply_to_all(name).await {
                Ok(profile) => profile,
                Err(NetBenchError::FaultInjection(e)) => {
                    tracing::error!(condition = %name, error = %e, "Failed to apply condition, skipping");
                    self.reporter.record_aborted(name.as_str(), &e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            pause(self.settings.settle).await;

            let suite = self
                .runner
                .run_condition_suite(&profile, &self.clients)
                .await;
            let report = stats::aggregate(suite);

            for (protocol, s) in &report.per_protocol_stats {
                tracing::info!(
                    condition = %name,
                    %protocol,
                    avg_ms = s.avg_time,
                    success_rate = s.success_rate_percent,
                    avg_payload_bytes = s.avg_payload_bytes,
                    "Condition results"
                );
            }
            self.reporter.record(report);

            if index + 1 < order.len() {
                pause(self.settings.suite_pause).await;
            }
        }

        self.controller.reset_all().await;
        Ok(())
    }

    /// Run the matrix and persist the report. Returns the report path.
    pub async fn run(&mut self) -> NetBenchResult<PathBuf> {
        self.run_matrix().await?;
        self.reporter.persist(&self.settings.report_path)?;
        Ok(self.settings.report_path.clone())
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
