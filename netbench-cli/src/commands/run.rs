// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `netbench run` command - Run the full condition matrix.

use std::sync::Arc;
use std::time::Duration;

use netbench_benchmark::{BenchmarkRunner, Orchestrator, RunSettings};
use netbench_core::client::{self, InProcessClient, DEFAULT_REQUEST_TIMEOUT};
use netbench_core::fault::InMemoryControlPlane;
use netbench_core::{
    ConditionCatalog, Config, FaultInjectionController, RecordStore, SharedClient,
};

use super::Overrides;
use crate::RunArgs;

pub async fn execute(overrides: &Overrides, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = overrides.load()?;

    if let Some(conditions) = args.conditions {
        config.benchmark.conditions = Some(conditions);
    }
    if let Some(iterations) = args.iterations {
        config.benchmark.iterations = iterations;
    }

    let (controller, clients) = if args.dry_run {
        dry_run_setup(&mut config)
    } else {
        live_setup(&config)?
    };

    let runner = BenchmarkRunner::from_config(&config.benchmark);
    let settings = RunSettings::from_config(&config.benchmark);

    println!(
        "Running {} protocol(s), {} iteration(s) per condition{}",
        clients.len(),
        runner.iteration_count(),
        if args.dry_run { " (dry run)" } else { "" }
    );

    let mut orchestrator = Orchestrator::new(controller, clients, runner, settings)?;
    orchestrator.setup(config.proxies()).await?;
    let path = orchestrator.run().await?;

    println!();
    print!("{}", orchestrator.reporter().summary());
    println!();
    println!("✓ Report written to {}", path.display());
    Ok(())
}

fn live_setup(
    config: &Config,
) -> Result<(FaultInjectionController, Vec<SharedClient>), Box<dyn std::error::Error>> {
    let controller = FaultInjectionController::new(
        super::control_plane(config)?,
        ConditionCatalog::builtin(),
    );

    let mut clients = Vec::with_capacity(config.protocols.len());
    for target in &config.protocols {
        tracing::debug!(protocol = %target.protocol, address = %target.address, "Connecting client");
        clients.push(client::connect(
            target.protocol,
            &target.address,
            DEFAULT_REQUEST_TIMEOUT,
        )?);
    }

    Ok((controller, clients))
}

/// In-memory control plane and in-process clients sharing one seeded store.
fn dry_run_setup(config: &mut Config) -> (FaultInjectionController, Vec<SharedClient>) {
    config.benchmark.iteration_pause = Duration::ZERO;
    config.benchmark.settle = Duration::ZERO;
    config.benchmark.suite_pause = Duration::ZERO;
    config.benchmark.readiness_delay = Duration::ZERO;

    let controller = FaultInjectionController::new(
        Arc::new(InMemoryControlPlane::new()),
        ConditionCatalog::builtin(),
    );

    let store = RecordStore::seeded();
    let clients = config
        .protocols
        .iter()
        .map(|target| {
            Arc::new(InProcessClient::new(target.protocol, store.clone())) as SharedClient
        })
        .collect();

    (controller, clients)
}
