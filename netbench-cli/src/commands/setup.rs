// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `netbench setup` command - Register the network proxies.

use netbench_core::{ConditionCatalog, FaultInjectionController};

use super::Overrides;

pub async fn execute(overrides: &Overrides) -> Result<(), Box<dyn std::error::Error>> {
    let config = overrides.load()?;
    let plane = super::control_plane(&config)?;
    let mut controller = FaultInjectionController::new(plane, ConditionCatalog::builtin());

    tracing::info!(url = %config.control_plane.url, "Setting up network proxies");

    for target in &config.protocols {
        controller.register_proxy(target.proxy.clone()).await?;
        println!(
            "✓ {:<8} {} ({} → {})",
            target.protocol, target.proxy.name, target.proxy.listen, target.proxy.upstream
        );
    }

    println!();
    println!("Proxies ready: {}", controller.proxies().len());
    Ok(())
}
