// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `netbench list` command - List the network condition catalog.

use netbench_core::ConditionCatalog;

use super::Overrides;

pub async fn execute(overrides: &Overrides) -> Result<(), Box<dyn std::error::Error>> {
    // Fail on a broken config even though the catalog is built in
    let _config = overrides.load()?;
    let catalog = ConditionCatalog::builtin();

    println!("╔════════════════════╦══════════════════════╦══════════╦══════════╦═══════════╦═════════╗");
    println!("║ Condition          ║ Description          ║ Latency  ║ Jitter   ║ Bandwidth ║ Loss    ║");
    println!("╠════════════════════╬══════════════════════╬══════════╬══════════╬═══════════╬═════════╣");

    for profile in catalog.iter() {
        println!(
            "║ {:<18} ║ {:<20} ║ {:>8} ║ {:>8} ║ {:>9} ║ {:>7} ║",
            profile.name,
            profile.label,
            format!("{}ms", profile.latency_ms),
            format!("{}ms", profile.jitter_ms),
            format!("{}Mbps", profile.bandwidth_mbps),
            format!("{}%", profile.packet_loss_percent)
        );
    }

    println!("╚════════════════════╩══════════════════════╩══════════╩══════════╩═══════════╩═════════╝");
    println!();
    println!("Total: {} condition(s)", catalog.len());

    Ok(())
}
