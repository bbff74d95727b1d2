// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `netbench apply` command - Apply one network condition to all proxies.

use super::Overrides;

pub async fn execute(
    overrides: &Overrides,
    condition: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = overrides.load()?;
    let controller = super::controller(&config)?;

    let profile = controller.apply_to_all(condition).await?;

    println!("✓ Applied {} ({})", profile.name, profile.label);
    println!("  Latency:     {}ms ± {}ms", profile.latency_ms, profile.jitter_ms);
    if profile.is_unmetered() {
        println!("  Bandwidth:   unmetered");
    } else {
        println!("  Bandwidth:   {}Mbps", profile.bandwidth_mbps);
    }
    println!("  Packet loss: {}%", profile.packet_loss_percent);
    println!("  Proxies:     {}", controller.proxies().len());
    Ok(())
}
