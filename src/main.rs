// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;

use the_harness::config::{load_and_validate_config, HarnessBuilder};
use the_harness::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <pipeline.yaml|pipeline.toml>", args[0]);
        eprintln!("Example: {} configs/pipeline.yaml", args[0]);
        std::process::exit(1);
    }
    let path = &args[1];

    let config = load_and_validate_config(path)
        .with_context(|| format!("failed to load pipeline '{}'", path))?;
    init_tracing(&config.harness.log_level);

    let built = HarnessBuilder::from_config(&config)
        .with_context(|| format!("failed to wire pipeline '{}'", path))?;

    // Ctrl-C starts a graceful shutdown; the harness force-cancels stragglers
    let shutdown = built.harness.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    println!("🚀 Running pipeline: {}", path);
    println!("   {} components, {} connections", config.components.len(), config.connections.len());
    println!();

    let report = built.harness.run().await?;

    println!("📊 Report");
    println!("{}", "═".repeat(60));
    println!("{}", serde_json::to_string_pretty(&report)?);

    let mut sinks: Vec<_> = built.sinks.iter().collect();
    sinks.sort_by(|a, b| a.0.cmp(b.0));
    for (name, collected) in sinks {
        println!();
        println!("📥 {} collected {} items", name, collected.len());
        for value in collected.snapshot() {
            println!("   • {}", value);
        }
    }

    if !report.forced.is_empty() {
        println!();
        println!("⚠️  Force-cancelled: {}", report.forced.join(", "));
    }

    Ok(())
}
