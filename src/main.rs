// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use the_pipewood::config::{Registry, SequenceLoader};
use the_pipewood::observability::{LogSettings, Logger};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 4 {
        let program = args.first().map_or("the-pipewood", String::as_str);
        eprintln!("Usage: {} <sequences-dir> <pipes-dir> <sequence-name>", program);
        eprintln!("Example: {} configs/sequences configs/pipes clean_and_merge", program);
        bail!("expected 3 arguments, got {}", args.len().saturating_sub(1));
    }
    let (sequences_dir, pipes_dir, sequence_name) = (&args[1], &args[2], &args[3]);

    let logger = Logger::init(&LogSettings::default());
    let registry = Arc::new(Registry::with_builtins(Some(logger.clone())));
    let loader = SequenceLoader::new(sequences_dir, pipes_dir, registry);

    println!("🚀 Pipewood");
    println!("═══════════════════════════════════");
    println!("Sequence: {} (from {})", sequence_name, sequences_dir);
    println!("Pipes:    {}", pipes_dir);
    println!();

    let handle = loader
        .load(sequence_name)
        .with_context(|| format!("Failed to load sequence '{}'", sequence_name))?;

    let start = Instant::now();
    let output = handle
        .run(None)
        .with_context(|| format!("Sequence '{}' failed", handle.name()))?;
    let elapsed = start.elapsed();

    match output {
        Some(table) => println!(
            "✅ '{}' finished in {:.2?}: {} rows x {} columns",
            handle.name(),
            elapsed,
            table.height(),
            table.width()
        ),
        None => println!("✅ '{}' finished in {:.2?}: data exported", handle.name(), elapsed),
    }

    logger.shutdown();
    Ok(())
}
