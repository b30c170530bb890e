//! File logging example
//!
//! Demonstrates the rotating JSON-lines file handler on its own.
//!
//! Run with: cargo run --example file_logging

use rust_fanout_logger::prelude::*;
use std::fs;

fn main() -> Result<()> {
    println!("=== Rust Fanout Logger - File Logging Example ===\n");

    let path = "demo_logs/rotating.log";
    let file = RotatingFileHandler::with_policy(
        path,
        RotationPolicy::new()
            .with_max_size(1)
            .with_max_backups(3)
            .with_compression(true),
    )?
    .with_min_level(LogLevel::Info);

    let logger = Logger::builder().handler(file).build()?;

    println!("1. Writing enough records to rotate a 1 MB file:");
    let payload = "x".repeat(1024);
    for i in 0..2_000 {
        logger.info("bulk record", [attr("seq", i), attr("payload", payload.as_str())]);
    }
    logger.flush()?;

    println!("\n2. Files on disk:");
    for entry in fs::read_dir("demo_logs")? {
        let entry = entry?;
        println!("   {} ({} bytes)", entry.file_name().to_string_lossy(), entry.metadata()?.len());
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
