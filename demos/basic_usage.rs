//! Basic logger usage example
//!
//! Demonstrates synchronous logging to the default file and console handlers.
//!
//! Run with: cargo run --example basic_usage

use rust_fanout_logger::prelude::*;
use rust_fanout_logger::{info, warn};

fn main() -> Result<()> {
    println!("=== Rust Fanout Logger - Basic Usage Example ===\n");

    // File gets Warn and above, console gets everything
    let options = LoggerOptions::new().dir("demo_logs");
    let logger = Logger::new(options.clone())?;

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message", []);
    logger.info("This is an info message", []);
    logger.warn("This is a warning message", []);
    logger.error("This is an error message", []);

    println!("\n2. Attributes:");
    logger.info("user signed in", [attr("user_id", 42), attr("method", "password")]);

    println!("\n3. Macros:");
    let port = 8080;
    info!(logger, "listening on port {}", port; "tls" => false);
    warn!(logger, "slow request"; "path" => "/users", "ms" => 950);

    logger.flush()?;
    println!(
        "\nWarn and Error records were written to {}",
        options.log_path().display()
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
