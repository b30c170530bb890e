//! Async logging example
//!
//! Demonstrates delivery through a background worker shared by many threads.
//!
//! Run with: cargo run --example async_logging

use rust_fanout_logger::prelude::*;
use rust_fanout_logger::DEFAULT_SHUTDOWN_TIMEOUT;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Fanout Logger - Async Logging Example ===\n");

    // An owned queue can be shut down; Logger::new_async uses the process-wide one
    let mut queue = DeliveryQueue::start()?;
    let memory = Arc::new(MemoryHandler::new("memory"));

    let logger = Logger::builder()
        .handler(ConsoleHandler::new())
        .shared_handler(memory.clone())
        .queue(&queue)
        .build()?;

    println!("1. Logging through the worker:");
    for i in 0..10 {
        logger.info(format!("Message #{}", i), []);
    }

    println!("\n2. Multi-threaded logging:");
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..3 {
                    logger.warn(
                        format!("Thread {} message {}", thread_id, i),
                        [attr("thread", thread_id)],
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }

    // The worker drains once every logger on the queue is gone
    drop(logger);
    let drained = queue.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

    println!(
        "\nWorker drained: {}, records delivered to memory handler: {}",
        drained,
        memory.len()
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
