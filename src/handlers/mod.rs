//! Handler implementations

pub mod console;
pub mod memory;
pub mod rotating_file;

pub use console::ConsoleHandler;
pub use memory::MemoryHandler;
pub use rotating_file::{RotatingFileHandler, RotationPolicy};

pub use crate::core::Handler;
