//! Routing of a built record to handlers
//!
//! Both delivery paths share [`deliver`]: the synchronous path calls it on
//! the logging thread, the delivery worker calls it for each dequeued unit.
//! Failures are reported on stderr and never reach the caller.

use super::{
    error::{LoggerError, Result},
    handler::{Handler, SharedHandler},
    log_record::LogRecord,
};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run the enabled check, then the handler, with panic isolation.
///
/// A disabled level returns `Ok(())` without touching the handler.
pub fn handle(handler: &dyn Handler, record: &LogRecord) -> Result<()> {
    if !handler.enabled(record.level()) {
        return Ok(());
    }

    match catch_unwind(AssertUnwindSafe(|| handler.handle(record))) {
        Ok(result) => result,
        Err(panic_info) => Err(LoggerError::handler_panicked(
            handler.name(),
            panic_message(panic_info.as_ref()),
        )),
    }
}

/// [`handle`] plus a single best-effort report on failure.
pub fn deliver(handler: &dyn Handler, record: &LogRecord) {
    if let Err(e) = handle(handler, record) {
        report_failure(handler.name(), &e);
    }
}

/// Deliver to every handler in list order on the calling thread.
pub fn dispatch_sync(handlers: &[SharedHandler], record: &LogRecord) {
    for handler in handlers {
        deliver(handler.as_ref(), record);
    }
}

pub(crate) fn report_failure(handler: &str, error: &LoggerError) {
    match error {
        LoggerError::HandlerPanicked { message, .. } => eprintln!(
            "[LOGGER CRITICAL] Handler '{}' panicked: {}. \
             Other handlers continue to function.",
            handler, message
        ),
        _ => eprintln!(
            "[LOGGER ERROR] Failed to handle log record in '{}': {}",
            handler, error
        ),
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
