//! Delivery queue and its background worker
//!
//! A [`DeliveryQueue`] owns one worker thread fed by an unbuffered
//! (rendezvous) channel. Producers block in [`QueueSender::send`] until the
//! worker takes the unit, so a slow handler stalls every producer sharing the
//! queue. Units are processed strictly in the order they were accepted.
//!
//! [`QueueSender::barrier`] waits until every unit accepted before it has
//! been handled.
//!
//! The worker exits once every sender is gone. [`DeliveryQueue::shutdown`]
//! drops the queue's own sender; loggers holding a [`QueueSender`] keep the
//! worker alive until they are dropped too.

use super::{
    dispatch,
    error::{LoggerError, Result},
    handler::SharedHandler,
    log_record::LogRecord,
};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for queue cleanup (5 seconds)
///
/// Used when a queue is dropped without explicit shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const WORKER_THREAD_NAME: &str = "fanout-log-worker";

/// One handler paired with one record, queued for the worker.
#[derive(Clone)]
pub struct DispatchUnit {
    handler: SharedHandler,
    record: Arc<LogRecord>,
}

impl DispatchUnit {
    pub fn new(handler: SharedHandler, record: Arc<LogRecord>) -> Self {
        Self { handler, record }
    }

    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }

    pub fn record(&self) -> &LogRecord {
        &self.record
    }

    /// Enabled check, handler call, failure report.
    pub fn process(&self) {
        dispatch::deliver(self.handler.as_ref(), &self.record);
    }
}

impl fmt::Debug for DispatchUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchUnit")
            .field("handler", &self.handler.name())
            .field("record", &self.record)
            .finish()
    }
}

/// What travels through the channel
enum Job {
    Deliver(DispatchUnit),
    /// Acknowledged once every earlier job has been processed
    Barrier(Sender<()>),
}

/// Observable worker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for the next unit
    Idle = 0,
    /// Running handler logic for one unit
    Processing = 1,
    /// Queue closed and worker returned
    Stopped = 2,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Idle,
            1 => WorkerState::Processing,
            _ => WorkerState::Stopped,
        }
    }
}

/// Producer handle onto a delivery queue
#[derive(Clone)]
pub struct QueueSender {
    tx: Sender<Job>,
}

impl QueueSender {
    /// Hand one unit to the worker, blocking until it is accepted.
    ///
    /// Returns the unit back if the worker has stopped.
    pub fn send(&self, unit: DispatchUnit) -> std::result::Result<(), DispatchUnit> {
        self.tx.send(Job::Deliver(unit.clone())).map_err(|_| unit)
    }

    /// Block until the worker has handled every unit sent before this call.
    ///
    /// Returns `false` if the worker has stopped.
    pub fn barrier(&self) -> bool {
        let (ack_tx, ack_rx) = bounded(1);
        if self.tx.send(Job::Barrier(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }

    /// A sender whose worker is already gone
    #[cfg(test)]
    pub(crate) fn disconnected() -> Self {
        let (tx, _) = bounded(0);
        Self { tx }
    }
}

impl fmt::Debug for QueueSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueSender").finish_non_exhaustive()
    }
}

/// A rendezvous channel drained by a single worker thread
///
/// Dropping a queue runs [`DeliveryQueue::shutdown`] with
/// [`DEFAULT_SHUTDOWN_TIMEOUT`]. If loggers still hold senders on it, the
/// dropping thread blocks for that whole timeout and the worker is then left
/// running detached until those senders are gone. Drop the loggers first, or
/// call `shutdown` with a shorter timeout.
pub struct DeliveryQueue {
    sender: Option<Sender<Job>>,
    worker: Option<thread::JoinHandle<()>>,
    state: Arc<AtomicU8>,
}

impl DeliveryQueue {
    /// Create the channel and spawn its worker.
    ///
    /// # Errors
    ///
    /// Returns error if the worker thread cannot be spawned
    pub fn start() -> Result<Self> {
        let (sender, receiver) = bounded(0);
        let state = Arc::new(AtomicU8::new(WorkerState::Idle as u8));
        let worker_state = Arc::clone(&state);

        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || Self::run(receiver, worker_state))
            .map_err(|e| {
                LoggerError::io_operation("spawn delivery worker", "thread spawn failed", e)
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            state,
        })
    }

    fn run(receiver: Receiver<Job>, state: Arc<AtomicU8>) {
        for job in receiver.iter() {
            match job {
                Job::Deliver(unit) => {
                    state.store(WorkerState::Processing as u8, Ordering::Release);
                    unit.process();
                    state.store(WorkerState::Idle as u8, Ordering::Release);
                }
                Job::Barrier(ack) => {
                    let _ = ack.send(());
                }
            }
        }
        state.store(WorkerState::Stopped as u8, Ordering::Release);
    }

    /// A new producer handle, or `None` after shutdown.
    pub fn sender(&self) -> Option<QueueSender> {
        self.sender.as_ref().map(|tx| QueueSender { tx: tx.clone() })
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Close the queue and wait for the worker to drain.
    ///
    /// The worker only returns once every [`QueueSender`] has been dropped,
    /// so loggers built on this queue must be dropped first.
    ///
    /// # Returns
    ///
    /// `true` if the worker exited within `timeout`, `false` otherwise
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        drop(self.sender.take());

        let Some(handle) = self.worker.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!(
                        "[LOGGER ERROR] Delivery worker panicked during shutdown: {:?}",
                        e
                    );
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Delivery worker did not finish within {:?}. \
                     Loggers still hold senders on this queue.",
                    timeout
                );
                self.worker = Some(handle);
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for DeliveryQueue {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
        }
    }
}

static GLOBAL_QUEUE: Mutex<Option<DeliveryQueue>> = parking_lot::const_mutex(None);

/// Start the process-wide delivery worker if it is not running yet.
///
/// Idempotent: every call returns a sender onto the same queue. The queue
/// lives in a static and is never shut down, so its worker runs for the
/// rest of the process.
///
/// # Errors
///
/// Returns error if the worker thread cannot be spawned
pub fn init_worker() -> Result<QueueSender> {
    let mut global = GLOBAL_QUEUE.lock();
    if let Some(sender) = global.as_ref().and_then(DeliveryQueue::sender) {
        return Ok(sender);
    }

    let queue = DeliveryQueue::start()?;
    let sender = queue.sender().ok_or(LoggerError::QueueClosed)?;
    *global = Some(queue);
    Ok(sender)
}

/// State of the process-wide worker, `None` before [`init_worker`].
pub fn global_worker_state() -> Option<WorkerState> {
    GLOBAL_QUEUE.lock().as_ref().map(DeliveryQueue::state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{handler::Handler, log_level::LogLevel};
    use std::sync::mpsc;

    struct Collect {
        tx: Mutex<mpsc::Sender<(String, String)>>,
        name: String,
        min_level: LogLevel,
    }

    impl Handler for Collect {
        fn enabled(&self, level: LogLevel) -> bool {
            level >= self.min_level
        }

        fn handle(&self, record: &LogRecord) -> Result<()> {
            let _ = self
                .tx
                .lock()
                .send((self.name.clone(), record.message().to_string()));
            Ok(())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    fn collector(
        name: &str,
        min_level: LogLevel,
        tx: &mpsc::Sender<(String, String)>,
    ) -> SharedHandler {
        Arc::new(Collect {
            tx: Mutex::new(tx.clone()),
            name: name.to_string(),
            min_level,
        })
    }

    #[test]
    fn test_units_processed_in_send_order() {
        let mut queue = DeliveryQueue::start().unwrap();
        let sender = queue.sender().unwrap();
        let (tx, rx) = mpsc::channel();
        let a = collector("a", LogLevel::Debug, &tx);
        let b = collector("b", LogLevel::Debug, &tx);

        for i in 0..3 {
            let record = Arc::new(LogRecord::new(LogLevel::Info, format!("m{i}"), Vec::new()));
            sender.send(DispatchUnit::new(Arc::clone(&a), Arc::clone(&record))).unwrap();
            sender.send(DispatchUnit::new(Arc::clone(&b), record)).unwrap();
        }

        let seen: Vec<_> = (0..6)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        let expected: Vec<_> = (0..3)
            .flat_map(|i| [("a".to_string(), format!("m{i}")), ("b".to_string(), format!("m{i}"))])
            .collect();
        assert_eq!(seen, expected);

        drop(sender);
        assert!(queue.shutdown(Duration::from_secs(5)));
        assert_eq!(queue.state(), WorkerState::Stopped);
    }

    #[test]
    fn test_worker_skips_disabled_level() {
        let mut queue = DeliveryQueue::start().unwrap();
        let sender = queue.sender().unwrap();
        let (tx, rx) = mpsc::channel();
        let warn_only = collector("file", LogLevel::Warn, &tx);

        let debug = Arc::new(LogRecord::new(LogLevel::Debug, "quiet", Vec::new()));
        let error = Arc::new(LogRecord::new(LogLevel::Error, "loud", Vec::new()));
        sender.send(DispatchUnit::new(Arc::clone(&warn_only), debug)).unwrap();
        sender.send(DispatchUnit::new(warn_only, error)).unwrap();

        let (_, message) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(message, "loud");

        drop(sender);
        assert!(queue.shutdown(Duration::from_secs(5)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_shutdown_times_out_while_senders_alive() {
        let mut queue = DeliveryQueue::start().unwrap();
        let sender = queue.sender().unwrap();

        assert!(!queue.shutdown(Duration::from_millis(50)));
        assert!(queue.sender().is_none());

        drop(sender);
        assert!(queue.shutdown(Duration::from_secs(5)));
    }

    #[test]
    fn test_send_without_receiver_returns_unit() {
        let (tx, _rx) = mpsc::channel();
        let handler = collector("late", LogLevel::Debug, &tx);

        let dead = QueueSender::disconnected();
        let record = Arc::new(LogRecord::new(LogLevel::Info, "orphan", Vec::new()));
        let unit = dead.send(DispatchUnit::new(handler, record)).unwrap_err();
        assert_eq!(unit.record().message(), "orphan");
    }

    struct Slow {
        delay: Duration,
        handled: std::sync::atomic::AtomicUsize,
    }

    impl Handler for Slow {
        fn enabled(&self, _level: LogLevel) -> bool {
            true
        }

        fn handle(&self, _record: &LogRecord) -> Result<()> {
            thread::sleep(self.delay);
            self.handled.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[test]
    fn test_barrier_waits_for_accepted_units() {
        let mut queue = DeliveryQueue::start().unwrap();
        let sender = queue.sender().unwrap();
        let slow = Arc::new(Slow {
            delay: Duration::from_millis(200),
            handled: std::sync::atomic::AtomicUsize::new(0),
        });

        let record = Arc::new(LogRecord::new(LogLevel::Error, "last words", Vec::new()));
        sender.send(DispatchUnit::new(slow.clone(), record)).unwrap();

        assert!(sender.barrier());
        assert_eq!(slow.handled.load(Ordering::SeqCst), 1);

        drop(sender);
        assert!(queue.shutdown(Duration::from_secs(5)));
    }

    #[test]
    fn test_barrier_without_worker_returns_false() {
        assert!(!QueueSender::disconnected().barrier());
    }

    #[test]
    fn test_init_worker_is_idempotent() {
        let _first = init_worker().unwrap();
        let _second = init_worker().unwrap();
        assert!(matches!(
            global_worker_state(),
            Some(WorkerState::Idle) | Some(WorkerState::Processing)
        ));
    }
}
