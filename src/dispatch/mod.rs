//! Admission, throttling, and paced dispatch.
//!
//! The dispatcher owns a bounded FIFO of pending envelopes and a single
//! scheduler task that drains it at a fixed cadence of
//! `window / request_limit`. Producers calling [`Dispatcher::submit`] block
//! while the queue is full (backpressure); the scheduler blocks while it is
//! empty. Envelopes leave in admission order, one per tick, never two in
//! flight at once.
//!
//! Lifecycle: `NotStarted → Running` happens exactly once, on the first
//! submission; `Running → Stopped` on [`Dispatcher::shutdown`]. A dispatcher
//! instance is single-use - there is no restart.

use bytes::Bytes;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::envelope::RequestEnvelope;
use crate::sender::NetworkSender;
use crate::types::{Error, RateLimitConfig, Result};

// =============================================================================
// Statistics
// =============================================================================

/// Counters observable while the dispatcher runs. Send failures are recorded
/// here (and logged) rather than crashing the scheduler.
#[derive(Debug, Default)]
pub struct DispatchStats {
    submitted: AtomicU64,
    dispatched: AtomicU64,
    send_failures: AtomicU64,
    scheduler_starts: AtomicU64,
}

impl DispatchStats {
    /// Envelopes durably queued so far.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Envelopes handed to the sender that reported success.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Envelopes handed to the sender that reported failure. Failed envelopes
    /// are dropped, never re-enqueued (at-most-once at this layer).
    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    /// Number of scheduler tasks ever spawned. Stays at 1 for the lifetime of
    /// a dispatcher no matter how many producers race the first submission.
    pub fn scheduler_starts(&self) -> u64 {
        self.scheduler_starts.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Core orchestrator bound to one rate limit.
///
/// Owns the bounded submission queue and the scheduler that drains it. The
/// queue is the only shared mutable structure; the start flag is an atomic
/// check-and-set so concurrent first submissions spawn exactly one scheduler.
pub struct Dispatcher {
    config: RateLimitConfig,
    interval: Duration,
    tx: mpsc::Sender<RequestEnvelope>,

    /// Consumer half of the queue, claimed by the scheduler on first start.
    rx_slot: Mutex<Option<mpsc::Receiver<RequestEnvelope>>>,
    started: AtomicBool,
    scheduler: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,

    sender: Arc<dyn NetworkSender>,
    stats: Arc<DispatchStats>,
}

impl Dispatcher {
    /// Construct a dispatcher for one rate limit. Fails with a configuration
    /// error for `request_limit == 0`, a zero window, or an interval that
    /// would truncate to zero; no queue or scheduler is created in that case.
    pub fn new(config: RateLimitConfig, sender: Arc<dyn NetworkSender>) -> Result<Self> {
        config.validate()?;
        let interval = config.tick_interval();
        let (tx, rx) = mpsc::channel(config.request_limit as usize);

        Ok(Self {
            config,
            interval,
            tx,
            rx_slot: Mutex::new(Some(rx)),
            started: AtomicBool::new(false),
            scheduler: Mutex::new(None),
            cancel: CancellationToken::new(),
            sender,
            stats: Arc::new(DispatchStats::default()),
        })
    }

    /// Admit one request. Builds the envelope, starts the scheduler if this
    /// is the first submission, then waits for queue capacity.
    ///
    /// Returns once the envelope is durably queued, not once it is sent.
    /// Blocks indefinitely while the queue is full; a shutdown unparks the
    /// caller with [`Error::Closed`] instead of leaving it hanging.
    pub async fn submit(
        &self,
        body: impl Into<Bytes>,
        signature: impl Into<String>,
    ) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::closed("dispatcher is shut down"));
        }

        let envelope = RequestEnvelope::new(body, signature);
        self.ensure_started().await;

        tokio::select! {
            _ = self.cancel.cancelled() => {
                Err(Error::closed("dispatcher shut down while waiting for queue capacity"))
            }
            sent = self.tx.send(envelope) => match sent {
                Ok(()) => {
                    self.stats.submitted.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("envelope admitted (queue capacity {})", self.config.request_limit);
                    Ok(())
                }
                Err(_) => Err(Error::closed("submission queue is closed")),
            }
        }
    }

    /// Graceful shutdown: stop scheduling further ticks, let an in-flight
    /// tick complete, and unpark any producers waiting on a full queue with
    /// [`Error::Closed`]. Idempotent.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let handle = self.scheduler.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                tracing::error!("scheduler task did not exit cleanly: {}", err);
            }
        }

        // If the scheduler never started, the receiver is still parked here;
        // dropping it closes the channel for any stragglers.
        self.rx_slot.lock().await.take();
        tracing::info!("dispatcher shut down");
    }

    /// Spacing between consecutive dispatches.
    pub fn tick_interval(&self) -> Duration {
        self.interval
    }

    /// Counters for this dispatcher. The handle stays valid after shutdown.
    pub fn stats(&self) -> Arc<DispatchStats> {
        self.stats.clone()
    }

    /// Start the scheduler exactly once. Losers of the flag race return
    /// immediately; the queue buffers their envelopes until the winner's
    /// scheduler begins ticking.
    ///
    /// The task is spawned and its handle stored while the `scheduler` lock
    /// is held, so a concurrent `shutdown` either finds the handle and awaits
    /// the task, or claims the receiver first and no task is ever spawned.
    async fn ensure_started(&self) {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let mut scheduler = self.scheduler.lock().await;
        let rx = self.rx_slot.lock().await.take();
        let Some(rx) = rx else {
            // shutdown already claimed the receiver
            return;
        };

        self.stats.scheduler_starts.fetch_add(1, Ordering::Relaxed);
        *scheduler = Some(tokio::spawn(run_scheduler(
            rx,
            self.interval,
            self.sender.clone(),
            self.cancel.clone(),
            self.stats.clone(),
        )));
        drop(scheduler);

        tracing::info!(
            "dispatch scheduler started ({} requests per {:?}, tick every {:?})",
            self.config.request_limit,
            self.config.window,
            self.interval,
        );
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("interval", &self.interval)
            .field("started", &self.started.load(Ordering::Relaxed))
            .field("closed", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Tick loop: one dequeue and one outbound call per tick.
///
/// Ticks land on the fixed grid `0, interval, 2*interval, …` relative to
/// scheduler start. A dispatch that overruns the next grid point delays the
/// next tick to the following grid point (`MissedTickBehavior::Skip`) - ticks
/// are never fired in a burst and never overlap, since there is only this one
/// task. An empty queue parks the tick on `recv`, which is idle backpressure,
/// not an error.
async fn run_scheduler(
    mut rx: mpsc::Receiver<RequestEnvelope>,
    interval: Duration,
    sender: Arc<dyn NetworkSender>,
    cancel: CancellationToken,
    stats: Arc<DispatchStats>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("dispatch scheduler stopped");
                break;
            }
            _ = ticker.tick() => {
                let envelope = tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("dispatch scheduler stopped");
                        break;
                    }
                    received = rx.recv() => match received {
                        Some(envelope) => envelope,
                        // All senders dropped; nothing can ever arrive again.
                        None => break,
                    },
                };

                match sender.send(&envelope).await {
                    Ok(()) => {
                        stats.dispatched.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!("envelope dispatched");
                    }
                    Err(err) => {
                        stats.send_failures.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!("send failed, envelope dropped: {}", err);
                    }
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Sender that records bodies in arrival order.
    #[derive(Debug, Default)]
    struct RecordingSender {
        bodies: std::sync::Mutex<Vec<String>>,
    }

    impl RecordingSender {
        fn bodies(&self) -> Vec<String> {
            self.bodies.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NetworkSender for RecordingSender {
        async fn send(&self, envelope: &RequestEnvelope) -> Result<()> {
            self.bodies
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(envelope.body()).into_owned());
            Ok(())
        }
    }

    fn fast_config() -> RateLimitConfig {
        RateLimitConfig::new(Duration::from_millis(100), 10).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn submit_queues_and_dispatches() {
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = Dispatcher::new(fast_config(), sender.clone()).unwrap();

        dispatcher.submit(&b"one"[..], "sig").await.unwrap();
        dispatcher.submit(&b"two"[..], "sig").await.unwrap();

        while dispatcher.stats().dispatched() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(sender.bodies(), vec!["one", "two"]);
        assert_eq!(dispatcher.stats().submitted(), 2);

        dispatcher.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn submit_after_shutdown_fails_fast() {
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = Dispatcher::new(fast_config(), sender).unwrap();

        dispatcher.submit(&b"one"[..], "sig").await.unwrap();
        dispatcher.shutdown().await;

        let result = dispatcher.submit(&b"two"[..], "sig").await;
        assert!(matches!(result, Err(Error::Closed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_is_idempotent() {
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = Dispatcher::new(fast_config(), sender).unwrap();

        dispatcher.submit(&b"one"[..], "sig").await.unwrap();
        dispatcher.shutdown().await;
        dispatcher.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_without_any_submission() {
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = Dispatcher::new(fast_config(), sender).unwrap();

        // Scheduler never started; shutdown must not hang.
        dispatcher.shutdown().await;
        assert_eq!(dispatcher.stats().scheduler_starts(), 0);
    }

    // A shutdown racing the very first submission must either find and await
    // the scheduler task or prevent it from spawning; once shutdown returns,
    // no scheduler may still be running.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn shutdown_racing_first_submit_leaves_no_scheduler_behind() {
        for _ in 0..50 {
            let sender = Arc::new(RecordingSender::default());
            let dispatcher = Arc::new(
                Dispatcher::new(
                    RateLimitConfig::new(Duration::from_millis(10), 10).unwrap(),
                    sender.clone(),
                )
                .unwrap(),
            );

            let submitter = {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move { dispatcher.submit(&b"raced"[..], "sig").await })
            };
            dispatcher.shutdown().await;

            // The racing submit either got admitted or observed Closed;
            // it must never hang.
            let result = submitter.await.unwrap();
            assert!(matches!(result, Ok(()) | Err(Error::Closed(_))));

            // Counters are final once shutdown returns.
            let dispatched = dispatcher.stats().dispatched();
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(dispatcher.stats().dispatched(), dispatched);
            assert!(dispatcher.stats().scheduler_starts() <= 1);
        }
    }

    #[tokio::test]
    async fn invalid_config_creates_no_queue_or_scheduler() {
        let sender = Arc::new(RecordingSender::default());
        let config = RateLimitConfig {
            window: Duration::from_secs(60),
            request_limit: 0,
        };
        let result = Dispatcher::new(config, sender);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
