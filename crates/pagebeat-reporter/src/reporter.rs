//! The dispatch gateway.
//!
//! `track` builds envelopes and enqueues them; a periodic flush (or a
//! teardown flush) drains the queue into fixed-size batches and hands each
//! to the transport in FIFO order. All failure handling is local and
//! silent: do-not-track suppresses, overflow drops the oldest event,
//! delivery is fire-and-forget.
//!
//! A flush pass is guarded against reentrancy (the timer tick and an
//! unload-triggered flush can interleave) by an atomic flag wrapped in a
//! scope guard, so the flag is released on every exit path including a
//! panicking transport.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use pagebeat_context::{ContextCollector, IdentityProvider, PageEnvironment};
use pagebeat_types::{Envelope, Properties, TrackSink};
use pagebeat_utils::BoundedQueue;

use crate::config::ReporterConfig;
use crate::transport::Transport;

pub struct Reporter {
    config: ReporterConfig,
    queue: Mutex<BoundedQueue<Envelope>>,
    env: Arc<dyn PageEnvironment>,
    identity: Arc<dyn IdentityProvider>,
    transport: Arc<dyn Transport>,
    consuming: AtomicBool,
    destroyed: AtomicBool,
    total_tracked: AtomicU64,
    total_dropped: AtomicU64,
    total_sent: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
    flush_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Reporter {
    pub fn new(
        config: ReporterConfig,
        env: Arc<dyn PageEnvironment>,
        identity: Arc<dyn IdentityProvider>,
        transport: Arc<dyn Transport>,
    ) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);
        Arc::new(Self {
            queue: Mutex::new(BoundedQueue::new(config.queue_capacity)),
            config,
            env,
            identity,
            transport,
            consuming: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            total_tracked: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
            total_sent: AtomicU64::new(0),
            shutdown_tx,
            flush_handle: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Record an event. Silently drops when the visitor opted out of
    /// tracking or the reporter is already destroyed; never blocks, never
    /// errors.
    pub fn track(&self, code: &str, payload: Properties) {
        if self.destroyed.load(Ordering::Relaxed) || self.env.do_not_track() {
            return;
        }

        let state = self.env.snapshot();
        let envelope = Envelope::new(
            code,
            self.identity.anonymous_id(),
            self.identity.session_id(),
            ContextCollector::collect(&state),
            payload,
        );

        let evicted = self.queue.lock().enqueue(envelope);
        self.total_tracked.fetch_add(1, Ordering::Relaxed);
        if evicted.is_some() {
            self.total_dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(code, "queue full, oldest event dropped");
        }
    }

    /// Drain the queue into batches and hand each to the transport.
    ///
    /// No-op when a pass is already in progress or the queue is empty.
    pub fn consume(&self) {
        let Some(_guard) = ConsumeGuard::try_acquire(&self.consuming) else {
            return;
        };

        let batches = {
            let mut queue = self.queue.lock();
            if queue.is_empty() {
                return;
            }
            queue.drain_batches(self.config.batch_size)
        };

        for (index, batch) in batches.iter().enumerate() {
            if self.config.debug {
                tracing::info!(
                    batch = index + 1,
                    events = batch.len(),
                    "processing batch"
                );
            }
            self.transport.send(batch);
            self.total_sent.fetch_add(batch.len() as u64, Ordering::Relaxed);
        }
    }

    /// Spawn the periodic flush loop. Safe to call once; later calls are
    /// ignored. Must be called from within a tokio runtime.
    pub fn start(self: &Arc<Self>) {
        let mut handle = self.flush_handle.lock();
        if handle.is_some() || self.destroyed.load(Ordering::Relaxed) {
            return;
        }

        let this = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let interval = std::time::Duration::from_millis(self.config.flush_interval_ms);
        *handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The immediate first tick would flush an empty queue.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => this.consume(),
                    _ = shutdown_rx.changed() => break,
                }
            }
            tracing::debug!("flush loop stopped");
        }));
    }

    /// Teardown: one final flush, then stop the flush loop. Idempotent.
    ///
    /// Pending queued events are handed to the transport exactly once
    /// before the loop stops; in-flight beacon delivery continues in the
    /// background.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.consume();
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.flush_handle.lock().take() {
            handle.abort();
        }
        tracing::debug!(
            tracked = self.total_tracked.load(Ordering::Relaxed),
            sent = self.total_sent.load(Ordering::Relaxed),
            dropped = self.total_dropped.load(Ordering::Relaxed),
            "reporter destroyed"
        );
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Envelopes accepted by `track` since creation.
    pub fn total_tracked(&self) -> u64 {
        self.total_tracked.load(Ordering::Relaxed)
    }

    /// Envelopes handed to the transport since creation.
    pub fn total_sent(&self) -> u64 {
        self.total_sent.load(Ordering::Relaxed)
    }

    /// Envelopes evicted by the overflow policy since creation.
    pub fn total_dropped(&self) -> u64 {
        self.total_dropped.load(Ordering::Relaxed)
    }
}

impl TrackSink for Reporter {
    fn track(&self, code: &str, payload: Properties) {
        Reporter::track(self, code, payload);
    }
}

/// Scope guard for the consume flag: acquired with a compare-exchange,
/// released on drop so every exit path (including a transport panic)
/// clears it.
struct ConsumeGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ConsumeGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for ConsumeGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
