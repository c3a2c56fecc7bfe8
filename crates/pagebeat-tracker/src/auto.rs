//! Host-signal adapter around [`PageTracker`].
//!
//! The state machine itself never touches a clock or scheduler; this adapter
//! owns both. Each handler stamps the current time, runs the transition, and
//! forwards the resulting emissions into the track sink. Emission is
//! fire-and-forget: whatever the sink does with an event (accept, suppress,
//! drop) is invisible here.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use pagebeat_context::PageEnvironment;
use pagebeat_types::TrackSink;

use crate::tracker::{ClickTarget, Emission, Followup, PageTracker, TrackerConfig};

pub struct AutoTracker {
    tracker: Mutex<PageTracker>,
    env: Arc<dyn PageEnvironment>,
    sink: Arc<dyn TrackSink>,
}

impl AutoTracker {
    pub fn new(
        config: TrackerConfig,
        env: Arc<dyn PageEnvironment>,
        sink: Arc<dyn TrackSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            tracker: Mutex::new(PageTracker::new(config)),
            env,
            sink,
        })
    }

    /// Document finished loading.
    pub fn handle_load(&self) {
        let emission = self.tracker.lock().on_load();
        self.forward(emission);
    }

    /// First paint/show opportunity after load.
    pub fn handle_show(&self) {
        let state = self.env.snapshot();
        let emission = self
            .tracker
            .lock()
            .on_show(now_ms(), &state.url, state.view_position());
        self.forward(emission);
    }

    /// History push/replace or back/forward navigation observed. Schedules
    /// the one-frame settle re-check on the current runtime.
    pub fn handle_history_change(self: &Arc<Self>) {
        let followup = self.tracker.lock().on_history_change();
        let Some(Followup::SettleUrl { delay_ms }) = followup else {
            return;
        };
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            this.settle_url();
        });
    }

    /// The settle re-check itself; exposed for hosts driving time manually.
    pub fn settle_url(&self) {
        let state = self.env.snapshot();
        let emitted =
            self.tracker
                .lock()
                .on_url_settled(now_ms(), &state.url, state.view_position());
        for emission in emitted {
            self.forward(Some(emission));
        }
    }

    /// Visibility change notification.
    pub fn handle_visibility(&self, visible: bool) {
        let mut tracker = self.tracker.lock();
        if visible {
            tracker.on_visible(now_ms());
        } else {
            tracker.on_hidden(now_ms());
        }
    }

    /// Click notification.
    pub fn handle_click(&self, target: &ClickTarget, page_x: u32, page_y: u32) {
        let emission = self.tracker.lock().on_click(target, page_x, page_y);
        self.forward(emission);
    }

    /// Scroll notification (throttled inside the state machine).
    pub fn handle_scroll(&self) {
        let state = self.env.snapshot();
        let emission = self
            .tracker
            .lock()
            .on_scroll(now_ms(), state.view_position());
        self.forward(emission);
    }

    /// Page teardown notification. Terminal.
    pub fn handle_unload(&self) {
        let state = self.env.snapshot();
        let emission =
            self.tracker
                .lock()
                .on_unload(now_ms(), &state.url, state.view_position());
        self.forward(emission);
    }

    fn forward(&self, emission: Option<Emission>) {
        if let Some(Emission { code, payload }) = emission {
            tracing::debug!(code, "auto-collected event");
            self.sink.track(code, payload);
        }
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
