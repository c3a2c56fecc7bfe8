//! The page-view session state machine.
//!
//! Transitions are pure: each takes the caller's timestamp and returns the
//! events to emit, so the whole lifecycle can be unit-tested without timers
//! or a real document. A host adapter (`AutoTracker`) owns the clock and the
//! scheduler.
//!
//! Session timing: `duration_ms` accumulates only across visible intervals.
//! `start_ms` is `Some` exactly while the view is both started and visible;
//! going hidden banks the elapsed segment, becoming visible again restarts
//! the segment clock.

use serde::{Deserialize, Serialize};

use pagebeat_types::codes;
use pagebeat_types::Properties;
use pagebeat_utils::Throttle;

use crate::url_history::UrlHistory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Delay before re-reading the url after a history mutation, letting the
    /// environment finish updating its address state. One frame.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Minimum spacing between scroll events.
    #[serde(default = "default_scroll_throttle_ms")]
    pub scroll_throttle_ms: i64,

    /// Click coordinates are snapped to this grid to cap cardinality. Zero
    /// disables snapping.
    #[serde(default = "default_click_grid_px")]
    pub click_grid_px: u32,
}

fn default_settle_delay_ms() -> u64 {
    16
}

fn default_scroll_throttle_ms() -> i64 {
    1000
}

fn default_click_grid_px() -> u32 {
    10
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            scroll_throttle_ms: default_scroll_throttle_ms(),
            click_grid_px: default_click_grid_px(),
        }
    }
}

/// One event the state machine wants emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub code: &'static str,
    pub payload: Properties,
}

impl Emission {
    fn new(code: &'static str, payload: Properties) -> Self {
        Self { code, payload }
    }
}

/// A deferred action the host adapter must schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// Re-read the current url after `delay_ms` and feed it to
    /// [`PageTracker::on_url_settled`].
    SettleUrl { delay_ms: u64 },
}

/// The element a click landed on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickTarget {
    pub id: String,
    pub class_name: String,
    pub text: String,
}

pub struct PageTracker {
    config: TrackerConfig,
    urls: UrlHistory,
    scroll_throttle: Throttle,
    loaded: bool,
    /// Whether any page view has started.
    viewing: bool,
    /// Whether the document is currently hidden.
    hidden: bool,
    /// Start of the current visible segment; `None` while hidden or before
    /// the first view.
    start_ms: Option<i64>,
    /// Visible time banked for the current view.
    duration_ms: i64,
    /// Terminal: set on unload, every transition no-ops after.
    left: bool,
}

impl PageTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            scroll_throttle: Throttle::new(config.scroll_throttle_ms),
            config,
            urls: UrlHistory::new(),
            loaded: false,
            viewing: false,
            hidden: false,
            start_ms: None,
            duration_ms: 0,
            left: false,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Visible time accumulated for the current view as of `now_ms`.
    pub fn visible_duration(&self, now_ms: i64) -> i64 {
        self.duration_ms + self.start_ms.map_or(0, |start| now_ms - start)
    }

    /// Document finished loading. Fires at most once.
    pub fn on_load(&mut self) -> Option<Emission> {
        if self.left || self.loaded {
            return None;
        }
        self.loaded = true;
        Some(Emission::new(codes::PAGE_LOAD, Properties::new()))
    }

    /// First paint opportunity: the view starts here.
    pub fn on_show(&mut self, now_ms: i64, url: &str, view_position: u32) -> Option<Emission> {
        if self.left {
            return None;
        }
        self.begin_view(now_ms);
        self.urls.push(url);
        Some(Emission::new(
            codes::PAGE_VIEW,
            Properties::new().with("view_position", view_position),
        ))
    }

    /// A history mutation or back/forward navigation was observed. The url
    /// may not have settled yet; the adapter re-reads it after one frame.
    pub fn on_history_change(&self) -> Option<Followup> {
        if self.left {
            return None;
        }
        Some(Followup::SettleUrl {
            delay_ms: self.config.settle_delay_ms,
        })
    }

    /// The delayed url re-read. A genuinely new url (query-insensitive)
    /// closes the previous view and opens the next; a duplicate notification
    /// emits nothing.
    pub fn on_url_settled(
        &mut self,
        now_ms: i64,
        url: &str,
        view_position: u32,
    ) -> Vec<Emission> {
        if self.left || !self.urls.push(url) {
            return Vec::new();
        }

        let leave_duration = self.visible_duration(now_ms);
        let previous = self.urls.second().to_string();
        self.begin_view(now_ms);

        vec![
            Emission::new(
                codes::PAGE_LEAVE,
                Properties::new()
                    .with("url", previous)
                    .with("duration", leave_duration)
                    .with("view_position", view_position),
            ),
            Emission::new(
                codes::PAGE_VIEW,
                Properties::new().with("view_position", view_position),
            ),
        ]
    }

    /// Document became hidden: bank the elapsed visible segment.
    pub fn on_hidden(&mut self, now_ms: i64) {
        if self.left || self.hidden {
            return;
        }
        self.hidden = true;
        if let Some(start) = self.start_ms.take() {
            self.duration_ms += now_ms - start;
        }
    }

    /// Document became visible again: restart the segment clock so hidden
    /// time stays excluded.
    pub fn on_visible(&mut self, now_ms: i64) {
        if self.left || !self.hidden {
            return;
        }
        self.hidden = false;
        if self.viewing {
            self.start_ms = Some(now_ms);
        }
    }

    /// Page teardown. Terminal.
    pub fn on_unload(&mut self, now_ms: i64, url: &str, view_position: u32) -> Option<Emission> {
        if self.left {
            return None;
        }
        if let Some(start) = self.start_ms.take() {
            self.duration_ms += now_ms - start;
        }
        self.left = true;
        Some(Emission::new(
            codes::PAGE_LEAVE,
            Properties::new()
                .with("url", url)
                .with("duration", self.duration_ms)
                .with("view_position", view_position),
        ))
    }

    /// A click anywhere in the document.
    pub fn on_click(&mut self, target: &ClickTarget, page_x: u32, page_y: u32) -> Option<Emission> {
        if self.left {
            return None;
        }
        Some(Emission::new(
            codes::ELEMENT_CLICK,
            Properties::new()
                .with("element_id", target.id.as_str())
                .with("element_class", target.class_name.as_str())
                .with("element_content", target.text.trim())
                .with("page_x", self.snap(page_x))
                .with("page_y", self.snap(page_y)),
        ))
    }

    /// Scroll notification, throttled to one event per configured window.
    pub fn on_scroll(&mut self, now_ms: i64, view_position: u32) -> Option<Emission> {
        if self.left || !self.scroll_throttle.allow(now_ms) {
            return None;
        }
        Some(Emission::new(
            codes::SCROLL,
            Properties::new().with("view_position", view_position),
        ))
    }

    fn begin_view(&mut self, now_ms: i64) {
        self.viewing = true;
        self.duration_ms = 0;
        self.start_ms = if self.hidden { None } else { Some(now_ms) };
    }

    fn snap(&self, coord: u32) -> u32 {
        let grid = self.config.click_grid_px;
        if grid == 0 {
            return coord;
        }
        // Round to the nearest grid line.
        (coord + grid / 2) / grid * grid
    }
}
