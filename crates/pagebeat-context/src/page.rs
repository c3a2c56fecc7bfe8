//! The page environment boundary.
//!
//! Everything the pipeline knows about the surrounding document arrives
//! through the `PageEnvironment` capability: a point-in-time `PageState`
//! snapshot plus the do-not-track signal. Hosts embedding the library supply
//! an implementation backed by their runtime; tests and the demo binary use
//! `SimulatedPage`.

use parking_lot::Mutex;

/// A point-in-time snapshot of the observable document state.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub url: String,
    pub path: String,
    pub title: String,
    pub referrer: String,
    pub language: String,
    pub user_agent: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub device_pixel_ratio: f64,
    pub timezone: String,
    /// Vertical scroll offset in CSS pixels.
    pub scroll_y: u32,
    /// Whether the document is currently visible.
    pub visible: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            url: String::new(),
            path: String::new(),
            title: String::new(),
            referrer: String::new(),
            language: "en-US".to_string(),
            user_agent: String::new(),
            screen_width: 0,
            screen_height: 0,
            viewport_width: 0,
            viewport_height: 0,
            device_pixel_ratio: 1.0,
            timezone: String::new(),
            scroll_y: 0,
            visible: true,
        }
    }
}

impl PageState {
    /// The bottom edge of the viewport in document coordinates: the
    /// scroll-adjusted view position reported with view/leave/scroll events.
    pub fn view_position(&self) -> u32 {
        self.scroll_y + self.viewport_height
    }
}

/// Capability trait for reading document state.
pub trait PageEnvironment: Send + Sync {
    /// A fresh snapshot of the current document state.
    fn snapshot(&self) -> PageState;

    /// Whether the visitor has signaled a do-not-track preference.
    fn do_not_track(&self) -> bool;
}

/// An in-memory page environment with mutable state.
///
/// Drives tests and the demo binary through load / navigate / scroll /
/// visibility cycles without a real document.
pub struct SimulatedPage {
    state: Mutex<PageState>,
    do_not_track: Mutex<bool>,
}

impl SimulatedPage {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let path = url_path(&url);
        Self {
            state: Mutex::new(PageState {
                url,
                path,
                title: "Simulated Page".to_string(),
                user_agent: "pagebeat-simulated/1.0".to_string(),
                screen_width: 1920,
                screen_height: 1080,
                viewport_width: 1280,
                viewport_height: 800,
                timezone: "UTC".to_string(),
                ..PageState::default()
            }),
            do_not_track: Mutex::new(false),
        }
    }

    /// Replace the current url, keeping the previous one as referrer.
    pub fn navigate(&self, url: impl Into<String>) {
        let mut state = self.state.lock();
        let url = url.into();
        state.referrer = std::mem::replace(&mut state.url, url);
        state.path = url_path(&state.url);
        state.scroll_y = 0;
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.state.lock().title = title.into();
    }

    pub fn scroll_to(&self, y: u32) {
        self.state.lock().scroll_y = y;
    }

    pub fn set_visible(&self, visible: bool) {
        self.state.lock().visible = visible;
    }

    pub fn set_do_not_track(&self, value: bool) {
        *self.do_not_track.lock() = value;
    }

    pub fn set_user_agent(&self, user_agent: impl Into<String>) {
        self.state.lock().user_agent = user_agent.into();
    }
}

impl PageEnvironment for SimulatedPage {
    fn snapshot(&self) -> PageState {
        self.state.lock().clone()
    }

    fn do_not_track(&self) -> bool {
        *self.do_not_track.lock()
    }
}

fn url_path(url: &str) -> String {
    // Strip scheme+authority, then query and fragment.
    let after_scheme = url.find("://").map(|i| &url[i + 3..]).unwrap_or(url);
    let path_start = after_scheme.find('/').unwrap_or(after_scheme.len());
    let path = &after_scheme[path_start..];
    let end = path.find(['?', '#']).unwrap_or(path.len());
    if path[..end].is_empty() {
        "/".to_string()
    } else {
        path[..end].to_string()
    }
}
