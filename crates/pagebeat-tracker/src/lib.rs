pub mod auto;
pub mod tracker;
pub mod url_history;

pub use auto::AutoTracker;
pub use tracker::{ClickTarget, Emission, Followup, PageTracker, TrackerConfig};
pub use url_history::UrlHistory;
