//! The one-directional seam between event producers and the dispatch
//! pipeline. Producers push and never hear back; acceptance, suppression,
//! and overflow are all the sink's business.

use crate::scalar::Properties;

pub trait TrackSink: Send + Sync {
    /// Record an event. Must never block and never fail from the caller's
    /// perspective.
    fn track(&self, code: &str, payload: Properties);
}
