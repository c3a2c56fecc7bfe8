//! Wire codes for the built-in auto-collected events.
//!
//! The `$` prefix marks events generated by the library itself, keeping them
//! out of the namespace available to host-page `track` calls.

pub const PAGE_LOAD: &str = "$page_load";
pub const PAGE_VIEW: &str = "$page_view";
pub const PAGE_LEAVE: &str = "$page_leave";
pub const ELEMENT_CLICK: &str = "$element_click";
pub const SCROLL: &str = "$scroll";
