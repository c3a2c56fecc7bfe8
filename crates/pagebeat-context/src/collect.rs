//! Ambient property collection.
//!
//! Turns a `PageState` snapshot into the flat context map merged into every
//! envelope body. The os / browser / device classifications are coarse
//! user-agent substring checks; cardinality control matters more here than
//! sniffing accuracy.

use pagebeat_types::Properties;

use crate::page::PageState;

pub struct ContextCollector;

impl ContextCollector {
    /// Collect the full ambient context for one event.
    pub fn collect(state: &PageState) -> Properties {
        Properties::new()
            .with("url", state.url.as_str())
            .with("path", state.path.as_str())
            .with("title", state.title.as_str())
            .with("referrer", state.referrer.as_str())
            .with("user_agent", state.user_agent.as_str())
            .with("language", state.language.as_str())
            .with("os", os_name(&state.user_agent))
            .with("browser", browser_name(&state.user_agent))
            .with("device_type", device_type(&state.user_agent))
            .with("timezone", state.timezone.as_str())
            .with("dpr", state.device_pixel_ratio)
            .with("screen_width", state.screen_width)
            .with("screen_height", state.screen_height)
            .with(
                "screen_resolution",
                format!("{}x{}", state.screen_width, state.screen_height),
            )
            .with("window_width", state.viewport_width)
            .with("window_height", state.viewport_height)
            .with(
                "window_resolution",
                format!("{}x{}", state.viewport_width, state.viewport_height),
            )
    }
}

fn os_name(user_agent: &str) -> &'static str {
    if user_agent.contains("Windows") {
        "Windows"
    } else if user_agent.contains("Macintosh") {
        "Mac"
    } else if user_agent.contains("Android") {
        "Android"
    } else if user_agent.contains("Linux") {
        "Linux"
    } else if user_agent.contains("iPhone") || user_agent.contains("iPad") {
        "iOS"
    } else {
        "Unknown"
    }
}

fn browser_name(user_agent: &str) -> &'static str {
    if user_agent.contains("Firefox") {
        "Firefox"
    } else if user_agent.contains("Edg") {
        "Edge"
    } else if user_agent.contains("Chrome") {
        "Chrome"
    } else if user_agent.contains("Safari") {
        "Safari"
    } else if user_agent.contains("Opera") {
        "Opera"
    } else if user_agent.contains("MSIE") || user_agent.contains("Trident") {
        "IE"
    } else {
        "Unknown"
    }
}

fn device_type(user_agent: &str) -> &'static str {
    if user_agent.contains("Tablet") || user_agent.contains("iPad") {
        "Tablet"
    } else if user_agent.contains("Mobile") {
        "Mobile"
    } else {
        "Desktop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagebeat_types::Scalar;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const FIREFOX_LINUX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

    #[test]
    fn test_collect_has_expected_keys() {
        let state = PageState {
            url: "https://example.com/docs?page=2".to_string(),
            path: "/docs".to_string(),
            title: "Docs".to_string(),
            referrer: "https://example.com/".to_string(),
            user_agent: CHROME_WIN.to_string(),
            screen_width: 1920,
            screen_height: 1080,
            viewport_width: 1280,
            viewport_height: 720,
            ..PageState::default()
        };
        let props = ContextCollector::collect(&state);

        assert_eq!(props.get("url"), Some(&Scalar::from("https://example.com/docs?page=2")));
        assert_eq!(props.get("path"), Some(&Scalar::from("/docs")));
        assert_eq!(props.get("os"), Some(&Scalar::from("Windows")));
        assert_eq!(props.get("browser"), Some(&Scalar::from("Chrome")));
        assert_eq!(props.get("device_type"), Some(&Scalar::from("Desktop")));
        assert_eq!(props.get("screen_resolution"), Some(&Scalar::from("1920x1080")));
        assert_eq!(props.get("window_resolution"), Some(&Scalar::from("1280x720")));
        assert_eq!(props.get("dpr"), Some(&Scalar::Float(1.0)));
    }

    #[test]
    fn test_browser_classification() {
        assert_eq!(browser_name(CHROME_WIN), "Chrome");
        assert_eq!(browser_name(FIREFOX_LINUX), "Firefox");
        assert_eq!(browser_name(SAFARI_IPHONE), "Safari");
        assert_eq!(browser_name("curl/8.0"), "Unknown");
    }

    #[test]
    fn test_os_classification() {
        assert_eq!(os_name(CHROME_WIN), "Windows");
        assert_eq!(os_name(FIREFOX_LINUX), "Linux");
        assert_eq!(os_name(SAFARI_IPHONE), "iOS");
    }

    #[test]
    fn test_device_classification() {
        assert_eq!(device_type(CHROME_WIN), "Desktop");
        assert_eq!(device_type(SAFARI_IPHONE), "Mobile");
        assert_eq!(device_type("Mozilla/5.0 (iPad; CPU OS 17_0)"), "Tablet");
    }
}
