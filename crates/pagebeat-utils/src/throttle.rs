//! A minimal epoch-millis rate gate: at most one pass per window.

#[derive(Debug, Clone)]
pub struct Throttle {
    window_ms: i64,
    last_pass_ms: Option<i64>,
}

impl Throttle {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            last_pass_ms: None,
        }
    }

    /// Returns true when at least `window_ms` has elapsed since the last
    /// accepted call (the first call always passes), and records `now_ms` as
    /// the new reference point.
    pub fn allow(&mut self, now_ms: i64) -> bool {
        match self.last_pass_ms {
            Some(last) if now_ms - last < self.window_ms => false,
            _ => {
                self.last_pass_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_pass_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_passes() {
        let mut t = Throttle::new(1000);
        assert!(t.allow(0));
    }

    #[test]
    fn test_blocks_within_window() {
        let mut t = Throttle::new(1000);
        assert!(t.allow(0));
        assert!(!t.allow(500));
        assert!(!t.allow(999));
        assert!(t.allow(1000));
        assert!(!t.allow(1500));
    }

    #[test]
    fn test_reset() {
        let mut t = Throttle::new(1000);
        assert!(t.allow(0));
        t.reset();
        assert!(t.allow(1));
    }
}
