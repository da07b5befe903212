//! Per-key rate limiting for noisy log lines (e.g. redirects of anonymous traffic).

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Window {
    started_at: Instant,
    suppressed: u64,
}

/// Tracks one log window per key.
#[derive(Debug, Default)]
pub struct LogThrottle {
    windows: Mutex<HashMap<String, Window>>,
}

impl LogThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Some(suppressed_count)` when a log for `key` should be emitted,
    /// otherwise `None` and the event is counted as suppressed for the active window.
    pub fn should_emit(&self, key: &str, interval: Duration) -> Option<u64> {
        let now = Instant::now();
        // A poisoned map only loses suppression counts.
        let mut windows = self.windows.lock().unwrap_or_else(|p| p.into_inner());

        let Some(window) = windows.get_mut(key) else {
            windows.insert(
                key.to_string(),
                Window {
                    started_at: now,
                    suppressed: 0,
                },
            );
            return Some(0);
        };

        if now.duration_since(window.started_at) < interval {
            window.suppressed += 1;
            return None;
        }
        let suppressed = std::mem::take(&mut window.suppressed);
        window.started_at = now;
        Some(suppressed)
    }
}

static GLOBAL: OnceLock<LogThrottle> = OnceLock::new();

/// [`LogThrottle::should_emit`] on the process-wide throttle.
pub fn should_emit(key: &str, interval: Duration) -> Option<u64> {
    GLOBAL.get_or_init(LogThrottle::new).should_emit(key, interval)
}
