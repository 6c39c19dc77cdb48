//! Time sources
//!
//! Every time-sensitive operation reads `now` once from an injected
//! [`Clock`]. Timestamps are Unix seconds.

use parking_lot::RwLock;

/// Source of the current Unix timestamp
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // Pre-epoch readings clamp to 0
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually driven clock for tests and simulations
#[derive(Debug, Default)]
pub struct ManualClock {
    now: RwLock<u64>,
}

impl ManualClock {
    /// Create a clock reading `start`
    pub fn new(start: u64) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Jump to an absolute timestamp (may move backwards)
    pub fn set(&self, timestamp: u64) {
        *self.now.write() = timestamp;
    }

    /// Move forward by `seconds`, returning the new reading
    pub fn advance(&self, seconds: u64) -> u64 {
        let mut now = self.now.write();
        *now = now.saturating_add(seconds);
        *now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        *self.now.read()
    }
}
