//! Wall-clock time effect interface.

use serde::{Deserialize, Serialize};

/// Error type for time operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// System clock reported a time before the Unix epoch
    #[error("Clock is before the Unix epoch")]
    BeforeEpoch,
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PhysicalTime {
    /// Milliseconds since 1970-01-01T00:00:00Z
    pub ts_ms: u64,
}

impl PhysicalTime {
    /// Construct from milliseconds since the epoch.
    pub const fn from_ms(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// Offset this time forward, saturating at `u64::MAX`.
    pub fn plus_ms(self, ms: u64) -> Self {
        Self {
            ts_ms: self.ts_ms.saturating_add(ms),
        }
    }
}

/// Wall-clock time source.
///
/// Synchronous: every caller needs a timestamp inline (publish stamps, sync
/// status updates) and no implementation blocks.
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current wall-clock time.
    fn physical_time(&self) -> Result<PhysicalTime, TimeError>;

    /// Current time in milliseconds, 0 if the clock is unusable.
    fn now_ms(&self) -> u64 {
        self.physical_time().map(|t| t.ts_ms).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_ms_saturates() {
        let t = PhysicalTime::from_ms(u64::MAX - 1);
        assert_eq!(t.plus_ms(10).ts_ms, u64::MAX);
        assert_eq!(PhysicalTime::from_ms(5).plus_ms(5).ts_ms, 10);
    }
}
