//! Settable clock.

use portal_core::{PhysicalTime, PhysicalTimeEffects, TimeError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 2024-01-01T00:00:00Z, the default start of test time.
pub const TEST_EPOCH_MS: u64 = 1_704_067_200_000;

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now_ms: Arc<AtomicU64>,
}

impl FixedClock {
    /// Clock frozen at `ts_ms`.
    pub fn at(ts_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(ts_ms)),
        }
    }

    /// Move forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to `ts_ms`.
    pub fn set(&self, ts_ms: u64) {
        self.now_ms.store(ts_ms, Ordering::SeqCst);
    }

    /// Current time.
    pub fn now(&self) -> PhysicalTime {
        PhysicalTime::from_ms(self.now_ms.load(Ordering::SeqCst))
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(TEST_EPOCH_MS)
    }
}

impl PhysicalTimeEffects for FixedClock {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        Ok(self.now())
    }
}
