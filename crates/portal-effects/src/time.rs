//! System clock handler.

use portal_core::{PhysicalTime, PhysicalTimeEffects, TimeError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeHandler;

impl SystemTimeHandler {
    /// Create a new system time handler
    pub fn new() -> Self {
        Self
    }
}

impl PhysicalTimeEffects for SystemTimeHandler {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TimeError::BeforeEpoch)?;
        Ok(PhysicalTime::from_ms(
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_is_after_2020() {
        let now = SystemTimeHandler::new().physical_time().unwrap();
        assert!(now.ts_ms > 1_577_836_800_000);
    }
}
