//! # Sync Status
//!
//! The last-known durability outcome of a mutation. One value, overwritten on
//! every report and never historized.
//!
//! Observers pick a delivery style:
//! - [`SyncStatusBroadcaster::subscribe`]: poll a versioned snapshot
//! - [`SyncStatusBroadcaster::listen`]: receive every report over a
//!   broadcast channel
//!
//! Either way, every observer converges on the same final value.

use once_cell::sync::Lazy;
use portal_core::{Dynamic, PhysicalTime, PhysicalTimeEffects, Subscription};
use portal_effects::SystemTimeHandler;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Storage key mirroring the status for other processes.
pub const SYNC_STATUS_KEY: &str = "portal.sync.status";

/// Default broadcast buffer; lagging listeners skip to newer reports.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// How far the last mutation got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncLevel {
    /// Nothing reported yet
    #[default]
    Idle,
    /// Persisted remotely
    Synced,
    /// Persisted only in the local store
    LocalOnly,
    /// Not persisted anywhere
    Error,
}

impl SyncLevel {
    /// Stable name shown by status indicators.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Synced => "synced",
            Self::LocalOnly => "local-only",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SyncLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Level
    pub level: SyncLevel,
    /// Optional detail; consumers must not assume one is present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the status was last reported; `None` while idle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<PhysicalTime>,
}

impl SyncStatus {
    /// True if `other` carries the same level and message, ignoring when
    /// each was reported.
    pub fn same_as(&self, other: &SyncStatus) -> bool {
        self.level == other.level && self.message == other.message
    }
}

static GLOBAL: Lazy<SyncStatusBroadcaster> = Lazy::new(|| {
    SyncStatusBroadcaster::new(Arc::new(SystemTimeHandler::new()), DEFAULT_CHANNEL_CAPACITY)
});

/// Process-wide holder of the current [`SyncStatus`].
///
/// Cloning yields another handle to the same status and channel.
#[derive(Clone)]
pub struct SyncStatusBroadcaster {
    status: Dynamic<SyncStatus>,
    sender: broadcast::Sender<SyncStatus>,
    clock: Arc<dyn PhysicalTimeEffects>,
}

impl SyncStatusBroadcaster {
    /// New broadcaster at `idle`. A zero capacity is raised to one.
    pub fn new(clock: Arc<dyn PhysicalTimeEffects>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            status: Dynamic::new(SyncStatus::default()),
            sender,
            clock,
        }
    }

    /// The process-wide instance, stamped by the system clock.
    pub fn global() -> &'static SyncStatusBroadcaster {
        &GLOBAL
    }

    /// Overwrite the status and notify every observer.
    pub fn report(&self, level: SyncLevel, message: Option<String>) -> SyncStatus {
        let status = SyncStatus {
            level,
            message,
            updated_at: self.clock.physical_time().ok(),
        };
        self.publish(status.clone());
        status
    }

    /// Replace the status wholesale with a value read from elsewhere,
    /// keeping its original timestamp.
    pub fn adopt(&self, status: SyncStatus) {
        self.publish(status);
    }

    /// The last reported status, or `idle`.
    pub fn current_status(&self) -> SyncStatus {
        self.status.get()
    }

    /// Number of reports so far.
    pub fn version(&self) -> u64 {
        self.status.version()
    }

    /// Poll-style view.
    pub fn subscribe(&self) -> Subscription<SyncStatus> {
        self.status.subscribe()
    }

    /// Push-style view receiving every later report.
    pub fn listen(&self) -> broadcast::Receiver<SyncStatus> {
        self.sender.subscribe()
    }

    fn publish(&self, status: SyncStatus) {
        self.status.set(status.clone());
        // No listeners is fine; pollers still see the value.
        let _ = self.sender.send(status);
    }
}

impl fmt::Debug for SyncStatusBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncStatusBroadcaster")
            .field("status", &self.current_status())
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::TimeError;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct StepClock(AtomicU64);

    impl PhysicalTimeEffects for StepClock {
        fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
            Ok(PhysicalTime::from_ms(self.0.fetch_add(1, Ordering::SeqCst)))
        }
    }

    fn broadcaster() -> SyncStatusBroadcaster {
        SyncStatusBroadcaster::new(Arc::new(StepClock(AtomicU64::new(1_000))), 8)
    }

    #[test]
    fn test_starts_idle() {
        let b = broadcaster();
        assert_eq!(b.current_status().level, SyncLevel::Idle);
        assert!(b.current_status().message.is_none());
        assert!(b.current_status().updated_at.is_none());
    }

    #[test]
    fn test_report_is_idempotent_in_value() {
        let b = broadcaster();
        let first = b.report(SyncLevel::LocalOnly, Some("remote down".into()));
        let second = b.report(SyncLevel::LocalOnly, Some("remote down".into()));

        assert!(first.same_as(&second));
        assert_ne!(first.updated_at, second.updated_at);
        assert!(b.current_status().same_as(&first));
    }

    #[test]
    fn test_pollers_see_latest_only() {
        let b = broadcaster();
        let mut sub = b.subscribe();
        b.report(SyncLevel::Error, None);
        b.report(SyncLevel::Synced, None);

        assert_eq!(sub.poll().map(|s| s.level), Some(SyncLevel::Synced));
        assert!(sub.poll().is_none());
    }

    #[tokio::test]
    async fn test_listeners_receive_every_report() {
        let b = broadcaster();
        let mut rx1 = b.listen();
        let mut rx2 = b.listen();
        b.report(SyncLevel::Synced, Some("saved".into()));

        let a = rx1.recv().await.unwrap();
        let c = rx2.recv().await.unwrap();
        assert_eq!(a, c);
        assert_eq!(a.level, SyncLevel::Synced);
    }

    #[test]
    fn test_adopt_keeps_foreign_timestamp() {
        let b = broadcaster();
        let foreign = SyncStatus {
            level: SyncLevel::Synced,
            message: None,
            updated_at: Some(PhysicalTime::from_ms(42)),
        };
        b.adopt(foreign.clone());
        assert_eq!(b.current_status(), foreign);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(SyncLevel::LocalOnly.to_string(), "local-only");
        let json = serde_json::to_string(&SyncLevel::LocalOnly).unwrap();
        assert_eq!(json, "\"local_only\"");
    }
}
