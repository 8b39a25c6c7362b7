//! Portal Effects - production effect handlers
//!
//! Stateless implementations of the effect traits declared in `portal-core`:
//!
//! - [`MemoryStorageHandler`]: process-local key-value store
//! - [`FilesystemStorageHandler`]: one file per key under a base directory
//! - [`SystemTimeHandler`]: wall clock backed by `std::time::SystemTime`

#![forbid(unsafe_code)]

pub mod storage;
pub mod time;

pub use storage::{FilesystemStorageHandler, MemoryStorageHandler};
pub use time::SystemTimeHandler;
