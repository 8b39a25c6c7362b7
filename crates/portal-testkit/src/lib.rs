//! Portal Testing Infrastructure
//!
//! Deterministic handlers and fixtures shared by the portal's integration
//! tests.
//!
//! ```rust,ignore
//! let t = TestApp::new();
//! t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 3));
//! let (user, pass) = project_login(ProjectId::Zrmc, CredentialSlot::TeamMember);
//! workflows::login(&t.app, &user, &pass).await?;
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod app;
pub mod clock;
pub mod content;
pub mod posts;
pub mod storage;

pub use app::{project_login, TestApp, SUPER_ADMIN};
pub use clock::FixedClock;
pub use content::ControlledContentStore;
pub use posts::{pending_posts, PostBuilder};
pub use storage::FailingStorage;
