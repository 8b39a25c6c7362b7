//! # Post Approval
//!
//! Posts, their per-project view state, and the lifecycle engine that moves
//! them between statuses.

mod engine;
mod post;
mod state;

pub use engine::{
    ApprovalEngine, ApprovalError, BatchAction, BatchOutcome, Outcome, Refusal, Step,
    DEFAULT_SCHEDULE_OFFSET_MS,
};
pub use post::{Platform, Post, PostId, PostStatus};
pub use state::{ApprovalView, PostsState};
