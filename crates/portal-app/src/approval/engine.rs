//! # Approval Engine
//!
//! The post lifecycle state machine:
//!
//! ```text
//! pending ──approve──▶ scheduled ──publish──▶ published
//!    │  ▲                  ▲
//!    │  └──resubmit──┐     │
//!    └─request-edit─▶ edit-requested ──approve─┘
//! ```
//!
//! Every operation is a pure function from the current [`PostsState`] to a
//! [`Step`]: the whole replacement state (if anything changed) and the
//! outcome to hand back to the caller. Callers install the replacement in one
//! write, so no half-applied batch is ever observable.
//!
//! Authorization is checked first. A session without the needed capability
//! gets [`Outcome::Refused`] and no replacement state; nothing mutates.

use super::post::{Post, PostId, PostStatus};
use super::state::PostsState;
use crate::session::SessionContext;
use portal_authorization::Capability;
use portal_core::{PhysicalTime, PortalError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Default offset of the assigned slot when none is supplied: one day.
pub const DEFAULT_SCHEDULE_OFFSET_MS: u64 = 24 * 60 * 60 * 1000;

/// Why an operation did not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum Refusal {
    /// The session lacks the capability the action needs
    NotPermitted {
        /// Action name
        action: String,
    },
    /// No post with this id in the current state
    UnknownPost {
        /// Requested id
        id: PostId,
    },
    /// The post's status has no such transition
    InvalidTransition {
        /// Target post
        id: PostId,
        /// Status it is in
        from: PostStatus,
        /// Action name
        action: String,
    },
}

/// Result of an operation that was allowed to run, or why it was not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Ran to completion
    Applied(T),
    /// Silently refused; nothing changed
    Refused(Refusal),
}

impl<T> Outcome<T> {
    /// True if the operation ran.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The applied value, if any.
    pub fn applied(&self) -> Option<&T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Refused(_) => None,
        }
    }

    /// The refusal, if any.
    pub fn refusal(&self) -> Option<&Refusal> {
        match self {
            Self::Applied(_) => None,
            Self::Refused(refusal) => Some(refusal),
        }
    }
}

/// What a batch did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Ids that moved, in collection order
    pub applied: Vec<PostId>,
    /// Requested ids dropped because they were not pending
    pub skipped: Vec<PostId>,
}

/// Action applied to every selected post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum BatchAction {
    /// Move to scheduled
    Approve,
    /// Move to edit-requested with a shared note
    RequestEdit {
        /// Note attached to every post
        note: String,
    },
}

impl BatchAction {
    fn name(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::RequestEdit { .. } => "request_edit",
        }
    }

    /// Name of the selective batch running this action.
    pub fn selected_name(&self) -> &'static str {
        match self {
            Self::Approve => "approve_selected",
            Self::RequestEdit { .. } => "request_edit_selected",
        }
    }
}

/// Selective batch rejected before touching anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalError {
    /// No ids given
    #[error("no posts selected")]
    EmptySelection,
    /// Strict mode and some ids are not pending
    #[error("posts not pending: {}", join_ids(.0))]
    NotPending(Vec<PostId>),
}

impl From<ApprovalError> for PortalError {
    fn from(err: ApprovalError) -> Self {
        PortalError::invalid_batch(err.to_string())
    }
}

fn join_ids(ids: &[PostId]) -> String {
    ids.iter()
        .map(PostId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An operation's replacement state (if any) and its outcome.
#[derive(Debug, Clone)]
pub struct Step<T> {
    /// Whole replacement state; `None` when nothing changed
    pub next: Option<PostsState>,
    /// What to report back
    pub outcome: Outcome<T>,
}

impl<T> Step<T> {
    fn refused(refusal: Refusal) -> Self {
        Self {
            next: None,
            outcome: Outcome::Refused(refusal),
        }
    }

    pub(crate) fn applied(next: PostsState, value: T) -> Self {
        Self {
            next: Some(next),
            outcome: Outcome::Applied(value),
        }
    }
}

/// Stateless lifecycle rules plus scheduling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalEngine {
    default_schedule_offset_ms: u64,
    strict_selection: bool,
}

impl Default for ApprovalEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEDULE_OFFSET_MS, false)
    }
}

impl ApprovalEngine {
    /// Engine assigning `now + default_schedule_offset_ms` to approvals
    /// without a slot. With `strict_selection`, a selective batch naming any
    /// non-pending id is rejected instead of trimmed.
    pub fn new(default_schedule_offset_ms: u64, strict_selection: bool) -> Self {
        Self {
            default_schedule_offset_ms,
            strict_selection,
        }
    }

    /// Whether selective batches reject unknown ids.
    pub fn is_strict(&self) -> bool {
        self.strict_selection
    }

    /// Slot for a post approved at `now` with an optional explicit time.
    ///
    /// Precedence: explicit time, then a slot proposed on the post, then the
    /// default offset from `now`.
    pub fn schedule_for(
        &self,
        post: &Post,
        explicit: Option<PhysicalTime>,
        now: PhysicalTime,
    ) -> PhysicalTime {
        explicit
            .or(post.scheduled_at())
            .unwrap_or_else(|| now.plus_ms(self.default_schedule_offset_ms))
    }

    /// Approve a pending or edit-requested post.
    pub fn approve(
        &self,
        session: &SessionContext,
        state: &PostsState,
        id: &PostId,
        schedule_at: Option<PhysicalTime>,
        now: PhysicalTime,
    ) -> Step<Post> {
        self.single(
            session,
            state,
            id,
            "approve",
            &[PostStatus::Pending, PostStatus::EditRequested],
            |post| post.scheduled(self.schedule_for(post, schedule_at, now)),
        )
    }

    /// Send a pending post back with a note.
    pub fn request_edit(
        &self,
        session: &SessionContext,
        state: &PostsState,
        id: &PostId,
        note: &str,
    ) -> Step<Post> {
        self.single(
            session,
            state,
            id,
            "request_edit",
            &[PostStatus::Pending],
            |post| post.edit_requested(normalize_note(note)),
        )
    }

    /// Return an edit-requested post to review, optionally with a new body.
    pub fn resubmit(
        &self,
        session: &SessionContext,
        state: &PostsState,
        id: &PostId,
        revised_body: Option<String>,
    ) -> Step<Post> {
        self.single(
            session,
            state,
            id,
            "resubmit",
            &[PostStatus::EditRequested],
            |post| post.resubmitted(revised_body.clone()),
        )
    }

    /// Publish a scheduled post, stamping it with `now`.
    pub fn publish(
        &self,
        session: &SessionContext,
        state: &PostsState,
        id: &PostId,
        now: PhysicalTime,
    ) -> Step<Post> {
        self.single(
            session,
            state,
            id,
            "publish",
            &[PostStatus::Scheduled],
            |post| post.published(now),
        )
    }

    /// Schedule every pending post in one replacement.
    ///
    /// With nothing pending the outcome is applied and empty, and no
    /// replacement state is produced.
    pub fn approve_all(
        &self,
        session: &SessionContext,
        state: &PostsState,
        now: PhysicalTime,
    ) -> Step<BatchOutcome> {
        if let Some(refusal) = Self::check_permission(session, "approve_all") {
            return Step::refused(refusal);
        }
        if state.pending().is_empty() {
            return Step {
                next: None,
                outcome: Outcome::Applied(BatchOutcome::default()),
            };
        }
        let (next, applied) = state.with_pending_moved(
            |_| true,
            |post| post.scheduled(self.schedule_for(post, None, now)),
        );
        debug!(count = applied.len(), "Approved all pending posts");
        Step::applied(
            next,
            BatchOutcome {
                applied,
                skipped: Vec::new(),
            },
        )
    }

    /// Apply `action` to the pending posts named by `ids`.
    ///
    /// Posts are visited in collection order, not in `ids` order. Ids that
    /// are not pending are dropped and listed in
    /// [`BatchOutcome::skipped`], or reject the whole batch in strict mode.
    pub fn apply_selected(
        &self,
        session: &SessionContext,
        state: &PostsState,
        ids: &[PostId],
        action: &BatchAction,
        now: PhysicalTime,
    ) -> Result<Step<BatchOutcome>, ApprovalError> {
        if let Some(refusal) = Self::check_permission(session, action.selected_name()) {
            return Ok(Step::refused(refusal));
        }
        if ids.is_empty() {
            return Err(ApprovalError::EmptySelection);
        }

        let wanted: BTreeSet<&PostId> = ids.iter().collect();
        let skipped: Vec<PostId> = wanted
            .iter()
            .filter(|id| !state.is_pending(id))
            .map(|id| (*id).clone())
            .collect();

        if !skipped.is_empty() {
            if self.strict_selection {
                return Err(ApprovalError::NotPending(skipped));
            }
            warn!(
                action = action.name(),
                skipped = %join_ids(&skipped),
                "Dropping non-pending ids from batch"
            );
        }

        if skipped.len() == wanted.len() {
            return Ok(Step {
                next: None,
                outcome: Outcome::Applied(BatchOutcome {
                    applied: Vec::new(),
                    skipped,
                }),
            });
        }

        let (next, applied) = state.with_pending_moved(
            |post| wanted.contains(post.id()),
            |post| match action {
                BatchAction::Approve => post.scheduled(self.schedule_for(post, None, now)),
                BatchAction::RequestEdit { note } => post.edit_requested(normalize_note(note)),
            },
        );
        debug!(action = action.name(), count = applied.len(), "Applied batch");
        Ok(Step::applied(next, BatchOutcome { applied, skipped }))
    }

    /// Why `session` may not run `action` in its selected project, if it
    /// may not.
    ///
    /// Depends only on the session, so callers can refuse before loading
    /// anything.
    pub fn check_permission(session: &SessionContext, action: &str) -> Option<Refusal> {
        let needed = required_capabilities(action);
        if needed.iter().any(|c| session.allows(*c)) {
            None
        } else {
            Some(Refusal::NotPermitted {
                action: action.to_string(),
            })
        }
    }

    fn single<F>(
        &self,
        session: &SessionContext,
        state: &PostsState,
        id: &PostId,
        action: &'static str,
        allowed_from: &[PostStatus],
        transition: F,
    ) -> Step<Post>
    where
        F: FnOnce(&Post) -> Post,
    {
        if let Some(refusal) = Self::check_permission(session, action) {
            return Step::refused(refusal);
        }

        let Some(post) = state.find(id) else {
            return Step::refused(Refusal::UnknownPost { id: id.clone() });
        };

        if !allowed_from.contains(&post.status()) {
            debug!(post = %id, from = %post.status(), action, "Transition not allowed");
            return Step::refused(Refusal::InvalidTransition {
                id: id.clone(),
                from: post.status(),
                action: action.to_string(),
            });
        }

        let updated = transition(post);
        Step::applied(state.with_moved(updated.clone()), updated)
    }
}

/// Request-edit sends a message to the content team, so either capability
/// admits it; everything else needs `edit`.
fn required_capabilities(action: &str) -> &'static [Capability] {
    match action {
        "request_edit" | "request_edit_selected" => &[Capability::Edit, Capability::SendMessages],
        _ => &[Capability::Edit],
    }
}

fn normalize_note(note: &str) -> Option<String> {
    let trimmed = note.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
