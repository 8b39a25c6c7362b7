//! # Approval View State
//!
//! Posts of one project bucketed by lifecycle status, plus the review
//! selection. Every bucket keeps collection order; transitions append to the
//! destination bucket, so relative order survives a move.

use super::post::{Post, PostId, PostStatus};
use portal_authorization::ProjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Posts of a project, bucketed by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsState {
    pending: Vec<Post>,
    edit_requested: Vec<Post>,
    scheduled: Vec<Post>,
    published: Vec<Post>,
}

impl PostsState {
    /// Bucket `posts` by status, keeping their order within each bucket.
    pub fn from_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let mut state = Self::default();
        for post in posts {
            state.bucket_mut(post.status()).push(post);
        }
        state
    }

    /// Posts waiting for review
    pub fn pending(&self) -> &[Post] {
        &self.pending
    }

    /// Posts sent back for edits
    pub fn edit_requested(&self) -> &[Post] {
        &self.edit_requested
    }

    /// Approved posts
    pub fn scheduled(&self) -> &[Post] {
        &self.scheduled
    }

    /// Live posts
    pub fn published(&self) -> &[Post] {
        &self.published
    }

    /// Posts with `status`.
    pub fn with_status(&self, status: PostStatus) -> &[Post] {
        match status {
            PostStatus::Pending => &self.pending,
            PostStatus::EditRequested => &self.edit_requested,
            PostStatus::Scheduled => &self.scheduled,
            PostStatus::Published => &self.published,
        }
    }

    /// Every post, bucket by bucket in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = &Post> {
        self.pending
            .iter()
            .chain(&self.edit_requested)
            .chain(&self.scheduled)
            .chain(&self.published)
    }

    /// Owned copy of every post, for persistence.
    pub fn to_vec(&self) -> Vec<Post> {
        self.iter().cloned().collect()
    }

    /// Total number of posts
    pub fn len(&self) -> usize {
        self.pending.len() + self.edit_requested.len() + self.scheduled.len() + self.published.len()
    }

    /// True if there are no posts
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look a post up in any bucket.
    pub fn find(&self, id: &PostId) -> Option<&Post> {
        self.iter().find(|p| p.id() == id)
    }

    /// Whether `id` is currently pending.
    pub fn is_pending(&self, id: &PostId) -> bool {
        self.pending.iter().any(|p| p.id() == id)
    }

    /// Ids of pending posts in collection order.
    pub fn pending_ids(&self) -> Vec<PostId> {
        self.pending.iter().map(|p| p.id().clone()).collect()
    }

    /// A copy with `updated` moved out of its current bucket and appended to
    /// the bucket of its new status.
    pub(crate) fn with_moved(&self, updated: Post) -> Self {
        let mut next = self.clone();
        for bucket in next.buckets_mut() {
            bucket.retain(|p| p.id() != updated.id());
        }
        next.bucket_mut(updated.status()).push(updated);
        next
    }

    /// A copy where each pending post accepted by `select` is replaced by
    /// `transition(post)`. Pending posts are visited in order, so the moved
    /// posts land in their destination buckets in that same order.
    ///
    /// Returns the new state and the ids that moved.
    pub(crate) fn with_pending_moved<S, F>(&self, select: S, transition: F) -> (Self, Vec<PostId>)
    where
        S: Fn(&Post) -> bool,
        F: Fn(&Post) -> Post,
    {
        let mut next = Self {
            pending: Vec::with_capacity(self.pending.len()),
            ..self.clone()
        };
        let mut moved = Vec::new();
        for post in &self.pending {
            if select(post) {
                let updated = transition(post);
                moved.push(updated.id().clone());
                next.bucket_mut(updated.status()).push(updated);
            } else {
                next.pending.push(post.clone());
            }
        }
        (next, moved)
    }

    fn bucket_mut(&mut self, status: PostStatus) -> &mut Vec<Post> {
        match status {
            PostStatus::Pending => &mut self.pending,
            PostStatus::EditRequested => &mut self.edit_requested,
            PostStatus::Scheduled => &mut self.scheduled,
            PostStatus::Published => &mut self.published,
        }
    }

    fn buckets_mut(&mut self) -> [&mut Vec<Post>; 4] {
        [
            &mut self.pending,
            &mut self.edit_requested,
            &mut self.scheduled,
            &mut self.published,
        ]
    }
}

/// What the approval screen of the selected project shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalView {
    project: Option<ProjectId>,
    posts: PostsState,
    selection: BTreeSet<PostId>,
}

impl ApprovalView {
    /// View over `posts` of `project` with nothing selected.
    pub fn loaded(project: ProjectId, posts: PostsState) -> Self {
        Self {
            project: Some(project),
            posts,
            selection: BTreeSet::new(),
        }
    }

    /// Project the posts belong to; `None` before the first load.
    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    /// Current posts
    pub fn posts(&self) -> &PostsState {
        &self.posts
    }

    /// Selected post ids; always a subset of the pending ids
    pub fn selection(&self) -> &BTreeSet<PostId> {
        &self.selection
    }

    /// Selected ids in pending-collection order.
    pub fn selected_ids(&self) -> Vec<PostId> {
        self.posts
            .pending()
            .iter()
            .filter(|p| self.selection.contains(p.id()))
            .map(|p| p.id().clone())
            .collect()
    }

    /// Same view with new posts; selection shrinks to what is still pending.
    pub fn with_posts(&self, posts: PostsState) -> Self {
        let selection = self
            .selection
            .iter()
            .filter(|id| posts.is_pending(id))
            .cloned()
            .collect();
        Self {
            project: self.project,
            posts,
            selection,
        }
    }

    /// Same view with `posts` and an empty selection, as left by a batch.
    pub fn after_batch(&self, posts: PostsState) -> Self {
        Self {
            project: self.project,
            posts,
            selection: BTreeSet::new(),
        }
    }

    /// Add a pending post to the selection. Returns `None` if nothing
    /// changes (already selected, or not pending).
    pub fn selecting(&self, id: &PostId) -> Option<Self> {
        if !self.posts.is_pending(id) || self.selection.contains(id) {
            return None;
        }
        let mut next = self.clone();
        next.selection.insert(id.clone());
        Some(next)
    }

    /// Remove a post from the selection, `None` if it was not selected.
    pub fn deselecting(&self, id: &PostId) -> Option<Self> {
        if !self.selection.contains(id) {
            return None;
        }
        let mut next = self.clone();
        next.selection.remove(id);
        Some(next)
    }

    /// Select every pending post.
    pub fn selecting_all_pending(&self) -> Self {
        Self {
            selection: self.posts.pending_ids().into_iter().collect(),
            ..self.clone()
        }
    }

    /// Empty the selection, `None` if already empty.
    pub fn clearing_selection(&self) -> Option<Self> {
        if self.selection.is_empty() {
            return None;
        }
        Some(Self {
            selection: BTreeSet::new(),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::post::Platform;
    use portal_core::PhysicalTime;

    fn post(id: &str) -> Post {
        Post::new(PostId::from(id), format!("body {id}"), [Platform::Facebook], "agency").unwrap()
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id().as_str()).collect()
    }

    #[test]
    fn test_from_posts_buckets_in_order() {
        let state = PostsState::from_posts(vec![
            post("a"),
            post("b").scheduled(PhysicalTime::from_ms(1)),
            post("c"),
        ]);
        assert_eq!(ids(state.pending()), vec!["a", "c"]);
        assert_eq!(ids(state.scheduled()), vec!["b"]);
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_with_moved_appends_to_destination() {
        let state = PostsState::from_posts(vec![
            post("a").scheduled(PhysicalTime::from_ms(1)),
            post("b"),
        ]);
        let moved = state.with_moved(post("b").scheduled(PhysicalTime::from_ms(2)));
        assert!(moved.pending().is_empty());
        assert_eq!(ids(moved.scheduled()), vec!["a", "b"]);
        assert_eq!(ids(state.pending()), vec!["b"]);
    }

    #[test]
    fn test_selection_only_holds_pending() {
        let state = PostsState::from_posts(vec![
            post("a"),
            post("b").scheduled(PhysicalTime::from_ms(1)),
        ]);
        let view = ApprovalView::loaded(ProjectId::Tvh, state);

        assert!(view.selecting(&PostId::from("b")).is_none());
        assert!(view.selecting(&PostId::from("zzz")).is_none());

        let view = view.selecting(&PostId::from("a")).unwrap();
        assert!(view.selecting(&PostId::from("a")).is_none());
        assert_eq!(view.selected_ids(), vec![PostId::from("a")]);
    }

    #[test]
    fn test_with_posts_prunes_selection() {
        let view = ApprovalView::loaded(
            ProjectId::Sbh,
            PostsState::from_posts(vec![post("a"), post("b")]),
        )
        .selecting_all_pending();

        let next = view.with_posts(PostsState::from_posts(vec![
            post("a"),
            post("b").scheduled(PhysicalTime::from_ms(1)),
        ]));
        assert_eq!(next.selected_ids(), vec![PostId::from("a")]);
    }
}
