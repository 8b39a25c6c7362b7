//! Post builders.

use portal_app::{Platform, Post, PostId};
use portal_core::PhysicalTime;

/// Builder for pending posts with sensible defaults.
#[derive(Debug, Clone)]
pub struct PostBuilder {
    id: String,
    body: Option<String>,
    platforms: Vec<Platform>,
    created_by: String,
    proposed_at: Option<PhysicalTime>,
}

impl PostBuilder {
    /// Pending post `id` targeting Facebook, created by "Agency".
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: None,
            platforms: vec![Platform::Facebook],
            created_by: "Agency".to_string(),
            proposed_at: None,
        }
    }

    /// Body text; defaults to one derived from the id.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Target platforms.
    pub fn platforms(mut self, platforms: &[Platform]) -> Self {
        self.platforms = platforms.to_vec();
        self
    }

    /// Creator name.
    pub fn created_by(mut self, name: impl Into<String>) -> Self {
        self.created_by = name.into();
        self
    }

    /// Slot proposed before review.
    pub fn proposed_at(mut self, at: PhysicalTime) -> Self {
        self.proposed_at = Some(at);
        self
    }

    /// Build; panics on an empty platform list.
    pub fn build(self) -> Post {
        let body = self
            .body
            .unwrap_or_else(|| format!("Draft copy for {}", self.id));
        let post = Post::new(PostId::new(self.id), body, self.platforms, self.created_by)
            .expect("test post needs a platform");
        match self.proposed_at {
            Some(at) => post.with_scheduled_at(at),
            None => post,
        }
    }
}

/// `count` pending posts with ids `<prefix>-1`, `<prefix>-2`, ...
pub fn pending_posts(prefix: &str, count: usize) -> Vec<Post> {
    (1..=count)
        .map(|i| PostBuilder::new(format!("{prefix}-{i}")).build())
        .collect()
}
