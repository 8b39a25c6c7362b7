//! Post entity and lifecycle status.

use portal_core::{PhysicalTime, PortalError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Stable post identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(format!("post-{}", uuid::Uuid::new_v4()))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Social network a post targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Facebook page
    Facebook,
    /// Instagram account
    Instagram,
    /// LinkedIn company page
    Linkedin,
    /// X (formerly Twitter)
    X,
    /// TikTok account
    Tiktok,
}

impl Platform {
    /// Every platform.
    pub const ALL: [Platform; 5] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Linkedin,
        Platform::X,
        Platform::Tiktok,
    ];

    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Linkedin => "linkedin",
            Self::X => "x",
            Self::Tiktok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lowered)
            .ok_or_else(|| PortalError::invalid(format!("unknown platform: {s}")))
    }
}

/// Where a post sits in the approval lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    /// Waiting for client review
    Pending,
    /// Sent back to the content team with a note
    EditRequested,
    /// Approved and waiting for its slot
    Scheduled,
    /// Live; terminal
    Published,
}

impl PostStatus {
    /// Stable snake_case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::EditRequested => "edit_requested",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }

    /// True for states with no outgoing transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Published)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of schedulable content.
///
/// Fields are private so the two structural rules hold for every value in
/// circulation: the platform set is never empty, and a published post always
/// carries its published timestamp. Deserialization re-checks both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PostRecord")]
pub struct Post {
    id: PostId,
    body: String,
    platforms: BTreeSet<Platform>,
    status: PostStatus,
    scheduled_at: Option<PhysicalTime>,
    published_at: Option<PhysicalTime>,
    created_by: String,
    edit_note: Option<String>,
}

impl Post {
    /// A new pending post.
    pub fn new(
        id: PostId,
        body: impl Into<String>,
        platforms: impl IntoIterator<Item = Platform>,
        created_by: impl Into<String>,
    ) -> Result<Self, PortalError> {
        let platforms: BTreeSet<Platform> = platforms.into_iter().collect();
        if platforms.is_empty() {
            return Err(PortalError::invalid(format!(
                "post {id} must target at least one platform"
            )));
        }
        Ok(Self {
            id,
            body: body.into(),
            platforms,
            status: PostStatus::Pending,
            scheduled_at: None,
            published_at: None,
            created_by: created_by.into(),
            edit_note: None,
        })
    }

    /// Propose a slot before review; kept when the post is approved.
    pub fn with_scheduled_at(mut self, at: PhysicalTime) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    /// Identifier
    pub fn id(&self) -> &PostId {
        &self.id
    }

    /// Body text
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Target platforms, never empty
    pub fn platforms(&self) -> &BTreeSet<Platform> {
        &self.platforms
    }

    /// Lifecycle status
    pub fn status(&self) -> PostStatus {
        self.status
    }

    /// Scheduled slot, if assigned
    pub fn scheduled_at(&self) -> Option<PhysicalTime> {
        self.scheduled_at
    }

    /// Publication stamp; always set once published
    pub fn published_at(&self) -> Option<PhysicalTime> {
        self.published_at
    }

    /// Creator name
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Open edit request, if any
    pub fn edit_note(&self) -> Option<&str> {
        self.edit_note.as_deref()
    }

    pub(crate) fn scheduled(&self, at: PhysicalTime) -> Self {
        Self {
            status: PostStatus::Scheduled,
            scheduled_at: Some(at),
            edit_note: None,
            ..self.clone()
        }
    }

    pub(crate) fn edit_requested(&self, note: Option<String>) -> Self {
        Self {
            status: PostStatus::EditRequested,
            edit_note: note,
            ..self.clone()
        }
    }

    pub(crate) fn resubmitted(&self, revised_body: Option<String>) -> Self {
        Self {
            status: PostStatus::Pending,
            body: revised_body.unwrap_or_else(|| self.body.clone()),
            edit_note: None,
            ..self.clone()
        }
    }

    pub(crate) fn published(&self, at: PhysicalTime) -> Self {
        Self {
            status: PostStatus::Published,
            published_at: Some(at),
            ..self.clone()
        }
    }
}

/// Unchecked wire shape of [`Post`].
#[derive(Deserialize)]
struct PostRecord {
    id: PostId,
    body: String,
    platforms: BTreeSet<Platform>,
    status: PostStatus,
    #[serde(default)]
    scheduled_at: Option<PhysicalTime>,
    #[serde(default)]
    published_at: Option<PhysicalTime>,
    created_by: String,
    #[serde(default)]
    edit_note: Option<String>,
}

impl TryFrom<PostRecord> for Post {
    type Error = PortalError;

    fn try_from(record: PostRecord) -> Result<Self, Self::Error> {
        if record.platforms.is_empty() {
            return Err(PortalError::invalid(format!(
                "post {} has no platforms",
                record.id
            )));
        }
        if record.status == PostStatus::Published && record.published_at.is_none() {
            return Err(PortalError::invalid(format!(
                "post {} is published without a timestamp",
                record.id
            )));
        }
        Ok(Self {
            id: record.id,
            body: record.body,
            platforms: record.platforms,
            status: record.status,
            scheduled_at: record.scheduled_at,
            published_at: record.published_at,
            created_by: record.created_by,
            edit_note: record.edit_note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_requires_platform() {
        let err = Post::new(PostId::from("p1"), "hello", [], "agency").unwrap_err();
        assert!(matches!(err, PortalError::Invalid { .. }));

        let post = Post::new(PostId::from("p1"), "hello", [Platform::X], "agency").unwrap();
        assert_eq!(post.status(), PostStatus::Pending);
        assert!(post.edit_note().is_none());
    }

    #[test]
    fn test_deserialize_rejects_published_without_stamp() {
        let json = r#"{
            "id": "p1", "body": "b", "platforms": ["x"],
            "status": "published", "created_by": "agency"
        }"#;
        assert!(serde_json::from_str::<Post>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_empty_platforms() {
        let json = r#"{
            "id": "p1", "body": "b", "platforms": [],
            "status": "pending", "created_by": "agency"
        }"#;
        assert!(serde_json::from_str::<Post>(json).is_err());
    }

    #[test]
    fn test_serialized_post_reloads() {
        let post = Post::new(
            PostId::from("p1"),
            "Flu shots this Friday",
            [Platform::Facebook, Platform::Instagram],
            "agency",
        )
        .unwrap()
        .edit_requested(Some("shorter please".into()));

        let json = serde_json::to_string(&post).unwrap();
        let back: Post = serde_json::from_str(&json).unwrap();
        assert_eq!(back, post);
        assert_eq!(back.edit_note(), Some("shorter please"));
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("LinkedIn".parse::<Platform>().unwrap(), Platform::Linkedin);
        assert!("myspace".parse::<Platform>().is_err());
    }
}
