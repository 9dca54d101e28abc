use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PostId = i64;
pub type UserId = i64;

// -- Kinds & statuses --

/// Every piece of forum content lives in one id space and carries its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Forum,
    Topic,
    Reply,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forum => "forum",
            Self::Topic => "topic",
            Self::Reply => "reply",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "forum" => Some(Self::Forum),
            "topic" => Some(Self::Topic),
            "reply" => Some(Self::Reply),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Publish,
    Closed,
    Spam,
    Trash,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Closed => "closed",
            Self::Spam => "spam",
            Self::Trash => "trash",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "publish" => Some(Self::Publish),
            "closed" => Some(Self::Closed),
            "spam" => Some(Self::Spam),
            "trash" => Some(Self::Trash),
            _ => None,
        }
    }
}

// -- Roles --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Keymaster,
    Moderator,
    Participant,
    Spectator,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    PublishTopics,
    PublishReplies,
    EditOthersTopics,
    EditOthersReplies,
    DeleteOthersTopics,
    DeleteOthersReplies,
    Moderate,
    EditOwnProfile,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keymaster => "keymaster",
            Self::Moderator => "moderator",
            Self::Participant => "participant",
            Self::Spectator => "spectator",
            Self::Blocked => "blocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keymaster" => Some(Self::Keymaster),
            "moderator" => Some(Self::Moderator),
            "participant" => Some(Self::Participant),
            "spectator" => Some(Self::Spectator),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Human readable label, as shown next to an author's name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Keymaster => "Keymaster",
            Self::Moderator => "Moderator",
            Self::Participant => "Participant",
            Self::Spectator => "Spectator",
            Self::Blocked => "Blocked",
        }
    }

    pub fn has(&self, cap: Capability) -> bool {
        use Capability::*;
        match self {
            Self::Keymaster | Self::Moderator => true,
            Self::Participant => matches!(cap, PublishTopics | PublishReplies | EditOwnProfile),
            Self::Spectator => matches!(cap, EditOwnProfile),
            Self::Blocked => false,
        }
    }
}

// -- Actor --

/// The identity behind the current request. `user_id == None` is a visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<UserId>,
    pub role: Option<Role>,
    pub ip: Option<String>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self { user_id: None, role: None, ip: None }
    }

    pub fn user(user_id: UserId, role: Role) -> Self {
        Self { user_id: Some(user_id), role: Some(role), ip: None }
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip = ip;
        self
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn can(&self, cap: Capability) -> bool {
        self.role.is_some_and(|role| role.has(cap))
    }
}

// -- Records read from the content store --

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub hide_total_counts: bool,
    pub created_at: DateTime<Utc>,
}

/// The most recent post under a forum or topic.
#[derive(Debug, Clone, PartialEq)]
pub struct Freshness {
    pub post_id: PostId,
    pub topic_id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ForumRecord {
    pub id: PostId,
    pub parent_id: Option<PostId>,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub topic_count: u64,
    pub reply_count: u64,
    pub subforum_count: u64,
    pub freshness: Option<Freshness>,
}

impl ForumRecord {
    /// Topics plus replies.
    pub fn post_count(&self) -> u64 {
        self.topic_count + self.reply_count
    }
}

#[derive(Debug, Clone)]
pub struct TopicRecord {
    pub id: PostId,
    pub forum_id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub author_role: Role,
    pub author_ip: Option<String>,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub reply_count: u64,
    pub voice_count: u64,
    pub tags: Vec<String>,
    pub freshness: Option<Freshness>,
}

impl TopicRecord {
    /// The opening post counts as one.
    pub fn post_count(&self) -> u64 {
        self.reply_count + 1
    }
}

#[derive(Debug, Clone)]
pub struct ReplyRecord {
    pub id: PostId,
    pub topic_id: PostId,
    pub reply_to: Option<PostId>,
    pub author_id: UserId,
    pub author_name: String,
    pub author_role: Role,
    pub author_ip: Option<String>,
    pub content: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
}

/// Search spans forums and topics in one result set.
#[derive(Debug, Clone)]
pub enum SearchHit {
    Forum(ForumRecord),
    Topic(TopicRecord),
}

impl SearchHit {
    pub fn kind(&self) -> PostKind {
        match self {
            Self::Forum(_) => PostKind::Forum,
            Self::Topic(_) => PostKind::Topic,
        }
    }
}

// -- Paging --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u32,
    pub limit: u32,
}

/// One page of results plus the number of rows matched overall.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self { items: Vec::new(), total: 0 }
    }
}

/// Request-scoped search arguments.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub terms: String,
    pub kinds: Vec<PostKind>,
    pub window: PageWindow,
}

// -- Writes --

#[derive(Debug, Clone)]
pub struct NewTopic {
    pub forum_id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub author_ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReply {
    pub topic_id: PostId,
    pub author_id: UserId,
    pub reply_to: Option<PostId>,
    pub content: String,
    pub author_ip: Option<String>,
}
