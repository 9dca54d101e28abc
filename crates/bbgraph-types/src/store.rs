use crate::models::{
    ForumRecord, NewReply, NewTopic, Page, PageWindow, PostId, PostKind, ReplyRecord, SearchHit,
    SearchQuery, TopicRecord, UserId, UserRecord,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The store refused the write (closed forum, bad parent, ...).
    #[error("{0}")]
    Rejected(String),

    /// A unique value (such as a username) is already taken.
    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error(transparent)]
    Backend(anyhow::Error),
}

/// Store implementations bail with `StoreError` inside `anyhow` closures; unwrap
/// those back into their variant instead of burying them under `Backend`.
impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<StoreError>() {
            Ok(store_err) => store_err,
            Err(other) => Self::Backend(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Forum content primitives the resolvers are written against.
///
/// Reads only return readable content (published or closed). Implementations
/// own their own locking; every method may be called from any thread.
pub trait ContentStore: Send + Sync {
    // -- Lookup --

    fn post_kind(&self, id: PostId) -> StoreResult<Option<PostKind>>;
    fn forum(&self, id: PostId) -> StoreResult<Option<ForumRecord>>;
    fn topic(&self, id: PostId) -> StoreResult<Option<TopicRecord>>;
    fn reply(&self, id: PostId) -> StoreResult<Option<ReplyRecord>>;

    // -- Listing --

    fn top_level_forums(&self) -> StoreResult<Vec<ForumRecord>>;
    fn subforums(&self, parent_id: PostId) -> StoreResult<Vec<ForumRecord>>;

    /// Topics of a forum, newest first. `None` returns every topic.
    fn forum_topics(&self, forum_id: PostId, window: Option<PageWindow>)
    -> StoreResult<Page<TopicRecord>>;

    /// Replies of a topic, oldest first.
    fn topic_replies(&self, topic_id: PostId) -> StoreResult<Vec<ReplyRecord>>;

    fn search(&self, query: &SearchQuery) -> StoreResult<Page<SearchHit>>;

    // -- Writes --

    fn insert_topic(&self, topic: NewTopic) -> StoreResult<PostId>;
    fn insert_reply(&self, reply: NewReply) -> StoreResult<PostId>;
    fn update_topic(&self, id: PostId, title: &str, content: &str) -> StoreResult<()>;
    fn update_reply(&self, id: PostId, content: &str) -> StoreResult<()>;

    /// Deletes a topic (with its replies) or a reply. Returns false if nothing was removed.
    fn delete_post(&self, id: PostId) -> StoreResult<bool>;

    /// Replaces the tag set of a topic.
    fn set_topic_tags(&self, topic_id: PostId, tags: &[String]) -> StoreResult<()>;

    // -- Users --

    fn user(&self, id: UserId) -> StoreResult<Option<UserRecord>>;
    fn user_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>>;
    fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<UserRecord>;

    /// Topics plus replies authored by the user.
    fn user_post_count(&self, id: UserId) -> StoreResult<u64>;

    // -- Favorites --

    fn is_favorite(&self, user_id: UserId, topic_id: PostId) -> StoreResult<bool>;
    fn add_favorite(&self, user_id: UserId, topic_id: PostId) -> StoreResult<()>;
    fn remove_favorite(&self, user_id: UserId, topic_id: PostId) -> StoreResult<()>;
    fn favorite_topic_ids(&self, user_id: UserId) -> StoreResult<Vec<PostId>>;

    // -- Subscriptions --

    fn is_subscribed(&self, user_id: UserId, object_id: PostId) -> StoreResult<bool>;
    fn add_subscription(&self, user_id: UserId, object_id: PostId) -> StoreResult<()>;
    fn remove_subscription(&self, user_id: UserId, object_id: PostId) -> StoreResult<()>;

    /// Ids of the given kind the user is subscribed to, ascending.
    fn subscription_ids(&self, user_id: UserId, kind: PostKind) -> StoreResult<Vec<PostId>>;
}
