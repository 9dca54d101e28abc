//! GraphQL type definitions for the forum API
//!
//! Output objects are projected from store records on every request; nothing
//! here is cached or written back.

use async_graphql::{ComplexObject, Context, Enum, ID, InputObject, Result, SimpleObject, Union};
use bbgraph_types::models::{
    ForumRecord, Freshness, PostId, PostKind, ReplyRecord, TopicRecord, UserId, UserRecord,
};
use bbgraph_types::settings::ForumSettings;

use crate::error::store_failure;
use crate::ids::to_id;
use crate::ranks;
use crate::schema::{actor, forum_context, run_blocking};

// =============================================================================
// Enums
// =============================================================================

/// Kind of a listed or searched item
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum PostType {
    Forum,
    Topic,
}

/// What a client should request next when opening a forum
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChildrenType {
    /// Nothing inside yet
    #[graphql(name = "NONE")]
    Empty,
    /// The forum holds topics
    Topic,
    /// The forum holds subforums
    Forum,
}

impl ChildrenType {
    /// Subforums win over topics when a forum has both.
    pub fn of(forum: &ForumRecord) -> Self {
        if forum.subforum_count > 0 {
            Self::Forum
        } else if forum.topic_count > 0 {
            Self::Topic
        } else {
            Self::Empty
        }
    }
}

// =============================================================================
// Output Types
// =============================================================================

/// A forum
#[derive(SimpleObject, Clone, Debug)]
pub struct Forum {
    pub id: ID,
    pub title: String,
    pub content: String,
    /// Number of topics in the forum
    pub topic_count: i64,
    /// Topics plus replies
    pub post_count: i64,
    /// Link to the most recent post
    pub freshness_link: Option<String>,
    /// Author of the most recent post
    pub freshness_author: Option<String>,
    /// Parent forum id, when nested
    pub forum_id: Option<ID>,
    /// Own id, set only when nested
    pub subforum_id: Option<ID>,
    #[graphql(name = "type")]
    pub post_type: PostType,
    pub children_type: ChildrenType,
}

impl Forum {
    pub fn from_record(forum: &ForumRecord, settings: &ForumSettings) -> Self {
        let (freshness_link, freshness_author) = freshness_fields(forum.freshness.as_ref(), settings);
        Self {
            id: to_id(forum.id),
            title: forum.title.clone(),
            content: forum.content.clone(),
            topic_count: forum.topic_count as i64,
            post_count: forum.post_count() as i64,
            freshness_link,
            freshness_author,
            forum_id: forum.parent_id.map(to_id),
            subforum_id: forum.parent_id.map(|_| to_id(forum.id)),
            post_type: PostType::Forum,
            children_type: ChildrenType::of(forum),
        }
    }
}

/// A discussion thread
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Topic {
    pub id: ID,
    /// Forum the topic belongs to
    pub forum_id: ID,
    pub title: String,
    pub content: String,
    /// Author display name
    pub author: String,
    pub author_id: ID,
    pub author_role: String,
    /// ISO 8601 creation timestamp
    pub created_at: String,
    pub reply_count: i64,
    /// Replies plus the opening post
    pub post_count: i64,
    /// Distinct participants
    pub voice_count: i64,
    pub tags: Vec<String>,
    pub freshness_link: Option<String>,
    pub freshness_author: Option<String>,
    #[graphql(skip)]
    pub post_id: PostId,
    #[graphql(skip)]
    pub author_user_id: UserId,
    #[graphql(skip)]
    pub ip: Option<String>,
}

impl Topic {
    pub fn from_record(topic: &TopicRecord, settings: &ForumSettings) -> Self {
        let (freshness_link, freshness_author) = freshness_fields(topic.freshness.as_ref(), settings);
        Self {
            id: to_id(topic.id),
            forum_id: to_id(topic.forum_id),
            title: topic.title.clone(),
            content: topic.content.clone(),
            author: topic.author_name.clone(),
            author_id: to_id(topic.author_id),
            author_role: topic.author_role.label().to_string(),
            created_at: topic.created_at.to_rfc3339(),
            reply_count: topic.reply_count as i64,
            post_count: topic.post_count() as i64,
            voice_count: topic.voice_count as i64,
            tags: topic.tags.clone(),
            freshness_link,
            freshness_author,
            post_id: topic.id,
            author_user_id: topic.author_id,
            ip: topic.author_ip.clone(),
        }
    }
}

#[ComplexObject]
impl Topic {
    /// Author IP address, visible to moderators only
    async fn author_ip(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        let forum = forum_context(ctx)?;
        if forum.authorizer.can_view_author_ip(&actor(ctx)) {
            Ok(self.ip.clone())
        } else {
            Ok(None)
        }
    }

    /// Replies in posting order
    async fn replies(&self, ctx: &Context<'_>) -> Result<Vec<Reply>> {
        let topic_id = self.post_id;
        let replies = run_blocking(ctx, move |forum, _| forum.store.topic_replies(topic_id))
            .await?
            .map_err(store_failure)?;
        Ok(replies.iter().map(Reply::from_record).collect())
    }

    /// The author's "total posts" badge, when shown
    async fn total_post_count(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        let author_id = self.author_user_id;
        let badge = run_blocking(ctx, move |forum, _| ranks::total_post_count(forum, author_id))
            .await?
            .map_err(store_failure)?;
        Ok(badge)
    }
}

/// A post inside a topic
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Reply {
    pub id: ID,
    pub topic_id: ID,
    /// Reply this one answers, for threaded replies
    pub reply_to_id: Option<ID>,
    pub content: String,
    /// Author display name
    pub author: String,
    pub author_id: ID,
    pub author_role: String,
    /// ISO 8601 creation timestamp
    pub created_at: String,
    #[graphql(skip)]
    pub author_user_id: UserId,
    #[graphql(skip)]
    pub ip: Option<String>,
}

impl Reply {
    pub fn from_record(reply: &ReplyRecord) -> Self {
        Self {
            id: to_id(reply.id),
            topic_id: to_id(reply.topic_id),
            reply_to_id: reply.reply_to.map(to_id),
            content: reply.content.clone(),
            author: reply.author_name.clone(),
            author_id: to_id(reply.author_id),
            author_role: reply.author_role.label().to_string(),
            created_at: reply.created_at.to_rfc3339(),
            author_user_id: reply.author_id,
            ip: reply.author_ip.clone(),
        }
    }
}

#[ComplexObject]
impl Reply {
    /// Author IP address, visible to moderators only
    async fn author_ip(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        let forum = forum_context(ctx)?;
        if forum.authorizer.can_view_author_ip(&actor(ctx)) {
            Ok(self.ip.clone())
        } else {
            Ok(None)
        }
    }

    /// The author's "total posts" badge, when shown
    async fn total_post_count(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        let author_id = self.author_user_id;
        let badge = run_blocking(ctx, move |forum, _| ranks::total_post_count(forum, author_id))
            .await?
            .map_err(store_failure)?;
        Ok(badge)
    }
}

/// A search hit, forum or topic, flattened into one shape
#[derive(SimpleObject, Clone, Debug)]
pub struct SearchResult {
    pub id: ID,
    #[graphql(name = "type")]
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    /// Forums only
    pub topic_count: Option<i64>,
    pub post_count: i64,
    /// Topics only
    pub voice_count: Option<i64>,
    pub freshness_link: Option<String>,
    pub freshness_author: Option<String>,
    /// ISO 8601 creation timestamp
    pub created_at: String,
    /// Parent of the containing forum
    pub forum_id: Option<ID>,
    /// The forum that contains the hit
    pub subforum_id: Option<ID>,
}

/// Result of `bbpressTopics`
#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "BbPressTopicsResults")]
pub struct TopicPage {
    pub topics: Vec<Topic>,
    pub has_more: bool,
}

/// Result of `bbpressSearch`
#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "BbPressSearchResults")]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub has_more: bool,
}

/// Subforums of a forum
#[derive(SimpleObject, Clone, Debug)]
pub struct ForumList {
    pub forums: Vec<Forum>,
}

/// Topics of a forum
#[derive(SimpleObject, Clone, Debug)]
pub struct TopicList {
    pub topics: Vec<Topic>,
}

/// Children of a forum: either more forums or its topics
#[derive(Union, Clone, Debug)]
pub enum ForumListing {
    Forums(ForumList),
    Topics(TopicList),
}

/// A forum member
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub role: String,
}

impl User {
    pub fn from_record(user: &UserRecord) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role.label().to_string(),
        }
    }
}

#[ComplexObject]
impl User {
    /// Topic ids the user is subscribed to (own profile or moderators)
    #[graphql(name = "bbPressSubscribedTopicIds")]
    async fn subscribed_topic_ids(&self, ctx: &Context<'_>) -> Result<Vec<i64>> {
        self.subscription_ids(ctx, PostKind::Topic).await
    }

    /// Forum ids the user is subscribed to (own profile or moderators)
    #[graphql(name = "bbPressSubscribedForumIds")]
    async fn subscribed_forum_ids(&self, ctx: &Context<'_>) -> Result<Vec<i64>> {
        self.subscription_ids(ctx, PostKind::Forum).await
    }

    /// Topic ids the user marked as favorite
    async fn favorite_topic_ids(&self, ctx: &Context<'_>) -> Result<Vec<i64>> {
        let user_id = self.user_id;
        let ids = run_blocking(ctx, move |forum, _| forum.store.favorite_topic_ids(user_id))
            .await?
            .map_err(store_failure)?;
        Ok(ids)
    }
}

impl User {
    async fn subscription_ids(&self, ctx: &Context<'_>, kind: PostKind) -> Result<Vec<i64>> {
        let user_id = self.user_id;
        let ids = run_blocking(ctx, move |forum, actor| {
            if !forum.settings.subscriptions_enabled
                || !forum.authorizer.can_edit_subscriptions(actor, user_id)
            {
                return Ok(Vec::new());
            }
            forum.store.subscription_ids(user_id, kind)
        })
        .await?
        .map_err(store_failure)?;
        Ok(ids)
    }
}

// =============================================================================
// Mutation payloads
// =============================================================================

/// Result of `createBbpressTopic`
#[derive(SimpleObject, Clone, Debug, PartialEq)]
#[graphql(name = "CreateBbpressTopicPayload")]
pub struct CreateTopicPayload {
    pub topic_id: Option<ID>,
    /// "success" or "error: <reason>"
    pub status: String,
}

/// Result of `createBbpressReply`
#[derive(SimpleObject, Clone, Debug, PartialEq)]
#[graphql(name = "CreateBbpressReplyPayload")]
pub struct CreateReplyPayload {
    pub reply_id: Option<ID>,
    pub status: String,
}

/// Outcome of favorite, update and delete mutations
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct MutationStatus {
    pub success: bool,
    pub message: String,
}

impl MutationStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

/// Result of `updateBbPressSubscription`
#[derive(SimpleObject, Clone, Debug, PartialEq)]
#[graphql(name = "UpdateBbPressSubscriptionPayload")]
pub struct SubscriptionPayload {
    /// The requested state is now in effect
    pub success: bool,
    /// Subscription state read back after the write
    pub subscribed: bool,
    pub object_id: ID,
    pub message: String,
}

// =============================================================================
// Input Types
// =============================================================================

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "CreateBbpressTopicInput")]
pub struct CreateTopicInput {
    pub forum_id: ID,
    pub title: String,
    pub content: String,
    /// Comma separated topic tags
    pub tags: Option<String>,
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "CreateBbpressReplyInput")]
pub struct CreateReplyInput {
    pub topic_id: ID,
    pub content: String,
    /// Reply being answered, for threaded replies
    pub reply_to_id: Option<ID>,
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "BbpressFavoriteInput")]
pub struct FavoriteInput {
    pub topic_id: ID,
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "UpdateBbpressTopicInput")]
pub struct UpdateTopicInput {
    pub topic_id: ID,
    pub title: String,
    pub content: String,
    /// Comma separated topic tags; omitted keeps the current tags
    pub tags: Option<String>,
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "UpdateBbpressReplyInput")]
pub struct UpdateReplyInput {
    pub reply_id: ID,
    pub content: String,
    /// Comma separated tags for the parent topic
    pub tags: Option<String>,
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "DeleteBbpressTopicInput")]
pub struct DeleteTopicInput {
    pub topic_id: ID,
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "DeleteBbpressReplyInput")]
pub struct DeleteReplyInput {
    pub reply_id: ID,
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "UpdateBbPressSubscriptionInput")]
pub struct SubscriptionInput {
    pub object_id: ID,
    /// true to subscribe, false to unsubscribe
    pub subscribe: bool,
}

// =============================================================================
// Helpers
// =============================================================================

/// Permalink of the latest post, anchored to the reply when it is one.
pub fn freshness_link(freshness: &Freshness, settings: &ForumSettings) -> String {
    let base = settings.site_url.trim_end_matches('/');
    if freshness.post_id == freshness.topic_id {
        format!("{}/topic/{}", base, freshness.topic_id)
    } else {
        format!("{}/topic/{}#post-{}", base, freshness.topic_id, freshness.post_id)
    }
}

fn freshness_fields(
    freshness: Option<&Freshness>,
    settings: &ForumSettings,
) -> (Option<String>, Option<String>) {
    match freshness {
        Some(f) => (Some(freshness_link(f, settings)), Some(f.author_name.clone())),
        None => (None, None),
    }
}
