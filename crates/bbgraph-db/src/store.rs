use bbgraph_types::models::{
    ForumRecord, NewReply, NewTopic, Page, PageWindow, PostId, PostKind, ReplyRecord, SearchHit,
    SearchQuery, TopicRecord, UserId, UserRecord,
};
use bbgraph_types::store::{ContentStore, StoreResult};

use crate::Database;
use crate::queries;

impl ContentStore for Database {
    fn post_kind(&self, id: PostId) -> StoreResult<Option<PostKind>> {
        Ok(self.with_conn(|conn| queries::query_post_kind(conn, id))?)
    }

    fn forum(&self, id: PostId) -> StoreResult<Option<ForumRecord>> {
        Ok(self.with_conn(|conn| queries::query_forum(conn, id))?)
    }

    fn topic(&self, id: PostId) -> StoreResult<Option<TopicRecord>> {
        Ok(self.with_conn(|conn| queries::query_topic(conn, id))?)
    }

    fn reply(&self, id: PostId) -> StoreResult<Option<ReplyRecord>> {
        Ok(self.with_conn(|conn| queries::query_reply(conn, id))?)
    }

    fn top_level_forums(&self) -> StoreResult<Vec<ForumRecord>> {
        Ok(self.with_conn(|conn| queries::query_forums_by_parent(conn, None))?)
    }

    fn subforums(&self, parent_id: PostId) -> StoreResult<Vec<ForumRecord>> {
        Ok(self.with_conn(|conn| queries::query_forums_by_parent(conn, Some(parent_id)))?)
    }

    fn forum_topics(
        &self,
        forum_id: PostId,
        window: Option<PageWindow>,
    ) -> StoreResult<Page<TopicRecord>> {
        Ok(self.with_conn(|conn| queries::query_forum_topics(conn, forum_id, window))?)
    }

    fn topic_replies(&self, topic_id: PostId) -> StoreResult<Vec<ReplyRecord>> {
        Ok(self.with_conn(|conn| queries::query_topic_replies(conn, topic_id))?)
    }

    fn search(&self, query: &SearchQuery) -> StoreResult<Page<SearchHit>> {
        Ok(self.with_conn(|conn| queries::search(conn, query))?)
    }

    fn insert_topic(&self, topic: NewTopic) -> StoreResult<PostId> {
        Ok(self.with_conn(|conn| queries::insert_topic(conn, &topic))?)
    }

    fn insert_reply(&self, reply: NewReply) -> StoreResult<PostId> {
        Ok(self.with_conn(|conn| queries::insert_reply(conn, &reply))?)
    }

    fn update_topic(&self, id: PostId, title: &str, content: &str) -> StoreResult<()> {
        Ok(self.with_conn(|conn| queries::update_topic(conn, id, title, content))?)
    }

    fn update_reply(&self, id: PostId, content: &str) -> StoreResult<()> {
        Ok(self.with_conn(|conn| queries::update_reply(conn, id, content))?)
    }

    fn delete_post(&self, id: PostId) -> StoreResult<bool> {
        Ok(self.with_conn(|conn| queries::delete_post(conn, id))?)
    }

    fn set_topic_tags(&self, topic_id: PostId, tags: &[String]) -> StoreResult<()> {
        Ok(self.with_conn_mut(|conn| queries::set_topic_tags(conn, topic_id, tags))?)
    }

    fn user(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.with_conn(|conn| queries::query_user_by_id(conn, id))?)
    }

    fn user_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.with_conn(|conn| queries::query_user_by_username(conn, username))?)
    }

    fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<UserRecord> {
        Ok(self.with_conn_mut(|conn| queries::insert_user(conn, username, password_hash))?)
    }

    fn user_post_count(&self, id: UserId) -> StoreResult<u64> {
        Ok(self.with_conn(|conn| queries::query_user_post_count(conn, id))?)
    }

    fn is_favorite(&self, user_id: UserId, topic_id: PostId) -> StoreResult<bool> {
        Ok(self.with_conn(|conn| queries::is_favorite(conn, user_id, topic_id))?)
    }

    fn add_favorite(&self, user_id: UserId, topic_id: PostId) -> StoreResult<()> {
        Ok(self.with_conn(|conn| queries::add_favorite(conn, user_id, topic_id))?)
    }

    fn remove_favorite(&self, user_id: UserId, topic_id: PostId) -> StoreResult<()> {
        Ok(self.with_conn(|conn| queries::remove_favorite(conn, user_id, topic_id))?)
    }

    fn favorite_topic_ids(&self, user_id: UserId) -> StoreResult<Vec<PostId>> {
        Ok(self.with_conn(|conn| queries::query_favorite_topic_ids(conn, user_id))?)
    }

    fn is_subscribed(&self, user_id: UserId, object_id: PostId) -> StoreResult<bool> {
        Ok(self.with_conn(|conn| queries::is_subscribed(conn, user_id, object_id))?)
    }

    fn add_subscription(&self, user_id: UserId, object_id: PostId) -> StoreResult<()> {
        Ok(self.with_conn(|conn| queries::add_subscription(conn, user_id, object_id))?)
    }

    fn remove_subscription(&self, user_id: UserId, object_id: PostId) -> StoreResult<()> {
        Ok(self.with_conn(|conn| queries::remove_subscription(conn, user_id, object_id))?)
    }

    fn subscription_ids(&self, user_id: UserId, kind: PostKind) -> StoreResult<Vec<PostId>> {
        Ok(self.with_conn(|conn| queries::query_subscription_ids(conn, user_id, kind))?)
    }
}
