use async_graphql::{Context, ID, Object, Result};

use crate::dispatch::{ForumChildren, forum_children};
use crate::error::store_failure;
use crate::handlers::subscriptions;
use crate::ids::post_id;
use crate::pagination::{self, has_more};
use crate::schema::run_blocking;
use crate::schema::types::{
    Forum, ForumList, ForumListing, SearchPage, Topic, TopicList, TopicPage, User,
};
use crate::search::search_content;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Subforums of a forum, or its topics when it has no subforums. Without
    /// a usable id the top-level forums are listed.
    async fn bbpress_forums(&self, ctx: &Context<'_>, forum_id: Option<ID>) -> Result<ForumListing> {
        let id = forum_id.as_ref().and_then(post_id);
        let listing = run_blocking(ctx, move |forum, _| {
            forum_children(forum.store.as_ref(), id).map(|children| match children {
                ForumChildren::Forums(records) => ForumListing::Forums(ForumList {
                    forums: records.iter().map(|f| Forum::from_record(f, &forum.settings)).collect(),
                }),
                ForumChildren::Topics(records) => ForumListing::Topics(TopicList {
                    topics: records.iter().map(|t| Topic::from_record(t, &forum.settings)).collect(),
                }),
            })
        })
        .await?
        .map_err(store_failure)?;
        Ok(listing)
    }

    /// One page of a forum's topics, newest first
    async fn bbpress_topics(
        &self,
        ctx: &Context<'_>,
        forum_id: ID,
        #[graphql(default = 0)] offset: i32,
        #[graphql(default = 15)] limit: i32,
    ) -> Result<TopicPage> {
        let window = pagination::window(offset, limit);
        let Some(id) = post_id(&forum_id) else {
            return Ok(TopicPage { topics: Vec::new(), has_more: false });
        };

        let page = run_blocking(ctx, move |forum, _| {
            forum.store.forum_topics(id, Some(window)).map(|page| {
                let topics: Vec<Topic> =
                    page.items.iter().map(|t| Topic::from_record(t, &forum.settings)).collect();
                TopicPage { has_more: has_more(page.total, window, topics.len()), topics }
            })
        })
        .await?
        .map_err(store_failure)?;
        Ok(page)
    }

    /// Keyword search over forum and topic titles and content
    async fn bbpress_search(
        &self,
        ctx: &Context<'_>,
        query: String,
        #[graphql(default = 0)] offset: i32,
        #[graphql(default = 15)] limit: i32,
    ) -> Result<SearchPage> {
        let window = pagination::window(offset, limit);
        let page = run_blocking(ctx, move |forum, _| search_content(forum, &query, window))
            .await?
            .map_err(store_failure)?;
        Ok(page)
    }

    async fn bbpress_forum(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Forum>> {
        let Some(id) = post_id(&id) else {
            return Ok(None);
        };
        let forum = run_blocking(ctx, move |forum, _| {
            forum.store.forum(id).map(|record| record.map(|f| Forum::from_record(&f, &forum.settings)))
        })
        .await?
        .map_err(store_failure)?;
        Ok(forum)
    }

    async fn bbpress_topic(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Topic>> {
        let Some(id) = post_id(&id) else {
            return Ok(None);
        };
        let topic = run_blocking(ctx, move |forum, _| {
            forum.store.topic(id).map(|record| record.map(|t| Topic::from_record(&t, &forum.settings)))
        })
        .await?
        .map_err(store_failure)?;
        Ok(topic)
    }

    /// Whether the caller follows the forum or topic
    async fn bb_press_is_subscribed(&self, ctx: &Context<'_>, object_id: ID) -> Result<bool> {
        let subscribed = run_blocking(ctx, move |forum, actor| {
            subscriptions::is_subscribed(forum, actor, &object_id)
        })
        .await??;
        Ok(subscribed)
    }

    /// The logged-in caller
    async fn viewer(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let user = run_blocking(ctx, |forum, actor| match actor.user_id {
            Some(id) => forum.store.user(id),
            None => Ok(None),
        })
        .await?
        .map_err(store_failure)?;
        Ok(user.as_ref().map(User::from_record))
    }

    async fn bbpress_user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<User>> {
        let Some(id) = post_id(&id) else {
            return Ok(None);
        };
        let user = run_blocking(ctx, move |forum, _| forum.store.user(id))
            .await?
            .map_err(store_failure)?;
        Ok(user.as_ref().map(User::from_record))
    }
}
