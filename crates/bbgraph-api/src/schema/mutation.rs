use async_graphql::{Context, Object, Result};

use crate::handlers::{favorites, replies, subscriptions, topics};
use crate::schema::run_blocking;
use crate::schema::types::{
    CreateReplyInput, CreateReplyPayload, CreateTopicInput, CreateTopicPayload, DeleteReplyInput,
    DeleteTopicInput, FavoriteInput, MutationStatus, SubscriptionInput, SubscriptionPayload,
    UpdateReplyInput, UpdateTopicInput,
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_bbpress_topic(&self, ctx: &Context<'_>, input: CreateTopicInput) -> Result<CreateTopicPayload> {
        run_blocking(ctx, move |forum, actor| topics::create_topic(forum, actor, input)).await
    }

    async fn create_bbpress_reply(&self, ctx: &Context<'_>, input: CreateReplyInput) -> Result<CreateReplyPayload> {
        run_blocking(ctx, move |forum, actor| replies::create_reply(forum, actor, input)).await
    }

    async fn create_bbpress_favorite(&self, ctx: &Context<'_>, input: FavoriteInput) -> Result<MutationStatus> {
        run_blocking(ctx, move |forum, actor| favorites::add_favorite(forum, actor, input)).await
    }

    async fn delete_bbpress_favorite(&self, ctx: &Context<'_>, input: FavoriteInput) -> Result<MutationStatus> {
        run_blocking(ctx, move |forum, actor| favorites::remove_favorite(forum, actor, input)).await
    }

    async fn update_bbpress_topic(&self, ctx: &Context<'_>, input: UpdateTopicInput) -> Result<MutationStatus> {
        run_blocking(ctx, move |forum, actor| topics::update_topic(forum, actor, input)).await
    }

    async fn delete_bbpress_topic(&self, ctx: &Context<'_>, input: DeleteTopicInput) -> Result<MutationStatus> {
        run_blocking(ctx, move |forum, actor| topics::delete_topic(forum, actor, input)).await
    }

    async fn update_bbpress_reply(&self, ctx: &Context<'_>, input: UpdateReplyInput) -> Result<MutationStatus> {
        run_blocking(ctx, move |forum, actor| replies::update_reply(forum, actor, input)).await
    }

    async fn delete_bbpress_reply(&self, ctx: &Context<'_>, input: DeleteReplyInput) -> Result<MutationStatus> {
        run_blocking(ctx, move |forum, actor| replies::delete_reply(forum, actor, input)).await
    }

    /// Subscribe to or unsubscribe from a forum or topic
    async fn update_bb_press_subscription(
        &self,
        ctx: &Context<'_>,
        input: SubscriptionInput,
    ) -> Result<SubscriptionPayload> {
        let payload = run_blocking(ctx, move |forum, actor| {
            subscriptions::update_subscription(forum, actor, input)
        })
        .await??;
        Ok(payload)
    }
}
