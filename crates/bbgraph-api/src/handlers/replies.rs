use bbgraph_types::models::{Actor, NewReply, ReplyRecord};
use bbgraph_types::store::StoreError;
use tracing::{info, warn};

use crate::authz::ContentItem;
use crate::context::ForumContext;
use crate::error::store_message;
use crate::ids::{post_id, to_id};
use crate::sanitize;
use crate::schema::types::{
    CreateReplyInput, CreateReplyPayload, DeleteReplyInput, MutationStatus, UpdateReplyInput,
};
use crate::tags::apply_tags;

fn rejected(status: impl Into<String>) -> CreateReplyPayload {
    CreateReplyPayload { reply_id: None, status: status.into() }
}

pub fn create_reply(ctx: &ForumContext, actor: &Actor, input: CreateReplyInput) -> CreateReplyPayload {
    let content = sanitize::textarea(&input.content);
    if content.is_empty() {
        return rejected("Content cannot be empty.");
    }

    let Some(topic_id) = post_id(&input.topic_id) else {
        return rejected("error: Topic not found.");
    };
    let topic = match ctx.store.topic(topic_id) {
        Ok(Some(topic)) => topic,
        Ok(None) => return rejected("error: Topic not found."),
        Err(e) => return rejected(format!("error: {}", store_message(e, "Failed to create reply."))),
    };
    let forum = match ctx.store.forum(topic.forum_id) {
        Ok(Some(forum)) => forum,
        Ok(None) => return rejected("error: Forum not found."),
        Err(e) => return rejected(format!("error: {}", store_message(e, "Failed to create reply."))),
    };

    let author_id = match actor.user_id {
        Some(id) if ctx.authorizer.can_create_reply(actor, &forum, &topic) => id,
        _ => {
            warn!("reply to topic {} denied for {:?}", topic_id, actor.user_id);
            return rejected("error: You do not have permission to reply to this topic.");
        }
    };

    let new_reply = NewReply {
        topic_id,
        author_id,
        reply_to: input.reply_to_id.as_ref().and_then(post_id),
        content,
        author_ip: actor.ip.clone(),
    };
    match ctx.store.insert_reply(new_reply) {
        Ok(reply_id) => {
            info!("user {} replied to topic {} with reply {}", author_id, topic_id, reply_id);
            CreateReplyPayload { reply_id: Some(to_id(reply_id)), status: "success".into() }
        }
        Err(e) => rejected(format!("error: {}", store_message(e, "Failed to create reply."))),
    }
}

pub fn update_reply(ctx: &ForumContext, actor: &Actor, input: UpdateReplyInput) -> MutationStatus {
    let content = sanitize::textarea(&input.content);
    if content.is_empty() {
        return MutationStatus::fail("Content cannot be empty.");
    }

    let reply = match find_reply(ctx, &input.reply_id) {
        Ok(reply) => reply,
        Err(status) => return status,
    };
    if !ctx.authorizer.can_edit(actor, &ContentItem::from(&reply)) {
        warn!("edit of reply {} denied for {:?}", reply.id, actor.user_id);
        return MutationStatus::fail("You do not have permission to edit this reply.");
    }

    if let Err(e) = ctx.store.update_reply(reply.id, &content) {
        let reason = store_message(e, "store error");
        return MutationStatus::fail(format!("Failed to update reply: {reason}"));
    }
    // tags sent with a reply belong to its topic
    if let Err(e) = apply_tags(ctx, reply.topic_id, input.tags.as_deref()) {
        warn!("reply {} updated but tags for topic {} were not saved: {}", reply.id, reply.topic_id, e);
    }

    info!("reply {} updated by {:?}", reply.id, actor.user_id);
    MutationStatus::ok("Reply updated successfully.")
}

pub fn delete_reply(ctx: &ForumContext, actor: &Actor, input: DeleteReplyInput) -> MutationStatus {
    let reply = match find_reply(ctx, &input.reply_id) {
        Ok(reply) => reply,
        Err(status) => return status,
    };
    if !ctx.authorizer.can_delete(actor, &ContentItem::from(&reply)) {
        warn!("delete of reply {} denied for {:?}", reply.id, actor.user_id);
        return MutationStatus::fail("You do not have permission to delete this reply.");
    }

    match ctx.store.delete_post(reply.id) {
        Ok(true) => {
            info!("reply {} deleted by {:?}", reply.id, actor.user_id);
            MutationStatus::ok("Reply deleted successfully.")
        }
        Ok(false) => MutationStatus::fail("Failed to delete reply."),
        Err(e) => MutationStatus::fail(store_message(e, "Failed to delete reply.")),
    }
}

fn find_reply(ctx: &ForumContext, id: &async_graphql::ID) -> Result<ReplyRecord, MutationStatus> {
    let not_found = || MutationStatus::fail("Reply not found.");
    let id = post_id(id).ok_or_else(not_found)?;
    match ctx.store.reply(id) {
        Ok(Some(reply)) => Ok(reply),
        Ok(None) | Err(StoreError::NotFound(_)) => Err(not_found()),
        Err(e) => Err(MutationStatus::fail(store_message(e, "Failed to load reply."))),
    }
}
