use bbgraph_types::models::{Actor, NewTopic, TopicRecord};
use bbgraph_types::store::StoreError;
use tracing::{info, warn};

use crate::authz::ContentItem;
use crate::context::ForumContext;
use crate::error::store_message;
use crate::ids::{post_id, to_id};
use crate::sanitize;
use crate::schema::types::{
    CreateTopicInput, CreateTopicPayload, DeleteTopicInput, MutationStatus, UpdateTopicInput,
};
use crate::tags::apply_tags;

fn rejected(reason: impl std::fmt::Display) -> CreateTopicPayload {
    CreateTopicPayload { topic_id: None, status: format!("error: {reason}") }
}

pub fn create_topic(ctx: &ForumContext, actor: &Actor, input: CreateTopicInput) -> CreateTopicPayload {
    let title = sanitize::text_field(&input.title);
    let content = sanitize::textarea(&input.content);
    if title.is_empty() {
        return rejected("Your topic needs a title.");
    }
    if content.is_empty() {
        return rejected("Your topic cannot be empty.");
    }

    let Some(forum_id) = post_id(&input.forum_id) else {
        return rejected("Forum not found.");
    };
    let forum = match ctx.store.forum(forum_id) {
        Ok(Some(forum)) => forum,
        Ok(None) => return rejected("Forum not found."),
        Err(e) => return rejected(store_message(e, "Failed to create topic.")),
    };

    let author_id = match actor.user_id {
        Some(id) if ctx.authorizer.can_create_topic(actor, &forum) => id,
        _ => {
            warn!("topic creation in forum {} denied for {:?}", forum_id, actor.user_id);
            return rejected("You do not have permission to create a topic.");
        }
    };

    let new_topic = NewTopic {
        forum_id,
        author_id,
        title,
        content,
        author_ip: actor.ip.clone(),
    };
    let topic_id = match ctx.store.insert_topic(new_topic) {
        Ok(id) => id,
        Err(e) => return rejected(store_message(e, "Failed to create topic.")),
    };

    if let Err(e) = apply_tags(ctx, topic_id, input.tags.as_deref()) {
        warn!("topic {} created but tags were not saved: {}", topic_id, e);
    }

    info!("user {} created topic {} in forum {}", author_id, topic_id, forum_id);
    CreateTopicPayload { topic_id: Some(to_id(topic_id)), status: "success".into() }
}

pub fn update_topic(ctx: &ForumContext, actor: &Actor, input: UpdateTopicInput) -> MutationStatus {
    let title = sanitize::text_field(&input.title);
    let content = sanitize::textarea(&input.content);
    if title.is_empty() {
        return MutationStatus::fail("Title cannot be empty.");
    }
    if content.is_empty() {
        return MutationStatus::fail("Content cannot be empty.");
    }

    let topic = match find_topic(ctx, &input.topic_id) {
        Ok(topic) => topic,
        Err(status) => return status,
    };
    if !ctx.authorizer.can_edit(actor, &ContentItem::from(&topic)) {
        warn!("edit of topic {} denied for {:?}", topic.id, actor.user_id);
        return MutationStatus::fail("You do not have permission to edit this topic.");
    }

    if let Err(e) = ctx.store.update_topic(topic.id, &title, &content) {
        let reason = store_message(e, "store error");
        return MutationStatus::fail(format!("Failed to update topic: {reason}"));
    }
    if let Err(e) = apply_tags(ctx, topic.id, input.tags.as_deref()) {
        warn!("topic {} updated but tags were not saved: {}", topic.id, e);
    }

    info!("topic {} updated by {:?}", topic.id, actor.user_id);
    MutationStatus::ok("Topic updated successfully.")
}

pub fn delete_topic(ctx: &ForumContext, actor: &Actor, input: DeleteTopicInput) -> MutationStatus {
    let topic = match find_topic(ctx, &input.topic_id) {
        Ok(topic) => topic,
        Err(status) => return status,
    };
    if !ctx.authorizer.can_delete(actor, &ContentItem::from(&topic)) {
        warn!("delete of topic {} denied for {:?}", topic.id, actor.user_id);
        return MutationStatus::fail("You do not have permission to delete this topic.");
    }

    match ctx.store.delete_post(topic.id) {
        Ok(true) => {
            info!("topic {} deleted by {:?}", topic.id, actor.user_id);
            MutationStatus::ok("Topic deleted successfully.")
        }
        Ok(false) => MutationStatus::fail("Failed to delete topic."),
        Err(e) => MutationStatus::fail(store_message(e, "Failed to delete topic.")),
    }
}

fn find_topic(ctx: &ForumContext, id: &async_graphql::ID) -> Result<TopicRecord, MutationStatus> {
    let not_found = || MutationStatus::fail("Topic not found.");
    let id = post_id(id).ok_or_else(not_found)?;
    match ctx.store.topic(id) {
        Ok(Some(topic)) => Ok(topic),
        Ok(None) | Err(StoreError::NotFound(_)) => Err(not_found()),
        Err(e) => Err(MutationStatus::fail(store_message(e, "Failed to load topic."))),
    }
}
