use bbgraph_types::models::Actor;
use tracing::info;

use crate::context::ForumContext;
use crate::error::store_message;
use crate::ids::post_id;
use crate::schema::types::{FavoriteInput, MutationStatus};

const FAILED: &str = "Failed to update favorites.";

pub fn add_favorite(ctx: &ForumContext, actor: &Actor, input: FavoriteInput) -> MutationStatus {
    let Some(user_id) = actor.user_id else {
        return MutationStatus::fail("You must be logged in.");
    };
    let Some(topic_id) = post_id(&input.topic_id) else {
        return MutationStatus::fail("Topic not found.");
    };

    match ctx.store.topic(topic_id) {
        Ok(Some(_)) => {}
        Ok(None) => return MutationStatus::fail("Topic not found."),
        Err(e) => return MutationStatus::fail(store_message(e, FAILED)),
    }

    let result = ctx.store.is_favorite(user_id, topic_id).and_then(|already| {
        if already {
            Ok(false)
        } else {
            ctx.store.add_favorite(user_id, topic_id).map(|()| true)
        }
    });
    match result {
        Ok(true) => {
            info!("user {} favorited topic {}", user_id, topic_id);
            MutationStatus::ok("Topic added to favorites.")
        }
        Ok(false) => MutationStatus::fail("Topic is already a favorite."),
        Err(e) => MutationStatus::fail(store_message(e, FAILED)),
    }
}

pub fn remove_favorite(ctx: &ForumContext, actor: &Actor, input: FavoriteInput) -> MutationStatus {
    let Some(user_id) = actor.user_id else {
        return MutationStatus::fail("You must be logged in.");
    };
    let Some(topic_id) = post_id(&input.topic_id) else {
        return MutationStatus::fail("Topic not found.");
    };

    let result = ctx.store.is_favorite(user_id, topic_id).and_then(|present| {
        if present {
            ctx.store.remove_favorite(user_id, topic_id).map(|()| true)
        } else {
            Ok(false)
        }
    });
    match result {
        Ok(true) => {
            info!("user {} unfavorited topic {}", user_id, topic_id);
            MutationStatus::ok("Topic removed from favorites.")
        }
        Ok(false) => MutationStatus::fail("Topic is not a favorite."),
        Err(e) => MutationStatus::fail(store_message(e, FAILED)),
    }
}
