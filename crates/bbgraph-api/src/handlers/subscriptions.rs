use async_graphql::ID;
use bbgraph_types::models::{Actor, PostKind};
use tracing::{debug, info};

use crate::context::ForumContext;
use crate::error::{ApiError, store_failure};
use crate::ids::{post_id, to_id};
use crate::schema::types::{SubscriptionInput, SubscriptionPayload};

/// Whether the actor follows a forum or topic. Visitors, disabled
/// subscriptions and unusable ids all read as `false`.
pub fn is_subscribed(ctx: &ForumContext, actor: &Actor, object_id: &ID) -> Result<bool, ApiError> {
    if !ctx.settings.subscriptions_enabled {
        return Ok(false);
    }
    let (Some(user_id), Some(object_id)) = (actor.user_id, post_id(object_id)) else {
        return Ok(false);
    };
    ctx.store.is_subscribed(user_id, object_id).map_err(store_failure)
}

/// Brings the actor's subscription to the requested state. Writes only when
/// the state differs and reports what the store holds afterwards.
pub fn update_subscription(
    ctx: &ForumContext,
    actor: &Actor,
    input: SubscriptionInput,
) -> Result<SubscriptionPayload, ApiError> {
    if !ctx.settings.subscriptions_enabled {
        return Err(ApiError::SubscriptionsDisabled);
    }
    let user_id = actor.user_id.ok_or(ApiError::NotLoggedIn)?;
    if !ctx.authorizer.can_edit_subscriptions(actor, user_id) {
        return Err(ApiError::SubscriptionForbidden);
    }
    let object_id = post_id(&input.object_id).ok_or(ApiError::InvalidObjectId)?;

    match ctx.store.post_kind(object_id).map_err(store_failure)? {
        Some(PostKind::Forum | PostKind::Topic) => {}
        _ => return Err(ApiError::NotSubscribable),
    }

    let before = ctx.store.is_subscribed(user_id, object_id).map_err(store_failure)?;
    if input.subscribe && !before {
        ctx.store.add_subscription(user_id, object_id).map_err(store_failure)?;
        info!("user {} subscribed to {}", user_id, object_id);
    } else if !input.subscribe && before {
        ctx.store.remove_subscription(user_id, object_id).map_err(store_failure)?;
        info!("user {} unsubscribed from {}", user_id, object_id);
    } else {
        debug!("subscription of user {} to {} already in requested state", user_id, object_id);
    }

    let subscribed = ctx.store.is_subscribed(user_id, object_id).map_err(store_failure)?;
    Ok(SubscriptionPayload {
        success: subscribed == input.subscribe,
        subscribed,
        object_id: to_id(object_id),
        message: if subscribed { "Subscribed." } else { "Unsubscribed." }.to_string(),
    })
}
