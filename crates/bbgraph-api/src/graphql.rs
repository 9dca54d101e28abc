use async_graphql::http::GraphiQLSource;
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::{error, warn};

use bbgraph_types::models::Actor;

use crate::auth::{AppState, join_failure};
use crate::middleware::RequestIdentity;

pub async fn graphql_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Json(request): Json<async_graphql::Request>,
) -> Result<Json<async_graphql::Response>, StatusCode> {
    let lookup = state.clone();
    let actor = tokio::task::spawn_blocking(move || resolve_actor(&lookup, &identity))
        .await
        .map_err(join_failure)??;
    let response = state.schema.execute(request.data(actor)).await;
    Ok(Json(response))
}

pub async fn playground() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Turns token claims into an actor with the user's current role. Tokens of
/// deleted accounts are refused.
fn resolve_actor(state: &AppState, identity: &RequestIdentity) -> Result<Actor, StatusCode> {
    let Some(claims) = &identity.claims else {
        return Ok(Actor::anonymous().with_ip(identity.ip.clone()));
    };

    let user = state
        .forum
        .store
        .user(claims.sub)
        .map_err(|e| {
            error!("failed to load user {}: {}", claims.sub, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            warn!("token for unknown user {}", claims.sub);
            StatusCode::UNAUTHORIZED
        })?;

    Ok(Actor::user(user.id, user.role).with_ip(identity.ip.clone()))
}
