use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{self, AppState};
use crate::graphql;
use crate::middleware::identify;

pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let graphql_routes = Router::new()
        .route("/graphql", get(graphql::playground).post(graphql::graphql_handler))
        .layer(middleware::from_fn_with_state(state.clone(), identify));

    Router::new()
        .merge(auth_routes)
        .merge(graphql_routes)
        .with_state(state)
}
