//! GraphQL schema for the forum API.
//!
//! `ForumContext` is attached once as schema data; the calling `Actor` is
//! attached per request. Resolvers that touch the store hop onto
//! `spawn_blocking` because the store is synchronous.

pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{Context, EmptySubscription, Result, Schema};
use bbgraph_types::models::Actor;

use crate::context::ForumContext;
use crate::error::join_failure;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type ForumSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(forum: ForumContext) -> ForumSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(forum)
        .finish()
}

pub(crate) fn forum_context<'a>(ctx: &Context<'a>) -> Result<&'a ForumContext> {
    ctx.data::<ForumContext>()
}

/// The caller, or a visitor when the request carried no identity.
pub(crate) fn actor(ctx: &Context<'_>) -> Actor {
    ctx.data_opt::<Actor>().cloned().unwrap_or_else(Actor::anonymous)
}

/// Runs store work off the async runtime with owned copies of the context
/// and the caller.
pub(crate) async fn run_blocking<T, F>(ctx: &Context<'_>, work: F) -> Result<T>
where
    F: FnOnce(&ForumContext, &Actor) -> T + Send + 'static,
    T: Send + 'static,
{
    let forum = forum_context(ctx)?.clone();
    let actor = actor(ctx);
    let out = tokio::task::spawn_blocking(move || work(&forum, &actor))
        .await
        .map_err(join_failure)?;
    Ok(out)
}
