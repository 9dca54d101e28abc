//! GraphQL resolver layer for a bbPress-style forum: forums, topics, replies,
//! tags, favorites and subscriptions over a pluggable `ContentStore`.

pub mod auth;
pub mod authz;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod graphql;
pub mod handlers;
pub mod ids;
pub mod middleware;
pub mod pagination;
pub mod ranks;
pub mod routes;
pub mod sanitize;
pub mod schema;
pub mod search;
pub mod tags;

pub use auth::{AppState, AppStateInner};
pub use authz::{Authorizer, RoleAuthorizer};
pub use context::ForumContext;
pub use schema::{ForumSchema, build_schema};
