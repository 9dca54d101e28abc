//! Mutation handlers.
//!
//! Plain functions over the forum context and the calling actor. Every
//! expected failure comes back inside the payload; only the subscription
//! toggle reports hard errors, through `ApiError`.

pub mod favorites;
pub mod replies;
pub mod subscriptions;
pub mod topics;
