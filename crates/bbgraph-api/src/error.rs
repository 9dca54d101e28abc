use bbgraph_types::store::StoreError;
use tracing::error;

/// Failures surfaced to GraphQL clients as errors rather than status payloads.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Forum subscriptions are not enabled.")]
    SubscriptionsDisabled,

    #[error("You must be logged in.")]
    NotLoggedIn,

    #[error("You do not have permission to edit subscriptions for this user.")]
    SubscriptionForbidden,

    #[error("A valid forum/topic ID is required.")]
    InvalidObjectId,

    #[error("The specified object is not a forum or topic.")]
    NotSubscribable,

    #[error("The forum store is unavailable.")]
    Store,

    #[error("Internal error.")]
    Internal,
}

/// Logs the store failure and hides its details from the client.
pub fn store_failure(err: StoreError) -> ApiError {
    error!("store failure: {}", err);
    ApiError::Store
}

/// Blocking work panicked or was cancelled.
pub fn join_failure(err: tokio::task::JoinError) -> ApiError {
    error!("spawn_blocking join error: {}", err);
    ApiError::Internal
}

/// Client-facing text for a failed store write. Not-found and rejected writes
/// explain themselves; backend failures are logged and replaced by `fallback`.
pub fn store_message(err: StoreError, fallback: &str) -> String {
    match err {
        StoreError::NotFound(what) => format!("{what} not found."),
        StoreError::Rejected(reason) => reason,
        StoreError::Conflict(what) => format!("{what} already exists."),
        StoreError::Backend(e) => {
            error!("store failure: {:#}", e);
            fallback.to_string()
        }
    }
}
