use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use bbgraph_types::api::Claims;

use crate::auth::AppState;

/// Who sent the request, as far as the transport can tell.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
    /// Validated token claims; `None` for visitors.
    pub claims: Option<Claims>,
    pub ip: Option<String>,
}

/// Validates an optional bearer token and records the caller.
///
/// No `Authorization` header means a visitor. A header that is not a valid
/// bearer token is rejected outright rather than downgraded to a visitor.
pub async fn identify(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let claims = match req.headers().get(header::AUTHORIZATION) {
        None => None,
        Some(value) => {
            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or(StatusCode::UNAUTHORIZED)?;
            Some(validate_token(&state.jwt_secret, token)?)
        }
    };

    req.extensions_mut().insert(RequestIdentity { claims, ip });
    Ok(next.run(req).await)
}

pub fn validate_token(secret: &str, token: &str) -> Result<Claims, StatusCode> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("rejected token: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    Ok(token_data.claims)
}
