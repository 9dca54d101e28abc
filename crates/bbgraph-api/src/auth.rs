use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand_core::OsRng;
use tracing::{error, info, warn};

use bbgraph_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use bbgraph_types::models::{UserId, UserRecord};
use bbgraph_types::store::StoreError;

use crate::context::ForumContext;
use crate::schema::ForumSchema;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub forum: ForumContext,
    pub schema: ForumSchema,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let username = req.username.trim();
    if username.chars().count() < 3 || username.chars().count() > 32 {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.len() < 8 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let username = username.to_string();
    let store = state.forum.store.clone();
    let user = tokio::task::spawn_blocking(move || -> Result<UserRecord, StatusCode> {
        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| {
                error!("password hashing failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .to_string();

        store.create_user(&username, &password_hash).map_err(|e| match e {
            StoreError::Conflict(_) => {
                info!("registration refused, username {} is taken", username);
                StatusCode::CONFLICT
            }
            other => internal(other),
        })
    })
    .await
    .map_err(join_failure)??;

    let token = create_token(&state.jwt_secret, user.id, &user.username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    info!("registered user {} ({}) as {}", user.id, user.username, user.role.as_str());
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            role: user.role,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let store = state.forum.store.clone();
    let user = tokio::task::spawn_blocking(move || -> Result<UserRecord, StatusCode> {
        let user = store
            .user_by_username(req.username.trim())
            .map_err(internal)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| {
                warn!("failed login for {}", user.username);
                StatusCode::UNAUTHORIZED
            })?;
        Ok(user)
    })
    .await
    .map_err(join_failure)??;

    let token = create_token(&state.jwt_secret, user.id, &user.username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        token,
    }))
}

pub fn create_token(secret: &str, user_id: UserId, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn internal(err: StoreError) -> StatusCode {
    error!("store failure during auth: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR
}

pub(crate) fn join_failure(err: tokio::task::JoinError) -> StatusCode {
    error!("spawn_blocking join error: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR
}
