mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use bbgraph_api::routes::router;
use bbgraph_api::{AppStateInner, ForumContext, RoleAuthorizer, build_schema};
use bbgraph_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bbgraph=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);
    bootstrap_forums(&db, &config.bootstrap_forums)?;

    // Shared state
    let forum = ForumContext::new(db, Arc::new(RoleAuthorizer), config.forum.clone());
    let state = Arc::new(AppStateInner {
        schema: build_schema(forum.clone()),
        forum,
        jwt_secret: config.jwt_secret.clone(),
    });

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("bbgraph listening on {} (GraphiQL at /graphql)", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

/// Seeds top-level forums into an empty database so a fresh install has
/// somewhere to post.
fn bootstrap_forums(db: &Database, names: &[String]) -> anyhow::Result<()> {
    if names.is_empty() || db.forum_count()? > 0 {
        return Ok(());
    }
    for name in names {
        let id = db.create_forum(name, "", None)?;
        info!("created forum {} ({})", name, id);
    }
    Ok(())
}
