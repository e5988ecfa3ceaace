use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use common_auth::{TokenConfig, TokenService};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

use profile_service::authenticator::HttpAuthenticator;
use profile_service::config::load_app_config;
use profile_service::metrics::AuthMetrics;
use profile_service::role_store::RoleStore;
use profile_service::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = load_app_config()?;

    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let roles = RoleStore::new(db);
    roles.ensure_schema().await?;

    let tokens = Arc::new(TokenService::new(
        TokenConfig::new(config.jwt_secret.clone())
            .with_ttl_seconds(config.token_ttl_minutes * 60),
    ));
    let authenticator = Arc::new(HttpAuthenticator::new(
        config.authenticator_url.clone(),
        config.authenticator_timeout,
    )?);
    let metrics = Arc::new(AuthMetrics::new()?);

    let state = AppState {
        tokens,
        authenticator,
        roles,
        metrics,
    };

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:5173"),
        ]))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static("authorization"),
        ]);

    let app = router(state).layer(cors);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let ip: std::net::IpAddr = host.parse()?;
    let addr = SocketAddr::from((ip, port));

    println!("starting profile-service on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
