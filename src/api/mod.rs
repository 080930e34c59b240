//! HTTP surface of the service, routes, middleware and the server loop.

use crate::{auth::revocation, cli::globals::GlobalArgs};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug, error, info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
pub mod session;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH_SHORT {
    Some(hash) => hash,
    None => "unknown",
};

const X_REQUEST_ID: &str = "x-request-id";

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::user_register::register,
        handlers::user_login::login,
        handlers::user_profile::profile,
        handlers::user_logout::logout,
        handlers::captain_register::register,
        handlers::captain_login::login,
        handlers::captain_profile::profile,
        handlers::captain_logout::logout,
    ),
    components(schemas(
        handlers::health::Health,
        handlers::types::Fullname,
        handlers::types::User,
        handlers::types::UserAuth,
        handlers::types::Captain,
        handlers::types::CaptainAuth,
        handlers::types::CaptainStatus,
        handlers::types::Vehicle,
        handlers::types::VehicleType,
        handlers::user_register::UserRegister,
        handlers::user_login::UserLogin,
        handlers::captain_register::CaptainRegister,
        handlers::captain_login::CaptainLogin,
    )),
    tags(
        (name = "users", description = "Rider registration and sessions"),
        (name = "captains", description = "Driver registration and sessions"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the router with all routes, middleware and shared extensions
#[must_use]
pub fn router(pool: PgPool, globals: GlobalArgs) -> Router {
    let cors = CorsLayer::new()
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index))
        .route("/users/register", post(handlers::user_register::register))
        .route("/users/login", post(handlers::user_login::login))
        .route("/users/profile", get(handlers::user_profile::profile))
        .route("/users/logout", get(handlers::user_logout::logout))
        .route(
            "/captains/register",
            post(handlers::captain_register::register),
        )
        .route("/captains/login", post(handlers::captain_login::login))
        .route(
            "/captains/profile",
            get(handlers::captain_profile::profile),
        )
        .route("/captains/logout", get(handlers::captain_logout::logout))
        .route(
            "/health",
            get(handlers::health::health).options(handlers::health::health),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(X_REQUEST_ID),
                    |_request: &Request<Body>| {
                        HeaderValue::from_str(&Ulid::new().to_string()).ok()
                    },
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    X_REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(globals))
                .layer(Extension(pool)),
        )
}

/// Connect to the database, start the token sweeper and serve until shutdown
///
/// # Errors
/// Returns an error if the database or the listener cannot be set up
pub async fn new(port: u16, dsn: &str, globals: &GlobalArgs) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to the database")?;

    // Hourly sweep so the blacklist only holds tokens that are still alive
    let sweeper_pool = pool.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60 * 60));
        loop {
            ticker.tick().await;
            match revocation::purge_expired(&sweeper_pool).await {
                Ok(0) => (),
                Ok(purged) => debug!("Purged {purged} expired tokens from the blacklist"),
                Err(err) => error!("Error purging expired tokens: {err}"),
            }
        }
    });

    let app = router(pool, globals.clone());

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .context("Failed to bind listener")?;

    info!("Listening on *:{port}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn index() -> &'static str {
    env!("CARGO_PKG_NAME")
}

fn make_span(request: &Request<Body>) -> Span {
    let method = request.method();
    let uri = request.uri();

    // prefer the route pattern over the raw path
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| uri.path(), MatchedPath::as_str);

    info_span!("http.request", http.method = %method, http.route = route, http.uri = %uri)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the shutdown signal: {err}");
        return;
    }

    info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::openapi;

    #[test]
    fn test_openapi_has_all_routes() {
        let spec = openapi();

        for path in [
            "/health",
            "/users/register",
            "/users/login",
            "/users/profile",
            "/users/logout",
            "/captains/register",
            "/captains/login",
            "/captains/profile",
            "/captains/logout",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_openapi_components() {
        let spec = openapi();
        let components = spec.components.expect("components");

        for schema in ["UserAuth", "CaptainAuth", "Vehicle", "Health"] {
            assert!(components.schemas.contains_key(schema), "missing {schema}");
        }
    }
}
