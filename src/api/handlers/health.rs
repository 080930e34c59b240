use crate::api::GIT_COMMIT_HASH;
use axum::{
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgPool};
use tracing::{error, info_span, instrument, Instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    pub name: String,
    pub version: String,
    pub commit: String,
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are healthy", body = Health),
        (status = 503, description = "Database is unreachable", body = Health),
    ),
    tag = "health"
)]
#[instrument(skip_all)]
pub async fn health(method: Method, pool: Extension<PgPool>) -> Response {
    let database_ok = check_database(&pool).await;

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let mut headers = HeaderMap::new();
    let app = format!("{}:{}", env!("CARGO_PKG_VERSION"), GIT_COMMIT_HASH);
    if let Ok(value) = HeaderValue::from_str(&app) {
        headers.insert(HeaderName::from_static("x-app"), value);
    }

    // OPTIONS probes only want the status and headers
    if method == Method::OPTIONS {
        return (status, headers).into_response();
    }

    let health = Health {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: GIT_COMMIT_HASH.to_string(),
        database: if database_ok { "ok" } else { "unavailable" }.to_string(),
    };

    (status, headers, Json(health)).into_response()
}

async fn check_database(pool: &PgPool) -> bool {
    let span = info_span!("db.acquire", db.system = "postgresql");
    let mut conn = match pool.acquire().instrument(span).await {
        Ok(conn) => conn,
        Err(err) => {
            error!("Error acquiring connection: {err}");
            return false;
        }
    };

    let span = info_span!("db.ping", db.system = "postgresql");
    match conn.ping().instrument(span).await {
        Ok(()) => true,
        Err(err) => {
            error!("Error pinging database: {err}");
            false
        }
    }
}
