//! Bearer token extractor for the authenticated routes.
//!
//! Verifies the signature and expiry first, then checks the token against
//! the revocation blacklist. Role and account checks stay in the handlers.

use crate::{
    api::handlers::bearer_token,
    auth::{revocation, token, token::Claims},
    cli::globals::GlobalArgs,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Json,
    Extension, RequestPartsExt,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::{debug, error};

pub struct Session {
    pub token: String,
    pub claims: Claims,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Extension(pool) = parts
            .extract::<Extension<PgPool>>()
            .await
            .map_err(|err| internal(&format!("Missing database pool extension: {err}")))?;

        let Extension(globals) = parts
            .extract::<Extension<GlobalArgs>>()
            .await
            .map_err(|err| internal(&format!("Missing globals extension: {err}")))?;

        let token = bearer_token(&parts.headers)
            .map(ToString::to_string)
            .ok_or_else(unauthorized)?;

        let claims = token::verify(&globals.jwt_secret, &token).map_err(|err| {
            debug!("Token verification failed: {err}");
            unauthorized()
        })?;

        match revocation::is_revoked(&pool, &token).await {
            Ok(false) => Ok(Self { token, claims }),
            Ok(true) => {
                debug!("Rejecting revoked token for {}", claims.sub);
                Err(unauthorized())
            }
            Err(err) => Err(internal(&format!("Revocation lookup failed: {err}"))),
        }
    }
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthorized" })),
    )
}

fn internal(log_line: &str) -> (StatusCode, Json<Value>) {
    error!("{log_line}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Authentication check failed" })),
    )
}
