use crate::{
    api::{handlers::message, session::Session},
    auth::{revocation, token::Role},
};
use axum::{http::StatusCode, response::Response, Extension};
use sqlx::PgPool;
use tracing::{error, instrument};

#[utoipa::path(
    get,
    path = "/users/logout",
    responses(
        (status = 200, description = "Token revoked"),
        (status = 401, description = "Missing, invalid or revoked token"),
        (status = 500, description = "Logout failed"),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn logout(pool: Extension<PgPool>, session: Session) -> Response {
    if session.claims.role != Role::User {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    match revocation::revoke(&pool, &session.token, session.claims.expires_at()).await {
        Ok(()) => message(StatusCode::OK, "Logged out"),
        Err(err) => {
            error!("Error revoking token: {err}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Logout failed")
        }
    }
}
