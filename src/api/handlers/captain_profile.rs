use crate::{
    api::{
        handlers::{message, types::Captain},
        session::Session,
    },
    auth::token::Role,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use sqlx::{postgres::PgRow, PgPool};
use tracing::{error, info_span, instrument, Instrument};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/captains/profile",
    responses(
        (status = 200, description = "Profile of the authenticated captain", body = Captain),
        (status = 401, description = "Missing, invalid or revoked token"),
        (status = 500, description = "Profile lookup failed"),
    ),
    tag = "captains"
)]
#[instrument(skip_all)]
pub async fn profile(pool: Extension<PgPool>, session: Session) -> Response {
    if session.claims.role != Role::Captain {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let row = match fetch_captain(&pool, session.claims.sub).await {
        Ok(Some(row)) => row,
        // Token subject no longer exists, treat as an invalid token
        Ok(None) => return message(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Err(err) => {
            error!("Error fetching captain: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Profile lookup failed");
        }
    };

    match Captain::from_row(&row) {
        Ok(captain) => (StatusCode::OK, Json(captain)).into_response(),
        Err(err) => {
            error!("Error decoding captain row: {err}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Profile lookup failed")
        }
    }
}

async fn fetch_captain(pool: &PgPool, id: Uuid) -> Result<Option<PgRow>, sqlx::Error> {
    let query = r"
        SELECT id, first_name, last_name, email, status,
               vehicle_color, vehicle_plate, vehicle_capacity, vehicle_type
        FROM captains
        WHERE id = $1
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
}
