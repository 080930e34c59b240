use crate::{
    api::handlers::{
        message,
        types::{Captain, CaptainAuth},
        valid_email,
    },
    auth::{
        password,
        token::{self, Role},
    },
    cli::globals::GlobalArgs,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{error, info_span, instrument, Instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CaptainLogin {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/captains/login",
    request_body = CaptainLogin,
    responses(
        (status = 200, description = "Login successful", body = CaptainAuth),
        (status = 400, description = "Missing payload or invalid fields"),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Login failed"),
    ),
    tag = "captains"
)]
#[instrument(skip_all)]
pub async fn login(
    pool: Extension<PgPool>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<CaptainLogin>>,
) -> Response {
    let Some(Json(input)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let email = input.email.trim().to_lowercase();

    if !valid_email(&email) {
        return message(StatusCode::BAD_REQUEST, "Invalid email");
    }

    let row = match fetch_captain(&pool, &email).await {
        Ok(Some(row)) => row,
        Ok(None) => return message(StatusCode::UNAUTHORIZED, "Invalid email or password"),
        Err(err) => {
            error!("Error fetching captain: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };

    let password_hash: String = row.get("password_hash");

    match password::verify(input.password, password_hash).await {
        Ok(true) => (),
        Ok(false) => return message(StatusCode::UNAUTHORIZED, "Invalid email or password"),
        Err(err) => {
            error!("Error verifying password: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    }

    let captain = match Captain::from_row(&row) {
        Ok(captain) => captain,
        Err(err) => {
            error!("Error decoding captain row: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };

    let token = match token::issue(
        &globals.jwt_secret,
        captain.id,
        Role::Captain,
        globals.token_ttl,
    ) {
        Ok(token) => token,
        Err(err) => {
            error!("Error signing token: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };

    (StatusCode::OK, Json(CaptainAuth { captain, token })).into_response()
}

async fn fetch_captain(pool: &PgPool, email: &str) -> Result<Option<PgRow>, sqlx::Error> {
    let query = r"
        SELECT id, first_name, last_name, email, password_hash, status,
               vehicle_color, vehicle_plate, vehicle_capacity, vehicle_type
        FROM captains
        WHERE email = $1
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
}
