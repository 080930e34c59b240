use crate::{
    api::handlers::{
        message,
        types::{User, UserAuth},
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
pub struct UserLogin {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/users/login",
    request_body = UserLogin,
    responses(
        (status = 200, description = "Login successful", body = UserAuth),
        (status = 400, description = "Missing payload or invalid fields"),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Login failed"),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn login(
    pool: Extension<PgPool>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<UserLogin>>,
) -> Response {
    let Some(Json(input)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let email = input.email.trim().to_lowercase();

    if !valid_email(&email) {
        return message(StatusCode::BAD_REQUEST, "Invalid email");
    }

    // Unknown email and wrong password answer alike, no account probing
    let row = match fetch_user(&pool, &email).await {
        Ok(Some(row)) => row,
        Ok(None) => return message(StatusCode::UNAUTHORIZED, "Invalid email or password"),
        Err(err) => {
            error!("Error fetching user: {err}");
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

    let user = match User::from_row(&row) {
        Ok(user) => user,
        Err(err) => {
            error!("Error decoding user row: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };

    let token = match token::issue(&globals.jwt_secret, user.id, Role::User, globals.token_ttl) {
        Ok(token) => token,
        Err(err) => {
            error!("Error signing token: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };

    (StatusCode::OK, Json(UserAuth { user, token })).into_response()
}

async fn fetch_user(pool: &PgPool, email: &str) -> Result<Option<PgRow>, sqlx::Error> {
    let query = r"
        SELECT id, first_name, last_name, email, password_hash
        FROM users
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
