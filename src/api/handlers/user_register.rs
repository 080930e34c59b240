use crate::{
    api::handlers::{
        is_unique_violation, message, normalize_name, normalize_optional,
        types::{Fullname, User, UserAuth},
        valid_email, valid_password,
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
use uuid::Uuid;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserRegister {
    pub fullname: Fullname,
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/users/register",
    request_body = UserRegister,
    responses(
        (status = 201, description = "User registered", body = UserAuth),
        (status = 400, description = "Missing payload or invalid fields"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Registration failed"),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn register(
    pool: Extension<PgPool>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<UserRegister>>,
) -> Response {
    let Some(Json(input)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let email = input.email.trim().to_lowercase();

    if !valid_email(&email) {
        return message(StatusCode::BAD_REQUEST, "Invalid email");
    }

    // Stored as trimmed, like email
    let Some(firstname) = normalize_name(&input.fullname.firstname) else {
        return message(
            StatusCode::BAD_REQUEST,
            "First name must be at least 3 characters long",
        );
    };

    let fullname = Fullname {
        firstname,
        lastname: normalize_optional(input.fullname.lastname),
    };

    if !valid_password(&input.password) {
        return message(
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters long",
        );
    }

    let password_hash = match password::hash(input.password).await {
        Ok(hash) => hash,
        Err(err) => {
            error!("Error hashing password: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed");
        }
    };

    let id: Uuid = match insert_user(&pool, &fullname, &email, &password_hash).await {
        Ok(row) => row.get("id"),
        Err(err) if is_unique_violation(&err) => {
            return message(StatusCode::CONFLICT, "Email already registered");
        }
        Err(err) => {
            error!("Error creating user: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed");
        }
    };

    let token = match token::issue(&globals.jwt_secret, id, Role::User, globals.token_ttl) {
        Ok(token) => token,
        Err(err) => {
            error!("Error signing token: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed");
        }
    };

    let user = User {
        id,
        fullname,
        email,
    };

    (StatusCode::CREATED, Json(UserAuth { user, token })).into_response()
}

async fn insert_user(
    pool: &PgPool,
    fullname: &Fullname,
    email: &str,
    password_hash: &str,
) -> Result<PgRow, sqlx::Error> {
    let query = r"
        INSERT INTO users (first_name, last_name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING id
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(&fullname.firstname)
        .bind(&fullname.lastname)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await
}
