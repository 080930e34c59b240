use crate::{
    api::handlers::{
        is_unique_violation, message, normalize_name, normalize_optional,
        types::{Captain, CaptainAuth, CaptainStatus, Fullname, Vehicle},
        valid_email, valid_name, valid_password,
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
pub struct CaptainRegister {
    pub fullname: Fullname,
    pub email: String,
    pub password: String,
    pub vehicle: Vehicle,
}

#[utoipa::path(
    post,
    path = "/captains/register",
    request_body = CaptainRegister,
    responses(
        (status = 201, description = "Captain registered", body = CaptainAuth),
        (status = 400, description = "Missing payload or invalid fields"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Registration failed"),
    ),
    tag = "captains"
)]
#[instrument(skip_all)]
pub async fn register(
    pool: Extension<PgPool>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<CaptainRegister>>,
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

    if !valid_name(&input.vehicle.color) {
        return message(
            StatusCode::BAD_REQUEST,
            "Vehicle color must be at least 3 characters long",
        );
    }

    if !valid_name(&input.vehicle.plate) {
        return message(
            StatusCode::BAD_REQUEST,
            "Vehicle plate must be at least 3 characters long",
        );
    }

    if input.vehicle.capacity < 1 {
        return message(StatusCode::BAD_REQUEST, "Vehicle capacity must be at least 1");
    }

    let password_hash = match password::hash(input.password).await {
        Ok(hash) => hash,
        Err(err) => {
            error!("Error hashing password: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed");
        }
    };

    let row = match insert_captain(&pool, &fullname, &email, &password_hash, &input.vehicle).await
    {
        Ok(row) => row,
        Err(err) if is_unique_violation(&err) => {
            return message(StatusCode::CONFLICT, "Email already registered");
        }
        Err(err) => {
            error!("Error creating captain: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed");
        }
    };

    let id: Uuid = row.get("id");

    let token = match token::issue(&globals.jwt_secret, id, Role::Captain, globals.token_ttl) {
        Ok(token) => token,
        Err(err) => {
            error!("Error signing token: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed");
        }
    };

    let captain = Captain {
        id,
        fullname,
        email,
        status: CaptainStatus::Inactive,
        vehicle: input.vehicle,
    };

    (StatusCode::CREATED, Json(CaptainAuth { captain, token })).into_response()
}

async fn insert_captain(
    pool: &PgPool,
    fullname: &Fullname,
    email: &str,
    password_hash: &str,
    vehicle: &Vehicle,
) -> Result<PgRow, sqlx::Error> {
    let query = r"
        INSERT INTO captains
            (first_name, last_name, email, password_hash,
             vehicle_color, vehicle_plate, vehicle_capacity, vehicle_type)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
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
        .bind(&vehicle.color)
        .bind(&vehicle.plate)
        .bind(vehicle.capacity)
        .bind(vehicle.vehicle_type.as_str())
        .fetch_one(pool)
        .instrument(span)
        .await
}
