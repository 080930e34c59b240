//! Blacklist of tokens revoked at logout.
//!
//! Rows are keyed by the token itself and carry the JWT expiry, so a row
//! only needs to live as long as the token it shadows.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{info_span, Instrument};

/// Revoke a token until it expires on its own
///
/// # Errors
/// Returns an error if the insert fails
pub async fn revoke(
    pool: &PgPool,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let query = r"
        INSERT INTO revoked_tokens (token, expires_at)
        VALUES ($1, $2)
        ON CONFLICT (token) DO NOTHING
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .instrument(span)
        .await?;

    Ok(())
}

/// Check whether a token has been revoked and is still within its lifetime
///
/// # Errors
/// Returns an error if the lookup fails
pub async fn is_revoked(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
    let query = r"
        SELECT EXISTS(
            SELECT 1 FROM revoked_tokens
            WHERE token = $1 AND expires_at > NOW()
        ) AS revoked
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token)
        .fetch_one(pool)
        .instrument(span)
        .await?;

    Ok(row.get("revoked"))
}

/// Delete blacklist rows whose token has already expired
///
/// # Errors
/// Returns an error if the delete fails
pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let query = "DELETE FROM revoked_tokens WHERE expires_at < NOW()";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query).execute(pool).instrument(span).await?;

    Ok(result.rows_affected())
}
