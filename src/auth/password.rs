use anyhow::{Context, Result};

/// Hash a password with bcrypt on the blocking pool
///
/// # Errors
/// Returns an error if hashing fails or the blocking task panics
pub async fn hash(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .context("password hashing task failed")?
        .context("failed to hash password")
}

/// Verify a password against a stored bcrypt hash on the blocking pool
///
/// # Errors
/// Returns an error if the stored hash is malformed or the blocking task panics
pub async fn verify(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .context("password verification task failed")?
        .context("failed to verify password")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_round_trip() {
        // Low cost keeps the test fast; verify() does not care about cost
        let stored = bcrypt::hash("sekreta-vorto", 4).unwrap();

        assert!(verify("sekreta-vorto".to_string(), stored.clone())
            .await
            .unwrap());
        assert!(!verify("wrong-password".to_string(), stored).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_malformed_hash() {
        let result = verify("password".to_string(), "not-a-bcrypt-hash".to_string()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_hash_produces_valid_bcrypt() {
        let hashed = hash("sekreta-vorto".to_string()).await.unwrap();
        assert!(hashed.starts_with("$2"));
        assert!(bcrypt::verify("sekreta-vorto", &hashed).unwrap());
    }
}
