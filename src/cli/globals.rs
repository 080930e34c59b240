use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub jwt_secret: SecretString,
    pub token_ttl: u64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(jwt_secret: SecretString, token_ttl: u64) -> Self {
        Self {
            jwt_secret,
            token_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(SecretString::from("sekreto".to_string()), 86400);
        assert_eq!(args.jwt_secret.expose_secret(), "sekreto");
        assert_eq!(args.token_ttl, 86400);
    }

    #[test]
    fn test_global_args_debug_redacts_secret() {
        let args = GlobalArgs::new(SecretString::from("sekreto".to_string()), 60);
        let debug = format!("{args:?}");
        assert!(!debug.contains("sekreto"));
    }
}
