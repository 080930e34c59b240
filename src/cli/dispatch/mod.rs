use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let jwt_secret = matches
        .get_one::<String>("jwt-secret")
        .map(|s| SecretString::from(s.to_string()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --jwt-secret"))?;

    let token_ttl = matches
        .get_one::<u64>("token-ttl")
        .copied()
        .unwrap_or(86400);

    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
    };

    Ok((action, GlobalArgs::new(jwt_secret, token_ttl)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_handler_server_action() {
        let matches = commands::new().get_matches_from(vec![
            "veturi",
            "--port",
            "9090",
            "--dsn",
            "postgres://localhost/veturi",
            "--jwt-secret",
            "sekreto",
            "--token-ttl",
            "600",
        ]);

        let (action, globals) = handler(&matches).unwrap();

        match action {
            Action::Server { port, dsn } => {
                assert_eq!(port, 9090);
                assert_eq!(dsn, "postgres://localhost/veturi");
            }
        }

        assert_eq!(globals.jwt_secret.expose_secret(), "sekreto");
        assert_eq!(globals.token_ttl, 600);
    }
}
