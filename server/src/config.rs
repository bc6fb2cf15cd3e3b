//! Command-line and environment configuration.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

const DEV_JWT_SECRET: &str = "studystream-dev-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "studystream-server", version, about = "StudyStream learning tracker API")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Interface to bind.
    #[arg(long, env = "STUDYSTREAM_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// SQLite database file, or `:memory:`.
    #[arg(long, env = "STUDYSTREAM_DB", default_value = "./studystream.db")]
    pub db: String,

    /// Directory with `content_catalog.json` / `fun_facts.json` overrides.
    #[arg(long, env = "STUDYSTREAM_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// HS256 signing secret. Required in production.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "TOKEN_TTL_HOURS", default_value_t = 168)]
    pub token_ttl_hours: i64,

    #[arg(long, env = "BCRYPT_COST", default_value_t = 10)]
    pub bcrypt_cost: u32,

    /// Allowed browser origins.
    #[arg(
        long = "cors-origin",
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_values_t = [
            String::from("http://localhost:5173"),
            String::from("http://localhost:3000"),
        ]
    )]
    pub cors_origins: Vec<String>,

    #[arg(long, env = "STUDYSTREAM_ENV", value_enum, default_value_t = Environment::Development)]
    pub environment: Environment,

    /// Skip inserting the content catalog on startup.
    #[arg(long)]
    pub no_seed: bool,
}

impl ServerConfig {
    pub fn jwt_secret(&self) -> anyhow::Result<Vec<u8>> {
        match (&self.jwt_secret, self.environment) {
            (Some(secret), _) if !secret.is_empty() => Ok(secret.as_bytes().to_vec()),
            (_, Environment::Production) => {
                anyhow::bail!("JWT_SECRET must be set when running in production")
            }
            _ => {
                log::warn!("JWT_SECRET not set, using the development secret");
                Ok(DEV_JWT_SECRET.as_bytes().to_vec())
            }
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_frontend() {
        let config = ServerConfig::parse_from(["studystream-server"]);
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.cors_origins.contains(&"http://localhost:5173".to_string()));
        assert!(!config.no_seed);
    }

    #[test]
    fn production_requires_secret() {
        let config = ServerConfig::parse_from([
            "studystream-server",
            "--environment",
            "production",
            "--jwt-secret",
            "",
        ]);
        assert!(config.jwt_secret().is_err());

        let config = ServerConfig::parse_from(["studystream-server", "--jwt-secret", "s3cret"]);
        assert_eq!(config.jwt_secret().unwrap(), b"s3cret");
    }

    #[test]
    fn origins_split_on_commas() {
        let config = ServerConfig::parse_from([
            "studystream-server",
            "--cors-origin",
            "https://a.example,https://b.example",
            "--port",
            "8080",
        ]);
        assert_eq!(config.cors_origins, ["https://a.example", "https://b.example"]);
        assert_eq!(config.address(), "0.0.0.0:8080");
    }
}
