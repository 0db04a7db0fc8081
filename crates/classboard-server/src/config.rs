use std::path::PathBuf;

use anyhow::{Context, Result};

pub struct SummarizerConfig {
    pub api_key: String,
    pub model: String,
}

/// Environment-sourced configuration. Optional features are explicit
/// `Option` fields: a missing credential disables summarization, a missing
/// admin token disables the reset endpoint — never a crash.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub session_secret: String,
    pub summarizer: Option<SummarizerConfig>,
    pub admin_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let session_secret =
            std::env::var("CLASSBOARD_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
        let db_path: PathBuf = std::env::var("CLASSBOARD_DB_PATH")
            .unwrap_or_else(|_| "classboard.db".into())
            .into();
        let host = std::env::var("CLASSBOARD_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("CLASSBOARD_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("CLASSBOARD_PORT must be a port number")?;

        let summarizer = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|key| !key.is_empty())
            .map(|api_key| SummarizerConfig {
                api_key,
                model: std::env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| "gemini-1.5-flash".into()),
            });

        let admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());

        Ok(Self {
            host,
            port,
            db_path,
            session_secret,
            summarizer,
            admin_token,
        })
    }
}
