use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 3100;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 120;

/// Application configuration loaded from environment variables.
/// Read once at startup; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Raw credential as found in the environment. Validated per request by the
    /// LLM client, so the server still starts (and serves plans) without it.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    /// Root of static hosting. The plan lives at `<site_root>/data/plan.json`.
    pub site_root: PathBuf,
    pub chrome_path: Option<PathBuf>,
    pub pdf_no_sandbox: bool,
    pub rate_limit_per_minute: u32,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let site_root = match std::env::var("SITE_ROOT") {
            Ok(root) => PathBuf::from(root),
            Err(_) => std::env::current_dir().context("Cannot resolve the working directory")?,
        };

        Ok(Config {
            port: parse_env("PORT", DEFAULT_PORT)?,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            site_root,
            chrome_path: std::env::var("CHROME_PATH").ok().map(PathBuf::from),
            pdf_no_sandbox: parse_env("PDF_NO_SANDBOX", true)?,
            rate_limit_per_minute: parse_env("RATE_LIMIT_PER_MINUTE", DEFAULT_RATE_LIMIT_PER_MINUTE)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Path of the single stored plan document.
    pub fn plan_path(&self) -> PathBuf {
        self.site_root.join("data").join("plan.json")
    }

    /// True when a non-blank credential is configured. Never exposes the value.
    pub fn has_api_key(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for router tests: no credential, everything rooted at `site_root`.
    pub fn for_tests(site_root: impl Into<PathBuf>) -> Self {
        Config {
            port: DEFAULT_PORT,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            site_root: site_root.into(),
            chrome_path: None,
            pdf_no_sandbox: true,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            rust_log: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_path_is_under_data_dir() {
        let config = Config::for_tests("/srv/site");
        assert_eq!(config.plan_path(), PathBuf::from("/srv/site/data/plan.json"));
    }

    #[test]
    fn test_has_api_key_ignores_blank_values() {
        let mut config = Config::for_tests("/srv/site");
        assert!(!config.has_api_key());

        config.openai_api_key = Some("   ".to_string());
        assert!(!config.has_api_key());

        config.openai_api_key = Some("sk-test".to_string());
        assert!(config.has_api_key());
    }
}
