use anyhow::{Context, Result};

/// Deployment environment. Controls session gating and dev-token issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Loaded once at startup and carried immutably in `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub redis_url: String,
    pub scraper_base_url: String,
    pub session_secret: String,
    /// Secret for the human-verification provider. When absent outside
    /// production, session issuance falls back to dev tokens.
    pub verification_secret: Option<String>,
    pub verification_url: String,
    pub environment: Environment,
    /// Administrative switch for session gating. Off means every caller
    /// receives a bypass token and the chat endpoint does not check tokens.
    pub require_verification: bool,
    pub daily_quota: u64,
    /// Profile text describing the candidate the assistant speaks for.
    pub candidate_profile: String,
    /// Overall wall-clock budget for scrape polling, in milliseconds.
    pub scrape_deadline_ms: u64,
    pub scrape_poll_initial_ms: u64,
    pub scrape_poll_max_ms: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let candidate_profile = match std::env::var("CANDIDATE_PROFILE_PATH") {
            Ok(path) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read candidate profile from '{path}'"))?,
            Err(_) => std::env::var("CANDIDATE_PROFILE").unwrap_or_default(),
        };

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            redis_url: require_env("REDIS_URL")?,
            scraper_base_url: require_env("SCRAPER_BASE_URL")?,
            session_secret: require_env("SESSION_SECRET")?,
            verification_secret: std::env::var("VERIFICATION_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            verification_url: std::env::var("VERIFICATION_URL").unwrap_or_else(|_| {
                "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string()
            }),
            environment: Environment::parse(
                &std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            ),
            require_verification: env_bool("REQUIRE_VERIFICATION", true),
            daily_quota: env_parse("DAILY_QUOTA", 50)?,
            candidate_profile,
            scrape_deadline_ms: env_parse("SCRAPE_DEADLINE_MS", 45_000)?,
            scrape_poll_initial_ms: env_parse("SCRAPE_POLL_INITIAL_MS", 1_000)?,
            scrape_poll_max_ms: env_parse("SCRAPE_POLL_MAX_MS", 8_000)?,
            port: env_parse("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Whether the chat endpoint requires a session token.
    ///
    /// Both flags live on this immutable snapshot, so the enforcement
    /// decision and the token check can never observe different states.
    pub fn gating_enforced(&self) -> bool {
        self.is_production() && self.require_verification
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("'{key}' must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse_production() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("PROD"), Environment::Production);
    }

    #[test]
    fn test_environment_parse_anything_else_is_development() {
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse("staging"), Environment::Development);
        assert_eq!(Environment::parse(""), Environment::Development);
    }

    fn config_with(environment: Environment, require_verification: bool) -> Config {
        Config {
            anthropic_api_key: "key".to_string(),
            redis_url: "redis://localhost".to_string(),
            scraper_base_url: "http://localhost:9000".to_string(),
            session_secret: "secret".to_string(),
            verification_secret: None,
            verification_url: String::new(),
            environment,
            require_verification,
            daily_quota: 50,
            candidate_profile: String::new(),
            scrape_deadline_ms: 45_000,
            scrape_poll_initial_ms: 1_000,
            scrape_poll_max_ms: 8_000,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_gating_enforced_only_in_production_with_verification_required() {
        assert!(config_with(Environment::Production, true).gating_enforced());
        assert!(!config_with(Environment::Production, false).gating_enforced());
        assert!(!config_with(Environment::Development, true).gating_enforced());
        assert!(!config_with(Environment::Development, false).gating_enforced());
    }
}
