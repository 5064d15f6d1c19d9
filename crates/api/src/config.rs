use std::time::Duration;

use certgen_core::design::DESIGN_COUNT;
use certgen_core::generator::DEFAULT_THROTTLE;
use certgen_gemini::config::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use certgen_gemini::GeminiConfig;

/// Headroom on top of a worst-case batch for everything besides upstream calls.
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

/// Server configuration loaded from environment variables.
///
/// Everything except the Gemini API key has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds. Never below
    /// [`min_request_timeout_secs`] for the configured Gemini timeout and
    /// throttle, so a batch whose every call times out still answers with
    /// fallback designs.
    pub request_timeout_secs: u64,
    /// Pause between consecutive Gemini calls within one batch.
    pub generation_throttle: Duration,
    pub gemini: GeminiConfig,
}

impl ServerConfig {
    /// Defaults for everything but the Gemini connection.
    pub fn new(gemini: GeminiConfig) -> Self {
        let generation_throttle = DEFAULT_THROTTLE;
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            cors_origins: parse_origins("http://localhost:5173"),
            request_timeout_secs: min_request_timeout_secs(gemini.timeout, generation_throttle),
            generation_throttle,
            gemini,
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                     |
    /// |--------------------------|---------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                   |
    /// | `PORT`                   | `5000`                                      |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`                     |
    /// | `REQUEST_TIMEOUT_SECS`   | worst-case batch + 10 (`162`)               |
    /// | `GEMINI_API_KEY`         | required                                    |
    /// | `GEMINI_MODEL`           | `gemini-1.5-flash`                          |
    /// | `GEMINI_BASE_URL`        | `https://generativelanguage.googleapis.com` |
    /// | `GEMINI_TIMEOUT_SECS`    | `30`                                        |
    /// | `GENERATION_THROTTLE_MS` | `500`                                       |
    ///
    /// A `REQUEST_TIMEOUT_SECS` below the worst-case batch is raised to it.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let throttle_ms: u64 = std::env::var("GENERATION_THROTTLE_MS")
            .map(|v| v.parse().expect("GENERATION_THROTTLE_MS must be a valid u64"))
            .unwrap_or(DEFAULT_THROTTLE.as_millis() as u64);
        let generation_throttle = Duration::from_millis(throttle_ms);

        let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let base_url = std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let gemini_timeout_secs: u64 = std::env::var("GEMINI_TIMEOUT_SECS")
            .map(|v| v.parse().expect("GEMINI_TIMEOUT_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_TIMEOUT.as_secs());

        let gemini = GeminiConfig::new(api_key, model)
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(gemini_timeout_secs));

        let min_timeout = min_request_timeout_secs(gemini.timeout, generation_throttle);
        let request_timeout_secs = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(v) => {
                let requested: u64 = v.parse().expect("REQUEST_TIMEOUT_SECS must be a valid u64");
                if requested < min_timeout {
                    tracing::warn!(
                        requested,
                        min_timeout,
                        "REQUEST_TIMEOUT_SECS is shorter than a worst-case batch, raising it",
                    );
                }
                requested.max(min_timeout)
            }
            Err(_) => min_timeout,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            generation_throttle,
            gemini,
        }
    }
}

/// How long a batch takes when every upstream call runs into its timeout.
pub fn worst_case_batch(gemini_timeout: Duration, throttle: Duration) -> Duration {
    let calls = DESIGN_COUNT as u32;
    gemini_timeout * calls + throttle * calls.saturating_sub(1)
}

/// Smallest request timeout, in whole seconds, that outlasts a worst-case batch.
pub fn min_request_timeout_secs(gemini_timeout: Duration, throttle: Duration) -> u64 {
    (worst_case_batch(gemini_timeout, throttle) + REQUEST_TIMEOUT_SLACK)
        .as_secs_f64()
        .ceil() as u64
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            parse_origins(" http://a.test ,,http://b.test, "),
            ["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn worst_case_batch_counts_every_call_and_pause() {
        assert_eq!(
            worst_case_batch(Duration::from_secs(30), Duration::from_millis(500)),
            Duration::from_secs(152)
        );
    }

    #[test]
    fn default_request_timeout_outlasts_a_hung_upstream() {
        let config = ServerConfig::new(GeminiConfig::new("k", DEFAULT_MODEL));
        assert_eq!(config.request_timeout_secs, 162);
        assert!(
            Duration::from_secs(config.request_timeout_secs)
                > worst_case_batch(config.gemini.timeout, config.generation_throttle)
        );
    }

    #[test]
    fn fractional_budgets_round_up() {
        assert_eq!(min_request_timeout_secs(Duration::from_millis(100), Duration::from_millis(150)), 11);
    }

    #[test]
    fn empty_origin_list() {
        assert!(parse_origins("").is_empty());
    }
}
