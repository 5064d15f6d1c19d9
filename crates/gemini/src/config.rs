use std::time::Duration;

/// Default model used for canvas-code generation.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default transport timeout for a single generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Gemini API.
///
/// Built explicitly by the caller and handed to [`crate::GeminiClient`];
/// the client never reads process environment itself.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model_name: String,
    /// Scheme + host, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_name: model_name.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full `generateContent` URL for the configured model (without the key).
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        )
    }
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_url_includes_model() {
        let config = GeminiConfig::new("k", "gemini-1.5-flash");
        assert_eq!(
            config.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let config = GeminiConfig::new("k", "m").with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.generate_url(), "http://127.0.0.1:9000/v1beta/models/m:generateContent");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = GeminiConfig::new("super-secret-key", "m");
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret-key"));
        assert!(printed.contains("<redacted>"));
    }
}
