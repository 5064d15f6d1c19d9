/// Domain-level errors surfaced across the request boundary.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a single style's generation fell through to its fallback template.
///
/// Never surfaced to HTTP callers; only logged.
#[derive(Debug, thiserror::Error)]
pub enum GenerationFailure {
    /// The external call failed (transport, upstream status, decoding).
    #[error("Text generation request failed: {0}")]
    Upstream(String),

    /// The generator returned no text at all.
    #[error("No code received for {style} style")]
    EmptyResponse { style: &'static str },

    /// The cleaned code is below the minimum plausible length.
    #[error("Generated code too short for {style} style ({len} chars)")]
    TooShort { style: &'static str, len: usize },

    /// The generator future panicked.
    #[error("Text generation panicked: {0}")]
    Panicked(String),
}
