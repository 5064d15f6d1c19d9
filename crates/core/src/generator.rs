//! The design request service: one category in, five designs out.
//!
//! Styles are generated strictly one after another with a fixed throttle
//! between external calls. A style whose generation fails for any reason is
//! replaced by its fallback template, so a batch always has exactly
//! [`DESIGN_COUNT`] records.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;

use crate::cleaning::clean_generated_code;
use crate::design::{validate_category, DesignRecord, DESIGN_COUNT};
use crate::error::{CoreError, GenerationFailure};
use crate::fallback::fallback_script;
use crate::prompt::build_prompt;
use crate::style::Style;

/// Default pause between consecutive external calls.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);

/// External text generation: prompt in, generated text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationFailure>;
}

/// Produces certificate design batches using an injected [`TextGenerator`].
#[derive(Clone)]
pub struct DesignGenerator {
    text: Arc<dyn TextGenerator>,
    throttle: Duration,
}

impl DesignGenerator {
    pub fn new(text: Arc<dyn TextGenerator>) -> Self {
        Self {
            text,
            throttle: DEFAULT_THROTTLE,
        }
    }

    /// Override the pause between external calls.
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Generate one design per style for `category`, in style order.
    pub async fn generate(&self, category: &str) -> Result<Vec<DesignRecord>, CoreError> {
        let category = validate_category(category)?;
        let mut designs = Vec::with_capacity(DESIGN_COUNT);

        for (index, style) in Style::ALL.into_iter().enumerate() {
            if index > 0 && !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }

            let code = match self.generate_style(style, category).await {
                Ok(code) => {
                    tracing::info!(style = %style, len = code.len(), "Generated design");
                    code
                }
                Err(failure) => {
                    tracing::warn!(style = %style, error = %failure, "Falling back to template");
                    fallback_script(style, category)
                }
            };

            designs.push(DesignRecord::new(style, code));
        }

        if designs.len() != DESIGN_COUNT {
            return Err(CoreError::Internal(format!(
                "expected {DESIGN_COUNT} designs, built {}",
                designs.len()
            )));
        }
        Ok(designs)
    }

    /// One external call for `style`, with panics in the generator caught.
    async fn generate_style(&self, style: Style, category: &str) -> Result<String, GenerationFailure> {
        let prompt = build_prompt(style, category);
        let raw = AssertUnwindSafe(self.text.generate_text(&prompt))
            .catch_unwind()
            .await
            .map_err(|panic| GenerationFailure::Panicked(panic_message(&*panic)))??;
        clean_generated_code(style, &raw)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
