//! Wire types for the `generateContent` endpoint.
//!
//! Only the fields this service reads are modeled; everything else in the
//! response is ignored.

use serde::{Deserialize, Serialize};

/// Request body: a single user turn containing the prompt text.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TextPart<'a> {
    pub text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![TextPart { text: prompt }],
            }],
        }
    }
}

/// Response body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any are non-empty.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Reason the prompt was blocked, when the API reports one.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_single_user_turn() {
        let body = serde_json::to_value(GenerateContentRequest::from_prompt("draw")).unwrap();
        assert_eq!(body, serde_json::json!({ "contents": [{ "parts": [{ "text": "draw" }] }] }));
    }

    #[test]
    fn text_concatenates_first_candidate_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {
                    "content": { "parts": [{ "text": "ctx.a();" }, { "text": "\nctx.b();" }], "role": "model" },
                    "finishReason": "STOP"
                },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ],
            "usageMetadata": { "totalTokenCount": 12 }
        }))
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("ctx.a();\nctx.b();"));
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn missing_candidates_yield_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();

        assert!(response.text().is_none());
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }

    #[test]
    fn candidate_without_text_parts_yields_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": {} }] } }]
        }))
        .unwrap();

        assert!(response.text().is_none());
    }
}
