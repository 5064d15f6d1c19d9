//! Cleanup of generated text into a bare drawing script.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::GenerationFailure;
use crate::style::Style;

/// Minimum plausible length of a cleaned drawing script, in characters.
pub const MIN_CODE_LENGTH: usize = 50;

/// Matches an opening or closing fence, optionally language-tagged, plus the
/// newline that follows it.
const FENCE_PATTERN: &str = r"```(?:javascript|js)?\n?";

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FENCE_PATTERN).expect("valid regex"));

/// Strip every triple-backtick fence from `text` and trim the result.
pub fn strip_code_fences(text: &str) -> String {
    let without_tagged = FENCE_RE.replace_all(text, "");
    without_tagged.replace("```", "").trim().to_string()
}

/// Turn raw generator output into usable code for `style`.
///
/// Fails when the text is empty or the cleaned script is shorter than
/// [`MIN_CODE_LENGTH`].
pub fn clean_generated_code(style: Style, raw: &str) -> Result<String, GenerationFailure> {
    if raw.trim().is_empty() {
        return Err(GenerationFailure::EmptyResponse {
            style: style.label(),
        });
    }

    let cleaned = strip_code_fences(raw);
    let len = cleaned.chars().count();
    if len < MIN_CODE_LENGTH {
        return Err(GenerationFailure::TooShort {
            style: style.label(),
            len,
        });
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const BODY: &str = "ctx.clearRect(0, 0, canvas.width, canvas.height);\nctx.fillText('CERTIFICATE', 400, 100);";

    #[test]
    fn strips_javascript_fence() {
        let raw = format!("```javascript\n{BODY}\n```");
        let cleaned = strip_code_fences(&raw);
        assert_eq!(cleaned, BODY);
        assert!(!cleaned.contains("```"));
    }

    #[test]
    fn strips_js_and_bare_fences() {
        assert_eq!(strip_code_fences(&format!("```js\n{BODY}```")), BODY);
        assert_eq!(strip_code_fences(&format!("```\n{BODY}\n```\n")), BODY);
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fences(&format!("\n  {BODY}  \n")), BODY);
    }

    #[test]
    fn stray_fence_with_other_tag_loses_backticks() {
        let cleaned = strip_code_fences(&format!("```typescript\n{BODY}\n```"));
        assert!(!cleaned.contains("```"));
        assert!(cleaned.ends_with("400, 100);"));
    }

    #[test]
    fn clean_accepts_long_enough_code() {
        let code = clean_generated_code(Style::Classic, &format!("```js\n{BODY}\n```")).unwrap();
        assert_eq!(code, BODY);
    }

    #[test]
    fn clean_rejects_empty_text() {
        assert_matches!(
            clean_generated_code(Style::Modern, "   "),
            Err(GenerationFailure::EmptyResponse { style: "Modern" })
        );
    }

    #[test]
    fn clean_rejects_short_code() {
        assert_matches!(
            clean_generated_code(Style::Elegant, "```js\nctx.fillRect(0,0,1,1);\n```"),
            Err(GenerationFailure::TooShort { style: "Elegant", .. })
        );
    }

    #[test]
    fn fence_only_text_is_too_short() {
        assert_matches!(
            clean_generated_code(Style::Creative, "```javascript\n```"),
            Err(GenerationFailure::TooShort { len: 0, .. })
        );
    }
}
