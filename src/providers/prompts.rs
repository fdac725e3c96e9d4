//! Turning free-form model output into a short list of prompts.
//!
//! Models are asked for a bare JSON array but often wrap it in prose or a
//! code fence, or ignore the format entirely. Strategies, in order:
//! whole text as JSON, the outermost `[...]` span as JSON, then one prompt
//! per non-blank line.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Number of prompts returned to clients.
pub const PROMPT_COUNT: usize = 3;

static ARRAY_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[\s\S]*\]").expect("Failed to compile array span regex"));

#[derive(Debug, thiserror::Error)]
pub enum PromptParseError {
    #[error("Invalid prompts format")]
    InvalidFormat,
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Parse model output into at most [`PROMPT_COUNT`] prompts.
pub fn parse_prompts(content: &str) -> Result<Vec<String>, PromptParseError> {
    let items: Vec<Value> = match serde_json::from_str::<Value>(content) {
        Ok(value) => into_array(value)?,
        Err(_) => match ARRAY_SPAN.find(content) {
            Some(span) => into_array(serde_json::from_str(span.as_str())?)?,
            None => content
                .split('\n')
                .filter(|line| !line.trim().is_empty())
                .take(PROMPT_COUNT)
                .map(|line| Value::String(line.to_string()))
                .collect(),
        },
    };

    if items.is_empty() {
        return Err(PromptParseError::InvalidFormat);
    }

    Ok(items.into_iter().take(PROMPT_COUNT).map(render).collect())
}

fn into_array(value: Value) -> Result<Vec<Value>, PromptParseError> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(PromptParseError::InvalidFormat),
    }
}

fn render(value: Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_array() {
        let prompts = parse_prompts(r#"["  a neon city ", "a red car", "a cat", "extra"]"#).unwrap();
        assert_eq!(prompts, vec!["a neon city", "a red car", "a cat"]);
    }

    #[test]
    fn test_array_inside_code_fence() {
        let content = "Sure! Here they are:\n```json\n[\"one\",\n \"two\"]\n```\nEnjoy.";
        assert_eq!(parse_prompts(content).unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_line_fallback() {
        let content = "First prompt\n\n   \nSecond prompt  \nThird\nFourth";
        assert_eq!(
            parse_prompts(content).unwrap(),
            vec!["First prompt", "Second prompt", "Third"]
        );
    }

    #[test]
    fn test_non_string_items_are_rendered() {
        assert_eq!(parse_prompts(r#"[1, "two", {"a":1}]"#).unwrap(), vec!["1", "two", r#"{"a":1}"#]);
    }

    #[test]
    fn test_json_that_is_not_an_array() {
        assert!(matches!(
            parse_prompts(r#"{"prompts": ["a"]}"#),
            Err(PromptParseError::InvalidFormat)
        ));
        assert!(matches!(parse_prompts("[]"), Err(PromptParseError::InvalidFormat)));
    }

    #[test]
    fn test_broken_array_span() {
        assert!(matches!(
            parse_prompts("prompts: [\"a\", oops]"),
            Err(PromptParseError::Json(_))
        ));
    }
}
