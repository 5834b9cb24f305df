use log::warn;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use thiserror::Error;

/// Why a model reply could not be turned into a document
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("no JSON found in the response")]
    NoJson,
    #[error("failed to decode JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)\[JSON_START\](.*?)\[JSON_END\]").expect("marker pattern is valid")
    })
}

/// Find the JSON document in a model reply.
///
/// Prefers the text between `[JSON_START]` and `[JSON_END]`; otherwise takes
/// everything from the first `{` to the last `}`.
pub fn extract_json_block(response: &str) -> Result<&str, ResponseError> {
    if let Some(caps) = marker_pattern().captures(response) {
        if let Some(block) = caps.get(1) {
            return Ok(block.as_str().trim());
        }
    }

    warn!("Failed to locate JSON delimiters in the response");
    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(response[start..=end].trim()),
        _ => Err(ResponseError::NoJson),
    }
}

/// Extract and decode the JSON document in a model reply
pub fn parse_json_block<T: DeserializeOwned>(response: &str) -> Result<T, ResponseError> {
    let block = extract_json_block(response)?;
    Ok(serde_json::from_str(block)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_extracts_between_markers() {
        let response = "Sure! Here it is:\n[JSON_START]\n{\"a\": 1}\n[JSON_END]\nEnjoy {cooking}";
        assert_eq!(extract_json_block(response).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_falls_back_to_braces() {
        let response = "```json\n{\"shoppingList\": {\"Produce\": []}}\n```";
        let value: Value = parse_json_block(response).unwrap();
        assert!(value["shoppingList"]["Produce"].is_array());
    }

    #[test]
    fn test_no_json_is_a_typed_error() {
        assert!(matches!(
            extract_json_block("I could not find a recipe."),
            Err(ResponseError::NoJson)
        ));
        assert!(matches!(
            extract_json_block("} backwards {"),
            Err(ResponseError::NoJson)
        ));
    }

    #[test]
    fn test_invalid_json_is_a_decode_error() {
        let result: Result<Value, _> = parse_json_block("[JSON_START]{not json}[JSON_END]");
        assert!(matches!(result, Err(ResponseError::Decode(_))));
    }
}
