//! Result-envelope extraction.
//!
//! Success payloads are loosely typed: a JSON envelope of URLs, a
//! JSON-encoded string, or a bare URL. Known shapes are tried in a fixed
//! order; a payload that does not parse as JSON at all is taken to be the
//! URL itself.

use crate::error::BananaGenError;
use serde_json::Value;

/// Pull the first usable asset URL out of a terminal success payload.
pub fn extract_result_url(raw: &str) -> Result<String, BananaGenError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BananaGenError::ResultExtraction(
            "result payload is empty".to_string(),
        ));
    }

    let parsed: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        // Some providers hand back the URL directly instead of JSON.
        Err(_) => return Ok(trimmed.to_string()),
    };

    locate_url(&parsed).ok_or_else(|| {
        BananaGenError::ResultExtraction(format!("no URL found in result payload: {trimmed}"))
    })
}

fn locate_url(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => first_string(items),
        Value::Object(map) => {
            if let Some(urls) = map.get("resultUrls").and_then(Value::as_array) {
                if let Some(url) = first_string(urls) {
                    return Some(url);
                }
            }
            if let Some(url) = map.get("url").and_then(Value::as_str) {
                return Some(url.to_string());
            }
            if let Some(url) = map.get("image_url").and_then(Value::as_str) {
                return Some(url.to_string());
            }
            if let Some(images) = map.get("images").and_then(Value::as_array) {
                if let Some(url) = first_string(images) {
                    return Some(url);
                }
            }
            None
        }
        Value::String(url) => Some(url.clone()),
        _ => None,
    }
}

fn first_string(items: &[Value]) -> Option<String> {
    items.iter().find_map(|item| item.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_urls_envelope() {
        let url = extract_result_url(r#"{"resultUrls":["https://x/y.png","https://x/z.png"]}"#)
            .unwrap();
        assert_eq!(url, "https://x/y.png");
    }

    #[test]
    fn bare_array() {
        let url = extract_result_url(r#"["https://x/a.png"]"#).unwrap();
        assert_eq!(url, "https://x/a.png");
    }

    #[test]
    fn singular_url_fields() {
        assert_eq!(
            extract_result_url(r#"{"url":"https://x/u.png"}"#).unwrap(),
            "https://x/u.png"
        );
        assert_eq!(
            extract_result_url(r#"{"image_url":"https://x/i.png"}"#).unwrap(),
            "https://x/i.png"
        );
    }

    #[test]
    fn nested_images_array() {
        let url = extract_result_url(r#"{"images":["https://x/n.png"]}"#).unwrap();
        assert_eq!(url, "https://x/n.png");
    }

    #[test]
    fn shapes_are_tried_in_order() {
        let url = extract_result_url(
            r#"{"images":["https://x/second.png"],"resultUrls":["https://x/first.png"]}"#,
        )
        .unwrap();
        assert_eq!(url, "https://x/first.png");
    }

    #[test]
    fn bare_url_falls_back_to_raw_string() {
        let url = extract_result_url("https://cdn.example/raw.png").unwrap();
        assert_eq!(url, "https://cdn.example/raw.png");
    }

    #[test]
    fn json_encoded_string_is_unwrapped() {
        let url = extract_result_url(r#""https://x/quoted.png""#).unwrap();
        assert_eq!(url, "https://x/quoted.png");
    }

    #[test]
    fn unrecognized_payloads_fail() {
        assert!(matches!(
            extract_result_url(""),
            Err(BananaGenError::ResultExtraction(_))
        ));
        assert!(matches!(
            extract_result_url("12345"),
            Err(BananaGenError::ResultExtraction(_))
        ));
        assert!(matches!(
            extract_result_url(r#"{"progress":0.5}"#),
            Err(BananaGenError::ResultExtraction(_))
        ));
        assert!(matches!(
            extract_result_url(r#"{"resultUrls":[]}"#),
            Err(BananaGenError::ResultExtraction(_))
        ));
    }
}
