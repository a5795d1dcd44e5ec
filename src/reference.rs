//! Reference-image resolution for contracts that need inline bytes.

use crate::error::BananaGenError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;

/// A reference image fetched and re-encoded for inline transmission.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 of the raw bytes.
    pub data: String,
}

/// Fetch the bytes behind a reference URL and re-encode them as base64
/// tagged with the detected content type. Any failure here is terminal for
/// the submission; the fetch is never retried.
pub(crate) async fn fetch_reference_image(
    http: &reqwest::Client,
    url: &str,
) -> Result<InlineImage, BananaGenError> {
    let reference_error = |message: String| BananaGenError::ReferenceImage {
        url: url.to_string(),
        message,
    };

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| reference_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(reference_error(format!("HTTP {status}")));
    }

    let header_mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
        .filter(|value| value.starts_with("image/"));

    let bytes: Bytes = response
        .bytes()
        .await
        .map_err(|e| reference_error(e.to_string()))?;
    if bytes.is_empty() {
        return Err(reference_error("response body is empty".to_string()));
    }

    let mime_type = header_mime.unwrap_or_else(|| sniff_mime(&bytes).to_string());
    Ok(InlineImage {
        mime_type,
        data: BASE64.encode(&bytes),
    })
}

/// Magic-byte detection for the formats generation providers actually emit.
fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else {
        "application/octet-stream"
    }
}
