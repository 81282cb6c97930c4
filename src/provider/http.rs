//! HTTP client construction, SSE parsing, and status mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::error::AzureError;

/// Request timeout applied to every Azure call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Build a reqwest client for one Azure API version.
///
/// A failure here means the TLS/HTTP stack could not be initialised, which is
/// reported as a missing dependency rather than a call failure.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, AzureError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| AzureError::DependencyMissing(format!("HTTP transport unavailable: {e}")))
}

/// Build headers for Azure's `api-key` authentication.
pub fn api_key_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(api_key) {
        headers.insert("api-key", val);
    }
    headers
}

/// Parse an SSE "data:" line, returning None for "[DONE]".
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Splits an SSE byte stream into lines.
///
/// Bytes are buffered until a full line is available, so a multi-byte
/// character split across network reads is decoded intact.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buf: Vec<u8>,
}

impl SseLineBuffer {
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete line, trimmed, or None until more bytes arrive.
    pub fn next_line(&mut self) -> Option<Result<String, AzureError>> {
        let end = self.buf.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buf.drain(..=end).collect();
        Some(decode_line(&line[..end]))
    }

    /// Whatever remains once the byte stream has ended.
    pub fn finish(&mut self) -> Option<Result<String, AzureError>> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        Some(decode_line(&rest))
    }
}

fn decode_line(bytes: &[u8]) -> Result<String, AzureError> {
    std::str::from_utf8(bytes)
        .map(|line| line.trim().to_string())
        .map_err(|e| AzureError::Stream(format!("invalid UTF-8 in event stream: {e}")))
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> AzureError {
    match status {
        401 | 403 => AzureError::Authentication(extract_message(body)),
        429 => AzureError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => AzureError::api(status, extract_message(body)),
    }
}

// Azure wraps errors as {"error": {"code": ..., "message": ...}}.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_data_lines() {
        assert_eq!(parse_sse_data("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(parse_sse_data("data:{}"), Some("{}"));
        assert_eq!(parse_sse_data("data: [DONE]"), None);
        assert_eq!(parse_sse_data("event: ping"), None);
    }

    #[test]
    fn status_mapping() {
        let body = r#"{"error":{"code":"401","message":"Access denied."}}"#;
        assert!(matches!(
            status_to_error(401, body),
            AzureError::Authentication(msg) if msg.starts_with("Access denied")
        ));
        assert!(matches!(
            status_to_error(429, r#"{"error":{"retry_after":1.5}}"#),
            AzureError::RateLimited { retry_after_ms: Some(1500) }
        ));
        assert!(matches!(
            status_to_error(404, "DeploymentNotFound"),
            AzureError::Api { status: 404, message } if message == "DeploymentNotFound"
        ));
    }

    #[test]
    fn api_key_header_is_set() {
        let headers = api_key_headers("secret");
        assert_eq!(headers.get("api-key").unwrap(), "secret");
    }

    #[test]
    fn line_buffer_joins_split_multibyte_characters() {
        let mut lines = SseLineBuffer::default();
        lines.push(b"data: caf\xC3");
        assert!(lines.next_line().is_none());

        lines.push(b"\xA9\r\n\ndata: [DONE]\n");
        assert_eq!(lines.next_line().unwrap().unwrap(), "data: café");
        assert_eq!(lines.next_line().unwrap().unwrap(), "");
        assert_eq!(lines.next_line().unwrap().unwrap(), "data: [DONE]");
        assert!(lines.next_line().is_none());
        assert!(lines.finish().is_none());
    }

    #[test]
    fn line_buffer_flushes_unterminated_tail() {
        let mut lines = SseLineBuffer::default();
        lines.push(b"data: {}");
        assert!(lines.next_line().is_none());
        assert_eq!(lines.finish().unwrap().unwrap(), "data: {}");
        assert!(lines.finish().is_none());
    }

    #[test]
    fn line_buffer_rejects_invalid_utf8() {
        let mut lines = SseLineBuffer::default();
        lines.push(b"data: \xFF\n");
        assert!(matches!(lines.next_line(), Some(Err(AzureError::Stream(_)))));
    }
}
