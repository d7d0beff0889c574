use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied id that is echoed back unchanged.
const MAX_REQUEST_ID_LEN: usize = 128;

fn is_acceptable(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Echoes the caller's `x-request-id`, or a fresh UUID when it is missing or unusable,
/// and logs it with the request line.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| is_acceptable(s))
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::debug!(request_id = %request_id, method = %request.method(), path = %request.uri().path(), "request");

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptable_ids() {
        assert!(is_acceptable("abc-123_X"));
        assert!(!is_acceptable(""));
        assert!(!is_acceptable("bad\nid"));
        assert!(!is_acceptable(&"a".repeat(MAX_REQUEST_ID_LEN + 1)));
    }
}
