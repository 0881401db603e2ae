//! Per-request access-log record
//!
//! A [`RequestRecord`] is created when a request arrives, mutated while the
//! inner handler produces its response, and handed to the writer task once
//! the response body is finished. After that it is read-only.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, OriginalUri};
use axum::http::{header, HeaderMap, HeaderName, Request, StatusCode, Version};
use chrono::{DateTime, Utc};

/// Placeholder logged when the server attached no connection info
const UNKNOWN_CLIENT: &str = "-";

/// Everything needed to emit one Combined Log Format line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    /// Arrival time (UTC)
    pub time: DateTime<Utc>,
    /// Remote address with any trailing port stripped
    pub ip: String,
    pub method: String,
    /// Raw request target: path plus query
    pub raw_path: String,
    /// Protocol string such as `HTTP/1.1`
    pub proto: String,
    pub user_agent: String,
    pub referer: String,
    status: u16,
    bytes: u64,
    written: bool,
}

impl RequestRecord {
    /// Capture the request metadata; status starts at 200 with nothing written
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let remote = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string());

        // Nested routers rewrite the URI; log what the client actually sent.
        let uri = request
            .extensions()
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| uri)
            .unwrap_or_else(|| request.uri());
        let raw_path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.to_string());

        Self {
            time: Utc::now(),
            ip: remote
                .as_deref()
                .map(client_ip)
                .unwrap_or(UNKNOWN_CLIENT)
                .to_string(),
            method: request.method().as_str().to_string(),
            raw_path,
            proto: protocol(request.version()).to_string(),
            user_agent: header_string(request.headers(), header::USER_AGENT),
            referer: header_string(request.headers(), header::REFERER),
            status: StatusCode::OK.as_u16(),
            bytes: 0,
            written: false,
        }
    }

    /// Record an explicit status. Ignored once anything has been written.
    pub fn write_header(&mut self, status: StatusCode) {
        if self.written {
            return;
        }
        self.status = status.as_u16();
        self.written = true;
    }

    /// Record `len` body bytes accepted downstream
    pub fn record_write(&mut self, len: usize) {
        if !self.written {
            self.written = true;
            self.status = StatusCode::OK.as_u16();
        }
        self.bytes += len as u64;
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn is_written(&self) -> bool {
        self.written
    }
}

/// Strip everything at or after the last colon of a remote address.
///
/// `203.0.113.7:54321` becomes `203.0.113.7`; a bracketed IPv6 endpoint such
/// as `[::1]:8080` becomes `[::1]`. An address without a colon is kept as is.
pub fn client_ip(remote: &str) -> &str {
    match remote.rfind(':') {
        Some(colon) => &remote[..colon],
        None => remote,
    }
}

/// Protocol string in the `HTTP/major.minor` form
pub fn protocol(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> String {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::USER_AGENT, "curl/8.0")
            .header(header::REFERER, "https://example.com/")
            .extension(ConnectInfo(SocketAddr::from(([203, 0, 113, 7], 54321))))
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_client_ip_strips_port() {
        assert_eq!(client_ip("203.0.113.7:54321"), "203.0.113.7");
        assert_eq!(client_ip("[::1]:8080"), "[::1]");
        assert_eq!(client_ip("localhost"), "localhost");
        assert_eq!(client_ip(""), "");
    }

    #[test]
    fn test_from_request_captures_metadata() {
        let record = RequestRecord::from_request(&request("/search?q=rust&page=2"));

        assert_eq!(record.ip, "203.0.113.7");
        assert_eq!(record.method, "POST");
        assert_eq!(record.raw_path, "/search?q=rust&page=2");
        assert_eq!(record.proto, "HTTP/1.1");
        assert_eq!(record.user_agent, "curl/8.0");
        assert_eq!(record.referer, "https://example.com/");
        assert_eq!(record.status(), 200);
        assert_eq!(record.bytes(), 0);
        assert!(!record.is_written());
    }

    #[test]
    fn test_missing_connect_info_and_headers() {
        let request = Request::builder()
            .uri("/")
            .version(Version::HTTP_2)
            .body(Body::empty())
            .unwrap();
        let record = RequestRecord::from_request(&request);

        assert_eq!(record.ip, "-");
        assert_eq!(record.proto, "HTTP/2.0");
        assert!(record.user_agent.is_empty());
        assert!(record.referer.is_empty());
    }

    #[test]
    fn test_original_uri_preferred() {
        let mut request = request("/inner");
        request
            .extensions_mut()
            .insert(OriginalUri("/api/inner?x=1".parse().unwrap()));
        let record = RequestRecord::from_request(&request);
        assert_eq!(record.raw_path, "/api/inner?x=1");
    }

    #[test]
    fn test_write_without_header_defaults_to_ok() {
        let mut record = RequestRecord::from_request(&request("/"));
        record.record_write(5);
        assert_eq!(record.status(), 200);
        assert_eq!(record.bytes(), 5);
        assert!(record.is_written());
    }

    #[test]
    fn test_header_then_write() {
        let mut record = RequestRecord::from_request(&request("/"));
        record.write_header(StatusCode::NOT_FOUND);
        record.record_write(12);
        assert_eq!(record.status(), 404);
        assert_eq!(record.bytes(), 12);
    }

    #[test]
    fn test_second_header_ignored() {
        let mut record = RequestRecord::from_request(&request("/"));
        record.write_header(StatusCode::INTERNAL_SERVER_ERROR);
        record.write_header(StatusCode::OK);
        record.record_write(0);
        assert_eq!(record.status(), 500);
        assert_eq!(record.bytes(), 0);
    }

    #[test]
    fn test_header_after_write_ignored() {
        let mut record = RequestRecord::from_request(&request("/"));
        record.record_write(3);
        record.write_header(StatusCode::BAD_GATEWAY);
        assert_eq!(record.status(), 200);
    }

    #[test]
    fn test_bytes_accumulate() {
        let mut record = RequestRecord::from_request(&request("/"));
        for len in [4, 0, 1024, 7] {
            record.record_write(len);
        }
        assert_eq!(record.bytes(), 1035);
    }
}
