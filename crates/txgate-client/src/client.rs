//! Signed HTTP client for the remote ledger API

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Request};
use serde::Serialize;
use std::time::Duration;
use txgate_config::UpstreamConfig;
use txgate_core::{LedgerSource, ResultEnvelope, UpstreamError};

use crate::error::ClientError;
use crate::signer::{SignedRequest, Signer};

/// Longest upstream error body kept for logging
const MAX_ERROR_BODY: usize = 512;

/// Body of `POST /transaction/search`
#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    p: u64,
}

/// Remote ledger API client
pub struct RemoteClient {
    http_client: HttpClient,
    base_url: String,
    api_key: HeaderValue,
    key_header: HeaderName,
    timestamp_header: HeaderName,
    signature_header: HeaderName,
    signer: Signer,
}

impl RemoteClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientError> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Build {
                message: e.to_string(),
            })?;

        let mut api_key = HeaderValue::from_str(&config.api_key).map_err(|e| ClientError::InvalidHeader {
            name: config.key_header.clone(),
            message: e.to_string(),
        })?;
        api_key.set_sensitive(true);

        Ok(Self {
            http_client,
            base_url: config.base_url().to_string(),
            api_key,
            key_header: header_name(&config.key_header)?,
            timestamp_header: header_name(&config.timestamp_header)?,
            signature_header: header_name(&config.signature_header)?,
            signer: Signer::new(&config.api_secret)?,
        })
    }

    /// Build `GET {base}/transaction/find-by-user?p={page}`, signed over an empty body
    pub fn build_list_request(&self, page: u64) -> Result<Request, UpstreamError> {
        let signed = self.signer.sign("");
        self.http_client
            .get(format!("{}/transaction/find-by-user", self.base_url))
            .query(&[("p", page)])
            .headers(self.signed_headers(&signed)?)
            .build()
            .map_err(map_transport)
    }

    /// Build `POST {base}/transaction/search`. The body is serialized once;
    /// the same bytes are signed and sent.
    pub fn build_search_request(&self, query: &str, page: u64) -> Result<Request, UpstreamError> {
        let body = serde_json::to_string(&SearchBody { query, p: page }).map_err(|e| {
            UpstreamError::Transport {
                message: format!("failed to encode search body: {}", e),
            }
        })?;
        let signed = self.signer.sign(&body);
        self.http_client
            .post(format!("{}/transaction/search", self.base_url))
            .headers(self.signed_headers(&signed)?)
            .body(body)
            .build()
            .map_err(map_transport)
    }

    fn signed_headers(&self, signed: &SignedRequest) -> Result<HeaderMap, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(self.key_header.clone(), self.api_key.clone());
        headers.insert(self.timestamp_header.clone(), header_value(&signed.timestamp)?);
        headers.insert(self.signature_header.clone(), header_value(&signed.signature)?);
        Ok(headers)
    }

    /// Send a request and decode the envelope, mapping every failure to [`UpstreamError`]
    async fn execute(&self, request: Request) -> Result<ResultEnvelope, UpstreamError> {
        log::debug!("upstream {} {}", request.method(), request.url().path());

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate(&mut body, MAX_ERROR_BODY);
            return Err(UpstreamError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(map_transport)?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl LedgerSource for RemoteClient {
    async fn fetch_list(&self, page: u64) -> Result<ResultEnvelope, UpstreamError> {
        let request = self.build_list_request(page)?;
        self.execute(request).await
    }

    async fn search(&self, query: &str, page: u64) -> Result<ResultEnvelope, UpstreamError> {
        let request = self.build_search_request(query, page)?;
        self.execute(request).await
    }
}

fn header_name(name: &str) -> Result<HeaderName, ClientError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| ClientError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })
}

fn header_value(value: &str) -> Result<HeaderValue, UpstreamError> {
    HeaderValue::from_str(value).map_err(|e| UpstreamError::Transport {
        message: format!("invalid header value: {}", e),
    })
}

fn map_transport(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport {
            message: e.to_string(),
        }
    }
}

fn truncate(s: &mut String, max: usize) {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const ENVELOPE: &str = r#"{"data":[{"id":"R1","sender":"Ann","receiver":"current_user",
        "amount":10.5,"currency":"ETB","cause":"Rent share","created_at":"2025-09-01T08:00:00Z"}],
        "total":31,"page":2,"per_page":1,"total_pages":31,"from":2,"to":2}"#;

    fn config(base_url: &str) -> UpstreamConfig {
        UpstreamConfig {
            base_url: base_url.to_string(),
            api_key: "key-123".to_string(),
            api_secret: "s3cret".to_string(),
            timeout_secs: 1,
            ..UpstreamConfig::default()
        }
    }

    fn signed_from(request: &Request) -> SignedRequest {
        SignedRequest {
            timestamp: request.headers()["YAYA-API-TIMESTAMP"].to_str().unwrap().to_string(),
            signature: request.headers()["YAYA-API-SIGN"].to_str().unwrap().to_string(),
        }
    }

    /// Serve one canned HTTP response and hand back the raw request text
    async fn serve_once(response: &'static str, delay: Duration) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if raw.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            tokio::time::sleep(delay).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&raw).into_owned()
        });
        (format!("http://{}", addr), handle)
    }

    fn http_response(status: &str, body: &str) -> &'static str {
        Box::leak(
            format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .into_boxed_str(),
        )
    }

    #[test]
    fn test_list_request_shape() {
        let client = RemoteClient::new(&config("https://ledger.example.com/api/en/")).unwrap();
        let request = client.build_list_request(3).unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://ledger.example.com/api/en/transaction/find-by-user?p=3"
        );
        assert_eq!(request.headers()["YAYA-API-KEY"], "key-123");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert!(request.body().is_none());

        let signer = Signer::new("s3cret").unwrap();
        assert!(signer.verify(&signed_from(&request), ""));
    }

    #[test]
    fn test_search_request_signs_exact_body() {
        let client = RemoteClient::new(&config("https://ledger.example.com")).unwrap();
        let request = client.build_search_request("Rent \"flat\"", 2).unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://ledger.example.com/transaction/search");

        let body = std::str::from_utf8(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body, r#"{"query":"Rent \"flat\"","p":2}"#);

        let signer = Signer::new("s3cret").unwrap();
        let signed = signed_from(&request);
        assert!(signer.verify(&signed, body));
        assert!(!signer.verify(&signed, ""));
    }

    #[test]
    fn test_bad_header_config() {
        let mut cfg = config("https://ledger.example.com");
        cfg.api_key = "line\nbreak".to_string();
        assert!(matches!(RemoteClient::new(&cfg), Err(ClientError::InvalidHeader { .. })));

        let mut cfg = config("https://ledger.example.com");
        cfg.api_secret = String::new();
        assert!(matches!(RemoteClient::new(&cfg), Err(ClientError::EmptySecret)));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let mut s = "ééé".to_string();
        truncate(&mut s, 3);
        assert_eq!(s, "é");
    }

    #[tokio::test]
    async fn test_fetch_list_decodes_envelope() {
        let (base, server) = serve_once(http_response("200 OK", ENVELOPE), Duration::ZERO).await;
        let client = RemoteClient::new(&config(&base)).unwrap();

        let env = client.fetch_list(2).await.unwrap();
        assert_eq!(env.total, 31);
        assert_eq!(env.data[0].id, "R1");
        assert!(!env.is_fallback());

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /transaction/find-by-user?p=2 HTTP/1.1"));
        assert!(raw.to_lowercase().contains("yaya-api-key: key-123"));
    }

    #[tokio::test]
    async fn test_search_sends_signed_body() {
        let (base, server) = serve_once(http_response("200 OK", ENVELOPE), Duration::ZERO).await;
        let client = RemoteClient::new(&config(&base)).unwrap();

        client.search("rent", 1).await.unwrap();

        let raw = server.await.unwrap();
        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        assert!(head.starts_with("POST /transaction/search HTTP/1.1"));
        assert_eq!(body, r#"{"query":"rent","p":1}"#);

        let header = |name: &str| {
            head.lines()
                .find_map(|l| {
                    let (k, v) = l.split_once(':')?;
                    k.eq_ignore_ascii_case(name).then(|| v.trim().to_string())
                })
                .unwrap()
        };
        let signed = SignedRequest {
            timestamp: header("yaya-api-timestamp"),
            signature: header("yaya-api-sign"),
        };
        assert!(Signer::new("s3cret").unwrap().verify(&signed, body));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_http_status() {
        let (base, _server) =
            serve_once(http_response("503 Service Unavailable", "{\"error\":\"down\"}"), Duration::ZERO).await;
        let client = RemoteClient::new(&config(&base)).unwrap();

        let err = client.fetch_list(1).await.unwrap_err();
        assert_eq!(
            err,
            UpstreamError::HttpStatus {
                status: 503,
                body: "{\"error\":\"down\"}".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_shape_mismatch_maps_to_decode() {
        let (base, _server) =
            serve_once(http_response("200 OK", "{\"items\":[]}"), Duration::ZERO).await;
        let client = RemoteClient::new(&config(&base)).unwrap();

        let err = client.search("rent", 1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_stalled_upstream_times_out() {
        let (base, _server) =
            serve_once(http_response("200 OK", ENVELOPE), Duration::from_secs(5)).await;
        let client = RemoteClient::new(&config(&base)).unwrap();

        let err = client.fetch_list(1).await.unwrap_err();
        assert_eq!(err, UpstreamError::Timeout);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RemoteClient::new(&config(&format!("http://{}", addr))).unwrap();
        let err = client.fetch_list(1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport { .. }));
    }
}
