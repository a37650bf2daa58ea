//! HTTP client for the Hotelbeds availability API.
//!
//! Each call is signed with `hex(sha256(api_key + secret + unix_seconds))`
//! and sent as JSON. Non-200 answers are classified into [`SupplierError`]
//! according to the status code.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{
    HotelSupplier, SimpleErrorBody, SupplierError, SupplierSearchRequest, SupplierSearchResponse,
};
use crate::clock::Clock;

pub const HOTELS_ENDPOINT: &str = "/hotel-api/1.0/hotels";

const HEADER_API_KEY: &str = "Api-key";
const HEADER_SIGNATURE: &str = "X-Signature";
const APPLICATION_JSON: &str = "application/json";
const GZIP: &str = "gzip";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const GENERIC_ERROR_MESSAGE: &str = "internal server error";

/// Statuses answered with a flat `{"error": "..."}` body.
const SIMPLE_ERROR_STATUSES: [StatusCode; 3] = [
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::TOO_MANY_REQUESTS,
];

/// Statuses whose body is never read.
const BODYLESS_ERROR_STATUSES: [StatusCode; 8] = [
    StatusCode::PAYMENT_REQUIRED,
    StatusCode::NOT_ACCEPTABLE,
    StatusCode::CONFLICT,
    StatusCode::GONE,
    StatusCode::UNSUPPORTED_MEDIA_TYPE,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Connection settings for [`HotelbedsClient`].
#[derive(Debug, Clone)]
pub struct HotelbedsConfig {
    pub host: String,
    pub api_key: String,
    pub secret: String,
}

/// Signed HTTP client for the supplier. Cheap to share: the underlying
/// connection pool is reused across requests.
pub struct HotelbedsClient {
    http: reqwest::Client,
    clock: Arc<dyn Clock>,
    host: String,
    api_key: String,
    secret: String,
}

impl HotelbedsClient {
    /// Build a client with the fixed 5 second request timeout.
    pub fn new(config: HotelbedsConfig, clock: Arc<dyn Clock>) -> Result<Self, SupplierError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http_client(config, clock, http))
    }

    pub fn with_http_client(
        config: HotelbedsConfig,
        clock: Arc<dyn Clock>,
        http: reqwest::Client,
    ) -> Self {
        let host = match config.host.strip_suffix('/') {
            Some(stripped) => stripped.to_string(),
            None => config.host,
        };

        Self {
            http,
            clock,
            host,
            api_key: config.api_key,
            secret: config.secret,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Signature for the current second. Recomputed on every call.
    pub fn sign(&self) -> String {
        signature(&self.api_key, &self.secret, self.clock.now().timestamp())
    }
}

/// `hex(sha256(api_key + secret + unix_seconds))`.
pub fn signature(api_key: &str, secret: &str, unix_seconds: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.update(unix_seconds.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Turn a non-200 answer into a [`SupplierError`].
async fn classify(resp: reqwest::Response) -> SupplierError {
    let status = resp.status();
    let status_text = status.canonical_reason().unwrap_or_default().to_string();

    let err = if SIMPLE_ERROR_STATUSES.contains(&status) {
        match read_json::<SimpleErrorBody>(resp).await {
            Ok(body) => SupplierError::Api {
                status,
                code: status_text,
                message: body.error,
            },
            Err(e) => e,
        }
    } else if BODYLESS_ERROR_STATUSES.contains(&status) {
        SupplierError::Api {
            status,
            code: status_text,
            message: GENERIC_ERROR_MESSAGE.to_string(),
        }
    } else {
        match read_json::<SupplierSearchResponse>(resp).await {
            Ok(body) => {
                let body = body.error.unwrap_or_default();
                SupplierError::Api {
                    status,
                    code: body.code,
                    message: body.message,
                }
            }
            Err(e) => e,
        }
    };

    warn!(status = %status, error = %err, "supplier rejected search");
    err
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, SupplierError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(SupplierError::Decode)
}

#[async_trait]
impl HotelSupplier for HotelbedsClient {
    async fn search(
        &self,
        request: &SupplierSearchRequest,
    ) -> Result<SupplierSearchResponse, SupplierError> {
        let body = serde_json::to_vec(request).map_err(SupplierError::Encode)?;
        let url = format!("{}{}", self.host, HOTELS_ENDPOINT);

        debug!(url, hotels = request.hotels.hotel.len(), "searching supplier");

        let resp = self
            .http
            .post(&url)
            .header(HEADER_API_KEY, &self.api_key)
            .header(ACCEPT, APPLICATION_JSON)
            .header(ACCEPT_ENCODING, GZIP)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(HEADER_SIGNATURE, self.sign())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!(url, error = %e, "supplier transport failure");
                SupplierError::Transport(e)
            })?;

        if resp.status() != StatusCode::OK {
            return Err(classify(resp).await);
        }

        read_json(resp).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::Router;
    use chrono::{TimeZone, Utc};
    use tokio::net::TcpListener;
    use tower_http::compression::CompressionLayer;

    use super::*;
    use crate::clock::FixedClock;

    const FIXTURE: &str = include_str!("../../tests/testdata/hotelbeds_response.json");
    const API_KEY: &str = "12345";
    const SECRET: &str = "6789";

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 7, 12, 11, 4, 5).unwrap(),
        ))
    }

    fn client(host: &str) -> HotelbedsClient {
        HotelbedsClient::new(
            HotelbedsConfig {
                host: host.to_string(),
                api_key: API_KEY.to_string(),
                secret: SECRET.to_string(),
            },
            fixed_clock(),
        )
        .unwrap()
    }

    async fn spawn_upstream(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn upstream_replying(status: StatusCode, body: &'static str) -> String {
        let router = Router::new().route(
            HOTELS_ENDPOINT,
            post(move || async move { (status, body) }),
        );
        spawn_upstream(router).await
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(HeaderMap, Bytes)>>>);

    async fn capture(
        State(captured): State<Captured>,
        headers: HeaderMap,
        body: Bytes,
    ) -> impl IntoResponse {
        captured.0.lock().unwrap().push((headers, body));
        r#"{"message": "hello, world"}"#
    }

    #[test]
    fn signature_is_sha256_of_key_secret_and_seconds() {
        assert_eq!(
            signature(API_KEY, SECRET, 1_720_782_245),
            "9564bda05ff3f1e28820fd1cbfcd8b5e0c52bfc423c0d5ecb277a6f0cde6df79"
        );
    }

    #[test]
    fn sign_uses_injected_clock() {
        let c = client("http://localhost");
        assert_eq!(c.sign(), signature(API_KEY, SECRET, 1_720_782_245));
        assert_eq!(c.sign().len(), 64);
    }

    #[test]
    fn trailing_slash_is_stripped_once() {
        assert_eq!(client("http://localhost:9000/").host(), "http://localhost:9000");
        assert_eq!(client("http://localhost:9000").host(), "http://localhost:9000");
        assert_eq!(client("http://localhost:9000//").host(), "http://localhost:9000/");
    }

    #[tokio::test]
    async fn host_without_scheme_is_a_transport_error() {
        let res = client("0.0.0.0").search(&SupplierSearchRequest::default()).await;
        assert!(matches!(res, Err(SupplierError::Transport(_))));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let res = client(&format!("http://{addr}"))
            .search(&SupplierSearchRequest::default())
            .await;
        assert!(matches!(res, Err(SupplierError::Transport(_))));
    }

    #[tokio::test]
    async fn sends_signed_json_request() {
        let captured = Captured::default();
        let router = Router::new()
            .route(HOTELS_ENDPOINT, post(capture))
            .with_state(captured.clone());
        let host = spawn_upstream(router).await;

        let req = SupplierSearchRequest {
            hotels: crate::client::HotelIds { hotel: vec![7] },
            ..Default::default()
        };
        let res = client(&format!("{host}/")).search(&req).await.unwrap();
        assert_eq!(res, SupplierSearchResponse::default());

        let calls = captured.0.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (headers, body) = &calls[0];
        assert_eq!(headers["x-signature"], signature(API_KEY, SECRET, 1_720_782_245).as_str());
        assert_eq!(headers["api-key"], API_KEY);
        assert_eq!(headers["accept"], APPLICATION_JSON);
        assert_eq!(headers["accept-encoding"], GZIP);
        assert_eq!(headers["content-type"], APPLICATION_JSON);
        assert_eq!(body.as_ref(), serde_json::to_vec(&req).unwrap().as_slice());
    }

    #[tokio::test]
    async fn simple_error_statuses_use_status_text_and_body() {
        for status in SIMPLE_ERROR_STATUSES {
            let host = upstream_replying(status, r#"{"error": "something went wrong"}"#).await;
            let err = client(&host)
                .search(&SupplierSearchRequest::default())
                .await
                .unwrap_err();
            match err {
                SupplierError::Api {
                    status: got,
                    code,
                    message,
                } => {
                    assert_eq!(got, status);
                    assert_eq!(code, status.canonical_reason().unwrap());
                    assert_eq!(message, "something went wrong");
                }
                other => panic!("unexpected error for {status}: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn simple_error_with_bad_body_is_a_decode_error() {
        let host = upstream_replying(StatusCode::UNAUTHORIZED, "not json").await;
        let err = client(&host)
            .search(&SupplierSearchRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SupplierError::Decode(_)));
    }

    #[tokio::test]
    async fn bodyless_statuses_use_generic_message() {
        for status in BODYLESS_ERROR_STATUSES {
            let host = upstream_replying(status, "don't care'").await;
            let err = client(&host)
                .search(&SupplierSearchRequest::default())
                .await
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                format!(
                    "code: {} | message: internal server error",
                    status.canonical_reason().unwrap()
                )
            );
        }
    }

    #[tokio::test]
    async fn other_statuses_use_nested_error_envelope() {
        let body = r#"
            {
                "auditData": {},
                "error": {
                    "code": "ERR CODE",
                    "message": "detailed message"
                }
            }"#;
        for status in [StatusCode::BAD_REQUEST, StatusCode::NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR] {
            let host = upstream_replying(status, body).await;
            let err = client(&host)
                .search(&SupplierSearchRequest::default())
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "code: ERR CODE | message: detailed message");
            assert!(matches!(err, SupplierError::Api { status: s, .. } if s == status));
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let host = upstream_replying(StatusCode::OK, "{").await;
        let err = client(&host)
            .search(&SupplierSearchRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SupplierError::Decode(_)));
    }

    #[tokio::test]
    async fn decodes_success_body() {
        let expected: SupplierSearchResponse = serde_json::from_str(FIXTURE).unwrap();
        let host = upstream_replying(StatusCode::OK, FIXTURE).await;

        let res = client(&host)
            .search(&SupplierSearchRequest::default())
            .await
            .unwrap();
        assert_eq!(res, expected);
        assert_eq!(res.hotels.hotels.len(), 3);
    }

    #[tokio::test]
    async fn decodes_gzip_encoded_body() {
        let expected: SupplierSearchResponse = serde_json::from_str(FIXTURE).unwrap();
        let router = Router::new()
            .route(
                HOTELS_ENDPOINT,
                post(|| async { ([(CONTENT_TYPE, APPLICATION_JSON)], FIXTURE) }),
            )
            .layer(CompressionLayer::new());
        let host = spawn_upstream(router).await;

        let res = client(&host)
            .search(&SupplierSearchRequest::default())
            .await
            .unwrap();
        assert_eq!(res, expected);
    }
}
