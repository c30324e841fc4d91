//! HTTP API.
//!
//! - `POST /` runs (or replays from cache) an organization search. The
//!   organization and PAT come from the `Org` and `PAT` headers, the three
//!   patterns from the JSON body.
//! - `GET /health` always answers 200.
//!
//! Search responses carry `X-Reposcan-Cache: hit` or `miss`.
//!
//! Error bodies are plain text. Unclassified failures answer a bare
//! `Internal Server Error`; their detail is only logged.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use http_body_util::LengthLimitError;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use reposcan_cache::{CacheStore, ResultCache, ResultCacheError};
use reposcan_core::catalog::{CatalogConnector, Credential};
use reposcan_core::error::RepoScanError;
use reposcan_core::metrics as names;

use crate::decode::{DecodeError, decode_criteria};

/// Organization header name.
pub const ORG_HEADER: &str = "org";

/// Personal access token header name.
pub const PAT_HEADER: &str = "pat";

/// Maximum accepted request body size (1 MiB).
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Response header telling whether the body was replayed from the cache.
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-reposcan-cache");

const JSON_MIME: &str = "application/json";

/// Request failures and their client-facing messages.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Content-Type header is not application/json")]
    UnsupportedMediaType,

    #[error("Org header is required")]
    MissingOrganization,

    #[error("PAT header is required")]
    MissingCredential,

    #[error("Request body must not be larger than 1MB")]
    PayloadTooLarge,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("unable to connect to azure devops")]
    RemoteUnavailable,

    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::MissingOrganization | Self::MissingCredential | Self::Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RemoteUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ResultCacheError> for ApiError {
    fn from(err: ResultCacheError) -> Self {
        RepoScanError::from(err).into()
    }
}

impl From<RepoScanError> for ApiError {
    fn from(err: RepoScanError) -> Self {
        if err.is_remote_unavailable() {
            warn!(error = %err, "search failed: remote unavailable");
            Self::RemoteUnavailable
        } else {
            error!(error = %err, "search failed");
            Self::Internal
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Shared handler state.
pub struct AppState<S: CacheStore, F: CatalogConnector> {
    cache: Arc<ResultCache<S, F>>,
}

impl<S: CacheStore, F: CatalogConnector> AppState<S, F> {
    /// Wrap a result cache for the router.
    pub fn new(cache: Arc<ResultCache<S, F>>) -> Self {
        Self { cache }
    }

    /// The result cache serving searches.
    pub fn cache(&self) -> &Arc<ResultCache<S, F>> {
        &self.cache
    }
}

impl<S: CacheStore, F: CatalogConnector> Clone for AppState<S, F> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

/// Build the API router.
pub fn router<S: CacheStore, F: CatalogConnector>(
    state: AppState<S, F>,
    request_timeout: Duration,
) -> Router {
    Router::new()
        .route("/", post(search::<S, F>))
        .route("/health", get(health))
        .layer(middleware::from_fn(track_metrics))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn search<S: CacheStore, F: CatalogConnector>(
    State(state): State<AppState<S, F>>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    if !is_json(&headers) {
        return Err(ApiError::UnsupportedMediaType);
    }
    let organization = header_value(&headers, ORG_HEADER).ok_or(ApiError::MissingOrganization)?;
    let credential = header_value(&headers, PAT_HEADER)
        .map(Credential::new)
        .ok_or(ApiError::MissingCredential)?;

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| {
            if is_length_limit(&err) {
                ApiError::PayloadTooLarge
            } else {
                warn!(error = %err, "failed to read request body");
                ApiError::Internal
            }
        })?;
    let criteria = decode_criteria(&bytes)?;

    let response = state
        .cache
        .get_or_compute(organization, &credential, &criteria)
        .await?;

    let cache_status = if response.from_cache { "hit" } else { "miss" };
    debug!(organization, cache = cache_status, "search served");
    Ok((
        [(CONTENT_TYPE, JSON_MIME), (CACHE_STATUS_HEADER, cache_status)],
        response.body,
    )
        .into_response())
}

/// Whether the `Content-Type` essence is `application/json`.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_MIME))
}

/// Non-empty header value.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let response = next.run(request).await;
    let status = response.status().as_u16().to_string();
    metrics::counter!(names::HTTP_REQUESTS_TOTAL, names::LABEL_STATUS => status).increment(1);
    metrics::histogram!(names::HTTP_REQUEST_DURATION_SECONDS)
        .record(started.elapsed().as_secs_f64());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn json_content_type_essence() {
        assert!(is_json(&headers(&[("content-type", "application/json")])));
        assert!(is_json(&headers(&[(
            "content-type",
            "application/json; charset=utf-8"
        )])));
        assert!(is_json(&headers(&[("content-type", "Application/JSON")])));
        assert!(!is_json(&headers(&[("content-type", "text/plain")])));
        assert!(!is_json(&headers(&[])));
    }

    #[test]
    fn empty_header_counts_as_missing() {
        let map = headers(&[("org", ""), ("pat", "token")]);
        assert_eq!(header_value(&map, ORG_HEADER), None);
        assert_eq!(header_value(&map, PAT_HEADER), Some("token"));
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            ApiError::UnsupportedMediaType.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(ApiError::MissingCredential.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Decode(DecodeError::Empty).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ApiError::RemoteUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::Internal.to_string(), "Internal Server Error");
    }

    #[test]
    fn scan_failures_are_classified_through_top_level_error() {
        use reposcan_core::error::CatalogError;
        use reposcan_scanner::ScannerError;

        let unavailable = ResultCacheError::from(ScannerError::RemoteUnavailable("401".to_owned()));
        assert!(matches!(ApiError::from(unavailable), ApiError::RemoteUnavailable));

        let discovery = ResultCacheError::from(ScannerError::Remote {
            scope: "my-org".to_owned(),
            source: CatalogError::remote("list_projects", Some(500), "boom"),
        });
        assert!(matches!(ApiError::from(discovery), ApiError::Internal));

        let panicked = ResultCacheError::from(ScannerError::Task("panicked".to_owned()));
        assert!(matches!(ApiError::from(panicked), ApiError::Internal));
    }
}
