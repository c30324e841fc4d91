//! 검색 결과 캐시 파사드
//!
//! 같은 `(조직, 패턴)` 요청은 TTL 동안 저장된 응답 본문을 그대로 돌려받습니다.
//! 경고가 포함된 부분 결과도 저장되며, 별도의 수명을 줄 수 있습니다.
//! 캐시 저장소 장애는 요청을 실패시키지 않습니다.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use reposcan_core::catalog::{CatalogConnector, Credential};
use reposcan_core::telemetry::{CacheLookup, Telemetry};
use reposcan_core::types::SearchCriteria;
use reposcan_scanner::OrganizationScanner;

use crate::error::ResultCacheError;
use crate::key::cache_key;
use crate::store::CacheStore;

const OP_CACHE_GET: &str = "get";
const OP_CACHE_SET: &str = "set";

/// 직렬화된 검색 응답
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// JSON 응답 본문
    pub body: Bytes,
    /// 캐시에서 읽은 응답인지 여부
    pub from_cache: bool,
}

/// get-or-compute 캐시 파사드
pub struct ResultCache<S: CacheStore, F: CatalogConnector> {
    store: Arc<S>,
    scanner: Arc<OrganizationScanner<F>>,
    ttl: Duration,
    partial_ttl: Duration,
    telemetry: Arc<dyn Telemetry>,
}

impl<S: CacheStore, F: CatalogConnector> ResultCache<S, F> {
    /// 새 파사드를 생성합니다. 부분 결과도 `ttl` 동안 보관됩니다.
    pub fn new(
        store: Arc<S>,
        scanner: Arc<OrganizationScanner<F>>,
        ttl: Duration,
        telemetry: Arc<dyn Telemetry>,
    ) -> Self {
        Self {
            store,
            scanner,
            ttl,
            partial_ttl: ttl,
            telemetry,
        }
    }

    /// 경고가 포함된 결과의 수명을 지정합니다.
    pub fn with_partial_ttl(mut self, partial_ttl: Duration) -> Self {
        self.partial_ttl = partial_ttl;
        self
    }

    /// 공유 스캐너
    pub fn scanner(&self) -> &Arc<OrganizationScanner<F>> {
        &self.scanner
    }

    /// 캐시된 응답을 반환하거나, 없으면 스캔 후 저장하고 반환합니다.
    ///
    /// 경고가 포함된 결과는 부분 결과 수명으로 저장합니다.
    ///
    /// # Errors
    /// 스캔 실패와 결과 직렬화 실패만 에러로 반환됩니다.
    pub async fn get_or_compute(
        &self,
        organization: &str,
        credential: &Credential,
        criteria: &SearchCriteria,
    ) -> Result<CachedResponse, ResultCacheError> {
        let key = cache_key(organization, criteria);

        match self.store.get(&key).await {
            Ok(Some(body)) => {
                self.telemetry.cache_lookup(&key, CacheLookup::Hit);
                return Ok(CachedResponse {
                    body,
                    from_cache: true,
                });
            }
            Ok(None) => self.telemetry.cache_lookup(&key, CacheLookup::Miss),
            Err(err) => {
                self.telemetry.cache_failure(OP_CACHE_GET, &err.to_string());
                self.telemetry.cache_lookup(&key, CacheLookup::Miss);
            }
        }

        let results = self
            .scanner
            .search(organization, credential, criteria)
            .await?;
        let body = Bytes::from(serde_json::to_vec(&results)?);

        let ttl = if results.is_complete() {
            self.ttl
        } else {
            debug!(
                warnings = results.warnings.len(),
                ttl_secs = self.partial_ttl.as_secs(),
                "caching partial scan result"
            );
            self.partial_ttl
        };
        if let Err(err) = self.store.set(&key, body.clone(), ttl).await {
            self.telemetry.cache_failure(OP_CACHE_SET, &err.to_string());
        }

        Ok(CachedResponse {
            body,
            from_cache: false,
        })
    }
}
