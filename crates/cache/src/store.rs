//! 캐시 저장소 계약

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use reposcan_core::error::CacheError;

/// 키-값 캐시 저장소
///
/// 값은 직렬화된 응답 본문이며, 저장소는 내용을 해석하지 않습니다.
pub trait CacheStore: Send + Sync + 'static {
    /// 키에 해당하는 값을 조회합니다. 없거나 만료되었으면 `None`입니다.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>, CacheError>> + Send;

    /// 값을 `ttl` 동안 저장합니다. 같은 키의 기존 값은 덮어씁니다.
    fn set(
        &self,
        key: &str,
        value: Bytes,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
}
