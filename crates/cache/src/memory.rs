//! 프로세스 내 메모리 캐시 저장소

use std::time::{Duration, Instant};

use bytes::Bytes;
use moka::Expiry;
use moka::sync::Cache;

use reposcan_core::error::CacheError;

use crate::store::CacheStore;

#[derive(Clone)]
struct Entry {
    value: Bytes,
    ttl: Duration,
}

/// 항목마다 저장 시 지정한 TTL을 적용합니다.
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// `moka` 기반 메모리 저장소
///
/// 단일 인스턴스 배포나 테스트용입니다. 용량을 넘으면 TinyLFU 정책으로 제거됩니다.
pub struct MemoryStore {
    cache: Cache<String, Entry>,
}

impl MemoryStore {
    /// 최대 항목 수로 저장소를 생성합니다.
    pub fn new(capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .expire_after(EntryTtl)
            .build();
        Self { cache }
    }

    /// 현재 항목 수 (근사값)
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// 비어 있는지 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        Ok(self.cache.get(key).map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        self.cache.insert(key.to_owned(), Entry { value, ttl });
        Ok(())
    }
}
