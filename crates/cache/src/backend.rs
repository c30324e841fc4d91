//! 설정으로 선택되는 캐시 백엔드

use std::time::Duration;

use bytes::Bytes;
use tracing::info;

use reposcan_core::config::{
    CACHE_BACKEND_DISABLED, CACHE_BACKEND_MEMORY, CACHE_BACKEND_REDIS, CacheConfig,
};
use reposcan_core::error::CacheError;

use crate::memory::MemoryStore;
use crate::redis_store::RedisStore;
use crate::store::CacheStore;

/// 시작 시 한 번 선택되는 캐시 백엔드
pub enum CacheBackend {
    /// 프로세스 내 메모리
    Memory(MemoryStore),
    /// Redis
    Redis(RedisStore),
    /// 캐시 사용 안 함 (항상 미스)
    Disabled,
}

impl CacheBackend {
    /// `cache.backend` 값으로 백엔드를 생성합니다.
    ///
    /// # Errors
    /// 알 수 없는 백엔드 이름이거나 Redis 설정이 잘못되었으면 에러를 반환합니다.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        let backend = match config.backend.as_str() {
            CACHE_BACKEND_MEMORY => Self::Memory(MemoryStore::new(config.memory_capacity)),
            CACHE_BACKEND_REDIS => Self::Redis(RedisStore::new(config)?),
            CACHE_BACKEND_DISABLED => Self::Disabled,
            other => {
                return Err(CacheError::Unavailable(format!(
                    "unknown cache backend '{other}'"
                )));
            }
        };
        info!(
            backend = backend.name(),
            ttl_secs = config.ttl_secs,
            "cache backend selected"
        );
        Ok(backend)
    }

    /// 백엔드 이름
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => CACHE_BACKEND_MEMORY,
            Self::Redis(_) => CACHE_BACKEND_REDIS,
            Self::Disabled => CACHE_BACKEND_DISABLED,
        }
    }
}

impl CacheStore for CacheBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        match self {
            Self::Memory(store) => store.get(key).await,
            Self::Redis(store) => store.get(key).await,
            Self::Disabled => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        match self {
            Self::Memory(store) => store.set(key, value, ttl).await,
            Self::Redis(store) => store.set(key, value, ttl).await,
            Self::Disabled => Ok(()),
        }
    }
}
