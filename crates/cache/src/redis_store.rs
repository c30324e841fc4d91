//! Redis 캐시 저장소
//!
//! 멀티플렉스 연결 하나를 모든 요청이 공유합니다. 연결은 첫 사용 시 수립되고,
//! 명령이 실패하면 버려졌다가 다음 호출에서 다시 수립됩니다.
//!
//! 연결 수립과 각 명령은 `cache.timeout_ms` 안에 끝나야 합니다. 응답하지 않는
//! 서버는 캐시 장애로 취급되어 요청이 캐시 없이 계속 진행됩니다.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use reposcan_core::config::CacheConfig;
use reposcan_core::error::CacheError;

use crate::store::CacheStore;

/// Redis 저장소
pub struct RedisStore {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
    timeout: Duration,
}

impl RedisStore {
    /// 설정으로 저장소를 생성합니다. 네트워크 연결은 하지 않습니다.
    ///
    /// # Errors
    /// 연결 URL을 만들 수 없거나, `redis-tls` feature 없이 TLS를 요청하면
    /// [`CacheError::Unavailable`]을 반환합니다.
    pub fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        if config.tls && !cfg!(feature = "redis-tls") {
            return Err(CacheError::Unavailable(
                "cache.tls requires the redis-tls feature".to_owned(),
            ));
        }
        let url = connection_url(config)?;
        let client = redis::Client::open(url.as_str())
            .map_err(|e| CacheError::Unavailable(format!("invalid redis url: {e}")))?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
            timeout: config.timeout(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        if let Some(connection) = self.connection.lock().await.as_ref() {
            return Ok(connection.clone());
        }

        // 슬롯 잠금 없이 연결합니다. 동시에 연결한 호출 중 먼저 저장한 쪽이 남습니다.
        let connection = tokio::time::timeout(
            self.timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            CacheError::Unavailable(format!("redis connect timed out after {:?}", self.timeout))
        })?
        .map_err(|e| CacheError::Unavailable(format!("redis connect failed: {e}")))?;

        let mut slot = self.connection.lock().await;
        if let Some(existing) = slot.as_ref() {
            return Ok(existing.clone());
        }
        debug!("redis connection established");
        *slot = Some(connection.clone());
        Ok(connection)
    }

    async fn reset(&self, reason: &str) {
        warn!(error = %reason, "redis command failed, dropping connection");
        *self.connection.lock().await = None;
    }

    /// 명령 하나를 제한 시간 안에 실행합니다. 실패하거나 시간이 지나면 연결을 버립니다.
    async fn command<T>(
        &self,
        name: &str,
        command: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T, CacheError> {
        let reason = match tokio::time::timeout(self.timeout, command).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => format!("redis {name} failed: {err}"),
            Err(_) => format!("redis {name} timed out after {:?}", self.timeout),
        };
        self.reset(&reason).await;
        Err(CacheError::Unavailable(reason))
    }
}

impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut connection = self.connection().await?;
        let value = self
            .command("GET", connection.get::<_, Option<Vec<u8>>>(key))
            .await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        let seconds = ttl.as_secs().max(1);
        self.command(
            "SET",
            connection.set_ex::<_, _, ()>(key, value.as_ref(), seconds),
        )
        .await
    }
}

/// 설정으로 `redis://` 또는 `rediss://` URL을 만듭니다.
pub fn connection_url(config: &CacheConfig) -> Result<Url, CacheError> {
    let scheme = if config.tls { "rediss" } else { "redis" };
    let mut url = Url::parse(&format!("{scheme}://{}:{}", config.host, config.port))
        .map_err(|e| CacheError::Unavailable(format!("invalid redis address: {e}")))?;
    if !config.password.is_empty() {
        url.set_password(Some(&config.password))
            .map_err(|()| CacheError::Unavailable("redis url cannot carry a password".to_owned()))?;
    }
    Ok(url)
}
