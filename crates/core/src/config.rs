//! 설정 관리: reposcan.toml 파싱 및 런타임 설정
//!
//! [`RepoScanConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`REPOSCAN_CACHE_HOST=redis` 형식, 기존 `REDIS_HOST` 등 포함)
//! 3. 설정 파일 (`reposcan.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), reposcan_core::error::RepoScanError> {
//! use reposcan_core::config::RepoScanConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = RepoScanConfig::load("reposcan.toml").await?;
//!
//! // 설정 파일 없이 기본값 + 환경변수
//! let config = RepoScanConfig::from_env()?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = RepoScanConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RepoScanError};

/// 캐시 백엔드: Redis
pub const CACHE_BACKEND_REDIS: &str = "redis";
/// 캐시 백엔드: 프로세스 내 메모리
pub const CACHE_BACKEND_MEMORY: &str = "memory";
/// 캐시 백엔드: 캐시 사용 안 함
pub const CACHE_BACKEND_DISABLED: &str = "disabled";

/// reposcan 통합 설정
///
/// `reposcan.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoScanConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// HTTP 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 원격 카탈로그 설정
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// 스캔 엔진 설정
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// 결과 캐시 설정
    #[serde(default)]
    pub cache: CacheConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl RepoScanConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RepoScanError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값과 환경변수만으로 설정을 만듭니다.
    pub fn from_env() -> Result<Self, RepoScanError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RepoScanError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RepoScanError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                RepoScanError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, RepoScanError> {
        toml::from_str(toml_str).map_err(|e| {
            RepoScanError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `REPOSCAN_{SECTION}_{FIELD}`
    /// 예: `REPOSCAN_SCANNER_MAX_IN_FLIGHT=64`
    ///
    /// 기존 배포 환경의 변수(`REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`,
    /// `LOG_FILE_LOCATION`, `APPINSIGHTS_INSTRUMENTATIONKEY`)도 적용하며,
    /// 같은 값에 대해서는 `REPOSCAN_` 변수가 우선합니다.
    pub fn apply_env_overrides(&mut self) {
        // 기존 변수 (먼저 적용하여 REPOSCAN_ 변수가 덮어쓸 수 있게 함)
        override_string(&mut self.cache.host, "REDIS_HOST");
        override_port(&mut self.cache.port, "REDIS_PORT");
        override_string(&mut self.cache.password, "REDIS_PASSWORD");
        override_string(&mut self.general.log_file, "LOG_FILE_LOCATION");
        override_string(
            &mut self.metrics.instrumentation_key,
            "APPINSIGHTS_INSTRUMENTATIONKEY",
        );

        // General
        override_string(&mut self.general.log_level, "REPOSCAN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "REPOSCAN_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.log_file, "REPOSCAN_GENERAL_LOG_FILE");

        // Server
        override_string(&mut self.server.listen_addr, "REPOSCAN_SERVER_LISTEN_ADDR");
        override_port(&mut self.server.port, "REPOSCAN_SERVER_PORT");
        override_u64(
            &mut self.server.request_timeout_secs,
            "REPOSCAN_SERVER_REQUEST_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.server.shutdown_grace_secs,
            "REPOSCAN_SERVER_SHUTDOWN_GRACE_SECS",
        );

        // Catalog
        override_string(&mut self.catalog.base_url, "REPOSCAN_CATALOG_BASE_URL");
        override_string(&mut self.catalog.api_version, "REPOSCAN_CATALOG_API_VERSION");
        override_u64(
            &mut self.catalog.request_timeout_secs,
            "REPOSCAN_CATALOG_REQUEST_TIMEOUT_SECS",
        );

        // Scanner
        override_usize(
            &mut self.scanner.max_in_flight,
            "REPOSCAN_SCANNER_MAX_IN_FLIGHT",
        );
        override_bool(
            &mut self.scanner.strict_remote_errors,
            "REPOSCAN_SCANNER_STRICT_REMOTE_ERRORS",
        );
        override_u64(
            &mut self.scanner.max_file_size,
            "REPOSCAN_SCANNER_MAX_FILE_SIZE",
        );

        // Cache
        override_string(&mut self.cache.backend, "REPOSCAN_CACHE_BACKEND");
        override_string(&mut self.cache.host, "REPOSCAN_CACHE_HOST");
        override_port(&mut self.cache.port, "REPOSCAN_CACHE_PORT");
        override_string(&mut self.cache.password, "REPOSCAN_CACHE_PASSWORD");
        override_bool(&mut self.cache.tls, "REPOSCAN_CACHE_TLS");
        override_u64(&mut self.cache.ttl_secs, "REPOSCAN_CACHE_TTL_SECS");
        override_u64(
            &mut self.cache.partial_ttl_secs,
            "REPOSCAN_CACHE_PARTIAL_TTL_SECS",
        );
        override_u64(&mut self.cache.timeout_ms, "REPOSCAN_CACHE_TIMEOUT_MS");
        override_u64(
            &mut self.cache.memory_capacity,
            "REPOSCAN_CACHE_MEMORY_CAPACITY",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "REPOSCAN_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "REPOSCAN_METRICS_LISTEN_ADDR");
        override_port(&mut self.metrics.port, "REPOSCAN_METRICS_PORT");
        override_string(
            &mut self.metrics.instrumentation_key,
            "REPOSCAN_METRICS_INSTRUMENTATION_KEY",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RepoScanError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.server.port == 0 {
            return Err(invalid("server.port", "must not be 0"));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(invalid("server.request_timeout_secs", "must be at least 1"));
        }

        // catalog 검증
        if !(self.catalog.base_url.starts_with("http://")
            || self.catalog.base_url.starts_with("https://"))
        {
            return Err(invalid(
                "catalog.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.catalog.api_version.is_empty() {
            return Err(invalid("catalog.api_version", "must not be empty"));
        }
        if self.catalog.request_timeout_secs == 0 {
            return Err(invalid("catalog.request_timeout_secs", "must be at least 1"));
        }

        // scanner 검증
        if self.scanner.max_in_flight == 0 {
            return Err(invalid("scanner.max_in_flight", "must be at least 1"));
        }
        if self.scanner.max_file_size == 0 {
            return Err(invalid("scanner.max_file_size", "must be at least 1"));
        }

        // cache 검증
        let valid_backends = [
            CACHE_BACKEND_REDIS,
            CACHE_BACKEND_MEMORY,
            CACHE_BACKEND_DISABLED,
        ];
        if !valid_backends.contains(&self.cache.backend.as_str()) {
            return Err(invalid(
                "cache.backend",
                format!("must be one of: {}", valid_backends.join(", ")),
            ));
        }
        if self.cache.backend != CACHE_BACKEND_DISABLED && self.cache.ttl_secs == 0 {
            return Err(invalid("cache.ttl_secs", "must be at least 1"));
        }
        if self.cache.backend != CACHE_BACKEND_DISABLED && self.cache.partial_ttl_secs == 0 {
            return Err(invalid("cache.partial_ttl_secs", "must be at least 1"));
        }
        if self.cache.backend == CACHE_BACKEND_REDIS {
            if self.cache.host.is_empty() {
                return Err(invalid(
                    "cache.host",
                    "host must not be empty when backend is redis",
                ));
            }
            if self.cache.port == 0 {
                return Err(invalid("cache.port", "must not be 0"));
            }
            if self.cache.timeout_ms == 0 {
                return Err(invalid("cache.timeout_ms", "must be at least 1"));
            }
        }
        if self.cache.backend == CACHE_BACKEND_MEMORY && self.cache.memory_capacity == 0 {
            return Err(invalid("cache.memory_capacity", "must be at least 1"));
        }

        // metrics 검증
        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid("metrics.port", "must not be 0 when metrics are enabled"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> RepoScanError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 로그 파일 경로 (비어 있으면 stdout만 사용)
    pub log_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            log_file: String::new(),
        }
    }
}

/// HTTP 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인드 주소
    pub listen_addr: String,
    /// 바인드 포트
    pub port: u16,
    /// 요청 하나의 최대 처리 시간 (초)
    pub request_timeout_secs: u64,
    /// 종료 신호 후 진행 중 요청을 기다리는 시간 (초)
    pub shutdown_grace_secs: u64,
}

impl ServerConfig {
    /// 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 종료 유예 시간
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_owned(),
            port: 8080,
            request_timeout_secs: 120,
            shutdown_grace_secs: 10,
        }
    }
}

/// 원격 카탈로그 (Azure DevOps) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// 서비스 기본 URL (조직 URL = `{base_url}/{organization}`)
    pub base_url: String,
    /// REST API 버전
    pub api_version: String,
    /// 원격 호출 하나의 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl CatalogConfig {
    /// 원격 호출 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dev.azure.com".to_owned(),
            api_version: "7.1".to_owned(),
            request_timeout_secs: 60,
        }
    }
}

/// 스캔 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// 동시에 진행 가능한 원격 호출 수 (프로세스 전체)
    pub max_in_flight: usize,
    /// 노드 단위 원격 에러도 스캔 전체 실패로 처리할지 여부
    pub strict_remote_errors: bool,
    /// 파일 하나에서 읽을 최대 바이트 수
    pub max_file_size: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 32,
            strict_remote_errors: false,
            max_file_size: 10 * 1024 * 1024, // 10MiB
        }
    }
}

/// 결과 캐시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 백엔드 (redis, memory, disabled)
    pub backend: String,
    /// Redis 호스트
    pub host: String,
    /// Redis 포트
    pub port: u16,
    /// Redis 비밀번호 (비어 있으면 인증 없음)
    pub password: String,
    /// Redis TLS 사용 여부
    pub tls: bool,
    /// 캐시 항목 수명 (초)
    pub ttl_secs: u64,
    /// 경고가 포함된 부분 결과의 수명 (초)
    pub partial_ttl_secs: u64,
    /// 메모리 백엔드 최대 항목 수
    pub memory_capacity: u64,
    /// Redis 연결 수립과 명령 응답 각각의 제한 시간 (밀리초)
    pub timeout_ms: u64,
}

impl CacheConfig {
    /// 캐시 항목 수명
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// 부분 결과 수명
    pub fn partial_ttl(&self) -> Duration {
        Duration::from_secs(self.partial_ttl_secs)
    }

    /// 저장소 호출 제한 시간
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CACHE_BACKEND_REDIS.to_owned(),
            host: "localhost".to_owned(),
            port: 6380,
            password: String::new(),
            tls: false,
            ttl_secs: 24 * 60 * 60,
            partial_ttl_secs: 24 * 60 * 60,
            memory_capacity: 10_000,
            timeout_ms: 1_000,
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 메트릭 리스너 바인드 주소
    pub listen_addr: String,
    /// 메트릭 리스너 포트
    pub port: u16,
    /// 모든 메트릭에 붙는 계측 키 레이블 (비어 있으면 생략)
    pub instrumentation_key: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            instrumentation_key: String::new(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

/// 포트 오버라이드. `:6380`처럼 앞의 콜론을 허용합니다.
fn override_port(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.trim().trim_start_matches(':').parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse port from env var, ignoring"
            ),
        }
    }
}
