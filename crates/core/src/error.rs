//! 에러 타입: 도메인별 에러 정의

/// reposcan 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RepoScanError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 검색 패턴 에러
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// 원격 카탈로그 에러
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// 캐시 에러
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 런타임 내부 에러 (태스크 실패 등)
    #[error("internal error: {0}")]
    Internal(String),
}

impl RepoScanError {
    /// 원격 세션을 열 수 없어 실패했는지 반환합니다.
    pub fn is_remote_unavailable(&self) -> bool {
        matches!(self, Self::Catalog(err) if err.is_unavailable())
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 검색 패턴 에러
///
/// 세 패턴 중 하나라도 컴파일에 실패하면 스캔 전체가 즉시 실패합니다.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    /// 정규식 컴파일 실패
    #[error("invalid {field} pattern '{pattern}': {reason}")]
    Invalid {
        /// 패턴 필드명 (project_name, file_name, content)
        field: String,
        /// 원본 패턴 문자열
        pattern: String,
        /// 컴파일 실패 사유
        reason: String,
    },
}

/// 원격 카탈로그 에러
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    /// 세션 수립/사용 불가 (네트워크, 인증 실패)
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// 특정 호출에 대한 정상 형식의 실패 응답
    #[error("{operation} failed{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Remote {
        /// 실패한 호출 (list_projects, list_files 등)
        operation: String,
        /// HTTP 상태 코드 (있을 경우)
        status: Option<u16>,
        /// 실패 메시지
        message: String,
    },

    /// 브랜치가 없는 빈 저장소. 에러가 아닌 "파일 0개"로 취급
    #[error("cannot find any branches for repository '{repository}'")]
    NoBranches { repository: String },
}

impl CatalogError {
    /// 스캔 전체를 중단해야 하는 세션 단위 실패인지 반환합니다.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// 빈 저장소로 취급해야 하는 조건인지 반환합니다.
    pub fn is_expected_empty(&self) -> bool {
        matches!(self, Self::NoBranches { .. })
    }

    /// `Remote` 에러를 생성합니다.
    pub fn remote(operation: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }
}

/// 캐시 에러
///
/// 캐시 에러는 항상 치명적이지 않습니다. 읽기 실패는 캐시 미스로,
/// 쓰기 실패는 로그만 남기고 무시합니다.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// 캐시 저장소 연결/명령 실패
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}
