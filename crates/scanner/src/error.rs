//! 스캐너 에러 타입
//!
//! [`ScannerError`]는 스캔을 중단시키는 치명적 실패만 표현합니다.
//! 노드 단위 실패는 에러가 아니라 [`ScanWarning`](reposcan_core::types::ScanWarning)으로
//! 결과에 남습니다.
//!
//! `From<ScannerError> for RepoScanError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use reposcan_core::error::{CatalogError, ConfigError, PatternError, RepoScanError};

/// 스캐너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// 검색 패턴 컴파일 실패
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    /// 원격 세션 사용 불가 (연결, 인증 실패)
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// 원격 호출 실패 (프로젝트 탐색 실패, 또는 strict 모드의 노드 실패)
    #[error("remote error at '{scope}': {source}")]
    Remote {
        /// 실패한 노드 경로
        scope: String,
        /// 원인 에러
        source: CatalogError,
    },

    /// 스캔 태스크 비정상 종료
    #[error("scan task failed: {0}")]
    Task(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<ScannerError> for RepoScanError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::InvalidPattern(e) => RepoScanError::Pattern(e),
            ScannerError::RemoteUnavailable(msg) => {
                RepoScanError::Catalog(CatalogError::Unavailable(msg))
            }
            ScannerError::Remote { source, .. } => RepoScanError::Catalog(source),
            ScannerError::Task(msg) => RepoScanError::Internal(msg),
            ScannerError::Config { field, reason } => {
                RepoScanError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}
