//! 캐시 파사드 에러 타입

use reposcan_core::error::RepoScanError;
use reposcan_scanner::ScannerError;

/// [`ResultCache`](crate::ResultCache) 에러
///
/// 저장소 실패는 여기에 나타나지 않습니다. 읽기 실패는 미스로,
/// 쓰기 실패는 무시됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ResultCacheError {
    /// 스캔 실패
    #[error(transparent)]
    Scan(#[from] ScannerError),

    /// 결과 직렬화 실패
    #[error("failed to encode scan results: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<ResultCacheError> for RepoScanError {
    fn from(err: ResultCacheError) -> Self {
        match err {
            ResultCacheError::Scan(e) => e.into(),
            ResultCacheError::Encode(e) => RepoScanError::Internal(e.to_string()),
        }
    }
}
