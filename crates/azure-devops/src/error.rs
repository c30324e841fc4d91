//! HTTP 실패를 [`CatalogError`]로 분류합니다.

use reqwest::StatusCode;

use reposcan_core::catalog::OP_LIST_PROJECTS;
use reposcan_core::error::CatalogError;

use crate::models::ErrorBody;

/// 빈 저장소에 대한 Azure DevOps 실패 메시지 일부
pub const NO_BRANCHES_MARKER: &str = "Cannot find any branches for the";

/// 메시지로 옮길 원시 본문의 최대 길이
const MAX_MESSAGE_LEN: usize = 512;

/// 전송 계층 에러를 분류합니다.
///
/// 연결 실패는 세션 단위 실패입니다. 타임아웃은 프로젝트 탐색 중에만 세션 단위
/// 실패이고, 그 뒤로는 해당 노드만의 원격 실패입니다.
pub fn transport_error(operation: &str, err: &reqwest::Error) -> CatalogError {
    let session_wide = err.is_connect() || (err.is_timeout() && operation == OP_LIST_PROJECTS);
    if session_wide {
        return CatalogError::Unavailable(format!("{operation}: {err}"));
    }
    CatalogError::remote(operation, err.status().map(|s| s.as_u16()), err.to_string())
}

/// 실패 응답을 분류합니다.
///
/// `repository`가 주어지면 빈 저장소 응답을 [`CatalogError::NoBranches`]로 바꿉니다.
pub fn status_error(
    operation: &str,
    repository: Option<&str>,
    status: StatusCode,
    body: &str,
) -> CatalogError {
    if is_auth_failure(status) {
        return CatalogError::Unavailable(format!(
            "{operation}: credential rejected (status {})",
            status.as_u16()
        ));
    }

    if let Some(repository) = repository
        && body.contains(NO_BRANCHES_MARKER)
    {
        return CatalogError::NoBranches {
            repository: repository.to_owned(),
        };
    }

    CatalogError::remote(operation, Some(status.as_u16()), failure_message(status, body))
}

/// 인증 실패 상태인지 반환합니다.
///
/// 잘못된 PAT에는 로그인 페이지와 함께 203이 돌아옵니다.
pub fn is_auth_failure(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NON_AUTHORITATIVE_INFORMATION
    )
}

fn failure_message(status: StatusCode, body: &str) -> String {
    if let Some(message) = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
    {
        return message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned();
    }
    trimmed.chars().take(MAX_MESSAGE_LEN).collect()
}
