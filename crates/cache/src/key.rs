//! 캐시 키

use reposcan_core::types::SearchCriteria;

/// 조직과 세 패턴을 이어 붙여 캐시 키를 만듭니다.
///
/// 구분자가 없으므로 경계가 다른 두 조건이 같은 키를 가질 수 있습니다
/// (`"ab" + ""`와 `"a" + "b"`). 기존 서비스가 기록한 Redis 키와 호환됩니다.
pub fn cache_key(organization: &str, criteria: &SearchCriteria) -> String {
    format!(
        "{organization}{}{}{}",
        criteria.project_name_pattern, criteria.file_name_pattern, criteria.content_pattern
    )
}
