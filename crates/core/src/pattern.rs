//! 패턴 매처: 검색 조건의 정규식 컴파일 및 매칭
//!
//! 매칭은 앵커 없는 부분 검색입니다. 패턴이 후보 문자열의 어느 위치에서든
//! 매칭되면 참입니다. 빈 패턴은 모든 문자열에 매칭됩니다.

use regex::{Regex, RegexBuilder};

use crate::error::PatternError;
use crate::types::SearchCriteria;

/// 컴파일된 정규식 프로그램 크기 상한 (바이트)
pub const REGEX_SIZE_LIMIT: usize = 1024 * 1024;

/// 패턴 필드명: 프로젝트 이름
pub const FIELD_PROJECT_NAME: &str = "project_name";
/// 패턴 필드명: 파일 경로
pub const FIELD_FILE_NAME: &str = "file_name";
/// 패턴 필드명: 라인 내용
pub const FIELD_CONTENT: &str = "content";

/// 패턴을 컴파일하고 후보 문자열과 한 번 매칭합니다.
///
/// 같은 패턴으로 여러 번 매칭할 때는 [`PatternMatcher`]를 사용하세요.
pub fn matches(pattern: &str, candidate: &str) -> Result<bool, PatternError> {
    Ok(PatternMatcher::compile(FIELD_CONTENT, pattern)?.matches(candidate))
}

/// 한 번 컴파일된 단일 패턴
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    /// 패턴을 컴파일합니다.
    ///
    /// `field`는 에러 메시지에 포함되는 패턴 필드명입니다.
    pub fn compile(field: &str, pattern: &str) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(pattern)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
            .map_err(|e| PatternError::Invalid {
                field: field.to_owned(),
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(Self { regex })
    }

    /// 후보 문자열 어딘가에 패턴이 매칭되는지 반환합니다.
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// 원본 패턴 문자열
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// 검색 조건의 세 패턴을 컴파일한 결과
#[derive(Debug, Clone)]
pub struct CriteriaMatcher {
    /// 프로젝트 이름 매처
    pub project: PatternMatcher,
    /// 파일 경로 매처
    pub file: PatternMatcher,
    /// 라인 내용 매처
    pub content: PatternMatcher,
}

impl CriteriaMatcher {
    /// 프로젝트 → 파일 → 내용 순서로 컴파일하고 첫 번째 실패를 반환합니다.
    pub fn compile(criteria: &SearchCriteria) -> Result<Self, PatternError> {
        Ok(Self {
            project: PatternMatcher::compile(FIELD_PROJECT_NAME, &criteria.project_name_pattern)?,
            file: PatternMatcher::compile(FIELD_FILE_NAME, &criteria.file_name_pattern)?,
            content: PatternMatcher::compile(FIELD_CONTENT, &criteria.content_pattern)?,
        })
    }
}
