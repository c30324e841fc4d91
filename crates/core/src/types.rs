//! 도메인 타입: 검색 조건과 결과 트리
//!
//! 결과 트리는 네 단계로 구성됩니다.
//!
//! ```text
//! ScanResults ──> Project ──> Repository ──> Item ──> lines
//! ```
//!
//! 모든 노드는 비어 있지 않은 자식을 하나 이상 가질 때만 존재합니다.
//! 생성자(`Project::new`, `Repository::new`, `Item::new`)가 빈 자식에 대해
//! `None`을 반환하므로 빈 가지는 구조적으로 트리에 들어갈 수 없습니다.
//!
//! 직렬화 필드명은 기존 서비스와 호환되도록 PascalCase를 사용합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 검색 조건
///
/// 세 개의 정규식 패턴으로 구성되며 한 번의 스캔 동안 변경되지 않습니다.
/// 누락된 필드는 빈 패턴(모든 문자열에 매칭)으로 취급합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SearchCriteria {
    /// 프로젝트 이름 패턴
    #[serde(default)]
    pub project_name_pattern: String,
    /// 파일 경로 패턴
    #[serde(default)]
    pub file_name_pattern: String,
    /// 라인 내용 패턴
    #[serde(default)]
    pub content_pattern: String,
}

impl SearchCriteria {
    /// 세 패턴으로 검색 조건을 생성합니다.
    pub fn new(
        project_name_pattern: impl Into<String>,
        file_name_pattern: impl Into<String>,
        content_pattern: impl Into<String>,
    ) -> Self {
        Self {
            project_name_pattern: project_name_pattern.into(),
            file_name_pattern: file_name_pattern.into(),
            content_pattern: content_pattern.into(),
        }
    }
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "project={:?} file={:?} content={:?}",
            self.project_name_pattern, self.file_name_pattern, self.content_pattern,
        )
    }
}

/// 스캔 결과 루트
///
/// 프로젝트 순서는 의미가 없으며(집합), 직렬화 결과를 결정적으로 만들기 위해
/// 이름순으로 정렬해 둡니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanResults {
    /// 매칭된 프로젝트 목록
    pub projects: Vec<Project>,
    /// 스캔 중 관찰된 노드 단위 실패
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScanWarning>,
}

impl ScanResults {
    /// 프로젝트와 경고로 결과를 생성합니다.
    pub fn new(mut projects: Vec<Project>, warnings: Vec<ScanWarning>) -> Self {
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Self { projects, warnings }
    }

    /// 노드 단위 실패 없이 끝까지 스캔되었는지 반환합니다.
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    /// 결과에 포함된 저장소 수
    pub fn repository_count(&self) -> usize {
        self.projects.iter().map(|p| p.repositories.len()).sum()
    }

    /// 결과에 포함된 파일 수
    pub fn item_count(&self) -> usize {
        self.projects
            .iter()
            .flat_map(|p| &p.repositories)
            .map(|r| r.files.len())
            .sum()
    }

    /// 결과에 포함된 매칭 라인 수
    pub fn line_count(&self) -> usize {
        self.projects
            .iter()
            .flat_map(|p| &p.repositories)
            .flat_map(|r| &r.files)
            .map(|i| i.lines.len())
            .sum()
    }
}

/// 매칭된 저장소를 하나 이상 가진 프로젝트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    /// 프로젝트 이름
    pub name: String,
    /// 매칭된 저장소 목록
    pub repositories: Vec<Repository>,
}

impl Project {
    /// 저장소가 하나 이상일 때만 프로젝트 노드를 생성합니다.
    pub fn new(name: impl Into<String>, mut repositories: Vec<Repository>) -> Option<Self> {
        if repositories.is_empty() {
            return None;
        }
        repositories.sort_by(|a, b| a.name.cmp(&b.name));
        Some(Self {
            name: name.into(),
            repositories,
        })
    }
}

/// 매칭된 파일을 하나 이상 가진 저장소
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Repository {
    /// 저장소 이름
    pub name: String,
    /// 매칭된 파일 목록
    pub files: Vec<Item>,
}

impl Repository {
    /// 파일이 하나 이상일 때만 저장소 노드를 생성합니다.
    pub fn new(name: impl Into<String>, mut files: Vec<Item>) -> Option<Self> {
        if files.is_empty() {
            return None;
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Some(Self {
            name: name.into(),
            files,
        })
    }
}

/// 매칭 라인을 하나 이상 가진 파일
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    /// 파일 경로
    pub name: String,
    /// 매칭된 라인 (원본 파일 순서)
    pub lines: Vec<String>,
}

impl Item {
    /// 라인이 하나 이상일 때만 파일 노드를 생성합니다.
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Option<Self> {
        if lines.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            lines,
        })
    }
}

/// 스캔 중 발생한 노드 단위 실패
///
/// 형제 노드의 스캔은 계속되며, 실패는 결과와 함께 호출자에게 전달됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanWarning {
    /// 실패한 노드 경로 (예: `Project0/Repo0/src/main.rs`)
    pub scope: String,
    /// 실패한 작업 (list_repositories, list_files, fetch_file_content, read_file_content)
    pub operation: String,
    /// 실패 사유
    pub message: String,
}

impl ScanWarning {
    /// 새 경고를 생성합니다.
    pub fn new(
        scope: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            scope: scope.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.scope, self.operation, self.message)
    }
}
