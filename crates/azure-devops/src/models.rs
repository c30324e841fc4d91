//! Azure DevOps REST 응답 모델
//!
//! 필요한 필드만 역직렬화합니다. 누락된 문자열 필드는 빈 문자열이 됩니다.

use serde::Deserialize;

use reposcan_core::catalog::{FileEntry, ObjectKind, ProjectRef, RepositoryRef};

/// 목록 응답 봉투 (`{"count": N, "value": [...]}`)
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// `TeamProjectReference`
#[derive(Debug, Deserialize)]
pub struct TeamProject {
    #[serde(default)]
    pub name: String,
}

impl From<TeamProject> for ProjectRef {
    fn from(project: TeamProject) -> Self {
        ProjectRef::new(project.name)
    }
}

/// `GitRepository`
#[derive(Debug, Deserialize)]
pub struct GitRepository {
    #[serde(default)]
    pub name: String,
}

impl From<GitRepository> for RepositoryRef {
    fn from(repository: GitRepository) -> Self {
        RepositoryRef::new(repository.name)
    }
}

/// `GitItem`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitItem {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub git_object_type: String,
}

impl From<GitItem> for FileEntry {
    fn from(item: GitItem) -> Self {
        FileEntry::new(item.path, ObjectKind::from_wire(&item.git_object_type))
    }
}

/// 실패 응답 본문 (`{"message": "...", "typeKey": "..."}`)
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
