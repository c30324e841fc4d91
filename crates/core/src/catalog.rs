//! 원격 카탈로그 계약: 소스 저장소 조직의 목록/내용 조회 추상화
//!
//! [`RemoteCatalog`]는 한 조직(organization)에 대해 수립된 세션입니다.
//! 스캔 엔진은 이 trait만 알고 있으며, 실제 구현(Azure DevOps REST 클라이언트)과
//! 테스트용 인메모리 카탈로그는 각각 별도 크레이트/테스트에 있습니다.
//!
//! ```text
//! CatalogConnector ──connect(org, credential)──> RemoteCatalog
//!                                                  ├── list_projects / list_more_projects
//!                                                  ├── list_repositories
//!                                                  ├── list_files
//!                                                  └── fetch_file_content ──> AsyncRead
//! ```

use std::fmt;
use std::future::Future;

use tokio::io::AsyncRead;

use crate::error::CatalogError;

/// 작업 이름: 프로젝트 목록
pub const OP_LIST_PROJECTS: &str = "list_projects";
/// 작업 이름: 저장소 목록
pub const OP_LIST_REPOSITORIES: &str = "list_repositories";
/// 작업 이름: 파일 트리
pub const OP_LIST_FILES: &str = "list_files";
/// 작업 이름: 파일 내용 조회
pub const OP_FETCH_FILE_CONTENT: &str = "fetch_file_content";
/// 작업 이름: 파일 내용 읽기 (스트림 소비)
pub const OP_READ_FILE_CONTENT: &str = "read_file_content";

/// 조직 접근용 불투명 토큰 (Personal Access Token)
///
/// `Debug` 출력에서 토큰 값은 가려집니다.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// 토큰으로 자격 증명을 생성합니다.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// 원본 토큰 값
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// 프로젝트 참조
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    /// 프로젝트 이름
    pub name: String,
}

impl ProjectRef {
    /// 이름으로 참조를 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// 프로젝트 목록 한 페이지
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPage {
    /// 이 페이지의 프로젝트
    pub projects: Vec<ProjectRef>,
    /// 다음 페이지 토큰 (없거나 빈 문자열이면 마지막 페이지)
    pub continuation_token: Option<String>,
}

impl ProjectPage {
    /// 다음 페이지 토큰이 있으면 반환합니다. 빈 문자열은 토큰 없음으로 취급합니다.
    pub fn next_token(&self) -> Option<&str> {
        self.continuation_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// 저장소 참조
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    /// 저장소 이름
    pub name: String,
}

impl RepositoryRef {
    /// 이름으로 참조를 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// 저장소 트리 항목 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// 파일 (내용을 가진 유일한 종류)
    Blob,
    /// 디렉토리
    Tree,
    /// 서브모듈 커밋
    Commit,
    /// 기타
    Other,
}

impl ObjectKind {
    /// 원격 API의 `gitObjectType` 문자열을 변환합니다.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "blob" => Self::Blob,
            "tree" => Self::Tree,
            "commit" => Self::Commit,
            _ => Self::Other,
        }
    }
}

/// 저장소 트리 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// 저장소 내 경로
    pub path: String,
    /// 항목 종류
    pub kind: ObjectKind,
}

impl FileEntry {
    /// 새 항목을 생성합니다.
    pub fn new(path: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// 내용을 스캔할 수 있는 파일인지 반환합니다.
    pub fn is_blob(&self) -> bool {
        self.kind == ObjectKind::Blob
    }
}

/// 한 조직에 대해 수립된 원격 카탈로그 세션
///
/// 모든 메서드는 `Send` future를 반환하므로 `tokio::spawn`된 태스크 안에서
/// 호출할 수 있습니다. 구현체는 `Arc`로 공유됩니다.
///
/// # 에러
/// - [`CatalogError::Unavailable`]: 세션 단위 실패. 스캔 전체가 중단됩니다.
/// - [`CatalogError::Remote`]: 호출 단위 실패.
/// - [`CatalogError::NoBranches`]: 빈 저장소. 파일 0개로 취급됩니다.
pub trait RemoteCatalog: Send + Sync + 'static {
    /// 파일 내용 스트림 타입
    type Content: AsyncRead + Send + Unpin + 'static;

    /// 첫 번째 프로젝트 페이지를 조회합니다.
    fn list_projects(&self) -> impl Future<Output = Result<ProjectPage, CatalogError>> + Send;

    /// 토큰으로 다음 프로젝트 페이지를 조회합니다.
    fn list_more_projects(
        &self,
        continuation_token: &str,
    ) -> impl Future<Output = Result<ProjectPage, CatalogError>> + Send;

    /// 프로젝트의 저장소 목록을 조회합니다.
    fn list_repositories(
        &self,
        project: &str,
    ) -> impl Future<Output = Result<Vec<RepositoryRef>, CatalogError>> + Send;

    /// 저장소 기본 브랜치의 전체 트리를 조회합니다.
    fn list_files(
        &self,
        project: &str,
        repository: &str,
    ) -> impl Future<Output = Result<Vec<FileEntry>, CatalogError>> + Send;

    /// 파일 내용을 바이트 스트림으로 가져옵니다.
    fn fetch_file_content(
        &self,
        project: &str,
        repository: &str,
        path: &str,
    ) -> impl Future<Output = Result<Self::Content, CatalogError>> + Send;
}

/// 조직 단위 카탈로그 세션을 수립하는 팩토리
pub trait CatalogConnector: Send + Sync + 'static {
    /// 수립되는 세션 타입
    type Catalog: RemoteCatalog;

    /// 조직과 자격 증명으로 세션을 수립합니다.
    ///
    /// 실패는 항상 [`CatalogError::Unavailable`]로 보고됩니다.
    fn connect(
        &self,
        organization: &str,
        credential: &Credential,
    ) -> impl Future<Output = Result<Self::Catalog, CatalogError>> + Send;
}
