//! 테스트용 인메모리 카탈로그
//!
//! 프로젝트 페이지, 저장소, 파일, 내용을 미리 정해 두고, 호출 수와
//! 동시 진행 중인 호출 수의 최댓값을 기록합니다.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reposcan_core::catalog::{
    CatalogConnector, Credential, FileEntry, ObjectKind, ProjectPage, ProjectRef, RemoteCatalog,
    RepositoryRef,
};
use reposcan_core::error::CatalogError;

#[derive(Default)]
struct State {
    pages: Vec<Vec<String>>,
    stuck_token: bool,
    cycling_tokens: bool,
    projects_error: Option<CatalogError>,
    repositories: HashMap<String, Result<Vec<String>, CatalogError>>,
    files: HashMap<(String, String), Result<Vec<FileEntry>, CatalogError>>,
    contents: HashMap<(String, String, String), Result<Vec<u8>, CatalogError>>,
    delay: Duration,
    calls: AtomicUsize,
    content_fetches: AtomicUsize,
    in_flight: AtomicUsize,
    max_observed: AtomicUsize,
}

/// 인메모리 카탈로그. 복제본은 같은 상태와 카운터를 공유합니다.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<State>,
}

/// [`InMemoryCatalog`] 빌더
#[derive(Default)]
pub struct CatalogBuilder {
    state: State,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 프로젝트 페이지를 하나 추가합니다.
    pub fn page(mut self, projects: &[&str]) -> Self {
        self.state
            .pages
            .push(projects.iter().map(|p| (*p).to_owned()).collect());
        self
    }

    /// 다음 페이지 토큰이 계속 같은 값으로 반환되게 합니다.
    pub fn stuck_token(mut self) -> Self {
        self.state.stuck_token = true;
        self
    }

    /// 마지막 페이지가 첫 번째 다음 페이지 토큰으로 되돌아가게 합니다.
    pub fn cycling_tokens(mut self) -> Self {
        self.state.cycling_tokens = true;
        self
    }

    pub fn projects_error(mut self, err: CatalogError) -> Self {
        self.state.projects_error = Some(err);
        self
    }

    pub fn repositories(mut self, project: &str, repositories: &[&str]) -> Self {
        self.state.repositories.insert(
            project.to_owned(),
            Ok(repositories.iter().map(|r| (*r).to_owned()).collect()),
        );
        self
    }

    pub fn repositories_error(mut self, project: &str, err: CatalogError) -> Self {
        self.state
            .repositories
            .insert(project.to_owned(), Err(err));
        self
    }

    /// 파일을 추가합니다. 경로는 blob으로 등록됩니다.
    pub fn file(mut self, project: &str, repository: &str, path: &str, content: &str) -> Self {
        self.entry(project, repository, FileEntry::new(path, ObjectKind::Blob));
        self.state.contents.insert(
            (project.to_owned(), repository.to_owned(), path.to_owned()),
            Ok(content.as_bytes().to_vec()),
        );
        self
    }

    /// 디렉토리 항목을 추가합니다.
    pub fn tree(mut self, project: &str, repository: &str, path: &str) -> Self {
        self.entry(project, repository, FileEntry::new(path, ObjectKind::Tree));
        self
    }

    pub fn files_error(mut self, project: &str, repository: &str, err: CatalogError) -> Self {
        self.state
            .files
            .insert((project.to_owned(), repository.to_owned()), Err(err));
        self
    }

    pub fn content_error(
        mut self,
        project: &str,
        repository: &str,
        path: &str,
        err: CatalogError,
    ) -> Self {
        self.entry(project, repository, FileEntry::new(path, ObjectKind::Blob));
        self.state.contents.insert(
            (project.to_owned(), repository.to_owned(), path.to_owned()),
            Err(err),
        );
        self
    }

    /// 모든 호출에 지연을 넣습니다 (동시성 측정용).
    pub fn delay(mut self, delay: Duration) -> Self {
        self.state.delay = delay;
        self
    }

    pub fn build(self) -> InMemoryCatalog {
        InMemoryCatalog {
            state: Arc::new(self.state),
        }
    }

    fn entry(&mut self, project: &str, repository: &str, entry: FileEntry) {
        let files = self
            .state
            .files
            .entry((project.to_owned(), repository.to_owned()))
            .or_insert_with(|| Ok(Vec::new()));
        if let Ok(files) = files {
            files.push(entry);
        }
    }
}

/// `P` 프로젝트 × `R` 저장소 × `F` 파일 × `L` 라인 카탈로그를 만듭니다.
///
/// 이름은 `Project{p}`, `Repo{r}`, `File{f}`, 라인은 `Line{l}`입니다.
pub fn grid(projects: usize, repositories: usize, files: usize, lines: usize) -> CatalogBuilder {
    let names: Vec<String> = (0..projects).map(|p| format!("Project{p}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut builder = CatalogBuilder::new().page(&name_refs);

    let content: String = (0..lines)
        .map(|l| format!("Line{l}"))
        .collect::<Vec<_>>()
        .join("\n");

    for project in &names {
        let repos: Vec<String> = (0..repositories).map(|r| format!("Repo{r}")).collect();
        let repo_refs: Vec<&str> = repos.iter().map(String::as_str).collect();
        builder = builder.repositories(project, &repo_refs);
        for repo in &repos {
            for f in 0..files {
                builder = builder.file(project, repo, &format!("File{f}"), &content);
            }
        }
    }
    builder
}

impl InMemoryCatalog {
    /// 전체 원격 호출 수
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// 파일 내용 조회 수
    pub fn content_fetches(&self) -> usize {
        self.state.content_fetches.load(Ordering::SeqCst)
    }

    /// 관찰된 최대 동시 호출 수
    pub fn max_observed_in_flight(&self) -> usize {
        self.state.max_observed.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> CallGuard<'_> {
        let state = &self.state;
        state.calls.fetch_add(1, Ordering::SeqCst);
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_observed.fetch_max(now, Ordering::SeqCst);
        let guard = CallGuard { state };
        if !state.delay.is_zero() {
            tokio::time::sleep(state.delay).await;
        }
        guard
    }

    fn token_for(index: usize) -> String {
        format!("page-{index}")
    }

    fn page_at(&self, index: usize) -> ProjectPage {
        let projects = self
            .state
            .pages
            .get(index)
            .map(|names| names.iter().map(ProjectRef::new).collect())
            .unwrap_or_default();
        let continuation_token = if self.state.stuck_token {
            Some(Self::token_for(1))
        } else if index + 1 < self.state.pages.len() {
            Some(Self::token_for(index + 1))
        } else if self.state.cycling_tokens {
            Some(Self::token_for(0))
        } else {
            None
        };
        ProjectPage {
            projects,
            continuation_token,
        }
    }
}

struct CallGuard<'a> {
    state: &'a State,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RemoteCatalog for InMemoryCatalog {
    type Content = Cursor<Vec<u8>>;

    async fn list_projects(&self) -> Result<ProjectPage, CatalogError> {
        let _guard = self.enter().await;
        if let Some(err) = &self.state.projects_error {
            return Err(err.clone());
        }
        Ok(self.page_at(0))
    }

    async fn list_more_projects(&self, continuation_token: &str) -> Result<ProjectPage, CatalogError> {
        let _guard = self.enter().await;
        let index = continuation_token
            .strip_prefix("page-")
            .and_then(|i| i.parse::<usize>().ok())
            .ok_or_else(|| CatalogError::remote("list_projects", Some(400), "bad token"))?;
        Ok(self.page_at(index))
    }

    async fn list_repositories(&self, project: &str) -> Result<Vec<RepositoryRef>, CatalogError> {
        let _guard = self.enter().await;
        match self.state.repositories.get(project) {
            Some(Ok(names)) => Ok(names.iter().map(RepositoryRef::new).collect()),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn list_files(&self, project: &str, repository: &str) -> Result<Vec<FileEntry>, CatalogError> {
        let _guard = self.enter().await;
        match self
            .state
            .files
            .get(&(project.to_owned(), repository.to_owned()))
        {
            Some(Ok(entries)) => Ok(entries.clone()),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_file_content(
        &self,
        project: &str,
        repository: &str,
        path: &str,
    ) -> Result<Self::Content, CatalogError> {
        let _guard = self.enter().await;
        self.state.content_fetches.fetch_add(1, Ordering::SeqCst);
        match self.state.contents.get(&(
            project.to_owned(),
            repository.to_owned(),
            path.to_owned(),
        )) {
            Some(Ok(bytes)) => Ok(Cursor::new(bytes.clone())),
            Some(Err(err)) => Err(err.clone()),
            None => Err(CatalogError::remote("fetch_file_content", Some(404), "not found")),
        }
    }
}

/// 인메모리 카탈로그를 돌려주는 커넥터
pub struct InMemoryConnector {
    catalog: InMemoryCatalog,
    connect_error: Option<CatalogError>,
    connects: AtomicUsize,
}

impl InMemoryConnector {
    pub fn new(catalog: InMemoryCatalog) -> Self {
        Self {
            catalog,
            connect_error: None,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: CatalogError) -> Self {
        Self {
            catalog: InMemoryCatalog::default(),
            connect_error: Some(err),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl CatalogConnector for InMemoryConnector {
    type Catalog = InMemoryCatalog;

    async fn connect(
        &self,
        _organization: &str,
        _credential: &Credential,
    ) -> Result<Self::Catalog, CatalogError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match &self.connect_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.catalog.clone()),
        }
    }
}
