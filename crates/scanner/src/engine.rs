//! 스캔 엔진: 카탈로그 하나에 대한 다단계 동시 탐색
//!
//! [`ScanEngine`]은 원격 카탈로그 세션 하나를 받아 검색 조건에 맞는 결과 트리를 만듭니다.
//!
//! # 단계
//! 1. 패턴 컴파일 (실패 시 원격 호출 없이 즉시 실패)
//! 2. 프로젝트 탐색: continuation token을 따라 모든 페이지를 읽고 이름 필터 적용
//! 3. 프로젝트별 태스크: 저장소 목록 조회 후 저장소별 태스크 생성
//! 4. 저장소별 태스크: 파일 트리 조회, blob이면서 경로가 매칭되는 파일마다 태스크 생성
//! 5. 파일별 태스크: 내용 조회 후 라인 스캔
//!
//! 각 단계는 `JoinSet`으로 자식 태스크를 모두 기다린 뒤(배리어) 부모 노드를 만듭니다.
//! 치명적 실패가 관찰되면 남은 태스크는 모두 abort됩니다.
//!
//! # 실패 정책
//! - `Unavailable`: 어느 단계에서든 스캔 전체 중단
//! - `NoBranches`: 빈 저장소 (경고 없음)
//! - `Remote`: 해당 가지만 비우고 경고를 남김. strict 모드에서는 스캔 전체 중단
//! - 프로젝트 탐색 중 실패는 항상 치명적

use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{Instrument, debug, warn};

use reposcan_core::catalog::{
    OP_FETCH_FILE_CONTENT, OP_LIST_FILES, OP_LIST_PROJECTS, OP_LIST_REPOSITORIES,
    OP_READ_FILE_CONTENT, RemoteCatalog,
};
use reposcan_core::error::CatalogError;
use reposcan_core::pattern::CriteriaMatcher;
use reposcan_core::telemetry::Telemetry;
use reposcan_core::types::{
    Item, Project, Repository, ScanResults, ScanWarning, SearchCriteria,
};

use crate::config::ScanEngineConfig;
use crate::error::ScannerError;
use crate::lines::scan_lines;
use crate::outcome::{Collected, Outcome};
use crate::pool::WorkerPool;

/// 카탈로그 세션 하나에 대한 스캔 엔진
pub struct ScanEngine<C: RemoteCatalog> {
    catalog: Arc<C>,
    pool: WorkerPool,
    config: ScanEngineConfig,
    telemetry: Arc<dyn Telemetry>,
}

impl<C: RemoteCatalog> ScanEngine<C> {
    /// 새 엔진을 생성합니다.
    ///
    /// `pool`은 프로세스 전체에서 공유되는 워커 풀입니다.
    pub fn new(
        catalog: Arc<C>,
        pool: WorkerPool,
        config: ScanEngineConfig,
        telemetry: Arc<dyn Telemetry>,
    ) -> Self {
        Self {
            catalog,
            pool,
            config,
            telemetry,
        }
    }

    /// 검색 조건으로 카탈로그 전체를 스캔합니다.
    pub async fn scan(&self, criteria: &SearchCriteria) -> Result<ScanResults, ScannerError> {
        let matcher = CriteriaMatcher::compile(criteria)?;
        self.scan_compiled(Arc::new(matcher)).await
    }

    /// 이미 컴파일된 패턴으로 스캔합니다.
    pub async fn scan_compiled(
        &self,
        matcher: Arc<CriteriaMatcher>,
    ) -> Result<ScanResults, ScannerError> {
        let projects = self.discover_projects(&matcher).await?;
        debug!(projects = projects.len(), "projects matched");

        let ctx = Arc::new(ScanContext {
            catalog: Arc::clone(&self.catalog),
            pool: self.pool.clone(),
            matcher,
            config: self.config.clone(),
            telemetry: Arc::clone(&self.telemetry),
        });

        let mut tasks = JoinSet::new();
        for project in projects {
            tasks.spawn(scan_project(Arc::clone(&ctx), project).in_current_span());
        }
        let collected = join_level(tasks).await?;

        Ok(ScanResults::new(collected.nodes, collected.warnings))
    }

    /// 모든 프로젝트 페이지를 읽고 이름 필터를 통과한 프로젝트 이름을 반환합니다.
    ///
    /// 이미 따라간 continuation token이 다시 나오면 페이지 순환으로 보고 실패합니다.
    async fn discover_projects(
        &self,
        matcher: &CriteriaMatcher,
    ) -> Result<Vec<String>, ScannerError> {
        let mut page = {
            let _permit = self.pool.acquire().await?;
            self.catalog.list_projects().await
        }
        .map_err(|e| self.discovery_error(e))?;

        let mut names: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        loop {
            let next = page.next_token().map(str::to_owned);
            names.extend(page.projects.into_iter().map(|p| p.name));

            let Some(token) = next else {
                break;
            };
            if !seen.insert(token.clone()) {
                return Err(self.discovery_error(CatalogError::remote(
                    OP_LIST_PROJECTS,
                    None,
                    format!("continuation token '{token}' was already returned"),
                )));
            }

            page = {
                let _permit = self.pool.acquire().await?;
                self.catalog.list_more_projects(&token).await
            }
            .map_err(|e| self.discovery_error(e))?;
        }

        let total = names.len();
        names.retain(|name| matcher.project.matches(name));
        debug!(total, matched = names.len(), "project discovery finished");
        Ok(names)
    }

    fn discovery_error(&self, err: CatalogError) -> ScannerError {
        self.telemetry.remote_error(OP_LIST_PROJECTS, &err.to_string());
        match err {
            CatalogError::Unavailable(msg) => ScannerError::RemoteUnavailable(msg),
            other => ScannerError::Remote {
                scope: String::new(),
                source: other,
            },
        }
    }
}

/// 스캔 태스크들이 공유하는 불변 상태
struct ScanContext<C: RemoteCatalog> {
    catalog: Arc<C>,
    pool: WorkerPool,
    matcher: Arc<CriteriaMatcher>,
    config: ScanEngineConfig,
    telemetry: Arc<dyn Telemetry>,
}

impl<C: RemoteCatalog> ScanContext<C> {
    /// 노드 단위 원격 실패를 실패 정책에 따라 처리합니다.
    fn absorb<T>(
        &self,
        scope: String,
        operation: &str,
        err: CatalogError,
    ) -> Result<Outcome<T>, ScannerError> {
        if err.is_expected_empty() {
            debug!(scope = scope.as_str(), "repository has no branches, skipping");
            return Ok(Outcome::empty());
        }

        self.telemetry.remote_error(operation, &err.to_string());
        match err {
            CatalogError::Unavailable(msg) => Err(ScannerError::RemoteUnavailable(msg)),
            other if self.config.strict_remote_errors => Err(ScannerError::Remote {
                scope,
                source: other,
            }),
            other => {
                warn!(
                    scope = scope.as_str(),
                    operation,
                    error = %other,
                    "node scan failed, continuing with siblings"
                );
                Ok(Outcome::warning(ScanWarning::new(
                    scope,
                    operation,
                    other.to_string(),
                )))
            }
        }
    }
}

async fn scan_project<C: RemoteCatalog>(
    ctx: Arc<ScanContext<C>>,
    project: String,
) -> Result<Outcome<Project>, ScannerError> {
    let listed = {
        let _permit = ctx.pool.acquire().await?;
        ctx.catalog.list_repositories(&project).await
    };
    let repositories = match listed {
        Ok(repositories) => repositories,
        Err(e) => return ctx.absorb(project, OP_LIST_REPOSITORIES, e),
    };

    let mut tasks = JoinSet::new();
    for repository in repositories {
        tasks.spawn(
            scan_repository(Arc::clone(&ctx), project.clone(), repository.name).in_current_span(),
        );
    }
    let collected = join_level(tasks).await?;

    Ok(Outcome::new(
        Project::new(project, collected.nodes),
        collected.warnings,
    ))
}

async fn scan_repository<C: RemoteCatalog>(
    ctx: Arc<ScanContext<C>>,
    project: String,
    repository: String,
) -> Result<Outcome<Repository>, ScannerError> {
    let listed = {
        let _permit = ctx.pool.acquire().await?;
        ctx.catalog.list_files(&project, &repository).await
    };
    let entries = match listed {
        Ok(entries) => entries,
        Err(e) => return ctx.absorb(format!("{project}/{repository}"), OP_LIST_FILES, e),
    };

    let mut tasks = JoinSet::new();
    for entry in entries
        .into_iter()
        .filter(|entry| entry.is_blob() && ctx.matcher.file.matches(&entry.path))
    {
        tasks.spawn(
            scan_file(
                Arc::clone(&ctx),
                project.clone(),
                repository.clone(),
                entry.path,
            )
            .in_current_span(),
        );
    }
    let collected = join_level(tasks).await?;

    Ok(Outcome::new(
        Repository::new(repository, collected.nodes),
        collected.warnings,
    ))
}

async fn scan_file<C: RemoteCatalog>(
    ctx: Arc<ScanContext<C>>,
    project: String,
    repository: String,
    path: String,
) -> Result<Outcome<Item>, ScannerError> {
    let scope = file_scope(&project, &repository, &path);

    // 내용 조회와 이어지는 읽기 모두 허가 하나로 실행
    let _permit = ctx.pool.acquire().await?;
    let content = match ctx
        .catalog
        .fetch_file_content(&project, &repository, &path)
        .await
    {
        Ok(content) => content,
        Err(e) => return ctx.absorb(scope, OP_FETCH_FILE_CONTENT, e),
    };

    let scanned = match scan_lines(content, &ctx.matcher.content, ctx.config.max_file_size).await
    {
        Ok(scanned) => scanned,
        Err(e) => {
            return ctx.absorb(
                scope,
                OP_READ_FILE_CONTENT,
                CatalogError::remote(OP_READ_FILE_CONTENT, None, e.to_string()),
            );
        }
    };

    let mut warnings = Vec::new();
    if scanned.truncated {
        warn!(
            scope = scope.as_str(),
            max_file_size = ctx.config.max_file_size,
            "file exceeds max_file_size, remaining content skipped"
        );
        warnings.push(ScanWarning::new(
            scope,
            OP_READ_FILE_CONTENT,
            format!(
                "file exceeds {} bytes, remaining content skipped",
                ctx.config.max_file_size
            ),
        ));
    }

    Ok(Outcome::new(Item::new(path, scanned.lines), warnings))
}

/// 한 단계의 모든 자식 태스크를 기다립니다.
///
/// 치명적 에러를 받으면 남은 태스크를 abort하고 그 에러를 반환합니다.
async fn join_level<T: Send + 'static>(
    mut tasks: JoinSet<Result<Outcome<T>, ScannerError>>,
) -> Result<Collected<T>, ScannerError> {
    let mut collected = Collected::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(outcome)) => collected.push(outcome),
            Ok(Err(fatal)) => {
                tasks.abort_all();
                return Err(fatal);
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                tasks.abort_all();
                return Err(ScannerError::Task(e.to_string()));
            }
        }
    }
    Ok(collected)
}

/// 경고에 쓰이는 파일 경로 (`Project/Repo/path`)
fn file_scope(project: &str, repository: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{project}/{repository}{path}")
    } else {
        format!("{project}/{repository}/{path}")
    }
}
