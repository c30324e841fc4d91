//! 스캔 엔진 통합 테스트
//!
//! 인메모리 카탈로그로 트리 구성, 가지 제거, 페이지 순회, 실패 정책,
//! 워커 풀 상한을 검증합니다.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use reposcan_core::error::CatalogError;
use reposcan_core::telemetry::NoopTelemetry;
use reposcan_core::types::SearchCriteria;
use reposcan_scanner::{ScanEngine, ScanEngineConfig, ScanEngineConfigBuilder, ScannerError, WorkerPool};

use common::{CatalogBuilder, InMemoryCatalog, grid};

fn engine(catalog: &InMemoryCatalog, config: ScanEngineConfig) -> ScanEngine<InMemoryCatalog> {
    let pool = WorkerPool::new(config.max_in_flight);
    ScanEngine::new(
        Arc::new(catalog.clone()),
        pool,
        config,
        Arc::new(NoopTelemetry),
    )
}

fn match_all() -> SearchCriteria {
    SearchCriteria::new("", "", "")
}

fn unavailable() -> CatalogError {
    CatalogError::Unavailable("401 Unauthorized".to_owned())
}

fn server_error(operation: &str) -> CatalogError {
    CatalogError::remote(operation, Some(500), "internal server error")
}

// =============================================================================
// 트리 구성
// =============================================================================

#[tokio::test]
async fn match_all_patterns_return_the_full_grid() {
    // Given: 2 프로젝트 × 3 저장소 × 4 파일 × 5 라인
    let catalog = grid(2, 3, 4, 5).build();

    // When
    let results = engine(&catalog, ScanEngineConfig::default())
        .scan(&match_all())
        .await
        .unwrap();

    // Then
    assert_eq!(results.projects.len(), 2);
    assert_eq!(results.repository_count(), 6);
    assert_eq!(results.item_count(), 24);
    assert_eq!(results.line_count(), 120);
    assert!(results.is_complete());
    for project in &results.projects {
        for repository in &project.repositories {
            for item in &repository.files {
                assert_eq!(item.lines, vec!["Line0", "Line1", "Line2", "Line3", "Line4"]);
            }
        }
    }
}

#[tokio::test]
async fn zero_projects_yield_empty_results() {
    let catalog = CatalogBuilder::new().page(&[]).build();

    let results = engine(&catalog, ScanEngineConfig::default())
        .scan(&match_all())
        .await
        .unwrap();

    assert!(results.projects.is_empty());
    assert_eq!(
        serde_json::to_string(&results).unwrap(),
        r#"{"Projects":[]}"#
    );
}

#[tokio::test]
async fn single_matching_line_is_found() {
    // Given: Project0/Repo0/File0 = "Content To Test\nboo"
    let catalog = CatalogBuilder::new()
        .page(&["Project0"])
        .repositories("Project0", &["Repo0"])
        .file("Project0", "Repo0", "File0", "Content To Test\nboo")
        .build();

    // When
    let results = engine(&catalog, ScanEngineConfig::default())
        .scan(&SearchCriteria::new("Project", "File", "Content"))
        .await
        .unwrap();

    // Then
    assert_eq!(results.projects.len(), 1);
    let project = &results.projects[0];
    assert_eq!(project.name, "Project0");
    assert_eq!(project.repositories.len(), 1);
    let repository = &project.repositories[0];
    assert_eq!(repository.name, "Repo0");
    assert_eq!(repository.files.len(), 1);
    assert_eq!(repository.files[0].name, "File0");
    assert_eq!(repository.files[0].lines, vec!["Content To Test"]);
}

#[tokio::test]
async fn branches_without_matches_are_pruned() {
    // Given: 한 파일만 매칭되고 나머지 가지는 모두 비어 있음
    let catalog = CatalogBuilder::new()
        .page(&["Alpha", "Beta", "Gamma"])
        .repositories("Alpha", &["hit", "miss"])
        .repositories("Beta", &["miss"])
        .repositories("Gamma", &[])
        .file("Alpha", "hit", "/a.txt", "needle here\nhay")
        .file("Alpha", "hit", "/b.txt", "only hay")
        .file("Alpha", "miss", "/c.txt", "hay")
        .file("Beta", "miss", "/d.txt", "hay")
        .build();

    // When
    let results = engine(&catalog, ScanEngineConfig::default())
        .scan(&SearchCriteria::new("", "", "needle"))
        .await
        .unwrap();

    // Then
    assert_eq!(results.projects.len(), 1);
    assert_eq!(results.projects[0].name, "Alpha");
    assert_eq!(results.projects[0].repositories.len(), 1);
    assert_eq!(results.projects[0].repositories[0].name, "hit");
    assert_eq!(results.item_count(), 1);
    assert_eq!(results.projects[0].repositories[0].files[0].name, "/a.txt");
}

#[tokio::test]
async fn project_filter_skips_non_matching_projects_entirely() {
    let catalog = CatalogBuilder::new()
        .page(&["Project0", "Other"])
        .repositories("Project0", &["Repo0"])
        .repositories("Other", &["Repo0"])
        .file("Project0", "Repo0", "File0", "x")
        .file("Other", "Repo0", "File0", "x")
        .build();

    let results = engine(&catalog, ScanEngineConfig::default())
        .scan(&SearchCriteria::new("^Project", "", ""))
        .await
        .unwrap();

    assert_eq!(results.projects.len(), 1);
    assert_eq!(results.projects[0].name, "Project0");
    // list_projects 1 + list_repositories 1 + list_files 1 + fetch 1
    assert_eq!(catalog.calls(), 4);
}

#[tokio::test]
async fn only_blobs_matching_the_file_pattern_are_fetched() {
    let catalog = CatalogBuilder::new()
        .page(&["P"])
        .repositories("P", &["R"])
        .tree("P", "R", "/src")
        .file("P", "R", "/src/main.rs", "fn main() {}")
        .file("P", "R", "/README.md", "fn in docs")
        .build();

    let results = engine(&catalog, ScanEngineConfig::default())
        .scan(&SearchCriteria::new("", r"\.rs$", "fn"))
        .await
        .unwrap();

    assert_eq!(results.item_count(), 1);
    assert_eq!(results.projects[0].repositories[0].files[0].name, "/src/main.rs");
    assert_eq!(catalog.content_fetches(), 1);
}

// =============================================================================
// 페이지 순회
// =============================================================================

#[tokio::test]
async fn pagination_filters_the_concatenation_of_all_pages() {
    // Given: 두 페이지에 걸친 프로젝트
    let catalog = CatalogBuilder::new()
        .page(&["Project0", "Skip0"])
        .page(&["Project1", "Skip1"])
        .repositories("Project0", &["Repo0"])
        .repositories("Project1", &["Repo0"])
        .file("Project0", "Repo0", "File0", "hit")
        .file("Project1", "Repo0", "File0", "hit")
        .build();

    // When
    let results = engine(&catalog, ScanEngineConfig::default())
        .scan(&SearchCriteria::new("Project", "", ""))
        .await
        .unwrap();

    // Then
    let names: Vec<&str> = results.projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Project0", "Project1"]);
}

#[tokio::test]
async fn repeated_continuation_token_is_an_error() {
    let catalog = CatalogBuilder::new()
        .page(&["Project0"])
        .stuck_token()
        .build();

    let err = engine(&catalog, ScanEngineConfig::default())
        .scan(&match_all())
        .await
        .unwrap_err();

    assert!(matches!(err, ScannerError::Remote { .. }));
}

#[tokio::test]
async fn token_cycle_across_pages_is_an_error() {
    // Given: Project1 페이지가 Project0 페이지의 토큰으로 되돌아감
    let catalog = CatalogBuilder::new()
        .page(&["Project0"])
        .page(&["Project1"])
        .cycling_tokens()
        .build();

    // When
    let err = tokio::time::timeout(
        Duration::from_secs(5),
        engine(&catalog, ScanEngineConfig::default()).scan(&match_all()),
    )
    .await
    .expect("discovery must stop on a token cycle")
    .unwrap_err();

    // Then: list_projects 1회 + list_more_projects 2회
    assert!(matches!(err, ScannerError::Remote { .. }), "{err}");
    assert!(err.to_string().contains("already returned"), "{err}");
    assert_eq!(catalog.calls(), 3);
}

#[tokio::test]
async fn project_discovery_failure_is_fatal() {
    let catalog = CatalogBuilder::new()
        .projects_error(server_error("list_projects"))
        .build();

    let err = engine(&catalog, ScanEngineConfig::default())
        .scan(&match_all())
        .await
        .unwrap_err();

    assert!(matches!(err, ScannerError::Remote { .. }));
}

// =============================================================================
// 실패 정책
// =============================================================================

#[tokio::test]
async fn repository_without_branches_is_excluded_without_warning() {
    let catalog = CatalogBuilder::new()
        .page(&["Project0"])
        .repositories("Project0", &["Empty", "Repo0"])
        .files_error(
            "Project0",
            "Empty",
            CatalogError::NoBranches {
                repository: "Empty".to_owned(),
            },
        )
        .file("Project0", "Repo0", "File0", "Content")
        .build();

    let results = engine(&catalog, ScanEngineConfig::default())
        .scan(&match_all())
        .await
        .unwrap();

    assert!(results.is_complete());
    assert_eq!(results.projects[0].repositories.len(), 1);
    assert_eq!(results.projects[0].repositories[0].name, "Repo0");
}

#[tokio::test]
async fn node_remote_error_becomes_a_warning_and_siblings_survive() {
    // Given: Repo1의 파일 목록 조회가 실패
    let catalog = CatalogBuilder::new()
        .page(&["Project0"])
        .repositories("Project0", &["Repo0", "Repo1", "Repo2"])
        .file("Project0", "Repo0", "File0", "Content")
        .files_error("Project0", "Repo1", server_error("list_files"))
        .file("Project0", "Repo2", "File0", "Content")
        .build();

    // When
    let results = engine(&catalog, ScanEngineConfig::default())
        .scan(&match_all())
        .await
        .unwrap();

    // Then
    let names: Vec<&str> = results.projects[0]
        .repositories
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["Repo0", "Repo2"]);
    assert_eq!(results.warnings.len(), 1);
    assert_eq!(results.warnings[0].scope, "Project0/Repo1");
    assert_eq!(results.warnings[0].operation, "list_files");
}

#[tokio::test]
async fn warnings_from_every_level_are_collected() {
    let catalog = CatalogBuilder::new()
        .page(&["Broken", "Project0"])
        .repositories_error("Broken", server_error("list_repositories"))
        .repositories("Project0", &["Repo0"])
        .file("Project0", "Repo0", "/ok.txt", "Content")
        .content_error("Project0", "Repo0", "/bad.txt", server_error("fetch_file_content"))
        .build();

    let results = engine(&catalog, ScanEngineConfig::default())
        .scan(&match_all())
        .await
        .unwrap();

    assert_eq!(results.item_count(), 1);
    let mut operations: Vec<&str> = results
        .warnings
        .iter()
        .map(|w| w.operation.as_str())
        .collect();
    operations.sort_unstable();
    assert_eq!(operations, vec!["fetch_file_content", "list_repositories"]);
}

#[tokio::test]
async fn strict_mode_turns_node_errors_into_scan_failure() {
    let catalog = CatalogBuilder::new()
        .page(&["Project0"])
        .repositories("Project0", &["Repo0", "Repo1"])
        .file("Project0", "Repo0", "File0", "Content")
        .files_error("Project0", "Repo1", server_error("list_files"))
        .build();
    let config = ScanEngineConfigBuilder::new()
        .strict_remote_errors(true)
        .build()
        .unwrap();

    let err = engine(&catalog, config)
        .scan(&match_all())
        .await
        .unwrap_err();

    match err {
        ScannerError::Remote { scope, .. } => assert_eq!(scope, "Project0/Repo1"),
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn remote_unavailable_mid_scan_aborts_the_scan() {
    let catalog = CatalogBuilder::new()
        .page(&["Project0", "Project1"])
        .repositories("Project0", &["Repo0"])
        .repositories_error("Project1", unavailable())
        .file("Project0", "Repo0", "File0", "Content")
        .build();

    let err = engine(&catalog, ScanEngineConfig::default())
        .scan(&match_all())
        .await
        .unwrap_err();

    assert!(matches!(err, ScannerError::RemoteUnavailable(_)), "{err}");
}

#[tokio::test]
async fn remote_unavailable_during_discovery_is_reported_as_such() {
    let catalog = CatalogBuilder::new().projects_error(unavailable()).build();

    let err = engine(&catalog, ScanEngineConfig::default())
        .scan(&match_all())
        .await
        .unwrap_err();

    assert!(matches!(err, ScannerError::RemoteUnavailable(_)), "{err}");
}

#[tokio::test]
async fn invalid_pattern_fails_before_any_remote_call() {
    let catalog = grid(1, 1, 1, 1).build();

    let err = engine(&catalog, ScanEngineConfig::default())
        .scan(&SearchCriteria::new("", "", "(unclosed"))
        .await
        .unwrap_err();

    assert!(matches!(err, ScannerError::InvalidPattern(_)));
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn oversized_file_is_cut_with_a_warning() {
    let catalog = CatalogBuilder::new()
        .page(&["P"])
        .repositories("P", &["R"])
        .file("P", "R", "/big.txt", "hit one\nhit two\nhit three\n")
        .build();
    let config = ScanEngineConfigBuilder::new()
        .max_file_size(8)
        .build()
        .unwrap();

    let results = engine(&catalog, config).scan(&match_all()).await.unwrap();

    assert_eq!(results.projects[0].repositories[0].files[0].lines, vec!["hit one"]);
    assert_eq!(results.warnings.len(), 1);
    assert_eq!(results.warnings[0].scope, "P/R/big.txt");
    assert_eq!(results.warnings[0].operation, "read_file_content");
}

// =============================================================================
// 워커 풀
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_pool_caps_concurrent_remote_calls() {
    // Given: 지연이 있는 카탈로그와 크기 3의 풀
    let catalog = grid(3, 3, 4, 2).delay(Duration::from_millis(5)).build();
    let config = ScanEngineConfigBuilder::new()
        .max_in_flight(3)
        .build()
        .unwrap();

    // When
    let results = engine(&catalog, config).scan(&match_all()).await.unwrap();

    // Then
    assert_eq!(results.item_count(), 36);
    assert!(catalog.max_observed_in_flight() <= 3);
    assert!(catalog.max_observed_in_flight() >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn projects_and_repositories_are_scanned_concurrently() {
    // Given: 호출마다 50ms 지연, 4 프로젝트 × 2 저장소 × 3 파일, 넉넉한 풀
    let catalog = grid(4, 2, 3, 1).delay(Duration::from_millis(50)).build();
    let config = ScanEngineConfigBuilder::new()
        .max_in_flight(64)
        .build()
        .unwrap();

    // When
    let started = Instant::now();
    let results = engine(&catalog, config).scan(&match_all()).await.unwrap();
    let elapsed = started.elapsed();

    // Then: 호출 37회를 직렬로 하면 1.85초, 단계별로 겹치면 약 0.2초
    assert_eq!(results.item_count(), 24);
    assert_eq!(catalog.calls(), 37);
    assert!(catalog.max_observed_in_flight() >= 4);
    assert!(elapsed < Duration::from_millis(1_000), "{elapsed:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pool_of_one_still_completes_nested_scan() {
    let catalog = grid(2, 2, 2, 1).build();
    let config = ScanEngineConfigBuilder::new()
        .max_in_flight(1)
        .build()
        .unwrap();

    let results = tokio::time::timeout(
        Duration::from_secs(10),
        engine(&catalog, config).scan(&match_all()),
    )
    .await
    .expect("scan must not deadlock")
    .unwrap();

    assert_eq!(results.item_count(), 8);
    assert_eq!(catalog.max_observed_in_flight(), 1);
}
