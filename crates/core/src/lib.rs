#![doc = include_str!("../README.md")]

pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pattern;
pub mod telemetry;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{CacheError, CatalogError, ConfigError, PatternError, RepoScanError};

// 설정
pub use config::RepoScanConfig;

// 카탈로그 계약
pub use catalog::{
    CatalogConnector, Credential, FileEntry, ObjectKind, ProjectPage, ProjectRef, RemoteCatalog,
    RepositoryRef,
};

// 패턴 매처
pub use pattern::{CriteriaMatcher, PatternMatcher};

// 텔레메트리
pub use telemetry::{CacheLookup, MetricsTelemetry, NoopTelemetry, ScanSummary, Telemetry};

// 도메인 타입
pub use types::{Item, Project, Repository, ScanResults, ScanWarning, SearchCriteria};
