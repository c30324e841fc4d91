//! 텔레메트리 계약: 스캔/캐시 이벤트 보고
//!
//! 스캔 엔진과 캐시 파사드는 생성 시점에 `Arc<dyn Telemetry>`를 주입받습니다.
//! 전역 클라이언트는 없으며, 레코더 설치와 종료 처리는 바이너리가 담당합니다.

use std::time::Duration;

use metrics::{counter, histogram};
use tracing::{debug, warn};

use crate::metrics as names;

/// 캐시 조회 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// 캐시 적중
    Hit,
    /// 캐시 미스
    Miss,
}

impl CacheLookup {
    /// 메트릭 레이블 값
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

/// 스캔 종료 요약
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// 결과 프로젝트 수
    pub projects: usize,
    /// 결과 파일 수
    pub items: usize,
    /// 노드 단위 경고 수
    pub warnings: usize,
    /// 성공 여부
    pub succeeded: bool,
}

/// 텔레메트리 수신자
pub trait Telemetry: Send + Sync + 'static {
    /// 스캔이 시작되었습니다.
    fn scan_started(&self, organization: &str);

    /// 스캔이 끝났습니다.
    fn scan_finished(&self, organization: &str, elapsed: Duration, summary: ScanSummary);

    /// 원격 호출이 실패했습니다.
    fn remote_error(&self, operation: &str, message: &str);

    /// 캐시를 조회했습니다.
    fn cache_lookup(&self, key: &str, lookup: CacheLookup);

    /// 캐시 저장소 읽기/쓰기에 실패했습니다.
    fn cache_failure(&self, operation: &str, message: &str);
}

/// 아무것도 하지 않는 텔레메트리 (테스트, 라이브러리 단독 사용)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn scan_started(&self, _organization: &str) {}
    fn scan_finished(&self, _organization: &str, _elapsed: Duration, _summary: ScanSummary) {}
    fn remote_error(&self, _operation: &str, _message: &str) {}
    fn cache_lookup(&self, _key: &str, _lookup: CacheLookup) {}
    fn cache_failure(&self, _operation: &str, _message: &str) {}
}

/// `metrics` 매크로와 `tracing` 이벤트로 보고하는 텔레메트리
///
/// 레코더가 설치되지 않았으면 메트릭 호출은 무시됩니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsTelemetry;

impl Telemetry for MetricsTelemetry {
    fn scan_started(&self, organization: &str) {
        counter!(names::SCANS_STARTED_TOTAL).increment(1);
        debug!(organization, "scan started");
    }

    fn scan_finished(&self, organization: &str, elapsed: Duration, summary: ScanSummary) {
        let result = if summary.succeeded { "success" } else { "failure" };
        counter!(names::SCANS_COMPLETED_TOTAL, names::LABEL_RESULT => result).increment(1);
        histogram!(names::SCAN_DURATION_SECONDS).record(elapsed.as_secs_f64());
        counter!(names::SCAN_WARNINGS_TOTAL).increment(summary.warnings as u64);
        counter!(names::FILES_MATCHED_TOTAL).increment(summary.items as u64);
        debug!(
            organization,
            elapsed_ms = elapsed.as_millis() as u64,
            projects = summary.projects,
            items = summary.items,
            warnings = summary.warnings,
            succeeded = summary.succeeded,
            "scan finished"
        );
    }

    fn remote_error(&self, operation: &str, message: &str) {
        counter!(names::REMOTE_ERRORS_TOTAL, names::LABEL_OPERATION => operation.to_owned())
            .increment(1);
        // 노드 실패의 warn 로그는 스캐너가 범위와 함께 남깁니다.
        debug!(operation, error = message, "remote call failed");
    }

    fn cache_lookup(&self, key: &str, lookup: CacheLookup) {
        counter!(names::CACHE_LOOKUPS_TOTAL, names::LABEL_RESULT => lookup.as_str()).increment(1);
        debug!(key, result = lookup.as_str(), "cache lookup");
    }

    fn cache_failure(&self, operation: &str, message: &str) {
        counter!(names::CACHE_FAILURES_TOTAL, names::LABEL_OPERATION => operation.to_owned())
            .increment(1);
        warn!(operation, error = message, "cache store failure");
    }
}
