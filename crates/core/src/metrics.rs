//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `reposcan_`
//! - 영역: `scan_`, `remote_`, `cache_`, `http_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(reposcan_core::metrics::SCANS_STARTED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure, hit, miss)
pub const LABEL_RESULT: &str = "result";

/// 원격/캐시 작업 레이블 키 (list_projects, list_files, get, set ...)
pub const LABEL_OPERATION: &str = "operation";

/// HTTP 상태 코드 레이블 키
pub const LABEL_STATUS: &str = "status";

/// 전역 레이블 키: 모니터링 계측 키
pub const LABEL_INSTRUMENTATION_KEY: &str = "instrumentation_key";

// ─── Scan 메트릭 ───────────────────────────────────────────────────

/// Scan: 시작된 스캔 수 (counter)
pub const SCANS_STARTED_TOTAL: &str = "reposcan_scans_started_total";

/// Scan: 완료된 스캔 수 (counter, label: result)
pub const SCANS_COMPLETED_TOTAL: &str = "reposcan_scans_completed_total";

/// Scan: 스캔 소요 시간 (histogram, 초)
pub const SCAN_DURATION_SECONDS: &str = "reposcan_scan_duration_seconds";

/// Scan: 노드 단위 경고 수 (counter)
pub const SCAN_WARNINGS_TOTAL: &str = "reposcan_scan_warnings_total";

/// Scan: 매칭된 파일 수 (counter)
pub const FILES_MATCHED_TOTAL: &str = "reposcan_files_matched_total";

/// Scan: 현재 진행 중인 원격 호출 수 (gauge)
pub const REMOTE_CALLS_IN_FLIGHT: &str = "reposcan_remote_calls_in_flight";

// ─── Remote 메트릭 ─────────────────────────────────────────────────

/// Remote: 원격 호출 실패 수 (counter, label: operation)
pub const REMOTE_ERRORS_TOTAL: &str = "reposcan_remote_errors_total";

// ─── Cache 메트릭 ──────────────────────────────────────────────────

/// Cache: 캐시 조회 수 (counter, label: result)
pub const CACHE_LOOKUPS_TOTAL: &str = "reposcan_cache_lookups_total";

/// Cache: 캐시 저장소 실패 수 (counter, label: operation)
pub const CACHE_FAILURES_TOTAL: &str = "reposcan_cache_failures_total";

// ─── HTTP 메트릭 ───────────────────────────────────────────────────

/// HTTP: 처리된 검색 요청 수 (counter, label: status)
pub const HTTP_REQUESTS_TOTAL: &str = "reposcan_http_requests_total";

/// HTTP: 검색 요청 처리 시간 (histogram, 초)
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "reposcan_http_request_duration_seconds";

// ─── Server 메트릭 ─────────────────────────────────────────────────

/// Server: 빌드 정보 (gauge, 항상 1, label: version)
pub const SERVER_BUILD_INFO: &str = "reposcan_server_build_info";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 스캔/요청 소요 시간 히스토그램 버킷 (초)
///
/// 10ms ~ 300s 범위 (대형 조직 전체 스캔 포함)
pub const SCAN_DURATION_BUCKETS: [f64; 11] = [
    0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `reposcan-server`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Scan
    describe_counter!(SCANS_STARTED_TOTAL, "Total number of organization scans started");
    describe_counter!(
        SCANS_COMPLETED_TOTAL,
        "Total number of organization scans completed, by result"
    );
    describe_histogram!(
        SCAN_DURATION_SECONDS,
        "Time to complete a single organization scan in seconds"
    );
    describe_counter!(
        SCAN_WARNINGS_TOTAL,
        "Total number of node-level failures recorded as scan warnings"
    );
    describe_counter!(
        FILES_MATCHED_TOTAL,
        "Total number of files with at least one matching line"
    );
    describe_gauge!(
        REMOTE_CALLS_IN_FLIGHT,
        "Number of remote catalog calls currently holding a worker permit"
    );

    // Remote
    describe_counter!(
        REMOTE_ERRORS_TOTAL,
        "Total number of failed remote catalog calls, by operation"
    );

    // Cache
    describe_counter!(CACHE_LOOKUPS_TOTAL, "Total number of cache lookups, by result");
    describe_counter!(
        CACHE_FAILURES_TOTAL,
        "Total number of cache store read/write failures"
    );

    // HTTP
    describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of search requests, by status");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "Search request handling latency in seconds"
    );

    // Server
    describe_gauge!(
        SERVER_BUILD_INFO,
        "Build information (always 1, with version label)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        SCANS_STARTED_TOTAL,
        SCANS_COMPLETED_TOTAL,
        SCAN_DURATION_SECONDS,
        SCAN_WARNINGS_TOTAL,
        FILES_MATCHED_TOTAL,
        REMOTE_CALLS_IN_FLIGHT,
        REMOTE_ERRORS_TOTAL,
        CACHE_LOOKUPS_TOTAL,
        CACHE_FAILURES_TOTAL,
        HTTP_REQUESTS_TOTAL,
        HTTP_REQUEST_DURATION_SECONDS,
        SERVER_BUILD_INFO,
    ];

    #[test]
    fn all_metrics_start_with_reposcan_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("reposcan_"),
                "Metric '{}' does not start with 'reposcan_' prefix",
                name
            );
        }
    }

    #[test]
    fn metric_names_are_unique() {
        let mut names = ALL_METRIC_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL_METRIC_NAMES.len());
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        let labels = [
            LABEL_RESULT,
            LABEL_OPERATION,
            LABEL_STATUS,
            LABEL_INSTRUMENTATION_KEY,
        ];
        for label in &labels {
            assert_eq!(
                label.to_lowercase(),
                *label,
                "Label key '{}' should be lowercase",
                label
            );
        }
    }

    #[test]
    fn scan_duration_buckets_are_sorted() {
        let buckets = SCAN_DURATION_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }
}
