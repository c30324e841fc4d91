//! 조직 스캐너: 조직 단위 세션 수립 후 스캔 실행
//!
//! [`OrganizationScanner`]는 프로세스에 하나 존재하며, 모든 요청이 같은
//! [`WorkerPool`]을 공유합니다. 요청마다 카탈로그 세션을 새로 수립하고
//! `scan_id` span 안에서 [`ScanEngine`]을 실행합니다.

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use reposcan_core::catalog::{CatalogConnector, Credential};
use reposcan_core::pattern::CriteriaMatcher;
use reposcan_core::telemetry::{ScanSummary, Telemetry};
use reposcan_core::types::{ScanResults, SearchCriteria};

use crate::config::ScanEngineConfig;
use crate::engine::ScanEngine;
use crate::error::ScannerError;
use crate::pool::WorkerPool;

/// 조직 단위 검색 진입점
pub struct OrganizationScanner<F: CatalogConnector> {
    connector: Arc<F>,
    pool: WorkerPool,
    config: ScanEngineConfig,
    telemetry: Arc<dyn Telemetry>,
}

impl<F: CatalogConnector> OrganizationScanner<F> {
    /// 새 스캐너를 생성합니다. 설정을 검증하고 워커 풀을 만듭니다.
    pub fn new(
        connector: Arc<F>,
        config: ScanEngineConfig,
        telemetry: Arc<dyn Telemetry>,
    ) -> Result<Self, ScannerError> {
        config.validate()?;
        let pool = WorkerPool::new(config.max_in_flight);
        Ok(Self {
            connector,
            pool,
            config,
            telemetry,
        })
    }

    /// 공유 워커 풀
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// 조직 전체를 검색합니다.
    ///
    /// 패턴은 세션 수립 전에 컴파일되므로 잘못된 패턴은 원격 호출 없이 실패합니다.
    /// 세션 수립 실패는 [`ScannerError::RemoteUnavailable`]입니다.
    pub async fn search(
        &self,
        organization: &str,
        credential: &Credential,
        criteria: &SearchCriteria,
    ) -> Result<ScanResults, ScannerError> {
        let scan_id = Uuid::new_v4();
        let span = info_span!("scan", %scan_id, organization);

        async {
            info!(criteria = %criteria, "scan started");
            self.telemetry.scan_started(organization);
            let started = Instant::now();

            let result = self.run(organization, credential, criteria).await;

            let summary = match &result {
                Ok(results) => ScanSummary {
                    projects: results.projects.len(),
                    items: results.item_count(),
                    warnings: results.warnings.len(),
                    succeeded: true,
                },
                Err(_) => ScanSummary {
                    projects: 0,
                    items: 0,
                    warnings: 0,
                    succeeded: false,
                },
            };
            self.telemetry
                .scan_finished(organization, started.elapsed(), summary);

            match &result {
                Ok(results) => info!(
                    projects = summary.projects,
                    items = summary.items,
                    lines = results.line_count(),
                    warnings = summary.warnings,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "scan finished"
                ),
                Err(e) => warn!(error = %e, "scan failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        organization: &str,
        credential: &Credential,
        criteria: &SearchCriteria,
    ) -> Result<ScanResults, ScannerError> {
        let matcher = Arc::new(CriteriaMatcher::compile(criteria)?);

        let catalog = self
            .connector
            .connect(organization, credential)
            .await
            .map_err(|e| ScannerError::RemoteUnavailable(e.to_string()))?;

        let engine = ScanEngine::new(
            Arc::new(catalog),
            self.pool.clone(),
            self.config.clone(),
            Arc::clone(&self.telemetry),
        );
        engine.scan_compiled(matcher).await
    }
}
