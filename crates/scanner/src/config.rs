//! 스캔 엔진 설정
//!
//! [`ScanEngineConfig`]는 core의 [`ScannerConfig`](reposcan_core::config::ScannerConfig)를
//! 기반으로 스캔 엔진 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use reposcan_core::config::RepoScanConfig;
//! use reposcan_scanner::config::ScanEngineConfig;
//!
//! let core_config = RepoScanConfig::default();
//! let config = ScanEngineConfig::from_core(&core_config.scanner);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ScannerError;

/// 스캔 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEngineConfig {
    /// 동시에 진행 가능한 원격 호출 수 (프로세스 전체)
    pub max_in_flight: usize,
    /// 노드 단위 원격 에러도 스캔 전체 실패로 처리할지 여부
    pub strict_remote_errors: bool,
    /// 파일 하나에서 읽을 최대 바이트 수
    pub max_file_size: u64,
}

impl Default for ScanEngineConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 32,
            strict_remote_errors: false,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

/// 설정 상한값 상수
const MAX_IN_FLIGHT: usize = 1024;
const MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

impl ScanEngineConfig {
    /// core의 `ScannerConfig`에서 엔진 설정을 생성합니다.
    pub fn from_core(core: &reposcan_core::config::ScannerConfig) -> Self {
        Self {
            max_in_flight: core.max_in_flight,
            strict_remote_errors: core.strict_remote_errors,
            max_file_size: core.max_file_size,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ScannerError> {
        if self.max_in_flight == 0 || self.max_in_flight > MAX_IN_FLIGHT {
            return Err(ScannerError::Config {
                field: "max_in_flight".to_owned(),
                reason: format!("must be 1-{MAX_IN_FLIGHT}"),
            });
        }

        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE {
            return Err(ScannerError::Config {
                field: "max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE}"),
            });
        }

        Ok(())
    }
}

/// 스캔 엔진 설정 빌더
#[derive(Default)]
pub struct ScanEngineConfigBuilder {
    config: ScanEngineConfig,
}

impl ScanEngineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 동시 원격 호출 수를 설정합니다.
    pub fn max_in_flight(mut self, max: usize) -> Self {
        self.config.max_in_flight = max;
        self
    }

    /// strict 모드 여부를 설정합니다.
    pub fn strict_remote_errors(mut self, strict: bool) -> Self {
        self.config.strict_remote_errors = strict;
        self
    }

    /// 파일 최대 읽기 크기(바이트)를 설정합니다.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// 설정을 검증하고 `ScanEngineConfig`를 생성합니다.
    pub fn build(self) -> Result<ScanEngineConfig, ScannerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
