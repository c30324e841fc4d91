//! 워커 풀: 프로세스 전체의 동시 원격 호출 수 제한
//!
//! 모든 원격 호출(그리고 내용 조회 직후의 파일 읽기)은 허가(permit)를 잡은 상태에서
//! 실행됩니다. 자식 태스크를 기다리는 동안에는 허가를 잡지 않으므로 풀 크기와
//! 무관하게 교착 상태가 생기지 않습니다.

use std::sync::Arc;

use metrics::gauge;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use reposcan_core::metrics as names;

use crate::error::ScannerError;

/// 동시 원격 호출 수를 제한하는 세마포어 래퍼
///
/// 복제본은 같은 세마포어를 공유합니다.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerPool {
    /// 최대 `capacity`개의 허가를 가진 풀을 생성합니다. 0은 1로 올립니다.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// 허가 하나를 얻을 때까지 기다립니다.
    pub async fn acquire(&self) -> Result<WorkerPermit, ScannerError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| ScannerError::Task("worker pool closed".to_owned()))?;
        gauge!(names::REMOTE_CALLS_IN_FLIGHT).increment(1.0);
        Ok(WorkerPermit { _permit: permit })
    }

    /// 풀 크기
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 지금 사용 가능한 허가 수
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// 워커 풀 허가. drop되면 반환됩니다.
#[derive(Debug)]
pub struct WorkerPermit {
    _permit: OwnedSemaphorePermit,
}

impl Drop for WorkerPermit {
    fn drop(&mut self) {
        gauge!(names::REMOTE_CALLS_IN_FLIGHT).decrement(1.0);
    }
}
