//! 태스크 결과: 노드와 경고의 쌍

use reposcan_core::types::ScanWarning;

/// 스캔 태스크 하나의 반환값
///
/// `node`가 `None`이면 매칭이 없거나 실패한 가지입니다.
/// 경고는 부모 단계로 그대로 전달됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    /// 만들어진 노드 (비어 있으면 `None`)
    pub node: Option<T>,
    /// 이 가지에서 발생한 노드 단위 실패
    pub warnings: Vec<ScanWarning>,
}

impl<T> Outcome<T> {
    /// 노드와 경고로 결과를 생성합니다.
    pub fn new(node: Option<T>, warnings: Vec<ScanWarning>) -> Self {
        Self { node, warnings }
    }

    /// 노드도 경고도 없는 결과
    pub fn empty() -> Self {
        Self {
            node: None,
            warnings: Vec::new(),
        }
    }

    /// 경고 하나만 가진 결과
    pub fn warning(warning: ScanWarning) -> Self {
        Self {
            node: None,
            warnings: vec![warning],
        }
    }
}

/// 한 단계의 자식 결과를 모읍니다.
#[derive(Debug)]
pub struct Collected<T> {
    /// 비어 있지 않은 자식 노드
    pub nodes: Vec<T>,
    /// 모든 자식의 경고
    pub warnings: Vec<ScanWarning>,
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> Collected<T> {
    /// 자식 결과 하나를 합칩니다.
    pub fn push(&mut self, outcome: Outcome<T>) {
        self.nodes.extend(outcome.node);
        self.warnings.extend(outcome.warnings);
    }
}
