//! 렌더 스냅샷 - 배치 동일성 판별
//!
//! (이름, 컨트롤 타입) 쌍의 순서 있는 목록만 비교합니다.
//! 메타데이터 변경은 재렌더 사유가 아닙니다 - 메타데이터는 뷰가
//! 커밋 이후 스스로 반영할 몫입니다.

use formwork_foundation::FieldDescriptor;

/// 커밋된 배치의 구조적 스냅샷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSnapshot {
    pairs: Vec<(String, String)>,
}

impl RenderSnapshot {
    /// 디스크립터 배치에서 스냅샷 생성
    pub fn capture(descriptors: &[FieldDescriptor]) -> Self {
        Self {
            pairs: descriptors
                .iter()
                .map(|d| (d.name.clone(), d.control_type.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
