//! 경계 Trait 정의 (FormModel, ViewFactory, FieldView, ViewHost)
//!
//! 렌더링 파이프라인이 소비하는 외부 협력자들의 계약만 정의합니다.
//! 구체적인 시각 구현은 이 크레이트 바깥에 있습니다.

use super::types::FieldDescriptor;
use crate::Result;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;

// ============================================================================
// Handles
// ============================================================================

/// 해석된 뷰 팩토리 핸들 (불변으로 취급)
pub type FactoryHandle = Arc<dyn ViewFactory>;

/// 인스턴스화된 라이브 뷰 핸들
pub type ViewHandle = Arc<Mutex<dyn FieldView>>;

/// 외부 소유 편집 가능 값 슬롯 핸들
pub type SlotHandle = Arc<dyn ValueSlot>;

// ============================================================================
// FormModel
// ============================================================================

/// 폼 모델 - 이름으로 값 슬롯을 찾는 외부 컨테이너
///
/// 파이프라인은 슬롯을 생성하거나 파괴하지 않습니다.
/// 디스크립터 이름으로 조회해서 뷰에 넘겨줄 뿐입니다.
pub trait FormModel: Send + Sync {
    /// 이름으로 슬롯 조회
    fn slot(&self, name: &str) -> Option<SlotHandle>;
}

/// 편집 가능한 값 슬롯
///
/// 값의 소유권과 검증 상태는 전적으로 폼 모델 측 책임입니다.
pub trait ValueSlot: Send + Sync {
    /// 현재 값
    fn value(&self) -> serde_json::Value;

    /// 값 설정
    fn set_value(&self, value: serde_json::Value);
}

// ============================================================================
// ViewFactory / FieldView
// ============================================================================

/// 뷰 팩토리 - 라이브 뷰 인스턴스를 생산할 수 있는 불투명 핸들
///
/// TypeRegistry의 비동기 로더가 해석 결과로 돌려줍니다.
pub trait ViewFactory: Send + Sync {
    /// 팩토리 식별용 라벨 (디버깅/로깅용)
    fn label(&self) -> &str;

    /// 새 뷰 인스턴스 생성 (실패 가능)
    fn create(&self) -> Result<Box<dyn FieldView>>;
}

/// 라이브 필드 뷰
///
/// 인스턴스 바인딩 표면: 메타데이터 슬롯, 폼 슬롯 참조,
/// 그리고 둘 다 설정된 후 한 번 호출되는 선택적 lifecycle hook.
pub trait FieldView: Send + Sync {
    /// 디스크립터 메타데이터 주입
    fn apply_metadata(&mut self, descriptor: &FieldDescriptor);

    /// 폼 모델 슬롯 바인딩
    fn bind_slot(&mut self, slot: SlotHandle);

    /// 메타데이터와 슬롯이 모두 설정된 후 한 번 호출
    fn on_attached(&mut self) -> Result<()> {
        Ok(())
    }

    /// 다운캐스팅용
    fn as_any(&self) -> &dyn Any;
}

impl FieldView for Box<dyn FieldView> {
    fn apply_metadata(&mut self, descriptor: &FieldDescriptor) {
        (**self).apply_metadata(descriptor)
    }

    fn bind_slot(&mut self, slot: SlotHandle) {
        (**self).bind_slot(slot)
    }

    fn on_attached(&mut self) -> Result<()> {
        (**self).on_attached()
    }

    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }
}

/// 박싱된 뷰를 공유 핸들로 전환 (ViewHost 구현용 헬퍼)
pub fn into_view_handle(view: Box<dyn FieldView>) -> ViewHandle {
    Arc::new(Mutex::new(view))
}

// ============================================================================
// ViewHost
// ============================================================================

/// 뷰 호스트 - 팩토리를 라이브 인스턴스로 전환하고 파괴를 담당
pub trait ViewHost: Send + Sync {
    /// 팩토리로부터 라이브 뷰 생성 (실패 가능)
    fn instantiate(&self, factory: &FactoryHandle) -> Result<ViewHandle>;

    /// 라이브 뷰 파괴 (멱등, 실패하지 않음)
    fn destroy(&self, view: &ViewHandle);
}
