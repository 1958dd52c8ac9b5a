//! 렌더 이벤트 타입 정의

use crate::core::RenderedInstance;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// 이벤트 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

/// 이벤트 종류별 페이로드
#[derive(Debug, Clone)]
pub enum RenderEventKind {
    /// 배치 전체가 성공적으로 커밋됨 (커밋당 정확히 한 번)
    Committed {
        /// 이름 → 인스턴스 맵
        instances: HashMap<String, RenderedInstance>,
    },

    /// 해석 실패로 필드를 건너뜀 (비치명적)
    FieldSkipped { name: String, control_type: String },

    /// 배치 중 예기치 않은 실패로 롤백 수행
    RolledBack { field: String, reason: String },

    /// 오케스트레이터가 폐기됨
    Disposed,
}

impl RenderEventKind {
    /// 필터링용 종류 이름
    pub fn name(&self) -> &'static str {
        match self {
            RenderEventKind::Committed { .. } => "render.committed",
            RenderEventKind::FieldSkipped { .. } => "render.field_skipped",
            RenderEventKind::RolledBack { .. } => "render.rolled_back",
            RenderEventKind::Disposed => "render.disposed",
        }
    }
}

/// 렌더 이벤트
#[derive(Debug, Clone)]
pub struct RenderEvent {
    /// 고유 ID
    pub id: EventId,

    /// 발생 시각
    pub timestamp: DateTime<Utc>,

    /// 페이로드
    pub kind: RenderEventKind,
}

impl RenderEvent {
    pub fn new(kind: RenderEventKind) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            kind,
        }
    }

    /// 커밋 이벤트 생성
    pub fn committed(instances: HashMap<String, RenderedInstance>) -> Self {
        Self::new(RenderEventKind::Committed { instances })
    }

    /// 필드 스킵 이벤트 생성
    pub fn field_skipped(name: impl Into<String>, control_type: impl Into<String>) -> Self {
        Self::new(RenderEventKind::FieldSkipped {
            name: name.into(),
            control_type: control_type.into(),
        })
    }

    /// 롤백 이벤트 생성
    pub fn rolled_back(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(RenderEventKind::RolledBack {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// 폐기 이벤트 생성
    pub fn disposed() -> Self {
        Self::new(RenderEventKind::Disposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(
            RenderEvent::field_skipped("x", "select").kind.name(),
            "render.field_skipped"
        );
        assert_eq!(RenderEvent::disposed().kind.name(), "render.disposed");
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = RenderEvent::disposed();
        let b = RenderEvent::disposed();
        assert_ne!(a.id, b.id);
    }
}
