//! # formwork-core
//!
//! Formwork의 핵심 런타임:
//! - Registry: 컨트롤 타입 키 → 비동기 로드된 뷰 팩토리 (캐시 + 재시도)
//! - Render: 배치 검증, 순차 인스턴스화, 전부-아니면-무(all-or-nothing) 커밋
//!
//! ## 사용법
//!
//! ```ignore
//! let registry = Arc::new(TypeRegistry::new(RegistryConfig::production()));
//! registry.register(control_types::SELECT, load_select_factory).await;
//!
//! let orchestrator = RenderOrchestrator::new(registry, host, bus);
//! orchestrator.render(model, &descriptors).await?;
//! ```

pub mod registry;
pub mod render;

// ============================================================================
// Registry
// ============================================================================
pub use registry::{
    control_types, normalize_key, KeyMatch, LoaderFn, LoaderFuture, PreloadResult, RegistryStats,
    TypeRegistry,
};

// ============================================================================
// Render
// ============================================================================
pub use render::{RenderOrchestrator, RenderSnapshot, RenderTransaction};

// 편의상 foundation의 핵심 표면을 재노출
pub use formwork_foundation::{
    into_view_handle, CachePolicy, Error, FactoryHandle, FieldDescriptor, FieldView, FormModel,
    RegistryConfig, RenderEvent, RenderEventBus, RenderEventKind, RenderObserver,
    RenderedInstance, Result, SlotHandle, ValueSlot, ViewFactory, ViewHandle, ViewHost,
};
