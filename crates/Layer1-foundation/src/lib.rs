//! # formwork-foundation
//!
//! Foundation layer for Formwork:
//! - Core: 공유 타입과 경계 Trait (FieldDescriptor, FormModel, ViewHost...)
//! - Event: 렌더 이벤트 발행/구독 (커밋 알림, 스킵/롤백/폐기)
//! - Diag: 프리픽스 필터링 + 반복 억제 진단 로거
//! - Config: 캐시 정책과 재시도 설정
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  RenderOrchestrator (formwork-core)                     │
//! │  ├── TypeRegistry ── resolve(controlType)               │
//! │  │        │            (cache + linear-backoff retry)   │
//! │  │        ▼                                             │
//! │  │   ViewFactory ──▶ ViewHost.instantiate ──▶ FieldView │
//! │  │                                             │        │
//! │  └── FormModel.slot(name) ─────────── bind ────┘        │
//! │                     │                                   │
//! │                     ▼                                   │
//! │          RenderEventBus (committed / skipped / ...)     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod diag;
pub mod error;
pub mod event;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Core (공유 타입 및 경계 Trait)
// ============================================================================
pub use core::{
    // Types (types.rs)
    FieldDescriptor,
    RenderedInstance,
    // Handles (traits.rs)
    into_view_handle,
    FactoryHandle,
    SlotHandle,
    ViewHandle,
    // Traits (traits.rs)
    FieldView,
    FormModel,
    ValueSlot,
    ViewFactory,
    ViewHost,
};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    CachePolicy, RegistryConfig, DEV_CACHE_TTL, MAX_LOAD_ATTEMPTS, RETRY_BASE_DELAY,
};

// ============================================================================
// Event (이벤트 시스템)
// ============================================================================
pub use event::{
    // Bus
    EventBusConfig,
    ObserverId,
    RenderEventBus,
    RenderObserver,
    // Types
    EventId,
    RenderEvent,
    RenderEventKind,
};

// ============================================================================
// Diag (진단 로깅)
// ============================================================================
pub use diag::{diag, DiagConfig, DiagLevel, DiagLogger};
