//! 렌더링 파이프라인 (검증 → 해석 → 인스턴스화 → 커밋)

pub mod orchestrator;
pub mod snapshot;
pub mod transaction;

pub use orchestrator::RenderOrchestrator;
pub use snapshot::RenderSnapshot;
pub use transaction::RenderTransaction;
