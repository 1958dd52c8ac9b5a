//! Event - 렌더 이벤트 시스템

pub mod bus;
pub mod types;

pub use bus::{EventBusConfig, ObserverId, RenderEventBus, RenderObserver};
pub use types::{EventId, RenderEvent, RenderEventKind};
