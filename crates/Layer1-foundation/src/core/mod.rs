//! Core - 공유 타입과 경계 Trait

pub mod traits;
pub mod types;

pub use traits::{
    into_view_handle, FactoryHandle, FieldView, FormModel, SlotHandle, ValueSlot, ViewFactory,
    ViewHandle, ViewHost,
};
pub use types::{FieldDescriptor, RenderedInstance};
