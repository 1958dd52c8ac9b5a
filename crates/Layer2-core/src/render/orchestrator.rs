//! 렌더 오케스트레이터
//!
//! 디스크립터 배치를 검증하고, 레지스트리로 타입을 해석하고,
//! 순차적으로 인스턴스화한 뒤 원자적으로 커밋합니다.
//!
//! ## 직렬화와 병합
//!
//! 렌더는 한 번에 하나만 진행됩니다. 진행 중에 새 요청이 들어오면
//! 대기 슬롯의 이전 요청을 대체하고, 게이트가 풀린 시점에 가장
//! 최신 요청 하나만 실행됩니다. 병합으로 흡수된 호출은 Ok를
//! 돌려받습니다 - 실제 실행 결과는 실행한 호출 쪽에 전달됩니다.

use crate::registry::TypeRegistry;
use crate::render::snapshot::RenderSnapshot;
use crate::render::transaction::RenderTransaction;
use formwork_foundation::{
    diag, DiagLevel, Error, FactoryHandle, FieldDescriptor, FormModel, RenderEvent,
    RenderEventBus, RenderedInstance, Result, ViewHost,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

/// 대기 중인 렌더 요청
struct PendingRequest {
    generation: u64,
    model: Arc<dyn FormModel>,
    descriptors: Vec<FieldDescriptor>,
}

/// 커밋된 상태
#[derive(Default)]
struct OrchestratorState {
    committed: HashMap<String, RenderedInstance>,
    last_snapshot: Option<RenderSnapshot>,
    /// refresh()가 재사용할 마지막 렌더 입력
    last_request: Option<(Arc<dyn FormModel>, Vec<FieldDescriptor>)>,
    disposed: bool,
}

/// 렌더 오케스트레이터
pub struct RenderOrchestrator {
    registry: Arc<TypeRegistry>,
    host: Arc<dyn ViewHost>,
    bus: Arc<RenderEventBus>,

    state: parking_lot::Mutex<OrchestratorState>,

    /// 최신 대기 요청 (새 요청이 이전 것을 대체)
    pending: parking_lot::Mutex<Option<PendingRequest>>,

    /// 제출된 세대 번호
    submitted: AtomicU64,

    /// 완료(또는 병합 흡수)된 마지막 세대
    completed: AtomicU64,

    /// 렌더 직렬화 게이트
    render_gate: AsyncMutex<()>,
}

impl RenderOrchestrator {
    pub fn new(
        registry: Arc<TypeRegistry>,
        host: Arc<dyn ViewHost>,
        bus: Arc<RenderEventBus>,
    ) -> Self {
        Self {
            registry,
            host,
            bus,
            state: parking_lot::Mutex::new(OrchestratorState::default()),
            pending: parking_lot::Mutex::new(None),
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            render_gate: AsyncMutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn event_bus(&self) -> &Arc<RenderEventBus> {
        &self.bus
    }

    // ========================================================================
    // 렌더링
    // ========================================================================

    /// 디스크립터 배치 렌더링
    ///
    /// 검증 실패는 즉시 에러로 반환되고 기존 커밋 상태는 유지됩니다.
    /// 직전 커밋과 (이름, 타입) 목록이 같으면 아무 일도 하지 않습니다.
    pub async fn render(
        &self,
        model: Arc<dyn FormModel>,
        descriptors: &[FieldDescriptor],
    ) -> Result<()> {
        validate_batch(descriptors)?;

        {
            let mut state = self.state.lock();
            if state.disposed {
                return Err(Error::Internal(
                    "render requested on a disposed orchestrator".to_string(),
                ));
            }
            state.last_request = Some((model.clone(), descriptors.to_vec()));
        }

        let my_generation = {
            // 세대 할당과 슬롯 기록은 같은 락 안에서 일어나야 함.
            // 락 밖에서 세대를 뽑으면 멀티스레드 런타임에서 오래된
            // 요청이 더 새로운 요청을 덮어쓸 수 있음.
            let mut pending = self.pending.lock();
            let generation = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
            *pending = Some(PendingRequest {
                generation,
                model,
                descriptors: descriptors.to_vec(),
            });
            generation
        };

        // 겹치는 호출이 대기 슬롯을 대체할 기회를 준 뒤 게이트를 잡음
        tokio::task::yield_now().await;

        let _gate = self.render_gate.lock().await;

        if self.completed.load(Ordering::SeqCst) >= my_generation {
            // 더 새로운 요청이 이 호출을 흡수함
            return Ok(());
        }

        let request = match self.pending.lock().take() {
            Some(request) => request,
            None => return Ok(()),
        };

        let generation = request.generation;
        let result = self.run_pass(request).await;
        self.completed.store(generation, Ordering::SeqCst);
        result
    }

    /// 스냅샷을 무효화하고 마지막 입력으로 강제 재렌더
    ///
    /// 아직 렌더한 적이 없으면 아무 일도 하지 않습니다.
    pub async fn refresh(&self) -> Result<()> {
        let request = {
            let mut state = self.state.lock();
            state.last_snapshot = None;
            state.last_request.clone()
        };
        match request {
            Some((model, descriptors)) => self.render(model, &descriptors).await,
            None => Ok(()),
        }
    }

    async fn run_pass(&self, request: PendingRequest) -> Result<()> {
        let snapshot = RenderSnapshot::capture(&request.descriptors);

        {
            let state = self.state.lock();
            if state.disposed {
                return Err(Error::Internal(
                    "render requested on a disposed orchestrator".to_string(),
                ));
            }
            if state.last_snapshot.as_ref() == Some(&snapshot) {
                debug!(fields = snapshot.len(), "render: batch unchanged, skipping");
                return Ok(());
            }
        }

        let mut transaction = RenderTransaction::new(self.host.clone());
        let mut skipped: Vec<(String, String)> = Vec::new();

        for descriptor in &request.descriptors {
            let factory = match self.registry.resolve(&descriptor.control_type).await {
                Some(factory) => factory,
                None => {
                    diag().log(
                        DiagLevel::Warn,
                        &format!(
                            "[RenderOrchestrator] skipping field '{}': control type '{}' unavailable",
                            descriptor.name, descriptor.control_type
                        ),
                        None,
                    );
                    skipped.push((descriptor.name.clone(), descriptor.control_type.clone()));
                    continue;
                }
            };

            match self.instantiate_field(&request.model, descriptor, &factory) {
                Ok(instance) => transaction.track(instance),
                Err(err) => {
                    let field = descriptor.name.clone();
                    transaction.rollback();
                    self.bus
                        .publish(RenderEvent::rolled_back(&field, err.to_string()))
                        .await;
                    diag().log(
                        DiagLevel::Error,
                        &format!("[RenderOrchestrator] batch rolled back at '{field}': {err}"),
                        None,
                    );
                    return Err(err);
                }
            }
        }

        let committed = transaction.commit();

        let previous = {
            let mut state = self.state.lock();
            state.last_snapshot = Some(snapshot);
            std::mem::replace(&mut state.committed, committed.clone())
        };
        for instance in previous.values() {
            self.host.destroy(&instance.view);
        }

        for (name, control_type) in skipped {
            self.bus
                .publish(RenderEvent::field_skipped(name, control_type))
                .await;
        }
        self.bus.publish(RenderEvent::committed(committed)).await;
        Ok(())
    }

    /// 단일 필드 인스턴스화: 뷰 생성 → 메타데이터 적용 → 슬롯 바인딩 → attach
    fn instantiate_field(
        &self,
        model: &Arc<dyn FormModel>,
        descriptor: &FieldDescriptor,
        factory: &FactoryHandle,
    ) -> Result<RenderedInstance> {
        let view = self
            .host
            .instantiate(factory)
            .map_err(|err| Error::instantiation(&descriptor.name, err.to_string()))?;

        let slot = model.slot(&descriptor.name);
        if slot.is_none() {
            diag().log(
                DiagLevel::Warn,
                &format!(
                    "[RenderOrchestrator] field '{}' has no slot in the form model",
                    descriptor.name
                ),
                None,
            );
        }

        let attached = {
            let mut guard = view.lock();
            guard.apply_metadata(descriptor);
            if let Some(slot) = &slot {
                guard.bind_slot(slot.clone());
            }
            guard.on_attached()
        };

        if let Err(err) = attached {
            // 이미 생성된 뷰는 트랜잭션 밖이므로 여기서 직접 파괴
            self.host.destroy(&view);
            return Err(Error::instantiation(&descriptor.name, err.to_string()));
        }

        Ok(RenderedInstance {
            name: descriptor.name.clone(),
            control_type: descriptor.control_type.clone(),
            descriptor: descriptor.clone(),
            view,
            slot,
        })
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 커밋된 인스턴스 조회
    pub fn instance(&self, name: &str) -> Option<RenderedInstance> {
        self.state.lock().committed.get(name).cloned()
    }

    /// 커밋된 인스턴스 전체
    pub fn instances(&self) -> HashMap<String, RenderedInstance> {
        self.state.lock().committed.clone()
    }

    /// 커밋된 필드 수
    pub fn field_count(&self) -> usize {
        self.state.lock().committed.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    // ========================================================================
    // 폐기
    // ========================================================================

    /// 모든 인스턴스를 파괴하고 오케스트레이터를 폐기 (멱등)
    pub async fn dispose(&self) {
        let _gate = self.render_gate.lock().await;

        let previous = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.last_snapshot = None;
            state.last_request = None;
            std::mem::take(&mut state.committed)
        };

        // 대기 슬롯에 남은 요청도 함께 폐기 (모델/디스크립터 참조 해제)
        *self.pending.lock() = None;

        for instance in previous.values() {
            self.host.destroy(&instance.view);
        }

        self.bus.publish(RenderEvent::disposed()).await;
        debug!("render: orchestrator disposed");
    }
}

// ============================================================================
// 배치 검증
// ============================================================================

/// 디스크립터 배치 검증 (개별 유효성 + 이름 중복)
fn validate_batch(descriptors: &[FieldDescriptor]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(descriptors.len());

    for descriptor in descriptors {
        descriptor.validate().map_err(Error::Validation)?;
        if !seen.insert(descriptor.name.as_str()) {
            return Err(Error::DuplicateFields(descriptor.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_batch_rejects_duplicates() {
        let batch = vec![
            FieldDescriptor::new("email", "emailInput"),
            FieldDescriptor::new("email", "input"),
        ];
        assert!(matches!(
            validate_batch(&batch),
            Err(Error::DuplicateFields(name)) if name == "email"
        ));
    }

    #[test]
    fn test_validate_batch_rejects_blank_fields() {
        let batch = vec![FieldDescriptor::new("", "input")];
        assert!(matches!(validate_batch(&batch), Err(Error::Validation(_))));

        let batch = vec![FieldDescriptor::new("age", "")];
        assert!(matches!(validate_batch(&batch), Err(Error::Validation(_))));
    }

    #[test]
    fn test_validate_batch_accepts_empty() {
        assert!(validate_batch(&[]).is_ok());
    }
}
