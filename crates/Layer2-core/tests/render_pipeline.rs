//! 렌더 파이프라인 통합 테스트 - 검증/해석/커밋/롤백 검증
//!
//! `cargo test -p formwork-core --test render_pipeline -- --nocapture`

use formwork_core::{
    control_types, into_view_handle, Error, FactoryHandle, FieldDescriptor, FieldView, FormModel,
    RegistryConfig, RenderEventBus, RenderOrchestrator, RenderedInstance, Result, SlotHandle,
    TypeRegistry, ValueSlot, ViewFactory, ViewHandle, ViewHost,
};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// 테스트 하네스
// ============================================================================

/// 적용된 메타데이터와 바인딩된 슬롯을 기록하는 뷰
struct StubView {
    kind: String,
    field_name: Option<String>,
    label: Option<String>,
    slot: Option<SlotHandle>,
    attach_count: usize,
}

impl StubView {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            field_name: None,
            label: None,
            slot: None,
            attach_count: 0,
        }
    }
}

impl FieldView for StubView {
    fn apply_metadata(&mut self, descriptor: &FieldDescriptor) {
        self.field_name = Some(descriptor.name.clone());
        self.label = descriptor
            .meta("label")
            .and_then(|v| v.as_str())
            .map(String::from);
    }

    fn bind_slot(&mut self, slot: SlotHandle) {
        self.slot = Some(slot);
    }

    fn on_attached(&mut self) -> Result<()> {
        self.attach_count += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct StubFactory {
    kind: String,
}

impl StubFactory {
    fn handle(kind: &str) -> FactoryHandle {
        Arc::new(Self {
            kind: kind.to_string(),
        })
    }
}

impl ViewFactory for StubFactory {
    fn label(&self) -> &str {
        &self.kind
    }

    fn create(&self) -> Result<Box<dyn FieldView>> {
        Ok(Box::new(StubView::new(&self.kind)))
    }
}

/// create()가 항상 실패하는 팩토리
struct BrokenFactory;

impl ViewFactory for BrokenFactory {
    fn label(&self) -> &str {
        "broken"
    }

    fn create(&self) -> Result<Box<dyn FieldView>> {
        Err(Error::ViewHost("factory cannot produce views".to_string()))
    }
}

/// 생성/파괴를 세고 파괴 순서를 필드 이름으로 기록하는 호스트
#[derive(Default)]
struct CountingHost {
    instantiated: AtomicUsize,
    destroyed: AtomicUsize,
    destroy_order: Mutex<Vec<String>>,
}

impl CountingHost {
    fn instantiated(&self) -> usize {
        self.instantiated.load(Ordering::SeqCst)
    }

    fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl ViewHost for CountingHost {
    fn instantiate(&self, factory: &FactoryHandle) -> Result<ViewHandle> {
        let view = factory.create()?;
        self.instantiated.fetch_add(1, Ordering::SeqCst);
        Ok(into_view_handle(view))
    }

    fn destroy(&self, view: &ViewHandle) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        let guard = view.lock();
        if let Some(stub) = guard.as_any().downcast_ref::<StubView>() {
            if let Some(name) = &stub.field_name {
                self.destroy_order.lock().push(name.clone());
            }
        }
    }
}

/// JSON 값 하나를 담는 슬롯
struct JsonSlot {
    value: Mutex<serde_json::Value>,
}

impl JsonSlot {
    fn handle(initial: serde_json::Value) -> SlotHandle {
        Arc::new(Self {
            value: Mutex::new(initial),
        })
    }
}

impl ValueSlot for JsonSlot {
    fn value(&self) -> serde_json::Value {
        self.value.lock().clone()
    }

    fn set_value(&self, value: serde_json::Value) {
        *self.value.lock() = value;
    }
}

struct MapModel {
    slots: HashMap<String, SlotHandle>,
}

impl MapModel {
    fn with_fields(names: &[&str]) -> Arc<dyn FormModel> {
        let slots = names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    JsonSlot::handle(serde_json::Value::Null),
                )
            })
            .collect();
        Arc::new(Self { slots })
    }
}

impl FormModel for MapModel {
    fn slot(&self, name: &str) -> Option<SlotHandle> {
        self.slots.get(name).cloned()
    }
}

/// 오케스트레이터 + 협력자 일괄 구성
struct Fixture {
    registry: Arc<TypeRegistry>,
    host: Arc<CountingHost>,
    bus: Arc<RenderEventBus>,
    orchestrator: RenderOrchestrator,
}

impl Fixture {
    async fn new() -> Self {
        let config = RegistryConfig::production().with_retry_base_delay(Duration::from_millis(1));
        let registry = Arc::new(TypeRegistry::new(config));
        let host = Arc::new(CountingHost::default());
        let bus = Arc::new(RenderEventBus::new());
        let orchestrator = RenderOrchestrator::new(registry.clone(), host.clone(), bus.clone());

        for kind in [
            control_types::INPUT,
            control_types::SELECT,
            control_types::EMAIL_INPUT,
        ] {
            registry
                .register(kind, move || async move { Ok(StubFactory::handle(kind)) })
                .await;
        }

        Self {
            registry,
            host,
            bus,
            orchestrator,
        }
    }

    async fn committed_events(&self) -> usize {
        self.bus.history_of_kind("render.committed").await.len()
    }
}

fn descriptor(name: &str, control_type: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, control_type)
}

// ============================================================================
// 테스트
// ============================================================================

#[tokio::test]
async fn test_single_field_renders_and_commits() {
    let fx = Fixture::new().await;
    let model = MapModel::with_fields(&["email"]);

    let batch = vec![
        descriptor("email", control_types::EMAIL_INPUT)
            .with_meta("label", serde_json::json!("E-mail")),
    ];
    fx.orchestrator
        .render(model, &batch)
        .await
        .expect("render failed");

    assert_eq!(fx.orchestrator.field_count(), 1);
    assert_eq!(fx.host.instantiated(), 1);

    let instance: RenderedInstance = fx.orchestrator.instance("email").expect("missing instance");
    assert_eq!(instance.control_type, "emailInput");
    assert!(instance.slot.is_some());

    // 뷰에 메타데이터와 슬롯이 실제로 흘러들었는지 확인
    let guard = instance.view.lock();
    let stub = guard
        .as_any()
        .downcast_ref::<StubView>()
        .expect("not a StubView");
    assert_eq!(stub.kind, "emailInput");
    assert_eq!(stub.field_name.as_deref(), Some("email"));
    assert_eq!(stub.label.as_deref(), Some("E-mail"));
    assert!(stub.slot.is_some());
    assert_eq!(stub.attach_count, 1);
    drop(guard);

    assert_eq!(fx.committed_events().await, 1);
}

#[tokio::test]
async fn test_identical_batch_is_a_noop() {
    let fx = Fixture::new().await;
    let model = MapModel::with_fields(&["name", "age"]);
    let batch = vec![
        descriptor("name", control_types::INPUT),
        descriptor("age", control_types::INPUT),
    ];

    fx.orchestrator
        .render(model.clone(), &batch)
        .await
        .expect("first render failed");
    fx.orchestrator
        .render(model, &batch)
        .await
        .expect("second render failed");

    // 두 번째 호출은 인스턴스화도 커밋도 하지 않음
    assert_eq!(fx.host.instantiated(), 2);
    assert_eq!(fx.host.destroyed(), 0);
    assert_eq!(fx.committed_events().await, 1);
}

#[tokio::test]
async fn test_metadata_only_change_is_a_noop() {
    let fx = Fixture::new().await;
    let model = MapModel::with_fields(&["name"]);

    fx.orchestrator
        .render(model.clone(), &[descriptor("name", control_types::INPUT)])
        .await
        .expect("render failed");

    let decorated = vec![
        descriptor("name", control_types::INPUT).with_meta("label", serde_json::json!("Name")),
    ];
    fx.orchestrator
        .render(model, &decorated)
        .await
        .expect("render failed");

    assert_eq!(fx.host.instantiated(), 1);
}

#[tokio::test]
async fn test_unknown_type_skips_field_without_error() {
    let fx = Fixture::new().await;
    let model = MapModel::with_fields(&["name", "mood"]);

    let batch = vec![
        descriptor("name", control_types::INPUT),
        descriptor("mood", "hologram"),
    ];
    fx.orchestrator
        .render(model, &batch)
        .await
        .expect("skip should not fail the batch");

    assert_eq!(fx.orchestrator.field_count(), 1);
    assert!(fx.orchestrator.instance("mood").is_none());

    let skipped = fx.bus.history_of_kind("render.field_skipped").await;
    assert_eq!(skipped.len(), 1);
    assert_eq!(fx.committed_events().await, 1);
}

#[tokio::test]
async fn test_failed_instantiation_rolls_back_batch() {
    let fx = Fixture::new().await;
    fx.registry
        .register("brokenWidget", || async {
            Ok(Arc::new(BrokenFactory) as FactoryHandle)
        })
        .await;

    let model = MapModel::with_fields(&["a", "b", "c"]);
    let batch = vec![
        descriptor("a", control_types::INPUT),
        descriptor("b", control_types::SELECT),
        descriptor("c", "brokenWidget"),
    ];

    let err = fx
        .orchestrator
        .render(model, &batch)
        .await
        .expect_err("broken factory should fail the batch");
    assert!(matches!(err, Error::Instantiation { .. }));

    // 부분 생성분은 역순으로 파괴되고 커밋은 없음
    assert_eq!(fx.orchestrator.field_count(), 0);
    assert_eq!(fx.host.instantiated(), 2);
    assert_eq!(fx.host.destroyed(), 2);
    assert_eq!(*fx.host.destroy_order.lock(), vec!["b", "a"]);

    assert_eq!(fx.bus.history_of_kind("render.rolled_back").await.len(), 1);
    assert_eq!(fx.committed_events().await, 0);
}

#[tokio::test]
async fn test_failed_rerender_preserves_previous_commit() {
    let fx = Fixture::new().await;
    fx.registry
        .register("brokenWidget", || async {
            Ok(Arc::new(BrokenFactory) as FactoryHandle)
        })
        .await;

    let model = MapModel::with_fields(&["first", "second"]);
    fx.orchestrator
        .render(model.clone(), &[descriptor("first", control_types::INPUT)])
        .await
        .expect("initial render failed");
    assert_eq!(fx.orchestrator.field_count(), 1);

    let batch = vec![
        descriptor("second", control_types::SELECT),
        descriptor("first", "brokenWidget"),
    ];
    assert!(fx.orchestrator.render(model, &batch).await.is_err());

    // 이전 커밋 세트는 손대지 않음
    assert_eq!(fx.orchestrator.field_count(), 1);
    assert!(fx.orchestrator.instance("first").is_some());
    // 파괴된 것은 롤백된 부분 생성분(second) 하나뿐
    assert_eq!(fx.host.destroyed(), 1);
}

#[tokio::test]
async fn test_duplicate_names_rejected_before_any_work() {
    let fx = Fixture::new().await;
    let model = MapModel::with_fields(&["x"]);

    let batch = vec![
        descriptor("x", control_types::INPUT),
        descriptor("x", control_types::SELECT),
    ];
    let err = fx
        .orchestrator
        .render(model, &batch)
        .await
        .expect_err("duplicates must be rejected");
    assert!(matches!(err, Error::DuplicateFields(_)));
    assert_eq!(fx.host.instantiated(), 0);
    assert_eq!(fx.bus.event_count(), 0);
}

#[tokio::test]
async fn test_rerender_replaces_and_destroys_old_views() {
    let fx = Fixture::new().await;
    let model = MapModel::with_fields(&["name", "kind"]);

    fx.orchestrator
        .render(model.clone(), &[descriptor("name", control_types::INPUT)])
        .await
        .expect("first render failed");

    fx.orchestrator
        .render(
            model,
            &[
                descriptor("name", control_types::INPUT),
                descriptor("kind", control_types::SELECT),
            ],
        )
        .await
        .expect("second render failed");

    assert_eq!(fx.orchestrator.field_count(), 2);
    assert_eq!(fx.host.instantiated(), 3);
    // 이전 세트는 새 커밋이 자리를 잡은 뒤에 파괴됨
    assert_eq!(fx.host.destroyed(), 1);
    assert_eq!(fx.committed_events().await, 2);
}

#[tokio::test]
async fn test_overlapping_renders_coalesce_to_latest() {
    let fx = Fixture::new().await;
    let model = MapModel::with_fields(&["a", "b", "c"]);

    let first = vec![descriptor("a", control_types::INPUT)];
    let second = vec![
        descriptor("b", control_types::SELECT),
        descriptor("c", control_types::INPUT),
    ];

    let (r1, r2) = tokio::join!(
        fx.orchestrator.render(model.clone(), &first),
        fx.orchestrator.render(model.clone(), &second),
    );
    r1.expect("coalesced call failed");
    r2.expect("latest call failed");

    // 유효한 인스턴스화 패스는 한 번, 내용은 나중 요청을 반영
    assert_eq!(fx.host.instantiated(), 2);
    assert_eq!(fx.orchestrator.field_count(), 2);
    assert!(fx.orchestrator.instance("a").is_none());
    assert!(fx.orchestrator.instance("b").is_some());
    assert_eq!(fx.committed_events().await, 1);
}

#[tokio::test]
async fn test_refresh_ignores_snapshot() {
    let fx = Fixture::new().await;
    let model = MapModel::with_fields(&["name"]);
    let batch = vec![descriptor("name", control_types::INPUT)];

    fx.orchestrator
        .render(model, &batch)
        .await
        .expect("render failed");
    fx.orchestrator.refresh().await.expect("refresh failed");

    assert_eq!(fx.host.instantiated(), 2);
    assert_eq!(fx.host.destroyed(), 1);
    assert_eq!(fx.committed_events().await, 2);
}

#[tokio::test]
async fn test_dispose_destroys_everything_and_blocks_renders() {
    let fx = Fixture::new().await;
    let model = MapModel::with_fields(&["a", "b"]);

    fx.orchestrator
        .render(
            model.clone(),
            &[
                descriptor("a", control_types::INPUT),
                descriptor("b", control_types::SELECT),
            ],
        )
        .await
        .expect("render failed");

    fx.orchestrator.dispose().await;
    assert!(fx.orchestrator.is_disposed());
    assert_eq!(fx.orchestrator.field_count(), 0);
    assert_eq!(fx.host.destroyed(), 2);
    assert_eq!(fx.bus.history_of_kind("render.disposed").await.len(), 1);

    // 폐기 후 렌더는 거부
    let err = fx
        .orchestrator
        .render(model, &[descriptor("a", control_types::INPUT)])
        .await
        .expect_err("disposed orchestrator must reject renders");
    assert!(matches!(err, Error::Internal(_)));

    // 멱등
    fx.orchestrator.dispose().await;
    assert_eq!(fx.bus.history_of_kind("render.disposed").await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_renders_commit_one_coherent_batch() {
    let fx = Arc::new(Fixture::new().await);

    let mut handles = Vec::new();
    for i in 0..8 {
        let fx = fx.clone();
        handles.push(tokio::spawn(async move {
            let model = MapModel::with_fields(&[]);
            let batch = vec![
                descriptor(&format!("g{i}_a"), control_types::INPUT),
                descriptor(&format!("g{i}_b"), control_types::SELECT),
            ];
            fx.orchestrator.render(model, &batch).await
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked").expect("render failed");
    }

    // 커밋된 세트는 항상 제출된 배치 중 정확히 하나 - 섞이지 않음
    let committed = fx.orchestrator.instances();
    assert_eq!(committed.len(), 2);
    let prefixes: std::collections::HashSet<&str> = committed
        .keys()
        .map(|k| k.split('_').next().unwrap())
        .collect();
    assert_eq!(prefixes.len(), 1);

    // 대기 슬롯에 요청이 남아 있지 않아 다음 렌더가 정상 동작
    let model = MapModel::with_fields(&["last"]);
    fx.orchestrator
        .render(model, &[descriptor("last", control_types::INPUT)])
        .await
        .expect("follow-up render failed");
    assert_eq!(fx.orchestrator.field_count(), 1);
    assert!(fx.orchestrator.instance("last").is_some());
}

#[tokio::test]
async fn test_dispose_releases_model_and_descriptors() {
    let fx = Fixture::new().await;

    let concrete = Arc::new(MapModel {
        slots: HashMap::new(),
    });
    let model: Arc<dyn FormModel> = concrete.clone();

    fx.orchestrator
        .render(model, &[descriptor("name", control_types::INPUT)])
        .await
        .expect("render failed");
    // refresh용으로 모델을 붙들고 있는 동안에는 참조가 남아 있음
    assert!(Arc::strong_count(&concrete) > 1);

    fx.orchestrator.dispose().await;

    // 폐기 후에는 저장된 요청도 대기 슬롯도 모델을 잡지 않음
    assert_eq!(Arc::strong_count(&concrete), 1);
}

#[tokio::test]
async fn test_field_without_slot_still_renders() {
    let fx = Fixture::new().await;
    let model = MapModel::with_fields(&[]);

    fx.orchestrator
        .render(model, &[descriptor("orphan", control_types::INPUT)])
        .await
        .expect("render failed");

    let instance = fx.orchestrator.instance("orphan").expect("missing instance");
    assert!(instance.slot.is_none());

    let guard = instance.view.lock();
    let stub = guard.as_any().downcast_ref::<StubView>().expect("not a StubView");
    assert!(stub.slot.is_none());
    assert_eq!(stub.attach_count, 1);
}
