//! Render Event Bus - 렌더 이벤트 발행/구독 시스템
//!
//! 커밋/스킵/롤백/폐기 이벤트를 등록된 옵저버에게 전달합니다.

use super::types::RenderEvent;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

// ============================================================================
// RenderObserver Trait
// ============================================================================

/// 옵저버 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// 렌더 이벤트 옵저버 trait
#[async_trait]
pub trait RenderObserver: Send + Sync {
    /// 옵저버 이름 (디버깅용)
    fn name(&self) -> &str;

    /// 관심 있는 이벤트 종류 (None이면 모든 이벤트)
    fn interests(&self) -> Option<Vec<&'static str>> {
        None
    }

    /// 이벤트 처리
    async fn on_event(&self, event: &RenderEvent);
}

// ============================================================================
// RenderEventBus
// ============================================================================

/// 이벤트 버스 설정
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// 이벤트 히스토리 보관 개수
    pub history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { history_size: 100 }
    }
}

/// 렌더 이벤트 버스
///
/// ## 사용법
///
/// ```ignore
/// let bus = RenderEventBus::new();
/// let id = bus.subscribe(my_observer).await;
/// bus.publish(RenderEvent::disposed()).await;
/// bus.unsubscribe(id).await;
/// ```
pub struct RenderEventBus {
    /// 설정
    config: EventBusConfig,

    /// 등록된 옵저버
    observers: RwLock<HashMap<ObserverId, Arc<dyn RenderObserver>>>,

    /// 옵저버 ID 카운터
    observer_counter: AtomicU64,

    /// 이벤트 히스토리
    history: RwLock<Vec<RenderEvent>>,

    /// 발행된 이벤트 수
    event_count: AtomicU64,
}

impl RenderEventBus {
    /// 기본 설정으로 버스 생성
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// 커스텀 설정으로 버스 생성
    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            config,
            observers: RwLock::new(HashMap::new()),
            observer_counter: AtomicU64::new(0),
            history: RwLock::new(Vec::new()),
            event_count: AtomicU64::new(0),
        }
    }

    /// 옵저버 등록
    pub async fn subscribe(&self, observer: Arc<dyn RenderObserver>) -> ObserverId {
        let id = ObserverId(self.observer_counter.fetch_add(1, Ordering::SeqCst));

        debug!(
            observer_name = observer.name(),
            observer_id = %id,
            "Registering render observer"
        );

        let mut observers = self.observers.write().await;
        observers.insert(id, observer);

        id
    }

    /// 옵저버 해제
    pub async fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write().await;
        let removed = observers.remove(&id).is_some();

        if removed {
            debug!(observer_id = %id, "Unregistered render observer");
        }

        removed
    }

    /// 이벤트 발행
    pub async fn publish(&self, event: RenderEvent) {
        self.event_count.fetch_add(1, Ordering::SeqCst);

        // 히스토리에 추가
        {
            let mut history = self.history.write().await;
            history.push(event.clone());

            // 히스토리 크기 제한
            if history.len() > self.config.history_size {
                history.remove(0);
            }
        }

        // 등록된 옵저버들에게 전달
        let observers = self.observers.read().await;
        for (id, observer) in observers.iter() {
            let should_deliver = match observer.interests() {
                Some(kinds) => kinds.contains(&event.kind.name()),
                None => true,
            };

            if should_deliver {
                trace!(
                    observer_id = %id,
                    observer_name = observer.name(),
                    event_kind = event.kind.name(),
                    "Delivering render event to observer"
                );

                observer.on_event(&event).await;
            }
        }
    }

    /// 최근 이벤트 히스토리 조회
    pub async fn history(&self, limit: Option<usize>) -> Vec<RenderEvent> {
        let history = self.history.read().await;
        let limit = limit.unwrap_or(history.len());
        history.iter().rev().take(limit).cloned().collect()
    }

    /// 종류 이름으로 히스토리 검색
    pub async fn history_of_kind(&self, kind: &str) -> Vec<RenderEvent> {
        let history = self.history.read().await;
        history
            .iter()
            .filter(|e| e.kind.name() == kind)
            .cloned()
            .collect()
    }

    /// 등록된 옵저버 수
    pub async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }

    /// 총 발행된 이벤트 수
    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::SeqCst)
    }

    /// 히스토리 클리어
    pub async fn clear_history(&self) {
        let mut history = self.history.write().await;
        history.clear();
    }
}

impl Default for RenderEventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 테스트
// ============================================================================
