//! 레지스트리 내부 타입
//!
//! 엔트리는 로더와 캐시 상태를 함께 들고 다닙니다.
//! 시도 횟수는 resolve 호출을 넘어 누적됩니다.

use formwork_foundation::{FactoryHandle, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::time::Instant;

/// 비동기 로더가 돌려주는 Future
pub type LoaderFuture = BoxFuture<'static, Result<FactoryHandle>>;

/// 컨트롤 타입 로더 - 호출될 때마다 새 로드 시도를 시작
pub type LoaderFn = Arc<dyn Fn() -> LoaderFuture + Send + Sync>;

/// 레지스트리 엔트리
///
/// `cached`가 Some이면 `cached_at` 기준으로 캐시 정책을 평가합니다.
/// `load_attempts`는 성공 시에만 리셋됩니다.
#[derive(Clone)]
pub struct RegistryEntry {
    /// 타입 로더
    pub loader: LoaderFn,

    /// 마지막 성공 로드의 팩토리
    pub cached: Option<FactoryHandle>,

    /// 캐시 시각 (tokio 시계 기준)
    pub cached_at: Option<Instant>,

    /// 누적 로드 시도 횟수
    pub load_attempts: u32,

    /// 마지막 실패 메시지 (진단용)
    pub last_error: Option<String>,
}

impl RegistryEntry {
    pub fn new(loader: LoaderFn) -> Self {
        Self {
            loader,
            cached: None,
            cached_at: None,
            load_attempts: 0,
            last_error: None,
        }
    }

    /// 캐시 상태 초기화 (시도 횟수 포함)
    pub fn clear_cache(&mut self) {
        self.cached = None;
        self.cached_at = None;
        self.load_attempts = 0;
        self.last_error = None;
    }

    /// 성공 로드 기록
    pub fn record_success(&mut self, factory: FactoryHandle, now: Instant) {
        self.cached = Some(factory);
        self.cached_at = Some(now);
        self.load_attempts = 0;
        self.last_error = None;
    }

    /// 실패 기록
    pub fn record_failure(&mut self, message: String) {
        self.load_attempts += 1;
        self.last_error = Some(message);
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("cached", &self.cached.as_ref().map(|c| c.label().to_string()))
            .field("cached_at", &self.cached_at)
            .field("load_attempts", &self.load_attempts)
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// 레지스트리 통계 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// 등록된 타입 수
    pub registered: usize,

    /// 캐시된 팩토리 수
    pub cached: usize,

    /// 시도 상한에 도달해 소진된 타입 수
    pub exhausted: usize,
}

/// 프리로드 결과
#[derive(Debug, Clone, Default)]
pub struct PreloadResult {
    /// 로드 성공한 타입 키
    pub loaded: Vec<String>,

    /// 로드 실패한 타입 키
    pub failed: Vec<String>,
}

impl PreloadResult {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
