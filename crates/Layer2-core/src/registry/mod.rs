//! 컨트롤 타입 레지스트리
//!
//! 컨트롤 타입 키를 비동기 로더에 매핑하고, 해석된 팩토리를
//! 캐시 정책에 따라 재사용합니다. 해석은 절대 에러를 던지지 않습니다 -
//! 실패는 재시도 후 None으로 강등되고, 호출 측은 해당 필드를 건너뜁니다.

pub mod control_types;
pub mod normalize;
pub mod types;

pub use normalize::{normalize_key, KeyMatch};
pub use types::{LoaderFn, LoaderFuture, PreloadResult, RegistryEntry, RegistryStats};

use formwork_foundation::{diag, DiagLevel, FactoryHandle, RegistryConfig, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// 컨트롤 타입 레지스트리
///
/// 모든 메서드는 `&self`를 받으며 태스크 간 공유를 전제로 합니다.
/// 락은 await 지점을 넘어 유지되지 않습니다.
pub struct TypeRegistry {
    config: RegistryConfig,
    entries: RwLock<HashMap<String, RegistryEntry>>,
}

impl TypeRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ========================================================================
    // 등록
    // ========================================================================

    /// 컨트롤 타입 로더 등록
    ///
    /// 같은 키로 다시 등록하면 기존 로더와 캐시를 대체합니다.
    pub async fn register<F, Fut>(&self, control_type: &str, loader: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<FactoryHandle>> + Send + 'static,
    {
        let loader: LoaderFn = Arc::new(move || Box::pin(loader()) as LoaderFuture);
        self.register_loader(control_type, loader).await;
    }

    /// 이미 박싱된 로더 등록
    pub async fn register_loader(&self, control_type: &str, loader: LoaderFn) {
        let mut entries = self.entries.write().await;
        let replaced = entries
            .insert(control_type.to_string(), RegistryEntry::new(loader))
            .is_some();
        if replaced {
            debug!(control_type, "registry: loader replaced, cache dropped");
        } else {
            debug!(control_type, "registry: loader registered");
        }
    }

    /// 등록 해제. 엔트리가 있었으면 true
    pub async fn unregister(&self, control_type: &str) -> bool {
        self.entries.write().await.remove(control_type).is_some()
    }

    /// 등록 여부 확인 (resolve와 같은 정규화를 거침)
    pub async fn is_registered(&self, control_type: &str) -> bool {
        let entries = self.entries.read().await;
        !normalize_key(entries.keys().map(String::as_str), control_type).is_passthrough()
    }

    /// 등록된 키 목록
    pub async fn registered_types(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    // ========================================================================
    // 해석
    // ========================================================================

    /// 컨트롤 타입을 팩토리로 해석
    ///
    /// 캐시 히트면 즉시 반환, 아니면 선형 백오프로 재시도하며 로드합니다.
    /// 시도 횟수는 호출 간 누적되어, 상한에 도달한 타입은 이후
    /// 로더 호출 없이 곧바로 None을 돌려줍니다.
    pub async fn resolve(&self, requested: &str) -> Option<FactoryHandle> {
        let matched = {
            let entries = self.entries.read().await;
            normalize_key(entries.keys().map(String::as_str), requested)
        };

        match &matched {
            KeyMatch::Passthrough(_) => {
                diag().log(
                    DiagLevel::Warn,
                    &format!("[TypeRegistry] unknown control type '{requested}'"),
                    None,
                );
                return None;
            }
            KeyMatch::CaseInsensitive(normalized) => {
                debug!(requested, normalized = %normalized, "registry: key normalized");
            }
            KeyMatch::Exact(_) => {}
        }

        self.resolve_registered(matched.key()).await
    }

    async fn resolve_registered(&self, key: &str) -> Option<FactoryHandle> {
        loop {
            // 락을 await 지점 너머로 들고 가지 않도록 상태를 복사
            let (loader, attempts) = {
                let entries = self.entries.read().await;
                let entry = entries.get(key)?;

                if let (Some(factory), Some(cached_at)) = (&entry.cached, entry.cached_at) {
                    if self.config.cache_policy.is_fresh(cached_at.elapsed()) {
                        return Some(factory.clone());
                    }
                    debug!(control_type = key, "registry: cache expired, reloading");
                }

                if entry.load_attempts >= self.config.max_load_attempts {
                    diag().log(
                        DiagLevel::Warn,
                        &format!(
                            "[TypeRegistry] '{key}' exhausted after {} load attempts",
                            entry.load_attempts
                        ),
                        None,
                    );
                    return None;
                }

                (entry.loader.clone(), entry.load_attempts)
            };

            let attempt = attempts + 1;
            let delay = self.config.delay_for_attempt(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match loader().await {
                Ok(factory) => {
                    let mut entries = self.entries.write().await;
                    // 로드 중 등록 해제되었으면 결과를 버림
                    let entry = entries.get_mut(key)?;
                    entry.record_success(factory.clone(), Instant::now());
                    debug!(
                        control_type = key,
                        label = factory.label(),
                        "registry: factory loaded"
                    );
                    return Some(factory);
                }
                Err(err) => {
                    let exhausted = {
                        let mut entries = self.entries.write().await;
                        match entries.get_mut(key) {
                            Some(entry) => {
                                entry.record_failure(err.to_string());
                                entry.load_attempts >= self.config.max_load_attempts
                            }
                            None => return None,
                        }
                    };

                    diag().log(
                        DiagLevel::Warn,
                        &format!("[TypeRegistry] load attempt {attempt} for '{key}' failed: {err}"),
                        None,
                    );

                    if exhausted {
                        diag().log(
                            DiagLevel::Error,
                            &format!("[TypeRegistry] giving up on '{key}' after {attempt} attempts"),
                            None,
                        );
                        return None;
                    }
                }
            }
        }
    }

    // ========================================================================
    // 캐시 관리
    // ========================================================================

    /// 캐시 무효화
    ///
    /// `Some(key)`는 해당 타입만, `None`은 전체를 비웁니다.
    /// 시도 횟수도 함께 리셋되어 소진된 타입이 다시 로드 가능해집니다.
    pub async fn clear_cache(&self, control_type: Option<&str>) {
        let mut entries = self.entries.write().await;
        match control_type {
            Some(key) => {
                if let Some(entry) = entries.get_mut(key) {
                    entry.clear_cache();
                }
            }
            None => {
                for entry in entries.values_mut() {
                    entry.clear_cache();
                }
            }
        }
    }

    /// 지정한 타입들을 미리 로드
    pub async fn preload(&self, control_types: &[&str]) -> PreloadResult {
        let mut result = PreloadResult::default();
        for key in control_types {
            match self.resolve(key).await {
                Some(_) => result.loaded.push((*key).to_string()),
                None => result.failed.push((*key).to_string()),
            }
        }
        result
    }

    /// 현재 상태 스냅샷
    pub async fn stats(&self) -> RegistryStats {
        let entries = self.entries.read().await;
        let mut stats = RegistryStats {
            registered: entries.len(),
            ..Default::default()
        };
        for entry in entries.values() {
            if entry.cached.is_some() {
                stats.cached += 1;
            }
            if entry.cached.is_none() && entry.load_attempts >= self.config.max_load_attempts {
                stats.exhausted += 1;
            }
        }
        stats
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
