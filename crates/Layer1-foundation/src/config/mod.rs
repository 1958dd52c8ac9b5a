//! 레지스트리 설정
//!
//! 캐시 정책과 재시도 한도를 명시적인 값으로 전달합니다.
//! 전역 플래그에서 모드를 추론하지 않습니다.

use std::time::Duration;

/// 개발 모드 캐시 TTL (5분)
pub const DEV_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// 로드 재시도 상한
pub const MAX_LOAD_ATTEMPTS: u32 = 3;

/// 재시도 기본 지연 (선형 백오프의 단위)
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);

/// 캐시 유효성 정책
///
/// 프로덕션에서는 로드된 아티팩트가 프로세스 수명 동안 불변이므로
/// 한 번 캐시되면 영원히 신뢰합니다. 개발 모드에서는 TTL이 지나면
/// 다음 해석 시 다시 로드합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// 캐시가 만료되지 않음 (프로덕션)
    Immortal,

    /// 지정한 기간 후 만료 (개발)
    TimeToLive(Duration),
}

impl CachePolicy {
    /// 캐시된 지 `age`가 지난 엔트리가 아직 유효한지
    pub fn is_fresh(&self, age: Duration) -> bool {
        match self {
            CachePolicy::Immortal => true,
            CachePolicy::TimeToLive(ttl) => age < *ttl,
        }
    }
}

/// 타입 레지스트리 설정
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// 캐시 정책
    pub cache_policy: CachePolicy,

    /// 타입당 로드 시도 상한
    pub max_load_attempts: u32,

    /// 선형 백오프 기본 지연 (attempt * base)
    pub retry_base_delay: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl RegistryConfig {
    /// 프로덕션 설정: 캐시 영구 신뢰
    pub fn production() -> Self {
        Self {
            cache_policy: CachePolicy::Immortal,
            max_load_attempts: MAX_LOAD_ATTEMPTS,
            retry_base_delay: RETRY_BASE_DELAY,
        }
    }

    /// 개발 설정: TTL 캐시, 빠른 반복을 위한 트레이드오프
    pub fn development() -> Self {
        Self {
            cache_policy: CachePolicy::TimeToLive(DEV_CACHE_TTL),
            ..Self::production()
        }
    }

    // 빌더
    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn with_max_load_attempts(mut self, attempts: u32) -> Self {
        self.max_load_attempts = attempts;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// 시도 횟수에 대한 백오프 지연 (1-indexed attempt)
    ///
    /// 첫 시도는 지연 없이 실행되고, n번째 재시도 전에는
    /// `base * (n - 1)` 만큼 기다립니다.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.retry_base_delay * (attempt - 1)
        }
    }
}
