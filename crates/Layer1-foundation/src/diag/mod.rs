//! Diagnostics logger with prefix filtering and repetition throttling
//!
//! Render pipelines tend to log the same degradation over and over (one
//! warning per field, per pass). This logger keeps the console usable:
//! messages carry a `[Prefix]` convention, prefixes can be enabled or
//! silenced at runtime, and consecutive repeats of the same message are
//! dropped past a threshold. Output is delegated to `tracing`.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, error, info, trace, warn};

/// Log severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct DiagConfig {
    /// Minimum level that gets emitted
    pub level: DiagLevel,

    /// If non-empty, only messages with one of these prefixes are emitted
    pub enabled_prefixes: Vec<String>,

    /// Prefixes that are always dropped
    pub silenced_prefixes: Vec<String>,

    /// Whether consecutive repeats are throttled
    pub throttle_repetitive: bool,

    /// Number of identical consecutive messages allowed before dropping
    pub repetitive_threshold: u32,
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            level: DiagLevel::Info,
            enabled_prefixes: Vec::new(),
            silenced_prefixes: Vec::new(),
            throttle_repetitive: true,
            repetitive_threshold: 3,
        }
    }
}

/// Diagnostics logger
pub struct DiagLogger {
    config: Mutex<DiagConfig>,
    repetitive: Mutex<HashMap<String, u32>>,
}

impl DiagLogger {
    pub fn new() -> Self {
        Self::with_config(DiagConfig::default())
    }

    pub fn with_config(config: DiagConfig) -> Self {
        Self {
            config: Mutex::new(config),
            repetitive: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the configuration at runtime
    pub fn configure(&self, config: DiagConfig) {
        *self.config.lock() = config;
    }

    /// Enable a prefix explicitly (and drop it from the silenced list)
    pub fn enable_prefix(&self, prefix: &str) {
        let mut config = self.config.lock();
        if !config.enabled_prefixes.iter().any(|p| p == prefix) {
            config.enabled_prefixes.push(prefix.to_string());
        }
        config.silenced_prefixes.retain(|p| p != prefix);
    }

    /// Silence a prefix (and drop it from the enabled list)
    pub fn silence_prefix(&self, prefix: &str) {
        let mut config = self.config.lock();
        if !config.silenced_prefixes.iter().any(|p| p == prefix) {
            config.silenced_prefixes.push(prefix.to_string());
        }
        config.enabled_prefixes.retain(|p| p != prefix);
    }

    /// Log a message, honoring level, prefix filters, and throttling
    pub fn log(&self, level: DiagLevel, message: &str, data: Option<&serde_json::Value>) {
        if !self.should_log(level, message) {
            return;
        }

        if self.is_throttled(message) {
            return;
        }

        match (level, data) {
            (DiagLevel::Error, Some(d)) => error!(data = %d, "{}", message),
            (DiagLevel::Error, None) => error!("{}", message),
            (DiagLevel::Warn, Some(d)) => warn!(data = %d, "{}", message),
            (DiagLevel::Warn, None) => warn!("{}", message),
            (DiagLevel::Info, Some(d)) => info!(data = %d, "{}", message),
            (DiagLevel::Info, None) => info!("{}", message),
            (DiagLevel::Debug, Some(d)) => debug!(data = %d, "{}", message),
            (DiagLevel::Debug, None) => debug!("{}", message),
            (DiagLevel::Trace, Some(d)) => trace!(data = %d, "{}", message),
            (DiagLevel::Trace, None) => trace!("{}", message),
        }
    }

    // Shortcuts
    pub fn error(&self, message: &str) {
        self.log(DiagLevel::Error, message, None);
    }

    pub fn warn(&self, message: &str) {
        self.log(DiagLevel::Warn, message, None);
    }

    pub fn info(&self, message: &str) {
        self.log(DiagLevel::Info, message, None);
    }

    pub fn debug(&self, message: &str) {
        self.log(DiagLevel::Debug, message, None);
    }

    /// Reset repetition counters (useful between renders and in tests)
    pub fn clear_repetitive_counters(&self) {
        self.repetitive.lock().clear();
    }

    /// Whether the message would currently be emitted (filters only,
    /// throttling not counted)
    pub fn would_log(&self, level: DiagLevel, message: &str) -> bool {
        self.should_log(level, message)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn should_log(&self, level: DiagLevel, message: &str) -> bool {
        let config = self.config.lock();

        if level > config.level {
            return false;
        }

        let prefix = extract_prefix(message);

        if let Some(prefix) = prefix {
            if config
                .silenced_prefixes
                .iter()
                .any(|p| prefix.contains(p.as_str()))
            {
                return false;
            }

            if !config.enabled_prefixes.is_empty() {
                return config
                    .enabled_prefixes
                    .iter()
                    .any(|p| prefix.contains(p.as_str()));
            }

            return true;
        }

        // Unprefixed messages pass unless an explicit allow-list is active
        config.enabled_prefixes.is_empty()
    }

    fn is_throttled(&self, message: &str) -> bool {
        let config = self.config.lock();
        if !config.throttle_repetitive {
            return false;
        }
        let threshold = config.repetitive_threshold;
        drop(config);

        let mut counters = self.repetitive.lock();
        let count = counters.entry(message.to_string()).or_insert(0);
        *count += 1;
        *count > threshold
    }
}

impl Default for DiagLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the `[Prefix]` at the start of a message, if any
fn extract_prefix(message: &str) -> Option<&str> {
    let rest = message.strip_prefix('[')?;
    let end = rest.find(']')?;
    Some(&rest[..end])
}

// ============================================================================
// Process-wide logger
// ============================================================================

static GLOBAL_DIAG: OnceLock<DiagLogger> = OnceLock::new();

/// Process-wide diagnostics logger
pub fn diag() -> &'static DiagLogger {
    GLOBAL_DIAG.get_or_init(DiagLogger::new)
}
