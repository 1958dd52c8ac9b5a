//! Error types for Formwork
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Formwork 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 검증 관련
    // ========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate field names are not allowed: {0}")]
    DuplicateFields(String),

    // ========================================================================
    // Registry 관련
    // ========================================================================
    #[error("Load failed for control type '{control_type}': {message}")]
    Load {
        control_type: String,
        message: String,
    },

    // ========================================================================
    // Render 관련
    // ========================================================================
    #[error("Instantiation failed for field '{field}': {message}")]
    Instantiation { field: String, message: String },

    #[error("View host error: {0}")]
    ViewHost(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 배치 전체를 중단시키는 에러인지 확인
    ///
    /// Validation과 Instantiation은 호출자에게 전파되고,
    /// Load는 레지스트리 내부에서 재시도 후 경고로 강등됩니다.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::DuplicateFields(_)
                | Error::Instantiation { .. }
                | Error::ViewHost(_)
        )
    }

    /// Load 에러 생성 헬퍼
    pub fn load(control_type: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Load {
            control_type: control_type.into(),
            message: message.into(),
        }
    }

    /// Instantiation 에러 생성 헬퍼
    pub fn instantiation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Instantiation {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
