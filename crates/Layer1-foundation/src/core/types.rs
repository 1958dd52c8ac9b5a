//! 공유 타입 정의 - 필드 디스크립터 및 핸들

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 필드 디스크립터
///
/// 렌더링할 하나의 필드에 대한 선언적 명세. 호출자가 소유하며
/// 렌더링 파이프라인은 읽기만 합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldDescriptor {
    /// 필드 이름 (배치 내 고유)
    pub name: String,

    /// 컨트롤 타입 키 (예: "select", "datePicker", "currencyInput")
    #[serde(rename = "controlType")]
    pub control_type: String,

    /// 불투명한 메타데이터 (라벨, 플레이스홀더, 검증 옵션 등)
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, control_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control_type: control_type.into(),
            metadata: HashMap::new(),
        }
    }

    /// JSON 값에서 디스크립터 파싱 (백엔드 메타데이터 경계)
    pub fn from_json(value: serde_json::Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// JSON 배열에서 디스크립터 배치 파싱
    pub fn batch_from_json(value: serde_json::Value) -> crate::Result<Vec<Self>> {
        Ok(serde_json::from_value(value)?)
    }

    // 빌더
    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// 메타데이터 조회
    pub fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    /// 디스크립터 자체 검증 (이름/타입 비어있는지)
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("field descriptor is missing a 'name'".to_string());
        }
        if self.control_type.trim().is_empty() {
            return Err(format!(
                "field '{}' is missing a 'controlType'",
                self.name
            ));
        }
        Ok(())
    }
}

/// 렌더링된 인스턴스
///
/// 디스크립터, 인스턴스화된 뷰, 바인딩된 폼 슬롯의 라이브 페어링.
/// 오케스트레이터가 단독 소유하며, 커밋 알림에는 복제본이 실립니다.
#[derive(Clone)]
pub struct RenderedInstance {
    /// 필드 이름
    pub name: String,

    /// 해석에 사용된 컨트롤 타입
    pub control_type: String,

    /// 원본 디스크립터
    pub descriptor: FieldDescriptor,

    /// 라이브 뷰 핸들
    pub view: super::traits::ViewHandle,

    /// 바인딩된 슬롯 (폼 모델에 없으면 None)
    pub slot: Option<super::traits::SlotHandle>,
}

impl std::fmt::Debug for RenderedInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedInstance")
            .field("name", &self.name)
            .field("control_type", &self.control_type)
            .field("bound", &self.slot.is_some())
            .finish()
    }
}
