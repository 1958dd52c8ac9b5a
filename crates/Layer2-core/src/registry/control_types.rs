//! 표준 컨트롤 타입 키
//!
//! 백엔드 메타데이터가 사용하는 camelCase 키 문자열.
//! 레지스트리 키는 임의의 문자열이지만, 기본 제공 타입은 여기 상수를 씁니다.

pub const INPUT: &str = "input";
pub const TEXTAREA: &str = "textarea";
pub const SELECT: &str = "select";
pub const MULTI_SELECT: &str = "multiSelect";
pub const SEARCHABLE_SELECT: &str = "searchableSelect";
pub const ASYNC_SELECT: &str = "asyncSelect";
pub const CHECKBOX: &str = "checkbox";
pub const RADIO: &str = "radio";
pub const TOGGLE: &str = "toggle";
pub const DATE_INPUT: &str = "dateInput";
pub const DATE_PICKER: &str = "datePicker";
pub const DATE_RANGE: &str = "dateRange";
pub const TIME_INPUT: &str = "timeInput";
pub const TIME_PICKER: &str = "timePicker";
pub const DATETIME_LOCAL_INPUT: &str = "datetimeLocalInput";
pub const MONTH_INPUT: &str = "monthInput";
pub const WEEK_INPUT: &str = "weekInput";
pub const NUMERIC_TEXT_BOX: &str = "numericTextBox";
pub const CURRENCY_INPUT: &str = "currencyInput";
pub const EMAIL_INPUT: &str = "emailInput";
pub const PASSWORD: &str = "password";
pub const PHONE: &str = "phone";
pub const SEARCH_INPUT: &str = "searchInput";
pub const URL_INPUT: &str = "urlInput";
pub const COLOR_PICKER: &str = "colorPicker";
pub const RATING: &str = "rating";
pub const SLIDER: &str = "slider";
pub const FILE_UPLOAD: &str = "fileUpload";

/// 표준 키 전체 목록
pub const ALL: &[&str] = &[
    INPUT,
    TEXTAREA,
    SELECT,
    MULTI_SELECT,
    SEARCHABLE_SELECT,
    ASYNC_SELECT,
    CHECKBOX,
    RADIO,
    TOGGLE,
    DATE_INPUT,
    DATE_PICKER,
    DATE_RANGE,
    TIME_INPUT,
    TIME_PICKER,
    DATETIME_LOCAL_INPUT,
    MONTH_INPUT,
    WEEK_INPUT,
    NUMERIC_TEXT_BOX,
    CURRENCY_INPUT,
    EMAIL_INPUT,
    PASSWORD,
    PHONE,
    SEARCH_INPUT,
    URL_INPUT,
    COLOR_PICKER,
    RATING,
    SLIDER,
    FILE_UPLOAD,
];

/// 표준 키인지 확인
pub fn is_standard(key: &str) -> bool {
    ALL.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_keys() {
        assert!(is_standard("select"));
        assert!(is_standard("numericTextBox"));
        assert!(!is_standard("hologram"));
    }

    #[test]
    fn test_no_duplicate_keys() {
        let mut sorted: Vec<_> = ALL.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ALL.len());
    }
}
