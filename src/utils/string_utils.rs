//! # 문자열 유틸리티
//!
//! 자격 증명 문자열 정리와 로그용 마스킹 함수들입니다.

/// 선택적 문자열 정리
///
/// None 값이거나 빈 문자열/공백만 있는 경우 None을 반환하고,
/// 유효한 문자열인 경우 앞뒤 공백을 제거한 문자열을 반환합니다.
///
/// # 예제
/// ```rust,ignore
/// assert_eq!(clean_optional_string(Some("  abc  ".to_string())), Some("abc".to_string()));
/// assert_eq!(clean_optional_string(Some("   ".to_string())), None);
/// ```
pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// `Bearer ` 접두사가 있으면 제거합니다 (대소문자 무시).
pub fn strip_bearer_prefix(value: &str) -> &str {
    let value = value.trim();
    match value.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => value[7..].trim_start(),
        _ => value,
    }
}

/// 로그 출력을 위해 민감한 문자열을 마스킹합니다.
///
/// 앞 6글자만 남기고 나머지는 길이 정보와 함께 생략합니다.
pub fn mask_secret(value: &str) -> String {
    let visible: String = value.chars().take(6).collect();
    if visible.len() == value.len() {
        return "*".repeat(value.chars().count());
    }
    format!("{}…({} chars)", visible, value.chars().count())
}
