//! 인증 요청관련 DTO
//!
//! 인증을 요청하는 사용자들의 요청 정보를 매핑합니다.
use serde::Deserialize;
use validator::Validate;

/// 로컬 로그인 요청 구조체
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,

    /// 만료되지 않는 토큰 발급 여부
    #[serde(default)]
    pub remember: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let ok: LoginRequest = serde_json::from_str(r#"{"email":"a@b.com","password":"pw"}"#).unwrap();
        assert!(ok.validate().is_ok());
        assert!(!ok.remember);

        let bad_email: LoginRequest = serde_json::from_str(r#"{"email":"nope","password":"pw"}"#).unwrap();
        assert!(bad_email.validate().is_err());

        let empty_password: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.com","password":"","remember":true}"#).unwrap();
        assert!(empty_password.validate().is_err());
        assert!(empty_password.remember);
    }
}
