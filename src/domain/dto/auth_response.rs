//! 인증 응답 DTO
//!
//! 자격 증명 자체는 응답 헤더/쿠키로 전달되므로 본문에는 주체 정보만 담습니다.
use serde::Serialize;
use crate::domain::entities::users::user::User;

/// 클라이언트에 노출하는 사용자 정보 (비밀번호 해시 제외)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id_string().unwrap_or_default(),
            email: user.email,
            display_name: user.display_name,
            roles: user.roles,
        }
    }
}
