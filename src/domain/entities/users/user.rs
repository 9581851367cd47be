//! User Entity Implementation
//!
//! 토큰 인증의 주체가 되는 사용자 엔티티입니다.
//! 계정 생성과 비밀번호 해싱은 이 서비스의 범위 밖이며, 이미 저장된 사용자를 조회/검증만 합니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use crate::services::auth::Authenticatable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub display_name: String,
    /// bcrypt 해시
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub roles: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    pub fn can_authenticate_with_password(&self) -> bool {
        self.is_active && self.password_hash.is_some()
    }
}

impl Authenticatable for User {
    fn auth_identifier(&self) -> String {
        self.id_string().unwrap_or_default()
    }
}
