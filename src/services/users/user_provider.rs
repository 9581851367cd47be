//! MongoDB 사용자 자격 증명 공급자
//!
//! `users` 컬렉션의 [`User`]를 토큰 엔진의 주체로 제공합니다.
//!
//! ## 규칙
//!
//! - 비활성 사용자는 `retrieve_by_id`에서 찾을 수 없는 것으로 취급합니다 (기존 토큰도 무효)
//! - 비밀번호 해시가 없는 계정은 비밀번호로 인증할 수 없습니다
//! - 검증 실패 사유는 로그에만 남기고 호출자에게는 `false`만 돌려줍니다
//! - 알 수 없는 이메일, 해시 없는 계정도 더미 해시로 bcrypt 검증을 한 번 수행합니다

use std::sync::{Arc, OnceLock};
use async_trait::async_trait;
use log::{debug, error};
use crate::{
    domain::{dto::LoginRequest, entities::users::user::User},
    errors::{AppError, AppResult},
    repositories::users::UserRepository,
    services::auth::CredentialProvider,
};

pub struct MongoUserProvider {
    user_repo: Arc<UserRepository>,
}

impl MongoUserProvider {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        dummy_password_hash();
        Self { user_repo }
    }
}

/// 실패 경로용 bcrypt 해시 (프로세스당 한 번 생성)
fn dummy_password_hash() -> Option<&'static str> {
    static HASH: OnceLock<Option<String>> = OnceLock::new();

    HASH.get_or_init(|| match bcrypt::hash("dummy-password-for-timing", bcrypt::DEFAULT_COST) {
        Ok(hash) => Some(hash),
        Err(e) => {
            error!("더미 비밀번호 해시 생성 실패: {}", e);
            None
        }
    })
    .as_deref()
}

/// 결과를 버리는 bcrypt 검증을 수행해 실패 응답 시간을 실제 검증과 맞춥니다.
pub fn verify_against_dummy_hash(password: &str) {
    if let Some(hash) = dummy_password_hash() {
        let _ = bcrypt::verify(password, hash);
    }
}

/// 비밀번호를 bcrypt 해시와 비교합니다.
pub fn verify_password(user: &User, password: &str) -> bool {
    let password_hash = match user.password_hash.as_deref() {
        Some(hash) if user.can_authenticate_with_password() => hash,
        _ => {
            debug!("비밀번호 인증 불가 계정: {}", user.email);
            verify_against_dummy_hash(password);
            return false;
        }
    };

    let verify_start = std::time::Instant::now();
    let result = bcrypt::verify(password, password_hash);
    debug!("Password verification took: {:?}", verify_start.elapsed());

    match result {
        Ok(valid) => valid,
        Err(e) => {
            error!("비밀번호 해시 검증 실패 ({}): {}", user.email, e);
            false
        }
    }
}

#[async_trait]
impl CredentialProvider for MongoUserProvider {
    type Principal = User;
    type Credentials = LoginRequest;

    async fn retrieve_by_credentials(&self, credentials: &LoginRequest) -> AppResult<Option<User>> {
        let user = self.user_repo.find_by_email(&credentials.email).await?;
        if user.is_none() {
            verify_against_dummy_hash(&credentials.password);
        }
        Ok(user)
    }

    async fn retrieve_by_id(&self, id: &str) -> AppResult<Option<User>> {
        match self.user_repo.find_by_id(id).await {
            Ok(user) => Ok(user.filter(|u| u.is_active)),
            Err(AppError::ValidationError(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn validate_credentials(&self, principal: &User, credentials: &LoginRequest) -> AppResult<bool> {
        Ok(verify_password(principal, &credentials.password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{oid::ObjectId, DateTime};

    fn user(password_hash: Option<String>, is_active: bool) -> User {
        User {
            id: Some(ObjectId::new()),
            email: "alice@example.com".to_string(),
            display_name: "Alice".to_string(),
            password_hash,
            is_active,
            roles: vec!["user".to_string()],
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[test]
    fn test_verify_password() {
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        let alice = user(Some(hash), true);

        assert!(verify_password(&alice, "correct horse"));
        assert!(!verify_password(&alice, "wrong"));
    }

    #[test]
    fn test_inactive_or_hashless_user_cannot_authenticate() {
        let hash = bcrypt::hash("pw", 4).unwrap();

        assert!(!verify_password(&user(Some(hash), false), "pw"));
        assert!(!verify_password(&user(None, true), "pw"));
        assert!(!verify_password(&user(Some("not-a-bcrypt-hash".to_string()), true), "pw"));
    }

    #[test]
    fn test_dummy_hash_never_matches_login_passwords() {
        let hash = dummy_password_hash().unwrap();

        assert!(hash.starts_with("$2"));
        assert!(!bcrypt::verify("pw", hash).unwrap());
        assert!(!bcrypt::verify("", hash).unwrap());
        verify_against_dummy_hash("pw");
    }

    #[test]
    fn test_hashless_user_pays_for_a_bcrypt_check() {
        let elapsed = |password_hash: Option<String>| {
            let started = std::time::Instant::now();
            assert!(!verify_password(&user(password_hash, true), "pw"));
            started.elapsed()
        };
        dummy_password_hash();

        let real = bcrypt::hash("other", bcrypt::DEFAULT_COST).unwrap();
        let with_hash = elapsed(Some(real));
        let without_hash = elapsed(None);

        assert!(without_hash * 4 > with_hash, "{:?} vs {:?}", without_hash, with_hash);
    }
}
