//! # 사용자 리포지토리 구현
//!
//! 토큰 인증의 주체인 사용자를 MongoDB `users` 컬렉션에서 조회합니다.
//! 계정 생성/수정은 이 서비스의 범위 밖이므로 조회와 인덱스 관리만 제공합니다.

use std::sync::Arc;
use mongodb::{bson::{doc, oid::ObjectId}, options::IndexOptions, Collection, IndexModel};
use crate::{
    db::Database,
    domain::entities::users::user::User,
    errors::AppError,
};

/// 사용자 컬렉션 이름
pub const USER_COLLECTION: &str = "users";

/// 사용자 데이터 액세스 리포지토리
///
/// ## 에러 처리
///
/// - **DatabaseError**: MongoDB 연결 오류, 쿼리 실행 오류
/// - **ValidationError**: 잘못된 ObjectId 형식
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<User> {
        self.db.collection::<User>(USER_COLLECTION)
    }

    /// 이메일 주소로 사용자 조회
    ///
    /// * `Ok(Some(User))` - 사용자를 찾은 경우
    /// * `Ok(None)` - 해당 이메일의 사용자가 없는 경우
    /// * `Err(AppError)` - 데이터베이스 오류
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.collection()
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// ID로 사용자 조회
    ///
    /// `id`는 ObjectId 16진수 문자열이어야 하며, 아니면 `ValidationError`를 반환합니다.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        self.collection()
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 컬렉션 인덱스 생성
    ///
    /// 이미 중복 이메일이 있으면 유니크 인덱스 생성이 실패합니다.
    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("email_unique".to_string())
                .build())
            .build();

        self.collection()
            .create_indexes([email_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        log::debug!("{} 인덱스 생성 완료", USER_COLLECTION);
        Ok(())
    }
}
