//! # MongoDB 토큰 리포지토리
//!
//! `user_tokens` 컬렉션에 토큰 레코드를 저장합니다.
//!
//! ## 스키마
//!
//! | 필드 | 타입 | 비고 |
//! |------|------|------|
//! | `_id` | ObjectId | 저장소가 부여 |
//! | `auth_identifier` | String | 인증 주체 식별자 |
//! | `token` | String | secret, 유니크 |
//! | `remember` | bool | |
//! | `created_at` | DateTime | |
//! | `updated_at` | DateTime | 만료/갱신 기준 |
//!
//! ## 인덱스
//!
//! - `token_unique`: `token` 유니크
//! - `auth_identifier_token`: 조회 경로 (`auth_identifier`, `token`)
//! - `updated_at_asc`: 만료 정리 작업

use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use mongodb::{
    bson::{self, doc, oid::ObjectId},
    options::IndexOptions,
    Collection, IndexModel,
};
use serde::{Deserialize, Serialize};
use crate::db::Database;
use crate::domain::models::token::TokenRecord;
use crate::errors::{AppError, AppResult};
use crate::repositories::tokens::{SaveOutcome, TokenStore};
use crate::utils::clock::{Clock, SystemClock};

/// 토큰 컬렉션 이름
pub const TOKEN_COLLECTION: &str = "user_tokens";

/// `user_tokens` 컬렉션 문서
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub auth_identifier: String,
    pub token: String,
    #[serde(default)]
    pub remember: bool,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl TokenDocument {
    fn from_record(record: &TokenRecord) -> Self {
        Self {
            id: None,
            auth_identifier: record.subject_id.clone(),
            token: record.secret.clone(),
            remember: record.remember,
            created_at: to_bson_datetime(record.created_at),
            updated_at: to_bson_datetime(record.updated_at),
        }
    }

    fn into_record(self) -> TokenRecord {
        TokenRecord::from_storage(
            self.id.map(|id| id.to_hex()).unwrap_or_default(),
            self.auth_identifier,
            self.token,
            self.remember,
            from_bson_datetime(self.created_at),
            from_bson_datetime(self.updated_at),
        )
    }
}

fn to_bson_datetime(value: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(value.timestamp_millis())
}

fn from_bson_datetime(value: bson::DateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

fn parse_object_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id)
        .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))
}

/// MongoDB 기반 [`TokenStore`]
///
/// 갱신은 `{_id, token: <마지막으로 읽은 secret>}` 조건의 `update_one` 으로 수행하며
/// 일치하는 문서가 없으면 [`SaveOutcome::Conflict`]를 반환합니다.
pub struct MongoTokenRepository {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl MongoTokenRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    fn collection(&self) -> Collection<TokenDocument> {
        self.db.collection::<TokenDocument>(TOKEN_COLLECTION)
    }

    /// 컬렉션 인덱스를 생성합니다. 서버 시작 시 한 번 호출합니다.
    ///
    /// 이미 중복된 `token` 값이 있으면 유니크 인덱스 생성이 실패합니다.
    pub async fn create_indexes(&self) -> AppResult<()> {
        let token_index = IndexModel::builder()
            .keys(doc! { "token": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("token_unique".to_string())
                .build())
            .build();

        let lookup_index = IndexModel::builder()
            .keys(doc! { "auth_identifier": 1, "token": 1 })
            .options(IndexOptions::builder()
                .name("auth_identifier_token".to_string())
                .build())
            .build();

        let updated_at_index = IndexModel::builder()
            .keys(doc! { "updated_at": 1 })
            .options(IndexOptions::builder()
                .name("updated_at_asc".to_string())
                .build())
            .build();

        self.collection()
            .create_indexes([token_index, lookup_index, updated_at_index])
            .await?;

        debug!("{} 인덱스 생성 완료", TOKEN_COLLECTION);
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MongoTokenRepository {
    async fn find(&self, subject_id: &str, secret: &str) -> AppResult<Option<TokenRecord>> {
        let document = self.collection()
            .find_one(doc! { "auth_identifier": subject_id, "token": secret })
            .await?;

        Ok(document.map(TokenDocument::into_record))
    }

    async fn save(&self, record: &mut TokenRecord) -> AppResult<SaveOutcome> {
        match record.id.clone() {
            None => {
                let result = self.collection()
                    .insert_one(TokenDocument::from_record(record))
                    .await?;

                let id = result.inserted_id
                    .as_object_id()
                    .ok_or_else(|| AppError::DatabaseError("삽입된 문서의 ID가 ObjectId가 아닙니다".to_string()))?;

                record.id = Some(id.to_hex());
                record.mark_persisted();
                Ok(SaveOutcome::Saved)
            }
            Some(id) => {
                let object_id = parse_object_id(&id)?;
                let filter = match record.original_secret() {
                    Some(expected) => doc! { "_id": object_id, "token": expected },
                    None => doc! { "_id": object_id },
                };
                let update = doc! {
                    "$set": {
                        "token": &record.secret,
                        "remember": record.remember,
                        "updated_at": to_bson_datetime(record.updated_at),
                    }
                };

                let result = self.collection().update_one(filter, update).await?;
                if result.matched_count == 0 {
                    return Ok(SaveOutcome::Conflict);
                }

                record.mark_persisted();
                Ok(SaveOutcome::Saved)
            }
        }
    }

    async fn delete(&self, record: &TokenRecord) -> AppResult<bool> {
        let Some(id) = record.id.as_deref() else {
            return Ok(false);
        };

        let result = self.collection()
            .delete_one(doc! { "_id": parse_object_id(id)? })
            .await?;

        Ok(result.deleted_count > 0)
    }

    async fn delete_expired(&self, threshold_seconds: u64) -> AppResult<u64> {
        let Some(cutoff) = i64::try_from(threshold_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|threshold| self.clock.now().checked_sub_signed(threshold))
        else {
            return Ok(0);
        };

        let result = self.collection()
            .delete_many(doc! {
                "remember": false,
                "updated_at": { "$lt": to_bson_datetime(cutoff) },
            })
            .await?;

        Ok(result.deleted_count)
    }

    async fn delete_by_subject(&self, subject_id: &str) -> AppResult<u64> {
        let result = self.collection()
            .delete_many(doc! { "auth_identifier": subject_id })
            .await?;

        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{AppKey, TokenCrypto};

    #[test]
    fn test_document_round_trip_marks_record_unchanged() {
        let crypto = TokenCrypto::new(AppKey::from_bytes([9u8; 32]));
        let now = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).unwrap();
        let record = TokenRecord::issue("64b7f0c2a1b2c3d4e5f60718", true, &crypto, now);

        let mut document = TokenDocument::from_record(&record);
        assert_eq!(document.token, record.secret);
        assert_eq!(document.auth_identifier, record.subject_id);

        let oid = ObjectId::new();
        document.id = Some(oid);
        let restored = document.into_record();

        assert_eq!(restored.id.as_deref(), Some(oid.to_hex().as_str()));
        assert_eq!(restored.updated_at, now);
        assert!(restored.remember);
        assert!(!restored.changed());
    }

    #[test]
    fn test_document_uses_storage_field_names() {
        let crypto = TokenCrypto::new(AppKey::from_bytes([9u8; 32]));
        let record = TokenRecord::issue("user-1", false, &crypto, Utc::now());
        let bson_doc = bson::to_document(&TokenDocument::from_record(&record)).unwrap();

        assert!(bson_doc.contains_key("auth_identifier"));
        assert!(bson_doc.contains_key("token"));
        assert!(!bson_doc.contains_key("_id"));
    }

    #[test]
    fn test_invalid_object_id_is_validation_error() {
        assert!(matches!(parse_object_id("not-an-id"), Err(AppError::ValidationError(_))));
    }
}
