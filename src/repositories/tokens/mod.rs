//! 토큰 레코드 저장소 모듈
//!
//! 엔진은 [`TokenStore`] trait 을 통해서만 저장소에 접근합니다.
//! 세 가지 구현을 제공합니다.
//!
//! # Features
//!
//! - **MongoDB**: `user_tokens` 컬렉션, `token` 유니크 인덱스 ([`MongoTokenRepository`])
//! - **Redis**: `user_token:{subject}:{secret}` 키의 JSON 레코드 ([`RedisTokenRepository`])
//! - **In-memory**: 테스트와 개발용 ([`MemoryTokenStore`])
//!
//! # 동시성
//!
//! `save`는 (id, 마지막으로 읽은 secret) 조건의 compare-and-swap 으로 갱신합니다.
//! 같은 토큰을 동시에 갱신한 두 요청 중 늦은 쪽은 덮어쓰지 않고 [`SaveOutcome::Conflict`]를 받습니다.
//!
//! # Usage
//!
//! ```rust,ignore
//! let store: Arc<dyn TokenStore> = Arc::new(MongoTokenRepository::new(database));
//! let record = store.find("user-id", "secret").await?;
//! ```

pub mod memory_token_repository;
pub mod mongo_token_repository;
pub mod redis_token_repository;

pub use memory_token_repository::*;
pub use mongo_token_repository::*;
pub use redis_token_repository::*;

use async_trait::async_trait;
use crate::domain::models::token::TokenRecord;
use crate::errors::AppResult;

/// `save` 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// 저장됨
    Saved,
    /// 다른 요청이 먼저 secret 을 교체함 (저장하지 않음)
    Conflict,
}

/// 토큰 레코드 영속화 인터페이스
///
/// 모든 에러는 저장소 장애이며 호출자에게 그대로 전파됩니다.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// subject id 와 secret 이 모두 일치하는 레코드를 찾습니다.
    async fn find(&self, subject_id: &str, secret: &str) -> AppResult<Option<TokenRecord>>;

    /// 레코드를 저장합니다.
    ///
    /// - id 가 없으면 삽입하고 저장소가 id 를 부여합니다.
    /// - id 가 있으면 마지막으로 읽은 secret 을 조건으로 갱신합니다.
    ///
    /// 성공하면 레코드는 `mark_persisted` 상태가 됩니다.
    async fn save(&self, record: &mut TokenRecord) -> AppResult<SaveOutcome>;

    /// 레코드를 삭제합니다. 삭제된 것이 있으면 true.
    async fn delete(&self, record: &TokenRecord) -> AppResult<bool>;

    /// `threshold_seconds` 보다 오래 사용되지 않은 비-remember 레코드를 삭제합니다.
    async fn delete_expired(&self, threshold_seconds: u64) -> AppResult<u64>;

    /// 해당 subject 의 모든 레코드를 삭제합니다.
    async fn delete_by_subject(&self, subject_id: &str) -> AppResult<u64>;
}
