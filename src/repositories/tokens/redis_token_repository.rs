//! Redis 토큰 리포지토리
//!
//! 레코드 하나를 `user_token:{subject}:{secret}` 키의 JSON 문자열로 저장합니다.
//! subject 부분은 base64url 로 인코딩하여 `:` 나 glob 문자가 키 패턴을 깨뜨리지 않게 합니다.
//!
//! secret 교체는 Lua 스크립트로 (이전 키 존재 확인 → 삭제 → 새 키 저장)을 원자적으로 수행합니다.
//! 이전 키가 없으면 다른 요청이 먼저 교체한 것으로 보고 [`SaveOutcome::Conflict`]를 반환합니다.

use std::sync::Arc;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Duration;
use log::warn;
use redis::Script;
use uuid::Uuid;
use crate::caching::redis::RedisClient;
use crate::domain::models::token::TokenRecord;
use crate::errors::{AppError, AppResult};
use crate::repositories::tokens::{SaveOutcome, TokenStore};
use crate::utils::clock::{Clock, SystemClock};

const KEY_PREFIX: &str = "user_token";

/// KEYS[1] = 이전 키, KEYS[2] = 새 키, ARGV[1] = 레코드 JSON
///
/// 반환값: 1 교체됨, 0 이전 키 없음, -1 새 키가 이미 존재
const ROTATE_SCRIPT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
if redis.call('EXISTS', KEYS[2]) == 1 then
    return -1
end
redis.call('DEL', KEYS[1])
redis.call('SET', KEYS[2], ARGV[1])
return 1
";

pub struct RedisTokenRepository {
    redis: Arc<RedisClient>,
    clock: Arc<dyn Clock>,
}

impl RedisTokenRepository {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self::with_clock(redis, Arc::new(SystemClock))
    }

    pub fn with_clock(redis: Arc<RedisClient>, clock: Arc<dyn Clock>) -> Self {
        Self { redis, clock }
    }

    fn to_json(record: &TokenRecord) -> AppResult<String> {
        serde_json::to_string(record)
            .map_err(|e| AppError::InternalError(format!("토큰 직렬화 실패: {}", e)))
    }
}

fn subject_segment(subject_id: &str) -> String {
    URL_SAFE_NO_PAD.encode(subject_id.as_bytes())
}

fn token_key(subject_id: &str, secret: &str) -> String {
    format!("{}:{}:{}", KEY_PREFIX, subject_segment(subject_id), secret)
}

fn subject_pattern(subject_id: &str) -> String {
    format!("{}:{}:*", KEY_PREFIX, subject_segment(subject_id))
}

fn parse_record(json: &str) -> Option<TokenRecord> {
    let mut record: TokenRecord = serde_json::from_str(json).ok()?;
    record.mark_persisted();
    Some(record)
}

#[async_trait]
impl TokenStore for RedisTokenRepository {
    async fn find(&self, subject_id: &str, secret: &str) -> AppResult<Option<TokenRecord>> {
        let Some(json) = self.redis.get_string(&token_key(subject_id, secret)).await? else {
            return Ok(None);
        };

        let record = parse_record(&json);
        if record.is_none() {
            warn!("손상된 토큰 레코드를 무시합니다: subject={}", subject_id);
        }
        Ok(record.filter(|r| r.subject_id == subject_id && r.secret == secret))
    }

    async fn save(&self, record: &mut TokenRecord) -> AppResult<SaveOutcome> {
        let new_key = token_key(&record.subject_id, &record.secret);

        match (record.id.is_some(), record.original_secret().map(str::to_string)) {
            (false, _) => {
                record.id = Some(Uuid::new_v4().to_string());
                let json = Self::to_json(record)?;
                if !self.redis.set_string_nx(&new_key, &json).await? {
                    record.id = None;
                    return Err(AppError::ConflictError("duplicate token secret".to_string()));
                }
            }
            (true, Some(original)) if original != record.secret => {
                let old_key = token_key(&record.subject_id, &original);
                let json = Self::to_json(record)?;
                let mut conn = self.redis.connection().await?;
                let result: i64 = Script::new(ROTATE_SCRIPT)
                    .key(&old_key)
                    .key(&new_key)
                    .arg(&json)
                    .invoke_async(&mut conn)
                    .await?;

                match result {
                    1 => {}
                    0 => return Ok(SaveOutcome::Conflict),
                    _ => return Err(AppError::ConflictError("duplicate token secret".to_string())),
                }
            }
            (true, _) => {
                let json = Self::to_json(record)?;
                self.redis.set_string(&new_key, &json).await?;
            }
        }

        record.mark_persisted();
        Ok(SaveOutcome::Saved)
    }

    async fn delete(&self, record: &TokenRecord) -> AppResult<bool> {
        let secret = record.original_secret().unwrap_or(record.secret.as_str());
        let deleted = self.redis.del(&token_key(&record.subject_id, secret)).await?;
        Ok(deleted > 0)
    }

    async fn delete_expired(&self, threshold_seconds: u64) -> AppResult<u64> {
        let Some(cutoff) = i64::try_from(threshold_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|threshold| self.clock.now().checked_sub_signed(threshold))
        else {
            return Ok(0);
        };

        let keys = self.redis.keys(&format!("{}:*", KEY_PREFIX)).await?;
        let mut expired = Vec::new();

        for key in keys {
            if let Some(json) = self.redis.get_string(&key).await? {
                if let Some(record) = parse_record(&json) {
                    if !record.remember && record.updated_at < cutoff {
                        expired.push(key);
                    }
                }
            }
        }

        Ok(self.redis.del_multiple(&expired).await?)
    }

    async fn delete_by_subject(&self, subject_id: &str) -> AppResult<u64> {
        let keys = self.redis.keys(&subject_pattern(subject_id)).await?;
        Ok(self.redis.del_multiple(&keys).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::crypto::{AppKey, TokenCrypto};

    #[test]
    fn test_key_layout_escapes_subject() {
        let key = token_key("a:b*", "ff00");
        assert!(key.starts_with("user_token:"));
        assert!(key.ends_with(":ff00"));
        assert_eq!(key.matches(':').count(), 2);
        assert!(!key.contains('*'));

        // "a" 의 패턴이 "a:b" 의 키와 겹치지 않음
        let pattern = subject_pattern("a");
        let other = token_key("a:b", "ff00");
        assert!(!other.starts_with(pattern.trim_end_matches('*')));
    }

    #[test]
    fn test_parsed_record_is_unchanged() {
        let crypto = TokenCrypto::new(AppKey::from_bytes([4u8; 32]));
        let mut record = TokenRecord::issue("user-1", false, &crypto, Utc::now());
        record.id = Some("id-1".to_string());

        let json = serde_json::to_string(&record).unwrap();
        let parsed = parse_record(&json).unwrap();

        assert_eq!(parsed.secret, record.secret);
        assert_eq!(parsed.original_secret(), Some(record.secret.as_str()));
        assert!(!parsed.changed());
        assert!(parse_record("{not json").is_none());
    }
}
