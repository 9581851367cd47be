//! 인메모리 토큰 저장소
//!
//! 프로세스 메모리에만 보관하므로 테스트와 로컬 개발 용도입니다.
//! MongoDB 구현과 같은 규칙(유니크 secret, compare-and-swap 갱신)을 따릅니다.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;
use crate::domain::models::token::TokenRecord;
use crate::errors::{AppError, AppResult};
use crate::repositories::tokens::{SaveOutcome, TokenStore};
use crate::utils::clock::{Clock, SystemClock};

pub struct MemoryTokenStore {
    records: RwLock<HashMap<String, TokenRecord>>,
    clock: Arc<dyn Clock>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// `delete_expired` 가 사용할 시계를 지정합니다.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// id 로 저장된 레코드를 조회합니다.
    pub fn get(&self, id: &str) -> Option<TokenRecord> {
        self.read().get(id).cloned()
    }

    /// subject 의 저장된 레코드 목록
    pub fn records_for(&self, subject_id: &str) -> Vec<TokenRecord> {
        self.read()
            .values()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, TokenRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, TokenRecord>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn find(&self, subject_id: &str, secret: &str) -> AppResult<Option<TokenRecord>> {
        Ok(self
            .read()
            .values()
            .find(|r| r.subject_id == subject_id && r.secret == secret)
            .cloned())
    }

    async fn save(&self, record: &mut TokenRecord) -> AppResult<SaveOutcome> {
        let mut records = self.write();

        let duplicate = records
            .iter()
            .any(|(id, r)| r.secret == record.secret && Some(id) != record.id.as_ref());
        if duplicate {
            return Err(AppError::ConflictError("duplicate token secret".to_string()));
        }

        match record.id.clone() {
            None => {
                let id = Uuid::new_v4().to_string();
                record.id = Some(id.clone());
                record.mark_persisted();
                records.insert(id, record.clone());
            }
            Some(id) => {
                let current_secret = records.get(&id).map(|r| r.secret.clone());
                match (current_secret, record.original_secret()) {
                    (None, _) => return Ok(SaveOutcome::Conflict),
                    (Some(current), Some(expected)) if current != expected => {
                        return Ok(SaveOutcome::Conflict);
                    }
                    _ => {}
                }
                record.mark_persisted();
                records.insert(id, record.clone());
            }
        }

        Ok(SaveOutcome::Saved)
    }

    async fn delete(&self, record: &TokenRecord) -> AppResult<bool> {
        match &record.id {
            Some(id) => Ok(self.write().remove(id).is_some()),
            None => Ok(false),
        }
    }

    async fn delete_expired(&self, threshold_seconds: u64) -> AppResult<u64> {
        // 표현할 수 없는 임계값이면 충분히 오래된 토큰이 없습니다
        let Some(cutoff) = i64::try_from(threshold_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|threshold| self.clock.now().checked_sub_signed(threshold))
        else {
            return Ok(0);
        };

        let mut records = self.write();
        let before = records.len();
        records.retain(|_, r| r.remember || r.updated_at >= cutoff);
        Ok((before - records.len()) as u64)
    }

    async fn delete_by_subject(&self, subject_id: &str) -> AppResult<u64> {
        let mut records = self.write();
        let before = records.len();
        records.retain(|_, r| r.subject_id != subject_id);
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::crypto::{AppKey, TokenCrypto};
    use crate::utils::clock::ManualClock;

    fn crypto() -> TokenCrypto {
        TokenCrypto::new(AppKey::from_bytes([5u8; 32]))
    }

    #[actix_web::test]
    async fn test_save_assigns_id_and_find_requires_exact_match() {
        let store = MemoryTokenStore::new();
        let mut record = TokenRecord::issue("user-1", false, &crypto(), Utc::now());

        assert_eq!(store.save(&mut record).await.unwrap(), SaveOutcome::Saved);
        assert!(record.exists());
        assert!(!record.changed());

        let found = store.find("user-1", &record.secret).await.unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert!(store.find("user-2", &record.secret).await.unwrap().is_none());
        assert!(store.find("user-1", "other").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_concurrent_rotation_second_writer_conflicts() {
        let crypto = crypto();
        let store = MemoryTokenStore::new();
        let mut record = TokenRecord::issue("user-1", false, &crypto, Utc::now());
        store.save(&mut record).await.unwrap();

        let mut first = store.find("user-1", &record.secret).await.unwrap().unwrap();
        let mut second = first.clone();
        first.regenerate_secret(&crypto, Utc::now());
        second.regenerate_secret(&crypto, Utc::now());

        assert_eq!(store.save(&mut first).await.unwrap(), SaveOutcome::Saved);
        assert_eq!(store.save(&mut second).await.unwrap(), SaveOutcome::Conflict);
        assert!(second.changed());

        let stored = store.get(first.id.as_deref().unwrap()).unwrap();
        assert_eq!(stored.secret, first.secret);
    }

    #[actix_web::test]
    async fn test_duplicate_secret_is_rejected() {
        let store = MemoryTokenStore::new();
        let mut a = TokenRecord::issue("user-1", false, &crypto(), Utc::now());
        let mut b = TokenRecord::issue("user-2", false, &crypto(), Utc::now());
        b.secret = a.secret.clone();

        store.save(&mut a).await.unwrap();
        assert!(matches!(store.save(&mut b).await, Err(AppError::ConflictError(_))));
    }

    #[actix_web::test]
    async fn test_delete_expired_keeps_remembered_and_fresh() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let store = MemoryTokenStore::with_clock(clock.clone());
        let crypto = crypto();

        let mut stale = TokenRecord::issue("user-1", false, &crypto, now - Duration::seconds(700));
        let mut remembered = TokenRecord::issue("user-1", true, &crypto, now - Duration::seconds(700));
        let mut fresh = TokenRecord::issue("user-2", false, &crypto, now - Duration::seconds(100));
        for record in [&mut stale, &mut remembered, &mut fresh] {
            store.save(record).await.unwrap();
        }

        assert_eq!(store.delete_expired(600).await.unwrap(), 1);
        assert!(store.get(stale.id.as_deref().unwrap()).is_none());
        assert_eq!(store.len(), 2);
    }

    #[actix_web::test]
    async fn test_delete_expired_with_unrepresentable_threshold_deletes_nothing() {
        let now = Utc::now();
        let store = MemoryTokenStore::with_clock(Arc::new(ManualClock::new(now)));
        let crypto = crypto();

        let mut stale = TokenRecord::issue("user-1", false, &crypto, now - Duration::days(3650));
        store.save(&mut stale).await.unwrap();

        assert_eq!(store.delete_expired(u64::MAX).await.unwrap(), 0);
        assert_eq!(store.delete_expired(10_000_000_000_000_000).await.unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[actix_web::test]
    async fn test_delete_and_delete_by_subject() {
        let store = MemoryTokenStore::new();
        let crypto = crypto();
        let mut a = TokenRecord::issue("user-1", false, &crypto, Utc::now());
        let mut b = TokenRecord::issue("user-1", true, &crypto, Utc::now());
        let mut c = TokenRecord::issue("user-2", false, &crypto, Utc::now());
        for record in [&mut a, &mut b, &mut c] {
            store.save(record).await.unwrap();
        }

        assert!(store.delete(&a).await.unwrap());
        assert!(!store.delete(&a).await.unwrap());
        assert_eq!(store.delete_by_subject("user-1").await.unwrap(), 1);
        assert_eq!(store.records_for("user-2").len(), 1);

        let unsaved = TokenRecord::issue("user-3", false, &crypto, Utc::now());
        assert!(!store.delete(&unsaved).await.unwrap());
    }
}
