//! 발급된 세션 토큰 레코드
//!
//! 레코드 하나가 발급된 토큰 하나입니다. secret 교체(refresh)는 같은 레코드를
//! 제자리에서 갱신하며 새 레코드를 만들지 않습니다.
//!
//! ## 생명주기
//!
//! ```text
//! issue() ──▶ (응답 시 save) ──▶ find() ──▶ regenerate_secret() ──▶ (응답 시 save)
//!                                   │
//!                                   └──▶ 만료 / 로그아웃 / 정리 작업 ──▶ delete
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::config::TokenLifetime;
use crate::crypto::TokenCrypto;

/// 저장소에 영속화되는 토큰 레코드
///
/// 직렬화 필드 이름은 저장소 스키마(`auth_identifier`, `token`)를 따릅니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// 저장소가 생성 시 부여하는 식별자
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 인증 주체 식별자
    #[serde(rename = "auth_identifier")]
    pub subject_id: String,
    /// 서버가 생성한 불투명 secret
    #[serde(rename = "token")]
    pub secret: String,
    /// true 이면 시간 기반 만료 대상에서 제외
    pub remember: bool,
    pub created_at: DateTime<Utc>,
    /// 만료/갱신 계산의 기준 시각
    pub updated_at: DateTime<Utc>,
    /// 저장소에서 마지막으로 읽은(또는 저장한) secret
    #[serde(skip)]
    original_secret: Option<String>,
}

impl TokenRecord {
    /// 새 토큰 레코드를 발급합니다.
    ///
    /// 저장소에 쓰기 전까지는 I/O가 발생하지 않습니다.
    pub fn issue(subject_id: impl Into<String>, remember: bool, crypto: &TokenCrypto, now: DateTime<Utc>) -> Self {
        let subject_id = subject_id.into();
        let secret = crypto.generate_secret(&subject_id);

        Self {
            id: None,
            subject_id,
            secret,
            remember,
            created_at: now,
            updated_at: now,
            original_secret: None,
        }
    }

    /// 저장소에서 읽은 값으로 레코드를 복원합니다. 복원된 레코드는 변경되지 않은 상태입니다.
    pub fn from_storage(
        id: String,
        subject_id: String,
        secret: String,
        remember: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            subject_id,
            original_secret: Some(secret.clone()),
            secret,
            remember,
            created_at,
            updated_at,
        }
    }

    /// secret을 새 값으로 교체하고 `updated_at`을 갱신합니다.
    pub fn regenerate_secret(&mut self, crypto: &TokenCrypto, now: DateTime<Utc>) {
        let mut secret = crypto.generate_secret(&self.subject_id);
        while secret == self.secret {
            secret = crypto.generate_secret(&self.subject_id);
        }
        self.secret = secret;
        self.updated_at = now;
    }

    /// `updated_at` 이후 경과 시간 (초)
    pub fn age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.updated_at).num_seconds()
    }

    /// remember 토큰은 만료되지 않으며, 그 외에는 경과 시간이 `expired`를 넘으면 만료입니다.
    pub fn is_expired(&self, lifetime: &TokenLifetime, now: DateTime<Utc>) -> bool {
        if self.remember {
            return false;
        }
        self.age_seconds(now) > seconds_as_i64(lifetime.expired)
    }

    /// 경과 시간이 `refresh`를 넘으면 secret 교체 대상입니다 (remember 여부와 무관).
    pub fn needs_refresh(&self, lifetime: &TokenLifetime, now: DateTime<Utc>) -> bool {
        self.age_seconds(now) > seconds_as_i64(lifetime.refresh)
    }

    /// secret이 마지막으로 읽은 값과 다른지 확인합니다. 새로 발급된 레코드는 항상 true 입니다.
    pub fn changed(&self) -> bool {
        self.original_secret.as_deref() != Some(self.secret.as_str())
    }

    /// 저장소에 한 번이라도 저장되었는지 확인
    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    /// 저장소가 마지막으로 알고 있는 secret (compare-and-swap 조건으로 사용)
    pub fn original_secret(&self) -> Option<&str> {
        self.original_secret.as_deref()
    }

    /// 저장이 끝난 뒤 현재 secret을 기준값으로 삼습니다.
    pub fn mark_persisted(&mut self) {
        self.original_secret = Some(self.secret.clone());
    }

    /// 클라이언트에게 보낼 자격 증명 봉투를 만듭니다.
    pub fn encode_credential(&self, crypto: &TokenCrypto) -> Option<String> {
        crypto.encode(&self.subject_id, &self.secret)
    }
}

fn seconds_as_i64(seconds: u64) -> i64 {
    i64::try_from(seconds).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::crypto::AppKey;

    fn crypto() -> TokenCrypto {
        TokenCrypto::new(AppKey::from_bytes([3u8; 32]))
    }

    fn lifetime() -> TokenLifetime {
        TokenLifetime { expired: 604800, refresh: 3600 }
    }

    #[test]
    fn test_issue_is_unpersisted_and_changed() {
        let now = Utc::now();
        let record = TokenRecord::issue("user-1", false, &crypto(), now);

        assert!(!record.exists());
        assert!(record.changed());
        assert_eq!(record.updated_at, now);
        assert_eq!(record.secret.len(), 64);
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let mut record = TokenRecord::issue("user-1", false, &crypto(), now);

        record.updated_at = now - Duration::seconds(604800);
        assert!(!record.is_expired(&lifetime(), now));

        record.updated_at = now - Duration::seconds(604801);
        assert!(record.is_expired(&lifetime(), now));
    }

    #[test]
    fn test_remember_never_expires() {
        let now = Utc::now();
        let mut record = TokenRecord::issue("user-1", true, &crypto(), now);
        record.updated_at = now - Duration::days(3650);

        assert!(!record.is_expired(&lifetime(), now));
        // 갱신 정책은 remember 여부와 무관
        assert!(record.needs_refresh(&lifetime(), now));
    }

    #[test]
    fn test_needs_refresh_boundary() {
        let now = Utc::now();
        let mut record = TokenRecord::issue("user-1", false, &crypto(), now);

        record.updated_at = now - Duration::seconds(1800);
        assert!(!record.needs_refresh(&lifetime(), now));

        record.updated_at = now - Duration::seconds(3601);
        assert!(record.needs_refresh(&lifetime(), now));
    }

    #[test]
    fn test_regenerate_marks_changed() {
        let crypto = crypto();
        let now = Utc::now();
        let mut record = TokenRecord::from_storage(
            "id-1".to_string(),
            "user-1".to_string(),
            "old-secret".to_string(),
            false,
            now - Duration::hours(2),
            now - Duration::hours(2),
        );
        assert!(!record.changed());

        record.regenerate_secret(&crypto, now);
        assert!(record.changed());
        assert_ne!(record.secret, "old-secret");
        assert_eq!(record.original_secret(), Some("old-secret"));
        assert_eq!(record.updated_at, now);

        record.mark_persisted();
        assert!(!record.changed());
    }

    #[test]
    fn test_encode_credential_roundtrip() {
        let crypto = crypto();
        let record = TokenRecord::issue("user-1", false, &crypto, Utc::now());
        let raw = record.encode_credential(&crypto).unwrap();

        let payload = crypto.decode(&raw).unwrap();
        assert_eq!(payload.auth_identifier, record.subject_id);
        assert_eq!(payload.token, record.secret);
    }

    #[test]
    fn test_encode_credential_requires_subject_and_secret() {
        let crypto = crypto();
        let mut record = TokenRecord::issue("user-1", false, &crypto, Utc::now());
        record.secret.clear();
        assert!(record.encode_credential(&crypto).is_none());

        let mut record = TokenRecord::issue("", false, &crypto, Utc::now());
        record.subject_id.clear();
        assert!(record.encode_credential(&crypto).is_none());
    }

    #[test]
    fn test_serde_uses_storage_field_names() {
        let record = TokenRecord::issue("user-1", true, &crypto(), Utc::now());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["auth_identifier"], "user-1");
        assert_eq!(json["token"], record.secret.as_str());
        assert!(json.get("original_secret").is_none());
        assert!(json.get("id").is_none());
    }
}
