//! 토큰 secret 생성과 자격 증명 봉투(envelope) 암호화
//!
//! 클라이언트에게 전달되는 자격 증명은 raw secret이 아니라
//! `{auth_identifier, token}` 쌍을 ChaCha20-Poly1305로 암호화한 봉투입니다.
//!
//! ## 봉투 형식
//!
//! ```text
//! base64url_nopad( nonce(12) || ciphertext || tag(16) )
//! plaintext = {"auth_identifier": "...", "token": "..."}
//! aad       = "auth-token:v1"
//! ```
//!
//! 어떤 바이트라도 변조되면 인증 태그 검증이 실패하므로 다른 사용자로 인증되는 일은 없습니다.

use std::fmt;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const ENVELOPE_AAD: &[u8] = b"auth-token:v1";

/// 프로세스 전역 대칭 키 (32바이트)
#[derive(Clone, PartialEq, Eq)]
pub struct AppKey([u8; 32]);

impl AppKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// OS 난수로 새 키를 생성합니다.
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for AppKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AppKey(..)")
    }
}

/// 봉투 안에 담기는 자격 증명
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPayload {
    /// 인증 주체 식별자 (subject id)
    pub auth_identifier: String,
    /// 서버가 생성한 불투명 secret
    pub token: String,
}

/// secret 생성기이자 자격 증명 봉투 암호기
#[derive(Clone)]
pub struct TokenCrypto {
    key: AppKey,
    cipher: ChaCha20Poly1305,
}

impl TokenCrypto {
    pub fn new(key: AppKey) -> Self {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        Self { key, cipher }
    }

    /// 새 secret을 생성합니다.
    ///
    /// subject id, 나노초 시각, 16바이트 난수, 서버 키를 결합한 뒤 SHA-256으로 단방향 변환합니다.
    /// 결과는 64자리 16진수 문자열입니다.
    pub fn generate_secret(&self, subject_id: &str) -> String {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut nonce = [0u8; 16];
        OsRng.fill_bytes(&mut nonce);

        let mut hasher = Sha256::new();
        hasher.update(subject_id.as_bytes());
        hasher.update(b"#");
        hasher.update(nanos.to_be_bytes());
        hasher.update(b"#");
        hasher.update(nonce);
        hasher.update(b"#");
        hasher.update(self.key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// subject id와 secret을 봉투로 암호화합니다.
    ///
    /// 둘 중 하나라도 비어 있으면 `None`을 반환합니다.
    pub fn encode(&self, auth_identifier: &str, token: &str) -> Option<String> {
        if auth_identifier.is_empty() || token.is_empty() {
            return None;
        }

        let payload = CredentialPayload {
            auth_identifier: auth_identifier.to_string(),
            token: token.to_string(),
        };
        let plaintext = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("자격 증명 직렬화 실패: {}", e);
                return None;
            }
        };

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = match self.cipher.encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload { msg: &plaintext, aad: ENVELOPE_AAD },
        ) {
            Ok(bytes) => bytes,
            Err(_) => {
                log::error!("자격 증명 암호화 실패");
                return None;
            }
        };

        let mut envelope = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&ciphertext);
        Some(URL_SAFE_NO_PAD.encode(envelope))
    }

    /// 봉투를 복호화합니다.
    ///
    /// 클라이언트가 보낸 임의의 문자열이 들어오므로 실패는 예외가 아닌 정상 경로입니다.
    /// 어떤 실패든 `None`으로 정규화되며 원문은 로그에 남기지 않습니다.
    pub fn decode(&self, raw: &str) -> Option<CredentialPayload> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let envelope = match URL_SAFE_NO_PAD.decode(raw) {
            Ok(bytes) => bytes,
            Err(_) => {
                log::warn!("자격 증명 디코딩 실패: base64 형식 아님");
                return None;
            }
        };
        if envelope.len() <= NONCE_LEN + TAG_LEN {
            log::warn!("자격 증명 디코딩 실패: 길이 부족 ({}바이트)", envelope.len());
            return None;
        }

        let (nonce_bytes, ciphertext) = envelope.split_at(NONCE_LEN);
        let plaintext = match self.cipher.decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload { msg: ciphertext, aad: ENVELOPE_AAD },
        ) {
            Ok(bytes) => bytes,
            Err(_) => {
                log::warn!("자격 증명 복호화 실패: 변조되었거나 다른 키로 암호화됨");
                return None;
            }
        };

        let payload: CredentialPayload = serde_json::from_slice(&plaintext).ok()?;
        if payload.auth_identifier.is_empty() || payload.token.is_empty() {
            return None;
        }
        Some(payload)
    }
}

impl fmt::Debug for TokenCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCrypto").finish_non_exhaustive()
    }
}
