//! 토큰 암호화 모듈
//!
//! secret 생성(SHA-256)과 자격 증명 봉투 암호화(ChaCha20-Poly1305)를 담당합니다.
//!
//! ```rust,ignore
//! use crate::crypto::{AppKey, TokenCrypto};
//!
//! let crypto = TokenCrypto::new(AppKey::generate());
//! let secret = crypto.generate_secret("user-1");
//! let envelope = crypto.encode("user-1", &secret);
//! ```

pub mod token_crypto;

pub use token_crypto::*;
