//! 토큰 기반 세션 인증 서비스 모듈
//!
//! 불투명 bearer 토큰의 발급, 해석, 만료/갱신, 헤더/쿠키 전달을 담당합니다.
//!
//! # Features
//!
//! - 요청 단위 엔진 ([`AuthTokenGuard`]) 과 공유 구성 ([`AuthTokenContext`])
//! - 호스트가 구현하는 주체 공급자 ([`CredentialProvider`])
//! - 요청/응답 채널 추상화 ([`CredentialSource`], [`CredentialSink`])
//! - 인증 이벤트 리스너 ([`AuthEventListener`])
//! - 만료 토큰 정기 정리 ([`TokenSweeper`])
//!
//! # Security
//!
//! - 클라이언트는 raw secret 이 아니라 암호화된 봉투만 받습니다
//! - 조회는 subject id 와 secret 의 정확한 일치로만 성공합니다
//! - 복호화 실패, 조회 실패, 만료는 호출자에게 구분되지 않습니다
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::auth::AuthTokenContext;
//!
//! let context = AuthTokenContext::new(provider, store, crypto, AuthTokenConfig::from_env());
//! let mut guard = context.guard_for(&request);
//! let user = guard.user().await?;
//! ```

pub mod provider;
pub mod credentials;
pub mod events;
pub mod context;
pub mod guard;
pub mod token_sweeper;

#[cfg(test)]
pub(crate) mod testing;

pub use provider::*;
pub use credentials::*;
pub use events::*;
pub use context::*;
pub use guard::*;
pub use token_sweeper::*;
