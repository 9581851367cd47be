//! 토큰 기반 세션 인증 서비스
//!
//! 서버 측에 저장된 불투명 bearer 토큰으로 세션을 인증합니다.
//! 토큰은 사용할 때마다 수명이 연장되고, 일정 시간이 지나면 secret 이 교체되며,
//! 오래 사용되지 않으면 만료됩니다. 자격 증명은 응답 헤더와 쿠키로 클라이언트에 전달됩니다.
//!
//! # Features
//!
//! - **토큰 생명주기**: 발급, 해석, sliding expiry, secret 교체, remember 토큰
//! - **자격 증명 봉투**: ChaCha20-Poly1305 로 암호화된 `{auth_identifier, token}`
//! - **전달 채널**: 설정 가능한 헤더/쿠키, 쿠키 정책 (삭제 / 영구 / 세션)
//! - **저장소**: MongoDB, Redis, 인메모리 ([`repositories::tokens::TokenStore`])
//! - **Actix-web 연동**: 인증 미들웨어, `AuthGuard` / `Authenticated` 추출자
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ AuthTokenMiddleware  │ ← 요청 자격 증명 캡처, 응답 자격 증명 기록
//! └──────────────────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │      Handlers        │ ← login / logout / me
//! └──────────────────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │   AuthTokenGuard     │ ← 요청 단위 토큰 엔진
//! └──────────────────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │ TokenStore / Provider│ ← 토큰 레코드, 사용자 조회
//! └──────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use auth_token_service::services::auth::AuthTokenContext;
//!
//! let context = AuthTokenContext::new(provider, store, crypto, AuthTokenConfig::from_env());
//! let mut guard = context.guard_for(&request);
//!
//! if guard.attempt(&credentials, false).await? {
//!     guard.emit_credential(&mut response).await?;
//! }
//! ```

pub mod config;
pub mod db;
pub mod caching;
pub mod crypto;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod routes;
pub mod handlers;
pub mod errors;
pub mod middlewares;
