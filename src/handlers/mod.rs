//! # HTTP Request Handlers Module
//!
//! 토큰 인증 엔드포인트를 처리하는 핸들러 함수들입니다.
//!
//! 핸들러는 자격 증명 공급자 `P` 에 대해 제네릭이며, 라우트 등록 시
//! `login::<MongoUserProvider>` 처럼 구체 타입으로 고정됩니다.
//!
//! ## 아키텍처 위치
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//!   Client (Browser, Mobile App, API Client)
//! └─────────────────────┬───────────────────────┘
//!                       │ Authorization 헤더 / X-Auth-Token 쿠키
//! ┌─────────────────────▼───────────────────────┐
//!   AuthTokenMiddleware - 토큰 해석, 응답 기록
//! ├─────────────────────────────────────────────┤
//!   Handlers (이 모듈) - AuthGuard 로 엔진 조작
//! ├─────────────────────────────────────────────┤
//!   AuthTokenGuard - 토큰 생명주기 엔진
//! ├─────────────────────────────────────────────┤
//!   TokenStore / CredentialProvider
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## 모듈 구성
//!
//! - **`auth`**: 로그인, 로그아웃, 다른 기기 로그아웃, 현재 주체 조회

pub mod auth;
