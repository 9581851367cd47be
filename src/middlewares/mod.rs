//! 미들웨어 모듈
//!
//! ActixWeb 요청 처리 파이프라인에 토큰 엔진을 연결합니다.
//!
//! # 제공 미들웨어
//!
//! ### 토큰 인증 미들웨어 (AuthTokenMiddleware)
//! - 요청 시작 시 헤더/쿠키에서 자격 증명을 읽어 주체를 해석
//! - 요청 단위 엔진([`AuthGuard`])과 인증된 주체를 request extension에 저장
//! - 응답 시 갱신/발급/삭제된 자격 증명을 헤더와 쿠키에 기록
//! - 선택적/강제 인증 모드 지원
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! use actix_web::web;
//! use crate::middlewares::AuthTokenMiddleware;
//!
//! cfg.service(
//!     web::resource("/me")
//!         .wrap(AuthTokenMiddleware::required(context.clone())) // 인증된 주체가 없으면 401
//!         .route(web::get().to(me::<MongoUserProvider>))
//! );
//! ```
//!
//! 같은 요청에 미들웨어를 두 번 적용하면 엔진도 두 번 만들어지므로,
//! 리소스마다 하나의 모드만 적용합니다.

pub mod auth_middleware;
pub mod auth_guard;
mod auth_inner;

// 미들웨어 재export
pub use auth_middleware::AuthTokenMiddleware;
pub use auth_guard::AuthGuard;
