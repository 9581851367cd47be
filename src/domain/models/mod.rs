//! 도메인 모델
//!
//! - [`auth`] - 인증 모드와 인증된 주체 추출자
//! - [`token`] - 발급된 세션 토큰 레코드

pub mod auth;
pub mod token;

pub use auth::*;
pub use token::*;
