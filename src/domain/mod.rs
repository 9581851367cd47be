//! 도메인 계층
//!
//! - [`entities`] - MongoDB 에 저장되는 사용자 엔티티
//! - [`models`] - 토큰 레코드, 인증 모드, 인증 주체
//! - [`dto`] - HTTP 요청 DTO

pub mod entities;
pub mod dto;
pub mod models;

pub use entities::*;
pub use dto::*;
pub use models::*;
