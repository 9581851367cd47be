//! 사용자 서비스 모듈
//!
//! MongoDB 사용자를 토큰 엔진의 주체로 연결하는 자격 증명 공급자를 제공합니다.
//!
//! # Security
//!
//! - bcrypt 비밀번호 검증
//! - 비활성 계정 차단
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::users::MongoUserProvider;
//!
//! let provider = Arc::new(MongoUserProvider::new(user_repo));
//! ```

pub mod user_provider;

pub use user_provider::*;
