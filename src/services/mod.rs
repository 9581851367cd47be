//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! # Features
//!
//! - 토큰 생명주기 엔진과 전달 채널 ([`auth`])
//! - MongoDB 사용자 자격 증명 공급자 ([`users`])
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::{auth::AuthTokenContext, users::MongoUserProvider};
//!
//! let provider = Arc::new(MongoUserProvider::new(user_repo));
//! let context = AuthTokenContext::new(provider, store, crypto, config);
//! ```

pub mod users;
pub mod auth;
