//! 데이터 액세스 계층을 담당하는 리포지토리 모듈
//!
//! # Features
//!
//! - 토큰 레코드 저장소: MongoDB, Redis, 인메모리 ([`tokens`])
//! - 사용자 조회: MongoDB ([`users`])
//!
//! 리포지토리는 `Arc<Database>` / `Arc<RedisClient>`를 생성자로 받아 명시적으로 조립합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::{tokens::MongoTokenRepository, users::UserRepository};
//!
//! let tokens = MongoTokenRepository::new(database.clone());
//! let users = UserRepository::new(database.clone());
//! ```

pub mod tokens;
pub mod users;
