//! 사용자 데이터 액세스 계층
//!
//! [`UserRepository`](user_repo::UserRepository)를 통해 MongoDB `users` 컬렉션을 조회합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::users::UserRepository;
//!
//! let user_repo = UserRepository::new(database.clone());
//! let user = user_repo.find_by_email("user@example.com").await?;
//! ```

pub mod user_repo;

pub use user_repo::*;
