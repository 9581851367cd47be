//! 캐싱 계층 모듈
//!
//! Redis 토큰 저장소([`RedisTokenRepository`](crate::repositories::tokens::RedisTokenRepository))가
//! 사용하는 Redis 연결을 제공합니다.
//!
//! # 주요 기능
//!
//! - 멀티플렉싱 비동기 연결
//! - 문자열 GET/SET, 조건부 SET(NX), 단일/다중 DEL, 패턴 KEYS
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use crate::caching::redis::RedisClient;
//!
//! let redis = Arc::new(RedisClient::new().await?);
//! let tokens = RedisTokenRepository::new(redis.clone());
//! ```
//!
//! # 환경 설정
//!
//! ```bash
//! REDIS_URL=redis://localhost:6379  # 기본값
//! ```

pub mod redis;
