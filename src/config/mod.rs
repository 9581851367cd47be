//! # Configuration Module
//!
//! 환경 변수 기반의 설정값들을 중앙집중식으로 관리합니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 실행 환경, 서버, 정리 작업, Rate Limiting 설정
//! - [`auth_token_config`] - 토큰 수명, 전달 채널, 쿠키 속성, 애플리케이션 키
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::{AuthTokenConfig, AppKeyConfig, ServerConfig};
//!
//! let token_config = AuthTokenConfig::from_env();
//! let app_key = AppKeyConfig::load()?;
//! let bind = ServerConfig::bind_address();
//! ```

pub mod data_config;
pub mod auth_token_config;

pub use data_config::*;
pub use auth_token_config::*;
