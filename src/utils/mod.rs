//! 공통 유틸리티 모듈
//!
//! # Modules
//!
//! - [`clock`] - 엔진과 저장소가 사용하는 시간 공급자
//! - [`string_utils`] - 자격 증명 문자열 정리, 로그 마스킹

pub mod clock;
pub mod string_utils;

pub use clock::*;
