//! 데이터 및 서버 설정 관리 모듈
//!
//! 실행 환경, 서버 바인딩, 토큰 저장소 종류, 만료 토큰 정리 주기, 로그인 Rate Limiting 설정을 관리합니다.

use std::env;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// `ENVIRONMENT` 환경 변수에서 현재 환경을 판별합니다.
    ///
    /// 설정되지 않은 경우 안전하게 `Production`으로 간주합니다.
    pub fn current() -> Self {
        Self::from_str(&env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string()))
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }
}

/// HTTP 서버 설정
pub struct ServerConfig;

impl ServerConfig {
    pub fn port() -> u16 {
        env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080)
    }

    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
    }

    pub fn bind_address() -> String {
        format!("{}:{}", Self::host(), Self::port())
    }
}

/// 만료 토큰 정리 작업 설정
pub struct SweepConfig;

impl SweepConfig {
    /// 정리 주기 (초). 0이면 정리 작업을 실행하지 않습니다.
    pub fn interval_seconds() -> u64 {
        env::var("AUTH_TOKEN_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(3600)
    }
}

/// 토큰 레코드 저장소 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStoreKind {
    Mongo,
    Redis,
    Memory,
}

impl TokenStoreKind {
    /// `AUTH_TOKEN_STORE` 환경 변수 (`mongo` | `redis` | `memory`, 기본값 `mongo`)
    pub fn from_env() -> Self {
        let raw = env::var("AUTH_TOKEN_STORE").unwrap_or_else(|_| "mongo".to_string());
        Self::from_str(&raw).unwrap_or_else(|| {
            log::warn!("알 수 없는 AUTH_TOKEN_STORE 값 '{}', mongo 사용", raw);
            TokenStoreKind::Mongo
        })
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mongo" | "mongodb" => Some(TokenStoreKind::Mongo),
            "redis" => Some(TokenStoreKind::Redis),
            "memory" => Some(TokenStoreKind::Memory),
            _ => None,
        }
    }
}

/// 로그인 엔드포인트 Rate Limiting 설정
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// 환경 변수 `RATE_LIMIT_PER_SECOND`, `RATE_LIMIT_BURST_SIZE`에서 설정을 읽습니다.
    pub fn from_env() -> Self {
        let per_second = env::var("RATE_LIMIT_PER_SECOND")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .unwrap_or_else(|e| {
                log::error!("RATE_LIMIT_PER_SECOND 파싱 실패: {}. 기본값 10 사용", e);
                10
            });

        let burst_size = env::var("RATE_LIMIT_BURST_SIZE")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<u32>()
            .unwrap_or_else(|e| {
                log::error!("RATE_LIMIT_BURST_SIZE 파싱 실패: {}. 기본값 20 사용", e);
                20
            });

        Self { per_second, burst_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_string() {
        assert_eq!(Environment::from_str("development"), Environment::Development);
        assert_eq!(Environment::from_str("DEV"), Environment::Development);
        assert_eq!(Environment::from_str("test"), Environment::Test);
        assert_eq!(Environment::from_str("production"), Environment::Production);
        assert_eq!(Environment::from_str("unknown"), Environment::Production);
    }

    #[test]
    fn test_server_config_defaults() {
        if env::var("PORT").is_err() {
            assert_eq!(ServerConfig::port(), 8080);
        }

        if env::var("HOST").is_err() {
            assert_eq!(ServerConfig::host(), "127.0.0.1");
        }
    }

    #[test]
    fn test_token_store_kind_from_string() {
        assert_eq!(TokenStoreKind::from_str("MongoDB"), Some(TokenStoreKind::Mongo));
        assert_eq!(TokenStoreKind::from_str(" redis "), Some(TokenStoreKind::Redis));
        assert_eq!(TokenStoreKind::from_str("memory"), Some(TokenStoreKind::Memory));
        assert_eq!(TokenStoreKind::from_str("sqlite"), None);
    }

    #[test]
    fn test_sweep_interval_default() {
        if env::var("AUTH_TOKEN_SWEEP_INTERVAL_SECS").is_err() {
            assert_eq!(SweepConfig::interval_seconds(), 3600);
        }
    }
}
