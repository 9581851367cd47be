//! # Auth Token Configuration Module
//!
//! 토큰 수명, 토큰 전달 채널(헤더/쿠키), 쿠키 속성, 애플리케이션 키 설정을 관리합니다.
//!
//! 코어 엔진은 전역 설정을 직접 읽지 않습니다. 호스트가 [`AuthTokenConfig`]를
//! 명시적으로 만들어 엔진 컨텍스트에 넘기며, [`AuthTokenConfig::from_env`]는
//! 그 값을 환경 변수에서 채우는 편의 생성자일 뿐입니다.
//!
//! ## 환경 변수
//!
//! ```bash
//! export AUTH_TOKEN_LIFETIME_EXPIRED="604800"   # 7일, 이 시간 동안 사용되지 않은 토큰은 무효
//! export AUTH_TOKEN_LIFETIME_REFRESH="3600"     # 1시간, 이후 다음 요청에서 secret 교체
//! export AUTH_TOKEN_HEADER="Authorization"      # "none" 이면 헤더 채널 비활성화
//! export AUTH_TOKEN_COOKIE="X-Auth-Token"       # "none" 이면 쿠키 채널 비활성화
//! export AUTH_TOKEN_COOKIE_SECURE="true"
//! export APP_KEY="base64:..."                   # 32바이트 키
//! ```

use std::env;
use actix_web::cookie::SameSite;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use crate::config::Environment;
use crate::crypto::AppKey;
use crate::errors::AppError;

/// 기본 만료 시간 (7일)
pub const DEFAULT_EXPIRED_SECONDS: u64 = 7 * 24 * 3600;

/// 기본 갱신 주기 (1시간)
pub const DEFAULT_REFRESH_SECONDS: u64 = 3600;

pub const DEFAULT_HEADER_FIELD: &str = "Authorization";
pub const DEFAULT_COOKIE_FIELD: &str = "X-Auth-Token";

/// 토큰 수명 정책
///
/// 레코드에 저장되지 않고 요청마다 설정에서 공급됩니다.
/// 두 값 모두 `updated_at` 기준의 경과 시간(초)입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetime {
    /// 이 시간보다 오래 사용되지 않은 비-remember 토큰은 무효
    pub expired: u64,
    /// 이 시간보다 오래된 토큰은 다음 사용 시 secret을 교체
    pub refresh: u64,
}

impl Default for TokenLifetime {
    fn default() -> Self {
        Self {
            expired: DEFAULT_EXPIRED_SECONDS,
            refresh: DEFAULT_REFRESH_SECONDS,
        }
    }
}

/// 토큰 전달 채널 이름
///
/// `None`은 해당 채널이 비활성화되었음을 의미합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenField {
    pub header: Option<String>,
    pub cookie: Option<String>,
}

impl TokenField {
    /// 헤더와 쿠키 채널이 모두 비활성화되었는지 확인
    pub fn is_disabled(&self) -> bool {
        self.header.is_none() && self.cookie.is_none()
    }
}

impl Default for TokenField {
    fn default() -> Self {
        Self {
            header: Some(DEFAULT_HEADER_FIELD.to_string()),
            cookie: Some(DEFAULT_COOKIE_FIELD.to_string()),
        }
    }
}

/// 토큰 쿠키 속성
#[derive(Debug, Clone, PartialEq)]
pub struct CookieSettings {
    pub secure: bool,
    pub path: String,
    pub same_site: SameSite,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: false,
            path: "/".to_string(),
            same_site: SameSite::Lax,
        }
    }
}

/// 토큰 엔진 설정
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthTokenConfig {
    pub lifetime: TokenLifetime,
    pub token_field: TokenField,
    pub cookie: CookieSettings,
}

impl AuthTokenConfig {
    /// 환경 변수에서 설정을 읽어옵니다.
    ///
    /// 파싱할 수 없는 값은 경고를 남기고 기본값을 사용합니다.
    pub fn from_env() -> Self {
        let lifetime = TokenLifetime {
            expired: read_seconds("AUTH_TOKEN_LIFETIME_EXPIRED", DEFAULT_EXPIRED_SECONDS),
            refresh: read_seconds("AUTH_TOKEN_LIFETIME_REFRESH", DEFAULT_REFRESH_SECONDS),
        };

        let token_field = TokenField {
            header: parse_field_name(env::var("AUTH_TOKEN_HEADER").ok(), DEFAULT_HEADER_FIELD),
            cookie: parse_field_name(env::var("AUTH_TOKEN_COOKIE").ok(), DEFAULT_COOKIE_FIELD),
        };

        let secure_default = Environment::current() == Environment::Production;
        let cookie = CookieSettings {
            secure: env::var("AUTH_TOKEN_COOKIE_SECURE")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(secure_default),
            ..CookieSettings::default()
        };

        let config = Self { lifetime, token_field, cookie };
        log::info!(
            "토큰 설정 로드됨 - expired: {}초, refresh: {}초, header: {:?}, cookie: {:?}",
            config.lifetime.expired,
            config.lifetime.refresh,
            config.token_field.header,
            config.token_field.cookie
        );
        config
    }

    pub fn with_lifetime(mut self, expired: u64, refresh: u64) -> Self {
        self.lifetime = TokenLifetime { expired, refresh };
        self
    }

    pub fn with_header(mut self, header: Option<&str>) -> Self {
        self.token_field.header = header.map(str::to_string);
        self
    }

    pub fn with_cookie(mut self, cookie: Option<&str>) -> Self {
        self.token_field.cookie = cookie.map(str::to_string);
        self
    }

    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.cookie.secure = secure;
        self
    }
}

/// 애플리케이션 키 설정
///
/// 키의 생명주기는 호스트가 관리합니다. 키가 바뀌면 이전에 발급된 모든 토큰은
/// 복호화에 실패하고 인증되지 않은 요청으로 취급됩니다.
pub struct AppKeyConfig;

impl AppKeyConfig {
    /// `APP_KEY` 환경 변수에서 키를 로드합니다.
    ///
    /// 운영 환경에서 키가 없으면 `ConfigurationError`를 반환하고,
    /// 그 외 환경에서는 임시 키를 생성합니다 (재시작 시 모든 토큰 무효화).
    pub fn load() -> Result<AppKey, AppError> {
        match env::var("APP_KEY") {
            Ok(raw) => Self::parse(&raw),
            Err(_) if Environment::current() == Environment::Production => Err(
                AppError::ConfigurationError("APP_KEY must be set in production".to_string()),
            ),
            Err(_) => {
                log::warn!("APP_KEY not set, using an ephemeral key (tokens will not survive restart!)");
                Ok(AppKey::generate())
            }
        }
    }

    /// 키 문자열을 파싱합니다.
    ///
    /// - `base64:` 접두사: 정확히 32바이트로 디코딩되어야 합니다.
    /// - 그 외: 임의의 키 재료를 SHA-256으로 유도합니다.
    pub fn parse(raw: &str) -> Result<AppKey, AppError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::ConfigurationError("APP_KEY is empty".to_string()));
        }

        if let Some(encoded) = raw.strip_prefix("base64:") {
            let bytes = STANDARD
                .decode(encoded)
                .map_err(|e| AppError::ConfigurationError(format!("APP_KEY is not valid base64: {}", e)))?;
            let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                AppError::ConfigurationError(format!("APP_KEY must decode to 32 bytes, got {}", bytes.len()))
            })?;
            return Ok(AppKey::from_bytes(key));
        }

        if raw.len() < 32 {
            log::warn!("APP_KEY is shorter than 32 characters (not secure for production!)");
        }
        Ok(AppKey::from_bytes(Sha256::digest(raw.as_bytes()).into()))
    }
}

fn read_seconds(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(value) => value.trim().parse::<u64>().unwrap_or_else(|e| {
            log::warn!("{} 파싱 실패: {}. 기본값 {} 사용", name, e, default);
            default
        }),
        Err(_) => default,
    }
}

/// 채널 이름 값을 해석합니다. 빈 값이나 `none`/`off`/`false`/`disabled`는 비활성화입니다.
pub fn parse_field_name(raw: Option<String>, default: &str) -> Option<String> {
    match raw {
        None => Some(default.to_string()),
        Some(value) => {
            let value = value.trim();
            match value.to_lowercase().as_str() {
                "" | "none" | "off" | "false" | "disabled" => None,
                _ => Some(value.to_string()),
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetime() {
        let config = AuthTokenConfig::default();
        assert_eq!(config.lifetime.expired, 604800);
        assert_eq!(config.lifetime.refresh, 3600);
        assert_eq!(config.token_field.header.as_deref(), Some("Authorization"));
        assert_eq!(config.token_field.cookie.as_deref(), Some("X-Auth-Token"));
    }

    #[test]
    fn test_parse_field_name() {
        assert_eq!(parse_field_name(None, "Authorization"), Some("Authorization".to_string()));
        assert_eq!(parse_field_name(Some("X-Token".to_string()), "Authorization"), Some("X-Token".to_string()));
        assert_eq!(parse_field_name(Some("".to_string()), "Authorization"), None);
        assert_eq!(parse_field_name(Some("None".to_string()), "Authorization"), None);
        assert_eq!(parse_field_name(Some(" off ".to_string()), "Authorization"), None);
    }

    #[test]
    fn test_token_field_disabled() {
        let config = AuthTokenConfig::default().with_header(None).with_cookie(None);
        assert!(config.token_field.is_disabled());

        let config = AuthTokenConfig::default().with_header(None);
        assert!(!config.token_field.is_disabled());
    }

    #[test]
    fn test_app_key_base64_must_be_32_bytes() {
        let good = format!("base64:{}", STANDARD.encode([7u8; 32]));
        let short = format!("base64:{}", STANDARD.encode([7u8; 16]));

        assert_eq!(AppKeyConfig::parse(&good).unwrap().as_bytes(), &[7u8; 32]);
        assert!(matches!(AppKeyConfig::parse(&short), Err(AppError::ConfigurationError(_))));
        assert!(matches!(AppKeyConfig::parse("base64:***"), Err(AppError::ConfigurationError(_))));
        assert!(matches!(AppKeyConfig::parse("   "), Err(AppError::ConfigurationError(_))));
    }

    #[test]
    fn test_app_key_derived_from_passphrase_is_stable() {
        let a = AppKeyConfig::parse("a-long-enough-passphrase-for-the-app-key").unwrap();
        let b = AppKeyConfig::parse("a-long-enough-passphrase-for-the-app-key").unwrap();
        let c = AppKeyConfig::parse("another-long-enough-passphrase-for-the-key").unwrap();

        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), c.as_bytes());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
