//! 요청/응답 경계의 자격 증명 전달 채널
//!
//! - [`CredentialSource`]: 요청에서 헤더/쿠키 값을 읽고 존재 여부를 확인
//! - [`RequestCredentials`]: 요청 시작 시점에 설정된 채널 값만 복사한 스냅샷
//! - [`CredentialSink`]: 응답에 헤더/쿠키를 기록
//! - [`CredentialCookie`]: 쿠키 정책 (삭제 / 영구 / 세션 수명)

use std::collections::HashMap;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::HttpRequest;
use crate::config::{CookieSettings, TokenField};
use crate::errors::{AppError, AppResult};
use crate::utils::string_utils::strip_bearer_prefix;

/// 영구 쿠키 수명 (5년)
pub const FOREVER_COOKIE_SECONDS: i64 = 5 * 365 * 24 * 3600;

/// 요청 자격 증명 읽기 인터페이스
pub trait CredentialSource {
    fn header(&self, name: &str) -> Option<String>;
    fn cookie(&self, name: &str) -> Option<String>;
    fn has_header(&self, name: &str) -> bool;
    fn has_cookie(&self, name: &str) -> bool;
}

impl CredentialSource for HttpRequest {
    fn header(&self, name: &str) -> Option<String> {
        self.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    fn cookie(&self, name: &str) -> Option<String> {
        HttpRequest::cookie(self, name).map(|c| c.value().to_string())
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers().contains_key(name)
    }

    fn has_cookie(&self, name: &str) -> bool {
        HttpRequest::cookie(self, name).is_some()
    }
}

/// 요청에서 복사한 자격 증명 스냅샷
///
/// 엔진은 요청 객체 대신 이 스냅샷을 보관하므로 응답 단계에서도
/// "요청이 자격 증명을 제시했는가"를 판단할 수 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    header_field: Option<String>,
    cookie_field: Option<String>,
}

impl RequestCredentials {
    /// 설정된 채널의 값만 캡처합니다.
    pub fn capture(source: &impl CredentialSource, field: &TokenField) -> Self {
        let mut captured = Self {
            header_field: field.header.clone(),
            cookie_field: field.cookie.clone(),
            ..Self::default()
        };

        if let Some(name) = &field.header {
            if source.has_header(name) {
                captured.headers.insert(name.to_ascii_lowercase(), source.header(name).unwrap_or_default());
            }
        }
        if let Some(name) = &field.cookie {
            if source.has_cookie(name) {
                captured.cookies.insert(name.clone(), source.cookie(name).unwrap_or_default());
            }
        }

        captured
    }

    /// 아무 자격 증명도 없는 요청
    pub fn anonymous(field: &TokenField) -> Self {
        Self {
            header_field: field.header.clone(),
            cookie_field: field.cookie.clone(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }

    /// 제시된 자격 증명 문자열. 헤더를 먼저 보고, 비어 있으면 쿠키를 사용합니다.
    pub fn raw_credential(&self) -> Option<String> {
        let from_header = self.header_field
            .as_deref()
            .and_then(|name| self.header(name))
            .map(|value| strip_bearer_prefix(&value).to_string())
            .filter(|value| !value.is_empty());

        from_header.or_else(|| {
            self.cookie_field
                .as_deref()
                .and_then(|name| self.cookie(name))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
    }

    /// 활성화된 채널 중 하나라도 요청에 존재했는지 (값이 비어 있어도 true)
    pub fn presented(&self) -> bool {
        let header = self.header_field.as_deref().is_some_and(|name| self.has_header(name));
        let cookie = self.cookie_field.as_deref().is_some_and(|name| self.has_cookie(name));
        header || cookie
    }
}

impl CredentialSource for RequestCredentials {
    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_ascii_lowercase())
    }

    fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }
}

/// 응답 쿠키 정책
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialCookie {
    /// 클라이언트에게 쿠키 삭제를 지시
    Forget,
    /// remember 토큰: 사실상 만료되지 않는 쿠키
    Forever(String),
    /// 일반 토큰: `max_age_seconds` 동안 유지
    Session { value: String, max_age_seconds: u64 },
}

impl CredentialCookie {
    pub fn into_cookie(self, name: &str, settings: &CookieSettings) -> Cookie<'static> {
        let (value, max_age) = match &self {
            CredentialCookie::Forget => (String::new(), CookieDuration::ZERO),
            CredentialCookie::Forever(value) => (value.clone(), CookieDuration::seconds(FOREVER_COOKIE_SECONDS)),
            CredentialCookie::Session { value, max_age_seconds } => (
                value.clone(),
                CookieDuration::seconds(i64::try_from(*max_age_seconds).unwrap_or(i64::MAX)),
            ),
        };

        let mut cookie = Cookie::build(name.to_string(), value)
            .path(settings.path.clone())
            .http_only(true)
            .secure(settings.secure)
            .same_site(settings.same_site)
            .max_age(max_age)
            .finish();

        if self == CredentialCookie::Forget {
            cookie.make_removal();
        }
        cookie
    }
}

/// 응답 자격 증명 쓰기 인터페이스
pub trait CredentialSink {
    fn set_header(&mut self, name: &str, value: &str) -> AppResult<()>;
    fn set_cookie(&mut self, cookie: Cookie<'static>) -> AppResult<()>;
}

impl<B> CredentialSink for ServiceResponse<B> {
    fn set_header(&mut self, name: &str, value: &str) -> AppResult<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::ConfigurationError(format!("잘못된 토큰 헤더 이름: {}", e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::InternalError(format!("잘못된 토큰 헤더 값: {}", e)))?;
        self.headers_mut().insert(name, value);
        Ok(())
    }

    fn set_cookie(&mut self, cookie: Cookie<'static>) -> AppResult<()> {
        self.response_mut()
            .add_cookie(&cookie)
            .map_err(|e| AppError::InternalError(format!("쿠키 설정 실패: {}", e)))
    }
}

/// 기록만 하는 sink
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<Cookie<'static>>,
}

impl RecordingSink {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.cookies.iter().rev().find(|c| c.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.cookies.is_empty()
    }
}

impl CredentialSink for RecordingSink {
    fn set_header(&mut self, name: &str, value: &str) -> AppResult<()> {
        self.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn set_cookie(&mut self, cookie: Cookie<'static>) -> AppResult<()> {
        self.cookies.push(cookie);
        Ok(())
    }
}
