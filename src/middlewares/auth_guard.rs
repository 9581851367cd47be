//! 핸들러용 요청 단위 엔진 추출자

use std::future::{ready, Ready};
use std::sync::Arc;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::lock::{Mutex, MutexGuard};
use log::error;
use crate::errors::AppError;
use crate::services::auth::{AuthTokenGuard, CredentialProvider};

/// 인증 미들웨어가 요청마다 만든 [`AuthTokenGuard`] 핸들
///
/// 미들웨어와 핸들러가 같은 엔진을 공유하므로, 핸들러의 `login`/`logout` 결과가
/// 응답 시점의 자격 증명 기록에 그대로 반영됩니다.
pub struct AuthGuard<P: CredentialProvider>(Arc<Mutex<AuthTokenGuard<P>>>);

impl<P: CredentialProvider> Clone for AuthGuard<P> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<P: CredentialProvider> AuthGuard<P> {
    pub fn new(guard: AuthTokenGuard<P>) -> Self {
        Self(Arc::new(Mutex::new(guard)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, AuthTokenGuard<P>> {
        self.0.lock().await
    }
}

impl<P: CredentialProvider> FromRequest for AuthGuard<P> {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthGuard<P>>() {
            Some(guard) => ready(Ok(guard.clone())),
            None => {
                error!("인증 미들웨어가 적용되지 않은 경로에서 AuthGuard 를 요청했습니다: {}", req.path());
                ready(Err(AppError::ConfigurationError(
                    "인증 미들웨어가 등록되지 않았습니다".to_string(),
                ).into()))
            }
        }
    }
}
