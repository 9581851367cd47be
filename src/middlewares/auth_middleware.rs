//! 토큰 인증 미들웨어
//!
//! ActixWeb 요청 파이프라인에서 요청 토큰을 해석하고, 응답에 자격 증명을 기록합니다.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
    body::EitherBody,
};
use crate::domain::models::auth::AuthMode;
use crate::middlewares::auth_inner::AuthTokenMiddlewareService;
use crate::services::auth::{AuthTokenContext, CredentialProvider};

/// 토큰 인증 미들웨어
pub struct AuthTokenMiddleware<P: CredentialProvider> {
    context: AuthTokenContext<P>,
    /// 인증 모드 (Required/Optional)
    mode: AuthMode,
}

impl<P: CredentialProvider> AuthTokenMiddleware<P> {
    pub fn new(context: AuthTokenContext<P>, mode: AuthMode) -> Self {
        Self { context, mode }
    }

    /// 필수 인증 미들웨어 생성
    pub fn required(context: AuthTokenContext<P>) -> Self {
        Self::new(context, AuthMode::Required)
    }

    /// 선택적 인증 미들웨어 생성
    pub fn optional(context: AuthTokenContext<P>) -> Self {
        Self::new(context, AuthMode::Optional)
    }
}

/// ActixWeb Transform trait 구현
impl<S, B, P> Transform<S, ServiceRequest> for AuthTokenMiddleware<P>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    P: CredentialProvider,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthTokenMiddlewareService<S, P>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthTokenMiddlewareService {
            service: Rc::new(service),
            context: self.context.clone(),
            mode: self.mode,
        }))
    }
}
