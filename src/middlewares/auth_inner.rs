//! AuthTokenMiddleware 인증 로직의 핵심적인 기능
//!
//! 1. 요청 시작: 설정된 채널의 자격 증명을 캡처하고 주체를 해석합니다.
//! 2. 핸들러: [`AuthGuard`] 와 [`Authenticated`] 를 Request Extensions 에서 꺼내 씁니다.
//! 3. 응답: 핸들러가 끝난 뒤 엔진 상태에 맞게 헤더/쿠키를 기록합니다.

use std::rc::Rc;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::future::LocalBoxFuture;
use log::{debug, error, warn};
use crate::domain::models::auth::{AuthMode, Authenticated};
use crate::middlewares::auth_guard::AuthGuard;
use crate::services::auth::{AuthTokenContext, CredentialProvider};

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthTokenMiddlewareService<S, P: CredentialProvider> {
    pub service: Rc<S>,
    pub context: AuthTokenContext<P>,
    pub mode: AuthMode,
}

impl<S, B, P> Service<ServiceRequest> for AuthTokenMiddlewareService<S, P>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    P: CredentialProvider,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let guard = AuthGuard::new(self.context.guard_for(req.request()));
        let mode = self.mode;

        Box::pin(async move {
            let principal = match guard.lock().await.resolve_from_request().await {
                Ok(principal) => principal,
                Err(err) => {
                    error!("토큰 해석 중 저장소 오류: {}", err);
                    return Ok(req.error_response(err).map_into_right_body());
                }
            };

            req.extensions_mut().insert(guard.clone());

            match (mode, principal) {
                (_, Some(principal)) => {
                    debug!("토큰 인증 성공: {}", req.path());
                    req.extensions_mut().insert(Authenticated(principal));
                }
                (AuthMode::Required, None) => {
                    warn!("인증 실패: {}", req.path());
                    let response = HttpResponse::Unauthorized()
                        .json(serde_json::json!({
                            "error": "authentication_required",
                            "message": "유효한 인증 토큰이 필요합니다"
                        }));
                    let (req, _) = req.into_parts();
                    let mut res = ServiceResponse::new(req, response);

                    // 무효한 쿠키는 401 응답에서도 삭제 지시를 받아야 합니다
                    if let Err(err) = guard.lock().await.emit_credential(&mut res).await {
                        error!("자격 증명 기록 실패: {}", err);
                        return Ok(res.error_response(err).map_into_right_body());
                    }
                    return Ok(res.map_into_right_body());
                }
                (AuthMode::Optional, None) => {
                    debug!("선택적 인증: 인증된 주체 없음, 요청 진행");
                }
            }

            // 다음 서비스로 요청 전달
            let mut res = service.call(req).await?;

            if let Err(err) = guard.lock().await.emit_credential(&mut res).await {
                error!("자격 증명 기록 실패: {}", err);
                return Ok(res.error_response(err).map_into_right_body());
            }
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use async_trait::async_trait;
    use crate::config::AuthTokenConfig;
    use crate::crypto::{AppKey, TokenCrypto};
    use crate::domain::models::token::TokenRecord;
    use crate::errors::{AppError, AppResult};
    use crate::middlewares::AuthTokenMiddleware;
    use crate::repositories::tokens::{SaveOutcome, TokenStore};
    use crate::services::auth::testing::{login_request, Harness, TestUser, TestUserProvider};
    use super::*;

    async fn login_alice(guard: AuthGuard<TestUserProvider>) -> AppResult<HttpResponse> {
        let ok = guard.lock().await.attempt(&login_request("alice@example.com", "secret"), false).await?;
        Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": ok })))
    }

    async fn me(user: Authenticated<TestUser>) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "id": user.id }))
    }

    async fn ping() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    fn app(
        h: &Harness,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl actix_web::body::MessageBody + use<>>,
            Error = Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .service(
                web::resource("/login")
                    .wrap(AuthTokenMiddleware::optional(h.context.clone()))
                    .route(web::post().to(login_alice)),
            )
            .service(
                web::resource("/me")
                    .wrap(AuthTokenMiddleware::required(h.context.clone()))
                    .route(web::get().to(me)),
            )
            .service(
                web::resource("/ping")
                    .wrap(AuthTokenMiddleware::optional(h.context.clone()))
                    .route(web::get().to(ping)),
            )
    }

    #[actix_web::test]
    async fn test_anonymous_optional_request_gets_no_credential() {
        let h = Harness::new();
        let app = test::init_service(app(&h)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("Authorization").is_none());
        assert_eq!(resp.response().cookies().count(), 0);
    }

    #[actix_web::test]
    async fn test_login_then_authenticated_request() {
        let h = Harness::new();
        let app = test::init_service(app(&h)).await;

        let resp = test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let credential = resp.headers().get("Authorization").unwrap().to_str().unwrap().to_string();
        assert!(!credential.is_empty());
        let cookie = resp.response().cookies().find(|c| c.name() == "X-Auth-Token").unwrap();
        assert_eq!(cookie.value(), credential);
        assert_eq!(h.store.len(), 1);

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", credential)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("Authorization").is_some());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], h.alice().id);
    }

    #[actix_web::test]
    async fn test_required_without_credential_is_unauthorized() {
        let h = Harness::new();
        let app = test::init_service(app(&h)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get("Authorization").is_none());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "authentication_required");
    }

    #[actix_web::test]
    async fn test_invalid_cookie_is_forgotten_on_unauthorized_response() {
        let h = Harness::new();
        let app = test::init_service(app(&h)).await;

        let req = test::TestRequest::get()
            .uri("/me")
            .cookie(Cookie::new("X-Auth-Token", "garbage"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get("Authorization").unwrap(), "");
        let cookie = resp.response().cookies().find(|c| c.name() == "X-Auth-Token").unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
    }

    struct FailingStore;

    #[async_trait]
    impl TokenStore for FailingStore {
        async fn find(&self, _subject_id: &str, _secret: &str) -> AppResult<Option<TokenRecord>> {
            Ok(None)
        }

        async fn save(&self, _record: &mut TokenRecord) -> AppResult<SaveOutcome> {
            Err(AppError::DatabaseError("connection reset".to_string()))
        }

        async fn delete(&self, _record: &TokenRecord) -> AppResult<bool> {
            Ok(false)
        }

        async fn delete_expired(&self, _threshold_seconds: u64) -> AppResult<u64> {
            Ok(0)
        }

        async fn delete_by_subject(&self, _subject_id: &str) -> AppResult<u64> {
            Ok(0)
        }
    }

    #[actix_web::test]
    async fn test_store_failure_on_emission_is_server_error() {
        let h = Harness::new();
        let context = AuthTokenContext::new(
            h.provider.clone(),
            Arc::new(FailingStore),
            Arc::new(TokenCrypto::new(AppKey::from_bytes([42u8; 32]))),
            AuthTokenConfig::default(),
        );
        let app = test::init_service(
            App::new().service(
                web::resource("/login")
                    .wrap(AuthTokenMiddleware::optional(context))
                    .route(web::post().to(login_alice)),
            ),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.headers().get("Authorization").is_none());
    }

    #[actix_web::test]
    async fn test_guard_without_middleware_is_server_error() {
        let app = test::init_service(App::new().route("/login", web::post().to(login_alice))).await;

        let resp = test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
