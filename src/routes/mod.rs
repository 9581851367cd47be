//! API 라우트 설정 모듈
//!
//! 토큰 인증 엔드포인트와 헬스체크 엔드포인트를 등록합니다.
//!
//! # Auth Middleware Usage
//!
//! 인증 미들웨어는 스코프가 아니라 리소스 단위로 적용합니다.
//! 요청마다 엔진이 하나만 만들어져야 응답 자격 증명이 한 번만 기록되기 때문입니다.
//!
//! - 로그인/로그아웃: `Optional` (토큰이 없어도 진입)
//! - 현재 주체 조회/다른 기기 로그아웃: `Required` (주체가 없으면 401)
//!
//! # Examples
//!
//! ```rust,ignore
//! use actix_web::App;
//!
//! let app = App::new().configure(move |cfg| configure_all_routes(cfg, context.clone()));
//! ```

use actix_web::web;
use serde_json::json;
use crate::domain::dto::{LoginRequest, UserResponse};
use crate::handlers;
use crate::middlewares::AuthTokenMiddleware;
use crate::services::auth::{AuthTokenContext, CredentialProvider};

/// 모든 라우트를 설정합니다
///
/// # Arguments
///
/// * `cfg` - Actix-web 서비스 설정 객체
/// * `context` - 인증 미들웨어가 요청마다 엔진을 만들 때 사용하는 공유 구성
pub fn configure_all_routes<P>(cfg: &mut web::ServiceConfig, context: AuthTokenContext<P>)
where
    P: CredentialProvider<Credentials = LoginRequest>,
    P::Principal: Into<UserResponse>,
{
    // Health check endpoint
    cfg.service(health_check);

    configure_auth_routes(cfg, context);
}

/// 인증 관련 라우트를 설정합니다
///
/// # Available Routes
///
/// - `POST /api/v1/auth/login` - 이메일/비밀번호 로그인
/// - `POST /api/v1/auth/logout` - 현재 토큰 폐기
/// - `POST /api/v1/auth/logout-others` - 다른 기기의 토큰 폐기 (인증 필요)
/// - `GET /api/v1/auth/me` - 현재 주체 조회 (인증 필요)
///
/// # Examples
///
/// ```bash
/// # 로그인: 응답의 Authorization 헤더 값이 자격 증명입니다
/// curl -i -X POST http://localhost:8080/api/v1/auth/login \
///   -H "Content-Type: application/json" \
///   -d '{"email":"user@example.com","password":"password123","remember":false}'
///
/// # 인증된 요청: 응답마다 갱신된 자격 증명이 돌아올 수 있습니다
/// curl -i http://localhost:8080/api/v1/auth/me -H "Authorization: Bearer <credential>"
/// ```
fn configure_auth_routes<P>(cfg: &mut web::ServiceConfig, context: AuthTokenContext<P>)
where
    P: CredentialProvider<Credentials = LoginRequest>,
    P::Principal: Into<UserResponse>,
{
    cfg.service(
        web::scope("/api/v1/auth")
            .service(
                web::resource("/login")
                    .wrap(AuthTokenMiddleware::optional(context.clone()))
                    .route(web::post().to(handlers::auth::login::<P>)),
            )
            .service(
                web::resource("/logout")
                    .wrap(AuthTokenMiddleware::optional(context.clone()))
                    .route(web::post().to(handlers::auth::logout::<P>)),
            )
            .service(
                web::resource("/logout-others")
                    .wrap(AuthTokenMiddleware::required(context.clone()))
                    .route(web::post().to(handlers::auth::logout_other_devices::<P>)),
            )
            .service(
                web::resource("/me")
                    .wrap(AuthTokenMiddleware::required(context))
                    .route(web::get().to(handlers::auth::me::<P>)),
            ),
    );
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// ```bash
/// curl http://localhost:8080/health
/// ```
#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "auth_token_service",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "features": {
            "database": "MongoDB",
            "cache": "Redis",
            "token": "opaque bearer"
        }
    }))
}
