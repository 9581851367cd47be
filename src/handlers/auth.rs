//! Authentication HTTP Handlers
//!
//! 토큰 엔진을 조작하는 HTTP 엔드포인트입니다. 핸들러는 엔진 상태만 바꾸고,
//! 새 자격 증명(또는 삭제 지시)은 [`AuthTokenMiddleware`](crate::middlewares::AuthTokenMiddleware)가
//! 응답 시점에 헤더와 쿠키로 기록합니다.
//!
//! # Endpoints
//!
//! - `POST /api/v1/auth/login` - 이메일/비밀번호 로그인
//! - `POST /api/v1/auth/logout` - 현재 토큰 폐기
//! - `POST /api/v1/auth/logout-others` - 현재 세션을 제외한 모든 토큰 폐기
//! - `GET /api/v1/auth/me` - 현재 주체 조회
use actix_web::{web, HttpResponse};
use log::info;
use serde_json::json;
use validator::Validate;
use crate::domain::dto::{LoginRequest, UserResponse};
use crate::domain::models::auth::Authenticated;
use crate::errors::AppError;
use crate::middlewares::AuthGuard;
use crate::services::auth::{Authenticatable, CredentialProvider};
use crate::utils::string_utils::mask_secret;

/// 로컬 로그인 핸들러
///
/// 자격 증명이 맞으면 새 토큰을 발급합니다. `remember` 가 true 이면 만료되지 않는 토큰입니다.
///
/// # Endpoint
/// `POST /api/v1/auth/login`
pub async fn login<P>(
    guard: AuthGuard<P>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError>
where
    P: CredentialProvider<Credentials = LoginRequest>,
    P::Principal: Into<UserResponse>,
{
    // 유효성 검사
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let mut guard = guard.lock().await;
    if !guard.attempt(&payload, payload.remember).await? {
        return Err(AppError::AuthenticationError("이메일 또는 비밀번호가 올바르지 않습니다".to_string()));
    }

    let user = guard.user().await?
        .ok_or_else(|| AppError::InternalError("로그인 직후 주체가 없습니다".to_string()))?;

    info!("🔑 로그인 성공 - 사용자: {}, remember: {}", mask_secret(&user.auth_identifier()), payload.remember);

    let user: UserResponse = user.into();
    Ok(HttpResponse::Ok().json(json!({
        "user": user,
        "remember": payload.remember,
    })))
}

/// 로그아웃 핸들러
///
/// 현재 토큰을 저장소에서 삭제하고, 응답에서 클라이언트 자격 증명을 지웁니다.
/// 토큰이 없는 요청도 성공으로 처리합니다.
///
/// # Endpoint
/// `POST /api/v1/auth/logout`
pub async fn logout<P: CredentialProvider>(guard: AuthGuard<P>) -> Result<HttpResponse, AppError> {
    guard.lock().await.logout().await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "로그아웃되었습니다"
    })))
}

/// 다른 기기 로그아웃 핸들러
///
/// 현재 주체의 모든 토큰을 폐기하고 현재 세션에는 새 토큰을 발급합니다.
///
/// # Endpoint
/// `POST /api/v1/auth/logout-others`
pub async fn logout_other_devices<P: CredentialProvider>(
    guard: AuthGuard<P>,
) -> Result<HttpResponse, AppError> {
    let revoked = guard.lock().await.logout_other_devices().await?;

    Ok(HttpResponse::Ok().json(json!({
        "revoked": revoked
    })))
}

/// 현재 주체 조회 핸들러
///
/// # Endpoint
/// `GET /api/v1/auth/me`
pub async fn me<P>(
    guard: AuthGuard<P>,
    user: Authenticated<P::Principal>,
) -> Result<HttpResponse, AppError>
where
    P: CredentialProvider,
    P::Principal: Into<UserResponse>,
{
    let via_remember = guard.lock().await.via_remember();
    let user: UserResponse = user.into_inner().into();

    Ok(HttpResponse::Ok().json(json!({
        "user": user,
        "via_remember": via_remember,
    })))
}
