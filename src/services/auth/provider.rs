//! 인증 주체와 자격 증명 공급자 인터페이스
//!
//! 토큰 엔진은 사용자 저장소를 직접 알지 못합니다.
//! 호스트가 [`CredentialProvider`]를 구현하여 주체 조회와 자격 증명 검증을 제공합니다.

use async_trait::async_trait;
use crate::errors::AppResult;

/// 토큰에 바인딩될 수 있는 인증 주체
pub trait Authenticatable {
    /// 토큰 레코드의 `auth_identifier`로 저장되는 불투명 식별자
    fn auth_identifier(&self) -> String;
}

/// 호스트가 제공하는 주체 조회/검증 기능
///
/// 조회 실패(`Ok(None)`)와 검증 실패(`Ok(false)`)는 정상 흐름이며,
/// `Err`는 저장소 장애로 취급되어 요청 전체가 실패합니다.
#[async_trait]
pub trait CredentialProvider: Send + Sync + 'static {
    type Principal: Authenticatable + Clone + Send + Sync + 'static;
    type Credentials: Send + Sync;

    /// 자격 증명(예: 이메일)으로 주체를 찾습니다. 비밀번호는 여기서 검증하지 않습니다.
    async fn retrieve_by_credentials(&self, credentials: &Self::Credentials) -> AppResult<Option<Self::Principal>>;

    /// 식별자로 주체를 찾습니다.
    async fn retrieve_by_id(&self, id: &str) -> AppResult<Option<Self::Principal>>;

    /// 주체와 자격 증명이 일치하는지 검증합니다.
    async fn validate_credentials(&self, principal: &Self::Principal, credentials: &Self::Credentials) -> AppResult<bool>;
}
