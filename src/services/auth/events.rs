//! 인증 이벤트
//!
//! 엔진은 생명주기 지점마다 [`AuthEvent`]를 등록된 리스너에게 동기적으로 전달합니다.
//! 리스너는 실패하지 않으며 엔진의 흐름을 바꾸지 않습니다.

use log::{debug, info, warn};
use crate::utils::string_utils::mask_secret;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// 자격 증명 검증 시도
    Attempting { remember: bool },
    /// 요청의 토큰으로 주체가 확인됨
    Authenticated { subject_id: String },
    /// 새 토큰 발급
    Login { subject_id: String, remember: bool },
    /// 자격 증명 검증 실패
    Failed { subject_id: Option<String> },
    /// 자격 증명 검증 성공 (로그인 없음)
    Validated { subject_id: String },
    Logout { subject_id: Option<String> },
    /// secret 교체
    TokenRefreshed { subject_id: String },
    /// 만료된 토큰 삭제
    TokenExpired { subject_id: String },
    /// 현재 세션을 제외한 모든 세션 폐기
    OtherDeviceLogout { subject_id: String, revoked: u64 },
}

pub trait AuthEventListener: Send + Sync {
    fn handle(&self, event: &AuthEvent);
}

/// 이벤트를 로그로 남기는 기본 리스너
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventListener;

impl AuthEventListener for LogEventListener {
    fn handle(&self, event: &AuthEvent) {
        match event {
            AuthEvent::Attempting { remember } => debug!("🔑 로그인 시도 (remember: {})", remember),
            AuthEvent::Authenticated { subject_id } => debug!("토큰 인증 성공: {}", mask_secret(subject_id)),
            AuthEvent::Login { subject_id, remember } => {
                info!("✅ 로그인: {} (remember: {})", mask_secret(subject_id), remember)
            }
            AuthEvent::Failed { subject_id } => match subject_id {
                Some(id) => warn!("❌ 로그인 실패: {}", mask_secret(id)),
                None => warn!("❌ 로그인 실패: 알 수 없는 사용자"),
            },
            AuthEvent::Validated { subject_id } => debug!("자격 증명 검증 성공: {}", mask_secret(subject_id)),
            AuthEvent::Logout { subject_id } => {
                info!("👋 로그아웃: {}", subject_id.as_deref().map(mask_secret).unwrap_or_default())
            }
            AuthEvent::TokenRefreshed { subject_id } => debug!("🔄 토큰 secret 교체: {}", mask_secret(subject_id)),
            AuthEvent::TokenExpired { subject_id } => info!("⌛ 만료된 토큰 삭제: {}", mask_secret(subject_id)),
            AuthEvent::OtherDeviceLogout { subject_id, revoked } => {
                info!("다른 기기 로그아웃: {} ({}개 토큰 폐기)", mask_secret(subject_id), revoked)
            }
        }
    }
}
