//! 토큰 생명주기 엔진
//!
//! 요청 하나에 [`AuthTokenGuard`] 하나를 만듭니다. 엔진은 요청 동안
//! 토큰을 한 번만 해석하여 캐시하고, 응답 시점의 [`AuthTokenGuard::emit_credential`]에서만
//! 저장소에 씁니다.
//!
//! ## 토큰 해석 상태
//!
//! ```text
//! Unresolved ──▶ Absent   (자격 증명 없음)
//!            ├─▶ Invalid  (복호화 실패 / 레코드 없음 / 만료 / 주체 없음)
//!            └─▶ Valid    (refresh 대상이면 secret 이 메모리에서 교체된 상태)
//! ```
//!
//! Absent 와 Invalid 는 호출자에게 모두 "인증되지 않음"으로 보입니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! let mut guard = context.guard_for(&http_request);
//!
//! if guard.attempt(&credentials, remember).await? {
//!     // 새 토큰은 응답 시점에 저장됩니다
//! }
//!
//! guard.emit_credential(&mut response).await?;
//! ```

use log::{debug, warn};
use crate::domain::models::token::TokenRecord;
use crate::errors::{AppError, AppResult};
use crate::repositories::tokens::SaveOutcome;
use crate::services::auth::{
    AuthEvent, AuthTokenContext, Authenticatable, CredentialCookie, CredentialProvider, CredentialSink,
    RequestCredentials,
};
use crate::utils::string_utils::mask_secret;

/// 요청 단위 토큰 해석 결과
#[derive(Debug, Clone, PartialEq)]
pub enum TokenResolution {
    Unresolved,
    Absent,
    Invalid,
    Valid(TokenRecord),
}

impl TokenResolution {
    pub fn record(&self) -> Option<&TokenRecord> {
        match self {
            TokenResolution::Valid(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, TokenResolution::Unresolved)
    }
}

/// 요청 단위 토큰 인증 엔진
pub struct AuthTokenGuard<P: CredentialProvider> {
    context: AuthTokenContext<P>,
    request: RequestCredentials,
    resolution: TokenResolution,
    user: Option<P::Principal>,
    /// 주체 해석이 끝났는지 (결과가 None 이어도 true)
    user_resolved: bool,
    last_attempted: Option<P::Principal>,
    via_remember: bool,
}

impl<P: CredentialProvider> AuthTokenGuard<P> {
    pub fn new(context: AuthTokenContext<P>, request: RequestCredentials) -> Self {
        Self {
            context,
            request,
            resolution: TokenResolution::Unresolved,
            user: None,
            user_resolved: false,
            last_attempted: None,
            via_remember: false,
        }
    }

    pub fn request(&self) -> &RequestCredentials {
        &self.request
    }

    pub fn resolution(&self) -> &TokenResolution {
        &self.resolution
    }

    /// 요청의 자격 증명으로 주체를 해석합니다. 요청 동안 한 번만 수행됩니다.
    ///
    /// 복호화/조회 실패와 만료는 `Ok(None)`이며, 저장소 오류만 `Err`입니다.
    pub async fn resolve_from_request(&mut self) -> AppResult<Option<P::Principal>> {
        if self.user_resolved {
            return Ok(self.user.clone());
        }
        self.user_resolved = true;

        let (subject_id, remember) = match self.ensure_token().await? {
            Some(record) => (record.subject_id.clone(), record.remember),
            None => return Ok(None),
        };

        match self.context.provider().retrieve_by_id(&subject_id).await? {
            Some(principal) => {
                self.via_remember = remember;
                self.user = Some(principal);
                self.context.dispatch(AuthEvent::Authenticated { subject_id });
            }
            None => {
                debug!("토큰의 주체를 찾을 수 없습니다: {}", mask_secret(&subject_id));
                self.resolution = TokenResolution::Invalid;
            }
        }

        Ok(self.user.clone())
    }

    /// 현재 주체 (필요하면 요청 토큰을 해석)
    pub async fn user(&mut self) -> AppResult<Option<P::Principal>> {
        self.resolve_from_request().await
    }

    pub async fn id(&mut self) -> AppResult<Option<String>> {
        Ok(self.user().await?.map(|user| user.auth_identifier()))
    }

    pub async fn check(&mut self) -> AppResult<bool> {
        Ok(self.user().await?.is_some())
    }

    pub async fn guest(&mut self) -> AppResult<bool> {
        Ok(!self.check().await?)
    }

    /// 토큰 해석 없이 이미 확인된 주체가 있는지
    pub fn has_user(&self) -> bool {
        self.user.is_some()
    }

    /// 현재 요청의 주체를 지정합니다. 토큰은 발급하지 않습니다.
    pub fn set_user(&mut self, principal: P::Principal) {
        self.user = Some(principal);
        self.user_resolved = true;
    }

    /// 새 토큰을 발급하고 주체를 인증 상태로 만듭니다.
    ///
    /// 저장은 `emit_credential` 에서 이루어집니다.
    pub fn login(&mut self, principal: P::Principal, remember: bool) {
        let subject_id = principal.auth_identifier();
        let record = TokenRecord::issue(
            subject_id.clone(),
            remember,
            self.context.crypto(),
            self.context.clock().now(),
        );

        self.resolution = TokenResolution::Valid(record);
        self.via_remember = false;
        self.set_user(principal);
        self.context.dispatch(AuthEvent::Login { subject_id, remember });
    }

    pub async fn login_using_id(&mut self, id: &str, remember: bool) -> AppResult<Option<P::Principal>> {
        let principal = self.context.provider().retrieve_by_id(id).await?;
        if let Some(principal) = &principal {
            self.login(principal.clone(), remember);
        }
        Ok(principal)
    }

    /// 자격 증명을 검증하고 성공하면 로그인합니다.
    ///
    /// "주체 없음"과 "자격 증명 불일치"는 모두 `Ok(false)`입니다.
    pub async fn attempt(&mut self, credentials: &P::Credentials, remember: bool) -> AppResult<bool> {
        self.context.dispatch(AuthEvent::Attempting { remember });

        let principal = self.context.provider().retrieve_by_credentials(credentials).await?;
        self.last_attempted = principal.clone();

        let Some(principal) = principal else {
            self.context.dispatch(AuthEvent::Failed { subject_id: None });
            return Ok(false);
        };

        if self.context.provider().validate_credentials(&principal, credentials).await? {
            self.login(principal, remember);
            return Ok(true);
        }

        self.context.dispatch(AuthEvent::Failed { subject_id: Some(principal.auth_identifier()) });
        Ok(false)
    }

    /// 자격 증명만 검증합니다. 로그인하지 않습니다.
    pub async fn validate(&mut self, credentials: &P::Credentials) -> AppResult<bool> {
        let principal = self.context.provider().retrieve_by_credentials(credentials).await?;
        self.last_attempted = principal.clone();

        let Some(principal) = principal else {
            return Ok(false);
        };

        let valid = self.context.provider().validate_credentials(&principal, credentials).await?;
        if valid {
            self.context.dispatch(AuthEvent::Validated { subject_id: principal.auth_identifier() });
        }
        Ok(valid)
    }

    /// 이번 요청에서만 인증합니다. 토큰을 발급하지 않습니다.
    pub async fn once(&mut self, credentials: &P::Credentials) -> AppResult<bool> {
        if !self.validate(credentials).await? {
            return Ok(false);
        }
        if let Some(principal) = self.last_attempted.clone() {
            self.set_user(principal);
        }
        Ok(true)
    }

    pub async fn once_using_id(&mut self, id: &str) -> AppResult<Option<P::Principal>> {
        let principal = self.context.provider().retrieve_by_id(id).await?;
        if let Some(principal) = &principal {
            self.set_user(principal.clone());
        }
        Ok(principal)
    }

    /// 현재 주체가 remember 토큰으로 인증되었는지
    pub fn via_remember(&self) -> bool {
        self.via_remember
    }

    /// 마지막 `attempt`/`validate` 에서 조회된 주체
    pub fn last_attempted(&self) -> Option<&P::Principal> {
        self.last_attempted.as_ref()
    }

    /// 현재 토큰을 저장소에서 삭제하고 인증 상태를 지웁니다.
    ///
    /// 토큰이 없거나 저장된 적이 없으면 아무것도 삭제하지 않습니다.
    pub async fn logout(&mut self) -> AppResult<()> {
        let mut subject_id = self.user.as_ref().map(|user| user.auth_identifier());

        let record = self.ensure_token().await?.cloned();
        if let Some(record) = record {
            if record.exists() {
                self.context.store().delete(&record).await?;
            }
            subject_id = subject_id.or(Some(record.subject_id));
        }

        self.resolution = TokenResolution::Absent;
        self.user = None;
        self.user_resolved = true;
        self.via_remember = false;
        self.context.dispatch(AuthEvent::Logout { subject_id });
        Ok(())
    }

    /// 현재 주체의 다른 모든 토큰을 폐기하고, 현재 세션에는 새 토큰을 발급합니다.
    ///
    /// 폐기된 레코드 수를 반환합니다. 인증되지 않은 요청이면 `AuthenticationError`.
    pub async fn logout_other_devices(&mut self) -> AppResult<u64> {
        let Some(principal) = self.resolve_from_request().await? else {
            return Err(AppError::AuthenticationError("인증되지 않은 요청입니다".to_string()));
        };

        let subject_id = principal.auth_identifier();
        let remember = self.resolution.record().is_some_and(|record| record.remember);
        let revoked = self.context.store().delete_by_subject(&subject_id).await?;

        let record = TokenRecord::issue(
            subject_id.clone(),
            remember,
            self.context.crypto(),
            self.context.clock().now(),
        );
        self.resolution = TokenResolution::Valid(record);
        self.context.dispatch(AuthEvent::OtherDeviceLogout { subject_id, revoked });
        Ok(revoked)
    }

    /// 현재 요청의 토큰 레코드
    pub async fn user_token(&mut self) -> AppResult<Option<&TokenRecord>> {
        self.ensure_token().await
    }

    /// 응답에 자격 증명을 기록하고, secret 이 바뀌었으면 저장합니다.
    ///
    /// - 두 채널이 모두 비활성화되어 있으면 아무것도 하지 않습니다.
    /// - 토큰이 없고 요청도 자격 증명을 제시하지 않았으면 아무것도 하지 않습니다.
    /// - 다른 요청이 먼저 같은 토큰을 교체했으면(`SaveOutcome::Conflict`) 아무것도 보내지 않습니다.
    ///
    /// 저장소 오류는 그대로 반환됩니다.
    pub async fn emit_credential(&mut self, sink: &mut impl CredentialSink) -> AppResult<()> {
        // 전달 채널이 없으면 제시될 수 없는 토큰이므로 저장하지 않습니다
        if self.context.config().token_field.is_disabled() {
            return Ok(());
        }

        self.ensure_token().await?;

        if let TokenResolution::Valid(record) = &mut self.resolution {
            if record.changed() && self.context.store().save(record).await? == SaveOutcome::Conflict {
                warn!(
                    "다른 요청이 토큰을 먼저 교체하여 자격 증명을 보내지 않습니다: {}",
                    mask_secret(&record.subject_id)
                );
                return Ok(());
            }
        }

        let (credential, remember) = match self.resolution.record() {
            Some(record) => (record.encode_credential(self.context.crypto()), record.remember),
            None => (None, false),
        };

        if credential.is_none() && !self.request.presented() {
            return Ok(());
        }

        let config = self.context.config();
        let value = credential.unwrap_or_default();

        if let Some(header) = &config.token_field.header {
            sink.set_header(header, &value)?;
        }

        if let Some(cookie_name) = &config.token_field.cookie {
            let policy = if value.is_empty() {
                CredentialCookie::Forget
            } else if remember {
                CredentialCookie::Forever(value)
            } else {
                CredentialCookie::Session { value, max_age_seconds: config.lifetime.expired }
            };
            sink.set_cookie(policy.into_cookie(cookie_name, &config.cookie))?;
        }

        Ok(())
    }

    async fn ensure_token(&mut self) -> AppResult<Option<&TokenRecord>> {
        if self.resolution.is_unresolved() {
            self.resolution = self.load_token().await?;
        }
        Ok(self.resolution.record())
    }

    async fn load_token(&self) -> AppResult<TokenResolution> {
        let Some(raw) = self.request.raw_credential() else {
            return Ok(TokenResolution::Absent);
        };

        let Some(payload) = self.context.crypto().decode(&raw) else {
            warn!("자격 증명을 복호화할 수 없습니다 (길이: {})", raw.len());
            return Ok(TokenResolution::Invalid);
        };

        let store = self.context.store();
        let Some(mut record) = store.find(&payload.auth_identifier, &payload.token).await? else {
            debug!("일치하는 토큰 레코드가 없습니다: {}", mask_secret(&payload.auth_identifier));
            return Ok(TokenResolution::Invalid);
        };

        let lifetime = self.context.config().lifetime;
        let now = self.context.clock().now();

        if record.is_expired(&lifetime, now) {
            store.delete(&record).await?;
            self.context.dispatch(AuthEvent::TokenExpired { subject_id: record.subject_id });
            return Ok(TokenResolution::Invalid);
        }

        if record.needs_refresh(&lifetime, now) {
            record.regenerate_secret(self.context.crypto(), now);
            self.context.dispatch(AuthEvent::TokenRefreshed { subject_id: record.subject_id.clone() });
        }

        Ok(TokenResolution::Valid(record))
    }
}
