//! 요청 간에 공유되는 엔진 구성 요소
//!
//! [`AuthTokenContext`]는 불변 협력자(공급자, 저장소, 암호기, 설정, 시계, 리스너)를 묶어
//! 요청마다 새 [`AuthTokenGuard`]를 만듭니다. 요청 간 가변 상태는 없습니다.

use std::sync::Arc;
use log::info;
use crate::config::AuthTokenConfig;
use crate::crypto::TokenCrypto;
use crate::errors::AppResult;
use crate::repositories::tokens::TokenStore;
use crate::services::auth::{
    AuthEvent, AuthEventListener, AuthTokenGuard, CredentialProvider, CredentialSource, RequestCredentials,
};
use crate::utils::clock::{Clock, SystemClock};

pub struct AuthTokenContext<P: CredentialProvider> {
    provider: Arc<P>,
    store: Arc<dyn TokenStore>,
    crypto: Arc<TokenCrypto>,
    config: Arc<AuthTokenConfig>,
    clock: Arc<dyn Clock>,
    listeners: Vec<Arc<dyn AuthEventListener>>,
}

impl<P: CredentialProvider> Clone for AuthTokenContext<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            store: self.store.clone(),
            crypto: self.crypto.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<P: CredentialProvider> AuthTokenContext<P> {
    pub fn new(
        provider: Arc<P>,
        store: Arc<dyn TokenStore>,
        crypto: Arc<TokenCrypto>,
        config: AuthTokenConfig,
    ) -> Self {
        Self {
            provider,
            store,
            crypto,
            config: Arc::new(config),
            clock: Arc::new(SystemClock),
            listeners: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn AuthEventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &dyn TokenStore {
        self.store.as_ref()
    }

    pub fn crypto(&self) -> &TokenCrypto {
        &self.crypto
    }

    pub fn config(&self) -> &AuthTokenConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// 캡처된 요청 자격 증명으로 요청 단위 엔진을 만듭니다.
    pub fn guard(&self, request: RequestCredentials) -> AuthTokenGuard<P> {
        AuthTokenGuard::new(self.clone(), request)
    }

    /// 요청에서 설정된 채널 값을 캡처하여 엔진을 만듭니다.
    pub fn guard_for(&self, source: &impl CredentialSource) -> AuthTokenGuard<P> {
        self.guard(RequestCredentials::capture(source, &self.config.token_field))
    }

    /// `lifetime.expired` 보다 오래 사용되지 않은 비-remember 토큰을 삭제합니다.
    pub async fn sweep_expired(&self) -> AppResult<u64> {
        let deleted = self.store.delete_expired(self.config.lifetime.expired).await?;
        if deleted > 0 {
            info!("🧹 만료 토큰 {}개 정리", deleted);
        }
        Ok(deleted)
    }

    pub(crate) fn dispatch(&self, event: AuthEvent) {
        for listener in &self.listeners {
            listener.handle(&event);
        }
    }
}
