//! 엔진 테스트용 공급자, 리스너, 조립 도우미

use std::sync::{Arc, Mutex, RwLock};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use crate::config::AuthTokenConfig;
use crate::crypto::{AppKey, TokenCrypto};
use crate::domain::dto::{LoginRequest, UserResponse};
use crate::errors::AppResult;
use crate::repositories::tokens::MemoryTokenStore;
use crate::services::auth::{
    AuthEvent, AuthEventListener, AuthTokenContext, AuthTokenGuard, Authenticatable, CredentialProvider,
    RecordingSink, RequestCredentials,
};
use crate::utils::clock::ManualClock;

#[derive(Debug, Clone, PartialEq)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub password: String,
}

impl From<TestUser> for UserResponse {
    fn from(user: TestUser) -> Self {
        Self { id: user.id, display_name: user.email.clone(), email: user.email, roles: Vec::new() }
    }
}

impl Authenticatable for TestUser {
    fn auth_identifier(&self) -> String {
        self.id.clone()
    }
}

pub fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest { email: email.to_string(), password: password.to_string(), remember: false }
}

#[derive(Default)]
pub struct TestUserProvider {
    users: RwLock<Vec<TestUser>>,
}

impl TestUserProvider {
    pub fn with_users(users: Vec<TestUser>) -> Self {
        Self { users: RwLock::new(users) }
    }

    pub fn remove(&self, id: &str) {
        self.users.write().unwrap().retain(|u| u.id != id);
    }
}

#[async_trait]
impl CredentialProvider for TestUserProvider {
    type Principal = TestUser;
    type Credentials = LoginRequest;

    async fn retrieve_by_credentials(&self, credentials: &LoginRequest) -> AppResult<Option<TestUser>> {
        Ok(self.users.read().unwrap().iter().find(|u| u.email == credentials.email).cloned())
    }

    async fn retrieve_by_id(&self, id: &str) -> AppResult<Option<TestUser>> {
        Ok(self.users.read().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn validate_credentials(&self, principal: &TestUser, credentials: &LoginRequest) -> AppResult<bool> {
        Ok(principal.password == credentials.password)
    }
}

#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<AuthEvent>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<AuthEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuthEventListener for RecordingListener {
    fn handle(&self, event: &AuthEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// 메모리 저장소와 수동 시계로 조립한 엔진
pub struct Harness {
    pub context: AuthTokenContext<TestUserProvider>,
    pub provider: Arc<TestUserProvider>,
    pub store: Arc<MemoryTokenStore>,
    pub clock: Arc<ManualClock>,
    pub listener: Arc<RecordingListener>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(AuthTokenConfig::default())
    }

    pub fn with_lifetime(expired: u64, refresh: u64) -> Self {
        Self::with_config(AuthTokenConfig::default().with_lifetime(expired, refresh))
    }

    pub fn with_config(config: AuthTokenConfig) -> Self {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let store = Arc::new(MemoryTokenStore::with_clock(clock.clone()));
        let provider = Arc::new(TestUserProvider::with_users(vec![Self::alice_user()]));
        let listener = Arc::new(RecordingListener::default());
        let crypto = Arc::new(TokenCrypto::new(AppKey::from_bytes([42u8; 32])));

        let context = AuthTokenContext::new(provider.clone(), store.clone(), crypto, config)
            .with_clock(clock.clone())
            .with_listener(listener.clone());

        Self { context, provider, store, clock, listener }
    }

    fn alice_user() -> TestUser {
        TestUser {
            id: "64b7f0c2a1b2c3d4e5f60718".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    pub fn alice(&self) -> TestUser {
        Self::alice_user()
    }

    pub fn alice_credentials(&self) -> LoginRequest {
        login_request("alice@example.com", "secret")
    }

    pub fn anonymous_guard(&self) -> AuthTokenGuard<TestUserProvider> {
        self.context.guard(RequestCredentials::anonymous(&self.context.config().token_field))
    }

    pub fn guard_with_header(&self, credential: &str) -> AuthTokenGuard<TestUserProvider> {
        self.context.guard(
            RequestCredentials::anonymous(&self.context.config().token_field)
                .with_header("Authorization", credential),
        )
    }

    pub fn guard_with_cookie(&self, credential: &str) -> AuthTokenGuard<TestUserProvider> {
        self.context.guard(
            RequestCredentials::anonymous(&self.context.config().token_field)
                .with_cookie("X-Auth-Token", credential),
        )
    }

    /// 로그인 후 응답을 내보내고, 응답 헤더의 자격 증명을 반환합니다.
    pub async fn login_and_emit(&self, user: &TestUser, remember: bool) -> String {
        let mut guard = self.anonymous_guard();
        guard.login(user.clone(), remember);

        let mut sink = RecordingSink::default();
        guard.emit_credential(&mut sink).await.unwrap();
        sink.header("Authorization").unwrap().to_string()
    }
}
