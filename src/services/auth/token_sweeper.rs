//! 만료 토큰 정기 정리 작업
//!
//! `SweepConfig::interval_seconds()` 간격으로 [`AuthTokenContext::sweep_expired`]를 실행합니다.
//! 정리 실패는 로그만 남기고 다음 주기에 다시 시도합니다.

use std::time::Duration;
use actix_web::rt::task::JoinHandle;
use log::{debug, error, info};
use crate::services::auth::{AuthTokenContext, CredentialProvider};

pub struct TokenSweeper;

impl TokenSweeper {
    /// 정리 루프를 actix 런타임에 띄웁니다. 간격이 0이면 띄우지 않습니다.
    pub fn spawn<P: CredentialProvider>(context: AuthTokenContext<P>, interval_seconds: u64) -> Option<JoinHandle<()>> {
        if interval_seconds == 0 {
            info!("만료 토큰 정리 작업 비활성화");
            return None;
        }

        Some(actix_web::rt::spawn(Self::run(context, Duration::from_secs(interval_seconds))))
    }

    pub async fn run<P: CredentialProvider>(context: AuthTokenContext<P>, period: Duration) {
        info!("🧹 만료 토큰 정리 작업 시작 (주기: {}초)", period.as_secs());

        let mut interval = actix_web::rt::time::interval(period);
        loop {
            interval.tick().await;
            match context.sweep_expired().await {
                Ok(0) => debug!("정리할 만료 토큰 없음"),
                Ok(_) => {}
                Err(e) => error!("만료 토큰 정리 실패: {}", e),
            }
        }
    }
}
