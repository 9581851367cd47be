//! 토큰 인증 서비스 메인 애플리케이션
//!
//! Actix-web 기반의 HTTP 서버를 구동하고 토큰 엔진을 조립합니다.
//! MongoDB 사용자 공급자와 설정된 토큰 저장소(MongoDB/Redis/메모리)를 연결합니다.

use std::sync::Arc;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, App, HttpServer};
use actix_governor::{Governor, GovernorConfigBuilder};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};
use auth_token_service::caching::redis::RedisClient;
use auth_token_service::config::{
    AppKeyConfig, AuthTokenConfig, RateLimitConfig, ServerConfig, SweepConfig, TokenStoreKind,
};
use auth_token_service::crypto::TokenCrypto;
use auth_token_service::db::Database;
use auth_token_service::repositories::tokens::{
    MemoryTokenStore, MongoTokenRepository, RedisTokenRepository, TokenStore,
};
use auth_token_service::repositories::users::UserRepository;
use auth_token_service::routes::configure_all_routes;
use auth_token_service::services::auth::{AuthTokenContext, LogEventListener, TokenSweeper};
use auth_token_service::services::users::MongoUserProvider;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 토큰 인증 서비스 시작중...");

    let token_config = AuthTokenConfig::from_env();
    let app_key = AppKeyConfig::load().map_err(std::io::Error::other)?;

    // 데이터 스토어 초기화
    let database = initialize_database().await?;
    let token_store = initialize_token_store(database.clone()).await?;

    let user_repo = Arc::new(UserRepository::new(database));
    user_repo.create_indexes().await.map_err(std::io::Error::other)?;

    let context = AuthTokenContext::new(
        Arc::new(MongoUserProvider::new(user_repo)),
        token_store,
        Arc::new(TokenCrypto::new(app_key)),
        token_config,
    )
    .with_listener(Arc::new(LogEventListener));

    info!("✅ 토큰 엔진 초기화 완료");

    let _sweeper = TokenSweeper::spawn(context.clone(), SweepConfig::interval_seconds());

    // HTTP 서버 시작
    start_http_server(context).await
}

/// HTTP 서버를 구성하고 실행합니다
///
/// CORS, 로깅, 경로 정규화, Rate Limiting 미들웨어를 포함합니다.
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server(context: AuthTokenContext<MongoUserProvider>) -> std::io::Result<()> {
    let bind_address = ServerConfig::bind_address();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);

    // Rate Limiting 설정
    let rate_limit_config = RateLimitConfig::from_env();
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit_config.per_second)
        .burst_size(rate_limit_config.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| std::io::Error::other("잘못된 Rate Limiting 설정"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit_config.per_second,
        rate_limit_config.burst_size
    );

    let exposed_header = context.config().token_field.header.clone();

    HttpServer::new(move || {
        let context = context.clone();

        App::new()
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors(exposed_header.as_deref()))
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())

            // 라우트 설정
            .configure(move |cfg| configure_all_routes(cfg, context))
    })
        .bind(bind_address)?
        .workers(4) // 워커 스레드 수
        .run()
        .await
}

/// 환경별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            // 기본 .env 파일 로드
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// * `RUST_LOG` - 로깅 레벨 설정 (기본값: "info,actix_web=info")
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=info"));
}

async fn initialize_database() -> std::io::Result<Arc<Database>> {
    info!("📡 데이터베이스 연결 중...");

    let database = Database::new().await.map_err(|e| {
        error!("데이터베이스 연결 실패: {}", e);
        std::io::Error::other(e)
    })?;

    Ok(Arc::new(database))
}

/// `AUTH_TOKEN_STORE` 에 따라 토큰 저장소를 만듭니다
async fn initialize_token_store(database: Arc<Database>) -> std::io::Result<Arc<dyn TokenStore>> {
    match TokenStoreKind::from_env() {
        TokenStoreKind::Mongo => {
            let repo = MongoTokenRepository::new(database);
            repo.create_indexes().await.map_err(std::io::Error::other)?;
            info!("🗄️ 토큰 저장소: MongoDB");
            Ok(Arc::new(repo))
        }
        TokenStoreKind::Redis => {
            let redis = RedisClient::new().await.map_err(|e| {
                error!("Redis 연결 실패: {}", e);
                std::io::Error::other(e)
            })?;
            info!("🗄️ 토큰 저장소: Redis");
            Ok(Arc::new(RedisTokenRepository::new(Arc::new(redis))))
        }
        TokenStoreKind::Memory => {
            warn!("토큰 저장소: 메모리 (재시작 시 모든 세션이 사라집니다)");
            Ok(Arc::new(MemoryTokenStore::new()))
        }
    }
}

/// CORS 설정을 구성합니다
///
/// 브라우저 클라이언트가 갱신된 자격 증명을 읽을 수 있도록 토큰 헤더를 노출합니다.
fn configure_cors(exposed_header: Option<&str>) -> Cors {
    let cors = Cors::default()
        // 허용할 Origin 설정
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://127.0.0.1:3000")
        .allowed_origin("http://localhost:8080")
        .allowed_origin("http://127.0.0.1:8080")

        // 허용할 HTTP 메서드
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])

        // 허용할 헤더
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])

        // 자격 증명(쿠키 등) 지원
        .supports_credentials()

        // Preflight 요청 캐시 시간 (초)
        .max_age(3600);

    match exposed_header {
        Some(name) => cors.allowed_header(name).expose_headers([name]),
        None => cors,
    }
}
