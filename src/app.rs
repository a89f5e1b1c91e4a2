/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config 読み込み → 依存生成 (guest store, Core API client, login workflow)
 * - Router 組み立て + middleware 適用
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::{CacheBackend, Config},
    middleware::{http, security_headers},
    services::{
        core_api::CoreApiClient,
        guest::{CacheGuestStore, GuestStore},
        login::LoginService,
    },
    state::AppState,
    web,
};

fn init_tracing() {
    // RUST_LOG=info,spp_login=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash so it gets noticed. Production: keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        app_env = ?config.app_env,
        addr = %config.addr,
        maintenance_mode = config.maintenance_mode,
        "starting login front"
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let guests: Arc<dyn GuestStore> = match config.cache_backend {
        CacheBackend::Valkey => Arc::new(CacheGuestStore::connect(&config.valkey_url).await?),
        CacheBackend::Memory => {
            tracing::warn!("guest records kept in process memory");
            Arc::new(CacheGuestStore::in_memory())
        }
    };

    let core = Arc::new(CoreApiClient::new(&config.core_api)?);
    let login = Arc::new(LoginService::new(core));

    Ok(AppState::new(login, guests, config.empty_mail.clone())
        .with_maintenance_mode(config.maintenance_mode)
        .with_secure_cookies(config.app_env.is_production()))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .merge(web::routes(state.clone()))
        .with_state(state);

    let router = security_headers::apply(router);
    http::apply(
        router,
        config.request_body_limit_bytes,
        config.request_timeout,
    )
}
