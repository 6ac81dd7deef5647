//! Process wiring: storage, stores, handler chain, webhook registration,
//! and the HTTP server with graceful shutdown.

pub mod server;

pub use server::{AppState, build_app};

use std::{str::FromStr, sync::Arc, time::Duration};

use {
    sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    tracing::{error, info},
    waggle_common::Notifier,
    waggle_config::WaggleConfig,
    waggle_dispatch::Dispatcher,
    waggle_flow::{FlowContext, default_handlers},
    waggle_orders::{OrderService, SqliteOrderMirror, run_migrations},
    waggle_sessions::{SWEEP_INTERVAL, SessionStore},
    waggle_telegram::{TelegramNotifier, make_bot, register_webhook, remove_webhook},
};

/// Run the gateway until interrupted.
pub async fn run(config: WaggleConfig) -> anyhow::Result<()> {
    if !config.telegram.token_configured() {
        anyhow::bail!("telegram.token is not configured");
    }
    let config = Arc::new(config);

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.storage.path))?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    info!(path = %config.storage.path, "order mirror ready");

    let orders = Arc::new(OrderService::with_mirror(Arc::new(SqliteOrderMirror::new(
        pool.clone(),
    ))));
    let sessions = Arc::new(SessionStore::new());
    let sweeper = sessions.spawn_sweeper(SWEEP_INTERVAL);

    let bot = make_bot(&config.telegram.token);
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(bot.clone()));

    let ctx = FlowContext {
        sessions,
        orders,
        notifier,
        config: config.clone(),
    };
    let dispatcher = Arc::new(Dispatcher::new(default_handlers(&ctx)));

    let webhook_registered = !config.telegram.webhook_url.is_empty();
    if webhook_registered {
        let public_url = format!(
            "{}{}",
            config.telegram.webhook_url.trim_end_matches('/'),
            config.telegram.webhook_path
        );
        let secret =
            (!config.telegram.secret_token.is_empty()).then_some(config.telegram.secret_token.as_str());
        register_webhook(&bot, &public_url, secret).await?;
    }

    let state = AppState {
        dispatcher,
        secret_token: config.telegram.secret_token.as_str().into(),
    };
    let app = build_app(state, &config.telegram.webhook_path);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, path = %config.telegram.webhook_path, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    sweeper.cancel();
    if webhook_registered {
        if let Err(e) = remove_webhook(&bot).await {
            error!(error = %e, "failed to remove webhook");
        }
    }
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
