use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use ykk_shop_bot::{
    commands::Command,
    config::Config,
    handlers::OrderBot,
    server,
    services::{
        redis_service::RedisStateStore,
        state_store::{MemoryStateStore, StateStore},
    },
};

const PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();
    log::info!("🚀 Starting YKK Shop Bot...");

    let config = Config::from_env()?;
    let bot = Bot::new(&config.bot_token);

    let store = open_store(&config).await?;

    let me = bot.get_me().await?;
    log::info!("🤖 Authorized as @{}", me.username());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("⚠️ Could not register bot commands: {}", e);
    }
    register_webhook(&bot, &config).await?;

    let order_bot = OrderBot::new(
        Arc::new(bot.clone()),
        store,
        config.admin_chat_id,
        config.order_ttl,
    )
    .with_step_ttl(config.step_ttl)
    .with_bot_username(me.username());

    let app = server::router(Arc::new(order_bot), &config.webhook_path, config.ack_timeout);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("🌐 Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("👋 YKK Shop Bot stopped");
    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<dyn StateStore>> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisStateStore::connect(url).await?;
            log::info!("🗄 Pending orders are kept in Redis");
            Ok(Arc::new(store) as Arc<dyn StateStore>)
        }
        None => {
            let store = Arc::new(MemoryStateStore::new());
            let sweeper = store.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(PURGE_INTERVAL);
                loop {
                    ticker.tick().await;
                    let removed = sweeper.purge_expired().await;
                    if removed > 0 {
                        log::debug!("Purged {} expired pending orders", removed);
                    }
                }
            });
            log::info!("🗄 Pending orders are kept in memory");
            Ok(store as Arc<dyn StateStore>)
        }
    }
}

async fn register_webhook(bot: &Bot, config: &Config) -> Result<()> {
    bot.delete_webhook().await?;

    match config.webhook_url() {
        Some(full_url) => {
            bot.set_webhook(url::Url::parse(&full_url)?).await?;
            log::info!("🌐 Webhook set: {}", config.external_url.as_deref().unwrap_or_default());
        }
        None => log::warn!("⚠️ RENDER_EXTERNAL_URL is not set, webhook not registered!"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
