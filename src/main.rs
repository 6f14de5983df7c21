//! # TreloxBot Main Entry Point
//! 
//! Initializes logging, loads configuration, sets up the database,
//! starts the challenge scheduler, and runs the Telegram bot next to
//! the liveness HTTP server.

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::dispatching::dialogue::InMemStorage;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trelox_bot::bot::conversation::ConversationStorage;
use trelox_bot::bot::handlers::BotHandler;
use trelox_bot::config::Config;
use trelox_bot::database::connection::DatabaseManager;
use trelox_bot::services::health::HealthService;
use trelox_bot::services::notifier::TelegramNotifier;
use trelox_bot::services::scheduler::{SchedulerGateway, SchedulerService};
use trelox_bot::services::session_handlers::SessionHandlers;
use trelox_bot::utils::logging::log_system_event;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trelox_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    
    info!("Starting TreloxBot v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded - Database: {}, HTTP Port: {}, poll every {}s", 
        config.database_url, config.http_port, config.scheduler_poll_interval.as_secs());

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");
    
    let bot = Bot::new(&config.telegram_bot_token);
    
    // Event handlers and the durable scheduler behind them
    let session_handlers = SessionHandlers::new(db_arc.as_ref().clone(), TelegramNotifier::new(bot.clone()))
        .with_badge_policy(config.badge_policy);
    let gateway = SchedulerGateway::new(db_arc.as_ref().clone(), Arc::new(session_handlers))
        .with_handler_timeout(config.handler_timeout)
        .with_misfire_grace(config.misfire_grace);
    
    info!("Initializing scheduler service...");
    let mut scheduler_service = SchedulerService::new(gateway.clone(), config.scheduler_poll_interval)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create scheduler service: {}", e))?;
    
    scheduler_service.start()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start scheduler service: {}", e))?;
    log_system_event("scheduler started", None);
    
    let handler = BotHandler::new(db_arc.as_ref().clone(), gateway);
    
    let health_service = HealthService::new(db_arc.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;
    
    info!("Liveness server starting on port {}", config.http_port);
    
    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        let storage: ConversationStorage = InMemStorage::new();
        Dispatcher::builder(bot, handler.schema())
            .dependencies(dptree::deps![storage])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });
    
    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });
    
    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = health_task => {
            if let Err(e) = result2 {
                tracing::error!("Health task error: {}", e);
            }
        }
    }
    
    if let Err(e) = scheduler_service.stop().await {
        tracing::warn!("Error stopping scheduler service: {}", e);
    }
    
    log_system_event("application stopped", None);
    Ok(())
}
