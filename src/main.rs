//! # Eco Bot Main Entry Point
//!
//! Initializes logging, loads configuration, opens the database and the user
//! store, authenticates with Telegram, starts the alert service and the
//! health server, then runs the bot until shutdown.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eco_bot::bot::commands::Command;
use eco_bot::bot::engine::ConversationEngine;
use eco_bot::bot::handlers::BotHandler;
use eco_bot::bot::transport::{TelegramTransport, Transport};
use eco_bot::config::Config;
use eco_bot::database::connection::DatabaseManager;
use eco_bot::services::alerts::AlertService;
use eco_bot::services::environment::{EnvironmentClient, OpenWeatherClient};
use eco_bot::services::health::HealthService;
use eco_bot::services::user_store::UserStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eco_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Eco Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded - Database: {}, HTTP Port: {}",
        config.database_url, config.http_port);

    // Initialize database and user store
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);

    let store = Arc::new(UserStore::new(db_arc.as_ref().clone()));
    store.load(Some(config.legacy_data_file.as_path())).await?;
    info!("User store initialized successfully");

    // Authenticate with Telegram; a bad token is the one fatal error.
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let me = bot
        .get_me()
        .await
        .map_err(|e| anyhow!("Failed to authenticate with Telegram: {}", e))?;
    info!("Authorized as @{}", me.username());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }

    let environment: Arc<dyn EnvironmentClient> = Arc::new(
        OpenWeatherClient::new(
            config.openweather_api_key.clone(),
            config.weather_country_code.clone(),
            config.weather_timeout,
        )
        .map_err(|e| anyhow!("Failed to create weather client: {}", e))?,
    );
    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(bot.clone()));
    let engine = Arc::new(ConversationEngine::new(store.clone(), environment.clone()));
    let handler = BotHandler::new(engine, transport.clone());
    info!("Telegram bot initialized successfully");

    // Initialize and start alert service
    info!("Initializing alert service...");
    let mut alert_service = match AlertService::new(
        store.clone(),
        environment,
        transport,
        config.alert_schedule.clone(),
    )
    .await
    {
        Ok(service) => {
            info!("Alert service initialized successfully");
            service
        },
        Err(e) => {
            tracing::error!("Failed to create alert service: {}", e);
            return Err(anyhow!("Failed to create alert service: {}", e));
        }
    };

    if let Err(e) = alert_service.start().await {
        tracing::error!("Failed to start alert service: {}", e);
    } else {
        info!("Alert service started successfully");
    }

    // Initialize health service
    let health_service = HealthService::new(db_arc.clone(), store.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
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

    // Stop alert service on shutdown
    if let Err(e) = alert_service.stop().await {
        tracing::warn!("Error stopping alert service: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
