use std::{net::SocketAddr, sync::Arc};

use pricewatch::{
    AppState, config, routes,
    services::{finnhub::FinnhubClient, monitor::Monitor, telegram::TelegramClient},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    if settings.finnhub_api_key.trim().is_empty() || settings.telegram_token.trim().is_empty() {
        tracing::error!("Please ensure that FINNHUB_API_KEY and TG_API_KEY have been set");
        std::process::exit(1);
    }

    let finnhub = Arc::new(FinnhubClient::new(settings.finnhub_api_key.clone()));
    let telegram = Arc::new(TelegramClient::new(settings.telegram_token.clone()));

    if let Some(url) = settings.webhook_url.as_deref() {
        if let Err(e) = telegram.delete_webhook().await {
            tracing::warn!("deleteWebhook failed: {}", e);
        }
        match telegram.set_webhook(url).await {
            Ok(()) => tracing::info!("webhook registered at {}", url),
            Err(e) => tracing::error!("setWebhook failed: {}", e),
        }
    }

    let monitor = Monitor::new(finnhub, telegram, settings.monitor_config());

    let state = AppState {
        settings: settings.clone(),
        monitor,
    };

    let app = routes::app(state);

    let ip = match settings.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!("invalid HOST {}: {}", settings.host, e);
            std::process::exit(1);
        }
    };
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("bind {} failed: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
    }
}
