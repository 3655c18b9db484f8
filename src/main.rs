use anyhow::Context;
use axum::{http::Method, Extension};
use club_portal::{
    account::AccountService, auth::JwtKeys, config::Config, connect_to_db, email::Mailer,
    store::PgUserStore,
};
use envconfig::Envconfig;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

async fn build_mailer(config: &Config) -> anyhow::Result<Option<Mailer>> {
    let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) else {
        warn!("SMTP_USERNAME or SMTP_PASSWORD not set. password reset links will only be logged");
        return Ok(None);
    };

    let mailer = Mailer::new(&config.smtp_relay, username, password)?;
    match mailer.sanity_check().await {
        Ok(true) => info!(relay = %config.smtp_relay, "smtp connection verified"),
        Ok(false) => warn!("smtp sanity check failed. reset emails may not be delivered"),
        Err(e) => warn!("smtp sanity check failed. reset emails may not be delivered: {e}"),
    }
    Ok(Some(mailer))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for ctrl+c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("club_portal=info,tower_http=info")),
        )
        .init();

    let config = Config::init_from_env()?;
    let keys = Arc::new(
        JwtKeys::from_base64_secret(&config.jwt_secret).context("JWT_SECRET is not valid base64")?,
    );
    let mailer = build_mailer(&config).await?;

    let pool = connect_to_db(&config.db_url)?;
    let accounts = AccountService::new(
        Arc::new(PgUserStore::new(pool.clone())),
        keys.clone(),
        mailer,
        config.base_url.as_str(),
        Duration::from_secs(config.reset_token_ttl_minutes * 60),
    )?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);
    let app = club_portal::app(&config.public_dir)
        .layer(Extension(pool))
        .layer(Extension(Arc::new(accounts)))
        .layer(Extension(keys))
        .layer(Extension(reqwest::Client::new()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on {addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
