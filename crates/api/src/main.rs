use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use salon_core::ports::{PaymentProvider, SystemClock};
use salon_events::{EmailConfig, EmailDelivery, SalonNotifier};
use salon_payments::{RazorpayClient, UnconfiguredPayments};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salon_api::config::{ConfigError, ServerConfig};
use salon_api::state::AppState;
use salon_api::{background, router};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "salon_api=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
    let pool = salon_db::create_pool(&database_url).await?;
    tracing::info!("Database connection pool created");

    salon_db::health_check(&pool).await?;
    salon_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    // --- Payments ---
    let payments: Arc<dyn PaymentProvider> = match config.payments.clone() {
        Some(gateway) => Arc::new(RazorpayClient::new(gateway)?),
        None => {
            tracing::warn!("RAZORPAY_KEY_ID/RAZORPAY_KEY_SECRET not set, payments disabled");
            Arc::new(UnconfiguredPayments)
        }
    };

    // --- Notifications ---
    let email = match EmailConfig::from_env() {
        Some(smtp) => Some(EmailDelivery::new(smtp)?),
        None => {
            tracing::info!("SMTP_HOST not set, notifications are in-app only");
            None
        }
    };
    let notifier = Arc::new(SalonNotifier::new(pool.clone(), email));

    // --- App state ---
    let state = AppState::new(
        pool,
        config.clone(),
        payments,
        notifier,
        Arc::new(SystemClock),
    );

    // --- Reminder sweep ---
    let cancel = CancellationToken::new();
    let reminder_handle = tokio::spawn(background::reminders::run(
        Arc::clone(&state.reminders),
        Duration::from_secs(config.reminder_interval_secs),
        cancel.clone(),
    ));

    let app = router::build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reminder_handle).await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
