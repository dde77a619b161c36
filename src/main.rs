//! gigbridge-webhooks server binary.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use gigbridge_webhooks::adapters::http::{app_router, HealthState, WebhookAppState};
use gigbridge_webhooks::adapters::postgres::{
    PostgresAccountRepository, PostgresPaymentHistoryRepository, PostgresWebhookFailureRepository,
};
use gigbridge_webhooks::adapters::SystemClock;
use gigbridge_webhooks::application::handlers::billing::{
    ExpireSubscriptionsHandler, HandlePaystackWebhookHandler, ReplayWebhookFailureHandler,
};
use gigbridge_webhooks::config::{AppConfig, BillingConfig};
use gigbridge_webhooks::domain::billing::PaystackWebhookVerifier;
use gigbridge_webhooks::ports::{
    AccountRepository, Clock, PaymentHistoryRepository, WebhookFailureRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    gigbridge_webhooks::init_tracing(&config.server)?;

    if config.payment.is_live_mode() && !config.is_production() {
        warn!("Paystack live key configured outside production");
    }

    let db = &config.database;
    let pool = PgPoolOptions::new()
        .min_connections(db.min_connections)
        .max_connections(db.max_connections)
        .acquire_timeout(db.acquire_timeout())
        .idle_timeout(db.idle_timeout())
        .max_lifetime(db.max_lifetime())
        .connect(db.url.expose_secret())
        .await?;

    if db.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    let accounts: Arc<dyn AccountRepository> =
        Arc::new(PostgresAccountRepository::new(pool.clone()));
    let payments: Arc<dyn PaymentHistoryRepository> =
        Arc::new(PostgresPaymentHistoryRepository::new(pool.clone()));
    let failures: Arc<dyn WebhookFailureRepository> =
        Arc::new(PostgresWebhookFailureRepository::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let webhooks = Arc::new(
        HandlePaystackWebhookHandler::new(
            PaystackWebhookVerifier::new(config.payment.webhook_secret()),
            accounts.clone(),
            payments,
            failures.clone(),
            clock.clone(),
        )
        .with_plan_codes(config.payment.plan_codes())
        .with_period_days(config.billing.period_days),
    );

    let maintenance = spawn_maintenance(
        &config.billing,
        ExpireSubscriptionsHandler::new(accounts)
            .with_batch_size(config.billing.sweep_batch_size),
        ReplayWebhookFailureHandler::new(webhooks.clone(), failures, clock.clone()),
        clock,
    );

    let app = app_router(
        WebhookAppState::new(webhooks),
        HealthState::new(config.server.service_name.clone()),
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = maintenance {
        task.abort();
    }
    info!("Shutdown complete");
    Ok(())
}

/// Runs the expiry sweep and dead-letter replay on a fixed interval.
fn spawn_maintenance(
    billing: &BillingConfig,
    expiry: ExpireSubscriptionsHandler,
    replay: ReplayWebhookFailureHandler,
    clock: Arc<dyn Clock>,
) -> Option<tokio::task::JoinHandle<()>> {
    let Some(period) = billing.sweep_interval() else {
        info!("Background maintenance disabled");
        return None;
    };
    let replay_batch = billing.replay_batch_size;
    let max_attempts = billing.replay_max_attempts;

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match expiry.run(clock.now()).await {
                Ok(result) if !result.expired.is_empty() || result.failed > 0 => {
                    info!(
                        expired = result.expired.len(),
                        failed = result.failed,
                        "Expiry sweep finished"
                    );
                }
                Ok(_) => {}
                Err(e) => error!(error = %e, "Expiry sweep failed"),
            }

            match replay.replay_pending(replay_batch, max_attempts).await {
                Ok(summary) => {
                    if summary != Default::default() {
                        info!(
                            resolved = summary.resolved,
                            discarded = summary.discarded,
                            still_failing = summary.still_failing,
                            exhausted = summary.exhausted,
                            "Dead-letter replay finished"
                        );
                    }
                }
                Err(e) => error!(error = %e, "Dead-letter replay failed"),
            }
        }
    }))
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal, starting graceful shutdown"),
        _ = terminate => info!("Received terminate signal, starting graceful shutdown"),
    }

    // Grace period for in-flight deliveries
    tokio::time::sleep(Duration::from_secs(1)).await;
}
