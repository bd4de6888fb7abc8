use std::sync::Arc;
use std::time::Duration;

use latter::challenge::repository::{
    ChallengeRepository, InMemoryChallengeRepository, PostgresChallengeRepository,
};
use latter::notify::{LogMailer, Mailer, NotificationQueue, SendGridMailer};
use latter::player::repository::{
    InMemoryPlayerRepository, PlayerRepository, PostgresPlayerRepository,
};
use latter::session::repository::{
    InMemorySessionRepository, PostgresSessionRepository, SessionRepository,
};
use latter::session::SessionService;
use latter::{db, router, AppConfig, AppState};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

type Repositories = (
    Arc<dyn PlayerRepository + Send + Sync>,
    Arc<dyn ChallengeRepository + Send + Sync>,
    Arc<dyn SessionRepository + Send + Sync>,
);

async fn repositories(config: &AppConfig) -> Result<Repositories, latter::AppError> {
    match &config.database_url {
        Some(database_url) => {
            let pool = db::connect(database_url, config.database_max_connections).await?;
            info!("Using PostgreSQL storage");
            Ok((
                Arc::new(PostgresPlayerRepository::new(pool.clone())),
                Arc::new(PostgresChallengeRepository::new(pool.clone())),
                Arc::new(PostgresSessionRepository::new(pool)),
            ))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory storage");
            let players = Arc::new(InMemoryPlayerRepository::new());
            let challenges = Arc::new(InMemoryChallengeRepository::for_players(&players));
            Ok((
                players,
                challenges,
                Arc::new(InMemorySessionRepository::new()),
            ))
        }
    }
}

fn mailer(config: &AppConfig) -> Result<Arc<dyn Mailer>, latter::notify::NotifyError> {
    match &config.sendgrid_api_key {
        Some(api_key) => {
            info!(endpoint = %config.sendgrid_endpoint, "Delivering mail through SendGrid");
            Ok(Arc::new(SendGridMailer::new(
                api_key.clone(),
                config.sendgrid_endpoint.clone(),
                config.mail_timeout,
            )?))
        }
        None => {
            warn!("SENDGRID_API_KEY not set, mails will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Periodically removes expired login sessions
fn spawn_session_cleanup(app_state: &AppState) {
    let service = SessionService::new(
        Arc::clone(&app_state.session_repository),
        Arc::clone(&app_state.player_repository),
        app_state.token_config.clone(),
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = service.cleanup_expired_sessions().await {
                warn!("Session cleanup failed: {}", e);
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "latter=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Latter ladder server");

    let config = AppConfig::from_env();

    let (player_repository, challenge_repository, session_repository) =
        repositories(&config).await?;
    let (notifications, _notification_worker) = NotificationQueue::start(mailer(&config)?);

    let app_state = AppState::new(
        player_repository,
        challenge_repository,
        session_repository,
        notifications,
        config.token_config(),
    );

    spawn_session_cleanup(&app_state);

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
