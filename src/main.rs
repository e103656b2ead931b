mod config;
mod domain;
mod infrastructure;
mod presentation;
mod usecase;

use std::{sync::Arc, time::Duration};

use sea_orm::{ConnectOptions, Database};
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::AppConfig,
    domain::{
        repositories::{
            conference_repository::ConferenceRepository, profile_repository::ProfileRepository,
            registration_repository::RegistrationRepository,
        },
        services::announcement_service::AnnouncementCache,
    },
    infrastructure::{
        conference_repository::PostgresConferenceRepository,
        in_memory_announcement_cache::InMemoryAnnouncementCache, in_memory_directory::InMemoryDirectory,
        jwt_identity_resolver::JwtIdentityResolver, profile_repository::PostgresProfileRepository,
        queued_email_notifier::QueuedEmailNotifier, registration_repository::PostgresRegistrationRepository,
        schema::create_schema,
    },
    presentation::router::{Repositories, create_app_router},
    usecase::{announcement_usecase::AnnouncementUsecase, retry::RetryPolicy},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cache = InMemoryAnnouncementCache::new();
    match config.database_url.clone() {
        Some(url) => {
            let mut opt = ConnectOptions::new(url);
            opt.max_connections(10).min_connections(1).sqlx_logging(true);

            let db = Database::connect(opt).await?;
            create_schema(&db).await?;
            let repositories = Repositories {
                conferences: PostgresConferenceRepository::new(db.clone()),
                profiles: PostgresProfileRepository::new(db.clone()),
                registrations: PostgresRegistrationRepository::new(db),
            };
            serve(&config, repositories, cache).await
        }
        None => {
            warn!("DATABASE_URL not set, records live in memory only");
            let directory = InMemoryDirectory::new();
            let repositories = Repositories {
                conferences: directory.clone(),
                profiles: directory.clone(),
                registrations: directory,
            };
            serve(&config, repositories, cache).await
        }
    }
}

async fn serve<C, P, R, K>(
    config: &AppConfig,
    repositories: Repositories<C, P, R>,
    cache: K,
) -> Result<(), Box<dyn std::error::Error>>
where
    C: ConferenceRepository + Send + Sync + 'static + Clone,
    P: ProfileRepository + Send + Sync + 'static + Clone,
    R: RegistrationRepository + Send + Sync + 'static + Clone,
    K: AnnouncementCache + 'static,
{
    let (notifier, queue) = QueuedEmailNotifier::new(config.notification_queue_capacity);
    QueuedEmailNotifier::spawn_worker(queue);

    let announcements = Arc::new(AnnouncementUsecase::new(repositories.conferences.clone(), cache));
    spawn_announcement_refresher(Arc::clone(&announcements), config.announcement_refresh);

    let app = create_app_router(
        repositories,
        notifier,
        JwtIdentityResolver::new(&config.jwt_secret),
        announcements,
        RetryPolicy::new(config.transaction),
    );

    let listener = TcpListener::bind(config.bind_address).await?;
    info!(address = %config.bind_address, "listening");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Recompute the nearly-sold-out announcement on a fixed period
fn spawn_announcement_refresher<C, K>(
    announcements: Arc<AnnouncementUsecase<C, K>>,
    period: Duration,
) -> JoinHandle<()>
where
    C: ConferenceRepository + Send + Sync + 'static,
    K: AnnouncementCache + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period.max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            if let Err(err) = announcements.refresh().await {
                warn!(error = %err, "announcement refresh failed");
            }
        }
    })
}
