use std::sync::Arc;

use auth::Authenticator;
use session_service::config::BootstrapAdminConfig;
use session_service::config::Config;
use session_service::config::StorageBackend;
use session_service::domain::access::ports::AccessResolverPort;
use session_service::domain::access::relationships::StoreRelationships;
use session_service::domain::access::resolver::AccessResolver;
use session_service::domain::course::ports::CourseRepository;
use session_service::domain::course::ports::CourseServicePort;
use session_service::domain::course::service::CourseService;
use session_service::domain::identity::models::DisplayName;
use session_service::domain::identity::models::EmailAddress;
use session_service::domain::identity::models::Password;
use session_service::domain::identity::models::RegisterCommand;
use session_service::domain::identity::ports::CredentialRepository;
use session_service::domain::identity::ports::ResetNotifier;
use session_service::domain::identity::ports::SessionServicePort;
use session_service::domain::identity::ports::SessionStore;
use session_service::domain::identity::service::SessionService;
use session_service::inbound::http::router::create_router;
use session_service::outbound::events::producer::KafkaResetNotifier;
use session_service::outbound::memory::InMemoryCourseRepository;
use session_service::outbound::memory::InMemoryCredentialRepository;
use session_service::outbound::memory::InMemoryOutbox;
use session_service::outbound::memory::InMemorySessionStore;
use session_service::outbound::repositories::PostgresCourseRepository;
use session_service::outbound::repositories::PostgresCredentialRepository;
use session_service::outbound::sessions::PostgresSessionStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

struct Services {
    session_service: Arc<dyn SessionServicePort>,
    access_resolver: Arc<dyn AccessResolverPort>,
    course_service: Arc<dyn CourseServicePort>,
}

fn bootstrap_command(admin: &BootstrapAdminConfig) -> Result<RegisterCommand, anyhow::Error> {
    Ok(RegisterCommand {
        email: EmailAddress::new(admin.email.clone())?,
        password: Password::new(admin.password.clone())?,
        display_name: DisplayName::new(admin.display_name.clone())?,
        role: None,
    })
}

async fn wire<CR, SS, CoR>(
    credentials: CR,
    sessions: SS,
    courses: CoR,
    notifier: Arc<dyn ResetNotifier>,
    authenticator: Authenticator,
    bootstrap_admin: Option<RegisterCommand>,
) -> Result<Services, anyhow::Error>
where
    CR: CredentialRepository,
    SS: SessionStore,
    CoR: CourseRepository,
{
    let credentials = Arc::new(credentials);
    let courses = Arc::new(courses);

    let relationships = Arc::new(StoreRelationships::new(
        Arc::clone(&credentials),
        Arc::clone(&courses),
    ));

    let session_service =
        SessionService::new(credentials, Arc::new(sessions), notifier, authenticator);

    if let Some(command) = bootstrap_admin {
        let admin = session_service.ensure_admin(command).await?;
        tracing::info!(user_id = %admin.id, email = %admin.email, "Bootstrap admin ready");
    }

    Ok(Services {
        session_service: Arc::new(session_service),
        access_resolver: Arc::new(AccessResolver::new(relationships)),
        course_service: Arc::new(CourseService::new(courses)),
    })
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "session-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        storage = ?config.storage.backend,
        access_ttl_secs = config.jwt.access_ttl_secs,
        refresh_ttl_secs = config.jwt.refresh_ttl_secs,
        kafka = config.kafka.is_some(),
        "Configuration loaded"
    );

    // Refuse to start without a usable signing secret.
    let authenticator = Authenticator::new(config.jwt.secret.as_bytes(), config.jwt.lifetimes())
        .map_err(|e| anyhow::anyhow!("Invalid jwt.secret: {}", e))?;

    let bootstrap_admin = config
        .bootstrap_admin
        .as_ref()
        .map(bootstrap_command)
        .transpose()
        .map_err(|e| anyhow::anyhow!("Invalid bootstrap_admin: {}", e))?;

    let notifier: Arc<dyn ResetNotifier> = match &config.kafka {
        Some(kafka) => Arc::new(KafkaResetNotifier::new(kafka)?),
        None => {
            tracing::warn!("No kafka section configured, reset links go to the in-memory outbox");
            Arc::new(InMemoryOutbox::new())
        }
    };

    let services = match config.storage.backend {
        StorageBackend::Postgres => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let sessions = PostgresSessionStore::new(pg_pool.clone());
            let purged = sessions.purge_expired().await?;
            tracing::info!(purged, "Expired session entries removed");

            wire(
                PostgresCredentialRepository::new(pg_pool.clone()),
                sessions,
                PostgresCourseRepository::new(pg_pool),
                notifier,
                authenticator,
                bootstrap_admin,
            )
            .await?
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; all state is lost on restart");
            wire(
                InMemoryCredentialRepository::new(),
                InMemorySessionStore::new(),
                InMemoryCourseRepository::new(),
                notifier,
                authenticator,
                bootstrap_admin,
            )
            .await?
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let application = create_router(
        services.session_service,
        services.access_resolver,
        services.course_service,
    );

    axum::serve(http_listener, application).await?;

    Ok(())
}
