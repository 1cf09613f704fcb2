//! TechMan - Equipment tracking for the workshop floor

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use techman::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCommentRepository, SqlxEquipmentRepository, SqlxSessionRepository,
            SqlxUserRepository,
        },
    },
    services::{AuthService, CommentService, EquipmentService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "techman=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TechMan equipment tracker...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Demo mode: seed access codes when the user table is empty
    #[cfg(feature = "demo")]
    {
        use techman::db::repositories::UserRepository;
        use techman::models::{CreateUserInput, ADMIN_PROFILE_ID, TECHNICIAN_PROFILE_ID};

        let user_repo = SqlxUserRepository::new(pool.clone());
        if user_repo.count().await? == 0 {
            tracing::info!("Demo mode: seeding access codes (admin/123456, tecnico/654321)");
            user_repo
                .create(&CreateUserInput::new("admin", "123456", ADMIN_PROFILE_ID))
                .await?;
            user_repo
                .create(&CreateUserInput::new("tecnico", "654321", TECHNICIAN_PROFILE_ID))
                .await?;
            tracing::info!("Demo mode: default users created");
        }
    }

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let equipment_repo = SqlxEquipmentRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());

    // Initialize services
    let auth_service = Arc::new(AuthService::new(user_repo, session_repo));
    let equipment_service = Arc::new(EquipmentService::new(equipment_repo.clone()));
    let comment_service = Arc::new(CommentService::new(comment_repo, equipment_repo));

    // Expired sessions are dropped lazily on validation; this sweep keeps
    // the table small when tokens are abandoned without a logout.
    {
        let auth_service = auth_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match auth_service.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(deleted) => tracing::info!("Removed {} expired sessions", deleted),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    // Build application state
    let state = AppState {
        auth_service,
        equipment_service,
        comment_service,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
