//! Ripple server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use ripple_api::{middleware::AppState, router as api_router};
use ripple_common::Config;
use ripple_core::{
    CommentService, FollowingService, PostService, ProfileService, ReactionService, UserService,
};
use ripple_db::repositories::{
    CommentRepository, FollowingRepository, PostRepository, ReactionRepository,
    UserProfileRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ripple=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting ripple server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(ripple_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    ripple_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let user_repo = UserRepository::new(db.clone());
    let profile_repo = UserProfileRepository::new(db.clone());
    let following_repo = FollowingRepository::new(db.clone());
    let post_repo = PostRepository::new(db.clone());
    let comment_repo = CommentRepository::new(db.clone());
    let reaction_repo = ReactionRepository::new(db);

    // Initialize services
    let reaction_service = ReactionService::new(
        reaction_repo,
        post_repo.clone(),
        comment_repo.clone(),
        user_repo.clone(),
        profile_repo.clone(),
    );
    let user_service = UserService::new(
        user_repo.clone(),
        profile_repo.clone(),
        reaction_service.clone(),
    );
    let profile_service = ProfileService::new(profile_repo, user_repo.clone());
    let following_service = FollowingService::new(following_repo, user_repo);
    let comment_service = CommentService::new(
        comment_repo,
        post_repo.clone(),
        reaction_service.clone(),
    );
    let post_service = PostService::new(
        post_repo,
        comment_service.clone(),
        reaction_service.clone(),
    );

    // Create app state
    let state = AppState {
        user_service,
        profile_service,
        following_service,
        post_service,
        comment_service,
        reaction_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            ripple_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}
