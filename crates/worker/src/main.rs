use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vlogcrew_pipeline::config::CrewConfig;
use vlogcrew_pipeline::llm::{ChatAgentRunner, LlmConfig};
use vlogcrew_pipeline::Pipeline;
use vlogcrew_worker::config::WorkerConfig;
use vlogcrew_worker::QueueWorker;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vlogcrew_worker=debug,vlogcrew_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    tracing::info!(
        worker = %config.name,
        concurrency = config.concurrency,
        "Loaded worker configuration",
    );

    let llm = LlmConfig::from_env().expect("Invalid LLM configuration");
    tracing::info!(provider = ?llm.provider, model = %llm.model, "Loaded LLM configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = vlogcrew_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    vlogcrew_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Pipeline ---
    let crews = CrewConfig::load(config.pipeline_config_dir.as_deref())
        .expect("Failed to load crew definitions");
    let runner = ChatAgentRunner::new(llm).expect("Failed to build LLM client");
    let pipeline = Pipeline::builder()
        .crews(crews)
        .runner(Arc::new(runner))
        .build()
        .expect("Failed to build pipeline");

    // --- Worker loop ---
    let worker = QueueWorker::new(pool, pipeline, &config);
    let cancel = CancellationToken::new();

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    worker.run(cancel).await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
///
/// In-flight jobs are allowed to finish; nothing new is claimed after the
/// signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
