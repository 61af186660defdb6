mod auth;
mod config;
mod database;
mod openapi;
mod request_logging;
mod search;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::AppConfig;
use database::{Database, NewListing};
use poem::{
    handler, listener::TcpListener, middleware::Cors, web::Redirect, Endpoint, EndpointExt, Route,
    Server,
};
use poem_openapi::OpenApiService;
use request_logging::RequestLogging;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "api-server")]
#[command(about = "Room rental search API server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve,
    /// Import listings from a JSON array file
    Import {
        /// Path to the JSON file
        path: PathBuf,
    },
    /// Check database connectivity and schema
    Doctor,
}

#[handler]
fn root_redirect() -> Redirect {
    Redirect::temporary("/api/v1/swagger")
}

/// Route tree with the OpenAPI service, Swagger UI and middleware
fn build_app(database: Arc<Database>, config: Arc<AppConfig>) -> impl Endpoint {
    let api_service = OpenApiService::new(
        openapi::create_combined_api(),
        "Rooms API",
        env!("CARGO_PKG_VERSION"),
    )
    .server("/api/v1");
    let swagger_ui = api_service.swagger_ui();
    let spec = api_service.spec_endpoint();

    Route::new()
        .at("/", poem::get(root_redirect))
        .nest("/api/v1/swagger", swagger_ui)
        .at("/api/v1/openapi.json", spec)
        .nest("/api/v1", api_service)
        .data(database)
        .data(config)
        .with(Cors::new())
        .with(RequestLogging)
}

async fn connect(config: &AppConfig) -> anyhow::Result<Arc<Database>> {
    let database = Database::new(&config.database_url)
        .await
        .with_context(|| format!("Database initialization failed for {}", config.database_url))?;
    tracing::info!("Database initialized at {}", config.database_url);
    Ok(Arc::new(database))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AppConfig::from_env()?);

    match cli.command {
        Commands::Serve => serve_command(config).await,
        Commands::Import { path } => import_command(config, path).await,
        Commands::Doctor => doctor_command(config).await,
    }
}

async fn serve_command(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let database = connect(&config).await?;

    tracing::info!(
        "Starting Rooms API server on {} (default limit {}, max limit {}, default radius {} km)",
        addr,
        config.search.default_limit,
        config.search.max_limit,
        config.search.default_radius_km
    );

    let app = build_app(database, config);
    Server::new(TcpListener::bind(&addr)).run(app).await?;
    Ok(())
}

async fn import_command(config: Arc<AppConfig>, path: PathBuf) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let listings: Vec<NewListing> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of listings", path.display()))?;

    let database = connect(&config).await?;
    let ids = database.import_listings(listings, &config.catalog).await?;
    println!("Imported {} listings from {}", ids.len(), path.display());
    Ok(())
}

async fn doctor_command(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let database = connect(&config).await?;
    let count = database.count_all_listings().await?;
    println!("Database OK: {} ({} listings)", config.database_url, count);
    Ok(())
}
