//! Axum-based gateway for the Ilm Q&A service. Config-driven via CoreConfig.

mod handlers;

use axum::extract::State;
use axum::http::Method;
use axum::{
    routing::{get, post},
    Router,
};
use ilm_core::{AnswerResolver, CoreConfig, KnowledgeBase, LoadReport, SourceStatus};
use ilm_skills::ModelRouter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pre-flight check: config loads, record sources parse, port is available.
fn run_verify() -> Result<(), String> {
    print!("Checking configuration... ");
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;
    println!("OK (llm_mode = {})", config.llm_mode.as_str());

    let data_dir = workspace_path(&config.data_path());
    print!("Checking knowledge base in {}... ", data_dir.display());
    let (knowledge, report) = KnowledgeBase::load_dir(&data_dir);
    println!(
        "OK ({} records, {} entries dropped, {} sources skipped)",
        knowledge.len(),
        report.total_dropped(),
        report.skipped().count()
    );
    for source in &report.sources {
        match &source.status {
            SourceStatus::Loaded { records, dropped } => {
                println!("  - {}: {} records ({} dropped)", source.name, records, dropped)
            }
            SourceStatus::Skipped { reason } => println!("  - {}: SKIPPED ({})", source.name, reason),
        }
    }
    if knowledge.is_empty() {
        println!("  ⚠ knowledge base is empty; every question will get the no-data answer");
    }

    if config.frontend_enabled {
        let index = workspace_path(&config.index_file());
        print!("Checking frontend {}... ", index.display());
        if index.is_file() {
            println!("OK");
        } else {
            println!("MISSING (GET / will return 404)");
        }
    }

    let port = config.port;
    print!("Checking port {}... ", port);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    match std::net::TcpListener::bind(addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => {
            return Err(format!("Port {} BLOCKED: {}", port, e));
        }
    }

    println!("\n✅ SUCCESS: Ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[ilm-gateway] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("❌ PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match CoreConfig::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(target: "ilm::gateway", error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let (knowledge, report) = KnowledgeBase::load_dir(workspace_path(&config.data_path()));
    log_load_report(&report);
    let knowledge = Arc::new(knowledge);

    let generator = Arc::new(ModelRouter::from_config(&config));
    let resolver = Arc::new(AnswerResolver::from_config(
        &config,
        Arc::clone(&knowledge),
        generator,
    ));

    let state = AppState {
        config: Arc::clone(&config),
        knowledge,
        resolver,
    };
    let app = build_app(state);

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(target: "ilm::gateway", %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(target: "ilm::gateway", "{} listening on {}", config.app_name, addr);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(target: "ilm::gateway", error = %e, "Server error");
    }
}

fn log_load_report(report: &LoadReport) {
    for source in report.skipped() {
        if let SourceStatus::Skipped { reason } = &source.status {
            tracing::warn!(target: "ilm::gateway", source = %source.name, error = %reason, "Record source skipped");
        }
    }
    tracing::info!(
        target: "ilm::gateway",
        records = report.total_records(),
        dropped = report.total_dropped(),
        sources = report.sources.len(),
        "Knowledge base ready"
    );
}

/// Resolves a configured relative path: working directory first (run from workspace root),
/// then relative to the workspace root as seen from add-ons/ilm-gateway.
fn workspace_path(path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }
    let from_manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(path);
    if from_manifest.exists() {
        from_manifest
    } else {
        path.to_path_buf()
    }
}

fn build_app(state: AppState) -> Router {
    let index_file = state
        .config
        .frontend_enabled
        .then(|| workspace_path(&state.config.index_file()));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/ask", post(handlers::ask::ask))
        .route("/v1/status", get(status))
        .route("/api/v1/health", get(health))
        .with_state(state);

    if let Some(index_file) = index_file {
        // Map `/` -> `{frontend_dir}/index.html`
        app = app.route_service("/", ServeFile::new(index_file));
    }

    app.layer(cors)
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) knowledge: Arc<KnowledgeBase>,
    pub(crate) resolver: Arc<AnswerResolver>,
}

/// GET /api/v1/health – liveness check for UI and scripts.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// GET /v1/status – app identity, LLM mode and knowledge base size.
async fn status(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "app_name": state.config.app_name,
        "port": state.config.port,
        "llm_mode": state.config.llm_mode.as_str(),
        "records": state.knowledge.len(),
    }))
}
