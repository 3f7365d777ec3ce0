use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use provider_ai::config::AppConfig;
use provider_ai::error::AppError;
use provider_ai::pipeline::{
    run_pipeline, BatchEngine, BatchRun, FraudDetail, MemorySink, PersistedRecord, PipelineOutcome,
    ProviderFacts, ProviderRecord, RecordOutcome, ReferenceSource, ResultSink, SyntheticReference,
};
use provider_ai::telemetry;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    source: Arc<dyn ReferenceSource>,
    sink: Arc<MemorySink>,
    workers: usize,
}

#[derive(Parser, Debug)]
#[command(
    name = "Provider Directory Orchestrator",
    about = "Score healthcare provider rosters for quality and fraud signals",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the scoring pipeline over a provider roster CSV
    Batch(BatchArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Provider roster CSV to score
    #[arg(long)]
    roster: PathBuf,
    /// Override the configured worker count
    #[arg(long)]
    workers: Option<usize>,
    /// Include a per-provider result listing in the output
    #[arg(long)]
    list_results: bool,
}

#[derive(Debug, Deserialize)]
struct ProviderPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    primary: ProviderFacts,
    #[serde(default)]
    attested: ProviderFacts,
}

impl ProviderPayload {
    fn into_record(self, position: usize) -> ProviderRecord {
        let id = self
            .id
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| position.to_string());
        ProviderRecord::from_sources(id, self.primary, self.attested)
    }
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    providers: Vec<ProviderPayload>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Batch(args) => run_batch(args).await,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        source: Arc::new(SyntheticReference),
        sink: Arc::new(MemorySink::new()),
        workers: config.pipeline.workers,
    };

    let app = build_router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "provider directory orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let records = provider_ai::pipeline::load_roster_path(&args.roster)?;
    let sink = Arc::new(MemorySink::new());
    let engine = BatchEngine::new(Arc::new(SyntheticReference), sink.clone())
        .with_workers(args.workers.unwrap_or(config.pipeline.workers));

    let run = engine.run(records).await;
    render_batch_report(&run, args.list_results);
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/providers/pipeline", post(pipeline_endpoint))
        .route("/api/v1/providers/batch", post(batch_endpoint))
        .with_state(state)
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn pipeline_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<ProviderPayload>,
) -> Result<Json<PipelineOutcome>, AppError> {
    let record = payload.into_record(1);
    let record_id = record.id.clone();
    let outcome = run_pipeline(record, state.source.as_ref());

    state.sink.persist_record(PersistedRecord {
        record_id,
        provider: outcome.provider.clone(),
        validation: outcome.validation.clone(),
        enriched: outcome.enriched.clone(),
        quality: outcome.quality.clone(),
        fraud: FraudDetail {
            score: outcome.quality.fraud_score,
            flags: outcome.quality.fraud_flags.clone(),
            license_penalty: outcome.quality.license_penalty,
        },
        created_at: Utc::now(),
    })?;

    Ok(Json(outcome))
}

async fn batch_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<BatchRequest>,
) -> Json<BatchRun> {
    let records = payload
        .providers
        .into_iter()
        .enumerate()
        .map(|(index, provider)| provider.into_record(index + 1))
        .collect();

    let engine = BatchEngine::new(state.source.clone(), state.sink.clone() as Arc<dyn ResultSink>)
        .with_workers(state.workers);
    Json(engine.run(records).await)
}

fn render_batch_report(run: &BatchRun, list_results: bool) {
    println!("Provider directory batch {}", run.batch_id);
    println!(
        "Providers: {} total, {} processed, {} failed",
        run.total, run.processed, run.failed
    );
    println!(
        "Outcomes: {} verified, {} high risk, avg confidence {:.2}",
        run.verified, run.high_risk, run.avg_confidence
    );
    println!(
        "Risk levels: {} low, {} medium, {} high",
        run.risk_counts.low, run.risk_counts.medium, run.risk_counts.high
    );
    println!("Completed in {} ms", run.duration_ms);

    if !list_results {
        return;
    }

    println!("\nPer-provider results");
    for result in &run.results {
        match result {
            RecordOutcome::Processed {
                record_id,
                confidence,
                risk,
                verified,
            } => {
                let note = if *verified { " (verified)" } else { "" };
                println!(
                    "- {} | confidence {} | risk {}{}",
                    record_id,
                    confidence,
                    risk.label(),
                    note
                );
            }
            RecordOutcome::Failed { record_id, error } => {
                println!("- {} | failed: {}", record_id, error);
            }
        }
    }
}
