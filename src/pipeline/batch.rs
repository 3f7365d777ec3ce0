//! Batch engine: fans provider records out across a bounded tokio worker
//! pool, runs the full pipeline per record, persists each result, and folds
//! the per-record outcomes into order-independent batch statistics.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

use super::domain::{ProviderRecord, RiskLevel};
use super::graph::run_pipeline;
use super::sink::{FraudDetail, PersistedBatch, PersistedRecord, ResultSink, RiskCounts};
use super::sources::ReferenceSource;

/// Default worker pool size; bounds concurrent reference lookups.
pub const DEFAULT_WORKERS: usize = 10;

/// Compact per-record result returned by a batch worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Processed {
        record_id: String,
        confidence: u8,
        risk: RiskLevel,
        verified: bool,
    },
    Failed {
        record_id: String,
        error: String,
    },
}

impl RecordOutcome {
    pub fn record_id(&self) -> &str {
        match self {
            Self::Processed { record_id, .. } | Self::Failed { record_id, .. } => record_id,
        }
    }
}

/// Aggregated result of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRun {
    pub batch_id: String,
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub verified: usize,
    pub high_risk: usize,
    pub risk_counts: RiskCounts,
    /// Arithmetic mean over successfully processed records only; 0.0 for an
    /// empty or fully-failed batch.
    pub avg_confidence: f64,
    pub duration_ms: u64,
    pub results: Vec<RecordOutcome>,
}

/// Runs the full pipeline for a collection of records on a bounded pool.
pub struct BatchEngine {
    source: Arc<dyn ReferenceSource>,
    sink: Arc<dyn ResultSink>,
    workers: usize,
}

impl BatchEngine {
    pub fn new(source: Arc<dyn ReferenceSource>, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            source,
            sink,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Process every record independently. A single record's failure is
    /// recorded and excluded from averages; it never aborts its siblings.
    pub async fn run(&self, records: Vec<ProviderRecord>) -> BatchRun {
        let batch_id = short_batch_id();
        let started = Instant::now();
        let total = records.len();
        info!(batch = %batch_id, providers = total, workers = self.workers, "running batch");

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(total);
        for record in records {
            let record_id = record.id.clone();
            let semaphore = semaphore.clone();
            let source = self.source.clone();
            let sink = self.sink.clone();
            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return RecordOutcome::Failed {
                            record_id: record.id,
                            error: "worker pool closed".to_string(),
                        }
                    }
                };
                process_record(record, source.as_ref(), sink.as_ref())
            });
            handles.push((record_id, handle));
        }

        let mut results = Vec::with_capacity(total);
        for (record_id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(batch = %batch_id, record = %record_id, %err, "batch worker crashed");
                    RecordOutcome::Failed {
                        record_id,
                        error: format!("worker crashed: {err}"),
                    }
                }
            };
            results.push(outcome);
        }

        let run = aggregate(batch_id, results, started.elapsed().as_millis() as u64);

        if let Err(err) = self.sink.persist_batch(PersistedBatch {
            batch_id: run.batch_id.clone(),
            total: run.total,
            verified: run.verified,
            high_risk: run.high_risk,
            avg_confidence: run.avg_confidence,
            created_at: Utc::now(),
        }) {
            warn!(batch = %run.batch_id, %err, "failed to persist batch summary");
        }

        info!(
            batch = %run.batch_id,
            total = run.total,
            verified = run.verified,
            high_risk = run.high_risk,
            failed = run.failed,
            avg_confidence = run.avg_confidence,
            duration_ms = run.duration_ms,
            "batch complete"
        );
        run
    }
}

fn process_record(
    record: ProviderRecord,
    source: &dyn ReferenceSource,
    sink: &dyn ResultSink,
) -> RecordOutcome {
    let record_id = record.id.clone();
    let outcome = run_pipeline(record, source);

    let row = PersistedRecord {
        record_id: record_id.clone(),
        fraud: FraudDetail {
            score: outcome.quality.fraud_score,
            flags: outcome.quality.fraud_flags.clone(),
            license_penalty: outcome.quality.license_penalty,
        },
        provider: outcome.provider,
        validation: outcome.validation,
        enriched: outcome.enriched,
        quality: outcome.quality.clone(),
        created_at: Utc::now(),
    };

    match sink.persist_record(row) {
        Ok(()) => RecordOutcome::Processed {
            record_id,
            confidence: outcome.quality.confidence.overall,
            risk: outcome.quality.risk_level,
            verified: !outcome.quality.needs_manual_review,
        },
        Err(err) => RecordOutcome::Failed {
            record_id,
            error: err.to_string(),
        },
    }
}

/// Commutative reduction over per-record outcomes: the aggregates are
/// invariant under reordering of the results.
fn aggregate(batch_id: String, results: Vec<RecordOutcome>, duration_ms: u64) -> BatchRun {
    let total = results.len();
    let mut processed = 0usize;
    let mut failed = 0usize;
    let mut verified = 0usize;
    let mut risk_counts = RiskCounts::default();
    let mut confidence_sum = 0u64;

    for outcome in &results {
        match outcome {
            RecordOutcome::Processed {
                confidence,
                risk,
                verified: is_verified,
                ..
            } => {
                processed += 1;
                confidence_sum += u64::from(*confidence);
                risk_counts.bump(*risk);
                if *is_verified {
                    verified += 1;
                }
            }
            RecordOutcome::Failed { .. } => failed += 1,
        }
    }

    let avg_confidence = if processed == 0 {
        0.0
    } else {
        let mean = confidence_sum as f64 / processed as f64;
        (mean * 100.0).round() / 100.0
    };

    BatchRun {
        batch_id,
        total,
        processed,
        failed,
        verified,
        high_risk: risk_counts.high,
        risk_counts,
        avg_confidence,
        duration_ms,
        results,
    }
}

fn short_batch_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
