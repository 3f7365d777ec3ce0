//! Result persistence boundary. Each batch worker issues its own write, so
//! implementations must tolerate concurrent independent writers; the built-in
//! memory sink serializes access behind mutexes.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    EnrichedRecord, FraudFlag, ProviderRecord, QualityAssessment, RiskLevel, ValidationResult,
};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Fraud signal detail persisted next to the assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudDetail {
    pub score: u8,
    pub flags: Vec<FraudFlag>,
    pub license_penalty: u8,
}

/// One durably stored pipeline result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub record_id: String,
    pub provider: ProviderRecord,
    pub validation: ValidationResult,
    pub enriched: EnrichedRecord,
    pub quality: QualityAssessment,
    pub fraud: FraudDetail,
    pub created_at: DateTime<Utc>,
}

/// Batch-level summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBatch {
    pub batch_id: String,
    pub total: usize,
    pub verified: usize,
    pub high_risk: usize,
    pub avg_confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Durable storage for pipeline output. The read path is owned by reporting
/// tools, not the pipeline.
pub trait ResultSink: Send + Sync {
    fn persist_record(&self, record: PersistedRecord) -> Result<(), SinkError>;
    fn persist_batch(&self, batch: PersistedBatch) -> Result<(), SinkError>;
}

/// In-memory sink backing the HTTP service and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<PersistedRecord>>,
    batches: Mutex<Vec<PersistedBatch>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<PersistedRecord> {
        self.records.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn batches(&self) -> Vec<PersistedBatch> {
        self.batches.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn record_for(&self, record_id: &str) -> Option<PersistedRecord> {
        self.records
            .lock()
            .ok()?
            .iter()
            .find(|row| row.record_id == record_id)
            .cloned()
    }
}

impl ResultSink for MemorySink {
    fn persist_record(&self, record: PersistedRecord) -> Result<(), SinkError> {
        let mut rows = self
            .records
            .lock()
            .map_err(|_| SinkError::Unavailable("record store poisoned".to_string()))?;
        rows.push(record);
        Ok(())
    }

    fn persist_batch(&self, batch: PersistedBatch) -> Result<(), SinkError> {
        let mut rows = self
            .batches
            .lock()
            .map_err(|_| SinkError::Unavailable("batch store poisoned".to_string()))?;
        rows.push(batch);
        Ok(())
    }
}

/// Risk-level tally used by batch summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskCounts {
    pub fn bump(&mut self, risk: RiskLevel) {
        match risk {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::domain::{ConfidenceScores, Discrepancies, ProviderFacts};

    fn record(id: &str) -> PersistedRecord {
        let provider = ProviderRecord::from_sources(
            id,
            ProviderFacts {
                name: Some("Dr. Jane Doe".to_string()),
                ..ProviderFacts::default()
            },
            ProviderFacts::default(),
        );
        PersistedRecord {
            record_id: id.to_string(),
            validation: ValidationResult::default(),
            enriched: EnrichedRecord {
                name: provider.name.clone(),
                address: None,
                phone: None,
                specialty: None,
                license: None,
                education: "Harvard Medical School".to_string(),
                board_certification: "ABIM - Internal Medicine".to_string(),
                affiliations: Vec::new(),
                accepted_insurances: Vec::new(),
            },
            quality: QualityAssessment {
                confidence: ConfidenceScores::default(),
                discrepancies: Discrepancies::default(),
                fraud_score: 0,
                fraud_flags: Vec::new(),
                license_penalty: 0,
                risk_level: RiskLevel::High,
                needs_manual_review: true,
            },
            fraud: FraudDetail {
                score: 0,
                flags: Vec::new(),
                license_penalty: 0,
            },
            provider,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn memory_sink_stores_and_finds_records() {
        let sink = MemorySink::new();
        sink.persist_record(record("p-1")).expect("persists");
        sink.persist_record(record("p-2")).expect("persists");

        assert_eq!(sink.records().len(), 2);
        assert!(sink.record_for("p-2").is_some());
        assert!(sink.record_for("p-9").is_none());
    }

    #[test]
    fn risk_counts_tally_each_level() {
        let mut counts = RiskCounts::default();
        counts.bump(RiskLevel::Low);
        counts.bump(RiskLevel::High);
        counts.bump(RiskLevel::High);
        assert_eq!(counts, RiskCounts { low: 1, medium: 0, high: 2 });
    }
}
