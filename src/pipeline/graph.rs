//! Pipeline orchestrator: a fixed, non-branching four-stage sequence.
//!
//! Each stage is a pure function consuming the outputs of prior stages, so
//! the run accumulates state without ever mutating an earlier stage's result.
//! Every invocation builds a fresh run; nothing is cached across calls and no
//! state can leak between concurrent invocations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::compare::compare;
use super::directory::finalize;
use super::domain::{
    DirectoryEntry, EnrichedRecord, ProviderRecord, QualityAssessment, ReportSummary,
    ValidationResult,
};
use super::enrich::enrich;
use super::score::assess;
use super::sources::ReferenceSource;

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Validate,
    Enrich,
    Quality,
    Directory,
}

impl PipelineStage {
    pub const fn ordered() -> [Self; 4] {
        [Self::Validate, Self::Enrich, Self::Quality, Self::Directory]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Enrich => "enrich",
            Self::Quality => "quality",
            Self::Directory => "directory",
        }
    }
}

/// Terminal pipeline state: the input record plus every stage's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub provider: ProviderRecord,
    pub validation: ValidationResult,
    pub enriched: EnrichedRecord,
    pub quality: QualityAssessment,
    pub directory: DirectoryEntry,
    pub summary: ReportSummary,
}

/// Run the full validate -> enrich -> quality -> directory sequence for one
/// record. Synchronous and infallible: missing data degrades inside each
/// stage rather than aborting the run.
pub fn run_pipeline(provider: ProviderRecord, source: &dyn ReferenceSource) -> PipelineOutcome {
    debug!(record = %provider.id, stage = PipelineStage::Validate.label(), "pipeline stage");
    let contact = source.contact(&provider.name, provider.address.as_deref());
    let registry = source.registry(&provider.name, provider.specialty.as_deref());
    let validation = compare(&provider, &contact, &registry);

    debug!(record = %provider.id, stage = PipelineStage::Enrich.label(), "pipeline stage");
    let enriched = enrich(&provider, &validation);

    debug!(record = %provider.id, stage = PipelineStage::Quality.label(), "pipeline stage");
    let quality = assess(&provider, &validation, &enriched);

    debug!(record = %provider.id, stage = PipelineStage::Directory.label(), "pipeline stage");
    let (directory, summary) = finalize(&provider, &enriched, &validation, &quality);

    PipelineOutcome {
        provider,
        validation,
        enriched,
        quality,
        directory,
        summary,
    }
}
