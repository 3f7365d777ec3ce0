//! Provider directory quality pipeline.
//!
//! Records flow strictly forward through four stages: the comparator
//! validates contact facts against two reference sources, the resolver
//! derives supplementary attributes, the scorer produces confidence and
//! fraud assessments, and the finalizer assembles the shareable directory
//! entry. The batch engine fans whole rosters across a bounded worker pool.

pub mod batch;
pub mod compare;
pub mod directory;
pub mod domain;
pub mod enrich;
pub mod graph;
pub mod roster;
pub mod score;
pub mod sink;
pub mod sources;

pub use batch::{BatchEngine, BatchRun, RecordOutcome, DEFAULT_WORKERS};
pub use domain::{
    ConfidenceScores, DirectoryEntry, Discrepancies, EnrichedRecord, FraudFlag, ProviderFacts,
    ProviderRecord, ProviderStatus, QualityAssessment, ReportSummary, RiskLevel, ValidationResult,
};
pub use graph::{run_pipeline, PipelineOutcome, PipelineStage};
pub use roster::{load_roster, load_roster_path, RosterError};
pub use sink::{
    FraudDetail, MemorySink, PersistedBatch, PersistedRecord, ResultSink, RiskCounts, SinkError,
};
pub use sources::{ContactLookup, ReferenceSource, RegistryLookup, SyntheticReference};
