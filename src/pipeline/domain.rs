use serde::{Deserialize, Serialize};

/// Placeholder used when a roster row arrives without a usable name. Records
/// with a placeholder name still flow through the pipeline; this is a
/// best-effort scoring system, not a validating gatekeeper.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Sentinel for an education field that could not be derived.
pub const UNKNOWN_EDUCATION: &str = "Unknown";

/// Sentinel values a registry lookup may return in place of a real license.
const LICENSE_SENTINELS: [&str; 3] = ["not found", "not_found", "error"];

/// Raw provider facts from a single provenance. Every field is optional so
/// partially-populated sources merge cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFacts {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub license: Option<String>,
}

/// Identity and contact facts for one directory entry, resolved from its
/// primary source and an optional higher-priority attested source. Immutable
/// once constructed for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub license: Option<String>,
}

impl ProviderRecord {
    /// Merge two provenances into a single record. A non-blank attested value
    /// always wins over the primary one.
    pub fn from_sources(id: impl Into<String>, primary: ProviderFacts, attested: ProviderFacts) -> Self {
        let name = non_blank(attested.name)
            .or_else(|| non_blank(primary.name))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        Self {
            id: id.into(),
            name,
            address: non_blank(attested.address).or_else(|| non_blank(primary.address)),
            phone: non_blank(attested.phone).or_else(|| non_blank(primary.phone)),
            specialty: non_blank(attested.specialty).or_else(|| non_blank(primary.specialty)),
            license: non_blank(attested.license).or_else(|| non_blank(primary.license)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == raw.len() {
            Some(raw)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// True when a license value is usable, i.e. present, non-blank, and not one
/// of the registry's "Not Found"/"Error" sentinels.
pub fn license_resolved(license: Option<&str>) -> bool {
    match license {
        Some(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            !normalized.is_empty() && !LICENSE_SENTINELS.contains(&normalized.as_str())
        }
        None => false,
    }
}

/// Output of the comparator stage. Created once per run, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub phone_match: bool,
    pub address_match: bool,
    /// `None` when either side of the comparison was absent; `Some(false)` is
    /// an explicit mismatch and carries a fraud signal that absence does not.
    pub specialty_match: Option<bool>,
    pub phone_similarity: f64,
    pub address_similarity: f64,
    pub corrected_phone: Option<String>,
    pub corrected_address: Option<String>,
    pub license: Option<String>,
}

/// Provider facts plus derived supplementary attributes. Deterministic given
/// (name, specialty, address).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub license: Option<String>,
    pub education: String,
    pub board_certification: String,
    pub affiliations: Vec<String>,
    pub accepted_insurances: Vec<String>,
}

/// Per-field confidence subscores under the fixed point budget, plus their
/// sum. The budgets total 100, so `overall` never needs further capping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    pub phone: u8,
    pub address: u8,
    pub license: u8,
    pub specialty: u8,
    pub education: u8,
    pub affiliations: u8,
    pub overall: u8,
}

/// Boolean flags per mismatched or missing field, reported alongside the
/// assessment and consumed by the directory finalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancies {
    pub phone_mismatch: bool,
    pub address_mismatch: bool,
    pub specialty_mismatch: bool,
    pub missing_phone: bool,
    pub missing_address: bool,
    pub missing_license: bool,
}

/// Rule-based fraud signal labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudFlag {
    MissingContactInfo,
    MissingLicense,
    SuspiciousLicensePattern,
    SpecialtyMismatch,
    NoEducationInfo,
}

impl FraudFlag {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MissingContactInfo => "missing_contact_info",
            Self::MissingLicense => "missing_license",
            Self::SuspiciousLicensePattern => "suspicious_license_pattern",
            Self::SpecialtyMismatch => "specialty_mismatch",
            Self::NoEducationInfo => "no_education_info",
        }
    }
}

/// Risk classification driving manual-review routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Weight applied when ranking manual-review queues.
    pub const fn priority_weight(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 0.6,
            Self::High => 0.2,
        }
    }
}

/// Output of the confidence and fraud scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub confidence: ConfidenceScores,
    pub discrepancies: Discrepancies,
    /// Additive rule-based score, capped at 100.
    pub fraud_score: u8,
    pub fraud_flags: Vec<FraudFlag>,
    /// Uncapped top-up applied after the base cap when the license remains
    /// unresolved; feeds risk classification without re-entering `fraud_score`.
    pub license_penalty: u8,
    pub risk_level: RiskLevel,
    pub needs_manual_review: bool,
}

impl QualityAssessment {
    /// Fraud signal used by the risk override: capped base plus the
    /// downstream license penalty.
    pub fn effective_fraud(&self) -> u16 {
        self.fraud_score as u16 + self.license_penalty as u16
    }
}

/// Human-readable verification status in the published directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Verified,
    PartiallyVerified,
    AtRisk,
}

impl ProviderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::PartiallyVerified => "Partially Verified",
            Self::AtRisk => "At-Risk",
        }
    }
}

/// Final, externally-shareable record. Sensitive fields arrive masked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub address_original: Option<String>,
    pub address_corrected: Option<String>,
    pub phone_masked: Option<String>,
    pub phone_corrected_masked: Option<String>,
    pub specialty: Option<String>,
    pub license_masked: Option<String>,
    pub education: String,
    pub board_certification: String,
    pub affiliations: Vec<String>,
    pub accepted_insurances: Vec<String>,
    pub confidence_overall: u8,
    pub risk_level: RiskLevel,
    pub fraud_score: u8,
    pub needs_manual_review: bool,
    pub provider_status: ProviderStatus,
    pub priority_score: f64,
}

/// Flattened per-record summary suitable for reporting and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub provider_name: String,
    pub status: String,
    pub overall_confidence: String,
    pub risk_level: String,
    pub fraud_score: u8,
    pub priority_score: f64,
    pub needs_manual_review: String,
    pub masked_phone: Option<String>,
    pub masked_license: Option<String>,
}
