//! Directory stage: priority ranking, verification status, masking, and the
//! final externally-shareable entry plus its flattened report summary.

use super::domain::{
    DirectoryEntry, EnrichedRecord, ProviderRecord, ProviderStatus, QualityAssessment, ReportSummary,
    RiskLevel, ValidationResult,
};

const MASK: &str = "****";

/// Impact weight for ranking: higher-acuity specialties bubble records toward
/// the top of manual-review queues.
fn specialty_weight(specialty: Option<&str>) -> f64 {
    match specialty.unwrap_or("") {
        "Cardiology" => 1.0,
        "Oncology" => 0.9,
        "Neurology" => 0.85,
        "Orthopedics" => 0.8,
        "Gastroenterology" => 0.75,
        "Pediatrics" => 0.7,
        "Dermatology" => 0.6,
        _ => 0.5,
    }
}

fn priority_score(overall: u8, risk: RiskLevel, fraud: u8, specialty: Option<&str>) -> f64 {
    let score = f64::from(overall) * 0.5
        + (100.0 - f64::from(fraud)) * 0.3
        + specialty_weight(specialty) * 20.0
        + risk.priority_weight() * 10.0;
    (score * 10.0).round() / 10.0
}

fn provider_status(risk: RiskLevel, overall: u8) -> ProviderStatus {
    match risk {
        RiskLevel::Low if overall >= 80 => ProviderStatus::Verified,
        RiskLevel::High if overall < 50 => ProviderStatus::AtRisk,
        _ => ProviderStatus::PartiallyVerified,
    }
}

/// Retain only the last four digits of a phone number behind the mask marker.
pub fn mask_phone(phone: Option<&str>) -> Option<String> {
    let raw = phone?;
    let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        Some(format!("{MASK}{digits}"))
    } else {
        Some(format!("{MASK}{}", &digits[digits.len() - 4..]))
    }
}

/// Retain only the last four characters of a license identifier.
pub fn mask_license(license: Option<&str>) -> Option<String> {
    let raw = license?;
    if raw.len() <= 4 {
        Some(MASK.to_string())
    } else {
        let tail_at = raw
            .char_indices()
            .rev()
            .nth(3)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        Some(format!("{MASK}{}", &raw[tail_at..]))
    }
}

/// Assemble the final directory entry and its report summary. Pure transform;
/// downstream consumers (e.g. outreach drafts) read the result, never this
/// stage's inputs.
pub fn finalize(
    provider: &ProviderRecord,
    enriched: &EnrichedRecord,
    validation: &ValidationResult,
    quality: &QualityAssessment,
) -> (DirectoryEntry, ReportSummary) {
    let overall = quality.confidence.overall;
    let priority = priority_score(
        overall,
        quality.risk_level,
        quality.fraud_score,
        provider.specialty.as_deref(),
    );
    let status = provider_status(quality.risk_level, overall);

    let entry = DirectoryEntry {
        name: provider.name.clone(),
        address_original: provider.address.clone(),
        address_corrected: validation
            .corrected_address
            .clone()
            .or_else(|| provider.address.clone()),
        phone_masked: mask_phone(provider.phone.as_deref()),
        phone_corrected_masked: mask_phone(validation.corrected_phone.as_deref()),
        specialty: provider.specialty.clone(),
        license_masked: mask_license(enriched.license.as_deref()),
        education: enriched.education.clone(),
        board_certification: enriched.board_certification.clone(),
        affiliations: enriched.affiliations.clone(),
        accepted_insurances: enriched.accepted_insurances.clone(),
        confidence_overall: overall,
        risk_level: quality.risk_level,
        fraud_score: quality.fraud_score,
        needs_manual_review: quality.needs_manual_review,
        provider_status: status,
        priority_score: priority,
    };

    let summary = ReportSummary {
        provider_name: entry.name.clone(),
        status: status.label().to_string(),
        overall_confidence: format!("{overall}%"),
        risk_level: quality.risk_level.label().to_string(),
        fraud_score: quality.fraud_score,
        priority_score: priority,
        needs_manual_review: if quality.needs_manual_review { "YES" } else { "NO" }.to_string(),
        masked_phone: entry.phone_masked.clone(),
        masked_license: entry.license_masked.clone(),
    };

    (entry, summary)
}
