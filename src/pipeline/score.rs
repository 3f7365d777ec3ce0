//! Quality stage: weighted confidence scoring, rule-based fraud signals, and
//! risk classification.
//!
//! Confidence uses a fixed point budget per field, awarded in discrete tiers
//! rather than continuous interpolation, which keeps every threshold
//! auditable. The budgets sum to 100, so the overall score needs no cap.

use super::domain::{
    license_resolved, ConfidenceScores, Discrepancies, EnrichedRecord, FraudFlag, ProviderRecord,
    QualityAssessment, RiskLevel, ValidationResult, UNKNOWN_EDUCATION,
};

const FRAUD_CAP: u32 = 100;
/// Applied on top of the capped base score when the license is unresolved at
/// classification time.
const LICENSE_PENALTY: u8 = 30;
/// An effective fraud signal above this forces HIGH risk regardless of
/// confidence.
const FRAUD_OVERRIDE: u16 = 60;

/// Score a record given the comparator and enrichment outputs. All inputs are
/// treated as optionally absent; nothing here raises an error.
pub fn assess(
    provider: &ProviderRecord,
    validation: &ValidationResult,
    enriched: &EnrichedRecord,
) -> QualityAssessment {
    let confidence = confidence_scores(validation, provider, enriched);
    let discrepancies = discrepancies(provider, validation);
    let (fraud_score, fraud_flags) = fraud_signals(provider, validation, enriched);

    let license_penalty = if discrepancies.missing_license {
        LICENSE_PENALTY
    } else {
        0
    };
    let effective_fraud = fraud_score as u16 + license_penalty as u16;
    let (risk_level, needs_manual_review) = classify(confidence.overall, effective_fraud);

    QualityAssessment {
        confidence,
        discrepancies,
        fraud_score,
        fraud_flags,
        license_penalty,
        risk_level,
        needs_manual_review,
    }
}

fn confidence_scores(
    validation: &ValidationResult,
    provider: &ProviderRecord,
    enriched: &EnrichedRecord,
) -> ConfidenceScores {
    let phone = if validation.phone_match {
        15
    } else if validation.phone_similarity >= 0.7 {
        10
    } else if validation.phone_similarity > 0.4 {
        5
    } else {
        0
    };

    let address = if validation.address_match {
        25
    } else if validation.address_similarity >= 0.7 {
        15
    } else if validation.address_similarity > 0.4 {
        5
    } else {
        0
    };

    let license_ok = license_resolved(validation.license.as_deref());
    let license = if license_ok { 25 } else { 0 };

    let specialty = if validation.specialty_match == Some(true) {
        15
    } else if provider.specialty.is_some() && license_ok {
        // partial credit: the registry confirmed the provider even though the
        // stated specialty did not line up exactly
        10
    } else {
        0
    };

    let education = if enriched.education != UNKNOWN_EDUCATION && !enriched.education.is_empty() {
        10
    } else {
        0
    };

    let affiliations = if enriched.affiliations.is_empty() { 0 } else { 10 };

    ConfidenceScores {
        phone,
        address,
        license,
        specialty,
        education,
        affiliations,
        overall: phone + address + license + specialty + education + affiliations,
    }
}

fn discrepancies(provider: &ProviderRecord, validation: &ValidationResult) -> Discrepancies {
    Discrepancies {
        phone_mismatch: !validation.phone_match,
        address_mismatch: !validation.address_match,
        specialty_mismatch: validation.specialty_match != Some(true),
        missing_phone: provider.phone.is_none(),
        missing_address: provider.address.is_none(),
        missing_license: !license_resolved(validation.license.as_deref()),
    }
}

fn fraud_signals(
    provider: &ProviderRecord,
    validation: &ValidationResult,
    enriched: &EnrichedRecord,
) -> (u8, Vec<FraudFlag>) {
    let mut score: u32 = 0;
    let mut flags = Vec::new();

    if provider.phone.is_none() || provider.address.is_none() {
        flags.push(FraudFlag::MissingContactInfo);
        score += 20;
    }

    let license = validation.license.as_deref();
    if !license_resolved(license) {
        flags.push(FraudFlag::MissingLicense);
        score += 30;
    } else if let Some(value) = license {
        // a real license should carry at least five characters and a letter
        let trimmed = value.trim();
        if trimmed.len() < 5 || trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            flags.push(FraudFlag::SuspiciousLicensePattern);
            score += 20;
        }
    }

    if validation.specialty_match == Some(false) {
        flags.push(FraudFlag::SpecialtyMismatch);
        score += 15;
    }

    if enriched.education.is_empty() || enriched.education == UNKNOWN_EDUCATION {
        flags.push(FraudFlag::NoEducationInfo);
        score += 10;
    }

    (score.min(FRAUD_CAP) as u8, flags)
}

fn classify(overall: u8, effective_fraud: u16) -> (RiskLevel, bool) {
    if effective_fraud > FRAUD_OVERRIDE {
        (RiskLevel::High, true)
    } else if overall >= 85 {
        (RiskLevel::Low, false)
    } else if overall >= 65 {
        (RiskLevel::Medium, true)
    } else {
        (RiskLevel::High, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::domain::ProviderFacts;
    use crate::pipeline::enrich::enrich;

    fn provider(phone: Option<&str>, address: Option<&str>, specialty: Option<&str>) -> ProviderRecord {
        ProviderRecord::from_sources(
            "p-1",
            ProviderFacts {
                name: Some("Dr. Jane Doe".to_string()),
                address: address.map(str::to_string),
                phone: phone.map(str::to_string),
                specialty: specialty.map(str::to_string),
                license: None,
            },
            ProviderFacts::default(),
        )
    }

    fn full_validation(license: Option<&str>) -> ValidationResult {
        ValidationResult {
            phone_match: true,
            address_match: true,
            specialty_match: Some(true),
            phone_similarity: 1.0,
            address_similarity: 1.0,
            corrected_phone: None,
            corrected_address: None,
            license: license.map(str::to_string),
        }
    }

    fn assessment_for(validation: &ValidationResult) -> QualityAssessment {
        let record = provider(
            Some("(555) 123-4567"),
            Some("100 Main Street, PA"),
            Some("Cardiology"),
        );
        let enriched = enrich(&record, validation);
        assess(&record, validation, &enriched)
    }

    #[test]
    fn fully_verified_record_scores_a_hundred_and_low_risk() {
        let quality = assessment_for(&full_validation(Some("A12345")));

        assert_eq!(quality.confidence.overall, 100);
        assert_eq!(quality.fraud_score, 0);
        assert!(quality.fraud_flags.is_empty());
        assert_eq!(quality.risk_level, RiskLevel::Low);
        assert!(!quality.needs_manual_review);
    }

    #[test]
    fn subscores_never_exceed_their_budgets() {
        let validations = [
            ValidationResult::default(),
            full_validation(Some("A12345")),
            full_validation(Some("Not Found")),
            ValidationResult {
                phone_similarity: 0.75,
                address_similarity: 0.5,
                specialty_match: Some(false),
                license: Some("91".to_string()),
                ..ValidationResult::default()
            },
        ];

        for validation in &validations {
            let quality = assessment_for(validation);
            let scores = quality.confidence;
            assert!(scores.phone <= 15);
            assert!(scores.address <= 25);
            assert!(scores.license <= 25);
            assert!(scores.specialty <= 15);
            assert!(scores.education <= 10);
            assert!(scores.affiliations <= 10);
            assert!(scores.overall <= 100);
            assert!(quality.fraud_score <= 100);
        }
    }

    #[test]
    fn similarity_tiers_award_partial_credit() {
        let validation = ValidationResult {
            phone_similarity: 0.72,
            address_similarity: 0.45,
            ..ValidationResult::default()
        };
        let quality = assessment_for(&validation);
        assert_eq!(quality.confidence.phone, 10);
        assert_eq!(quality.confidence.address, 5);
    }

    #[test]
    fn specialty_gets_partial_credit_when_license_resolves() {
        let validation = ValidationResult {
            specialty_match: Some(false),
            license: Some("A12345".to_string()),
            ..ValidationResult::default()
        };
        let quality = assessment_for(&validation);
        assert_eq!(quality.confidence.specialty, 10);
        assert_eq!(quality.confidence.license, 25);
    }

    #[test]
    fn sentinel_license_scores_zero_and_flags_missing() {
        let quality = assessment_for(&full_validation(Some("Not Found")));
        assert_eq!(quality.confidence.license, 0);
        assert!(quality.discrepancies.missing_license);
        assert!(quality.fraud_flags.contains(&FraudFlag::MissingLicense));
        assert_eq!(quality.license_penalty, 30);
        // the sentinel never trips the pattern rule
        assert!(!quality
            .fraud_flags
            .contains(&FraudFlag::SuspiciousLicensePattern));
    }

    #[test]
    fn short_license_trips_the_pattern_rule_via_length() {
        // "A1" is non-numeric, so only the length clause fires
        let quality = assessment_for(&full_validation(Some("A1")));
        assert!(quality
            .fraud_flags
            .contains(&FraudFlag::SuspiciousLicensePattern));
        assert_eq!(quality.fraud_score, 20);
    }

    #[test]
    fn all_numeric_license_trips_the_pattern_rule() {
        let quality = assessment_for(&full_validation(Some("1234567")));
        assert!(quality
            .fraud_flags
            .contains(&FraudFlag::SuspiciousLicensePattern));
    }

    #[test]
    fn missing_contact_info_raises_fraud() {
        let record = provider(None, None, Some("Cardiology"));
        let validation = ValidationResult::default();
        let enriched = enrich(&record, &validation);
        let quality = assess(&record, &validation, &enriched);

        assert!(quality.fraud_flags.contains(&FraudFlag::MissingContactInfo));
        assert!(quality.fraud_flags.contains(&FraudFlag::MissingLicense));
        // base 20 + 30, capped budget untouched
        assert_eq!(quality.fraud_score, 50);
        assert_eq!(quality.license_penalty, 30);
        assert_eq!(quality.effective_fraud(), 80);
        assert_eq!(quality.risk_level, RiskLevel::High);
    }

    #[test]
    fn explicit_specialty_mismatch_flags_but_absence_does_not() {
        let mismatch = ValidationResult {
            specialty_match: Some(false),
            license: Some("A12345".to_string()),
            ..ValidationResult::default()
        };
        let quality = assessment_for(&mismatch);
        assert!(quality.fraud_flags.contains(&FraudFlag::SpecialtyMismatch));

        let absent = ValidationResult {
            specialty_match: None,
            license: Some("A12345".to_string()),
            ..ValidationResult::default()
        };
        let quality = assessment_for(&absent);
        assert!(!quality.fraud_flags.contains(&FraudFlag::SpecialtyMismatch));
        // still surfaces as a discrepancy for reporting
        assert!(quality.discrepancies.specialty_mismatch);
    }

    #[test]
    fn fraud_override_forces_high_even_at_high_confidence() {
        let (risk, review) = classify(90, 70);
        assert_eq!(risk, RiskLevel::High);
        assert!(review);
    }

    #[test]
    fn risk_tiers_follow_overall_confidence() {
        assert_eq!(classify(85, 0), (RiskLevel::Low, false));
        assert_eq!(classify(84, 0), (RiskLevel::Medium, true));
        assert_eq!(classify(65, 0), (RiskLevel::Medium, true));
        assert_eq!(classify(64, 0), (RiskLevel::High, true));
        // boundary: override requires strictly more than 60
        assert_eq!(classify(90, 60), (RiskLevel::Low, false));
        assert_eq!(classify(90, 61), (RiskLevel::High, true));
    }

    #[test]
    fn low_risk_implies_no_manual_review() {
        for overall in 0..=100u8 {
            for fraud in [0u16, 30, 60, 61, 100, 125] {
                let (risk, review) = classify(overall, fraud);
                if risk == RiskLevel::Low {
                    assert!(!review);
                } else {
                    assert!(review);
                }
            }
        }
    }
}
