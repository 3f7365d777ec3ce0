use provider_ai::pipeline::{
    run_pipeline, ContactLookup, ProviderFacts, ProviderRecord, ProviderStatus, ReferenceSource,
    RegistryLookup, RiskLevel, SyntheticReference,
};

/// Echoes the provider's own facts back, simulating reference sources that
/// agree on every field.
struct MirrorSource;

impl ReferenceSource for MirrorSource {
    fn contact(&self, _name: &str, address: Option<&str>) -> ContactLookup {
        ContactLookup {
            phone: Some("(555) 123-4567".to_string()),
            address: address.map(str::to_string),
        }
    }

    fn registry(&self, _name: &str, specialty: Option<&str>) -> RegistryLookup {
        RegistryLookup {
            specialty: specialty.map(str::to_string),
            license: Some("B73920".to_string()),
        }
    }
}

/// Simulates both lookups coming back empty.
struct AbsentSource;

impl ReferenceSource for AbsentSource {
    fn contact(&self, _name: &str, _address: Option<&str>) -> ContactLookup {
        ContactLookup::default()
    }

    fn registry(&self, _name: &str, _specialty: Option<&str>) -> RegistryLookup {
        RegistryLookup::default()
    }
}

/// Returns a nearby but non-matching address, close enough to offer as a
/// correction.
struct RelocatedSource;

impl ReferenceSource for RelocatedSource {
    fn contact(&self, _name: &str, _address: Option<&str>) -> ContactLookup {
        ContactLookup {
            phone: Some("(555) 123-4567".to_string()),
            address: Some("982 Oakwood Drive, MI".to_string()),
        }
    }

    fn registry(&self, _name: &str, specialty: Option<&str>) -> RegistryLookup {
        RegistryLookup {
            specialty: specialty.map(str::to_string),
            license: Some("B73920".to_string()),
        }
    }
}

fn cardiologist() -> ProviderRecord {
    ProviderRecord::from_sources(
        "p-100",
        ProviderFacts {
            name: Some("Dr. Sarah Mitchell".to_string()),
            address: Some("450 Oakwood Boulevard, MI".to_string()),
            phone: Some("555-123-4567".to_string()),
            specialty: Some("Cardiology".to_string()),
            license: Some("MD-445821".to_string()),
        },
        ProviderFacts::default(),
    )
}

#[test]
fn fully_confirmed_provider_is_verified_with_full_confidence() {
    let outcome = run_pipeline(cardiologist(), &MirrorSource);

    assert!(outcome.validation.phone_match, "phones agree after normalization");
    assert!(outcome.validation.address_match);
    assert_eq!(outcome.validation.specialty_match, Some(true));

    let confidence = &outcome.quality.confidence;
    assert_eq!(confidence.phone, 15);
    assert_eq!(confidence.address, 25);
    assert_eq!(confidence.license, 25);
    assert_eq!(confidence.specialty, 15);
    assert_eq!(confidence.education, 10);
    assert_eq!(confidence.affiliations, 10);
    assert_eq!(confidence.overall, 100);

    assert_eq!(outcome.quality.fraud_score, 0);
    assert!(outcome.quality.fraud_flags.is_empty());
    assert_eq!(outcome.quality.license_penalty, 0);
    assert_eq!(outcome.quality.risk_level, RiskLevel::Low);
    assert!(!outcome.quality.needs_manual_review);

    let entry = &outcome.directory;
    assert_eq!(entry.provider_status, ProviderStatus::Verified);
    assert_eq!(entry.phone_masked.as_deref(), Some("****4567"));
    assert_eq!(entry.license_masked.as_deref(), Some("****3920"));
    assert_eq!(entry.priority_score, 110.0);
    assert_eq!(outcome.summary.needs_manual_review, "NO");
    assert_eq!(outcome.summary.overall_confidence, "100%");
}

#[test]
fn unreachable_provider_lands_at_risk() {
    let record = ProviderRecord::from_sources(
        "p-200",
        ProviderFacts {
            name: Some("Dr. Alan Reyes".to_string()),
            ..ProviderFacts::default()
        },
        ProviderFacts::default(),
    );

    let outcome = run_pipeline(record, &AbsentSource);

    assert_eq!(outcome.validation.phone_similarity, 0.0);
    assert!(!outcome.validation.address_match);
    assert_eq!(outcome.validation.specialty_match, None);

    // education and affiliations still resolve, everything else scores zero
    assert_eq!(outcome.quality.confidence.overall, 20);
    assert_eq!(outcome.quality.fraud_score, 50);
    assert_eq!(outcome.quality.license_penalty, 30);
    assert_eq!(outcome.quality.effective_fraud(), 80);
    assert_eq!(outcome.quality.risk_level, RiskLevel::High);
    assert!(outcome.quality.needs_manual_review);

    assert_eq!(outcome.directory.provider_status, ProviderStatus::AtRisk);
    assert_eq!(outcome.directory.phone_masked, None);
    assert_eq!(outcome.directory.license_masked, None);
}

#[test]
fn near_miss_address_is_offered_as_correction() {
    let outcome = run_pipeline(cardiologist(), &RelocatedSource);

    assert!(!outcome.validation.address_match, "similar but below the match bar");
    assert_eq!(
        outcome.validation.corrected_address.as_deref(),
        Some("982 Oakwood Drive, MI")
    );
    assert_eq!(
        outcome.directory.address_corrected.as_deref(),
        Some("982 Oakwood Drive, MI"),
        "the directory entry carries the reference address"
    );
    assert_eq!(
        outcome.directory.address_original.as_deref(),
        Some("450 Oakwood Boulevard, MI")
    );
}

#[test]
fn synthetic_source_is_deterministic_per_provider() {
    let first = run_pipeline(cardiologist(), &SyntheticReference);
    let second = run_pipeline(cardiologist(), &SyntheticReference);

    assert_eq!(first, second, "same record and source must reproduce exactly");
    assert!(first.quality.confidence.overall <= 100);
    if let Some(masked) = &first.directory.phone_masked {
        assert!(masked.starts_with("****") || masked.chars().all(|ch| ch.is_ascii_digit()));
    }
}

#[test]
fn low_risk_never_requires_manual_review() {
    let names = [
        "Dr. Emily Chen",
        "Dr. Robert Kim",
        "Dr. Maria Santos",
        "Dr. David Okafor",
        "Dr. Priya Raman",
        "Dr. Thomas Hale",
    ];

    for name in names {
        let record = ProviderRecord::from_sources(
            format!("p-{name}"),
            ProviderFacts {
                name: Some(name.to_string()),
                address: Some("12 Birch Lane, Austin, TX".to_string()),
                phone: Some("555-987-6543".to_string()),
                specialty: Some("Pediatrics".to_string()),
                license: Some("C55412".to_string()),
            },
            ProviderFacts::default(),
        );
        let outcome = run_pipeline(record, &SyntheticReference);
        if outcome.quality.risk_level == RiskLevel::Low {
            assert!(
                !outcome.quality.needs_manual_review,
                "{name}: low risk must not be queued for review"
            );
        }
    }
}
