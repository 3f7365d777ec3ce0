//! Enrichment stage: derives education, certification, affiliation, and
//! insurance attributes from provider identity via stable hash-based
//! selection over fixed candidate tables, so results are reproducible for a
//! given input.

use sha2::{Digest, Sha256};

use super::domain::{EnrichedRecord, ProviderRecord, ValidationResult};

const MED_SCHOOLS: [&str; 12] = [
    "Harvard Medical School",
    "Johns Hopkins School of Medicine",
    "Stanford University School of Medicine",
    "Mayo Clinic Alix School of Medicine",
    "Columbia University Vagelos College of Physicians and Surgeons",
    "Perelman School of Medicine at the University of Pennsylvania",
    "Yale School of Medicine",
    "Duke University School of Medicine",
    "University of Michigan Medical School",
    "Northwestern University Feinberg School of Medicine",
    "Baylor College of Medicine",
    "University of Pittsburgh School of Medicine",
];

const DEFAULT_BOARD: &str = "ABIM - Internal Medicine";

const DEFAULT_HOSPITALS: [&str; 2] = ["General City Hospital", "Regional Medical Center"];

const INSURANCE_PANELS: [&str; 6] = [
    "Aetna",
    "Cigna",
    "UnitedHealthcare",
    "Blue Cross Blue Shield",
    "Humana",
    "Kaiser Permanente",
];

fn board_for_specialty(specialty: &str) -> &'static str {
    match specialty {
        "Cardiology" => "ABIM - Cardiovascular Disease",
        "Gastroenterology" => "ABIM - Gastroenterology",
        "Pediatrics" => "ABP - Pediatrics",
        "Dermatology" => "ABD - Dermatology",
        "Oncology" => "ABIM - Medical Oncology",
        "Neurology" => "ABPN - Neurology",
        "Psychiatry" => "ABPN - Psychiatry",
        "Orthopedics" => "ABOS - Orthopaedic Surgery",
        "Endocrinology" => "ABIM - Endocrinology, Diabetes & Metabolism",
        "Radiology" => "ABR - Diagnostic Radiology",
        _ => DEFAULT_BOARD,
    }
}

fn hospitals_for_state(state: &str) -> &'static [&'static str] {
    match state {
        "PA" => &[
            "UPMC Presbyterian",
            "Allegheny General Hospital",
            "Penn Presbyterian Medical Center",
        ],
        "FL" => &[
            "Jackson Memorial Hospital",
            "Mayo Clinic Florida",
            "Tampa General Hospital",
        ],
        "MI" => &[
            "Michigan Medicine - Ann Arbor",
            "Henry Ford Hospital",
            "Beaumont Hospital Royal Oak",
        ],
        "GA" => &[
            "Emory University Hospital",
            "Piedmont Atlanta Hospital",
            "Northside Hospital Atlanta",
        ],
        "TX" => &[
            "Houston Methodist Hospital",
            "Baylor St. Luke's Medical Center",
            "UT Southwestern Medical Center",
        ],
        "CA" => &[
            "UCLA Medical Center",
            "Stanford Health Care",
            "UCSF Medical Center",
        ],
        "NY" => &[
            "NewYork-Presbyterian Hospital",
            "NYU Langone Health",
            "Mount Sinai Hospital",
        ],
        "NC" => &[
            "Duke University Hospital",
            "UNC Hospitals",
            "Wake Forest Baptist Health",
        ],
        "OH" => &[
            "Cleveland Clinic",
            "Ohio State University Wexner Medical Center",
            "Cincinnati Children's Hospital",
        ],
        "IL" => &[
            "Northwestern Memorial Hospital",
            "University of Chicago Medical Center",
            "Rush University Medical Center",
        ],
        _ => &DEFAULT_HOSPITALS,
    }
}

/// Deterministic index from a string key. SHA-256 rather than the std hasher
/// so the same key maps to the same slot across runs and processes.
pub fn stable_index(key: &str, len: usize) -> usize {
    debug_assert!(len > 0);
    let digest = Sha256::digest(key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % len as u64) as usize
}

/// Parse a two-letter state code out of the final comma-delimited address
/// segment, e.g. "3897 Oak Drive, PA" yields "PA".
fn state_from_address(address: Option<&str>) -> Option<String> {
    let last_segment = address?.rsplit(',').next()?;
    let token = last_segment.split_whitespace().next()?;
    let state = token.to_uppercase();
    if state.len() == 2 && state.chars().all(|ch| ch.is_ascii_alphabetic()) {
        Some(state)
    } else {
        None
    }
}

/// Derive the supplementary profile for a provider. Deterministic and
/// idempotent in (name, specialty, address).
pub fn enrich(provider: &ProviderRecord, validation: &ValidationResult) -> EnrichedRecord {
    let name = provider.name.as_str();
    let specialty = provider.specialty.as_deref().unwrap_or("");
    let address = provider.address.as_deref().unwrap_or("");
    let state = state_from_address(provider.address.as_deref());

    let education = MED_SCHOOLS[stable_index(name, MED_SCHOOLS.len())].to_string();
    let board_certification = board_for_specialty(specialty).to_string();

    let hospitals = hospitals_for_state(state.as_deref().unwrap_or(""));
    let hospital_idx = stable_index(&format!("{name}-{address}"), hospitals.len());
    let mut affiliations = vec![hospitals[hospital_idx].to_string()];
    if hospitals.len() > 1 {
        let alternate = hospitals[(hospital_idx + 1) % hospitals.len()];
        if alternate != affiliations[0] {
            affiliations.push(alternate.to_string());
        }
    }

    let state_key = state.as_deref().unwrap_or("DEFAULT");
    let panel_start = stable_index(
        &format!("{name}-{specialty}-{state_key}"),
        INSURANCE_PANELS.len(),
    );
    let accepted_insurances = (0..3)
        .map(|offset| INSURANCE_PANELS[(panel_start + offset) % INSURANCE_PANELS.len()].to_string())
        .collect();

    EnrichedRecord {
        name: provider.name.clone(),
        address: provider.address.clone(),
        phone: provider.phone.clone(),
        specialty: provider.specialty.clone(),
        // the registry-resolved license outranks whatever the roster carried
        license: validation.license.clone().or_else(|| provider.license.clone()),
        education,
        board_certification,
        affiliations,
        accepted_insurances,
    }
}
