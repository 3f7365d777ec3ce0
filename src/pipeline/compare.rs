//! Comparator stage: normalizes provider contact facts and fuzzy-matches them
//! against the two independent reference lookups.

use strsim::normalized_levenshtein;

use super::domain::{ProviderRecord, ValidationResult};
use super::sources::{ContactLookup, RegistryLookup};

/// Similarity at or above this counts as a confirmed match.
const MATCH_THRESHOLD: f64 = 0.85;
/// Looser threshold at which a reference value is still offered as a
/// correction, even when the match itself failed.
const CORRECTION_THRESHOLD: f64 = 0.60;

const STREET_ABBREVIATIONS: [(&str, &str); 5] = [
    ("street", "st"),
    ("avenue", "ave"),
    ("boulevard", "blvd"),
    ("road", "rd"),
    ("drive", "dr"),
];

/// Compare a provider record against the contact and registry lookups.
/// Pure function: missing inputs degrade to null/false, never an error.
pub fn compare(
    provider: &ProviderRecord,
    contact: &ContactLookup,
    registry: &RegistryLookup,
) -> ValidationResult {
    let p_phone = provider.phone.as_deref().and_then(normalize_phone);
    let c_phone = contact.phone.as_deref().and_then(normalize_phone);
    let p_addr = provider.address.as_deref().and_then(normalize_address);
    let c_addr = contact.address.as_deref().and_then(normalize_address);

    let phone_similarity = similarity(p_phone.as_deref(), c_phone.as_deref());
    let address_similarity = similarity(p_addr.as_deref(), c_addr.as_deref());

    let phone_match =
        p_phone.is_some() && c_phone.is_some() && phone_similarity >= MATCH_THRESHOLD;
    let address_match =
        p_addr.is_some() && c_addr.is_some() && address_similarity >= MATCH_THRESHOLD;

    let specialty_match = match (provider.specialty.as_deref(), registry.specialty.as_deref()) {
        (Some(ours), Some(theirs)) if !ours.trim().is_empty() && !theirs.trim().is_empty() => {
            Some(ours.trim().eq_ignore_ascii_case(theirs.trim()))
        }
        _ => None,
    };

    // Corrections carry the lookup's raw value, not the normalized form.
    let corrected_phone = if phone_similarity >= CORRECTION_THRESHOLD {
        contact.phone.clone()
    } else {
        None
    };
    let corrected_address = if address_similarity >= CORRECTION_THRESHOLD {
        contact.address.clone()
    } else {
        None
    };

    ValidationResult {
        phone_match,
        address_match,
        specialty_match,
        phone_similarity,
        address_similarity,
        corrected_phone,
        corrected_address,
        license: registry.license.clone(),
    }
}

/// Strip everything but digits and drop a leading US country code. Partial
/// results are kept rather than discarded.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits.remove(0);
    }
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Lowercase, abbreviate common street-type words, and collapse punctuation
/// and whitespace runs to single spaces.
pub fn normalize_address(raw: &str) -> Option<String> {
    let lowered = raw.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|ch| if ch == ',' || ch == '.' { ' ' } else { ch })
        .collect();

    let words: Vec<&str> = cleaned
        .split_whitespace()
        .map(|word| {
            STREET_ABBREVIATIONS
                .iter()
                .find(|(long, _)| *long == word)
                .map(|(_, short)| *short)
                .unwrap_or(word)
        })
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Normalized edit-distance ratio in [0, 1], rounded to three decimals.
/// Returns 0.0 when either side is empty or missing.
fn similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(left), Some(right)) if !left.is_empty() && !right.is_empty() => {
            (normalized_levenshtein(left, right) * 1000.0).round() / 1000.0
        }
        _ => 0.0,
    }
}
