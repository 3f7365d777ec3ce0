//! Reference-lookup boundary. Production deployments wire real primary and
//! registry sources behind [`ReferenceSource`]; lookup failures surface as
//! `None` or sentinel values, never as errors, so the comparator can degrade
//! gracefully.

use serde::{Deserialize, Serialize};

use super::enrich::stable_index;

/// Registry sentinel for an unlocatable license.
pub const LICENSE_NOT_FOUND: &str = "Not Found";

/// Primary-source result: independently observed contact facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLookup {
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Secondary-source result: registry specialty and license.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryLookup {
    pub specialty: Option<String>,
    pub license: Option<String>,
}

/// The two independent reference sources the comparator consults.
/// Implementations own their transport concerns (timeouts, retries) and must
/// map any failure to absent or sentinel values.
pub trait ReferenceSource: Send + Sync {
    fn contact(&self, name: &str, address: Option<&str>) -> ContactLookup;
    fn registry(&self, name: &str, specialty: Option<&str>) -> RegistryLookup;
}

const PHONE_BOOK: [&str; 6] = [
    "(549) 736-9965",
    "(480) 660-6800",
    "(429) 481-6247",
    "(664) 227-4222",
    "(425) 636-2017",
    "(671) 471-1010",
];

const STREET_SUFFIXES: [&str; 4] = ["Drive", "St", "Ave", "Blvd"];
const STATES: [&str; 10] = ["PA", "FL", "TX", "MI", "GA", "NY", "OH", "NC", "CA", "IL"];

const SPECIALTIES: [&str; 10] = [
    "Cardiology",
    "Dermatology",
    "Pediatrics",
    "Radiology",
    "Oncology",
    "Neurology",
    "Psychiatry",
    "Gastroenterology",
    "Endocrinology",
    "Orthopedics",
];

/// Deterministic stand-in for the production lookups. Buckets each provider
/// by a stable hash of their name so the scenario mix of the real world
/// (clean result, divergent address, partial data, no result) is reproduced
/// without any randomness, keeping pipeline runs repeatable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticReference;

impl SyntheticReference {
    fn divergent_address(name: &str) -> String {
        let seed = stable_index(&format!("addr-{name}"), 8000);
        let suffix = STREET_SUFFIXES[stable_index(name, STREET_SUFFIXES.len())];
        let state = STATES[stable_index(&format!("state-{name}"), STATES.len())];
        format!("{} Oak {suffix}, {state}", 1000 + seed)
    }

    fn license_for(name: &str) -> String {
        let letter = b'A' + (stable_index(&format!("lic-{name}"), 4) as u8);
        let number = 10000 + stable_index(&format!("licno-{name}"), 90000);
        format!("{}{number}", letter as char)
    }
}

impl ReferenceSource for SyntheticReference {
    fn contact(&self, name: &str, address: Option<&str>) -> ContactLookup {
        match stable_index(&format!("contact-{name}"), 10) {
            // clean listing: same address, directory phone on file
            0..=3 => ContactLookup {
                phone: Some(PHONE_BOOK[stable_index(name, PHONE_BOOK.len())].to_string()),
                address: address.map(str::to_string),
            },
            // listing moved: phone on file but a different address
            4..=6 => ContactLookup {
                phone: Some(PHONE_BOOK[stable_index(name, PHONE_BOOK.len())].to_string()),
                address: Some(Self::divergent_address(name)),
            },
            // partial listing: no phone captured
            7..=8 => ContactLookup {
                phone: None,
                address: address.map(str::to_string),
            },
            // no listing at all
            _ => ContactLookup::default(),
        }
    }

    fn registry(&self, name: &str, specialty: Option<&str>) -> RegistryLookup {
        match stable_index(&format!("registry-{name}"), 10) {
            0..=3 => RegistryLookup {
                specialty: specialty
                    .map(str::to_string)
                    .or_else(|| Some(SPECIALTIES[stable_index(name, SPECIALTIES.len())].to_string())),
                license: Some(Self::license_for(name)),
            },
            4..=6 => RegistryLookup {
                specialty: Some(SPECIALTIES[stable_index(name, SPECIALTIES.len())].to_string()),
                license: Some(Self::license_for(name)),
            },
            7..=8 => RegistryLookup {
                specialty: None,
                license: Some(Self::license_for(name)),
            },
            _ => RegistryLookup {
                specialty: Some(SPECIALTIES[stable_index(name, SPECIALTIES.len())].to_string()),
                license: Some(LICENSE_NOT_FOUND.to_string()),
            },
        }
    }
}
