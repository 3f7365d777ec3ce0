//! Roster ingestion: reads provider rows from CSV, merging the primary
//! columns with the higher-priority `attested_*` override columns.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::{ProviderFacts, ProviderRecord};

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse roster: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RosterRow {
    id: Option<String>,
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    specialty: Option<String>,
    license: Option<String>,
    attested_name: Option<String>,
    attested_address: Option<String>,
    attested_phone: Option<String>,
    attested_specialty: Option<String>,
    attested_license: Option<String>,
}

impl RosterRow {
    fn into_record(self, row_number: usize) -> ProviderRecord {
        let id = self
            .id
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| row_number.to_string());

        let primary = ProviderFacts {
            name: self.name,
            address: self.address,
            phone: self.phone,
            specialty: self.specialty,
            license: self.license,
        };
        let attested = ProviderFacts {
            name: self.attested_name,
            address: self.attested_address,
            phone: self.attested_phone,
            specialty: self.attested_specialty,
            license: self.attested_license,
        };

        ProviderRecord::from_sources(id, primary, attested)
    }
}

/// Parse roster rows from any reader. Blank cells become `None`; rows without
/// an id are numbered by position.
pub fn load_roster<R: Read>(reader: R) -> Result<Vec<ProviderRecord>, RosterError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<RosterRow>().enumerate() {
        records.push(row?.into_record(index + 1));
    }
    Ok(records)
}

pub fn load_roster_path(path: impl AsRef<Path>) -> Result<Vec<ProviderRecord>, RosterError> {
    let file = File::open(path)?;
    load_roster(file)
}
