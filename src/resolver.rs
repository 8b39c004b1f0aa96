//! Observation type resolution
//!
//! Two interchangeable strategies exist, selected by configuration and
//! never merged: their field ordering and attribute assignments
//! disagree, so downstream consumers (header formatter, record
//! encoder) depend only on the resolved [SystemObservables] mapping.
use crate::{
    dataset::Dataset,
    error::FormattingError,
    observable::{Measurement, Observable},
    systems,
};

use gnss::prelude::Constellation;
use lazy_static::lazy_static;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;

use log::debug;

/// Resolved observation types: one ordered [Observable] list per
/// supported constellation. Used identically by the header formatter
/// and the record encoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemObservables {
    /// Ordered [Observable]s, per constellation
    pub codes: HashMap<Constellation, Vec<Observable>>,
}

impl SystemObservables {
    /// Ordered [Observable] list for this constellation, if any.
    pub fn get(&self, constellation: Constellation) -> Option<&[Observable]> {
        self.codes.get(&constellation).map(|v| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.codes.values().all(|codes| codes.is_empty())
    }
}

/// Signal attribute letter for one (constellation, band) pair.
/// Fixed lookup: the attribute is part of the file format contract,
/// never derived from user data.
fn attribute(constellation: Constellation, band: char) -> char {
    match (constellation, band) {
        (Constellation::GPS, _) => 'C',
        (Constellation::Glonass, _) => 'C',
        (Constellation::Galileo, _) => 'X',
        (Constellation::BeiDou, _) => 'X',
        (Constellation::QZSS, '1') => 'C',
        (Constellation::QZSS, _) => 'X',
        _ => 'C',
    }
}

/// Expands one list of bands into the complete per band
/// code/phase/doppler/strength sequence.
fn band_expansion(constellation: Constellation, bands: &[char]) -> Vec<Observable> {
    let mut codes = Vec::with_capacity(bands.len() * Measurement::EMISSION_ORDER.len());
    for &band in bands {
        for kind in Measurement::EMISSION_ORDER {
            codes.push(Observable::new(kind, band, attribute(constellation, band)));
        }
    }
    codes
}

lazy_static! {
    /// Fixed observation type catalogue: dataset independent lists,
    /// mirroring what the supported receivers actually track.
    static ref CATALOG: HashMap<Constellation, Vec<Observable>> = {
        let mut catalog = HashMap::with_capacity(5);
        catalog.insert(Constellation::GPS, band_expansion(Constellation::GPS, &['1', '2']));
        catalog.insert(Constellation::Glonass, band_expansion(Constellation::Glonass, &['1', '2']));
        catalog.insert(Constellation::Galileo, band_expansion(Constellation::Galileo, &['1', '7']));
        // BeiDou: displayed as C, data filed under B, bands 2 and 7
        catalog.insert(Constellation::BeiDou, band_expansion(Constellation::BeiDou, &['2', '7']));
        // QZSS: displayed as J, data filed under Q
        catalog.insert(Constellation::QZSS, band_expansion(Constellation::QZSS, &['1', '2']));
        catalog
    };
}

/// Observation type resolution strategies.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum TypeStrategy {
    /// Fixed catalogue: hardcoded per constellation lists, with the
    /// authoritative code/phase/doppler/strength data ordering, even
    /// when the dataset's own field semantics disagree.
    #[default]
    Catalog,
    /// Inferred from the field names present in one representative
    /// epoch row.
    Inferred,
}

impl TypeStrategy {
    /// Resolves the [SystemObservables] for this [Dataset].
    pub fn resolve(&self, dataset: &Dataset) -> Result<SystemObservables, FormattingError> {
        let observables = match self {
            Self::Catalog => SystemObservables {
                codes: CATALOG.clone(),
            },
            Self::Inferred => Self::infer(dataset),
        };
        if observables.is_empty() && !dataset.is_empty() {
            return Err(FormattingError::NoObservables);
        }
        Ok(observables)
    }

    /// Scans one representative [EpochRow](crate::dataset::EpochRow)
    /// for fields shaped `<prefix><letter><band>`: bands are declared
    /// in lexicographical order, measurement kinds in the fixed
    /// code/phase/doppler/strength sequence.
    fn infer(dataset: &Dataset) -> SystemObservables {
        let mut observed = BTreeMap::<Constellation, BTreeMap<char, BTreeSet<Measurement>>>::new();

        if let Some(row) = dataset.representative_row() {
            for field in row.keys() {
                let (kind, suffix) = match Measurement::from_field_name(field) {
                    Some(split) => split,
                    None => continue,
                };

                let mut chars = suffix.chars();
                let (letter, band) = match (chars.next(), chars.next(), chars.next()) {
                    (Some(letter), Some(band), None) if band.is_ascii_digit() => (letter, band),
                    _ => continue,
                };

                let constellation = match systems::from_data_letter(letter) {
                    Some(constellation) => constellation,
                    None => continue,
                };

                observed
                    .entry(constellation)
                    .or_default()
                    .entry(band)
                    .or_default()
                    .insert(kind);
            }
        }

        let mut codes = HashMap::with_capacity(observed.len());
        for (constellation, bands) in observed {
            let mut list = Vec::new();
            for (band, kinds) in bands {
                for kind in Measurement::EMISSION_ORDER {
                    if kinds.contains(&kind) {
                        list.push(Observable::new(kind, band, attribute(constellation, band)));
                    }
                }
            }
            debug!("{:X}: inferred {} observation types", constellation, list.len());
            codes.insert(constellation, list);
        }

        SystemObservables { codes }
    }
}

impl FromStr for TypeStrategy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "catalog" => Ok(Self::Catalog),
            "inferred" => Ok(Self::Inferred),
            other => Err(format!("unknown strategy \"{}\"", other)),
        }
    }
}
