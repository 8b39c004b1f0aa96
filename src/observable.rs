//! Observables: measurement kinds and 3 character observation codes
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("malformed observable \"{0}\"")]
    MalformedDescriptor(String),
    #[error("unknown measurement kind \"{0}\"")]
    UnknownMeasurement(char),
}

/// Measurement kinds found in columnar observation files,
/// one per field name prefix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Measurement {
    /// Decoded pseudo range, in meters
    PseudoRange,
    /// Carrier phase, in cycles
    Phase,
    /// Doppler shift, in Hz
    Doppler,
    /// Signal strength (C/N0), in dB-Hz
    SignalStrength,
}

impl Measurement {
    /// Standardized emission order, within one frequency band.
    /// This order is authoritative: the dataset's own field ordering
    /// is never trusted.
    pub const EMISSION_ORDER: [Measurement; 4] = [
        Measurement::PseudoRange,
        Measurement::Phase,
        Measurement::Doppler,
        Measurement::SignalStrength,
    ];

    /// Standard RINEX code letter
    pub fn letter(&self) -> char {
        match self {
            Self::PseudoRange => 'C',
            Self::Phase => 'L',
            Self::Doppler => 'D',
            Self::SignalStrength => 'S',
        }
    }

    /// Columnar field name prefix this kind is filed under
    pub fn field_prefix(&self) -> &'static str {
        match self {
            Self::PseudoRange => "prMes_",
            Self::Phase => "cpMes_",
            Self::Doppler => "doMes_",
            Self::SignalStrength => "cn0_",
        }
    }

    /// Decimal precision of the formatted value. A format contract
    /// with consumer tools: never dataset dependent.
    pub fn precision(&self) -> usize {
        match self {
            Self::Phase => 5,
            _ => 3,
        }
    }

    pub(crate) fn from_letter(c: char) -> Result<Self, ParsingError> {
        match c {
            'C' => Ok(Self::PseudoRange),
            'L' => Ok(Self::Phase),
            'D' => Ok(Self::Doppler),
            'S' => Ok(Self::SignalStrength),
            _ => Err(ParsingError::UnknownMeasurement(c)),
        }
    }

    /// Identifies (kind, remainder) from one columnar field name,
    /// for example "prMes_G1" -> (PseudoRange, "G1").
    pub(crate) fn from_field_name(name: &str) -> Option<(Self, &str)> {
        for kind in Self::EMISSION_ORDER {
            if let Some(rem) = name.strip_prefix(kind.field_prefix()) {
                return Some((kind, rem));
            }
        }
        None
    }
}

/// [Observable]: one 3 character observation type code, as declared
/// in the header and emitted per record line. The signal attribute is
/// a fixed lookup, never user data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Observable {
    /// Measurement kind
    pub measurement: Measurement,
    /// Frequency band digit
    pub band: char,
    /// Signal attribute letter
    pub attribute: char,
}

impl Observable {
    pub fn new(measurement: Measurement, band: char, attribute: char) -> Self {
        Self {
            measurement,
            band,
            attribute,
        }
    }

    /// Columnar field this code's values are sourced from,
    /// given the underlying data letter of its constellation.
    pub fn field_key(&self, data_letter: char) -> String {
        format!(
            "{}{}{}",
            self.measurement.field_prefix(),
            data_letter,
            self.band
        )
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.measurement.letter(),
            self.band,
            self.attribute
        )
    }
}

impl FromStr for Observable {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next(), chars.next(), chars.next()) {
            (Some(kind), Some(band), Some(attribute), None) if band.is_ascii_digit() => Ok(Self {
                measurement: Measurement::from_letter(kind)?,
                band,
                attribute,
            }),
            _ => Err(ParsingError::MalformedDescriptor(trimmed.to_string())),
        }
    }
}
