//! Supported constellations, emission order and field name letters
use gnss::prelude::Constellation;

/// Constellation emission order, both for the header type
/// declarations and the per epoch record lines.
pub const EMISSION_ORDER: [Constellation; 5] = [
    Constellation::GPS,
    Constellation::Glonass,
    Constellation::Galileo,
    Constellation::BeiDou,
    Constellation::QZSS,
];

/// Underlying data letter used by the columnar field name convention.
/// BeiDou is filed under 'B' and QZSS under 'Q', while both are
/// displayed under their standard 'C' / 'J' codes: this remap follows
/// a known labeling quirk of the source datasets and is kept verbatim.
///
/// Only defined on [EMISSION_ORDER] members.
pub(crate) fn data_letter(constellation: Constellation) -> char {
    match constellation {
        Constellation::BeiDou => 'B',
        Constellation::QZSS => 'Q',
        Constellation::GPS => 'G',
        Constellation::Glonass => 'R',
        Constellation::Galileo => 'E',
        other => panic!("unsupported constellation {:X}", other),
    }
}

/// Constellation identified by an underlying data letter, if supported.
pub(crate) fn from_data_letter(letter: char) -> Option<Constellation> {
    match letter {
        'G' => Some(Constellation::GPS),
        'R' => Some(Constellation::Glonass),
        'E' => Some(Constellation::Galileo),
        'B' => Some(Constellation::BeiDou),
        'Q' => Some(Constellation::QZSS),
        _ => None,
    }
}

/// Validity / PRN indicator field for this constellation.
pub(crate) fn validity_key(constellation: Constellation) -> String {
    format!("VS{}", data_letter(constellation))
}

/// All validity indicator fields, in [EMISSION_ORDER].
pub(crate) fn validity_keys() -> impl Iterator<Item = String> {
    EMISSION_ORDER.into_iter().map(validity_key)
}
