//! json2rnx is a converter from columnar JSON GNSS observations
//! (one object of parallel arrays, indexed by epoch) to standard
//! RINEX V3.04 Observation files.
//!
//! The pipeline is a single synchronous pass:
//! load & transpose ([Dataset]) > resolve observation types
//! ([TypeStrategy]) > format header ([ObsHeader]) > encode body
//! ([observation::format]).
//!
//! Homepage: <https://github.com/rtk-rs/json2rnx>

pub mod dataset;
pub mod epoch;
pub mod error;
pub mod header;
pub mod observable;
pub mod observation;
pub mod resolver;
pub mod systems;
pub mod value;


pub mod prelude {
    pub use crate::{
        dataset::{Dataset, EpochRow},
        error::{FormattingError, InputError},
        header::ObsHeader,
        observable::{Measurement, Observable},
        observation,
        resolver::{SystemObservables, TypeStrategy},
    };
    // pub re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch};
}

use crate::prelude::{Dataset, FormattingError, ObsHeader, TypeStrategy};

use std::io::{BufWriter, Write};

/*
 * Formats one header line: body content (60c) and standardized label (20c).
 * Content longer than 60 characters is truncated: callers are responsible
 * for wrapping multi-line sections themselves.
 */
pub(crate) fn fmt_rinex(content: &str, marker: &str) -> String {
    if content.len() > 60 {
        format!("{:<60}{:<20}", &content[..60], marker)
    } else {
        format!("{:<60}{:<20}", content, marker)
    }
}

/*
 * Generates one standardized comment line
 */
pub(crate) fn fmt_comment(content: &str) -> String {
    fmt_rinex(content, "COMMENT")
}

/// Runs the complete formatting pipeline for one [Dataset]:
/// observation types are resolved with given [TypeStrategy],
/// then the header section and the observation record are formatted
/// into the [Write]able interface, using efficient buffering.
pub fn format_rinex<W: Write>(
    dataset: &Dataset,
    strategy: TypeStrategy,
    w: &mut BufWriter<W>,
) -> Result<(), FormattingError> {
    let observables = strategy.resolve(dataset)?;
    let header = ObsHeader::new(dataset, &observables)?;
    header.format(w)?;
    observation::format(dataset, &observables, w)?;
    Ok(())
}
