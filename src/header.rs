//! Observation header derivation and formatting
use crate::{
    dataset::Dataset,
    epoch,
    error::FormattingError,
    fmt_comment, fmt_rinex,
    resolver::SystemObservables,
    systems,
};

use hifitime::Epoch;
use itertools::Itertools;

use std::io::{BufWriter, Write};

/// Format revision published by this tool
const VERSION_MAJOR: u8 = 3;
const VERSION_MINOR: u8 = 4;

/// Maximal number of observation type codes on one
/// "SYS / # / OBS TYPES" line
const TYPES_PER_LINE: usize = 13;

/// [ObsHeader]: everything the header section declares. All fields are
/// computed from the [Dataset], never independently supplied.
#[derive(Debug, Clone)]
pub struct ObsHeader {
    /// Program name
    pub program: String,
    /// Program "run by"
    pub run_by: String,
    /// Production datestamp
    pub date: String,
    /// Free text comments
    pub comments: Vec<String>,
    /// [Epoch] of first observation
    pub timeof_first_obs: Epoch,
    /// [Epoch] of last observation
    pub timeof_last_obs: Epoch,
    /// Derived sampling interval, in seconds
    pub sampling_interval_secs: f64,
    /// Observation types, per constellation
    pub observables: SystemObservables,
}

impl ObsHeader {
    /// Derives the [ObsHeader] for this [Dataset] and resolved
    /// [SystemObservables]. Fails on empty datasets (no time frame
    /// to describe) and on unparseable first / last timestamps.
    pub fn new(dataset: &Dataset, observables: &SystemObservables) -> Result<Self, FormattingError> {
        let first = dataset.epochs.keys().next().ok_or(FormattingError::NoEpochs)?;
        let last = dataset.epochs.keys().next_back().ok_or(FormattingError::NoEpochs)?;

        let timeof_first_obs =
            epoch::parse_utc(first).map_err(|_| FormattingError::EpochParsing(first.to_string()))?;
        let timeof_last_obs =
            epoch::parse_utc(last).map_err(|_| FormattingError::EpochParsing(last.to_string()))?;

        Ok(Self {
            timeof_first_obs,
            timeof_last_obs,
            program: env!("CARGO_PKG_NAME").to_string(),
            run_by: "User".to_string(),
            date: epoch::datestamp(epoch::now()),
            comments: vec!["Generated automatically from JSON observations".to_string()],
            sampling_interval_secs: dataset.sampling_interval_secs(),
            observables: observables.clone(),
        })
    }

    /// Pins the production datestamp
    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    /// Formats this [ObsHeader] into the [Write]able interface,
    /// using efficient buffering.
    pub fn format<W: Write>(&self, w: &mut BufWriter<W>) -> Result<(), FormattingError> {
        writeln!(
            w,
            "{}",
            fmt_rinex(
                &format!(
                    "{:6}.{:02}           OBSERVATION DATA    M: MIXED",
                    VERSION_MAJOR, VERSION_MINOR
                ),
                "RINEX VERSION / TYPE"
            )
        )?;

        writeln!(
            w,
            "{}",
            fmt_rinex(
                &format!("{:<20}{:<20}{:<20}", self.program, self.run_by, self.date),
                "PGM / RUN BY / DATE"
            )
        )?;

        for comment in self.comments.iter() {
            writeln!(w, "{}", fmt_comment(comment))?;
        }

        self.format_obs_types(w)?;

        writeln!(w, "{}", fmt_rinex("DBHZ", "SIGNAL STRENGTH UNIT"))?;

        writeln!(
            w,
            "{}",
            fmt_rinex(
                &format!("{:14.3}", self.sampling_interval_secs),
                "INTERVAL"
            )
        )?;

        self.format_timeof_obs(w, self.timeof_first_obs, "TIME OF FIRST OBS")?;
        self.format_timeof_obs(w, self.timeof_last_obs, "TIME OF LAST OBS")?;

        writeln!(w, "{}", fmt_rinex("0", "RCV CLOCK OFFS APPL"))?;
        writeln!(w, "{}", fmt_rinex("", "END OF HEADER"))?;

        Ok(())
    }

    /// Formats the "SYS / # / OBS TYPES" groups, one per constellation
    /// in standard emission order. The first line of each group carries
    /// the constellation letter and total count; continuation lines
    /// repeat the letter with blank count columns.
    fn format_obs_types<W: Write>(&self, w: &mut BufWriter<W>) -> Result<(), FormattingError> {
        for constellation in systems::EMISSION_ORDER {
            let codes = match self.observables.get(constellation) {
                Some(codes) if !codes.is_empty() => codes,
                _ => continue,
            };

            for (nth, chunk) in codes.chunks(TYPES_PER_LINE).enumerate() {
                let prefix = if nth == 0 {
                    format!("{:x}{:3} ", constellation, codes.len())
                } else {
                    format!("{:x}    ", constellation)
                };
                let listing = chunk
                    .iter()
                    .map(|code| format!("{:>4}", code.to_string()))
                    .join(" ");
                writeln!(
                    w,
                    "{}",
                    fmt_rinex(&format!("{}{}", prefix, listing), "SYS / # / OBS TYPES")
                )?;
            }
        }
        Ok(())
    }

    fn format_timeof_obs<W: Write>(
        &self,
        w: &mut BufWriter<W>,
        epoch: Epoch,
        label: &str,
    ) -> Result<(), FormattingError> {
        let (y, m, d, hh, mm, ss, _) = epoch.to_gregorian_utc();
        writeln!(
            w,
            "{}",
            fmt_rinex(
                &format!(
                    "{:6}{:6}{:6}{:6}{:6}{:13.7}     GPS",
                    y, m, d, hh, mm, ss as f64
                ),
                label
            )
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::ObsHeader;
    use crate::dataset::Dataset;
    use crate::error::FormattingError;
    use crate::observable::Observable;
    use crate::resolver::{SystemObservables, TypeStrategy};
    use crate::tests::formatting::Utf8Buffer;

    use gnss::prelude::Constellation;
    use serde_json::json;
    use std::io::BufWriter;
    use std::str::FromStr;

    fn dataset() -> Dataset {
        Dataset::from_value(&json!({
            "recordTime": ["2025-10-21 15:42:07", "2025-10-21 15:42:08"],
            "VSG": [[5], [5]],
        }))
        .unwrap()
    }

    #[test]
    fn complete_header_formatting() {
        let dataset = dataset();
        let observables = TypeStrategy::Catalog.resolve(&dataset).unwrap();

        let header = ObsHeader::new(&dataset, &observables)
            .unwrap()
            .with_date("20251021 160000 UTC");

        let mut buf = BufWriter::new(Utf8Buffer::new(4096));
        header.format(&mut buf).unwrap();
        let content = buf.into_inner().unwrap().to_ascii_utf8();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "     3.04           OBSERVATION DATA    M: MIXED            RINEX VERSION / TYPE"
        );
        assert_eq!(
            lines[1],
            "json2rnx            User                20251021 160000 UTC PGM / RUN BY / DATE "
        );
        assert_eq!(
            lines[2],
            "Generated automatically from JSON observations              COMMENT             "
        );
        assert_eq!(
            lines[3],
            "G  8  C1C  L1C  D1C  S1C  C2C  L2C  D2C  S2C                SYS / # / OBS TYPES "
        );
        assert_eq!(
            lines[4],
            "R  8  C1C  L1C  D1C  S1C  C2C  L2C  D2C  S2C                SYS / # / OBS TYPES "
        );
        assert_eq!(
            lines[5],
            "E  8  C1X  L1X  D1X  S1X  C7X  L7X  D7X  S7X                SYS / # / OBS TYPES "
        );
        assert_eq!(
            lines[6],
            "C  8  C2X  L2X  D2X  S2X  C7X  L7X  D7X  S7X                SYS / # / OBS TYPES "
        );
        assert_eq!(
            lines[7],
            "J  8  C1C  L1C  D1C  S1C  C2X  L2X  D2X  S2X                SYS / # / OBS TYPES "
        );
        assert_eq!(
            lines[8],
            "DBHZ                                                        SIGNAL STRENGTH UNIT"
        );
        assert_eq!(
            lines[9],
            "         1.000                                              INTERVAL            "
        );
        assert_eq!(
            lines[10],
            "  2025    10    21    15    42    7.0000000     GPS         TIME OF FIRST OBS   "
        );
        assert_eq!(
            lines[11],
            "  2025    10    21    15    42    8.0000000     GPS         TIME OF LAST OBS    "
        );
        assert_eq!(
            lines[12],
            "0                                                           RCV CLOCK OFFS APPL "
        );
        assert_eq!(
            lines[13],
            "                                                            END OF HEADER       "
        );
        assert_eq!(lines.len(), 14);

        // every header line is exactly 80 columns
        for line in lines {
            assert_eq!(line.len(), 80, "bad width: \"{}\"", line);
        }
    }

    #[test]
    fn obs_types_wrapping() {
        let dataset = dataset();

        // 16 codes: one line of 13 (truncated at the 60 column content
        // boundary, as the original tool does) + one continuation of 3
        let codes = [
            "C1C", "L1C", "D1C", "S1C", "C2C", "L2C", "D2C", "S2C", "C5C", "L5C", "D5C", "S5C",
            "C6C", "L6C", "D6C", "S6C",
        ]
        .iter()
        .map(|code| Observable::from_str(code).unwrap())
        .collect::<Vec<_>>();

        let mut observables = SystemObservables::default();
        observables.codes.insert(Constellation::GPS, codes);

        let header = ObsHeader::new(&dataset, &observables).unwrap();

        let mut buf = BufWriter::new(Utf8Buffer::new(4096));
        header.format_obs_types(&mut buf).unwrap();
        let content = buf.into_inner().unwrap().to_ascii_utf8();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "G 16  C1C  L1C  D1C  S1C  C2C  L2C  D2C  S2C  C5C  L5C  D5C SYS / # / OBS TYPES "
        );
        assert_eq!(
            lines[1],
            "G     L6C  D6C  S6C                                         SYS / # / OBS TYPES "
        );
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let observables = SystemObservables::default();
        assert!(matches!(
            ObsHeader::new(&Dataset::default(), &observables),
            Err(FormattingError::NoEpochs)
        ));
    }

    #[test]
    fn unparseable_time_frame_is_rejected() {
        let observables = SystemObservables::default();
        // shape mismatches and calendar invalid timestamps both
        // degrade to the same error
        for bad in ["once upon a time", "2025-02-30 00:00:00", "2025-10-21 99:00:00"] {
            let dataset = Dataset::from_value(&json!({
                "recordTime": [bad],
            }))
            .unwrap();
            assert!(matches!(
                ObsHeader::new(&dataset, &observables),
                Err(FormattingError::EpochParsing(_))
            ));
        }
    }
}
