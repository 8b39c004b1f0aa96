//! Epoch parsing and formatting helpers
use hifitime::Epoch;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("expecting \"yyyy-mm-dd hh:mm:ss\" format")]
    FormatMismatch,
    #[error("failed to parse datetime field")]
    FieldParsing(#[from] std::num::ParseIntError),
    #[error("calendar invalid datetime")]
    InvalidDate,
}

/*
 * Infaillible `Epoch::now()` call.
 */
pub(crate) fn now() -> Epoch {
    Epoch::now().unwrap_or(Epoch::from_gregorian_utc_at_midnight(2000, 1, 1))
}

/// Parses one `yyyy-mm-dd hh:mm:ss` timestamp (the `recordTime`
/// convention) as a UTC [Epoch].
pub fn parse_utc(s: &str) -> Result<Epoch, ParsingError> {
    let mut items = s.trim().split_ascii_whitespace();

    let date = items.next().ok_or(ParsingError::FormatMismatch)?;
    let time = items.next().ok_or(ParsingError::FormatMismatch)?;

    if items.next().is_some() {
        return Err(ParsingError::FormatMismatch);
    }

    let date = date.split('-').collect::<Vec<_>>();
    let time = time.split(':').collect::<Vec<_>>();

    if date.len() != 3 || time.len() != 3 {
        return Err(ParsingError::FormatMismatch);
    }

    let (y, m, d) = (
        date[0].parse::<i32>()?,
        date[1].parse::<u8>()?,
        date[2].parse::<u8>()?,
    );
    let (hh, mm, ss) = (
        time[0].parse::<u8>()?,
        time[1].parse::<u8>()?,
        time[2].parse::<u8>()?,
    );

    // out of range fields (month 13, hour 99..) still match the
    // shape: they must degrade to an error, never abort
    Epoch::maybe_from_gregorian_utc(y, m, d, hh, mm, ss, 0).map_err(|_| ParsingError::InvalidDate)
}

/*
 * Formats given epoch as found in the observation record
 * (calendar fields, whole seconds with a fixed zero fraction).
 */
pub(crate) fn format(epoch: Epoch) -> String {
    let (y, m, d, hh, mm, ss, _) = epoch.to_gregorian_utc();
    format!(
        "{:04} {:02} {:02} {:02} {:02} {:02}.0000000",
        y, m, d, hh, mm, ss
    )
}

/*
 * Formats given epoch as the "PGM / RUN BY / DATE" datestamp.
 */
pub(crate) fn datestamp(epoch: Epoch) -> String {
    let (y, m, d, hh, mm, ss, _) = epoch.to_gregorian_utc();
    format!("{:04}{:02}{:02} {:02}{:02}{:02} UTC", y, m, d, hh, mm, ss)
}
