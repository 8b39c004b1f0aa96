//! Error types
use thiserror::Error;

/// Errors that may rise when loading and transposing
/// a columnar observation file. All of them are fatal:
/// without an epoch structure, no output can be produced.
#[derive(Error, Debug)]
pub enum InputError {
    /// File is not readable
    #[error("i/o error: {0}")]
    IO(#[from] std::io::Error),
    /// File content is not a valid JSON object
    #[error("invalid json content: {0}")]
    JsonParsing(#[from] serde_json::Error),
    /// Input must be one JSON object (of parallel arrays)
    #[error("input is not a json object")]
    NotAnObject,
    /// "recordTime" is the distinguished timestamp field:
    /// without it no epoch can be identified
    #[error("\"recordTime\" field is missing")]
    MissingRecordTime,
    /// "recordTime" must be an array of timestamp strings
    #[error("\"recordTime\" is not an array of strings")]
    MalformedRecordTime,
}

/// Errors that may rise in the formatting process.
/// Per satellite data anomalies never land here: they degrade
/// to blanked fields instead (one bad sample must not invalidate
/// an entire epoch or file).
#[derive(Error, Debug)]
pub enum FormattingError {
    /// Output interface error
    #[error("output i/o error: {0}")]
    OutputError(#[from] std::io::Error),
    /// Empty dataset: no time frame to describe
    #[error("no epochs available")]
    NoEpochs,
    /// First or last epoch did not parse: no time frame to describe
    #[error("failed to parse epoch \"{0}\"")]
    EpochParsing(String),
    /// Nonempty dataset for which not a single observation
    /// type could be derived
    #[error("no observation types could be derived")]
    NoObservables,
}
