//! Command line tool to convert columnar JSON GNSS observations
//! to RINEX V3 Observation files.
//! Refer to README for command line arguments.
//! Homepage: <https://github.com/rtk-rs/json2rnx>
mod cli;
use cli::Cli;

use json2rnx::prelude::{Dataset, FormattingError, InputError};

use env_logger::{Builder, Target};

#[macro_use]
extern crate log;

use thiserror::Error;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    StdioError(#[from] std::io::Error),
    #[error("invalid strategy: {0}")]
    Usage(String),
    #[error("input error: {0}")]
    InputError(#[from] InputError),
    #[error("formatting error: {0}")]
    FormattingError(#[from] FormattingError),
    #[error("\"{0}\" exists and is not a directory")]
    OutputDirConflict(PathBuf),
}

/*
 * Creates the output directory if not present.
 * Fatal if the path exists and is not a directory.
 */
fn create_output_dir(path: &Path) -> Result<(), Error> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(Error::OutputDirConflict(path.to_path_buf()));
    }
    std::fs::create_dir_all(path)?;
    Ok(())
}

/*
 * Deduces the output name from the input name:
 * base name cut at its first extension, ".obs" appended.
 */
fn output_filename(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or(&name);
    format!("{}.obs", stem)
}

pub fn main() -> Result<(), Error> {
    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let cli = Cli::new();
    let input_path = cli.input_path();
    let strategy = cli.strategy().map_err(Error::Usage)?;

    // parse and transpose: fatal before any output is created
    let dataset = Dataset::from_file(input_path)?;
    info!("loaded \"{}\"", input_path.display());

    let output_dir = cli.output_dir();
    create_output_dir(&output_dir)?;

    let output_path = output_dir.join(output_filename(input_path));
    let fd = File::create(&output_path)?;
    let mut writer = BufWriter::new(fd);

    json2rnx::format_rinex(&dataset, strategy, &mut writer)?;

    // all buffered content must reach the file system
    // before this is reported as a success
    writer.flush().map_err(FormattingError::OutputError)?;

    info!("\"{}\" generated", output_path.display());
    Ok(())
}
