use clap::{Arg, ArgMatches, ColorChoice, Command};

use json2rnx::prelude::TypeStrategy;

use std::path::{Path, PathBuf};
use std::str::FromStr;

pub struct Cli {
    /// Arguments passed by User
    pub matches: ArgMatches,
}

impl Cli {
    pub fn new() -> Self {
        Self {
            matches: {
                Command::new("json2rnx")
                    .author("Guillaume W. Bres <guillaume.bressaix@gmail.com>")
                    .version(env!("CARGO_PKG_VERSION"))
                    .about("Columnar JSON observation to RINEX V3 conversion tool")
                    .arg_required_else_help(true)
                    .color(ColorChoice::Always)
                    .arg(
                        Arg::new("filepath")
                            .help("Input JSON observation file")
                            .required(true),
                    )
                    .arg(
                        Arg::new("types")
                            .short('t')
                            .long("types")
                            .value_name("STRATEGY")
                            .help("Observation type resolution: \"catalog\" (default) or \"inferred\""),
                    )
                    .arg(
                        Arg::new("output")
                            .short('o')
                            .long("output-dir")
                            .value_name("DIR")
                            .help("Custom output directory [default: ./rinex]"),
                    )
                    .get_matches()
            },
        }
    }

    pub fn input_path(&self) -> &Path {
        Path::new(
            self.matches
                .get_one::<String>("filepath")
                .unwrap()
                .as_str(),
        )
    }

    pub fn output_dir(&self) -> PathBuf {
        match self.matches.get_one::<String>("output") {
            Some(dir) => Path::new(dir).to_path_buf(),
            None => Path::new("rinex").to_path_buf(),
        }
    }

    pub fn strategy(&self) -> Result<TypeStrategy, String> {
        match self.matches.get_one::<String>("types") {
            Some(descriptor) => TypeStrategy::from_str(descriptor),
            None => Ok(TypeStrategy::default()),
        }
    }
}
