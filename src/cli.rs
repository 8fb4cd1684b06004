use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::types::SolvableProblems;

const HELP_HEADER: &str = "Detects problems in Cryptomator vaults.";

#[derive(Parser)]
#[command(name = "sanitizer")]
#[command(about = HELP_HEADER)]
#[command(version)]
pub struct Cli {
    /// The vault to check.
    #[arg(long, value_name = "vaultPath", value_parser = any_path())]
    pub vault: PathBuf,

    /// DO NOT USE. ONLY FOR TESTING PURPOSES. The cleartext vault passphrase.
    ///
    /// Visible to anyone who can list processes. Omit this and you will be
    /// prompted for the passphrase.
    #[arg(long, value_name = "passphrase")]
    pub passphrase: Option<String>,

    /// A file to read the passphrase from, taken verbatim.
    ///
    /// Omit this and you will be prompted for the passphrase.
    #[arg(
        long = "passphraseFile",
        alias = "passphrase-file",
        value_name = "passphraseFile",
        value_parser = any_path()
    )]
    pub passphrase_file: Option<PathBuf>,

    /// Name of one or more problems to solve.
    #[arg(long, value_name = "problem", num_args = 1.., action = ArgAction::Append)]
    pub solve: Vec<String>,

    /// The prefix of the output files to write results to.
    ///
    /// Creates <outputPrefix>.structure.txt and <outputPrefix>.check.txt.
    /// Default: name of the vault directory.
    #[arg(long, value_name = "outputPrefix", value_parser = any_path())]
    pub output: Option<PathBuf>,

    /// Log configuration decisions at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Accept any OS string as a path, including empty and non-UTF-8 values.
///
/// Path validity is judged by the configuration builder, not the parser.
fn any_path() -> impl TypedValueParser<Value = PathBuf> {
    OsStringValueParser::new().map(PathBuf::from)
}

impl Cli {
    /// Option schema with the `--solve` help listing the given allow-list
    pub fn schema(allowed: &SolvableProblems) -> clap::Command {
        Self::command().mut_arg("solve", |arg| {
            arg.help(format!(
                "Name of one or more problems to solve. Available: {allowed}"
            ))
        })
    }

    /// Parse an argument vector (including the program name) against the schema
    pub fn try_parse_with<I, T>(args: I, allowed: &SolvableProblems) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::schema(allowed).try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Full help text, as printed after a configuration error
    pub fn usage(allowed: &SolvableProblems) -> String {
        Self::schema(allowed).render_long_help().to_string()
    }
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("vault", &self.vault)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("passphrase_file", &self.passphrase_file)
            .field("solve", &self.solve)
            .field("output", &self.output)
            .field("verbose", &self.verbose)
            .finish()
    }
}
