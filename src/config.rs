//! Configuration management module
//!
//! Turns parsed options into a validated, immutable `Configuration` that is
//! handed to the integrity engine. Construction is all-or-nothing: either
//! every check passes or no configuration exists.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cli::Cli;
use crate::console::Console;
use crate::error::{Result, SanitizerError};
use crate::output;
use crate::secret::{Passphrase, PassphraseRequest, PassphraseSource, PassphraseState};
use crate::types::{Problem, SolvableProblems};

/// Validated settings for one sanitizer run
#[derive(Debug)]
pub struct Configuration {
    vault_location: PathBuf,
    passphrase_source: PassphraseSource,
    passphrase: PassphraseState,
    problems_to_solve: BTreeSet<Problem>,
    structure_output_file: PathBuf,
    check_output_file: PathBuf,
}

impl Configuration {
    /// Existing vault directory (checked at build time only)
    pub fn vault_location(&self) -> &Path {
        &self.vault_location
    }

    /// The vault passphrase, prompting for it on first access if no
    /// source was given on the command line.
    ///
    /// Every call after the first returns the same buffer.
    ///
    /// # Errors
    ///
    /// `NoInteractiveConsole` if a prompt is needed and `console` has no
    /// terminal attached.
    pub fn passphrase(&mut self, console: &mut dyn Console) -> Result<&Passphrase> {
        self.passphrase.get_or_prompt(console)
    }

    /// The passphrase if it has been resolved already. Never prompts.
    pub fn passphrase_if_read(&self) -> Option<&Passphrase> {
        self.passphrase.get()
    }

    pub fn passphrase_source(&self) -> &PassphraseSource {
        &self.passphrase_source
    }

    /// Problem kinds the engine may repair. Empty unless opted in.
    pub fn problems_to_solve(&self) -> &BTreeSet<Problem> {
        &self.problems_to_solve
    }

    /// Cleared path for the structure report
    pub fn structure_output_file(&self) -> &Path {
        &self.structure_output_file
    }

    /// Cleared path for the check report
    pub fn check_output_file(&self) -> &Path {
        &self.check_output_file
    }
}

/// Builds a `Configuration` from parsed options.
///
/// The allow-list is owned by the builder rather than read from a global,
/// so a builder can be constructed with a narrower set in tests.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    solvable: SolvableProblems,
}

impl ConfigurationBuilder {
    pub fn new(solvable: SolvableProblems) -> Self {
        Self { solvable }
    }

    pub fn solvable(&self) -> &SolvableProblems {
        &self.solvable
    }

    /// Validate `options` and plan the output files.
    ///
    /// Checks run in order and the first failure is returned:
    /// 1. passphrase source exclusivity
    /// 2. vault location
    /// 3. passphrase file, if given
    /// 4. `--solve` allow-list
    /// 5. output planning (may prompt, may delete up to two files)
    ///
    /// The inline passphrase is moved out of `options`, which is consumed.
    pub fn build(&self, options: Cli, console: &mut dyn Console) -> Result<Configuration> {
        let Cli {
            vault,
            passphrase,
            passphrase_file,
            solve,
            output,
            verbose: _,
        } = options;

        let request = PassphraseRequest::from_options(passphrase, passphrase_file)?;

        let vault_location = parse_vault_location(vault)?;
        debug!("Vault location: {}", vault_location.display());

        let (passphrase_source, passphrase) = request.resolve()?;
        debug!("Passphrase source: {}", passphrase_source);

        let problems_to_solve = self.solvable.validate(&solve)?;
        debug!("Problems to solve: {:?}", problems_to_solve);

        let plan = output::plan(output.as_deref(), &vault_location, console)?;

        info!(
            "Configuration ready for {} (reports: {}, {})",
            vault_location.display(),
            plan.structure.display(),
            plan.check.display()
        );

        Ok(Configuration {
            vault_location,
            passphrase_source,
            passphrase,
            problems_to_solve,
            structure_output_file: plan.structure,
            check_output_file: plan.check,
        })
    }
}

/// A path argument is malformed when it is empty or holds a NUL byte
pub(crate) fn is_malformed_path(path: &Path) -> bool {
    let bytes = path.as_os_str().as_encoded_bytes();
    bytes.is_empty() || bytes.contains(&0)
}

/// `path` must name an existing directory
fn parse_vault_location(path: PathBuf) -> Result<PathBuf> {
    if !is_malformed_path(&path) && path.is_dir() {
        Ok(path)
    } else {
        Err(SanitizerError::invalid_vault(path.display().to_string()))
    }
}
