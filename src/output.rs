//! Output file planning.
//!
//! The report writers produce two files from one prefix:
//! `<prefix>.structure.txt` and `<prefix>.check.txt`. The pair is planned
//! as a unit. Both paths are checked before either is deleted, and one
//! overwrite answer covers both.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::is_malformed_path;
use crate::console::Console;
use crate::error::{Result, SanitizerError};

pub const STRUCTURE_SUFFIX: &str = ".structure.txt";
pub const CHECK_SUFFIX: &str = ".check.txt";
pub const OVERWRITE_PROMPT: &str = "Output file(s) exist. Overwrite [Y|n]? ";

/// The two report paths derived from one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    pub structure: PathBuf,
    pub check: PathBuf,
}

impl OutputPlan {
    /// Derive both paths from `prefix`.
    ///
    /// # Errors
    ///
    /// `InvalidOutputPath` if the prefix is empty or contains a NUL byte.
    pub fn from_prefix(prefix: &Path) -> Result<Self> {
        if is_malformed_path(prefix) {
            return Err(SanitizerError::invalid_output(prefix.display().to_string()));
        }
        Ok(Self {
            structure: with_suffix(prefix, STRUCTURE_SUFFIX),
            check: with_suffix(prefix, CHECK_SUFFIX),
        })
    }

    /// Whether either file is already on disk
    pub fn any_exists(&self) -> bool {
        path_exists(&self.structure) || path_exists(&self.check)
    }

    /// Delete both files if present. Missing files are not an error.
    pub fn clear(&self) -> Result<()> {
        remove_if_exists(&self.structure)?;
        remove_if_exists(&self.check)?;
        Ok(())
    }
}

/// Operator's reply to the overwrite prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteAnswer {
    Accepted,
    Declined,
    /// Input closed before a valid answer
    Aborted,
}

impl OverwriteAnswer {
    /// Interpret one line. `None` means the line must be asked again.
    pub fn parse(line: &str) -> Option<Self> {
        match line {
            "" | "y" | "Y" => Some(Self::Accepted),
            "n" | "N" => Some(Self::Declined),
            _ => None,
        }
    }
}

/// Ask until the operator gives a valid answer or input ends.
pub fn confirm_overwrite(console: &mut dyn Console) -> Result<OverwriteAnswer> {
    loop {
        let Some(line) = console.prompt_line(OVERWRITE_PROMPT)? else {
            return Ok(OverwriteAnswer::Aborted);
        };
        match OverwriteAnswer::parse(&line) {
            Some(answer) => return Ok(answer),
            None => debug!("Unrecognized overwrite answer, asking again"),
        }
    }
}

/// Prefix used when `--output` is absent: the vault directory's name.
pub fn default_prefix(vault: &Path) -> Result<PathBuf> {
    if let Some(name) = vault.file_name() {
        return Ok(PathBuf::from(name));
    }
    // `.` and `..` have no final component until resolved.
    let resolved = fs::canonicalize(vault)?;
    resolved
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| SanitizerError::invalid_output(vault.display().to_string()))
}

/// Compute the output pair and leave both paths clear for writing.
///
/// If either file exists the operator is asked once whether to overwrite.
/// A declined or aborted answer fails with `OutputFileConflict` and leaves
/// the existing files untouched.
pub fn plan(prefix: Option<&Path>, vault: &Path, console: &mut dyn Console) -> Result<OutputPlan> {
    let prefix = match prefix {
        Some(prefix) => prefix.to_path_buf(),
        None => default_prefix(vault)?,
    };
    let plan = OutputPlan::from_prefix(&prefix)?;

    if plan.any_exists() {
        match confirm_overwrite(console)? {
            OverwriteAnswer::Accepted => {
                warn!(
                    "Overwriting existing output files {} and {}",
                    plan.structure.display(),
                    plan.check.display()
                );
            }
            OverwriteAnswer::Declined | OverwriteAnswer::Aborted => {
                return Err(SanitizerError::OutputFileConflict {
                    structure: plan.structure,
                    check: plan.check,
                });
            }
        }
    }

    plan.clear()?;
    debug!(
        "Output planned: {} and {}",
        plan.structure.display(),
        plan.check.display()
    );
    Ok(plan)
}

/// Append `suffix` to the raw prefix without touching its extension
fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Existence without following a dangling symlink to "absent"
fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
