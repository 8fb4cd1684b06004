//! Type-safe problem kinds for the sanitizer
//!
//! `--solve` values are parsed into `Problem` rather than kept as strings,
//! and the set of kinds the engine may repair is an explicit value handed
//! to the builder instead of a global table.

use std::collections::BTreeSet;
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// A structural defect the integrity engine can detect and repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Display, EnumString, EnumIter, AsRefStr)]
pub enum Problem {
    /// Encrypted name whose base32 payload was lowercased
    LowercasedFile,
    /// Encrypted name that lost its `=` padding
    MissingEqualsSign,
    /// Shortened-name metadata file without a matching entry
    OrphanMFile,
    /// Encrypted name whose base32 payload was uppercased
    UppercasedFile,
}

impl Problem {
    /// Get the name used on the command line
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

/// Allow-list of problem kinds that may be passed to `--solve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvableProblems(BTreeSet<Problem>);

impl SolvableProblems {
    /// Restrict solving to the given kinds
    pub fn new(problems: impl IntoIterator<Item = Problem>) -> Self {
        Self(problems.into_iter().collect())
    }

    /// Allow-list containing every known kind
    pub fn all() -> Self {
        Self::new(Problem::iter())
    }

    pub fn contains(&self, problem: Problem) -> bool {
        self.0.contains(&problem)
    }

    pub fn iter(&self) -> impl Iterator<Item = Problem> + '_ {
        self.0.iter().copied()
    }

    /// Validate raw `--solve` values.
    ///
    /// Every value must name a known kind that is also in this allow-list.
    /// Duplicates collapse. On failure the error holds exactly the
    /// offending values.
    pub fn validate<I, S>(&self, values: I) -> crate::error::Result<BTreeSet<Problem>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted = BTreeSet::new();
        let mut rejected = Vec::new();

        for value in values {
            let value = value.as_ref();
            match value.parse::<Problem>() {
                Ok(problem) if self.contains(problem) => {
                    accepted.insert(problem);
                }
                _ => rejected.push(value.to_string()),
            }
        }

        if rejected.is_empty() {
            Ok(accepted)
        } else {
            Err(crate::error::SanitizerError::unknown_problems(rejected))
        }
    }
}

impl Default for SolvableProblems {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for SolvableProblems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Problem::as_str).collect();
        write!(f, "{}", names.join(", "))
    }
}
