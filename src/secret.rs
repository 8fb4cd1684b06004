//! Passphrase acquisition and scoped secret buffers.
//!
//! # Security Model
//!
//! The passphrase lives in a `Passphrase`, a `Zeroizing<String>` wrapper that
//! wipes its buffer when dropped. It never appears in logs or `Debug` output.
//!
//! Three sources are supported:
//! - **Inline** (`--passphrase`): for testing only. The value is moved out of
//!   the parsed options into the scoped buffer, but the copy in the process
//!   argument vector is visible to process-list inspection and cannot be wiped.
//! - **File** (`--passphraseFile`): read verbatim, no trimming. The raw bytes
//!   are held in a wipe-on-drop guard that is zeroed on every exit path,
//!   including decode failures.
//! - **Interactive**: deferred until the passphrase is first requested, then
//!   read once from the terminal with echo disabled.

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use crate::config::is_malformed_path;
use crate::console::Console;
use crate::error::{Result, SanitizerError};

/// Label shown when prompting for the passphrase
pub const PASSPHRASE_PROMPT: &str = "Vault password: ";

/// Scoped character buffer holding the vault passphrase.
///
/// The buffer is zeroed when the value is dropped.
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    /// Take ownership of `value` without copying it
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    /// Borrow the secret. Keep the borrow short.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Zeroizing<String>> for Passphrase {
    fn from(value: Zeroizing<String>) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

/// Where the passphrase comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassphraseSource {
    /// Given on the command line
    Inline,
    /// Read from the given file
    File(PathBuf),
    /// Prompted for on first access
    Interactive,
}

impl fmt::Display for PassphraseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline argument"),
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Interactive => write!(f, "interactive prompt"),
        }
    }
}

/// Resolution state of the passphrase.
///
/// Moves from `Unresolved` to `Resolved` at most once; a resolved
/// passphrase is never replaced.
#[derive(Debug)]
pub enum PassphraseState {
    Unresolved,
    Resolved(Passphrase),
}

impl PassphraseState {
    /// Resolve on first call and return the same buffer on every call.
    ///
    /// # Errors
    ///
    /// - `NoInteractiveConsole` if unresolved and `console` has no terminal.
    /// - `Io` if reading from the terminal fails.
    pub fn get_or_prompt(&mut self, console: &mut dyn Console) -> Result<&Passphrase> {
        if let Self::Unresolved = self {
            let passphrase = prompt_passphrase(console)?;
            *self = Self::Resolved(passphrase);
        }
        match self {
            Self::Resolved(passphrase) => Ok(passphrase),
            Self::Unresolved => unreachable!("passphrase resolved above"),
        }
    }

    /// The passphrase if already resolved, without prompting
    pub fn get(&self) -> Option<&Passphrase> {
        match self {
            Self::Resolved(passphrase) => Some(passphrase),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Passphrase source selected on the command line, not yet read
#[derive(Debug)]
pub enum PassphraseRequest {
    Inline(Passphrase),
    File(PathBuf),
    Prompt,
}

impl PassphraseRequest {
    /// Select the source from the two optional flags.
    ///
    /// Neither flag given means the passphrase is deferred to an interactive
    /// prompt; this is not an error.
    ///
    /// # Errors
    ///
    /// `ConflictingPassphraseSource` if both flags are given. The inline
    /// value is wiped before returning.
    pub fn from_options(inline: Option<String>, file: Option<PathBuf>) -> Result<Self> {
        let inline = inline.map(Passphrase::new);
        match (inline, file) {
            (Some(_), Some(_)) => Err(SanitizerError::ConflictingPassphraseSource),
            (Some(passphrase), None) => Ok(Self::Inline(passphrase)),
            (None, Some(path)) => Ok(Self::File(path)),
            (None, None) => Ok(Self::Prompt),
        }
    }

    /// Resolve the build-time passphrase state, reading the file if one
    /// was named.
    ///
    /// # Errors
    ///
    /// Any error of `read_passphrase_file`, plus `InvalidPassphraseFile`
    /// for an empty path or one holding a NUL byte.
    pub fn resolve(self) -> Result<(PassphraseSource, PassphraseState)> {
        match self {
            Self::Inline(passphrase) => {
                debug!("Passphrase supplied inline");
                Ok((PassphraseSource::Inline, PassphraseState::Resolved(passphrase)))
            }
            Self::File(path) => {
                if is_malformed_path(&path) {
                    return Err(SanitizerError::InvalidPassphraseFile(path));
                }
                let passphrase = read_passphrase_file(&path)?;
                debug!("Passphrase read from {}", path.display());
                Ok((PassphraseSource::File(path), PassphraseState::Resolved(passphrase)))
            }
            Self::Prompt => {
                debug!("No passphrase source given, deferring to interactive prompt");
                Ok((PassphraseSource::Interactive, PassphraseState::Unresolved))
            }
        }
    }
}

/// Read a passphrase file verbatim.
///
/// # Errors
///
/// - `InvalidPassphraseFile` if `path` is missing or not a regular file.
/// - `PassphraseFileNotReadable` if the file cannot be opened.
/// - `PassphraseFileEncoding` if the content is not valid UTF-8.
/// - `Io` for any failure while reading. Not retried.
pub fn read_passphrase_file(path: &Path) -> Result<Passphrase> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta,
        _ => return Err(SanitizerError::InvalidPassphraseFile(path.to_path_buf())),
    };

    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => SanitizerError::PassphraseFileNotReadable(path.to_path_buf()),
        ErrorKind::NotFound => SanitizerError::InvalidPassphraseFile(path.to_path_buf()),
        _ => SanitizerError::Io(e),
    })?;

    // Pre-size so read_to_end does not reallocate and strand copies.
    let capacity = usize::try_from(meta.len()).unwrap_or(0).saturating_add(1);
    let mut raw: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::with_capacity(capacity));
    file.read_to_end(&mut raw)?;

    let decoded = std::str::from_utf8(&raw)
        .map_err(|_| SanitizerError::PassphraseFileEncoding(path.to_path_buf()))?;
    Ok(Passphrase::new(decoded.to_owned()))
}

fn prompt_passphrase(console: &mut dyn Console) -> Result<Passphrase> {
    if !console.is_interactive() {
        return Err(SanitizerError::NoInteractiveConsole);
    }
    let secret = console.read_secret(PASSPHRASE_PROMPT)?;
    debug!("Passphrase read from terminal");
    Ok(Passphrase::from(secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn passphrase_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write passphrase");
        file.flush().expect("Failed to flush");
        file
    }

    #[test]
    fn test_file_content_is_verbatim() {
        let file = passphrase_file(b"correct horse battery staple");
        let passphrase = read_passphrase_file(file.path()).expect("Should read");
        assert_eq!(passphrase.expose(), "correct horse battery staple");
    }

    #[test]
    fn test_trailing_newline_is_kept() {
        let file = passphrase_file(b"secret\n");
        let passphrase = read_passphrase_file(file.path()).expect("Should read");
        assert_eq!(passphrase.expose(), "secret\n");
    }

    #[test]
    fn test_empty_file_gives_empty_passphrase() {
        let file = passphrase_file(b"");
        let passphrase = read_passphrase_file(file.path()).expect("Should read");
        assert!(passphrase.is_empty());
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let err = read_passphrase_file(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, SanitizerError::InvalidPassphraseFile(_)));
    }

    #[test]
    fn test_directory_is_invalid() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let err = read_passphrase_file(dir.path()).unwrap_err();
        assert!(matches!(err, SanitizerError::InvalidPassphraseFile(_)));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let file = passphrase_file(&[0xff, 0xfe, 0x00]);
        let err = read_passphrase_file(file.path()).unwrap_err();
        assert!(matches!(err, SanitizerError::PassphraseFileEncoding(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let file = passphrase_file(b"secret");
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o000))
            .expect("Failed to set permissions");
        if File::open(file.path()).is_ok() {
            // Running with privileges that bypass permission bits
            return;
        }

        let err = read_passphrase_file(file.path()).unwrap_err();
        assert!(matches!(err, SanitizerError::PassphraseFileNotReadable(_)));
    }

    #[test]
    fn test_both_sources_conflict() {
        let err = PassphraseRequest::from_options(
            Some("inline".to_string()),
            Some(PathBuf::from("pw.txt")),
        )
        .unwrap_err();
        assert!(matches!(err, SanitizerError::ConflictingPassphraseSource));
    }

    #[test]
    fn test_resolve_inline() {
        let request = PassphraseRequest::from_options(Some("hunter2".to_string()), None)
            .expect("Single source");
        let (source, state) = request.resolve().expect("Should resolve");
        assert_eq!(source, PassphraseSource::Inline);
        assert_eq!(state.get().map(Passphrase::expose), Some("hunter2"));
    }

    #[test]
    fn test_resolve_file() {
        let file = passphrase_file(b"from file");
        let request = PassphraseRequest::from_options(None, Some(file.path().to_path_buf()))
            .expect("Single source");
        let (source, state) = request.resolve().expect("Should resolve");
        assert_eq!(source, PassphraseSource::File(file.path().to_path_buf()));
        assert_eq!(state.get().map(Passphrase::expose), Some("from file"));
    }

    #[test]
    fn test_resolve_none_defers() {
        let request = PassphraseRequest::from_options(None, None).expect("No source");
        let (source, state) = request.resolve().expect("Should resolve");
        assert_eq!(source, PassphraseSource::Interactive);
        assert!(!state.is_resolved());
    }

    #[test]
    fn test_empty_file_argument_is_invalid() {
        let err = PassphraseRequest::File(PathBuf::new()).resolve().unwrap_err();
        assert!(matches!(err, SanitizerError::InvalidPassphraseFile(_)));
    }

    #[test]
    fn test_prompt_without_terminal_fails() {
        let mut state = PassphraseState::Unresolved;
        let mut console = ScriptedConsole::new();
        let err = state.get_or_prompt(&mut console).unwrap_err();
        assert!(matches!(err, SanitizerError::NoInteractiveConsole));
        assert!(!state.is_resolved());
        assert!(console.prompts().is_empty());
    }

    #[test]
    fn test_prompt_happens_once() {
        let mut state = PassphraseState::Unresolved;
        let mut console = ScriptedConsole::new().with_secret("typed");

        let first = state.get_or_prompt(&mut console).expect("Should prompt") as *const Passphrase;
        let second = state.get_or_prompt(&mut console).expect("Should reuse") as *const Passphrase;

        assert_eq!(first, second);
        assert_eq!(console.prompts(), [PASSPHRASE_PROMPT.to_string()]);
        assert_eq!(state.get().map(Passphrase::expose), Some("typed"));
    }

    #[test]
    fn test_resolved_state_never_prompts() {
        let mut state = PassphraseState::Resolved(Passphrase::new("given".to_string()));
        let mut console = ScriptedConsole::new();
        let passphrase = state.get_or_prompt(&mut console).expect("Already resolved");
        assert_eq!(passphrase.expose(), "given");
        assert!(console.prompts().is_empty());
    }

    #[test]
    fn test_debug_is_redacted() {
        let passphrase = Passphrase::new("hunter2".to_string());
        assert!(!format!("{passphrase:?}").contains("hunter2"));
    }
}
