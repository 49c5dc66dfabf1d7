//! Script Source Resolver
//!
//! Turns a `ScriptSource` into a concrete file path an interpreter can be
//! pointed at. Existing files pass through unchanged; inline code is written
//! verbatim to a uniquely-named temporary file whose extension matches the
//! interpreter. Materialization failures are reported here, before any
//! process launch is attempted.

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempPath;

use crate::error::{Error, Result};
use crate::models::{Interpreter, ScriptSource};

/// Prefix for materialized inline-code files in the OS temp directory
const TEMP_FILE_PREFIX: &str = "scriptdeck_code_";

/// A script source resolved to a concrete on-disk path
#[derive(Debug)]
pub struct ResolvedScript {
    /// Path to hand the interpreter
    pub path: PathBuf,
    /// Guard for a materialized temp file; dropping it removes the file.
    /// `None` when the source was an existing file.
    temp: Option<TempPath>,
}

impl ResolvedScript {
    /// Whether this script lives in a session-owned temporary file
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Take ownership of the temp-file guard, leaving the path behind.
    /// The caller (the session entry) becomes responsible for cleanup.
    pub fn take_temp_guard(&mut self) -> Option<TempPath> {
        self.temp.take()
    }
}

/// Resolve a script source into a path suitable for `<interpreter> <path>`
pub fn resolve(source: &ScriptSource, interpreter: &Interpreter) -> Result<ResolvedScript> {
    match source {
        ScriptSource::File(path) => {
            // Existence is validated at launch time by the interpreter itself
            debug!("Resolved file source: {}", path.display());
            Ok(ResolvedScript {
                path: path.clone(),
                temp: None,
            })
        }
        ScriptSource::Inline { code, language } => {
            let resolved = materialize(code, interpreter)?;
            debug!(
                "Materialized {} byte(s) of {} code to {}",
                code.len(),
                language,
                resolved.path.display()
            );
            Ok(resolved)
        }
    }
}

/// Write inline code verbatim to a fresh uniquely-named temporary file
fn materialize(code: &str, interpreter: &Interpreter) -> Result<ResolvedScript> {
    let mut file = tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .suffix(&interpreter.extension)
        .tempfile()
        .map_err(|e| Error::ScriptMaterializationFailed {
            reason: e.to_string(),
        })?;

    file.write_all(code.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| Error::ScriptMaterializationFailed {
            reason: e.to_string(),
        })?;

    let temp_path = file.into_temp_path();
    let path = temp_path.to_path_buf();

    Ok(ResolvedScript {
        path,
        temp: Some(temp_path),
    })
}
