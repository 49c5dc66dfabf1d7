//! Process Launcher
//!
//! Starts an external interpreter process with a script path as its sole
//! argument. The child runs attached to a pseudoterminal, so its stderr is
//! merged into its stdout at the OS level and a single combined stream is
//! read; interleaving is whatever the OS delivers.

use portable_pty::{native_pty_system, Child, ChildKiller, CommandBuilder, PtySize};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::Interpreter;

/// A successfully launched interpreter process
pub struct LaunchedProcess {
    /// Child handle; the owner must eventually wait on it
    pub child: Box<dyn Child + Send + Sync>,
    /// Reader for the combined stdout/stderr stream
    pub reader: Box<dyn Read + Send>,
    /// Handle for terminating the child from another thread
    pub killer: Box<dyn ChildKiller + Send + Sync>,
    /// OS process id, when the platform reports one
    pub pid: Option<u32>,
}

impl std::fmt::Debug for LaunchedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchedProcess")
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

/// Launch `<interpreter-command> <script-path>` with a merged output stream
pub fn launch(interpreter: &Interpreter, script_path: &Path) -> Result<LaunchedProcess> {
    // Resolve the executable up front so a missing interpreter fails
    // deterministically before any PTY is allocated
    find_command(&interpreter.command)?.ok_or_else(|| Error::InterpreterNotFound {
        command: interpreter.command.clone(),
    })?;

    let pty_system = native_pty_system();

    let pair = pty_system
        .openpty(PtySize {
            rows: 24,
            cols: 80,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| Error::LaunchFailed {
            command: interpreter.command.clone(),
            reason: e.to_string(),
        })?;

    let mut cmd = CommandBuilder::new(&interpreter.command);
    cmd.arg(script_path);

    let child = pair
        .slave
        .spawn_command(cmd)
        .map_err(|e| Error::LaunchFailed {
            command: interpreter.command.clone(),
            reason: e.to_string(),
        })?;

    // The child holds its own copy of the slave side
    drop(pair.slave);

    let reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| Error::StreamAttachFailed {
            reason: e.to_string(),
        })?;

    // Close our writer half; sessions never feed input to the child
    drop(pair.master.take_writer());

    let pid = child.process_id();
    let killer = child.clone_killer();

    debug!(
        "Launched '{} {}' (pid: {:?})",
        interpreter.command,
        script_path.display(),
        pid
    );

    Ok(LaunchedProcess {
        child,
        reader,
        killer,
        pid,
    })
}

/// Locate an executable: explicit paths are checked directly, bare names are
/// searched on PATH
pub fn find_command(command: &str) -> Result<Option<PathBuf>> {
    let candidate = Path::new(command);

    if candidate.components().count() > 1 {
        // Explicit path: must exist and be executable as given
        if is_executable(candidate) {
            return Ok(Some(candidate.to_path_buf()));
        }
        return Ok(None);
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&path_var) {
        let full = dir.join(command);
        if is_executable(&full) {
            return Ok(Some(full));
        }
    }

    Ok(None)
}

/// Check whether a path points at an executable regular file
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = path.metadata() {
        if metadata.is_file() {
            return (metadata.permissions().mode() & 0o111) != 0;
        }
    }
    false
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Check if an interpreter's executable is available on this system
pub fn is_command_available(command: &str) -> bool {
    find_command(command).ok().flatten().is_some()
}
