//! Launching the user's editor on the listing and waiting for it to be saved.

use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub const WATCH_INTERVAL: Duration = Duration::from_millis(500);

/// Split an editor command line into executable and arguments.
///
/// Quoting follows POSIX shell rules, so `"C:\Program Files\ed.exe" /w` keeps
/// the quoted executable path whole.
pub fn parse_editor_command(command: &str) -> Result<(String, Vec<String>)> {
    let mut parts = shlex::split(command)
        .ok_or_else(|| Error::Editor(format!("unbalanced quotes in '{command}'")))?
        .into_iter();
    let executable = parts
        .next()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| Error::Editor("empty editor command".to_string()))?;
    Ok((executable, parts.collect()))
}

/// Editor command from `$VISUAL`, `$EDITOR` or a platform default.
pub fn default_editor_command() -> String {
    for var in ["VISUAL", "EDITOR"] {
        if let Ok(value) = std::env::var(var)
            && !value.trim().is_empty()
        {
            return value;
        }
    }
    if cfg!(windows) {
        "notepad.exe".to_string()
    } else if cfg!(target_os = "macos") {
        "open -t -W -n".to_string()
    } else {
        "vi".to_string()
    }
}

/// Run the editor on `path` and wait for it to exit.
pub fn launch_editor(command: &str, path: &Path) -> Result<()> {
    let (executable, args) = parse_editor_command(command)?;
    debug!(%executable, ?args, path = %path.display(), "launching editor");
    let output = Command::new(&executable)
        .args(&args)
        .arg(path)
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|child| child.wait_with_output())
        .map_err(|e| Error::Editor(format!("could not run '{executable}': {e}")))?;
    if !output.status.success() {
        return Err(Error::Editor(format!(
            "'{executable}' exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    len: u64,
    modified: filetime::FileTime,
}

fn snapshot(path: &Path) -> Result<Snapshot> {
    let meta = std::fs::metadata(path).map_err(Error::io("stat", path))?;
    Ok(Snapshot {
        len: meta.len(),
        modified: filetime::FileTime::from_last_modification_time(&meta),
    })
}

/// Poll `path` until its size or modification time changes.
///
/// Returns `false` without a change once `stop` is set and a final check
/// still shows the file untouched.
pub fn watch_file(path: &Path, interval: Duration, stop: &AtomicBool) -> Result<bool> {
    watch_from(path, snapshot(path)?, interval, stop)
}

fn watch_from(
    path: &Path,
    initial: Snapshot,
    interval: Duration,
    stop: &AtomicBool,
) -> Result<bool> {
    loop {
        let stopping = stop.load(Ordering::SeqCst);
        if snapshot(path)? != initial {
            return Ok(true);
        }
        if stopping {
            return Ok(false);
        }
        std::thread::sleep(interval);
    }
}

/// Open `path` in the editor and wait both for the editor to exit and for the
/// file to be saved. Returns whether the file changed.
pub fn edit_and_wait(command: &str, path: &Path) -> Result<bool> {
    let editor_done = AtomicBool::new(false);
    let initial = snapshot(path)?;
    info!("Waiting for file list to be saved... (Press Ctrl + C to abort)");

    std::thread::scope(|scope| {
        let watcher = scope.spawn(|| watch_from(path, initial, WATCH_INTERVAL, &editor_done));
        let edited = launch_editor(command, path);
        editor_done.store(true, Ordering::SeqCst);
        let changed = watcher
            .join()
            .unwrap_or_else(|_| Err(Error::Editor("file watcher panicked".to_string())));
        edited?;
        changed
    })
}
