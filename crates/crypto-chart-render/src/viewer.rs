use std::io;
use std::path::Path;
use std::process::Command;

use tracing::debug;

/// Ask the platform's default application for `path` to open it.
/// Returns once the launcher has been spawned; the viewer window is not tracked.
pub fn open_in_viewer(path: &Path) -> io::Result<()> {
    let mut command = launcher(path);
    debug!("launching viewer: {command:?}");
    command.spawn()?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn launcher(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(target_os = "windows")]
fn launcher(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    // empty title argument so a quoted path isn't taken as the window title
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn launcher(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
