//! Side effects fired by the mode button.
//!
//! These are notifications only: a chime when the layout changes, and an
//! emergency action (by default, killing the emulator) on a short press.
//! Nothing here may stall or abort the scan loop.

use std::process::{Command, Stdio};
use std::thread;

use log::{debug, warn};
use zx_keymap::Mode;

/// Callbacks for button actions.
pub trait Hooks {
    /// The layout just switched to `mode`.
    fn mode_entered(&mut self, mode: Mode);

    /// The button was tapped.
    fn emergency(&mut self);
}

/// Runs a shell command per event. `None` disables that event.
#[derive(Clone, Debug, Default)]
pub struct ShellHooks {
    pub spectrum: Option<String>,
    pub function: Option<String>,
    pub emergency: Option<String>,
}

impl ShellHooks {
    /// Empty strings disable the corresponding hook.
    pub fn new(spectrum: &str, function: &str, emergency: &str) -> Self {
        let non_empty = |cmd: &str| {
            let cmd = cmd.trim();
            (!cmd.is_empty()).then(|| cmd.to_string())
        };
        Self {
            spectrum: non_empty(spectrum),
            function: non_empty(function),
            emergency: non_empty(emergency),
        }
    }
}

impl Hooks for ShellHooks {
    fn mode_entered(&mut self, mode: Mode) {
        let cmd = match mode {
            Mode::Spectrum => &self.spectrum,
            Mode::Function => &self.function,
        };
        if let Some(cmd) = cmd {
            spawn_detached(cmd);
        }
    }

    fn emergency(&mut self) {
        if let Some(cmd) = &self.emergency {
            spawn_detached(cmd);
        }
    }
}

/// Start `cmd` under `sh -c` without waiting for it.
///
/// The child is reaped on a helper thread so finished commands don't pile
/// up as zombies; its exit status is only logged.
fn spawn_detached(cmd: &str) {
    let child = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::null())
        .spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(e) => {
            warn!("failed to run `{}`: {}", cmd, e);
            return;
        }
    };

    let cmd = cmd.to_string();
    let reaper = thread::Builder::new()
        .name("hook-reaper".into())
        .spawn(move || match child.wait() {
            Ok(status) if status.success() => debug!("`{}` finished", cmd),
            Ok(status) => warn!("`{}` exited with {}", cmd, status),
            Err(e) => warn!("waiting for `{}` failed: {}", cmd, e),
        });
    if let Err(e) = reaper {
        warn!("could not start reaper thread: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_commands_disable_hooks() {
        let hooks = ShellHooks::new("", "  ", "sudo killall fuse");
        assert_eq!(hooks.spectrum, None);
        assert_eq!(hooks.function, None);
        assert_eq!(hooks.emergency.as_deref(), Some("sudo killall fuse"));
    }

    #[test]
    fn test_missing_command_does_not_panic() {
        let mut hooks = ShellHooks::new("", "exit 3", "/nonexistent/command/for/tests");
        hooks.mode_entered(Mode::Spectrum);
        hooks.mode_entered(Mode::Function);
        hooks.emergency();
    }
}
