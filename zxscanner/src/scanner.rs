//! The scan loop's state and a single iteration of it.
//!
//! Everything that changes while the keyboard runs (held keys, active
//! layout, button timestamp) lives in [`Scanner`], owned by the loop. The
//! GPIO port, output sink and button hooks are injected so the whole
//! iteration runs against fakes in tests.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use log::{debug, info, warn};
use zx_keymap::{find_unregistered, lookup, Mode};

use crate::button::{ModeButton, Press, LONG_PRESS};
use crate::debounce::Debouncer;
use crate::gpio::{Level, MatrixPort};
use crate::hooks::Hooks;
use crate::matrix::Matrix;
use crate::sink::KeySink;

/// Timing knobs for the loop.
#[derive(Clone, Debug)]
pub struct ScanSettings {
    /// Pause between asserting a row and reading it.
    pub settle: Duration,
    /// Consecutive readings needed before a key changes state.
    pub debounce_scans: u8,
    /// Minimum hold for a mode switch.
    pub long_press: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            settle: Duration::ZERO,
            debounce_scans: 1,
            long_press: LONG_PRESS,
        }
    }
}

pub struct Scanner<P, S, H> {
    port: P,
    sink: S,
    hooks: H,
    matrix: Matrix,
    keys: Debouncer,
    button: ModeButton,
    mode: Mode,
}

impl<P: MatrixPort, S: KeySink, H: Hooks> Scanner<P, S, H> {
    /// Set up the loop state, starting in Spectrum mode with nothing held.
    ///
    /// Fails if either layout references a key the sink was not
    /// registered with, so a bad table is caught before the first sweep.
    pub fn new(port: P, sink: S, hooks: H, settings: &ScanSettings) -> Result<Self> {
        if let Some(missing) = find_unregistered(sink.registered()) {
            bail!(
                "{} layout maps row {} column {} to {}, which the virtual keyboard does not declare",
                missing.mode.name(),
                missing.row,
                missing.col,
                missing.key.name()
            );
        }

        Ok(Self {
            port,
            sink,
            hooks,
            matrix: Matrix::new(settings.settle),
            keys: Debouncer::new(settings.debounce_scans),
            button: ModeButton::new(settings.long_press),
            mode: Mode::default(),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// One loop iteration: sample the button, then sweep the matrix.
    ///
    /// The button goes first so a mode switch applies to every key event
    /// of the same iteration's sweep.
    pub fn tick(&mut self, now: Instant) {
        self.poll_button(now);
        self.sweep();
    }

    /// Release whatever is still held on the virtual keyboard and leave
    /// every address line deasserted.
    pub fn shutdown(&mut self) -> Result<()> {
        let held: Vec<(usize, usize)> = self.keys.held().collect();
        for (row, col) in held {
            let key = lookup(self.mode, row, col);
            if let Err(e) = self.sink.emit(key, false) {
                warn!("{:#}", e);
            }
        }
        self.port.park()
    }

    fn poll_button(&mut self, now: Instant) {
        let asserted = match self.port.read_button() {
            Ok(level) => level == Level::Low,
            Err(e) => {
                debug!("button read failed, skipping sample: {:#}", e);
                return;
            }
        };

        let was_held = self.button.is_held();
        match self.button.sample(asserted, now) {
            None if !was_held && self.button.is_held() => info!("Button pressed"),
            None => {}
            Some(Press::Long(held)) => {
                self.mode = self.mode.toggled();
                info!(
                    "Switching to {} Keys (held {:.1}s)",
                    self.mode.name(),
                    held.as_secs_f32()
                );
                self.hooks.mode_entered(self.mode);
            }
            Some(Press::Short(held)) => {
                info!("Emergency action (held {:.1}s)", held.as_secs_f32());
                self.hooks.emergency();
            }
        }
    }

    fn sweep(&mut self) {
        let raw = self.matrix.scan(&mut self.port);

        for change in self.keys.update(&raw) {
            let key = lookup(self.mode, change.row, change.col);
            if change.pressed {
                debug!("Pressing {}", key.name());
            } else {
                debug!("Releasing {}", key.name());
            }
            if let Err(e) = self.sink.emit(key, change.pressed) {
                warn!("{:#}", e);
            }
        }
    }
}

#[cfg(test)]
impl<P, S, H> Scanner<P, S, H> {
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }
}
