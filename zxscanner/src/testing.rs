//! Fakes for exercising the scanner without a Pi.

use anyhow::{bail, Result};
use zx_keymap::{Key, Mode, COLS, ROWS};

use crate::gpio::{Level, MatrixPort};
use crate::hooks::Hooks;
use crate::sink::KeySink;

/// A simulated membrane: closed keys connect their row to their column.
pub struct FakePort {
    closed: [[bool; COLS]; ROWS],
    rows: [Level; ROWS],
    pub button_down: bool,
    pub fail_button: bool,
    failing_col: Option<usize>,
    failing_row: Option<usize>,
    /// Every successful `set_row` call, in order.
    pub drives: Vec<(usize, Level)>,
    /// Most rows seen low at once while a column was being read.
    pub max_rows_low_during_read: usize,
}

impl FakePort {
    pub fn new() -> Self {
        Self {
            closed: [[false; COLS]; ROWS],
            rows: [Level::High; ROWS],
            button_down: false,
            fail_button: false,
            failing_col: None,
            failing_row: None,
            drives: Vec::new(),
            max_rows_low_during_read: 0,
        }
    }

    pub fn press(&mut self, row: usize, col: usize) {
        self.closed[row][col] = true;
    }

    pub fn release(&mut self, row: usize, col: usize) {
        self.closed[row][col] = false;
    }

    pub fn fail_reads_of_col(&mut self, col: usize) {
        self.failing_col = Some(col);
    }

    pub fn fail_assert_of_row(&mut self, row: usize) {
        self.failing_row = Some(row);
    }

    pub fn force_row_low(&mut self, row: usize) {
        self.rows[row] = Level::Low;
    }

    pub fn all_rows_high(&self) -> bool {
        self.rows.iter().all(|&level| level == Level::High)
    }
}

impl MatrixPort for FakePort {
    fn set_row(&mut self, row: usize, level: Level) -> Result<()> {
        if level == Level::Low && self.failing_row == Some(row) {
            bail!("row {} stuck", row);
        }
        self.rows[row] = level;
        self.drives.push((row, level));
        Ok(())
    }

    fn read_col(&mut self, col: usize) -> Result<Level> {
        if self.failing_col == Some(col) {
            bail!("column {} unreadable", col);
        }

        let low_rows = self.rows.iter().filter(|&&level| level == Level::Low).count();
        self.max_rows_low_during_read = self.max_rows_low_during_read.max(low_rows);

        let pulled_low = (0..ROWS).any(|row| self.rows[row] == Level::Low && self.closed[row][col]);
        Ok(if pulled_low { Level::Low } else { Level::High })
    }

    fn read_button(&mut self) -> Result<Level> {
        if self.fail_button {
            bail!("button unreadable");
        }
        Ok(if self.button_down { Level::Low } else { Level::High })
    }
}

/// Records every emitted event.
pub struct RecordingSink {
    keys: Vec<Key>,
    events: Vec<(Key, bool)>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::with_keys(Key::ALL.to_vec())
    }

    pub fn with_keys(keys: Vec<Key>) -> Self {
        Self { keys, events: Vec::new(), fail: false }
    }

    /// Drain the events recorded so far.
    pub fn take(&mut self) -> Vec<(Key, bool)> {
        std::mem::take(&mut self.events)
    }
}

impl KeySink for RecordingSink {
    fn emit(&mut self, key: Key, pressed: bool) -> Result<()> {
        if self.fail {
            bail!("sink unavailable");
        }
        self.events.push((key, pressed));
        Ok(())
    }

    fn registered(&self) -> &[Key] {
        &self.keys
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookCall {
    ModeEntered(Mode),
    Emergency,
}

#[derive(Default)]
pub struct RecordingHooks {
    pub calls: Vec<HookCall>,
}

impl Hooks for RecordingHooks {
    fn mode_entered(&mut self, mode: Mode) {
        self.calls.push(HookCall::ModeEntered(mode));
    }

    fn emergency(&mut self) {
        self.calls.push(HookCall::Emergency);
    }
}
