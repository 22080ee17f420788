//! Per-key state tracking.
//!
//! Remembers what every cell looked like after the previous sweep so that
//! only changes become key events. Holding a key produces one press and
//! nothing else until it is released; auto-repeat is left to the host.
//!
//! Each key also has a counter that must reach the configured threshold of
//! consecutive differing readings before its state flips. With a threshold
//! of 1 every change is accepted on the sweep it is seen.

use zx_keymap::{COLS, ROWS};

use crate::matrix::Grid;

/// A cell that changed state on this sweep.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub row: usize,
    pub col: usize,
    pub pressed: bool,
}

pub struct Debouncer {
    /// Accepted key states: false = released, true = pressed.
    state: Grid,
    /// Per-key counters tracking consecutive raw readings that differ from the accepted state.
    counters: [[u8; COLS]; ROWS],
    threshold: u8,
}

impl Debouncer {
    /// `threshold` is clamped to at least 1.
    pub fn new(threshold: u8) -> Self {
        Self {
            state: [[false; COLS]; ROWS],
            counters: [[0; COLS]; ROWS],
            threshold: threshold.max(1),
        }
    }

    /// Fold a new raw sweep into the tracked state, returning every cell
    /// that flipped, in row-major order.
    pub fn update(&mut self, raw: &Grid) -> Vec<Transition> {
        let mut transitions = Vec::new();

        for row in 0..ROWS {
            for col in 0..COLS {
                let pressed = raw[row][col];

                if pressed == self.state[row][col] {
                    self.counters[row][col] = 0;
                    continue;
                }

                self.counters[row][col] += 1;
                if self.counters[row][col] >= self.threshold {
                    self.state[row][col] = pressed;
                    self.counters[row][col] = 0;
                    transitions.push(Transition { row, col, pressed });
                }
            }
        }

        transitions
    }

    /// Whether a cell is currently considered held.
    pub fn is_pressed(&self, row: usize, col: usize) -> bool {
        self.state[row][col]
    }

    /// Cells currently considered held.
    pub fn held(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..ROWS)
            .flat_map(|row| (0..COLS).map(move |col| (row, col)))
            .filter(|&(row, col)| self.state[row][col])
    }
}
