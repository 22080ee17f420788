//! Key matrix scanning for the Spectrum membrane.
//!
//! The membrane is an 8×5 matrix: 8 address lines (rows) driven by the Pi,
//! 5 data lines (columns) read back with pull-ups. A closed key connects
//! its row to its column, so with only that row driven low the column
//! reads low.

use std::thread;
use std::time::Duration;

use log::debug;
use zx_keymap::{COLS, ROWS};

use crate::gpio::{Level, MatrixPort};

/// One sweep's worth of raw readings: `true` = key closed.
pub type Grid = [[bool; COLS]; ROWS];

/// Drives the rows and samples the columns.
pub struct Matrix {
    /// Pause between asserting a row and reading its columns.
    settle: Duration,
}

impl Matrix {
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }

    /// Scan the entire matrix once.
    ///
    /// Each row is driven low on its own, its five columns are read, and
    /// the row is restored high before the next one is touched, so at
    /// most one row is ever asserted. A failed read counts as "not
    /// pressed" for that reading only.
    pub fn scan<P: MatrixPort>(&self, port: &mut P) -> Grid {
        let mut grid = [[false; COLS]; ROWS];

        for (row, cells) in grid.iter_mut().enumerate() {
            match port.set_row(row, Level::Low) {
                Ok(()) => {
                    self.wait_settle();
                    for (col, cell) in cells.iter_mut().enumerate() {
                        *cell = match port.read_col(col) {
                            Ok(level) => level == Level::Low,
                            Err(e) => {
                                debug!("read of row {} column {} failed: {:#}", row, col, e);
                                false
                            }
                        };
                    }
                }
                Err(e) => debug!("asserting row {} failed: {:#}", row, e),
            }

            if let Err(e) = port.set_row(row, Level::High) {
                debug!("releasing row {} failed: {:#}", row, e);
            }
        }

        grid
    }

    fn wait_settle(&self) {
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePort;

    #[test]
    fn test_idle_matrix_reads_clear() {
        let mut port = FakePort::new();
        let grid = Matrix::new(Duration::ZERO).scan(&mut port);
        assert_eq!(grid, [[false; COLS]; ROWS]);
    }

    #[test]
    fn test_pressed_cells_reported() {
        let mut port = FakePort::new();
        port.press(0, 0);
        port.press(7, 4);
        let grid = Matrix::new(Duration::ZERO).scan(&mut port);

        for row in 0..ROWS {
            for col in 0..COLS {
                let expected = (row, col) == (0, 0) || (row, col) == (7, 4);
                assert_eq!(grid[row][col], expected, "cell ({row},{col})");
            }
        }
    }

    #[test]
    fn test_rows_toggled_low_then_high_once_each() {
        let mut port = FakePort::new();
        Matrix::new(Duration::ZERO).scan(&mut port);

        let expected: Vec<(usize, Level)> = (0..ROWS)
            .flat_map(|row| [(row, Level::Low), (row, Level::High)])
            .collect();
        assert_eq!(port.drives, expected);
        assert!(port.all_rows_high());
    }

    #[test]
    fn test_only_one_row_asserted_while_reading() {
        let mut port = FakePort::new();
        port.press(3, 2);
        Matrix::new(Duration::ZERO).scan(&mut port);
        assert_eq!(port.max_rows_low_during_read, 1);
    }

    #[test]
    fn test_failed_read_counts_as_released() {
        let mut port = FakePort::new();
        port.press(2, 1);
        port.fail_reads_of_col(1);
        let grid = Matrix::new(Duration::ZERO).scan(&mut port);
        assert!(!grid[2][1]);
    }

    #[test]
    fn test_failed_row_drive_reads_nothing_and_restores() {
        let mut port = FakePort::new();
        port.press(4, 0);
        port.fail_assert_of_row(4);
        let grid = Matrix::new(Duration::ZERO).scan(&mut port);
        assert!(!grid[4][0]);
        assert!(port.all_rows_high());
    }
}
