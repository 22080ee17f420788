//! GPIO access for the keyboard matrix and the mode button.
//!
//! The Spectrum membrane is wired straight to the Pi header:
//! - Address lines (rows): outputs, idle high, asserted low one at a time
//! - Data lines (columns): inputs with pull-ups, read low when a key closes
//! - Mode button: input with pull-up, low while held
//!
//! [`MatrixPort`] is the seam the scanner talks to; [`PiPort`] implements it
//! on top of `rppal`.

use anyhow::{bail, Context, Result};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use zx_keymap::{COLS, ROWS};

/// Logic level of a line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Line-level access to the matrix and the button.
///
/// Indices are matrix positions (`row < ROWS`, `col < COLS`), not BCM
/// numbers; the implementation owns the pin assignment.
pub trait MatrixPort {
    /// Drive an address line.
    fn set_row(&mut self, row: usize, level: Level) -> Result<()>;

    /// Read a data line.
    fn read_col(&mut self, col: usize) -> Result<Level>;

    /// Read the mode button line.
    fn read_button(&mut self) -> Result<Level>;

    /// Deassert every address line.
    fn park(&mut self) -> Result<()> {
        for row in 0..ROWS {
            self.set_row(row, Level::High)?;
        }
        Ok(())
    }
}

/// BCM pin numbers for every line the keyboard uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinAssignment {
    pub data: [u8; COLS],
    pub address: [u8; ROWS],
    pub button: u8,
}

impl PinAssignment {
    /// The wiring of the reference build (KB1 header).
    pub const DEFAULT: PinAssignment = PinAssignment {
        data: [17, 27, 22, 18, 23],
        address: [5, 6, 13, 19, 26, 16, 20, 21],
        button: 12,
    };

    /// Build an assignment from unchecked line lists.
    pub fn new(data: &[u8], address: &[u8], button: u8) -> Result<Self> {
        let data: [u8; COLS] = data
            .try_into()
            .map_err(|_| anyhow::anyhow!("expected {} data lines, got {}", COLS, data.len()))?;
        let address: [u8; ROWS] = address.try_into().map_err(|_| {
            anyhow::anyhow!("expected {} address lines, got {}", ROWS, address.len())
        })?;

        let assignment = PinAssignment { data, address, button };
        assignment.check_unique()?;
        Ok(assignment)
    }

    fn check_unique(&self) -> Result<()> {
        let mut seen = [false; 64];
        let all = self
            .data
            .iter()
            .chain(self.address.iter())
            .chain(std::iter::once(&self.button));
        for &pin in all {
            let slot = seen
                .get_mut(pin as usize)
                .with_context(|| format!("GPIO {} is out of range", pin))?;
            if *slot {
                bail!("GPIO {} is assigned to more than one line", pin);
            }
            *slot = true;
        }
        Ok(())
    }
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Matrix wired to the Raspberry Pi's own GPIO header.
pub struct PiPort {
    address: Vec<OutputPin>,
    data: Vec<InputPin>,
    button: InputPin,
}

impl PiPort {
    /// Claim and configure every line.
    ///
    /// Address lines become outputs driven high, data lines and the button
    /// become inputs with pull-ups. Any failure here is a configuration
    /// error: the line is busy, missing, or we lack permission.
    pub fn open(pins: &PinAssignment) -> Result<Self> {
        let gpio = Gpio::new().context("opening GPIO (is this a Raspberry Pi, and are we in the gpio group?)")?;

        let address = pins
            .address
            .iter()
            .map(|&bcm| {
                gpio.get(bcm)
                    .map(|pin| pin.into_output_high())
                    .with_context(|| format!("claiming address line GPIO {}", bcm))
            })
            .collect::<Result<Vec<_>>>()?;

        let data = pins
            .data
            .iter()
            .map(|&bcm| {
                gpio.get(bcm)
                    .map(|pin| pin.into_input_pullup())
                    .with_context(|| format!("claiming data line GPIO {}", bcm))
            })
            .collect::<Result<Vec<_>>>()?;

        let button = gpio
            .get(pins.button)
            .map(|pin| pin.into_input_pullup())
            .with_context(|| format!("claiming button GPIO {}", pins.button))?;

        Ok(Self { address, data, button })
    }
}

impl MatrixPort for PiPort {
    fn set_row(&mut self, row: usize, level: Level) -> Result<()> {
        let pin = self
            .address
            .get_mut(row)
            .with_context(|| format!("no address line for row {}", row))?;
        match level {
            Level::Low => pin.set_low(),
            Level::High => pin.set_high(),
        }
        Ok(())
    }

    fn read_col(&mut self, col: usize) -> Result<Level> {
        let pin = self
            .data
            .get(col)
            .with_context(|| format!("no data line for column {}", col))?;
        Ok(if pin.is_low() { Level::Low } else { Level::High })
    }

    fn read_button(&mut self) -> Result<Level> {
        Ok(if self.button.is_low() { Level::Low } else { Level::High })
    }
}
