//! ZX Spectrum keyboard scanner for the Raspberry Pi.
//!
//! Polls the original Spectrum membrane wired to the GPIO header and types
//! on a virtual uinput keyboard:
//! - Matrix scanning, one address line at a time
//! - Press/release tracking so held keys don't repeat
//! - Two layouts (Spectrum keys and function keys)
//! - A mode button: hold to switch layouts, tap for the emergency action

mod button;
mod debounce;
mod gpio;
mod hooks;
mod matrix;
mod scanner;
mod sink;
#[cfg(test)]
mod testing;

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use zx_keymap::Key;

use gpio::{PiPort, PinAssignment};
use hooks::ShellHooks;
use scanner::{ScanSettings, Scanner};
use sink::UinputKeyboard;

#[derive(Parser)]
#[command(name = "zxscanner")]
#[command(about = "ZX Spectrum keyboard matrix to uinput bridge")]
struct Cli {
    /// BCM numbers of the 5 data (column) lines
    #[arg(long, value_delimiter = ',', default_value = "17,27,22,18,23")]
    data_lines: Vec<u8>,

    /// BCM numbers of the 8 address (row) lines
    #[arg(long, value_delimiter = ',', default_value = "5,6,13,19,26,16,20,21")]
    address_lines: Vec<u8>,

    /// BCM number of the mode button
    #[arg(long, default_value_t = 12)]
    button_line: u8,

    /// Hold time in milliseconds that switches layouts
    #[arg(long, default_value_t = 3000)]
    long_press_ms: u64,

    /// Delay in microseconds after asserting a row before reading it
    #[arg(long, default_value_t = 10)]
    settle_us: u64,

    /// Pause in milliseconds between sweeps
    #[arg(long, default_value_t = 1)]
    scan_interval_ms: u64,

    /// Consecutive sweeps a key must agree on before it changes state
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..))]
    debounce_scans: u8,

    /// Command run on switching to Spectrum keys (empty to disable)
    #[arg(long, default_value = "mpg123 -q ding1.mp3")]
    spectrum_cmd: String,

    /// Command run on switching to function keys (empty to disable)
    #[arg(long, default_value = "mpg123 -q ding2.mp3")]
    function_cmd: String,

    /// Command run on a short press of the button (empty to disable)
    #[arg(long, default_value = "sudo killall fuse")]
    short_press_cmd: String,

    /// Name of the virtual keyboard
    #[arg(long, default_value = "ZX Spectrum Keyboard")]
    device_name: String,
}

/// Cleared by SIGINT/SIGTERM.
static RUNNING: AtomicBool = AtomicBool::new(true);

extern "C" fn on_signal(_signal: libc::c_int) {
    RUNNING.store(false, Ordering::SeqCst);
}

fn install_signal_handlers() -> Result<()> {
    for signal in [libc::SIGINT, libc::SIGTERM] {
        let previous = unsafe { libc::signal(signal, on_signal as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            return Err(std::io::Error::last_os_error())
                .with_context(|| format!("installing handler for signal {}", signal));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let pins = PinAssignment::new(&cli.data_lines, &cli.address_lines, cli.button_line)
        .context("invalid line assignment")?;
    let settings = ScanSettings {
        settle: Duration::from_micros(cli.settle_us),
        debounce_scans: cli.debounce_scans,
        long_press: Duration::from_millis(cli.long_press_ms),
    };
    let interval = Duration::from_millis(cli.scan_interval_ms);

    let keyboard = UinputKeyboard::create(&cli.device_name, &Key::ALL)?;
    let port = PiPort::open(&pins)?;
    let hooks = ShellHooks::new(&cli.spectrum_cmd, &cli.function_cmd, &cli.short_press_cmd);
    let mut scanner = Scanner::new(port, keyboard, hooks, &settings)?;

    install_signal_handlers()?;

    info!(
        "data lines {:?}, address lines {:?}, button {}",
        pins.data, pins.address, pins.button
    );
    info!("starting in {} mode", scanner.mode().name());
    println!("Running");

    while RUNNING.load(Ordering::SeqCst) {
        scanner.tick(Instant::now());
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }

    info!("Interrupted, releasing held keys and address lines");
    if let Err(e) = scanner.shutdown() {
        warn!("{:#}", e);
    }
    Ok(())
}
