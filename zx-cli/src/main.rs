mod layout;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use zx_keymap::{find_unregistered, Key, Mode, COLS, ROWS};

#[derive(Parser)]
#[command(name = "zx-cli")]
#[command(about = "Inspect the ZX Spectrum keyboard layouts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, ValueEnum)]
enum ModeArg {
    Spectrum,
    Function,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Spectrum => Mode::Spectrum,
            ModeArg::Function => Mode::Function,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print the key grid for one layout
    Show {
        #[arg(value_enum, default_value = "spectrum")]
        mode: ModeArg,
    },
    /// Write an HTML/SVG picture of both layouts
    Layout {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Verify that every layout cell maps to a key the scanner registers
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Show { mode } => {
            print!("{}", layout::render_text(mode.into()));
        }
        Command::Layout { output } => {
            let html = layout::generate_html();
            match output {
                Some(path) => {
                    fs::write(&path, html).with_context(|| format!("writing {}", path))?;
                    println!("Wrote {}", path);
                }
                None => print!("{}", html),
            }
        }
        Command::Check => {
            if let Some(missing) = find_unregistered(&Key::ALL) {
                bail!(
                    "{} layout: row {} column {} maps to unregistered key {}",
                    missing.mode.name(),
                    missing.row,
                    missing.col,
                    missing.key.name()
                );
            }
            println!("Both layouts map all {} cells to registered keys.", ROWS * COLS);
        }
    }

    Ok(())
}
