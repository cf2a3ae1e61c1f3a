//! Sidforge CLI - Laxity SID to SF2 project conversion
//!
//! # Commands
//!
//! - `sidforge convert` - Extract music data from a SID file and inject it
//!   into an SF2 template (main command)
//! - `sidforge inspect` - Dump the headers and structures of a SID or SF2 file
//! - `sidforge scan` - Run the Laxity heuristic scan and summarize what it found
//!
//! # Usage
//!
//! ```bash
//! # Convert a tune using a template project from the target editor
//! sidforge convert tune.sid --template driver11.sf2 --output tune.sf2
//!
//! # See what the heuristics recover before converting
//! sidforge scan tune.sid
//!
//! # Examine an SF2 project's blocks and tables
//! sidforge inspect tune.sf2
//! ```
//!
//! Conversion is deliberately forgiving: heuristic misses degrade to
//! defaults and are reported as warnings on stderr, so there is always an
//! output file to iterate on.

mod convert;
mod inspect;
mod scan;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Sidforge CLI - Laxity SID to SF2 project conversion
#[derive(Parser)]
#[command(name = "sidforge")]
#[command(about = "Convert Laxity player SID tunes into SF2 projects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract music data from a SID file and inject it into an SF2 template
    Convert(convert::ConvertArgs),

    /// Dump the headers and structures of a SID or SF2 file
    Inspect(inspect::InspectArgs),

    /// Run the Laxity heuristic scan and summarize what it found
    Scan(scan::ScanArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => convert::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Scan(args) => scan::execute(args),
    }
}
