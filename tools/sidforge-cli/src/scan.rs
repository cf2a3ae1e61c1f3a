//! Scan command - Laxity extraction summary without writing anything

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use sidforge_laxity::scan;
use sidforge_sid::parse_sid;

/// Arguments for the scan command
#[derive(Args)]
pub struct ScanArgs {
    /// SID file to scan
    pub input: PathBuf,
}

/// Execute the scan command
pub fn execute(args: ScanArgs) -> Result<()> {
    let data = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read SID file: {}", args.input.display()))?;
    let (image, meta) = parse_sid(&data)?;

    println!("Scanning: {} by {}", meta.name, meta.author);

    let extraction = scan(&image)?;

    for (voice, orderlist) in extraction.orderlists.iter().enumerate() {
        let indices: Vec<String> = orderlist
            .entries
            .iter()
            .map(|e| format!("{:02X}", e.sequence))
            .collect();
        println!("  Voice {}: {} entries [{}]", voice + 1, orderlist.len(), indices.join(" "));
    }

    println!("  {} sequences:", extraction.sequences.len());
    for (index, sequence) in extraction.sequences.iter().enumerate() {
        println!(
            "    {:3}  ${:04X}  {:4} bytes, {} events",
            index,
            sequence.address,
            sequence.bytes.len(),
            sequence.events().len()
        );
    }

    println!("  {} instruments:", extraction.instruments.len());
    for (index, instrument) in extraction.instruments.iter().enumerate() {
        println!(
            "    {:3}  AD {:02X} SR {:02X} wave {:02X}",
            index,
            instrument.attack_decay(),
            instrument.sustain_release(),
            instrument.wave_index()
        );
    }

    if let Some(commands) = &extraction.command_table {
        println!("  Commands:");
        for (index, entry) in commands.iter() {
            println!("    {:3}  {:02X} {:02X}", index, entry.opcode, entry.param);
        }
    }

    if !extraction.warnings.is_empty() {
        eprintln!("{} warnings:", extraction.warnings.len());
        for warning in extraction.warnings.iter() {
            eprintln!("  {warning}");
        }
    }

    Ok(())
}
