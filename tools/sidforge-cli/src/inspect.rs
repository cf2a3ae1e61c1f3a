//! Inspect command - header and structure dump for SID and SF2 files

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use sidforge_sf2::parse_sf2;
use sidforge_sid::parse_sid;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// SID or SF2 file to inspect (detected by magic bytes)
    pub file: PathBuf,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let data = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read file: {}", args.file.display()))?;

    match data.get(0..4) {
        Some(magic) if magic == b"PSID" || magic == b"RSID" => inspect_sid(&data),
        Some(_) => inspect_sf2(&data),
        None => bail!("file is too small to identify"),
    }
}

fn inspect_sid(data: &[u8]) -> Result<()> {
    let (image, meta) = parse_sid(data)?;

    println!("{} v{}", meta.magic.as_str(), meta.version);
    println!("  Name:      {}", meta.name);
    println!("  Author:    {}", meta.author);
    println!("  Copyright: {}", meta.copyright);
    println!("  Load:      ${:04X} ({} bytes)", meta.load_address, image.len());
    println!("  Init:      ${:04X}", meta.init_address);
    println!("  Play:      ${:04X}", meta.play_address);
    println!("  Songs:     {} (start {})", meta.songs, meta.start_song);
    println!("  Speed:     ${:08X}", meta.speed);
    if let Some(v2) = meta.v2 {
        println!("  Flags:     ${:04X}", v2.flags);
        if v2.second_sid_address != 0 {
            println!("  2nd SID:   ${:02X}", v2.second_sid_address);
        }
        if v2.third_sid_address != 0 {
            println!("  3rd SID:   ${:02X}", v2.third_sid_address);
        }
    }

    Ok(())
}

fn inspect_sf2(data: &[u8]) -> Result<()> {
    let parsed = parse_sf2(data).context("not a SID file and not a valid SF2 container")?;

    println!("SF2 project, load ${:04X}", parsed.load_address());
    println!("  {} header blocks", parsed.blocks.len());

    if let Some(music) = parsed.music {
        println!(
            "  Music: {} tracks, orderlists ${:04X}, sequences ${:04X}, tempo {}",
            music.track_count,
            music.orderlist_address,
            music.sequence_address,
            music.default_tempo
        );
    }

    if !parsed.tables.is_empty() {
        println!("  Tables:");
        for table in &parsed.tables {
            println!(
                "    {:12} ${:04X}  {}x{} {:?}",
                table.name, table.address, table.row_count, table.column_count, table.layout
            );
        }
    }

    for (voice, orderlist) in parsed.orderlists.iter().enumerate() {
        println!("  Voice {}: {} orderlist entries", voice + 1, orderlist.len());
    }
    println!("  {} sequences", parsed.sequences.len());

    if let Some(driver) = parsed.driver {
        println!("  Driver addresses:");
        for (label, address) in driver.labeled() {
            println!("    {label:20} ${address:04X}");
        }
    }

    if !parsed.warnings.is_empty() {
        eprintln!("{} warnings:", parsed.warnings.len());
        for warning in parsed.warnings.iter() {
            eprintln!("  {warning}");
        }
    }

    Ok(())
}
