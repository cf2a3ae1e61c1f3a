//! Convert command - SID in, SF2 out

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use sidforge_laxity::scan;
use sidforge_model::Warnings;
use sidforge_sf2::Sf2Writer;
use sidforge_sid::{SidMetadata, parse_sid};

/// Arguments for the convert command
#[derive(Args)]
pub struct ConvertArgs {
    /// Input SID file
    pub input: PathBuf,

    /// Template SF2 project providing the driver and table layout
    #[arg(short, long)]
    pub template: PathBuf,

    /// Output SF2 file path (defaults to the input with an .sf2 extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// What a conversion produced, for reporting
pub struct ConvertOutcome {
    pub metadata: SidMetadata,
    pub sequences: usize,
    pub instruments: usize,
    pub output_bytes: usize,
    pub warnings: Warnings,
}

/// Execute the convert command
pub fn execute(args: ConvertArgs) -> Result<()> {
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("sf2"));

    let outcome = convert_file(&args.input, &args.template, &output)?;

    println!(
        "Converted: {} by {}",
        outcome.metadata.name, outcome.metadata.author
    );
    println!(
        "  {} sequences, {} instruments",
        outcome.sequences, outcome.instruments
    );
    println!("  Output: {} ({} bytes)", output.display(), outcome.output_bytes);

    if !outcome.warnings.is_empty() {
        eprintln!("{} warnings:", outcome.warnings.len());
        for warning in outcome.warnings.iter() {
            eprintln!("  {warning}");
        }
    }

    Ok(())
}

/// Convert one SID file into an SF2 project file.
///
/// The single conversion entry point the subcommand wraps: parse the SID
/// container, run the Laxity heuristic scan, inject the extraction into the
/// template, write the result. Heuristic misses surface as warnings on the
/// outcome, not as errors; there is always an output file.
pub fn convert_file(input: &Path, template: &Path, output: &Path) -> Result<ConvertOutcome> {
    let sid_bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read SID file: {}", input.display()))?;
    let (image, metadata) = parse_sid(&sid_bytes)
        .with_context(|| format!("Failed to parse SID header: {}", input.display()))?;

    let extraction = scan(&image).context("Laxity scan failed")?;

    let template_bytes = std::fs::read(template)
        .with_context(|| format!("Failed to read template: {}", template.display()))?;
    let mut writer = Sf2Writer::from_template(&template_bytes)
        .with_context(|| format!("Failed to parse template: {}", template.display()))?;
    writer.inject(&extraction);
    let (sf2_bytes, write_warnings) = writer.finish();

    std::fs::write(output, &sf2_bytes)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    let mut warnings = extraction.warnings.clone();
    warnings.append(write_warnings);

    Ok(ConvertOutcome {
        metadata,
        sequences: extraction.sequences.len(),
        instruments: extraction.instruments.len(),
        output_bytes: sf2_bytes.len(),
        warnings,
    })
}
