//! Transition-table builder CLI
//!
//! Batch front end for the three table pipelines. Each subcommand reads
//! the season CSV feed(s), builds and verifies one probability table, and
//! writes the JSON artifact the simulator loads.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use table_builder::{BuildReport, TableKind};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "table_builder")]
#[command(about = "Build simulator transition tables from play-by-play feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Build the batting transition table from the Statcast pitch feed
    Batting {
        /// Input Statcast CSV file
        #[arg(long)]
        r#in: PathBuf,

        /// Output JSON artifact path
        #[arg(long, default_value = "baserunner_transitions.json")]
        out: PathBuf,

        /// Re-read the artifact and re-check its invariants after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Build the batting table from Retrosheet plays, steals excluded
    BattingNoSb {
        /// Input play file(s); pass once per season
        #[arg(long = "in", required = true)]
        inputs: Vec<PathBuf>,

        /// Output JSON artifact path
        #[arg(long, default_value = "baserunner_transitions_no_sb.json")]
        out: PathBuf,

        /// Re-read the artifact and re-check its invariants after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Build the stolen-base opportunity table from Retrosheet plays
    Steals {
        /// Input play file(s); pass once per season
        #[arg(long = "in", required = true)]
        inputs: Vec<PathBuf>,

        /// Output JSON artifact path
        #[arg(long, default_value = "stolen_base_transitions.json")]
        out: PathBuf,

        /// Re-read the artifact and re-check its invariants after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Batting {
            r#in,
            out,
            verify,
            metadata,
        } => {
            println!("🔨 Building batting transition table...");
            println!("   Input:  {}", r#in.display());
            println!("   Output: {}", out.display());

            let report = table_builder::build_batting_table(&r#in, &out)?;
            finish(&report, &out, verify, metadata.as_deref())?;
        }

        Commands::BattingNoSb {
            inputs,
            out,
            verify,
            metadata,
        } => {
            println!("🔨 Building batting table (stolen bases excluded)...");
            println!("   Output: {}", out.display());

            let report = table_builder::build_batting_table_no_sb(&inputs, &out)?;
            finish(&report, &out, verify, metadata.as_deref())?;
        }

        Commands::Steals {
            inputs,
            out,
            verify,
            metadata,
        } => {
            println!("🔨 Building stolen-base table...");
            println!("   Output: {}", out.display());

            let report = table_builder::build_stolen_base_table(&inputs, &out)?;
            finish(&report, &out, verify, metadata.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn finish(
    report: &BuildReport,
    out: &std::path::Path,
    verify: bool,
    metadata: Option<&std::path::Path>,
) -> Result<()> {
    print_report(report);

    if verify {
        println!("\n🔍 Verifying emitted artifact...");
        table_builder::verify_artifact(out, report.table)?;
        println!("✅ Artifact verification passed");
    }

    if let Some(metadata_path) = metadata {
        table_builder::write_metadata(metadata_path, report)?;
        println!("\n📄 Metadata saved to: {}", metadata_path.display());
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_report(report: &BuildReport) {
    println!("\n✅ Table built successfully!");
    println!("   Rows read:         {}", report.rows_read);
    println!("   Transitions kept:  {}", report.stats.kept);
    if report.table != TableKind::Steals {
        println!("   Impossible drops:  {}", report.stats.impossible);
        println!("   Unclassified:      {}", report.stats.unclassified);
        if report.stats.non_batting > 0 {
            println!("   Non-batting plays: {}", report.stats.non_batting);
        }
    }
    println!("   Start states:      {}", report.states);
    println!("   Output size:       {} bytes", report.output_size);
    println!("   Checksum:          {}", report.checksum);
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("table_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
