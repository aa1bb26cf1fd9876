use clap::{Parser, Subcommand};
use slicer_backup::core::BackupError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "slicer-backup")]
#[command(about = "Back up, verify and restore slicer configuration")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show detected slicers and existing backups
    List,
    /// Create a backup
    Backup {
        /// Slicer to back up (orcaslicer, orca-flashforge)
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        slicer: Option<String>,
        /// Back up every installed slicer
        #[arg(short, long)]
        all: bool,
        /// Output directory (defaults to the configured backup directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write a plain directory instead of a zip file
        #[arg(long)]
        no_compress: bool,
        /// Skip verifying the finished backup
        #[arg(long)]
        no_verify: bool,
    },
    /// Restore a backup
    Restore {
        /// Backup file or directory
        backup: PathBuf,
        /// Restore into this slicer instead of the one recorded in the backup
        #[arg(short, long)]
        slicer: Option<String>,
        /// Show what would be restored without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Do not save the current configuration first
        #[arg(long)]
        no_safety_backup: bool,
    },
    /// Verify a backup's integrity
    Verify {
        /// Backup file or directory
        backup: PathBuf,
        /// Show each verification step
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show details about a backup
    Info {
        /// Backup file or directory
        backup: PathBuf,
    },
}

fn main() -> Result<(), BackupError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List => cli::list::run(),
        Commands::Backup {
            slicer,
            all,
            output,
            no_compress,
            no_verify,
        } => cli::backup::run(slicer, all, output, no_compress, no_verify),
        Commands::Restore {
            backup,
            slicer,
            dry_run,
            no_safety_backup,
        } => cli::restore::run(backup, slicer, dry_run, no_safety_backup),
        Commands::Verify { backup, verbose } => cli::verify::run(backup, verbose),
        Commands::Info { backup } => cli::info::run(backup),
    };

    // Display error with helpful suggestions
    if let Err(ref e) = result {
        eprintln!("\n{}", slicer_backup::format_error_with_help(e));
    }

    result
}
