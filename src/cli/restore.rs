use crate::cli::locator;
use slicer_backup::backup::{RestoreOptions, Restorer};
use slicer_backup::config::Config;
use slicer_backup::core::{BackupError, BackupResult};
use slicer_backup::slicer::SlicerKind;
use std::path::PathBuf;

pub fn run(
    backup: PathBuf,
    slicer: Option<String>,
    dry_run: bool,
    no_safety_backup: bool,
) -> BackupResult<()> {
    let config = Config::load()?;
    let locator = locator(&config)?;

    let options = RestoreOptions {
        slicer: slicer.map(|id| id.parse::<SlicerKind>()).transpose()?,
        dry_run,
        safety_backup: config.safety_backup && !no_safety_backup,
    };

    let report = Restorer::new(&locator).restore(&backup, &options)?;

    if let Some(ref safety) = report.safety_backup {
        println!("✓ Existing configuration saved to {}", safety.display());
    }

    if report.dry_run {
        println!("Dry run, nothing was written:");
        for (relative, dest) in &report.planned {
            println!("  Would restore {} -> {}", relative, dest.display());
        }
    }

    for missing in &report.missing {
        println!("  ⚠️  WARNING: File not found in backup: {}", missing);
    }

    if !report.is_success() {
        return Err(BackupError::Verification(format!(
            "{} file(s) could not be restored",
            report.missing.len()
        )));
    }

    if !report.dry_run {
        println!(
            "✓ Restored {} file(s) into {}",
            report.restored.len(),
            report.target_root.display()
        );
    }

    Ok(())
}
