use crate::cli::locator;
use slicer_backup::backup::{create_backup, BackupOptions};
use slicer_backup::config::Config;
use slicer_backup::core::{BackupError, BackupResult};
use slicer_backup::slicer::{Locator, SlicerKind};
use std::path::PathBuf;

pub fn run(
    slicer: Option<String>,
    all: bool,
    output: Option<PathBuf>,
    no_compress: bool,
    no_verify: bool,
) -> BackupResult<()> {
    let config = Config::load()?;
    let locator = locator(&config)?;

    let installations = if all {
        let installed = locator.installed()?;
        if installed.is_empty() {
            println!("No installed slicers found");
            return Ok(());
        }
        installed
    } else {
        let id = slicer.ok_or_else(|| {
            BackupError::Config("Specify a slicer or use --all".to_string())
        })?;
        vec![locator.locate(id.parse::<SlicerKind>()?)?]
    };

    let output_dir = match output {
        Some(dir) => dir,
        None => config.get_backup_dir()?,
    };
    let options = BackupOptions {
        compress: config.compress && !no_compress,
        verify: config.verify && !no_verify,
    };

    for install in &installations {
        println!("Backing up {}...", install.display_name);
        let path = create_backup(install, &output_dir, &options)?;
        println!("✓ Backup created: {}", path.display());
    }

    Ok(())
}
