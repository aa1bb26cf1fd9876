use crate::cli::locator;
use slicer_backup::backup::list_backups;
use slicer_backup::config::Config;
use slicer_backup::core::BackupResult;
use slicer_backup::slicer::Locator;

pub fn run() -> BackupResult<()> {
    let config = Config::load()?;
    let locator = locator(&config)?;

    println!("Slicers:");
    for install in locator.detect_all()? {
        let status = if install.is_valid() { "✓" } else { "❌" };
        let version = install.version.as_deref().unwrap_or("unknown version");
        println!(
            "  {} {} ({}) - {}",
            status,
            install.display_name,
            version,
            install.root.display()
        );
    }

    let backup_dir = config.get_backup_dir()?;
    let backups = list_backups(&backup_dir)?;

    println!();
    if backups.is_empty() {
        println!("No backups in {}", backup_dir.display());
        return Ok(());
    }

    println!("Backups in {}:", backup_dir.display());
    for info in backups {
        let name = info
            .backup_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let status = if info.is_valid { "✓" } else { "❌" };
        println!(
            "  {} {}  {}  {} file(s), {:.2} MB",
            status,
            name,
            info.manifest.created_at.format("%Y-%m-%d %H:%M:%S"),
            info.manifest.total_files,
            info.size_mb()
        );
    }

    Ok(())
}
