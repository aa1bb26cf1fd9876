use slicer_backup::backup::backup_info;
use slicer_backup::core::{BackupError, BackupResult};
use std::path::PathBuf;

pub fn run(backup: PathBuf) -> BackupResult<()> {
    let info = backup_info(&backup).ok_or_else(|| {
        BackupError::Verification(format!(
            "Could not read backup manifest from {}",
            backup.display()
        ))
    })?;
    let manifest = &info.manifest;

    println!("Backup: {}", info.backup_path.display());
    println!("  Slicer:      {}", manifest.slicer);
    println!(
        "  Version:     {}",
        manifest.slicer_version.as_deref().unwrap_or("unknown")
    );
    println!("  Platform:    {}", manifest.platform);
    println!("  Created:     {}", manifest.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Files:       {}", manifest.total_files);
    println!("  Content:     {:.2} MB", manifest.size_mb());
    println!("  On disk:     {:.2} MB", info.size_mb());
    println!("  Compressed:  {}", if manifest.compressed { "yes" } else { "no" });
    println!("  Valid:       {}", if info.is_valid { "✓" } else { "❌" });

    Ok(())
}
