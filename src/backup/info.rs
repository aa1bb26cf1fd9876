use crate::backup::archive::BackupArchive;
use crate::backup::verifier::Verifier;
use crate::core::BackupResult;
use crate::BackupInfo;
use std::fs;
use std::path::Path;

/// Describe the backup at `path`; `None` when it cannot be opened or has no
/// readable manifest
pub fn backup_info(path: &Path) -> Option<BackupInfo> {
    let mut archive = BackupArchive::open(path).ok()?;
    let manifest = archive.read_manifest()?;
    let size_bytes = archive.disk_size().ok()?;

    Some(BackupInfo {
        backup_path: path.to_path_buf(),
        manifest,
        is_valid: Verifier::new().is_valid(path),
        size_bytes,
    })
}

/// Every backup directly inside `dir`, newest first.
/// A missing directory lists as empty.
pub fn list_backups(dir: &Path) -> BackupResult<Vec<BackupInfo>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            continue;
        }
        if let Some(info) = backup_info(&path) {
            backups.push(info);
        }
    }

    backups.sort_by(|a, b| b.manifest.created_at.cmp(&a.manifest.created_at));
    Ok(backups)
}
