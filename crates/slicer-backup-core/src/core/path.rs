use crate::core::error::{BackupError, BackupResult};
use std::path::{Component, Path, PathBuf};

/// Get the slicer-backup home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\slicer-backup
/// - Linux: ~/.config/slicer-backup
/// - macOS: ~/Library/Application Support/slicer-backup
pub fn app_home() -> BackupResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| BackupError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("slicer-backup"))
}

/// Get the config file path (`<app_home>/config.yaml`)
pub fn config_file() -> BackupResult<PathBuf> {
    Ok(app_home()?.join("config.yaml"))
}

/// Default destination for new backups (~/SlicerBackups)
pub fn default_backup_dir() -> BackupResult<PathBuf> {
    let home = home_dir()?;
    Ok(home.join("SlicerBackups"))
}

/// Get the user's home directory
pub fn home_dir() -> BackupResult<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| BackupError::Path("Could not determine home directory".to_string()))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> BackupResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Render a relative path with forward slashes, whatever the host separator is.
///
/// Fails on names that are not valid UTF-8, since they could not be written
/// back under the same name.
pub fn to_posix(relative: &Path) -> BackupResult<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| {
                BackupError::Path(format!("Non-UTF-8 file name: {}", relative.display()))
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

/// Returns true when a manifest path stays inside whatever root it is joined to:
/// non-empty, not absolute, no `..` and no drive prefix.
pub fn is_safe_relative(path: &str) -> bool {
    if path.is_empty() || path.starts_with('/') || path.starts_with('\\') {
        return false;
    }
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && !path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Join a POSIX-style relative path onto a root using host separators.
pub fn join_posix(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Lower-case OS family of the running host, as recorded in manifests.
///
/// macOS is reported as `darwin` so manifests stay comparable with the
/// ones written by earlier releases.
pub fn platform_tag() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}
