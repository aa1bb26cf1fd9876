use crate::core::{BackupError, BackupResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the manifest sidecar stored at the root of every backup.
pub const MANIFEST_FILE_NAME: &str = "backup_manifest.json";

/// Schema version written into new manifests.
pub const MANIFEST_VERSION: &str = "1.0";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One backed-up regular file.
///
/// `sha256` is stored as given; its length and alphabet are not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the backup root, always `/`-separated
    pub path: String,
    pub size: u64,
    pub sha256: String,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, size: u64, sha256: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size,
            sha256: sha256.into(),
        }
    }
}

/// Record of what a backup contains, serialized as `backup_manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_version")]
    pub version: String,
    pub created_at: NaiveDateTime,
    pub slicer: String,
    #[serde(default)]
    pub slicer_version: Option<String>,
    /// Informational only; restores never branch on it.
    pub platform: String,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    pub total_files: usize,
    pub total_size: u64,
    #[serde(default = "default_true")]
    pub compressed: bool,
}

fn default_version() -> String {
    MANIFEST_VERSION.to_string()
}

fn default_true() -> bool {
    true
}

impl Manifest {
    /// Total backed-up size in MiB
    pub fn size_mb(&self) -> f64 {
        self.total_size as f64 / BYTES_PER_MB
    }

    /// Parse a manifest from its JSON text
    pub fn from_json(content: &str) -> BackupResult<Self> {
        serde_json::from_str(content).map_err(BackupError::from)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> BackupResult<String> {
        serde_json::to_string_pretty(self).map_err(BackupError::from)
    }

    /// Write the manifest sidecar into `dir`
    pub fn save(&self, dir: &Path) -> BackupResult<PathBuf> {
        let path = dir.join(MANIFEST_FILE_NAME);
        fs::write(&path, self.to_json()?)?;
        Ok(path)
    }

    /// Load the manifest sidecar from a backup directory
    pub fn load(dir: &Path) -> BackupResult<Self> {
        let path = dir.join(MANIFEST_FILE_NAME);
        if !path.is_file() {
            return Err(BackupError::Verification(format!(
                "{} not found in {}",
                MANIFEST_FILE_NAME,
                dir.display()
            )));
        }
        let content = fs::read_to_string(&path)?;
        Self::from_json(&content)
    }
}

/// Summary of a backup on disk
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub backup_path: PathBuf,
    pub manifest: Manifest,
    pub is_valid: bool,
    /// Bytes used on disk (archive length, or summed tree for directories)
    pub size_bytes: u64,
}

impl BackupInfo {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }
}
