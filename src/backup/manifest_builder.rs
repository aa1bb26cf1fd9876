use crate::core::path::{is_safe_relative, platform_tag};
use crate::core::{BackupError, BackupResult};
use crate::slicer::Installation;
use crate::{FileEntry, Manifest, MANIFEST_VERSION};
use chrono::{Local, NaiveDateTime};

/// Turns staged file entries into a manifest. No I/O.
pub struct ManifestBuilder<'a> {
    installation: &'a Installation,
    compressed: bool,
    created_at: Option<NaiveDateTime>,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(installation: &'a Installation) -> Self {
        Self {
            installation,
            compressed: true,
            created_at: None,
        }
    }

    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Pin the creation time instead of reading the clock
    pub fn created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Build the manifest; totals are derived from `entries`
    pub fn build(self, entries: Vec<FileEntry>) -> BackupResult<Manifest> {
        if let Some(bad) = entries.iter().find(|e| !is_safe_relative(&e.path)) {
            return Err(BackupError::Path(format!(
                "Manifest paths must be relative and stay inside the backup: '{}'",
                bad.path
            )));
        }

        let total_size = entries.iter().map(|e| e.size).sum();

        Ok(Manifest {
            version: MANIFEST_VERSION.to_string(),
            created_at: self
                .created_at
                .unwrap_or_else(|| Local::now().naive_local()),
            slicer: self.installation.id().to_string(),
            slicer_version: self.installation.version.clone(),
            platform: platform_tag().to_string(),
            total_files: entries.len(),
            total_size,
            files: entries,
            compressed: self.compressed,
        })
    }
}
