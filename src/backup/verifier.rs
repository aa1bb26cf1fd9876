use crate::backup::archive::BackupArchive;
use crate::backup::checksum::checksums_match;
use crate::core::{BackupError, BackupResult};
use crate::Manifest;
use std::path::Path;

/// Receives progress messages while a backup is verified
pub trait VerifyObserver {
    fn progress(&self, message: &str);
}

/// Forwards progress to `tracing` at debug level
pub struct TracingObserver;

impl VerifyObserver for TracingObserver {
    fn progress(&self, message: &str) {
        tracing::debug!("{}", message);
    }
}

/// Checks a finished backup against its manifest.
///
/// Stops at the first problem: missing backup, corrupted container, missing
/// or unparsable manifest, then per file a missing member, a hash mismatch
/// or a size mismatch.
pub struct Verifier {
    observer: Box<dyn VerifyObserver>,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Verifier {
    pub fn new() -> Self {
        Self::with_observer(Box::new(TracingObserver))
    }

    pub fn with_observer(observer: Box<dyn VerifyObserver>) -> Self {
        Self { observer }
    }

    /// Verify the backup at `path`, returning its manifest on success
    pub fn verify(&self, path: &Path) -> BackupResult<Manifest> {
        let mut archive = BackupArchive::open(path)?;
        self.verify_archive(&mut archive)
    }

    /// Like `verify`, but only reports whether the backup passed
    pub fn is_valid(&self, path: &Path) -> bool {
        match self.verify(path) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("{}", e);
                false
            }
        }
    }

    /// Verify an already opened backup
    pub fn verify_archive(&self, archive: &mut BackupArchive) -> BackupResult<Manifest> {
        self.observer
            .progress(&format!("Backup found: {}", archive.path().display()));

        if archive.is_compressed() {
            archive.check_container()?;
            self.observer.progress("Archive structure is intact");
        }

        let manifest = archive.read_manifest().ok_or_else(|| {
            BackupError::Verification(format!(
                "Manifest file not found or invalid in {}",
                archive.path().display()
            ))
        })?;
        self.observer.progress("Manifest file found and valid");

        for entry in &manifest.files {
            let actual = archive.digest_member(&entry.path)?.ok_or_else(|| {
                BackupError::Verification(format!("File missing from backup: {}", entry.path))
            })?;

            if !checksums_match(&entry.sha256, &actual.sha256) {
                return Err(BackupError::Verification(format!(
                    "Checksum mismatch for '{}':\n  Expected: {}\n  Actual:   {}",
                    entry.path, entry.sha256, actual.sha256
                )));
            }

            if entry.size != actual.size {
                return Err(BackupError::Verification(format!(
                    "Size mismatch for '{}': expected {} bytes, found {}",
                    entry.path, entry.size, actual.size
                )));
            }
        }

        self.observer.progress(&format!(
            "All checksums verified ({} file(s))",
            manifest.files.len()
        ));

        Ok(manifest)
    }
}
