pub mod archive;
pub mod checksum;
pub mod info;
pub mod manifest_builder;
pub mod packager;
pub mod restorer;
pub mod staging;
pub mod verifier;

pub use archive::{compress_directory, BackupArchive};
pub use checksum::{sha256_file, Digested};
pub use info::{backup_info, list_backups};
pub use manifest_builder::ManifestBuilder;
pub use packager::{backup_name, PackagePlan, Packager};
pub use restorer::{RestoreOptions, RestoreReport, Restorer};
pub use staging::StagingBuilder;
pub use verifier::{TracingObserver, Verifier, VerifyObserver};

use crate::core::{BackupError, BackupResult};
use crate::slicer::Installation;
use chrono::Local;
use std::path::{Path, PathBuf};

/// How a backup is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupOptions {
    /// Produce a zip container instead of a directory
    pub compress: bool,
    /// Run the finished backup through the verifier
    pub verify: bool,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            compress: true,
            verify: true,
        }
    }
}

/// Back up a complete installation into `output_dir`.
///
/// Fails with `InvalidInstallation` before writing anything when the
/// installation lacks its conf file or user directory.
pub fn create_backup(
    installation: &Installation,
    output_dir: &Path,
    options: &BackupOptions,
) -> BackupResult<PathBuf> {
    if !installation.is_valid() {
        return Err(BackupError::InvalidInstallation(format!(
            "{} is not installed or incomplete at {}",
            installation.display_name,
            installation.root.display()
        )));
    }
    write_backup(installation, output_dir, options, false)
}

/// Back up whatever part of an installation exists, compressed and verified.
/// Used to snapshot a restore target before it is overwritten.
pub(crate) fn snapshot(installation: &Installation, output_dir: &Path) -> BackupResult<PathBuf> {
    write_backup(installation, output_dir, &BackupOptions::default(), true)
}

fn write_backup(
    installation: &Installation,
    output_dir: &Path,
    options: &BackupOptions,
    partial: bool,
) -> BackupResult<PathBuf> {
    tracing::info!(
        "Backing up {} from {}",
        installation.display_name,
        installation.root.display()
    );

    let created_at = Local::now().naive_local();
    let packager = Packager::new(output_dir);
    let plan = packager.plan(installation.id(), created_at, options.compress)?;

    let packaged = (|| -> BackupResult<PathBuf> {
        let staging = StagingBuilder::new(&plan.staging_dir);
        let entries = if partial {
            staging.stage_present(installation)?
        } else {
            staging.stage(installation)?
        };

        let manifest = ManifestBuilder::new(installation)
            .compressed(options.compress)
            .created_at(created_at)
            .build(entries)?;

        packager.finish(&plan, &manifest)
    })();

    let backup_path = match packaged {
        Ok(path) => path,
        Err(e) => {
            packager.discard(&plan);
            return Err(e);
        }
    };

    if options.verify {
        Verifier::new().verify(&backup_path)?;
        tracing::info!("Verified {}", backup_path.display());
    }

    Ok(backup_path)
}
