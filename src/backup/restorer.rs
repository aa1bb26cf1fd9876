use crate::backup::archive::BackupArchive;
use crate::backup::snapshot;
use crate::backup::verifier::Verifier;
use crate::core::path::{is_safe_relative, join_posix, platform_tag};
use crate::core::{BackupError, BackupResult};
use crate::slicer::{Installation, Locator, SlicerKind};
use crate::Manifest;
use std::fmt;
use std::path::{Path, PathBuf};

/// Directory, beside the restore target, that receives safety backups
pub const SAFETY_BACKUP_DIR_NAME: &str = "slicer_backups_temp";

/// Phases of a restore, each entered at most once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStage {
    Verifying,
    Resolving,
    SafetyBackup,
    Applying,
}

impl fmt::Display for RestoreStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestoreStage::Verifying => "verifying",
            RestoreStage::Resolving => "resolving target",
            RestoreStage::SafetyBackup => "safety backup",
            RestoreStage::Applying => "applying",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Restore into this slicer instead of the one named in the manifest
    pub slicer: Option<SlicerKind>,
    /// Report what would be written without touching the target
    pub dry_run: bool,
    /// Snapshot the target before overwriting it
    pub safety_backup: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            slicer: None,
            dry_run: false,
            safety_backup: true,
        }
    }
}

/// Outcome of a restore that got as far as applying files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub target_root: PathBuf,
    /// Manifest paths written to the target
    pub restored: Vec<String>,
    /// Dry run only: manifest path and the destination it would be written to
    pub planned: Vec<(String, PathBuf)>,
    /// Manifest paths that could not be restored
    pub missing: Vec<String>,
    pub safety_backup: Option<PathBuf>,
    pub dry_run: bool,
}

impl RestoreReport {
    /// True when every manifest entry was restored (or planned)
    pub fn is_success(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Destination of every manifest entry under `target_root`
pub fn restore_plan(manifest: &Manifest, target_root: &Path) -> Vec<(String, PathBuf)> {
    manifest
        .files
        .iter()
        .map(|entry| (entry.path.clone(), join_posix(target_root, &entry.path)))
        .collect()
}

/// Applies backups to live installations found through a `Locator`
pub struct Restorer<'a> {
    locator: &'a dyn Locator,
    verifier: Verifier,
}

impl<'a> Restorer<'a> {
    pub fn new(locator: &'a dyn Locator) -> Self {
        Self {
            locator,
            verifier: Verifier::new(),
        }
    }

    pub fn with_verifier(mut self, verifier: Verifier) -> Self {
        self.verifier = verifier;
        self
    }

    /// Verify `backup`, resolve the target, optionally snapshot it, then
    /// write every manifest entry into it.
    ///
    /// Errors abort before the target is touched. Members that go missing
    /// while applying do not; they are listed in the report instead.
    pub fn restore(&self, backup: &Path, options: &RestoreOptions) -> BackupResult<RestoreReport> {
        enter(RestoreStage::Verifying);
        let mut archive = BackupArchive::open(backup)?;
        let manifest = self.verifier.verify_archive(&mut archive)?;

        enter(RestoreStage::Resolving);
        let kind = match options.slicer {
            Some(kind) => kind,
            None => manifest.slicer.parse()?,
        };
        let target = self.locator.locate(kind)?;
        if !target.exists {
            return Err(BackupError::TargetNotFound(format!(
                "{} configuration directory not found: {}",
                target.display_name,
                target.root.display()
            )));
        }
        if manifest.platform != platform_tag() {
            tracing::info!(
                "Backup was taken on {}, restoring on {}",
                manifest.platform,
                platform_tag()
            );
        }

        let safety_backup = if options.safety_backup && !options.dry_run {
            enter(RestoreStage::SafetyBackup);
            safety_backup(&target)?
        } else {
            None
        };

        enter(RestoreStage::Applying);
        let mut report = self.apply(&mut archive, &manifest, &target.root, options.dry_run)?;
        report.safety_backup = safety_backup;

        if report.is_success() {
            tracing::info!(
                "Restored {} file(s) into {}",
                report.restored.len().max(report.planned.len()),
                report.target_root.display()
            );
        } else {
            tracing::warn!(
                "{} file(s) could not be restored into {}",
                report.missing.len(),
                report.target_root.display()
            );
        }

        Ok(report)
    }

    /// Write (or, for a dry run, list) every manifest entry under
    /// `target_root`, carrying on past members that are missing
    pub fn apply(
        &self,
        archive: &mut BackupArchive,
        manifest: &Manifest,
        target_root: &Path,
        dry_run: bool,
    ) -> BackupResult<RestoreReport> {
        let mut report = RestoreReport {
            target_root: target_root.to_path_buf(),
            dry_run,
            ..Default::default()
        };

        for (relative, dest) in restore_plan(manifest, target_root) {
            if !is_safe_relative(&relative) {
                tracing::warn!("Refusing to restore outside the target: {}", relative);
                report.missing.push(relative);
                continue;
            }

            if dry_run {
                tracing::info!("Would restore {} -> {}", relative, dest.display());
                report.planned.push((relative, dest));
                continue;
            }

            if archive.copy_member(&relative, &dest)? {
                tracing::debug!("Restored {}", relative);
                report.restored.push(relative);
            } else {
                tracing::warn!("File not found in backup: {}", relative);
                report.missing.push(relative);
            }
        }

        Ok(report)
    }
}

fn enter(stage: RestoreStage) {
    tracing::debug!("Restore stage: {}", stage);
}

/// Snapshot the target's current conf file, user and custom scripts
/// directories into `<parent of root>/slicer_backups_temp`
fn safety_backup(target: &Installation) -> BackupResult<Option<PathBuf>> {
    if !target.has_backup_content() {
        tracing::info!("Nothing to protect in {}", target.root.display());
        return Ok(None);
    }

    let parent = target.root.parent().ok_or_else(|| {
        BackupError::SafetyBackup(format!(
            "{} has no parent directory",
            target.root.display()
        ))
    })?;

    tracing::info!("Creating backup of existing configuration");
    let path = snapshot(target, &parent.join(SAFETY_BACKUP_DIR_NAME))
        .map_err(|e| BackupError::SafetyBackup(e.to_string()))?;
    tracing::info!("Safety backup written to {}", path.display());

    Ok(Some(path))
}
