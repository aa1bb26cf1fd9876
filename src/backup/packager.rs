use crate::backup::archive::{compress_directory, ARCHIVE_EXTENSION};
use crate::core::path::ensure_dir;
use crate::core::BackupResult;
use crate::Manifest;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// File name for a backup of `slicer` taken at `created_at`.
///
/// `orcaslicer` becomes `Orcaslicer_backup_2025-11-14_15-30-45.zip`;
/// `orca-flashforge` becomes `Orca_Flashforge_backup_...`.
pub fn backup_name(slicer: &str, created_at: NaiveDateTime, compressed: bool) -> String {
    let stem = format!(
        "{}_backup_{}",
        title_case(slicer).replace('-', "_"),
        created_at.format(TIMESTAMP_FORMAT)
    );
    if compressed {
        format!("{}.{}", stem, ARCHIVE_EXTENSION)
    } else {
        stem
    }
}

/// Upper-case the first letter of every run of letters, lower-case the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Where a backup is staged and where it ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePlan {
    pub target: PathBuf,
    pub staging_dir: PathBuf,
    pub compressed: bool,
}

/// Finalizes staged backups inside an output directory
pub struct Packager {
    output_dir: PathBuf,
}

impl Packager {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Pick a free target name for a new backup.
    ///
    /// Uncompressed backups are staged in place. Compressed ones are staged in
    /// a hidden `.tmp-<name>` directory next to the container.
    pub fn plan(
        &self,
        slicer: &str,
        created_at: NaiveDateTime,
        compressed: bool,
    ) -> BackupResult<PackagePlan> {
        ensure_dir(&self.output_dir)?;

        let target = unique_path(&self.output_dir, &backup_name(slicer, created_at, compressed));
        let staging_dir = if compressed {
            let name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.output_dir.join(format!(".tmp-{}", name))
        } else {
            target.clone()
        };

        // Left over from an interrupted run
        if staging_dir.exists() {
            tracing::warn!(
                "Removing stale staging directory {}",
                staging_dir.display()
            );
            fs::remove_dir_all(&staging_dir)?;
        }

        Ok(PackagePlan {
            target,
            staging_dir,
            compressed,
        })
    }

    /// Write the manifest sidecar into staging and produce the final artifact
    pub fn finish(&self, plan: &PackagePlan, manifest: &Manifest) -> BackupResult<PathBuf> {
        ensure_dir(&plan.staging_dir)?;
        manifest.save(&plan.staging_dir)?;

        if plan.compressed {
            compress_directory(&plan.staging_dir, &plan.target)?;
            fs::remove_dir_all(&plan.staging_dir)?;
            tracing::info!("Wrote compressed backup {}", plan.target.display());
        } else {
            tracing::info!("Wrote backup directory {}", plan.target.display());
        }

        Ok(plan.target.clone())
    }

    /// Remove whatever a failed run left behind
    pub fn discard(&self, plan: &PackagePlan) {
        if plan.staging_dir.exists() {
            if let Err(e) = fs::remove_dir_all(&plan.staging_dir) {
                tracing::warn!(
                    "Could not remove staging directory {}: {}",
                    plan.staging_dir.display(),
                    e
                );
            }
        }
        if plan.compressed && plan.target.is_file() {
            if let Err(e) = fs::remove_file(&plan.target) {
                tracing::warn!(
                    "Could not remove partial archive {}: {}",
                    plan.target.display(),
                    e
                );
            }
        }
    }
}

/// `dir/name`, or `dir/name_1`, `dir/name_2`... (suffix before the extension)
/// when that is taken
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let suffix = format!(".{}", ARCHIVE_EXTENSION);
    let (stem, ext) = match name.strip_suffix(&suffix) {
        Some(stem) => (stem, suffix.as_str()),
        None => (name, ""),
    };

    (1u32..)
        .map(|n| dir.join(format!("{}_{}{}", stem, n, ext)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileEntry, MANIFEST_FILE_NAME};
    use chrono::NaiveDate;
    use std::fs::File;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 14)
            .unwrap()
            .and_hms_opt(15, 30, 45)
            .unwrap()
    }

    fn manifest(compressed: bool) -> Manifest {
        Manifest {
            version: "1.0".to_string(),
            created_at: timestamp(),
            slicer: "orcaslicer".to_string(),
            slicer_version: None,
            platform: "linux".to_string(),
            files: vec![FileEntry::new("test.txt", 4, "a".repeat(64))],
            total_files: 1,
            total_size: 4,
            compressed,
        }
    }

    #[test]
    fn test_backup_names() {
        assert_eq!(
            backup_name("orcaslicer", timestamp(), true),
            "Orcaslicer_backup_2025-11-14_15-30-45.zip"
        );
        assert_eq!(
            backup_name("orca-flashforge", timestamp(), false),
            "Orca_Flashforge_backup_2025-11-14_15-30-45"
        );
        assert_eq!(
            backup_name("OrCaSlIcEr", timestamp(), false),
            "Orcaslicer_backup_2025-11-14_15-30-45"
        );
    }

    #[test]
    fn test_plan_uncompressed_stages_in_place() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("backups");
        let plan = Packager::new(&output)
            .plan("orcaslicer", timestamp(), false)
            .unwrap();

        assert!(output.is_dir());
        assert_eq!(plan.target, output.join("Orcaslicer_backup_2025-11-14_15-30-45"));
        assert_eq!(plan.staging_dir, plan.target);
    }

    #[test]
    fn test_plan_avoids_collisions() {
        let temp = TempDir::new().unwrap();
        let packager = Packager::new(temp.path());
        fs::write(
            temp.path().join("Orcaslicer_backup_2025-11-14_15-30-45.zip"),
            "",
        )
        .unwrap();
        fs::write(
            temp.path().join("Orcaslicer_backup_2025-11-14_15-30-45_1.zip"),
            "",
        )
        .unwrap();

        let plan = packager.plan("orcaslicer", timestamp(), true).unwrap();
        assert_eq!(
            plan.target,
            temp.path().join("Orcaslicer_backup_2025-11-14_15-30-45_2.zip")
        );
        assert_eq!(
            plan.staging_dir,
            temp.path()
                .join(".tmp-Orcaslicer_backup_2025-11-14_15-30-45_2.zip")
        );
    }

    #[test]
    fn test_plan_clears_stale_staging() {
        let temp = TempDir::new().unwrap();
        let packager = Packager::new(temp.path());
        let stale = temp
            .path()
            .join(".tmp-Orcaslicer_backup_2025-11-14_15-30-45.zip");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("leftover.json"), "{}").unwrap();

        let plan = packager.plan("orcaslicer", timestamp(), true).unwrap();
        assert_eq!(plan.staging_dir, stale);
        assert!(!stale.exists());

        fs::create_dir_all(plan.staging_dir.join("user")).unwrap();
        fs::write(plan.staging_dir.join("user").join("test.txt"), "test").unwrap();
        let result = packager.finish(&plan, &manifest(true)).unwrap();

        let archive = ZipArchive::new(File::open(&result).unwrap()).unwrap();
        assert!(!archive.file_names().any(|n| n == "leftover.json"));
    }

    #[test]
    fn test_finish_directory() {
        let temp = TempDir::new().unwrap();
        let packager = Packager::new(temp.path());
        let plan = packager.plan("orcaslicer", timestamp(), false).unwrap();
        fs::create_dir_all(&plan.staging_dir).unwrap();
        fs::write(plan.staging_dir.join("test.txt"), "test").unwrap();

        let result = packager.finish(&plan, &manifest(false)).unwrap();

        assert!(result.is_dir());
        assert!(result.join("test.txt").is_file());
        assert!(result.join(MANIFEST_FILE_NAME).is_file());
    }

    #[test]
    fn test_finish_compressed_removes_staging() {
        let temp = TempDir::new().unwrap();
        let packager = Packager::new(temp.path());
        let plan = packager.plan("orcaslicer", timestamp(), true).unwrap();
        fs::create_dir_all(plan.staging_dir.join("user")).unwrap();
        fs::write(plan.staging_dir.join("user").join("test.txt"), "test").unwrap();

        let result = packager.finish(&plan, &manifest(true)).unwrap();

        assert!(result.is_file());
        assert!(!plan.staging_dir.exists());

        let mut archive = ZipArchive::new(File::open(&result).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec![MANIFEST_FILE_NAME, "user/test.txt"]);
        assert!(archive.by_name(MANIFEST_FILE_NAME).is_ok());
    }

    #[test]
    fn test_discard_cleans_up() {
        let temp = TempDir::new().unwrap();
        let packager = Packager::new(temp.path());
        let plan = packager.plan("orcaslicer", timestamp(), true).unwrap();
        fs::create_dir_all(&plan.staging_dir).unwrap();
        fs::write(&plan.target, "partial").unwrap();

        packager.discard(&plan);

        assert!(!plan.staging_dir.exists());
        assert!(!plan.target.exists());
    }
}
