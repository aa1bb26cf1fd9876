use crate::backup::checksum::digest_file;
use crate::core::path::{ensure_dir, to_posix};
use crate::core::{BackupError, BackupResult};
use crate::slicer::Installation;
use crate::FileEntry;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Copies an installation's configuration into a staging directory
pub struct StagingBuilder {
    staging_dir: PathBuf,
}

impl StagingBuilder {
    pub fn new(staging_dir: &Path) -> Self {
        Self {
            staging_dir: staging_dir.to_path_buf(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Stage a complete installation: conf file, user directory and, when
    /// present, custom scripts. Fails before copying anything if the
    /// installation is incomplete.
    pub fn stage(&self, installation: &Installation) -> BackupResult<Vec<FileEntry>> {
        if !installation.is_valid() {
            return Err(BackupError::InvalidInstallation(format!(
                "{} at {} is missing its configuration file or user directory",
                installation.display_name,
                installation.root.display()
            )));
        }
        self.stage_present(installation)
    }

    /// Stage whatever of the conf file, user directory and custom scripts
    /// exists right now. Used for snapshots of restore targets, which may be
    /// only partially set up.
    pub fn stage_present(&self, installation: &Installation) -> BackupResult<Vec<FileEntry>> {
        ensure_dir(&self.staging_dir)?;
        let mut entries = Vec::new();

        if let Some(conf_file) = installation.conf_file.as_deref().filter(|p| p.is_file()) {
            let name = file_name(conf_file)?;
            entries.push(self.copy_file(conf_file, Path::new(name))?);
        }

        if let Some(user_dir) = installation.user_dir.as_deref().filter(|p| p.is_dir()) {
            entries.extend(self.copy_tree(user_dir)?);
        }

        if let Some(scripts) = installation
            .custom_scripts_dir
            .as_deref()
            .filter(|p| p.is_dir())
        {
            entries.extend(self.copy_tree(scripts)?);
        }

        tracing::info!(
            "Staged {} file(s) from {} into {}",
            entries.len(),
            installation.display_name,
            self.staging_dir.display()
        );

        Ok(entries)
    }

    /// Copy every regular file below `dir` to `<staging>/<dir name>/...`
    fn copy_tree(&self, dir: &Path) -> BackupResult<Vec<FileEntry>> {
        let base = Path::new(file_name(dir)?);
        let mut entries = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let inner = entry.path().strip_prefix(dir).map_err(|e| {
                BackupError::Path(format!("Failed to get relative path: {}", e))
            })?;
            entries.push(self.copy_file(entry.path(), &base.join(inner))?);
        }

        Ok(entries)
    }

    /// Copy one file into staging at `relative`, keeping its modification
    /// time, and describe it
    fn copy_file(&self, src: &Path, relative: &Path) -> BackupResult<FileEntry> {
        let path = to_posix(relative)?;
        let dest = self.staging_dir.join(relative);
        copy_with_metadata(src, &dest)?;

        let digest = digest_file(&dest)?;
        tracing::debug!("Staged {} ({} bytes)", path, digest.size);

        Ok(FileEntry::new(path, digest.size, digest.sha256))
    }
}

/// Copy `src` to `dest`, creating parents and carrying over the mtime
pub fn copy_with_metadata(src: &Path, dest: &Path) -> BackupResult<()> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }

    fs::copy(src, dest)?;

    let modified = fs::metadata(src)?.modified()?;
    File::options().write(true).open(dest)?.set_modified(modified)?;

    Ok(())
}

fn file_name(path: &Path) -> BackupResult<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| BackupError::Path(format!("Invalid file name: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::checksum::sha256_file;
    use crate::slicer::SlicerKind;
    use tempfile::TempDir;

    fn orca_install(root: &Path) -> Installation {
        fs::create_dir_all(root.join("user").join("filament")).unwrap();
        fs::create_dir_all(root.join("user").join("process")).unwrap();
        fs::write(root.join("OrcaSlicer.conf"), r#"{"header": "OrcaSlicer 2.1.0"}"#).unwrap();
        fs::write(
            root.join("user").join("filament").join("custom_pla.json"),
            r#"{"temp": 210}"#,
        )
        .unwrap();
        fs::write(
            root.join("user").join("process").join("custom_profile.json"),
            r#"{"layer_height": 0.2}"#,
        )
        .unwrap();
        Installation::inspect(SlicerKind::OrcaSlicer, root)
    }

    #[test]
    fn test_stage_conf_and_user_dir() {
        let temp = TempDir::new().unwrap();
        let install = orca_install(&temp.path().join("OrcaSlicer"));
        let staging = temp.path().join("staging");

        let entries = StagingBuilder::new(&staging).stage(&install).unwrap();

        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "OrcaSlicer.conf",
                "user/filament/custom_pla.json",
                "user/process/custom_profile.json",
            ]
        );
        assert!(staging.join("OrcaSlicer.conf").is_file());
        assert!(!staging.join("custom_scripts").exists());

        for entry in &entries {
            let staged = staging.join(&entry.path);
            assert_eq!(entry.size, fs::metadata(&staged).unwrap().len());
            assert_eq!(entry.sha256, sha256_file(&staged).unwrap());
            assert!(!Path::new(&entry.path).is_absolute());
        }
    }

    #[test]
    fn test_stage_custom_scripts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("Orca-Flashforge");
        fs::create_dir_all(root.join("user")).unwrap();
        fs::create_dir_all(root.join("custom_scripts")).unwrap();
        fs::write(root.join("Orca-Flashforge.conf"), "{}").unwrap();
        fs::write(root.join("custom_scripts").join("test_script.py"), "print('test')").unwrap();
        let install = Installation::inspect(SlicerKind::OrcaFlashforge, &root);

        let staging = temp.path().join("staging");
        let entries = StagingBuilder::new(&staging).stage(&install).unwrap();

        assert!(entries.iter().any(|e| e.path == "custom_scripts/test_script.py"));
        assert!(staging.join("custom_scripts").join("test_script.py").is_file());
    }

    #[test]
    fn test_stage_invalid_installation() {
        let temp = TempDir::new().unwrap();
        let install = Installation::inspect(SlicerKind::OrcaSlicer, &temp.path().join("missing"));
        let staging = temp.path().join("staging");

        let result = StagingBuilder::new(&staging).stage(&install);
        assert!(matches!(result, Err(BackupError::InvalidInstallation(_))));
        assert!(!staging.exists());
    }

    #[test]
    fn test_stage_present_partial() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("OrcaSlicer");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("OrcaSlicer.conf"), "{}").unwrap();
        let install = Installation::inspect(SlicerKind::OrcaSlicer, &root);
        assert!(!install.is_valid());

        let entries = StagingBuilder::new(&temp.path().join("staging"))
            .stage_present(&install)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "OrcaSlicer.conf");
    }

    // macOS refuses to create non-UTF-8 names at all
    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_rejected_before_copy() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let root = temp.path().join("OrcaSlicer");
        let install = orca_install(&root);
        let bad_name = OsStr::from_bytes(b"bad\xffname.json");
        fs::write(root.join("user").join(bad_name), "{}").unwrap();

        let staging = temp.path().join("staging");
        let result = StagingBuilder::new(&staging).stage(&install);

        let err = result.unwrap_err();
        assert!(matches!(err, BackupError::Path(_)));
        assert!(err.to_string().contains("Non-UTF-8 file name"));
        assert!(!staging.join("user").join(bad_name).exists());
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("test.txt");
        fs::write(&src, "content").unwrap();
        let dest = temp.path().join("dest").join("nested").join("test.txt");

        copy_with_metadata(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "content");
        assert_eq!(
            fs::metadata(&dest).unwrap().modified().unwrap(),
            fs::metadata(&src).unwrap().modified().unwrap()
        );
    }
}
