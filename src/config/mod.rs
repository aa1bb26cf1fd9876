use crate::core::path::{config_file, default_backup_dir, ensure_dir};
use crate::core::{BackupError, BackupResult};
use crate::slicer::SlicerKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where new backups are written (defaults to ~/SlicerBackups)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<String>,

    /// Whether backups are written as a zip container
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Whether a finished backup is verified before reporting success
    #[serde(default = "default_true")]
    pub verify: bool,

    /// Whether restore snapshots the target before overwriting it
    #[serde(default = "default_true")]
    pub safety_backup: bool,

    /// Per-slicer configuration root overrides
    /// Example: { "orcaslicer": "/mnt/data/OrcaSlicer" }
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub slicer_paths: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_dir: None,
            compress: true,
            verify: true,
            safety_backup: true,
            slicer_paths: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config from the platform-specific config directory, creating a
    /// default file if it doesn't exist
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\slicer-backup\config.yaml
    /// - Linux: ~/.config/slicer-backup/config.yaml
    /// - macOS: ~/Library/Application Support/slicer-backup/config.yaml
    pub fn load() -> BackupResult<Self> {
        let config_path = config_file()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> BackupResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| BackupError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save config to an explicit file, creating its directory
    pub fn save_to(&self, path: &Path) -> BackupResult<()> {
        if let Some(dir) = path.parent() {
            ensure_dir(dir)?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| BackupError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the backup destination directory
    pub fn get_backup_dir(&self) -> BackupResult<PathBuf> {
        match self.backup_dir {
            Some(ref dir) => Ok(PathBuf::from(dir)),
            None => default_backup_dir(),
        }
    }

    /// Parsed `slicer_paths` overrides
    pub fn path_overrides(&self) -> BackupResult<HashMap<SlicerKind, PathBuf>> {
        self.slicer_paths
            .iter()
            .map(|(id, path)| {
                let kind = id.parse::<SlicerKind>().map_err(|_| {
                    BackupError::Config(format!("Unknown slicer '{}' in slicer_paths", id))
                })?;
                Ok((kind, PathBuf::from(path)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.compress);
        assert!(config.verify);
        assert!(config.safety_backup);
        assert!(config.slicer_paths.is_empty());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.backup_dir = Some("/srv/backups".to_string());
        config.compress = false;
        config.save_to(&config_path).unwrap();

        let loaded = Config::load_from(&config_path).unwrap();
        assert_eq!(loaded.backup_dir.as_deref(), Some("/srv/backups"));
        assert!(!loaded.compress);
        assert_eq!(
            loaded.get_backup_dir().unwrap(),
            PathBuf::from("/srv/backups")
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        fs::write(&config_path, "verify: false\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert!(!config.verify);
        assert!(config.compress);
        assert!(config.safety_backup);
    }

    #[test]
    fn test_path_overrides() {
        let mut config = Config::default();
        config
            .slicer_paths
            .insert("orca-flashforge".to_string(), "/opt/ff".to_string());

        let overrides = config.path_overrides().unwrap();
        assert_eq!(
            overrides.get(&SlicerKind::OrcaFlashforge),
            Some(&PathBuf::from("/opt/ff"))
        );

        config
            .slicer_paths
            .insert("cura".to_string(), "/opt/cura".to_string());
        assert!(matches!(
            config.path_overrides(),
            Err(BackupError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        fs::write(&config_path, "compress: [unclosed\n").unwrap();

        assert!(matches!(
            Config::load_from(&config_path),
            Err(BackupError::Config(_))
        ));
    }
}
