use crate::core::path::home_dir;
use crate::core::{BackupError, BackupResult};
use crate::slicer::{Installation, SlicerKind};
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolves a slicer to its live installation.
///
/// Backup and restore take a `&dyn Locator` instead of looking paths up
/// themselves, so callers can point them at any directory layout.
pub trait Locator {
    /// Root configuration directory for `kind` (it may not exist)
    fn root_for(&self, kind: SlicerKind) -> BackupResult<PathBuf>;

    /// Inspect the installation of `kind`
    fn locate(&self, kind: SlicerKind) -> BackupResult<Installation> {
        let root = self.root_for(kind)?;
        Ok(Installation::inspect(kind, &root))
    }

    /// Every known slicer, installed or not
    fn detect_all(&self) -> BackupResult<Vec<Installation>> {
        SlicerKind::ALL.iter().map(|kind| self.locate(*kind)).collect()
    }

    /// Only the slicers with a complete installation
    fn installed(&self) -> BackupResult<Vec<Installation>> {
        Ok(self
            .detect_all()?
            .into_iter()
            .filter(Installation::is_valid)
            .collect())
    }
}

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Platform of the running host
    pub fn current() -> BackupResult<Self> {
        match std::env::consts::OS {
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::MacOs),
            "linux" => Ok(Platform::Linux),
            other => Err(BackupError::UnsupportedPlatform(other.to_string())),
        }
    }
}

/// Standard per-platform configuration locations, relative to a home directory
#[derive(Debug, Clone)]
pub struct PlatformLocator {
    home: PathBuf,
    platform: Platform,
    overrides: HashMap<SlicerKind, PathBuf>,
}

impl PlatformLocator {
    pub fn new(home: PathBuf, platform: Platform) -> Self {
        Self {
            home,
            platform,
            overrides: HashMap::new(),
        }
    }

    /// Locator for the current user on the running host
    pub fn for_current_user() -> BackupResult<Self> {
        Ok(Self::new(home_dir()?, Platform::current()?))
    }

    /// Use `root` for `kind` instead of the platform default
    pub fn with_override(mut self, kind: SlicerKind, root: PathBuf) -> Self {
        self.overrides.insert(kind, root);
        self
    }

    pub fn with_overrides(mut self, overrides: HashMap<SlicerKind, PathBuf>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    fn standard_root(&self, kind: SlicerKind) -> PathBuf {
        let base = match self.platform {
            Platform::Windows => self.home.join("AppData").join("Roaming"),
            Platform::MacOs => self.home.join("Library").join("Application Support"),
            Platform::Linux => self.home.join(".config"),
        };
        base.join(kind.display_name())
    }

    /// Sandboxed Flatpak location, checked before the standard one on Linux
    fn flatpak_root(&self, kind: SlicerKind) -> Option<PathBuf> {
        let app_id = kind.flatpak_app_id()?;
        Some(
            self.home
                .join(".var")
                .join("app")
                .join(app_id)
                .join("config")
                .join(kind.display_name()),
        )
    }
}

impl Locator for PlatformLocator {
    fn root_for(&self, kind: SlicerKind) -> BackupResult<PathBuf> {
        if let Some(root) = self.overrides.get(&kind) {
            return Ok(root.clone());
        }

        if self.platform == Platform::Linux {
            if let Some(flatpak) = self.flatpak_root(kind).filter(|p| p.exists()) {
                return Ok(flatpak);
            }
        }

        Ok(self.standard_root(kind))
    }
}
