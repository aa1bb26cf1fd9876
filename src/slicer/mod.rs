pub mod locator;
pub mod version;

pub use locator::{Locator, Platform, PlatformLocator};
pub use version::extract_version;

use crate::core::BackupError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Slicers whose configuration can be backed up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlicerKind {
    OrcaSlicer,
    OrcaFlashforge,
}

impl SlicerKind {
    pub const ALL: [SlicerKind; 2] = [SlicerKind::OrcaSlicer, SlicerKind::OrcaFlashforge];

    /// Stable identifier used in manifests and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            SlicerKind::OrcaSlicer => "orcaslicer",
            SlicerKind::OrcaFlashforge => "orca-flashforge",
        }
    }

    /// Name of the application, which is also its configuration directory name
    pub fn display_name(&self) -> &'static str {
        match self {
            SlicerKind::OrcaSlicer => "OrcaSlicer",
            SlicerKind::OrcaFlashforge => "Orca-Flashforge",
        }
    }

    /// Flatpak application id, for slicers distributed that way on Linux
    pub fn flatpak_app_id(&self) -> Option<&'static str> {
        match self {
            SlicerKind::OrcaSlicer => Some("io.github.softfever.OrcaSlicer"),
            SlicerKind::OrcaFlashforge => None,
        }
    }

    /// File name of the main configuration file inside the root
    pub fn conf_file_name(&self) -> String {
        format!("{}.conf", self.display_name())
    }
}

impl fmt::Display for SlicerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SlicerKind {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SlicerKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| BackupError::UnknownSlicer(s.to_string()))
    }
}

/// Directory holding user presets inside a slicer root
pub const USER_DIR_NAME: &str = "user";

/// Directory holding post-processing scripts inside a slicer root
pub const CUSTOM_SCRIPTS_DIR_NAME: &str = "custom_scripts";

/// Snapshot of a slicer installation taken from the live filesystem.
///
/// Optional paths are only set when they exist at inspection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub kind: SlicerKind,
    pub display_name: String,
    pub root: PathBuf,
    pub exists: bool,
    pub version: Option<String>,
    pub conf_file: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
    pub custom_scripts_dir: Option<PathBuf>,
}

impl Installation {
    /// Inspect `root` and describe what is there
    pub fn inspect(kind: SlicerKind, root: &Path) -> Self {
        let exists = root.is_dir();
        let existing = |path: PathBuf, want_dir: bool| {
            let present = if want_dir { path.is_dir() } else { path.is_file() };
            (exists && present).then_some(path)
        };

        let conf_file = existing(root.join(kind.conf_file_name()), false);
        let user_dir = existing(root.join(USER_DIR_NAME), true);
        let custom_scripts_dir = existing(root.join(CUSTOM_SCRIPTS_DIR_NAME), true);
        let version = conf_file.as_deref().and_then(extract_version);

        Self {
            kind,
            display_name: kind.display_name().to_string(),
            root: root.to_path_buf(),
            exists,
            version,
            conf_file,
            user_dir,
            custom_scripts_dir,
        }
    }

    /// Identifier recorded in manifests
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    /// True when the root, conf file and user directory are all present
    pub fn is_valid(&self) -> bool {
        self.exists
            && self.conf_file.as_deref().is_some_and(Path::is_file)
            && self.user_dir.as_deref().is_some_and(Path::is_dir)
    }

    /// True when at least one of the items a backup would capture is present
    pub fn has_backup_content(&self) -> bool {
        self.conf_file.as_deref().is_some_and(Path::is_file)
            || self.user_dir.as_deref().is_some_and(Path::is_dir)
            || self.custom_scripts_dir.as_deref().is_some_and(Path::is_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_slicer_kind_ids() {
        assert_eq!(SlicerKind::OrcaSlicer.id(), "orcaslicer");
        assert_eq!(SlicerKind::OrcaFlashforge.id(), "orca-flashforge");
        assert_eq!(
            "orca-flashforge".parse::<SlicerKind>().unwrap(),
            SlicerKind::OrcaFlashforge
        );
        assert!(matches!(
            "invalid-slicer".parse::<SlicerKind>(),
            Err(BackupError::UnknownSlicer(_))
        ));
    }

    #[test]
    fn test_inspect_complete_installation() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("OrcaSlicer");
        fs::create_dir_all(root.join("user")).unwrap();
        fs::write(
            root.join("OrcaSlicer.conf"),
            r#"{"header": "OrcaSlicer 2.1.0-beta"}"#,
        )
        .unwrap();

        let install = Installation::inspect(SlicerKind::OrcaSlicer, &root);
        assert!(install.exists);
        assert!(install.is_valid());
        assert_eq!(install.display_name, "OrcaSlicer");
        assert_eq!(install.conf_file, Some(root.join("OrcaSlicer.conf")));
        assert_eq!(install.user_dir, Some(root.join("user")));
        assert_eq!(install.version.as_deref(), Some("2.1.0-beta"));
        assert!(install.custom_scripts_dir.is_none());
    }

    #[test]
    fn test_inspect_missing_root() {
        let temp = TempDir::new().unwrap();
        let install = Installation::inspect(SlicerKind::OrcaSlicer, &temp.path().join("missing"));

        assert!(!install.exists);
        assert!(!install.is_valid());
        assert!(install.conf_file.is_none());
        assert!(install.user_dir.is_none());
        assert!(install.version.is_none());
        assert!(!install.has_backup_content());
    }

    #[test]
    fn test_inspect_missing_conf_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("OrcaSlicer");
        fs::create_dir_all(root.join("user")).unwrap();

        let install = Installation::inspect(SlicerKind::OrcaSlicer, &root);
        assert!(install.exists);
        assert!(install.conf_file.is_none());
        assert_eq!(install.user_dir, Some(root.join("user")));
        assert!(!install.is_valid());
        assert!(install.has_backup_content());
    }

    #[test]
    fn test_inspect_flashforge_custom_scripts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("Orca-Flashforge");
        fs::create_dir_all(root.join("user")).unwrap();
        fs::create_dir_all(root.join("custom_scripts")).unwrap();
        fs::write(root.join("Orca-Flashforge.conf"), "{}").unwrap();

        let install = Installation::inspect(SlicerKind::OrcaFlashforge, &root);
        assert!(install.is_valid());
        assert_eq!(install.custom_scripts_dir, Some(root.join("custom_scripts")));
    }
}
