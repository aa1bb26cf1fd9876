//! slicer-backup
//!
//! Backs up, verifies and restores slicer configuration trees. The shared
//! error type, path helpers and manifest model live in `slicer-backup-core`
//! and are re-exported here.

pub use slicer_backup_core::{
    format_error_with_help, BackupError, BackupInfo, BackupResult, ErrorHelp, FileEntry,
    Manifest, MANIFEST_FILE_NAME, MANIFEST_VERSION,
};

/// Core module re-exported from slicer-backup-core.
pub mod core {
    pub use slicer_backup_core::core::*;

    /// Path helpers re-exported from slicer-backup-core.
    pub mod path {
        pub use slicer_backup_core::core::path::*;
    }
}

/// Configuration management.
pub mod config;

/// Slicer installations and how to find them.
pub mod slicer;

/// Backup, verification and restore.
pub mod backup;
