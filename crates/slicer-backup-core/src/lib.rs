// Core functionality
pub mod core;

// Backup manifest data model
pub mod backup;

// Re-export commonly used types
pub use backup::manifest::{BackupInfo, FileEntry, Manifest, MANIFEST_FILE_NAME, MANIFEST_VERSION};
pub use core::{format_error_with_help, BackupError, BackupResult, ErrorHelp};
