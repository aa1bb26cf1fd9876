use crate::core::BackupError;

/// Provides helpful suggestions for common errors
pub trait ErrorHelp {
    fn help(&self) -> Option<String>;
}

impl ErrorHelp for BackupError {
    fn help(&self) -> Option<String> {
        match self {
            BackupError::InvalidInstallation(_) => Some(
                "💡 Suggestion: Start the slicer once so it creates its configuration, or run 'slicer-backup list' to see what was detected"
                    .to_string(),
            ),
            BackupError::Verification(msg) => {
                if msg.to_lowercase().contains("manifest") {
                    Some(
                        "💡 Suggestion: Make sure the path points at a backup created by slicer-backup (it must contain backup_manifest.json)"
                            .to_string(),
                    )
                } else if msg.contains("Checksum mismatch") || msg.contains("Size mismatch") {
                    Some(
                        "💡 Suggestion: The backup was modified after it was created. Use another backup or create a new one"
                            .to_string(),
                    )
                } else if msg.contains("corrupted") {
                    Some(
                        "💡 Suggestion: The archive is damaged or truncated. Copy it again from its original location"
                            .to_string(),
                    )
                } else {
                    None
                }
            }
            BackupError::TargetNotFound(_) => Some(
                "💡 Suggestion: Install and launch the target slicer once, or set its path under 'slicer_paths' in the config file"
                    .to_string(),
            ),
            BackupError::SafetyBackup(_) => Some(
                "💡 Suggestion: Free up disk space next to the slicer configuration, or re-run with --no-safety-backup if you accept losing the current configuration"
                    .to_string(),
            ),
            BackupError::UnknownSlicer(_) => Some(
                "💡 Suggestion: Supported slicers are 'orcaslicer' and 'orca-flashforge'".to_string(),
            ),
            BackupError::Path(msg) => {
                if msg.contains("Could not determine") {
                    Some(
                        "💡 Suggestion: Check your system environment variables (HOME, APPDATA, etc.)"
                            .to_string(),
                    )
                } else {
                    None
                }
            }
            BackupError::Yaml(e) => Some(format!(
                "💡 Suggestion: Check your config file syntax. Common issues:\n  - Missing colons after keys\n  - Incorrect indentation\n  - Unclosed quotes\n\nError details: {}",
                e
            )),
            BackupError::Io(e) => {
                if e.kind() == std::io::ErrorKind::PermissionDenied {
                    Some(
                        "💡 Suggestion: Check file permissions, and close the slicer before restoring"
                            .to_string(),
                    )
                } else if e.kind() == std::io::ErrorKind::NotFound {
                    Some(
                        "💡 Suggestion: The file or directory may not exist. Check the path and try again"
                            .to_string(),
                    )
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Format an error with helpful suggestions
pub fn format_error_with_help(error: &BackupError) -> String {
    let mut output = format!("❌ Error: {}", error);

    if let Some(help) = error.help() {
        output.push_str("\n\n");
        output.push_str(&help);
    }

    output
}
