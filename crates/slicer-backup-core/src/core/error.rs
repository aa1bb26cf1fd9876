use thiserror::Error;

pub type BackupResult<T> = Result<T, BackupError>;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("WalkDir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Invalid slicer installation: {0}")]
    InvalidInstallation(String),

    #[error("Backup verification failed: {0}")]
    Verification(String),

    #[error("Restore target not found: {0}")]
    TargetNotFound(String),

    #[error("Safety backup failed: {0}")]
    SafetyBackup(String),

    #[error("Unknown slicer: {0}")]
    UnknownSlicer(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}
