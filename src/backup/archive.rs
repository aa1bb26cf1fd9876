use crate::backup::checksum::{sha256_reader, Digested};
use crate::core::path::{ensure_dir, is_safe_relative, join_posix, to_posix};
use crate::core::{BackupError, BackupResult};
use crate::{Manifest, MANIFEST_FILE_NAME};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Extension used for compressed backups
pub const ARCHIVE_EXTENSION: &str = "zip";

/// A finished backup, either a plain directory or a zip container
pub enum BackupArchive {
    Directory(PathBuf),
    Zip {
        path: PathBuf,
        archive: ZipArchive<File>,
    },
}

impl BackupArchive {
    /// Open a backup. Directories are read in place; any regular file is
    /// treated as a zip container and must at least have a readable
    /// central directory.
    pub fn open(path: &Path) -> BackupResult<Self> {
        if path.is_dir() {
            return Ok(BackupArchive::Directory(path.to_path_buf()));
        }

        if !path.is_file() {
            return Err(BackupError::Verification(format!(
                "Backup not found: {}",
                path.display()
            )));
        }

        let file = File::open(path)?;
        let archive = ZipArchive::new(file).map_err(|e| {
            BackupError::Verification(format!(
                "Archive is corrupted: {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(BackupArchive::Zip {
            path: path.to_path_buf(),
            archive,
        })
    }

    pub fn path(&self) -> &Path {
        match self {
            BackupArchive::Directory(path) => path,
            BackupArchive::Zip { path, .. } => path,
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, BackupArchive::Zip { .. })
    }

    /// Read every zip member to the end so CRC and truncation errors surface.
    /// Directories have no container to check.
    pub fn check_container(&mut self) -> BackupResult<()> {
        let BackupArchive::Zip { path, archive } = self else {
            return Ok(());
        };

        for index in 0..archive.len() {
            let corrupted = |e: &dyn std::fmt::Display| {
                BackupError::Verification(format!(
                    "Archive is corrupted: {}: {}",
                    path.display(),
                    e
                ))
            };
            let mut member = archive.by_index(index).map_err(|e| corrupted(&e))?;
            io::copy(&mut member, &mut io::sink()).map_err(|e| corrupted(&e))?;
        }

        Ok(())
    }

    /// Load the manifest sidecar; `None` when it is absent or does not parse
    pub fn read_manifest(&mut self) -> Option<Manifest> {
        let content = match self {
            BackupArchive::Directory(root) => {
                fs::read_to_string(root.join(MANIFEST_FILE_NAME)).ok()?
            }
            BackupArchive::Zip { archive, .. } => {
                let mut member = archive.by_name(MANIFEST_FILE_NAME).ok()?;
                let mut content = String::new();
                member.read_to_string(&mut content).ok()?;
                content
            }
        };

        match Manifest::from_json(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::debug!("Unparsable manifest in {}: {}", self.path().display(), e);
                None
            }
        }
    }

    /// Stream a member through the hasher; `None` when the member is absent
    pub fn digest_member(&mut self, relative: &str) -> BackupResult<Option<Digested>> {
        if !is_safe_relative(relative) {
            return Ok(None);
        }

        match self {
            BackupArchive::Directory(root) => {
                let member = join_posix(root, relative);
                if !member.is_file() {
                    return Ok(None);
                }
                let file = File::open(&member)?;
                sha256_reader(BufReader::new(file)).map(Some)
            }
            BackupArchive::Zip { archive, .. } => match archive.by_name(relative) {
                Ok(member) => sha256_reader(member).map(Some),
                Err(ZipError::FileNotFound) => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Copy a member to `dest`, creating parents and overwriting any existing
    /// file. Returns `false` when the member is absent.
    pub fn copy_member(&mut self, relative: &str, dest: &Path) -> BackupResult<bool> {
        if !is_safe_relative(relative) {
            return Ok(false);
        }

        match self {
            BackupArchive::Directory(root) => {
                let member = join_posix(root, relative);
                if !member.is_file() {
                    return Ok(false);
                }
                create_parent(dest)?;
                fs::copy(&member, dest)?;
                Ok(true)
            }
            BackupArchive::Zip { archive, .. } => {
                let mut member = match archive.by_name(relative) {
                    Ok(member) => member,
                    Err(ZipError::FileNotFound) => return Ok(false),
                    Err(e) => return Err(e.into()),
                };
                create_parent(dest)?;
                let mut out = File::create(dest)?;
                io::copy(&mut member, &mut out)?;
                Ok(true)
            }
        }
    }

    /// Bytes the backup occupies on disk
    pub fn disk_size(&self) -> BackupResult<u64> {
        match self {
            BackupArchive::Directory(root) => {
                let mut total = 0u64;
                for entry in WalkDir::new(root) {
                    let entry = entry?;
                    if entry.file_type().is_file() {
                        total += entry.metadata()?.len();
                    }
                }
                Ok(total)
            }
            BackupArchive::Zip { path, .. } => Ok(fs::metadata(path)?.len()),
        }
    }
}

fn create_parent(path: &Path) -> BackupResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Write every regular file under `source_dir` into a deflated zip at
/// `output`. Members are `/`-separated paths relative to `source_dir`,
/// added in sorted walk order; directories get no member of their own.
pub fn compress_directory(source_dir: &Path, output: &Path) -> BackupResult<PathBuf> {
    if output.starts_with(source_dir) {
        return Err(BackupError::Archive(format!(
            "Archive {} would be written inside {}",
            output.display(),
            source_dir.display()
        )));
    }
    create_parent(output)?;

    let file = File::create(output)?;
    let mut zip = ZipWriter::new(file);

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(source_dir).map_err(|e| {
            BackupError::Path(format!("Failed to get relative path: {}", e))
        })?;
        let name = to_posix(relative)?;
        let size = entry.metadata()?.len();

        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(size >= u32::MAX as u64);
        zip.start_file(name.as_str(), options)?;

        let mut input = BufReader::new(File::open(entry.path())?);
        io::copy(&mut input, &mut zip)?;
        tracing::debug!("Compressed {} ({} bytes)", name, size);
    }

    zip.finish()?;
    Ok(output.to_path_buf())
}
