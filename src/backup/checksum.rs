use crate::core::{BackupError, BackupResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Read buffer size; memory use stays at this regardless of file size.
const CHUNK_SIZE: usize = 64 * 1024;

/// Streamed digest of some content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digested {
    /// Number of bytes read
    pub size: u64,
    /// Lower-case hex SHA-256
    pub sha256: String,
}

/// Hash everything `reader` yields, chunk by chunk
pub fn sha256_reader<R: Read>(mut reader: R) -> BackupResult<Digested> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut size = 0u64;

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        size += read as u64;
    }

    Ok(Digested {
        size,
        sha256: hex::encode(hasher.finalize()),
    })
}

/// Calculate the SHA-256 of a file as 64 lower-case hex characters
pub fn sha256_file(path: &Path) -> BackupResult<String> {
    Ok(digest_file(path)?.sha256)
}

/// Size and SHA-256 of a file, read in bounded chunks
pub fn digest_file(path: &Path) -> BackupResult<Digested> {
    let file = File::open(path).map_err(|e| {
        BackupError::Path(format!("Failed to open {}: {}", path.display(), e))
    })?;
    sha256_reader(BufReader::new(file))
}

/// Compare two hex digests ignoring case
pub fn checksums_match(expected: &str, actual: &str) -> bool {
    expected.eq_ignore_ascii_case(actual)
}
