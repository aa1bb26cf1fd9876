use slicer_backup::backup::{Verifier, VerifyObserver};
use slicer_backup::core::BackupResult;
use std::path::PathBuf;

/// Prints each verification step
struct ConsoleObserver;

impl VerifyObserver for ConsoleObserver {
    fn progress(&self, message: &str) {
        println!("  ✓ {}", message);
    }
}

pub fn run(backup: PathBuf, verbose: bool) -> BackupResult<()> {
    let verifier = if verbose {
        Verifier::with_observer(Box::new(ConsoleObserver))
    } else {
        Verifier::new()
    };

    println!("Verifying {}...", backup.display());

    match verifier.verify(&backup) {
        Ok(manifest) => {
            println!("✓ Backup is valid");
            println!("  {} file(s) verified", manifest.total_files);
            Ok(())
        }
        Err(e) => {
            println!("❌ Verification failed");
            Err(e)
        }
    }
}
