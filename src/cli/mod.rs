pub mod backup;
pub mod info;
pub mod list;
pub mod restore;
pub mod verify;

use slicer_backup::config::Config;
use slicer_backup::core::BackupResult;
use slicer_backup::slicer::PlatformLocator;

/// Locator for the current user, honouring `slicer_paths` from the config
pub fn locator(config: &Config) -> BackupResult<PlatformLocator> {
    Ok(PlatformLocator::for_current_user()?.with_overrides(config.path_overrides()?))
}
