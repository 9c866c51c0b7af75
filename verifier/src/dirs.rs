//! Platform directory lookup behind a mockable trait.

use std::path::PathBuf;

/// Resolves platform-specific directories.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// Directory holding `sixer.toml`, if the platform defines one.
    fn config_dir(&self) -> Option<PathBuf>;
}

/// Directories resolved through `directories-next`.
///
/// # Examples
///
/// ```
/// use sixer::dirs::{BaseDirs, SystemBaseDirs};
///
/// let dirs = SystemBaseDirs;
/// if let Some(dir) = dirs.config_dir() {
///     println!("config lives in {}", dir.display());
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn config_dir(&self) -> Option<PathBuf> {
        directories_next::ProjectDirs::from("org", "apache", "sixer")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }
}
