//! Run configuration.
//!
//! [`Settings`] is built once per invocation from three layers: built-in
//! defaults, an optional `sixer.toml`, and command-line overrides. The file
//! is taken from `--config`, then the `SIXER_CONFIG` environment variable,
//! then the platform configuration directory. An explicitly named file must
//! exist; the platform file is optional.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use std::time::Duration;

use crate::artefact::candidate::DEFAULT_DIST_BASE;
use crate::dirs::BaseDirs;
use crate::source_host::DEFAULT_SOURCE_HOST_BASE;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "SIXER_CONFIG";

/// Configuration filename looked up in the platform config directory.
pub const CONFIG_FILENAME: &str = "sixer.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_GPG_PROGRAM: &str = "gpg";

/// Errors arising while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read config {path}")]
    Read {
        /// The file that was read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML for [`Settings`].
    #[error("invalid config {path}: {source}")]
    Parse {
        /// The file that was parsed.
        path: Utf8PathBuf,
        /// The TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// No release-candidate version was given.
    #[error("please specify release candidate version first")]
    MissingCandidate,

    /// The request timeout is zero.
    #[error("timeout must be at least one second")]
    ZeroTimeout,
}

/// Immutable settings for one verification run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Bound on every request and on the key export, in seconds.
    pub timeout_secs: u64,
    /// Release-candidate version, such as `2.15.0`.
    pub candidate: String,
    /// Identity expected to have signed the archive.
    pub announcer: String,
    /// Release commit on the source host.
    pub commit: String,
    /// Discard cached files before fetching.
    pub force: bool,
    /// Directory holding cached artefacts and the announcer key.
    pub cache_dir: Utf8PathBuf,
    /// Distribution area base URL.
    pub dist_base_url: String,
    /// Organisation base URL on the source host.
    pub source_host_base_url: String,
    /// Program used to export the announcer key.
    pub gpg_program: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            candidate: String::new(),
            announcer: String::new(),
            commit: String::new(),
            force: false,
            cache_dir: Utf8PathBuf::from("."),
            dist_base_url: DEFAULT_DIST_BASE.to_owned(),
            source_host_base_url: DEFAULT_SOURCE_HOST_BASE.to_owned(),
            gpg_program: DEFAULT_GPG_PROGRAM.to_owned(),
        }
    }
}

/// Values given on the command line; `None` leaves the lower layer intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--timeout`.
    pub timeout_secs: Option<u64>,
    /// `--candidate`.
    pub candidate: Option<String>,
    /// `--announcer`.
    pub announcer: Option<String>,
    /// `--commit`.
    pub commit: Option<String>,
    /// `--force`; only ever switches force-refresh on.
    pub force: bool,
    /// `--cache-dir`.
    pub cache_dir: Option<Utf8PathBuf>,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    /// Path to the file.
    pub path: Utf8PathBuf,
    /// Whether a missing file is an error.
    pub required: bool,
}

/// Decide which configuration file to read, if any.
///
/// `explicit` wins over [`CONFIG_ENV`], which wins over the platform
/// directory. Non-UTF-8 platform paths are ignored.
#[must_use]
pub fn locate(explicit: Option<&Utf8Path>, dirs: &dyn BaseDirs) -> Option<ConfigLocation> {
    if let Some(path) = explicit {
        return Some(ConfigLocation {
            path: path.to_owned(),
            required: true,
        });
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
        if let Ok(path) = Utf8PathBuf::from_path_buf(path.into()) {
            return Some(ConfigLocation {
                path,
                required: true,
            });
        }
    }
    let dir = Utf8PathBuf::from_path_buf(dirs.config_dir()?).ok()?;
    Some(ConfigLocation {
        path: dir.join(CONFIG_FILENAME),
        required: false,
    })
}

impl Settings {
    /// Parse settings from TOML text; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for invalid syntax, wrong types, or unknown
    /// keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use sixer::config::Settings;
    ///
    /// let settings = Settings::from_toml("candidate = \"2.15.0\"\ntimeout_secs = 30\n")?;
    /// assert_eq!(settings.candidate, "2.15.0");
    /// assert_eq!(settings.timeout_secs, 30);
    /// assert_eq!(settings.gpg_program, "gpg");
    /// # Ok::<(), toml::de::Error>(())
    /// ```
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read settings from `location`, or return defaults when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when a required file is missing or any
    /// file is unreadable, and [`ConfigError::Parse`] for invalid contents.
    pub fn load(location: Option<&ConfigLocation>) -> Result<Self, ConfigError> {
        let Some(location) = location else {
            return Ok(Self::default());
        };
        let path = &location.path;
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !location.required => {
                debug!("no config at {path}, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.clone(),
                    source,
                });
            }
        };
        debug!("loading config from {path}");
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })
    }

    /// Layer command-line `overrides` on top of these settings.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(candidate) = overrides.candidate {
            self.candidate = candidate;
        }
        if let Some(announcer) = overrides.announcer {
            self.announcer = announcer;
        }
        if let Some(commit) = overrides.commit {
            self.commit = commit;
        }
        if let Some(cache_dir) = overrides.cache_dir {
            self.cache_dir = cache_dir;
        }
        self.force |= overrides.force;
        self
    }

    /// The request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings every run needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCandidate`] for a blank candidate and
    /// [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.candidate.trim().is_empty() {
            return Err(ConfigError::MissingCandidate);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
