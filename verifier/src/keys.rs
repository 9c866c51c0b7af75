//! Announcer public-key resolution.
//!
//! The announcer's armored public key is cached in the working directory
//! under a fixed name. A cached key is trusted only when it holds exactly one
//! key whose primary identity starts with the announcer string; otherwise it
//! is discarded and exported again through a [`KeyExporter`].

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use std::fs::File;
use std::io;

use crate::artefact::signature::read_public_keys;
use crate::exec::{CommandExecutor, ExecError};

/// Filename of the cached announcer key.
pub const KEY_FILENAME: &str = ".key";

/// Errors arising while resolving the announcer key.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// No announcer identity was configured.
    #[error("announcer is required for key resolution")]
    MissingAnnouncer,

    /// The cached keyring does not hold exactly one key.
    #[error("cached keyring must hold exactly one key, found {count}")]
    InvalidKeyRing {
        /// The number of keys found.
        count: usize,
    },

    /// The cached keyring could not be parsed.
    #[error("cached keyring is unreadable: {reason}")]
    UnreadableKeyRing {
        /// The parser's description of the problem.
        reason: String,
    },

    /// The cached key carries no user identity.
    #[error("cached key has no primary identity")]
    NoPrimaryIdentity,

    /// The export command failed or produced no key.
    #[error("failed to export key for {announcer}: {message}")]
    ExportFailure {
        /// The announcer whose key was requested.
        announcer: String,
        /// Details from the exporter.
        message: String,
    },

    /// The key file could not be opened or removed.
    #[error("key file I/O error for {path}")]
    Io {
        /// The key file involved.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Produces an armored public key for an announcer at a given path.
#[cfg_attr(test, mockall::automock)]
pub trait KeyExporter {
    /// Write `announcer`'s armored public key to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::ExportFailure`] if the key cannot be exported.
    fn export(&self, announcer: &str, dest: &Utf8Path) -> Result<(), KeyError>;
}

/// Exports keys by invoking a GnuPG-compatible program.
#[derive(Debug, Clone)]
pub struct GpgKeyExporter<E> {
    program: String,
    executor: E,
}

impl<E: CommandExecutor> GpgKeyExporter<E> {
    /// Create an exporter running `program` through `executor`.
    #[must_use]
    pub fn new(program: impl Into<String>, executor: E) -> Self {
        Self {
            program: program.into(),
            executor,
        }
    }
}

impl<E: CommandExecutor> KeyExporter for GpgKeyExporter<E> {
    fn export(&self, announcer: &str, dest: &Utf8Path) -> Result<(), KeyError> {
        let failure = |message: String| KeyError::ExportFailure {
            announcer: announcer.to_owned(),
            message,
        };

        let args = [
            "--batch",
            "--yes",
            "--armor",
            "--output",
            dest.as_str(),
            "--export",
            announcer,
        ];
        debug!("running {} {}", self.program, args.join(" "));
        let output = self
            .executor
            .run(&self.program, &args)
            .map_err(|e: ExecError| failure(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Resolves the announcer's key file in a cache directory.
pub struct KeyManager<'a> {
    dir: &'a Utf8Path,
    exporter: &'a dyn KeyExporter,
    force: bool,
}

impl<'a> KeyManager<'a> {
    /// Create a manager caching the key in `dir`.
    #[must_use]
    pub fn new(dir: &'a Utf8Path, exporter: &'a dyn KeyExporter, force: bool) -> Self {
        Self {
            dir,
            exporter,
            force,
        }
    }

    /// Return the path of the cached key file.
    #[must_use]
    pub fn key_path(&self) -> Utf8PathBuf {
        self.dir.join(KEY_FILENAME)
    }

    /// Return an open handle to a key file trusted for `announcer`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::MissingAnnouncer`] for a blank announcer,
    /// [`KeyError::InvalidKeyRing`], [`KeyError::UnreadableKeyRing`], or
    /// [`KeyError::NoPrimaryIdentity`] for a malformed cached key, and
    /// [`KeyError::ExportFailure`] if a fresh export fails.
    pub fn resolve(&self, announcer: &str) -> Result<File, KeyError> {
        if announcer.trim().is_empty() {
            return Err(KeyError::MissingAnnouncer);
        }
        let path = self.key_path();

        if self.force {
            remove_key(&path)?;
            return self.export(announcer, &path);
        }

        let cached = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no cached key at {path}");
                return self.export(announcer, &path);
            }
            Err(source) => return Err(KeyError::Io { path, source }),
        };

        let identity = primary_identity(cached)?;
        if identity.starts_with(announcer) {
            info!("cached key {identity} matches announcer {announcer}");
            return open_key(&path);
        }

        warn!("cached key {identity} does not match announcer {announcer}, exporting again");
        remove_key(&path)?;
        self.export(announcer, &path)
    }

    fn export(&self, announcer: &str, path: &Utf8Path) -> Result<File, KeyError> {
        std::fs::create_dir_all(self.dir).map_err(|source| KeyError::Io {
            path: self.dir.to_owned(),
            source,
        })?;
        self.exporter.export(announcer, path)?;

        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > 0 => {}
            _ => {
                return Err(KeyError::ExportFailure {
                    announcer: announcer.to_owned(),
                    message: format!("no key written to {path}"),
                });
            }
        }
        info!("exported key for {announcer} to {path}");
        open_key(path)
    }
}

/// Return the primary identity of the single key in an armored keyring.
///
/// The user id flagged primary wins; otherwise the first user id is used.
///
/// # Errors
///
/// Returns [`KeyError::UnreadableKeyRing`] if parsing fails,
/// [`KeyError::InvalidKeyRing`] unless exactly one key is present, and
/// [`KeyError::NoPrimaryIdentity`] if the key has no user id.
pub fn primary_identity(armored: Vec<u8>) -> Result<String, KeyError> {
    let keys = read_public_keys(armored).map_err(|e| KeyError::UnreadableKeyRing {
        reason: e.to_string(),
    })?;
    let [key] = <[_; 1]>::try_from(keys)
        .map_err(|keys| KeyError::InvalidKeyRing { count: keys.len() })?;

    let users = &key.details.users;
    users
        .iter()
        .find(|user| user.is_primary())
        .or_else(|| users.first())
        .map(|user| user.id.id().to_string())
        .ok_or(KeyError::NoPrimaryIdentity)
}

fn open_key(path: &Utf8Path) -> Result<File, KeyError> {
    File::open(path).map_err(|source| KeyError::Io {
        path: path.to_owned(),
        source,
    })
}

fn remove_key(path: &Utf8Path) -> Result<(), KeyError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(KeyError::Io {
            path: path.to_owned(),
            source,
        }),
    }
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
