//! Idempotent artefact retrieval with a local file cache.
//!
//! Each artefact kind is cached under its published filename. Without
//! force-refresh an existing file is reused verbatim and no request is made;
//! with force-refresh the cached file is evicted first and always
//! re-downloaded. Downloads are written atomically through a temporary file
//! in the cache directory.

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

use crate::http::{HttpClient, TransportError};

const HTTP_OK: u16 = 200;

/// The files that make up a published release candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// The `-src.tgz` source archive.
    SourceArchive,
    /// The `.sha512` checksum file.
    Checksum,
    /// The `.asc` detached signature.
    Signature,
}

impl ArtifactKind {
    /// All kinds in fetch order.
    pub const ALL: [Self; 3] = [Self::SourceArchive, Self::Checksum, Self::Signature];
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceArchive => write!(f, "src tgz"),
            Self::Checksum => write!(f, "src tgz sha512"),
            Self::Signature => write!(f, "src tgz asc"),
        }
    }
}

/// Whether a cached copy of a file is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// A file with the expected name exists in the cache.
    Cached,
    /// No cached file exists.
    Missing,
}

/// How a fetch was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The cached file was reused without a request.
    Reused,
    /// The file was downloaded and stored.
    Downloaded {
        /// Number of bytes written.
        bytes: usize,
    },
}

/// Errors arising while fetching or caching an artefact.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request failed below the HTTP layer.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status other than `200`.
    #[error("non-expected response status {status} from {url}")]
    UnexpectedStatus {
        /// The requested URL.
        url: String,
        /// The returned status.
        status: u16,
    },

    /// The server answered `200` with an empty body.
    #[error("response body size zero from {url}")]
    EmptyBody {
        /// The requested URL.
        url: String,
    },

    /// A cache file could not be inspected, removed, or written.
    #[error("cache I/O error for {path}")]
    Cache {
        /// The cache file involved.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// A directory holding at most one cached copy of each artefact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCache {
    dir: Utf8PathBuf,
}

impl ArtifactCache {
    /// Use `dir` as the cache directory. It is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Return the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Return the cache path for `filename`.
    #[must_use]
    pub fn path(&self, filename: &str) -> Utf8PathBuf {
        self.dir.join(filename)
    }

    /// Classify the cached copy of `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Cache`] for any metadata error other than
    /// not-found.
    pub fn state(&self, filename: &str) -> Result<CacheState, FetchError> {
        let path = self.path(filename);
        match std::fs::metadata(&path) {
            Ok(_) => Ok(CacheState::Cached),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(CacheState::Missing),
            Err(source) => Err(FetchError::Cache { path, source }),
        }
    }

    /// Remove the cached copy of `filename`; an absent file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Cache`] for any removal error other than
    /// not-found.
    pub fn evict(&self, filename: &str) -> Result<(), FetchError> {
        let path = self.path(filename);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(FetchError::Cache { path, source }),
        }
    }

    /// Atomically replace the cached copy of `filename` with `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Cache`] if the directory, temporary file, or
    /// final rename fails.
    pub fn store(&self, filename: &str, bytes: &[u8]) -> Result<(), FetchError> {
        let path = self.path(filename);
        let cache_err = |source: io::Error| FetchError::Cache {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(cache_err)?;
        let mut staged = tempfile::NamedTempFile::new_in(&self.dir).map_err(cache_err)?;
        staged.write_all(bytes).map_err(cache_err)?;
        staged.flush().map_err(cache_err)?;
        staged.persist(&path).map_err(|e| cache_err(e.error))?;
        Ok(())
    }

    /// Read the cached copy of `filename`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from reading the file.
    pub fn read(&self, filename: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.path(filename))
    }

    /// Remove every file in `filenames`, ignoring those already absent.
    ///
    /// # Errors
    ///
    /// Returns the first removal error other than not-found.
    pub fn clean<S: AsRef<str>>(&self, filenames: &[S]) -> Result<(), FetchError> {
        for filename in filenames {
            self.evict(filename.as_ref())?;
            debug!("removed cached {}", self.path(filename.as_ref()));
        }
        Ok(())
    }
}

/// Retrieves artefacts into an [`ArtifactCache`].
pub struct Fetcher<'a> {
    client: &'a dyn HttpClient,
    cache: &'a ArtifactCache,
    force: bool,
}

impl<'a> Fetcher<'a> {
    /// Create a fetcher. With `force`, cached files are always replaced.
    #[must_use]
    pub fn new(client: &'a dyn HttpClient, cache: &'a ArtifactCache, force: bool) -> Self {
        Self {
            client,
            cache,
            force,
        }
    }

    /// Ensure `filename` is cached, downloading it from `url` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the cache cannot be inspected or written,
    /// the request fails, the status is not `200`, or the body is empty.
    pub fn fetch(&self, url: &str, filename: &str) -> Result<FetchOutcome, FetchError> {
        if self.force {
            self.cache.evict(filename)?;
        } else if self.cache.state(filename)? == CacheState::Cached {
            debug!("reusing cached {}", self.cache.path(filename));
            return Ok(FetchOutcome::Reused);
        }

        let bytes = self.download(url)?;
        self.cache.store(filename, &bytes)?;
        info!("downloaded {url} ({} bytes)", bytes.len());
        Ok(FetchOutcome::Downloaded { bytes: bytes.len() })
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url)?;
        if response.status != HTTP_OK {
            return Err(FetchError::UnexpectedStatus {
                url: url.to_owned(),
                status: response.status,
            });
        }
        if response.body.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_owned(),
            });
        }
        Ok(response.body)
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
