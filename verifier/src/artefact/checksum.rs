//! SHA-512 checksum verification for source archives.
//!
//! The published `.sha512` file holds one line of the form
//! `<hex-digest>  <filename>`. The digest field is compared byte-for-byte
//! against the lowercase hex SHA-512 of the archive; no case or whitespace
//! normalisation is applied to it.

use camino::Utf8Path;
use sha2::{Digest, Sha512};

/// The literal separator between digest and filename.
const FIELD_SEPARATOR: &str = "  ";

/// Errors arising from checksum verification.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    /// The checksum file is not `<hex-digest>  <filename>`.
    #[error("invalid checksum body: {reason}")]
    Malformed {
        /// Description of the format violation.
        reason: String,
    },

    /// The archive named in the checksum file could not be read.
    #[error("failed to read {filename} named in checksum file")]
    ReadArchive {
        /// The filename taken from the checksum file.
        filename: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A parsed checksum line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumLine<'a> {
    /// The digest field, untouched.
    pub digest: &'a str,
    /// The filename field, trimmed.
    pub filename: &'a str,
}

/// Split a checksum file into its digest and filename fields.
///
/// # Errors
///
/// Returns [`ChecksumError::Malformed`] if the body is not UTF-8 or the
/// two-space split does not yield exactly two fields.
///
/// # Examples
///
/// ```
/// use sixer::artefact::checksum::parse_checksum;
///
/// let line = parse_checksum(b"abc123  apache-apisix-2.15.0-src.tgz\n")?;
/// assert_eq!(line.digest, "abc123");
/// assert_eq!(line.filename, "apache-apisix-2.15.0-src.tgz");
/// # Ok::<(), sixer::artefact::checksum::ChecksumError>(())
/// ```
pub fn parse_checksum(body: &[u8]) -> Result<ChecksumLine<'_>, ChecksumError> {
    let text = std::str::from_utf8(body).map_err(|e| ChecksumError::Malformed {
        reason: format!("not UTF-8: {e}"),
    })?;
    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
    match fields.as_slice() {
        &[digest, filename] => Ok(ChecksumLine {
            digest,
            filename: filename.trim(),
        }),
        other => Err(ChecksumError::Malformed {
            reason: format!(
                "expected \"<digest>{FIELD_SEPARATOR}<filename>\", found {} field(s)",
                other.len()
            ),
        }),
    }
}

/// Lowercase hex SHA-512 of `bytes`.
#[must_use]
pub fn sha512_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha512::digest(bytes))
}

/// Verify `archive` against the checksum file `body`.
///
/// When `archive` is `None` the archive is read from the filename recorded
/// in the checksum file, resolved against `base_dir`.
///
/// Returns `Ok(true)` iff the digests are identical.
///
/// # Errors
///
/// Returns [`ChecksumError::Malformed`] for a badly formed checksum file
/// and [`ChecksumError::ReadArchive`] if the fallback read fails.
pub fn verify_checksum(
    body: &[u8],
    archive: Option<&[u8]>,
    base_dir: &Utf8Path,
) -> Result<bool, ChecksumError> {
    let line = parse_checksum(body)?;
    let actual = match archive {
        Some(bytes) => sha512_hex(bytes),
        None => {
            let path = base_dir.join(line.filename);
            let bytes = std::fs::read(&path).map_err(|source| ChecksumError::ReadArchive {
                filename: line.filename.to_owned(),
                source,
            })?;
            sha512_hex(&bytes)
        }
    };
    Ok(line.digest.as_bytes() == actual.as_bytes())
}
