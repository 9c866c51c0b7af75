//! Top-level legal-file inspection for gzip-compressed tar archives.
//!
//! Apache source releases must ship `LICENSE` and `NOTICE` at the archive
//! root. Only regular-file entries whose path is exactly the bare name or
//! the name prefixed by `./` count; nested copies and directories do not.

use flate2::read::GzDecoder;
use serde::Serialize;
use std::io::Read;

const LICENSE: &[u8] = b"LICENSE";
const NOTICE: &[u8] = b"NOTICE";

/// Errors arising while reading an archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The gzip stream or tar structure could not be read.
    #[error("failed to read source archive: {0}")]
    Read(#[from] std::io::Error),
}

/// Presence of the required top-level legal files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LegalFiles {
    /// A top-level `LICENSE` regular file exists.
    pub license: bool,
    /// A top-level `NOTICE` regular file exists.
    pub notice: bool,
}

impl LegalFiles {
    /// Return whether both files were found.
    #[must_use]
    pub fn is_complete(self) -> bool {
        self.license && self.notice
    }
}

/// Scan a `.tgz` stream for top-level `LICENSE` and `NOTICE` files.
///
/// # Errors
///
/// Returns [`ArchiveError::Read`] if decompression or tar parsing fails.
///
/// # Examples
///
/// ```
/// use sixer::artefact::archive::check_legal_files;
///
/// let bytes = std::fs::read("tests/fixtures/apache-demo-1.0.0-src.tgz")?;
/// let found = check_legal_files(bytes.as_slice())?;
/// assert!(found.license && found.notice);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn check_legal_files(archive: impl Read) -> Result<LegalFiles, ArchiveError> {
    let mut tar = tar::Archive::new(GzDecoder::new(archive));
    let mut found = LegalFiles::default();

    for entry in tar.entries()? {
        let entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path_bytes();
        if is_top_level(&path, LICENSE) {
            found.license = true;
        } else if is_top_level(&path, NOTICE) {
            found.notice = true;
        }
        if found.is_complete() {
            break;
        }
    }

    Ok(found)
}

fn is_top_level(path: &[u8], name: &[u8]) -> bool {
    path == name || path.strip_prefix(b"./") == Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use rstest::rstest;

    const FIXTURE: &[u8] = include_bytes!("../../tests/fixtures/apache-demo-1.0.0-src.tgz");

    fn tgz(entries: &[(&str, tar::EntryType)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, kind) in entries {
            let data: &[u8] = if kind.is_file() { b"text" } else { b"" };
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(*kind);
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, path, data)
                .expect("append entry");
        }
        builder
            .into_inner()
            .and_then(GzEncoder::finish)
            .expect("finish archive")
    }

    #[test]
    fn fixture_archive_has_both_files() {
        let found = check_legal_files(FIXTURE).expect("readable");
        assert_eq!(
            found,
            LegalFiles {
                license: true,
                notice: true
            }
        );
    }

    #[rstest]
    #[case::license_only(&[("LICENSE", tar::EntryType::Regular)], true, false)]
    #[case::notice_only(&[("NOTICE", tar::EntryType::Regular)], false, true)]
    #[case::nested_only(
        &[("docs/LICENSE", tar::EntryType::Regular), ("sub/NOTICE", tar::EntryType::Regular)],
        false,
        false
    )]
    #[case::directory_named_license(&[("LICENSE", tar::EntryType::Directory)], false, false)]
    #[case::other_case(&[("license", tar::EntryType::Regular)], false, false)]
    fn classifies_entries(
        #[case] entries: &[(&str, tar::EntryType)],
        #[case] license: bool,
        #[case] notice: bool,
    ) {
        let bytes = tgz(entries);
        let found = check_legal_files(bytes.as_slice()).expect("readable");
        assert_eq!(found, LegalFiles { license, notice });
    }

    #[rstest]
    #[case::bare(b"LICENSE", true)]
    #[case::dot_slash(b"./LICENSE", true)]
    #[case::nested(b"a/LICENSE", false)]
    #[case::suffix(b"LICENSE.txt", false)]
    #[case::double_dot_slash(b"././LICENSE", false)]
    fn top_level_match(#[case] path: &[u8], #[case] expected: bool) {
        assert_eq!(is_top_level(path, LICENSE), expected);
    }

    #[test]
    fn non_gzip_input_is_a_read_error() {
        let result = check_legal_files(b"definitely not gzip".as_slice());
        assert!(matches!(result, Err(ArchiveError::Read(_))));
    }
}
