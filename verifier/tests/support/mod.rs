//! Test support for sixer behavioural tests.
//!
//! Provides the fixture artefacts, a key exporter that copies a fixture key
//! instead of running gpg, and a stub distribution area serving a candidate.

use camino::{Utf8Path, Utf8PathBuf};
use sixer::config::Settings;
use sixer::keys::{KeyError, KeyExporter};
use sixer::test_utils::StubHttpClient;
use std::cell::Cell;
use tempfile::TempDir;

/// A well-formed source archive holding `LICENSE` and `NOTICE`.
pub const ARCHIVE: &[u8] = include_bytes!("../fixtures/apache-demo-1.0.0-src.tgz");
/// The archive's published SHA-512 line.
pub const CHECKSUM: &[u8] = include_bytes!("../fixtures/apache-demo-1.0.0-src.tgz.sha512");
/// The announcer's detached signature over the archive.
pub const SIGNATURE: &[u8] = include_bytes!("../fixtures/apache-demo-1.0.0-src.tgz.asc");
/// A detached signature over the archive from an unrelated key.
pub const MALLORY_SIGNATURE: &[u8] =
    include_bytes!("../fixtures/apache-demo-1.0.0-src.tgz.mallory.asc");
/// The announcer's armoured public key.
pub const ANNOUNCER_KEY: &[u8] = include_bytes!("../fixtures/announcer.asc");

/// Identity the fixture key was generated for.
pub const ANNOUNCER: &str = "Release Announcer";

const DIST_BASE: &str = "https://dist.test/apisix/";
const SOURCE_HOST_BASE: &str = "https://git.test/apache";
const COMMIT: &str = "abc123";
const VERSION: &str = "1.0.0";

/// Files the gateway candidate publishes, keyed by URL.
pub struct Published {
    /// Package directory listing.
    pub directory: String,
    /// Source archive.
    pub archive: String,
    /// SHA-512 checksum.
    pub checksum: String,
    /// Detached signature.
    pub signature: String,
    /// Changelog heading.
    pub changelog: String,
    /// Release commit.
    pub commit: String,
}

/// URLs the gateway candidate `1.0.0` is published under.
pub fn published_urls() -> Published {
    let dir = format!("{DIST_BASE}{VERSION}");
    let archive = format!("{dir}/apache-apisix-{VERSION}-src.tgz");
    Published {
        checksum: format!("{archive}.sha512"),
        signature: format!("{archive}.asc"),
        archive,
        directory: dir,
        changelog: format!("{SOURCE_HOST_BASE}/apisix/blob/release/1.0/CHANGELOG.md#100"),
        commit: format!("{SOURCE_HOST_BASE}/apisix/commit/{COMMIT}"),
    }
}

/// A stub distribution area serving every published file.
pub fn distribution(archive: &[u8], signature: &[u8]) -> StubHttpClient {
    let urls = published_urls();
    let mut client = StubHttpClient::new();
    client.serve(urls.directory, "index");
    client.serve(urls.archive, archive);
    client.serve(urls.checksum, CHECKSUM);
    client.serve(urls.signature, signature);
    client.serve(urls.changelog, "changelog");
    client.serve(urls.commit, "commit");
    client
}

/// A cache directory and settings pointing the gateway candidate at the
/// stub distribution area.
pub fn settings_in_temp_dir() -> (TempDir, Settings) {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache_dir = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 temp dir");
    let settings = Settings {
        candidate: VERSION.to_owned(),
        announcer: ANNOUNCER.to_owned(),
        commit: COMMIT.to_owned(),
        cache_dir,
        dist_base_url: DIST_BASE.to_owned(),
        source_host_base_url: SOURCE_HOST_BASE.to_owned(),
        ..Settings::default()
    };
    (dir, settings)
}

/// Writes [`ANNOUNCER_KEY`] in place of a gpg export and counts exports.
#[derive(Default)]
pub struct FixtureKeyExporter {
    exports: Cell<usize>,
}

impl FixtureKeyExporter {
    /// Number of exports performed.
    pub fn exports(&self) -> usize {
        self.exports.get()
    }
}

impl KeyExporter for FixtureKeyExporter {
    fn export(&self, _announcer: &str, dest: &Utf8Path) -> Result<(), KeyError> {
        self.exports.set(self.exports.get() + 1);
        std::fs::write(dest, ANNOUNCER_KEY).map_err(|source| KeyError::Io {
            path: dest.to_owned(),
            source,
        })
    }
}
