//! Release-candidate naming policy.
//!
//! Derives the deterministic directory name, filenames, and URLs under which
//! a release candidate is published in the distribution area. Every method
//! is a pure function of the candidate's fields.

use std::fmt;

/// Distribution area for release candidates awaiting a vote.
pub const DEFAULT_DIST_BASE: &str = "https://dist.apache.org/repos/dist/dev/apisix/";

/// Suffix shared by every source archive.
const SOURCE_ARCHIVE_SUFFIX: &str = "-src.tgz";

/// Extension of the detached armored signature.
const SIGNATURE_EXTENSION: &str = ".asc";

/// Extension of the SHA-512 checksum file.
const CHECKSUM_EXTENSION: &str = ".sha512";

/// Identity of a release-candidate artefact.
///
/// # Examples
///
/// ```
/// use sixer::artefact::candidate::Candidate;
///
/// let candidate = Candidate::new("apisix-dashboard", "2.11.0")
///     .with_sub_project(true)
///     .with_prefix("apache");
///
/// assert_eq!(candidate.package_directory_name(), "apisix-dashboard-2.11.0");
/// assert_eq!(
///     candidate.source_archive_filename(),
///     "apache-apisix-dashboard-2.11.0-src.tgz"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    package: String,
    version: String,
    sub_project: bool,
    prefix: Option<String>,
    dist_base: String,
}

impl Candidate {
    /// Create a top-level candidate without a distribution prefix.
    ///
    /// An empty version is accepted here; callers validate it before any
    /// derived name is used.
    #[must_use]
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
            sub_project: false,
            prefix: None,
            dist_base: DEFAULT_DIST_BASE.to_owned(),
        }
    }

    /// Mark the candidate as a sub-project, whose directory embeds the
    /// package name.
    #[must_use]
    pub fn with_sub_project(mut self, sub_project: bool) -> Self {
        self.sub_project = sub_project;
        self
    }

    /// Set the organisation prefix used in source-archive filenames.
    ///
    /// A blank prefix is treated as absent.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.trim().is_empty()).then_some(prefix);
        self
    }

    /// Override the distribution base URL. A trailing `/` is appended when
    /// missing.
    #[must_use]
    pub fn with_dist_base(mut self, base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.dist_base = base;
        self
    }

    /// Return the package name.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Return the release-candidate version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return whether this candidate is a sub-project.
    #[must_use]
    pub fn is_sub_project(&self) -> bool {
        self.sub_project
    }

    /// Return the distribution prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Return the distribution base URL, always ending in `/`.
    #[must_use]
    pub fn dist_base(&self) -> &str {
        &self.dist_base
    }

    /// `<pkg>-<version>` for sub-projects, `<version>` otherwise.
    #[must_use]
    pub fn package_directory_name(&self) -> String {
        if self.sub_project {
            format!("{}-{}", self.package, self.version)
        } else {
            self.version.clone()
        }
    }

    /// URL of the package directory in the distribution area.
    #[must_use]
    pub fn package_directory_url(&self) -> String {
        format!("{}{}", self.dist_base, self.package_directory_name())
    }

    /// Filename stem shared by the archive, signature, and checksum.
    fn source_stem(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}-{}-{}", self.package, self.version),
            None => self.package_directory_name(),
        }
    }

    /// Filename of the source archive.
    #[must_use]
    pub fn source_archive_filename(&self) -> String {
        format!("{}{SOURCE_ARCHIVE_SUFFIX}", self.source_stem())
    }

    /// URL of the source archive.
    #[must_use]
    pub fn source_archive_url(&self) -> String {
        self.file_url(&self.source_archive_filename())
    }

    /// Filename of the detached signature.
    #[must_use]
    pub fn signature_filename(&self) -> String {
        format!("{}{SIGNATURE_EXTENSION}", self.source_archive_filename())
    }

    /// URL of the detached signature.
    #[must_use]
    pub fn signature_url(&self) -> String {
        self.file_url(&self.signature_filename())
    }

    /// Filename of the SHA-512 checksum file.
    #[must_use]
    pub fn checksum_filename(&self) -> String {
        format!("{}{CHECKSUM_EXTENSION}", self.source_archive_filename())
    }

    /// URL of the SHA-512 checksum file.
    #[must_use]
    pub fn checksum_url(&self) -> String {
        self.file_url(&self.checksum_filename())
    }

    /// Every distribution link, package directory first.
    #[must_use]
    pub fn dist_links(&self) -> Vec<String> {
        vec![
            self.package_directory_url(),
            self.source_archive_url(),
            self.signature_url(),
            self.checksum_url(),
        ]
    }

    fn file_url(&self, filename: &str) -> String {
        format!("{}/{filename}", self.package_directory_url())
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.package, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dashboard() -> Candidate {
        Candidate::new("apisix-dashboard", "2.11.0")
            .with_sub_project(true)
            .with_prefix("apache")
    }

    #[rstest]
    fn sub_project_directory_embeds_package(dashboard: Candidate) {
        assert_eq!(dashboard.package_directory_name(), "apisix-dashboard-2.11.0");
    }

    #[rstest]
    fn top_level_directory_is_version_only() {
        let candidate = Candidate::new("apisix", "2.15.0");
        assert_eq!(candidate.package_directory_name(), "2.15.0");
        assert_eq!(
            candidate.source_archive_filename(),
            "2.15.0-src.tgz",
            "without a prefix the stem falls back to the directory name"
        );
    }

    #[rstest]
    fn prefix_only_affects_archive_filenames(dashboard: Candidate) {
        assert_eq!(
            dashboard.source_archive_filename(),
            "apache-apisix-dashboard-2.11.0-src.tgz"
        );
        assert!(!dashboard.package_directory_url().contains("apache-apisix-dashboard"));
    }

    #[rstest]
    fn source_url_joins_base_directory_and_filename(dashboard: Candidate) {
        let expected = format!(
            "{DEFAULT_DIST_BASE}apisix-dashboard-2.11.0/apache-apisix-dashboard-2.11.0-src.tgz"
        );
        assert_eq!(dashboard.source_archive_url(), expected);
    }

    #[rstest]
    fn signature_and_checksum_extend_archive_name(dashboard: Candidate) {
        assert_eq!(
            dashboard.signature_filename(),
            "apache-apisix-dashboard-2.11.0-src.tgz.asc"
        );
        assert_eq!(
            dashboard.checksum_filename(),
            "apache-apisix-dashboard-2.11.0-src.tgz.sha512"
        );
        assert!(dashboard.signature_url().ends_with("/apache-apisix-dashboard-2.11.0-src.tgz.asc"));
        assert!(dashboard.checksum_url().ends_with("/apache-apisix-dashboard-2.11.0-src.tgz.sha512"));
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn blank_prefix_is_ignored(#[case] prefix: &str) {
        let candidate = Candidate::new("apisix", "2.15.0").with_prefix(prefix);
        assert_eq!(candidate.prefix(), None);
    }

    #[rstest]
    fn dist_base_gains_trailing_slash() {
        let candidate = Candidate::new("apisix", "2.15.0").with_dist_base("https://mirror.test/dist");
        assert_eq!(candidate.package_directory_url(), "https://mirror.test/dist/2.15.0");
    }

    #[rstest]
    fn derived_names_are_stable_across_calls(dashboard: Candidate) {
        let copy = dashboard.clone();
        assert_eq!(dashboard.dist_links(), copy.dist_links());
        assert_eq!(dashboard.dist_links(), dashboard.dist_links());
    }

    #[rstest]
    fn dist_links_start_with_package_directory(dashboard: Candidate) {
        let links = dashboard.dist_links();
        assert_eq!(links.len(), 4);
        assert_eq!(links.first(), Some(&dashboard.package_directory_url()));
    }
}
