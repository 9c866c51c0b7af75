//! Source-host release links: the changelog entry and the release commit.

use log::debug;

use crate::http::{HttpClient, TransportError};
use crate::probe::{LinkCheck, check_links};

/// Default organisation base URL on the source host.
pub const DEFAULT_SOURCE_HOST_BASE: &str = "https://github.com/apache";

/// Repository, release, and commit of a candidate on the source host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitReference {
    repo: String,
    release: String,
    commit: String,
    base: String,
}

impl GitReference {
    /// Describe `repo` at `release`, built from `commit`.
    #[must_use]
    pub fn new(
        repo: impl Into<String>,
        release: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            release: release.into(),
            commit: commit.into(),
            base: DEFAULT_SOURCE_HOST_BASE.to_owned(),
        }
    }

    /// Use `base` instead of [`DEFAULT_SOURCE_HOST_BASE`]. Trailing slashes
    /// are dropped.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_owned();
        self
    }

    /// The repository name.
    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// The release branch tag: `2.11.0` becomes `2.11`; other versions are
    /// used as given.
    ///
    /// # Examples
    ///
    /// ```
    /// use sixer::source_host::GitReference;
    ///
    /// assert_eq!(GitReference::new("apisix", "2.11.0", "abc").tag(), "2.11");
    /// assert_eq!(GitReference::new("apisix", "2.11.1", "abc").tag(), "2.11.1");
    /// ```
    #[must_use]
    pub fn tag(&self) -> &str {
        match self.release.strip_suffix(".0") {
            Some(head) if head.matches('.').count() == 1 => head,
            _ => &self.release,
        }
    }

    /// The changelog heading anchor: every `.` removed from the release.
    #[must_use]
    pub fn markdown_anchor(&self) -> String {
        self.release.replace('.', "")
    }

    /// `<base>/<repo>/blob/release/<tag>/CHANGELOG.md#<anchor>`.
    #[must_use]
    pub fn changelog_url(&self) -> String {
        format!(
            "{}/{}/blob/release/{}/CHANGELOG.md#{}",
            self.base,
            self.repo,
            self.tag(),
            self.markdown_anchor()
        )
    }

    /// `<base>/<repo>/commit/<commit>`.
    #[must_use]
    pub fn commit_url(&self) -> String {
        format!("{}/{}/commit/{}", self.base, self.repo, self.commit)
    }

    /// The changelog and commit URLs, in probe order.
    #[must_use]
    pub fn links(&self) -> Vec<String> {
        vec![self.changelog_url(), self.commit_url()]
    }
}

/// Probe the changelog and commit links of `git`.
///
/// Unreachable links are logged and returned; only transport failures are
/// errors.
///
/// # Errors
///
/// Returns the first [`TransportError`] encountered.
pub fn validate_links(
    client: &dyn HttpClient,
    git: &GitReference,
) -> Result<Vec<LinkCheck>, TransportError> {
    debug!("validating source-host links for {} {}", git.repo, git.release);
    check_links(client, "github", &git.links())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dashboard() -> GitReference {
        GitReference::new("apisix-dashboard", "2.11.0", "abc123")
    }

    #[rstest]
    fn dashboard_links(dashboard: GitReference) {
        assert_eq!(dashboard.tag(), "2.11");
        assert_eq!(dashboard.markdown_anchor(), "2110");
        assert_eq!(
            dashboard.changelog_url(),
            "https://github.com/apache/apisix-dashboard/blob/release/2.11/CHANGELOG.md#2110"
        );
        assert_eq!(
            dashboard.commit_url(),
            "https://github.com/apache/apisix-dashboard/commit/abc123"
        );
    }

    #[rstest]
    #[case::patch_zero("2.15.0", "2.15")]
    #[case::patch_release("2.15.1", "2.15.1")]
    #[case::two_components("3.0", "3.0")]
    #[case::ten("2.10.0", "2.10")]
    #[case::four_components("1.2.3.0", "1.2.3.0")]
    fn tag_trims_only_a_zero_patch(#[case] release: &str, #[case] tag: &str) {
        assert_eq!(GitReference::new("apisix", release, "c").tag(), tag);
    }

    #[rstest]
    fn custom_base_is_used(dashboard: GitReference) {
        let git = dashboard.with_base("https://git.test/org/");
        assert_eq!(git.commit_url(), "https://git.test/org/apisix-dashboard/commit/abc123");
    }

    #[rstest]
    fn unreachable_links_are_not_errors(dashboard: GitReference) {
        let mut client = MockHttpClient::new();
        client.expect_head().times(2).returning(|_| Ok(404));

        let checks = validate_links(&client, &dashboard).expect("no transport errors");

        assert_eq!(checks.len(), 2);
        assert!(checks.iter().all(|c| !c.reachability.is_reachable()));
    }

    #[rstest]
    fn transport_failure_is_returned(dashboard: GitReference) {
        let mut client = MockHttpClient::new();
        client
            .expect_head()
            .returning(|url| Err(TransportError::new(url, "dns failure")));

        let err = validate_links(&client, &dashboard).expect_err("transport error");

        assert_eq!(err.url, dashboard.changelog_url());
    }
}
