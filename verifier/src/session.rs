//! A verification session: one candidate plus the settings it runs with.

use camino::{Utf8Path, Utf8PathBuf};
use std::time::Duration;

use crate::artefact::candidate::Candidate;
use crate::artefact::fetch::ArtifactKind;
use crate::config::{ConfigError, Settings};
use crate::keys::KEY_FILENAME;
use crate::project::Project;
use crate::source_host::GitReference;

/// Read-only configuration for verifying one release candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    project: Project,
    candidate: Candidate,
    git: GitReference,
    timeout: Duration,
    force: bool,
    announcer: String,
    cache_dir: Utf8PathBuf,
    gpg_program: String,
}

impl Session {
    /// Build the session for `project` from validated `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the settings fail validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use sixer::config::Settings;
    /// use sixer::project::Project;
    /// use sixer::session::Session;
    ///
    /// let settings = Settings {
    ///     candidate: "2.11.0".to_owned(),
    ///     ..Settings::default()
    /// };
    /// let session = Session::new(Project::Dashboard, &settings)?;
    /// assert_eq!(
    ///     session.candidate().source_archive_filename(),
    ///     "apache-apisix-dashboard-2.11.0-src.tgz"
    /// );
    /// # Ok::<(), sixer::config::ConfigError>(())
    /// ```
    pub fn new(project: Project, settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let candidate = Candidate::new(project.package(), settings.candidate.trim())
            .with_sub_project(project.is_sub_project())
            .with_prefix(project.prefix())
            .with_dist_base(settings.dist_base_url.as_str());
        let git = GitReference::new(
            project.repository(),
            settings.candidate.trim(),
            settings.commit.trim(),
        )
        .with_base(settings.source_host_base_url.as_str());

        Ok(Self {
            project,
            candidate,
            git,
            timeout: settings.timeout(),
            force: settings.force,
            announcer: settings.announcer.trim().to_owned(),
            cache_dir: settings.cache_dir.clone(),
            gpg_program: settings.gpg_program.clone(),
        })
    }

    /// The project being verified.
    #[must_use]
    pub fn project(&self) -> Project {
        self.project
    }

    /// The candidate's naming policy.
    #[must_use]
    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    /// The candidate's source-host reference.
    #[must_use]
    pub fn git(&self) -> &GitReference {
        &self.git
    }

    /// Bound on each request and on the key export.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether cached files are discarded before fetching.
    #[must_use]
    pub fn force(&self) -> bool {
        self.force
    }

    /// The expected signer; may be empty for link-only runs.
    #[must_use]
    pub fn announcer(&self) -> &str {
        &self.announcer
    }

    /// Directory holding cached files.
    #[must_use]
    pub fn cache_dir(&self) -> &Utf8Path {
        &self.cache_dir
    }

    /// Program used to export the announcer key.
    #[must_use]
    pub fn gpg_program(&self) -> &str {
        &self.gpg_program
    }

    /// Published filename and URL for an artefact kind.
    #[must_use]
    pub fn artifact(&self, kind: ArtifactKind) -> (String, String) {
        let candidate = &self.candidate;
        match kind {
            ArtifactKind::SourceArchive => (
                candidate.source_archive_filename(),
                candidate.source_archive_url(),
            ),
            ArtifactKind::Checksum => (candidate.checksum_filename(), candidate.checksum_url()),
            ArtifactKind::Signature => (candidate.signature_filename(), candidate.signature_url()),
        }
    }

    /// Every file this session may leave in the cache directory.
    #[must_use]
    pub fn cached_filenames(&self) -> Vec<String> {
        let mut names: Vec<String> = ArtifactKind::ALL
            .iter()
            .map(|kind| self.artifact(*kind).0)
            .collect();
        names.push(KEY_FILENAME.to_owned());
        names
    }
}

impl Settings {
    /// Build a [`Session`] for `project` from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the settings fail validation.
    pub fn session(&self, project: Project) -> Result<Session, ConfigError> {
        Session::new(project, self)
    }
}
