//! Verification run orchestration.
//!
//! A full run walks `Idle → LinksValidated → Fetched → ChecksumVerified →
//! SignatureVerified → ExtrasChecked → Done`. Every step's outcome is
//! logged and recorded in a [`RunReport`]. Content mismatches never stop the
//! run; a failed fetch only skips the steps that need that file. The run is
//! aborted by a transport error during link checks, by a missing announcer,
//! and by a failed key export.

use log::{debug, error, info, warn};
use serde::Serialize;
use std::fs::File;

use crate::artefact::archive::check_legal_files;
use crate::artefact::checksum::verify_checksum;
use crate::artefact::fetch::{ArtifactCache, ArtifactKind, FetchOutcome, Fetcher};
use crate::artefact::signature::{SignatureVerdict, verify_signature};
use crate::error::Result;
use crate::http::{HttpClient, TransportError};
use crate::keys::{KeyError, KeyExporter, KeyManager};
use crate::probe::{LinkCheck, check_links};
use crate::project::Project;
use crate::session::Session;
use crate::source_host;

/// Transport failures that abort the link phase.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// A dist-directory link could not be probed.
    #[error("dist link check failed: {0}")]
    Dist(#[source] TransportError),

    /// A source-host link could not be probed.
    #[error("github link check failed: {0}")]
    SourceHost(#[source] TransportError),
}

/// Progress of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing has happened yet.
    Idle,
    /// Links were probed without transport errors.
    LinksValidated,
    /// Artefacts were fetched (or found missing) and the key resolved.
    Fetched,
    /// The checksum step finished.
    ChecksumVerified,
    /// The signature step finished.
    SignatureVerified,
    /// The legal-file step finished.
    ExtrasChecked,
    /// The run completed.
    Done,
}

/// A recorded pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Retrieval of one artefact.
    Fetch(ArtifactKind),
    /// Resolution of the announcer key.
    Key,
    /// SHA-512 checksum comparison.
    Checksum,
    /// OpenPGP signature verification.
    Signature,
    /// Top-level `LICENSE`/`NOTICE` inspection.
    LegalFiles,
}

/// How a step ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The check held.
    Passed {
        /// What was observed.
        detail: String,
    },
    /// An advisory check did not hold; the run still succeeds.
    Warned {
        /// What was missing.
        detail: String,
    },
    /// The check ran and did not hold.
    Failed {
        /// What did not match.
        detail: String,
    },
    /// The check could not run to completion.
    Errored {
        /// The error message.
        error: String,
    },
    /// The check did not run because an input was unavailable.
    Skipped {
        /// Which input was unavailable.
        reason: String,
    },
}

impl StepOutcome {
    fn passed(detail: impl Into<String>) -> Self {
        Self::Passed {
            detail: detail.into(),
        }
    }

    fn failed(detail: impl Into<String>) -> Self {
        Self::Failed {
            detail: detail.into(),
        }
    }

    fn errored(error: &dyn std::fmt::Display) -> Self {
        Self::Errored {
            error: error.to_string(),
        }
    }

    fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Return whether the outcome lets the run succeed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Passed { .. } | Self::Warned { .. })
    }
}

/// One entry of the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// The step that ran.
    pub step: Step,
    /// Its outcome.
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Everything a run observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// The verified project.
    pub project: Project,
    /// The release-candidate version.
    pub candidate: String,
    /// The last state reached.
    pub state: RunState,
    /// Dist-directory probe results.
    pub dist_links: Vec<LinkCheck>,
    /// Source-host probe results.
    pub source_host_links: Vec<LinkCheck>,
    /// Step outcomes in execution order.
    pub steps: Vec<StepReport>,
}

impl RunReport {
    fn new(session: &Session) -> Self {
        Self {
            project: session.project(),
            candidate: session.candidate().version().to_owned(),
            state: RunState::Idle,
            dist_links: Vec::new(),
            source_host_links: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Return whether every link was reachable and every step held.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.dist_links
            .iter()
            .chain(&self.source_host_links)
            .all(|check| check.reachability.is_reachable())
            && self.steps.iter().all(|report| report.outcome.is_ok())
    }

    /// Return the outcome recorded for `step`, if it ran.
    #[must_use]
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|report| report.step == step)
            .map(|report| &report.outcome)
    }

    fn record(&mut self, step: Step, outcome: StepOutcome) {
        self.steps.push(StepReport { step, outcome });
    }

    fn advance(&mut self, state: RunState) {
        debug!("run state {:?} -> {state:?}", self.state);
        self.state = state;
    }
}

/// Which link groups to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkScope {
    /// Probe the dist-directory links.
    pub dist: bool,
    /// Probe the source-host links.
    pub source_host: bool,
}

impl LinkScope {
    /// Probe both groups.
    pub const ALL: Self = Self {
        dist: true,
        source_host: true,
    };
}

type Input<T> = std::result::Result<T, StepOutcome>;

/// Runs the verification steps for one [`Session`].
pub struct Pipeline<'a> {
    session: &'a Session,
    client: &'a dyn HttpClient,
    exporter: &'a dyn KeyExporter,
    cache: ArtifactCache,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over the session's cache directory.
    #[must_use]
    pub fn new(
        session: &'a Session,
        client: &'a dyn HttpClient,
        exporter: &'a dyn KeyExporter,
    ) -> Self {
        Self {
            session,
            client,
            exporter,
            cache: ArtifactCache::new(session.cache_dir().to_owned()),
        }
    }

    /// Probe the selected link groups only.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] wrapped in [`crate::error::SixerError`] for the
    /// first transport failure.
    pub fn links(&self, scope: LinkScope) -> Result<RunReport> {
        let mut report = RunReport::new(self.session);
        self.validate_links(scope, &mut report)?;
        report.advance(RunState::Done);
        Ok(report)
    }

    /// Fetch every artefact and resolve the key without verifying.
    ///
    /// # Errors
    ///
    /// Returns an error if the announcer is missing or the key export fails.
    pub fn load(&self) -> Result<RunReport> {
        let mut report = RunReport::new(self.session);
        self.fetch_all(&mut report);
        self.resolve_key(&mut report)?;
        report.advance(RunState::Fetched);
        Ok(report)
    }

    /// Run every step.
    ///
    /// # Errors
    ///
    /// Returns an error for a link transport failure, a missing announcer,
    /// or a failed key export. Mismatches are recorded, not returned.
    pub fn verify(&self) -> Result<RunReport> {
        let mut report = RunReport::new(self.session);

        self.validate_links(LinkScope::ALL, &mut report)?;

        let fetched = self.fetch_all(&mut report);
        let key = self.resolve_key(&mut report)?;
        report.advance(RunState::Fetched);

        let archive = self.read_fetched(&fetched, ArtifactKind::SourceArchive);

        let checksum = self.checksum_outcome(&archive, &fetched);
        report.record(Step::Checksum, checksum);
        report.advance(RunState::ChecksumVerified);

        let signature = self.signature_outcome(&archive, &fetched, key);
        report.record(Step::Signature, signature);
        report.advance(RunState::SignatureVerified);

        let legal = self.legal_files_outcome(&archive);
        report.record(Step::LegalFiles, legal);
        report.advance(RunState::ExtrasChecked);

        report.advance(RunState::Done);
        Ok(report)
    }

    /// Remove every cached file of the session.
    ///
    /// # Errors
    ///
    /// Returns the first removal error other than not-found.
    pub fn clean(&self) -> Result<()> {
        self.cache.clean(self.session.cached_filenames().as_slice())?;
        info!("cleaned cache for {}", self.session.candidate());
        Ok(())
    }

    fn validate_links(
        &self,
        scope: LinkScope,
        report: &mut RunReport,
    ) -> std::result::Result<(), LinkError> {
        let dist = if scope.dist {
            check_links(self.client, "dist", &self.session.candidate().dist_links())
        } else {
            Ok(Vec::new())
        };
        let source_host = if scope.source_host {
            source_host::validate_links(self.client, self.session.git())
        } else {
            Ok(Vec::new())
        };

        report.dist_links = dist.map_err(LinkError::Dist)?;
        report.source_host_links = source_host.map_err(LinkError::SourceHost)?;
        report.advance(RunState::LinksValidated);
        Ok(())
    }

    fn fetch_all(&self, report: &mut RunReport) -> Vec<ArtifactKind> {
        let fetcher = Fetcher::new(self.client, &self.cache, self.session.force());
        let mut fetched = Vec::with_capacity(ArtifactKind::ALL.len());

        for kind in ArtifactKind::ALL {
            let (filename, url) = self.session.artifact(kind);
            let outcome = match fetcher.fetch(&url, &filename) {
                Ok(FetchOutcome::Reused) => {
                    info!("{kind} {filename} cached ok ✅");
                    fetched.push(kind);
                    StepOutcome::passed(format!("reused cached {filename}"))
                }
                Ok(FetchOutcome::Downloaded { bytes }) => {
                    info!("{kind} {url} fetch ok ✅");
                    fetched.push(kind);
                    StepOutcome::passed(format!("downloaded {bytes} bytes"))
                }
                Err(err) => {
                    error!("{kind} {url} fetch bad ❌ {err}");
                    StepOutcome::errored(&err)
                }
            };
            report.record(Step::Fetch(kind), outcome);
        }
        fetched
    }

    fn resolve_key(&self, report: &mut RunReport) -> std::result::Result<Option<File>, KeyError> {
        let manager = KeyManager::new(self.session.cache_dir(), self.exporter, self.session.force());
        match manager.resolve(self.session.announcer()) {
            Ok(file) => {
                info!("announcer key {} ok ✅", manager.key_path());
                report.record(Step::Key, StepOutcome::passed(manager.key_path().to_string()));
                Ok(Some(file))
            }
            Err(err @ (KeyError::MissingAnnouncer | KeyError::ExportFailure { .. })) => {
                error!("announcer key bad ❌ {err}");
                Err(err)
            }
            Err(err) => {
                error!("announcer key bad ❌ {err}");
                report.record(Step::Key, StepOutcome::errored(&err));
                Ok(None)
            }
        }
    }

    fn read_fetched(&self, fetched: &[ArtifactKind], kind: ArtifactKind) -> Input<Vec<u8>> {
        if !fetched.contains(&kind) {
            return Err(StepOutcome::skipped(format!("{kind} not fetched")));
        }
        let (filename, _) = self.session.artifact(kind);
        self.cache.read(&filename).map_err(|err| {
            error!("{kind} {filename} read bad ❌ {err}");
            StepOutcome::errored(&err)
        })
    }

    fn open_fetched(&self, fetched: &[ArtifactKind], kind: ArtifactKind) -> Input<File> {
        if !fetched.contains(&kind) {
            return Err(StepOutcome::skipped(format!("{kind} not fetched")));
        }
        let (filename, _) = self.session.artifact(kind);
        File::open(self.cache.path(&filename)).map_err(|err| StepOutcome::errored(&err))
    }

    fn checksum_outcome(&self, archive: &Input<Vec<u8>>, fetched: &[ArtifactKind]) -> StepOutcome {
        let archive = match archive {
            Ok(bytes) => bytes,
            Err(skip) => return skip.clone(),
        };
        let body = match self.read_fetched(fetched, ArtifactKind::Checksum) {
            Ok(body) => body,
            Err(skip) => return skip,
        };
        let (filename, _) = self.session.artifact(ArtifactKind::Checksum);

        match verify_checksum(&body, Some(archive), self.cache.dir()) {
            Ok(true) => {
                info!("{} {filename} verify ok ✅", ArtifactKind::Checksum);
                StepOutcome::passed("sha512 digest matches")
            }
            Ok(false) => {
                error!("{} {filename} verify bad ❌", ArtifactKind::Checksum);
                StepOutcome::failed("sha512 digest does not match the source archive")
            }
            Err(err) => {
                error!("{} {filename} verify bad ❌ {err}", ArtifactKind::Checksum);
                StepOutcome::errored(&err)
            }
        }
    }

    fn signature_outcome(
        &self,
        archive: &Input<Vec<u8>>,
        fetched: &[ArtifactKind],
        key: Option<File>,
    ) -> StepOutcome {
        let archive = match archive {
            Ok(bytes) => bytes,
            Err(skip) => return skip.clone(),
        };
        let signature = match self.open_fetched(fetched, ArtifactKind::Signature) {
            Ok(file) => file,
            Err(skip) => return skip,
        };
        let Some(key) = key else {
            return StepOutcome::skipped("announcer key unavailable");
        };
        let (filename, _) = self.session.artifact(ArtifactKind::Signature);

        match verify_signature(archive, signature, key) {
            Ok(SignatureVerdict::Valid) => {
                info!("{} {filename} verify ok ✅", ArtifactKind::Signature);
                StepOutcome::passed(format!("signed by {}", self.session.announcer()))
            }
            Ok(SignatureVerdict::Invalid { reason }) => {
                error!("{} {filename} verify bad ❌ {reason}", ArtifactKind::Signature);
                StepOutcome::failed(reason)
            }
            Err(err) => {
                error!("{} {filename} verify bad ❌ {err}", ArtifactKind::Signature);
                StepOutcome::errored(&err)
            }
        }
    }

    fn legal_files_outcome(&self, archive: &Input<Vec<u8>>) -> StepOutcome {
        let archive = match archive {
            Ok(bytes) => bytes,
            Err(skip) => return skip.clone(),
        };

        match check_legal_files(archive.as_slice()) {
            Ok(found) => {
                let mut missing = Vec::new();
                for (name, present) in [("LICENSE", found.license), ("NOTICE", found.notice)] {
                    if present {
                        info!("{name} ok ✅");
                    } else {
                        warn!("{name} bad ❌ not found at archive root");
                        missing.push(name);
                    }
                }
                if missing.is_empty() {
                    StepOutcome::passed("LICENSE and NOTICE present")
                } else {
                    StepOutcome::Warned {
                        detail: format!("missing {}", missing.join(", ")),
                    }
                }
            }
            Err(err) => {
                error!("source archive read bad ❌ {err}");
                StepOutcome::errored(&err)
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
