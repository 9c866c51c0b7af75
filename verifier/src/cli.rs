//! CLI argument definitions for sixer.
//!
//! Each project is a subcommand with an optional action. Global flags may be
//! given before or after the project name and override values from the
//! configuration file.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;
use crate::pipeline::LinkScope;
use crate::project::Project;

/// Verify Apache release-candidate source distributions.
#[derive(Parser, Debug)]
#[command(name = "sixer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Verify Apache release-candidate source distributions.\n\n",
    "sixer checks that a release candidate's dist and GitHub links are ",
    "reachable, downloads the source archive with its checksum and signature, ",
    "and verifies the SHA-512 digest, the announcer's OpenPGP signature, and ",
    "the presence of top-level LICENSE and NOTICE files.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Verify an APISIX release candidate:\n",
    "    $ sixer -c 2.15.0 -a 'Release Manager' -C 1a2b3c apisix\n\n",
    "  Only check the dashboard's dist links:\n",
    "    $ sixer -c 2.11.0 dashboard link --dist\n\n",
    "  Re-download everything, ignoring the cache:\n",
    "    $ sixer -c 2.15.0 -a 'Release Manager' -f apisix verify\n",
))]
pub struct Cli {
    /// Global settings.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Project to verify.
    #[command(subcommand)]
    pub project: ProjectCommand,
}

/// Flags shared by every project and action.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Request timeout in seconds [default: 10].
    #[arg(short, long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Release-candidate version, like 2.15.0.
    #[arg(short, long, global = true, value_name = "VERSION")]
    pub candidate: Option<String>,

    /// Identity expected to have signed the release.
    #[arg(short, long, global = true, value_name = "NAME")]
    pub announcer: Option<String>,

    /// Release commit id.
    #[arg(short = 'C', long, global = true, value_name = "SHA")]
    pub commit: Option<String>,

    /// Discard cached files and download again.
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Directory for cached artefacts [default: current directory].
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Configuration file [default: $SIXER_CONFIG or platform config dir].
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Print the run report as JSON on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl GlobalArgs {
    /// The command-line layer of the configuration.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            timeout_secs: self.timeout,
            candidate: self.candidate.clone(),
            announcer: self.announcer.clone(),
            commit: self.commit.clone(),
            force: self.force,
            cache_dir: self.cache_dir.clone(),
        }
    }
}

/// Available projects.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProjectCommand {
    /// Apache APISIX.
    Apisix(ActionArgs),
    /// Apache APISIX Dashboard.
    Dashboard(ActionArgs),
    /// Apache APISIX Go Plugin Runner.
    GoPluginRunner(ActionArgs),
    /// Apache APISIX Ingress Controller.
    IngressController(ActionArgs),
}

impl ProjectCommand {
    /// The selected project.
    #[must_use]
    pub fn project(&self) -> Project {
        match self {
            Self::Apisix(_) => Project::Apisix,
            Self::Dashboard(_) => Project::Dashboard,
            Self::GoPluginRunner(_) => Project::GoPluginRunner,
            Self::IngressController(_) => Project::IngressController,
        }
    }

    /// The selected action; `verify` when none was given.
    #[must_use]
    pub fn action(&self) -> Action {
        let args = match self {
            Self::Apisix(args)
            | Self::Dashboard(args)
            | Self::GoPluginRunner(args)
            | Self::IngressController(args) => args,
        };
        args.action.clone().unwrap_or(Action::Verify)
    }
}

/// Arguments of a project subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionArgs {
    /// What to do [default: verify].
    #[command(subcommand)]
    pub action: Option<Action>,
}

/// Actions available for every project.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Check links, fetch artefacts, and verify them.
    Verify,
    /// Only check dist and GitHub links.
    Link(LinkArgs),
    /// Fetch artefacts and the announcer key without verifying.
    Load,
    /// Remove cached artefacts and the announcer key.
    Clean,
}

/// Arguments for the link action.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkArgs {
    /// Check dist links.
    #[arg(long)]
    pub dist: bool,

    /// Check GitHub links.
    #[arg(long)]
    pub github: bool,
}

impl LinkArgs {
    /// The link groups to probe; both when neither flag is given.
    #[must_use]
    pub fn scope(&self) -> LinkScope {
        if !self.dist && !self.github {
            return LinkScope::ALL;
        }
        LinkScope {
            dist: self.dist,
            source_host: self.github,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
