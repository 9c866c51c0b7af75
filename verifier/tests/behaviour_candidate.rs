//! Behaviour tests for release-candidate naming and source-host links.

use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sixer::cli::Cli;
use sixer::config::{ConfigError, Settings};
use sixer::project::Project;
use sixer::session::Session;

#[derive(Default)]
struct CandidateWorld {
    project: Option<Project>,
    settings: Settings,
    result: Option<Result<Session, ConfigError>>,
}

impl CandidateWorld {
    fn session(&self) -> &Session {
        match self.result.as_ref().expect("session resolved") {
            Ok(session) => session,
            Err(err) => panic!("session was rejected: {err}"),
        }
    }
}

#[fixture]
fn world() -> CandidateWorld {
    CandidateWorld::default()
}

#[given("the \"{name}\" project at candidate \"{version}\"")]
fn given_project(world: &mut CandidateWorld, name: String, version: String) {
    let cli = Cli::try_parse_from(["sixer", name.as_str()]).expect("known project");
    world.project = Some(cli.project.project());
    world.settings.candidate = version;
}

#[given("the release commit \"{commit}\"")]
fn given_commit(world: &mut CandidateWorld, commit: String) {
    world.settings.commit = commit;
}

#[when("the session is resolved")]
fn when_resolved(world: &mut CandidateWorld) {
    let project = world.project.expect("project set");
    world.result = Some(world.settings.session(project));
}

#[then("the package directory is \"{name}\"")]
fn then_directory(world: &mut CandidateWorld, name: String) {
    assert_eq!(world.session().candidate().package_directory_name(), name);
}

#[then("the source archive is \"{name}\"")]
fn then_archive(world: &mut CandidateWorld, name: String) {
    assert_eq!(world.session().candidate().source_archive_filename(), name);
}

#[then("the signature is \"{name}\"")]
fn then_signature(world: &mut CandidateWorld, name: String) {
    assert_eq!(world.session().candidate().signature_filename(), name);
}

#[then("the checksum is \"{name}\"")]
fn then_checksum(world: &mut CandidateWorld, name: String) {
    assert_eq!(world.session().candidate().checksum_filename(), name);
}

#[then("the release tag is \"{tag}\"")]
fn then_tag(world: &mut CandidateWorld, tag: String) {
    assert_eq!(world.session().git().tag(), tag);
}

#[then("the changelog anchor is \"{anchor}\"")]
fn then_anchor(world: &mut CandidateWorld, anchor: String) {
    assert_eq!(world.session().git().markdown_anchor(), anchor);
    assert!(world.session().git().changelog_url().ends_with(&format!("#{anchor}")));
}

#[then("the commit link ends with \"{suffix}\"")]
fn then_commit_link(world: &mut CandidateWorld, suffix: String) {
    let url = world.session().git().commit_url();
    assert!(url.ends_with(&suffix), "unexpected commit link {url}");
}

#[then("the session is rejected with \"{message}\"")]
fn then_rejected(world: &mut CandidateWorld, message: String) {
    match world.result.as_ref().expect("session resolved") {
        Ok(_) => panic!("expected the session to be rejected"),
        Err(err) => assert_eq!(err.to_string(), message),
    }
}

#[scenario(
    path = "tests/features/candidate.feature",
    name = "Gateway artefacts live in a version directory"
)]
fn scenario_gateway_names(world: CandidateWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/candidate.feature",
    name = "Sub-project directories embed the package name"
)]
fn scenario_sub_project_names(world: CandidateWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/candidate.feature",
    name = "Go plugin runner artefacts carry the repository name"
)]
fn scenario_go_plugin_runner_names(world: CandidateWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/candidate.feature",
    name = "Source-host links follow the release branch"
)]
fn scenario_source_host_links(world: CandidateWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/candidate.feature",
    name = "Patch releases keep the full tag"
)]
fn scenario_patch_release(world: CandidateWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/candidate.feature",
    name = "A blank candidate is rejected"
)]
fn scenario_blank_candidate(world: CandidateWorld) {
    let _ = world;
}
