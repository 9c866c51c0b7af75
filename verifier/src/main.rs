//! sixer CLI entrypoint.
//!
//! Resolves the run configuration from the config file and command-line
//! flags, performs the requested action for one project, and prints the run
//! report on stdout. Exits with 0 when every check passed, 2 when the report
//! records a failure, and 1 when the run was aborted.

use clap::Parser;
use log::debug;
use sixer::cli::{Action, Cli};
use sixer::config::{Settings, locate};
use sixer::dirs::SystemBaseDirs;
use sixer::error::Result;
use sixer::exec::SystemCommandExecutor;
use sixer::http::UreqClient;
use sixer::keys::GpgKeyExporter;
use sixer::logging::{self, level_for};
use sixer::output::write_report;
use sixer::pipeline::{Pipeline, RunReport};
use std::io::Write;

/// What a completed run produced.
enum RunOutcome {
    Report(RunReport),
    Cleaned,
}

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    if let Err(err) = logging::init(level_for(cli.global.verbosity, cli.global.quiet)) {
        write_stderr_line(&mut stderr, format!("failed to initialise logging: {err}"));
    }

    let mut stdout = std::io::stdout().lock();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<RunOutcome> {
    let location = locate(cli.global.config.as_deref(), &SystemBaseDirs);
    if let Some(found) = &location {
        debug!("using configuration {}", found.path);
    }
    let settings = Settings::load(location.as_ref())?.with_overrides(cli.global.overrides());
    let session = settings.session(cli.project.project())?;

    let client = UreqClient::new(session.timeout());
    let exporter = GpgKeyExporter::new(
        session.gpg_program(),
        SystemCommandExecutor::new(session.timeout()),
    );
    let pipeline = Pipeline::new(&session, &client, &exporter);

    let report = match cli.project.action() {
        Action::Verify => pipeline.verify()?,
        Action::Link(args) => pipeline.links(args.scope())?,
        Action::Load => pipeline.load()?,
        Action::Clean => {
            pipeline.clean()?;
            return Ok(RunOutcome::Cleaned);
        }
    };
    write_report(stdout, &report, cli.global.json)?;
    Ok(RunOutcome::Report(report))
}

fn exit_code_for_run_result(result: Result<RunOutcome>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(RunOutcome::Cleaned) => 0,
        Ok(RunOutcome::Report(report)) if report.is_success() => 0,
        Ok(RunOutcome::Report(_)) => 2,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort; nothing else to report to.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sixer::config::ConfigError;
    use sixer::pipeline::{RunState, Step, StepOutcome, StepReport};
    use sixer::project::Project;

    fn report(outcome: StepOutcome) -> RunReport {
        RunReport {
            project: Project::Apisix,
            candidate: "2.15.0".to_owned(),
            state: RunState::Done,
            dist_links: Vec::new(),
            source_host_links: Vec::new(),
            steps: vec![StepReport {
                step: Step::Checksum,
                outcome,
            }],
        }
    }

    #[test]
    fn passing_report_exits_zero() {
        let mut stderr = Vec::new();
        let passed = StepOutcome::Passed {
            detail: "sha512 digest matches".to_owned(),
        };
        let code = exit_code_for_run_result(Ok(RunOutcome::Report(report(passed))), &mut stderr);
        assert_eq!(code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn failing_report_exits_two() {
        let mut stderr = Vec::new();
        let failed = StepOutcome::Failed {
            detail: "sha512 digest mismatch".to_owned(),
        };
        let code = exit_code_for_run_result(Ok(RunOutcome::Report(report(failed))), &mut stderr);
        assert_eq!(code, 2);
    }

    #[test]
    fn clean_exits_zero() {
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Ok(RunOutcome::Cleaned), &mut stderr), 0);
    }

    #[test]
    fn error_is_printed_and_exits_one() {
        let mut stderr = Vec::new();
        let code = exit_code_for_run_result(Err(ConfigError::MissingCandidate.into()), &mut stderr);
        assert_eq!(code, 1);
        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(text.contains("please specify release candidate version first"));
    }
}
