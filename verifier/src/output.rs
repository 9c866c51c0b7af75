//! Report rendering for the sixer CLI.

use std::io::{self, Write};

use crate::artefact::fetch::ArtifactKind;
use crate::pipeline::{RunReport, Step, StepOutcome};
use crate::probe::{LinkCheck, Reachability};

/// Human-readable label for a step.
#[must_use]
pub fn step_label(step: Step) -> String {
    match step {
        Step::Fetch(kind) => format!("fetch {kind}"),
        Step::Key => "announcer key".to_owned(),
        Step::Checksum => format!("verify {}", ArtifactKind::Checksum),
        Step::Signature => format!("verify {}", ArtifactKind::Signature),
        Step::LegalFiles => "LICENSE/NOTICE".to_owned(),
    }
}

fn outcome_text(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Passed { detail } => format!("ok ✅ {detail}"),
        StepOutcome::Warned { detail } => format!("warn ⚠️ {detail}"),
        StepOutcome::Failed { detail } => format!("bad ❌ {detail}"),
        StepOutcome::Errored { error } => format!("error ❌ {error}"),
        StepOutcome::Skipped { reason } => format!("skipped ({reason})"),
    }
}

fn link_text(check: &LinkCheck) -> String {
    match check.reachability {
        Reachability::Reachable => format!("ok ✅ {}", check.url),
        Reachability::Unreachable { status } => format!("bad ❌ {} (HTTP {status})", check.url),
    }
}

/// Render `report` as an aligned text summary.
#[must_use]
pub fn render_summary(report: &RunReport) -> String {
    let mut lines = vec![format!(
        "sixer {} {}: {}",
        report.project,
        report.candidate,
        if report.is_success() { "PASS" } else { "FAIL" }
    )];
    for check in &report.dist_links {
        lines.push(format!("  {:<22} {}", "dist link", link_text(check)));
    }
    for check in &report.source_host_links {
        lines.push(format!("  {:<22} {}", "github link", link_text(check)));
    }
    for step in &report.steps {
        lines.push(format!(
            "  {:<22} {}",
            step_label(step.step),
            outcome_text(&step.outcome)
        ));
    }
    lines.join("\n")
}

/// Write `report` to `out`, as JSON when `json` is set.
///
/// # Errors
///
/// Returns an error if serialisation or writing fails.
pub fn write_report(out: &mut dyn Write, report: &RunReport, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)
    } else {
        writeln!(out, "{}", render_summary(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{RunState, StepReport};
    use crate::project::Project;

    fn report() -> RunReport {
        RunReport {
            project: Project::Dashboard,
            candidate: "2.11.0".to_owned(),
            state: RunState::Done,
            dist_links: vec![LinkCheck {
                url: "https://dist.test/dashboard-2.11.0".to_owned(),
                reachability: Reachability::Reachable,
            }],
            source_host_links: vec![LinkCheck {
                url: "https://git.test/commit/abc".to_owned(),
                reachability: Reachability::Unreachable { status: 404 },
            }],
            steps: vec![
                StepReport {
                    step: Step::Checksum,
                    outcome: StepOutcome::Passed {
                        detail: "sha512 digest matches".to_owned(),
                    },
                },
                StepReport {
                    step: Step::Signature,
                    outcome: StepOutcome::Skipped {
                        reason: "src tgz asc not fetched".to_owned(),
                    },
                },
            ],
        }
    }

    #[test]
    fn summary_lists_every_entry() {
        let text = render_summary(&report());
        assert!(text.starts_with("sixer apisix-dashboard 2.11.0: FAIL"));
        assert!(text.contains("ok ✅ https://dist.test/dashboard-2.11.0"));
        assert!(text.contains("(HTTP 404)"));
        assert!(text.contains("verify src tgz sha512"));
        assert!(text.contains("skipped (src tgz asc not fetched)"));
    }

    #[test]
    fn json_report_is_parseable() {
        let mut out = Vec::new();
        write_report(&mut out, &report(), true).expect("write");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("valid JSON");
        assert_eq!(value["project"], "dashboard");
        assert_eq!(value["state"], "done");
        assert_eq!(value["steps"][1]["outcome"], "skipped");
    }
}
