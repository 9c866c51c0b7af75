//! Reachability probes for published links.
//!
//! A probe issues a single HEAD request and classifies the answer. Only a
//! `200` counts as reachable; any other status is an unreachable link rather
//! than an error, and transport failures are surfaced to the caller.

use log::{error, info, warn};
use serde::Serialize;

use crate::http::{HttpClient, TransportError};

const HTTP_OK: u16 = 200;

/// Classification of a link that answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Reachability {
    /// The link answered `200 OK`.
    Reachable,
    /// The link answered with another status.
    Unreachable {
        /// The status that was returned.
        status: u16,
    },
}

impl Reachability {
    /// Return whether the link answered `200 OK`.
    #[must_use]
    pub fn is_reachable(self) -> bool {
        matches!(self, Self::Reachable)
    }
}

/// The outcome of probing one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCheck {
    /// The probed URL.
    pub url: String,
    /// How the link answered.
    pub reachability: Reachability,
}

/// Probe `url` with a HEAD request.
///
/// # Errors
///
/// Returns [`TransportError`] when no response arrives within the client's
/// timeout.
pub fn probe(client: &dyn HttpClient, url: &str) -> Result<Reachability, TransportError> {
    let status = client.head(url)?;
    if status == HTTP_OK {
        Ok(Reachability::Reachable)
    } else {
        Ok(Reachability::Unreachable { status })
    }
}

/// Probe every link in order, logging each outcome under `label`.
///
/// All links are probed even after a transport failure so that the log shows
/// every outcome; the first transport error is then returned.
///
/// # Errors
///
/// Returns the first [`TransportError`] encountered.
pub fn check_links(
    client: &dyn HttpClient,
    label: &str,
    links: &[String],
) -> Result<Vec<LinkCheck>, TransportError> {
    let mut checks = Vec::with_capacity(links.len());
    let mut first_error = None;

    for url in links {
        match probe(client, url) {
            Ok(reachability) => {
                if reachability.is_reachable() {
                    info!("{label} {url} validate ok ✅");
                } else {
                    warn!("{label} {url} validate bad ❌ ({reachability:?})");
                }
                checks.push(LinkCheck {
                    url: url.clone(),
                    reachability,
                });
            }
            Err(err) => {
                error!("{label} {url} validate bad ❌ {err}");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(checks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use rstest::rstest;

    #[rstest]
    #[case::ok(200, Reachability::Reachable)]
    #[case::not_found(404, Reachability::Unreachable { status: 404 })]
    #[case::redirect(301, Reachability::Unreachable { status: 301 })]
    #[case::server_error(503, Reachability::Unreachable { status: 503 })]
    fn probe_classifies_status(#[case] status: u16, #[case] expected: Reachability) {
        let mut client = MockHttpClient::new();
        client
            .expect_head()
            .withf(|url| url.ends_with("/a"))
            .times(1)
            .returning(move |_| Ok(status));

        let result = probe(&client, "https://dist.test/a").expect("probe should answer");
        assert_eq!(result, expected);
    }

    #[test]
    fn probe_surfaces_transport_errors() {
        let mut client = MockHttpClient::new();
        client
            .expect_head()
            .returning(|url| Err(TransportError::new(url, "timed out")));

        let result = probe(&client, "https://dist.test/a");
        assert!(matches!(result, Err(TransportError { .. })));
    }

    #[test]
    fn check_links_reports_unreachable_without_failing() {
        let mut client = MockHttpClient::new();
        client.expect_head().returning(|url| {
            if url.ends_with("missing") {
                Ok(404)
            } else {
                Ok(200)
            }
        });

        let links = vec![
            "https://dist.test/present".to_owned(),
            "https://dist.test/missing".to_owned(),
        ];
        let checks = check_links(&client, "dist", &links).expect("no transport errors");
        assert_eq!(checks.len(), 2);
        assert!(checks.first().is_some_and(|c| c.reachability.is_reachable()));
        assert!(checks.last().is_some_and(|c| !c.reachability.is_reachable()));
    }

    #[test]
    fn check_links_probes_every_link_before_returning_first_error() {
        let mut client = MockHttpClient::new();
        client
            .expect_head()
            .times(3)
            .returning(|url| {
                if url.ends_with("first") || url.ends_with("second") {
                    Err(TransportError::new(url, "connection reset"))
                } else {
                    Ok(200)
                }
            });

        let links = vec![
            "https://dist.test/first".to_owned(),
            "https://dist.test/second".to_owned(),
            "https://dist.test/third".to_owned(),
        ];
        let err = check_links(&client, "dist", &links).expect_err("transport error expected");
        assert_eq!(err.url, "https://dist.test/first");
    }
}
