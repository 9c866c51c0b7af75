//! Shared test utilities for the verifier crate.

use crate::exec::{CommandExecutor, ExecError};
use crate::http::{HttpClient, HttpResponse, TransportError};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(2),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "gpg").
    pub cmd: &'static str,
    /// The arguments to pass to the command.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output, ExecError>,
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output, ExecError> {
        let mut expected = self.expected.borrow_mut();
        let call = expected.pop_front().expect("unexpected command invocation");

        assert_eq!(call.cmd, cmd);
        assert_eq!(call.args, args);

        call.result
    }
}

/// What a [`StubHttpClient`] answers for a URL.
#[derive(Debug, Clone)]
pub enum StubRoute {
    /// Answer with this status and body.
    Respond(u16, Vec<u8>),
    /// Fail below the HTTP layer.
    Fail(&'static str),
}

/// An in-memory `HttpClient` that serves fixed routes and counts requests.
///
/// Unknown URLs answer `404` with an empty body.
#[derive(Debug, Default)]
pub struct StubHttpClient {
    routes: HashMap<String, StubRoute>,
    heads: RefCell<Vec<String>>,
    gets: RefCell<Vec<String>>,
}

impl StubHttpClient {
    /// Creates a client with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` with status `200` at `url`.
    pub fn serve(&mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.routes
            .insert(url.into(), StubRoute::Respond(200, body.into()));
    }

    /// Answers `url` with `route`.
    pub fn route(&mut self, url: impl Into<String>, route: StubRoute) {
        self.routes.insert(url.into(), route);
    }

    /// Number of GET requests issued so far.
    pub fn get_count(&self) -> usize {
        self.gets.borrow().len()
    }

    /// Number of HEAD requests issued so far.
    pub fn head_count(&self) -> usize {
        self.heads.borrow().len()
    }

    /// URLs requested with HEAD, in order.
    pub fn heads(&self) -> Vec<String> {
        self.heads.borrow().clone()
    }

    fn answer(&self, url: &str) -> Result<HttpResponse, TransportError> {
        match self.routes.get(url) {
            Some(StubRoute::Respond(status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            Some(StubRoute::Fail(reason)) => Err(TransportError::new(url, *reason)),
            None => Ok(HttpResponse {
                status: 404,
                body: Vec::new(),
            }),
        }
    }
}

impl HttpClient for StubHttpClient {
    fn head(&self, url: &str) -> Result<u16, TransportError> {
        self.heads.borrow_mut().push(url.to_owned());
        self.answer(url).map(|response| response.status)
    }

    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.gets.borrow_mut().push(url.to_owned());
        self.answer(url)
    }
}
