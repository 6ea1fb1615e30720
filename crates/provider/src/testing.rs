//! Testing utilities for provider tests.
//!
//! Fakes for the collaborators providers depend on, plus fixture loading.
//! Available when running tests or when the `test-utils` feature is enabled.
//!
//! # Example
//! ```ignore
//! use kconnect_provider::testing::{FakeCommandRunner, FakeHttpClient, load_fixture};
//!
//! let http = FakeHttpClient::new()
//!     .respond_json("openid-configuration", 200, &load_fixture("aad/openid_configuration.json"));
//! let runner = FakeCommandRunner::new().missing_executable();
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::BoxError;
use crate::exec::{CommandError, CommandInvocation, CommandOutput, CommandRunner, StdioMode};
use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::plugins::aws::eks::{DescribeClusterRequest, EksApi, EksCluster};
use crate::plugins::aws::iam::{AwsCredentialSource, AwsCredentials};

/// Load a JSON fixture file from the fixtures directory.
///
/// # Panics
/// - If the fixture file cannot be read
/// - If the file content is not valid JSON
pub fn load_fixture(fixture_path: &str) -> serde_json::Value {
    serde_json::from_str(&load_fixture_str(fixture_path)).expect("Invalid JSON in fixture")
}

/// Load a fixture file as raw text.
pub fn load_fixture_str(fixture_path: &str) -> String {
    let full_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(fixture_path);
    std::fs::read_to_string(&full_path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", full_path.display()))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
enum HttpOutcome {
    Response(HttpResponse),
    Connection(String),
}

/// [`HttpClient`] answering from routes matched by URL substring.
///
/// Unmatched requests get a 404.
#[derive(Debug, Default)]
pub struct FakeHttpClient {
    routes: Vec<(String, HttpOutcome)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url_contains: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes.push((
            url_contains.to_string(),
            HttpOutcome::Response(HttpResponse {
                status,
                body: body.into(),
            }),
        ));
        self
    }

    pub fn respond_json(self, url_contains: &str, status: u16, body: &serde_json::Value) -> Self {
        self.respond(url_contains, status, body.to_string())
    }

    /// Fail requests to matching URLs with a connection error.
    pub fn fail(mut self, url_contains: &str, message: &str) -> Self {
        self.routes.push((
            url_contains.to_string(),
            HttpOutcome::Connection(message.to_string()),
        ));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl HttpClient for FakeHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        lock(&self.requests).push(request.clone());

        let outcome = self
            .routes
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern.as_str()))
            .map(|(_, outcome)| outcome.clone());

        match outcome {
            Some(HttpOutcome::Response(response)) => Ok(response),
            Some(HttpOutcome::Connection(message)) => Err(HttpError::Connection(message)),
            None => Ok(HttpResponse {
                status: 404,
                body: format!("no fake route for {}", request.url),
            }),
        }
    }
}

/// A command observed by [`FakeCommandRunner`], secrets redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub program: String,
    pub args: Vec<String>,
    pub stdio: StdioMode,
}

impl RecordedCommand {
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_interactive(&self) -> bool {
        self.stdio == StdioMode::Inherited
    }
}

#[derive(Debug, Clone)]
enum CommandOutcome {
    Output(CommandOutput),
    SpawnError,
}

#[derive(Debug, Clone)]
struct CommandRule {
    args_prefix: Vec<String>,
    stdio: Option<StdioMode>,
    outcome: CommandOutcome,
}

/// [`CommandRunner`] answering from rules matched by argument prefix.
///
/// Unmatched invocations exit with status 127.
#[derive(Debug, Default)]
pub struct FakeCommandRunner {
    rules: Vec<CommandRule>,
    spawn_always_fails: bool,
    calls: Mutex<Vec<RecordedCommand>>,
}

impl FakeCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn rule(
        mut self,
        args_prefix: &[&str],
        stdio: Option<StdioMode>,
        outcome: CommandOutcome,
    ) -> Self {
        self.rules.push(CommandRule {
            args_prefix: args_prefix.iter().map(|s| s.to_string()).collect(),
            stdio,
            outcome,
        });
        self
    }

    /// Make invocations starting with `args_prefix` succeed with `stdout`.
    pub fn succeed(self, args_prefix: &[&str], stdio: Option<StdioMode>, stdout: &str) -> Self {
        self.rule(
            args_prefix,
            stdio,
            CommandOutcome::Output(CommandOutput {
                code: Some(0),
                success: true,
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        )
    }

    /// Make invocations starting with `args_prefix` exit with `code`.
    pub fn fail(
        self,
        args_prefix: &[&str],
        stdio: Option<StdioMode>,
        code: i32,
        stderr: &str,
    ) -> Self {
        self.rule(
            args_prefix,
            stdio,
            CommandOutcome::Output(CommandOutput {
                code: Some(code),
                success: false,
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        )
    }

    /// Make invocations starting with `args_prefix` fail to spawn.
    pub fn spawn_error(self, args_prefix: &[&str], stdio: Option<StdioMode>) -> Self {
        self.rule(args_prefix, stdio, CommandOutcome::SpawnError)
    }

    /// Behave as if the program is not installed.
    pub fn missing_executable(mut self) -> Self {
        self.spawn_always_fails = true;
        self
    }

    /// `az login --username ...` succeeds.
    pub fn password_login_succeeds(self) -> Self {
        self.succeed(&["login"], Some(StdioMode::Captured), "[]")
    }

    /// `az login --username ...` exits non-zero.
    pub fn password_login_fails(self, stderr: &str) -> Self {
        self.fail(&["login"], Some(StdioMode::Captured), 1, stderr)
    }

    /// Interactive `az login --tenant ...` succeeds.
    pub fn interactive_login_succeeds(self) -> Self {
        self.succeed(&["login"], Some(StdioMode::Inherited), "")
    }

    /// Interactive `az login --tenant ...` exits non-zero.
    pub fn interactive_login_fails(self) -> Self {
        self.fail(&["login"], Some(StdioMode::Inherited), 1, "")
    }

    /// `az account get-access-token` prints `stdout`.
    pub fn access_token(self, stdout: &str) -> Self {
        self.succeed(&["account", "get-access-token"], None, stdout)
    }

    pub fn calls(&self) -> Vec<RecordedCommand> {
        lock(&self.calls).clone()
    }

    pub fn interactive_calls(&self) -> usize {
        lock(&self.calls).iter().filter(|c| c.is_interactive()).count()
    }
}

#[async_trait]
impl CommandRunner for FakeCommandRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput, CommandError> {
        let args = invocation.redacted_args();
        lock(&self.calls).push(RecordedCommand {
            program: invocation.program().to_string(),
            args: args.clone(),
            stdio: invocation.stdio_mode(),
        });

        if self.spawn_always_fails {
            return Err(CommandError::Spawn {
                program: invocation.program().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let rule = self.rules.iter().find(|rule| {
            args.starts_with(&rule.args_prefix)
                && rule.stdio.is_none_or(|stdio| stdio == invocation.stdio_mode())
        });

        match rule.map(|r| r.outcome.clone()) {
            Some(CommandOutcome::Output(output)) => Ok(output),
            Some(CommandOutcome::SpawnError) => Err(CommandError::Spawn {
                program: invocation.program().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
            None => Ok(CommandOutput {
                code: Some(127),
                success: false,
                stdout: String::new(),
                stderr: format!("no fake rule for '{}'", invocation),
            }),
        }
    }
}

/// [`EksApi`] returning a fixed cluster or error.
#[derive(Debug)]
pub struct FakeEksApi {
    result: Result<EksCluster, String>,
    requests: Mutex<Vec<(String, String)>>,
}

impl FakeEksApi {
    pub fn returning(cluster: EksCluster) -> Self {
        Self {
            result: Ok(cluster),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `(region, cluster name)` of every call.
    pub fn requests(&self) -> Vec<(String, String)> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl EksApi for FakeEksApi {
    async fn describe_cluster(
        &self,
        request: &DescribeClusterRequest,
    ) -> Result<EksCluster, BoxError> {
        lock(&self.requests).push((request.region.clone(), request.name.clone()));
        self.result.clone().map_err(BoxError::from)
    }
}

/// [`AwsCredentialSource`] returning fixed credentials or an error.
pub struct FakeCredentialSource {
    result: Result<AwsCredentials, String>,
    calls: Mutex<Vec<(Option<String>, Option<String>)>>,
}

impl FakeCredentialSource {
    pub fn returning(credentials: AwsCredentials) -> Self {
        Self {
            result: Ok(credentials),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(profile, region)` of every call.
    pub fn calls(&self) -> Vec<(Option<String>, Option<String>)> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl AwsCredentialSource for FakeCredentialSource {
    async fn load(
        &self,
        profile: Option<&str>,
        region: Option<&str>,
    ) -> Result<AwsCredentials, BoxError> {
        lock(&self.calls).push((profile.map(str::to_string), region.map(str::to_string)));
        self.result.clone().map_err(BoxError::from)
    }
}
