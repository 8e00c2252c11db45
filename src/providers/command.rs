//! Thin wrapper around the `gh` / `glab` command line tools.
//!
//! Both tools expose an authenticated `api` subcommand that prints JSON, which
//! keeps token handling out of this crate.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::error::{Result, SkillError};

#[derive(Debug, Clone)]
pub struct CliRunner {
    /// Backend name used in error messages.
    backend: &'static str,
    binary: PathBuf,
}

impl CliRunner {
    pub fn new(backend: &'static str, binary: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            binary: binary.into(),
        }
    }

    #[must_use]
    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }

    /// Run `<binary> api <args..>` and return stdout.
    pub fn api(&self, args: &[&str]) -> Result<Vec<u8>> {
        self.run(args, None)
    }

    /// Run `<binary> api <args..> --input -` with `payload` on stdin.
    pub fn api_with_input(&self, args: &[&str], payload: &[u8]) -> Result<Vec<u8>> {
        self.run(args, Some(payload))
    }

    fn run(&self, args: &[&str], payload: Option<&[u8]>) -> Result<Vec<u8>> {
        let program = which::which(&self.binary).map_err(|err| {
            SkillError::backend(
                self.backend,
                format!("{} not found: {err}", self.binary.display()),
            )
        })?;

        let mut cmd = Command::new(program);
        cmd.arg("api").args(args);
        if payload.is_some() {
            cmd.args(["--input", "-"]);
        }
        debug!(backend = self.backend, command = %command_string(&cmd), "running backend command");

        cmd.stdin(if payload.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|err| {
            SkillError::backend(
                self.backend,
                format!("failed to execute {}: {err}", self.binary.display()),
            )
        })?;

        if let (Some(bytes), Some(mut stdin)) = (payload, child.stdin.take()) {
            stdin.write_all(bytes).map_err(|err| {
                SkillError::backend(self.backend, format!("failed to send request body: {err}"))
            })?;
        }

        let output = child.wait_with_output().map_err(|err| {
            SkillError::backend(
                self.backend,
                format!("failed to wait for {}: {err}", self.binary.display()),
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SkillError::backend(
                self.backend,
                format!("{} api {} failed: {}", self.binary.display(), args.join(" "), stderr.trim()),
            ));
        }
        trace!(backend = self.backend, bytes = output.stdout.len(), "backend command finished");
        Ok(output.stdout)
    }
}

fn command_string(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    for arg in cmd.get_args() {
        parts.push(arg.to_string_lossy().to_string());
    }
    parts.join(" ")
}
