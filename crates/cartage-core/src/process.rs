//! Blocking execution of external tools (`tar`, `diff`, vendoring commands).

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result};

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Build from a non-empty argv list.
    pub fn from_argv<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv
            .next()
            .ok_or_else(|| Error::configuration("Command line cannot be empty"))?;
        Ok(Self::new(program).args(argv))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }

    fn failure(&self, status: Option<i32>, output: String) -> Error {
        Error::ExternalCommand {
            command: self.to_string(),
            status,
            output,
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit status; `None` when terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs external commands to completion, echoing their output when verbose
/// and not quiet.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner {
    quiet: bool,
    verbose: bool,
}

impl CommandRunner {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn echoes(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Run `command` and capture its output without judging the exit status.
    pub fn capture(&self, command: &CommandLine) -> Result<CommandOutput> {
        tracing::debug!("{command}");
        let output = command
            .command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| command.failure(None, e.to_string()))?;
        Ok(output.into())
    }

    /// Run `command`, failing with [`Error::ExternalCommand`] on a non-zero
    /// exit status.
    pub fn run(&self, command: &CommandLine) -> Result<CommandOutput> {
        tracing::info!("{command}");
        let output = self.capture(command)?;
        self.echo(&output);

        if !output.success() {
            return Err(command.failure(output.status, output.combined()));
        }
        Ok(output)
    }

    /// Run `producer | consumer`. The consumer is checked first, then the
    /// producer.
    pub fn pipe(&self, producer: &CommandLine, consumer: &CommandLine) -> Result<()> {
        tracing::info!("{producer} | {consumer}");

        let mut source = producer
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| producer.failure(None, e.to_string()))?;

        let stdout = source
            .stdout
            .take()
            .ok_or_else(|| producer.failure(None, "stdout was not captured".to_string()))?;

        let sink = consumer
            .command()
            .stdin(Stdio::from(stdout))
            .output()
            .map_err(|e| consumer.failure(None, e.to_string()));

        let source = source
            .wait()
            .map_err(|e| producer.failure(None, e.to_string()))?;

        let sink = CommandOutput::from(sink?);
        self.echo(&sink);
        if !sink.success() {
            return Err(consumer.failure(sink.status, sink.combined()));
        }

        if !source.success() {
            return Err(producer.failure(source.code(), String::new()));
        }
        Ok(())
    }

    fn echo(&self, output: &CommandOutput) {
        if !self.echoes() {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(output.stdout.as_bytes());
        let _ = stdout.write_all(output.stderr.as_bytes());
    }
}
