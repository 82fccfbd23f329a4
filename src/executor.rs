use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A validated command, ready to be spawned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: String,
    /// Executable file to launch instead of resolving `command` on PATH
    pub command_path: Option<PathBuf>,
    pub working_directory: Option<PathBuf>,
    pub arguments: Vec<String>,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// The executable actually launched: `command_path` when set, else `command`
    pub fn program(&self) -> String {
        match self.command_path {
            Some(ref path) => path.display().to_string(),
            None => self.command.clone(),
        }
    }
}

/// Exit code and combined stdout/stderr lines of a finished process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub exit_code: i32,
    pub output: Vec<String>,
}

impl CommandResult {
    /// Synthetic result reported when execution itself failed
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            exit_code: -1,
            output: vec!["Error".to_string(), message.into()],
        }
    }
}

/// Receives every output line as it is read from the child
pub trait OutputSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Forwards output lines to `tracing` at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn line(&self, line: &str) {
        tracing::debug!(target: "process_output", "{}", line);
    }
}

/// Spawn the command, drain its combined output and wait for it to exit.
///
/// No timeout is applied: a child that never closes its output blocks the
/// caller until it does.
pub fn execute(spec: &CommandSpec, sink: &dyn OutputSink) -> Result<CommandResult> {
    tracing::info!(
        command = %spec.command,
        program = %spec.program(),
        args = ?spec.arguments,
        working_directory = ?spec.working_directory,
        "starting process"
    );

    let (reader, writer) = io::pipe().map_err(pipe_error)?;
    let stderr_writer = writer.try_clone().map_err(pipe_error)?;

    let mut cmd = build_command(spec);
    cmd.stdin(Stdio::null())
        .stdout(writer)
        .stderr(stderr_writer);

    let spawned = cmd.spawn();
    // The command still owns both write ends; reading would never see EOF.
    drop(cmd);
    let mut child = spawned.map_err(|source| Error::Spawn {
        program: spec.program(),
        directory: spec.working_directory.clone(),
        source,
    })?;

    let output = match read_output(reader, sink) {
        Ok(lines) => lines,
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            let context = format!("failed to read output of `{}`", spec.program());
            return Err(Error::io(context, e));
        }
    };

    let status = child.wait().map_err(|e| {
        if e.kind() == io::ErrorKind::Interrupted {
            Error::Interrupted(spec.program())
        } else {
            Error::io(format!("failed to wait for `{}`", spec.program()), e)
        }
    })?;

    let exit_code = exit_code(status);
    tracing::info!(command = %spec.command, exit_code, lines = output.len(), "process exited");
    Ok(CommandResult { exit_code, output })
}

fn pipe_error(e: io::Error) -> Error {
    Error::io("failed to set up the output pipe", e)
}

fn build_command(spec: &CommandSpec) -> Command {
    let mut cmd = match spec.command_path {
        Some(ref path) => {
            let mut cmd = Command::new(path);
            #[cfg(unix)]
            {
                use std::os::unix::process::CommandExt;
                cmd.arg0(&spec.command);
            }
            cmd
        }
        None => Command::new(&spec.command),
    };
    cmd.args(&spec.arguments);

    if let Some(ref dir) = spec.working_directory {
        cmd.current_dir(dir);
    }
    cmd
}

/// Read a stream to EOF, one entry per line, forwarding each line to `sink`.
///
/// A line ends at `\n`, `\r` or `\r\n`; terminators are stripped and invalid
/// UTF-8 is replaced. A trailing line without a terminator still yields an
/// entry; an empty stream yields no entries.
pub fn read_output<R: Read>(stream: R, sink: &dyn OutputSink) -> io::Result<Vec<String>> {
    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    let mut line = Vec::new();
    // A `\r` ended the previous line; a `\n` right after it belongs to the same terminator.
    let mut after_cr = false;

    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            break;
        }
        let len = available.len();

        for &byte in available {
            if after_cr {
                after_cr = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' => push_line(&mut lines, &mut line, sink),
                b'\r' => {
                    push_line(&mut lines, &mut line, sink);
                    after_cr = true;
                }
                _ => line.push(byte),
            }
        }
        reader.consume(len);
    }

    if !line.is_empty() {
        push_line(&mut lines, &mut line, sink);
    }
    Ok(lines)
}

fn push_line(lines: &mut Vec<String>, line: &mut Vec<u8>, sink: &dyn OutputSink) {
    let text = String::from_utf8_lossy(line).into_owned();
    line.clear();
    sink.line(&text);
    lines.push(text);
}

/// Exit code of the child, `128 + signal` when it was killed by a signal
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
