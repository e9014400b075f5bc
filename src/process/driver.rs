// ABOUTME: Spawns child processes and drives them through a scripted dialog.
// ABOUTME: Collects a transcript, enforces a wall-clock limit and kills on drop.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::dialog::{Dialog, DialogCursor, DialogMatch, strip_ansi};
use super::transcript::{ExitCondition, Transcript};
use super::ProcessError;

/// Default wall-clock limit for a single invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const READ_CHUNK: usize = 8192;

/// Everything needed to run one command.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
    env: HashMap<String, String>,
    dialog: Dialog,
    dialog_required: bool,
    timeout: Option<Duration>,
    keystroke_delay: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            env: HashMap::new(),
            dialog: Dialog::new(),
            dialog_required: false,
            timeout: None,
            keystroke_delay: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn dialog(mut self, dialog: Dialog) -> Self {
        self.dialog = dialog;
        self
    }

    /// Treat unconsumed dialog entries as a failure in `Transcript::check_dialog`.
    pub fn require_dialog(mut self) -> Self {
        self.dialog_required = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn keystroke_delay(mut self, delay: Duration) -> Self {
        self.keystroke_delay = Some(delay);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &std::path::Path {
        &self.working_dir
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs invocations. Cheap to clone; holds only defaults.
#[derive(Debug, Clone)]
pub struct ProcessDriver {
    default_timeout: Duration,
    keystroke_delay: Duration,
}

impl Default for ProcessDriver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ProcessDriver {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            keystroke_delay: Duration::ZERO,
        }
    }

    /// Pause before each scripted token. Some prompt libraries drop input typed too early.
    pub fn with_keystroke_delay(mut self, delay: Duration) -> Self {
        self.keystroke_delay = delay;
        self
    }

    /// Run to completion and return the transcript.
    pub async fn run(&self, invocation: Invocation) -> Result<Transcript, ProcessError> {
        self.start(invocation)?.wait().await
    }

    /// Spawn and return immediately. The dialog is driven in the background.
    ///
    /// The child is killed when the returned handle is dropped, so a
    /// cancelled caller never leaves a stray process behind.
    pub fn start(&self, invocation: Invocation) -> Result<RunningProcess, ProcessError> {
        let program = invocation.program.clone();

        if !invocation.working_dir.is_dir() {
            return Err(ProcessError::Spawn {
                program,
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    format!(
                        "working directory {} does not exist",
                        invocation.working_dir.display()
                    ),
                ),
            });
        }

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .envs(&invocation.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;
        let pid = child.id();

        tracing::info!(
            pid = ?pid,
            cwd = %invocation.working_dir.display(),
            "Spawned {}",
            invocation.command_line()
        );

        let timeout = invocation.timeout.unwrap_or(self.default_timeout);
        let keystroke_delay = invocation.keystroke_delay.unwrap_or(self.keystroke_delay);
        let supervisor = Supervisor::new(invocation, timeout, keystroke_delay);

        let (kill_tx, kill_rx) = oneshot::channel();
        let handle = tokio::spawn(supervisor.run(child, kill_rx));

        Ok(RunningProcess {
            program,
            pid,
            kill: Some(kill_tx),
            handle,
        })
    }
}

/// Handle to a process started with `ProcessDriver::start`.
pub struct RunningProcess {
    program: String,
    pid: Option<u32>,
    kill: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Transcript>,
}

impl std::fmt::Debug for RunningProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningProcess")
            .field("program", &self.program)
            .field("pid", &self.pid)
            .finish()
    }
}

impl RunningProcess {
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the process to exit (or time out) and return its transcript.
    pub async fn wait(mut self) -> Result<Transcript, ProcessError> {
        (&mut self.handle)
            .await
            .map_err(|e| ProcessError::Supervisor {
                program: self.program.clone(),
                message: e.to_string(),
            })
    }

    /// Kill the process and return what it produced so far.
    pub async fn kill(mut self) -> Result<Transcript, ProcessError> {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
        self.wait().await
    }
}

impl Drop for RunningProcess {
    fn drop(&mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
    }
}

/// How the pump loop ended.
enum Ending {
    Exited(ExitStatus),
    Failed(io::Error),
    TimedOut,
    Killed,
}

/// Owns the I/O side of one child: reads output, answers prompts, records lines.
struct Supervisor {
    program: String,
    command_line: String,
    cursor: DialogCursor,
    dialog_required: bool,
    timeout: Duration,
    keystroke_delay: Duration,
    stdin: Option<ChildStdin>,
    stdout_buf: LineBuffer,
    stderr_buf: LineBuffer,
    stdout: Vec<String>,
    stderr: Vec<String>,
    /// Visible text of the current stdout line already consumed by dialog matches.
    scanned: String,
}

impl Supervisor {
    fn new(invocation: Invocation, timeout: Duration, keystroke_delay: Duration) -> Self {
        Self {
            command_line: invocation.command_line(),
            program: invocation.program,
            cursor: DialogCursor::new(invocation.dialog),
            dialog_required: invocation.dialog_required,
            timeout,
            keystroke_delay,
            stdin: None,
            stdout_buf: LineBuffer::default(),
            stderr_buf: LineBuffer::default(),
            stdout: Vec::new(),
            stderr: Vec::new(),
            scanned: String::new(),
        }
    }

    async fn run(mut self, mut child: Child, mut kill: oneshot::Receiver<()>) -> Transcript {
        let started = Instant::now();

        // Non-interactive commands see EOF instead of blocking on input.
        let interactive = !self.cursor.is_complete();
        self.stdin = child.stdin.take().filter(|_| interactive);
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let ending = match (stdout, stderr) {
            (Some(stdout), Some(stderr)) => {
                let limit = self.timeout;
                tokio::select! {
                    result = tokio::time::timeout(limit, self.pump(&mut child, stdout, stderr)) => {
                        match result {
                            Ok(Ok(status)) => Ending::Exited(status),
                            Ok(Err(e)) => Ending::Failed(e),
                            Err(_) => Ending::TimedOut,
                        }
                    }
                    _ = &mut kill => Ending::Killed,
                }
            }
            _ => Ending::Failed(io::Error::other("child output was not captured")),
        };

        let exit = match ending {
            Ending::Exited(status) => ExitCondition::from(status),
            Ending::TimedOut => {
                terminate(&mut child).await;
                tracing::warn!(
                    "{} timed out after {}s, killed",
                    self.command_line,
                    self.timeout.as_secs()
                );
                ExitCondition::TimedOut
            }
            Ending::Killed => {
                terminate(&mut child).await;
                tracing::debug!("{} killed on request", self.command_line);
                ExitCondition::Killed
            }
            Ending::Failed(e) => {
                tracing::warn!("I/O error while driving {}: {}", self.command_line, e);
                terminate(&mut child)
                    .await
                    .map(ExitCondition::from)
                    .unwrap_or(ExitCondition::Signal)
            }
        };

        // Keep whatever was buffered when the process was cut off.
        self.flush_stdout().await;
        if let Some(line) = self.stderr_buf.finish() {
            self.record_stderr(line);
        }

        let elapsed = started.elapsed();
        tracing::info!(
            elapsed_ms = elapsed.as_millis() as u64,
            "{} finished: {}",
            self.command_line,
            exit
        );

        let pending_prompts = self
            .cursor
            .pending()
            .iter()
            .map(|entry| entry.matcher.describe())
            .collect::<Vec<_>>();
        if !pending_prompts.is_empty() {
            tracing::debug!(
                "{} left {} dialog entries unconsumed",
                self.command_line,
                pending_prompts.len()
            );
        }

        Transcript {
            program: self.program,
            stdout: self.stdout,
            stderr: self.stderr,
            exit,
            pending_prompts,
            dialog_required: self.dialog_required,
            timeout: self.timeout,
            elapsed,
        }
    }

    async fn pump(
        &mut self,
        child: &mut Child,
        mut stdout: ChildStdout,
        mut stderr: ChildStderr,
    ) -> io::Result<ExitStatus> {
        let mut out_chunk = vec![0u8; READ_CHUNK];
        let mut err_chunk = vec![0u8; READ_CHUNK];
        let mut out_open = true;
        let mut err_open = true;

        while out_open || err_open {
            tokio::select! {
                read = stdout.read(&mut out_chunk), if out_open => {
                    let n = read?;
                    if n == 0 {
                        out_open = false;
                        self.flush_stdout().await;
                    } else {
                        self.on_stdout(&out_chunk[..n]).await;
                    }
                }
                read = stderr.read(&mut err_chunk), if err_open => {
                    let n = read?;
                    if n == 0 {
                        err_open = false;
                        if let Some(line) = self.stderr_buf.finish() {
                            self.record_stderr(line);
                        }
                    } else {
                        for line in self.stderr_buf.push(&err_chunk[..n]) {
                            self.record_stderr(line);
                        }
                    }
                }
            }
        }

        child.wait().await
    }

    async fn on_stdout(&mut self, chunk: &[u8]) {
        for line in self.stdout_buf.push(chunk) {
            self.complete_line(line).await;
        }

        // Prompts usually end without a newline; test the partial line too.
        let partial = self.stdout_buf.partial();
        let rest = self.unscanned(&partial);
        if !rest.is_empty() {
            let matches = self.cursor.scan(rest);
            if let Some(last) = matches.last() {
                let consumed = partial.len() - rest.len() + last.end;
                self.scanned = partial.get(..consumed).unwrap_or_default().to_string();
            }
            self.respond(matches).await;
        }
    }

    /// The part of `visible` not yet scanned. A carriage-return redraw
    /// replaces the visible line, so all of it is scanned again.
    fn unscanned<'a>(&mut self, visible: &'a str) -> &'a str {
        match visible.strip_prefix(self.scanned.as_str()) {
            Some(rest) => rest,
            None => {
                self.scanned.clear();
                visible
            }
        }
    }

    async fn flush_stdout(&mut self) {
        if let Some(line) = self.stdout_buf.finish() {
            self.complete_line(line).await;
        }
    }

    async fn complete_line(&mut self, line: String) {
        let rest = self.unscanned(&line);
        let matches = self.cursor.scan(rest);
        self.scanned.clear();

        tracing::info!(target: "zkapp_harness::child", stream = "stdout", "{}", line);
        self.stdout.push(line);
        self.respond(matches).await;
    }

    fn record_stderr(&mut self, line: String) {
        tracing::info!(target: "zkapp_harness::child", stream = "stderr", "{}", line);
        self.stderr.push(line);
    }

    async fn respond(&mut self, matches: Vec<DialogMatch>) {
        for m in matches {
            tracing::debug!(
                "{}: dialog entry {} matched, sending {} token(s)",
                self.program,
                m.index,
                m.responses.len()
            );
            for token in &m.responses {
                if !self.keystroke_delay.is_zero() {
                    tokio::time::sleep(self.keystroke_delay).await;
                }
                self.write_stdin(token.bytes()).await;
            }
        }
    }

    async fn write_stdin(&mut self, bytes: &[u8]) {
        let Some(stdin) = self.stdin.as_mut() else {
            tracing::debug!("{}: stdin closed, dropping scripted input", self.program);
            return;
        };

        let result = match stdin.write_all(bytes).await {
            Ok(()) => stdin.flush().await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            // The child exited or closed its input; later tokens have nowhere to go.
            tracing::warn!("{}: failed to write to stdin: {}", self.program, e);
            self.stdin = None;
        }
    }
}

/// Kill the child if still running and reap it.
async fn terminate(child: &mut Child) -> Option<ExitStatus> {
    let _ = child.start_kill();
    child.wait().await.ok()
}

/// Splits a byte stream into cleaned text lines.
#[derive(Debug, Default)]
struct LineBuffer {
    raw: Vec<u8>,
}

impl LineBuffer {
    /// Append a chunk and return every line it completed.
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.raw.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.raw.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.raw.drain(..=pos).collect();
            lines.push(clean(&line[..pos]));
        }
        lines
    }

    /// The unterminated tail, cleaned.
    fn partial(&self) -> String {
        clean(&self.raw)
    }

    /// Take the unterminated tail at end of stream.
    fn finish(&mut self) -> Option<String> {
        if self.raw.is_empty() {
            return None;
        }
        let line = clean(&self.raw);
        self.raw.clear();
        Some(line)
    }
}

/// Decode, drop escape sequences, and keep only what a terminal would show
/// after carriage-return redraws.
fn clean(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_suffix('\r').unwrap_or(&text);
    let text = strip_ansi(text);
    match text.rsplit('\r').find(|segment| !segment.trim().is_empty()) {
        Some(segment) => segment.to_string(),
        None => text.replace('\r', ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_buffer_splits_and_keeps_partial() {
        let mut buf = LineBuffer::default();
        assert_eq!(buf.push(b"one\ntw"), vec!["one".to_string()]);
        assert_eq!(buf.partial(), "tw");
        assert_eq!(buf.push(b"o\r\nthree"), vec!["two".to_string()]);
        assert_eq!(buf.finish(), Some("three".to_string()));
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn clean_keeps_last_redraw() {
        assert_eq!(clean(b"\x1b[36m- Building\r\x1b[32m\xe2\x9c\x94 Built"), "\u{2714} Built");
        assert_eq!(clean(b"plain\r"), "plain");
    }

    #[test]
    fn redraw_rescans_the_visible_line() {
        let mut supervisor =
            Supervisor::new(Invocation::new("zk", "/tmp"), Duration::from_secs(1), Duration::ZERO);
        supervisor.scanned = "first?".to_string();
        assert_eq!(supervisor.unscanned("first? more"), " more");
        assert_eq!(supervisor.unscanned("second? "), "second? ");
        assert!(supervisor.scanned.is_empty());
    }

    #[test]
    fn command_line_joins_args() {
        let inv = Invocation::new("zk", "/tmp").arg("deploy").arg("alias").arg("--yes");
        assert_eq!(inv.command_line(), "zk deploy alias --yes");
    }
}
