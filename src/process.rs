use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use crate::error::ExecutionError;

/// Exit code reported when the process was killed or ended by a signal.
pub const ABNORMAL_EXIT_CODE: i32 = -1;

/// How long pipes keep draining once the process is gone. A grandchild can
/// hold them open well past that.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Stdout lines, followed by stderr lines when anything was written there.
    pub fn combined_lines(&self) -> Vec<String> {
        combine_output(&self.stdout, &self.stderr)
    }
}

pub fn combine_output(stdout: &str, stderr: &str) -> Vec<String> {
    let mut lines: Vec<String> = stdout.split('\n').map(str::to_string).collect();

    if !stderr.is_empty() {
        lines.extend(stderr.split('\n').map(str::to_string));
    }

    lines
}

/// Runs an external command to completion, killing it after `kill_after`.
pub trait ProcessExecutor: Send + Sync {
    fn execute(
        &self,
        argv: &[String],
        kill_after: Duration,
    ) -> Result<ProcessOutput, ExecutionError>;
}

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Copies a pipe into a buffer that stays readable while the copy is running.
fn drain<R>(pipe: Option<R>) -> (SharedBuffer, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buffer = SharedBuffer::default();
    let sink = Arc::clone(&buffer);

    let task = tokio::spawn(async move {
        let Some(mut pipe) = pipe else {
            return;
        };
        let mut chunk = [0u8; 4096];

        loop {
            match pipe.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(read) => {
                    if let Ok(mut bytes) = sink.lock() {
                        bytes.extend_from_slice(&chunk[..read]);
                    }
                }
            }
        }
    });

    (buffer, task)
}

fn buffered_text(buffer: &SharedBuffer) -> String {
    buffer
        .lock()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Spawns real processes on a private single-threaded tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    async fn run(argv: &[String], kill_after: Duration) -> Result<ProcessOutput, ExecutionError> {
        let (program, args) = argv.split_first().ok_or(ExecutionError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                program: program.clone(),
                source,
            })?;

        let (stdout_buffer, stdout_task) = drain(child.stdout.take());
        let (stderr_buffer, stderr_task) = drain(child.stderr.take());

        let waited = tokio::time::timeout(kill_after, child.wait()).await;
        let (exit_code, note) = match waited {
            Ok(Ok(status)) => (status.code().unwrap_or(ABNORMAL_EXIT_CODE), None),
            Ok(Err(err)) => {
                log::warn!("lost track of `{program}`: {err}");
                (ABNORMAL_EXIT_CODE, Some(format!("{program}: {err}")))
            }
            Err(_) => {
                log::warn!("`{program}` killed after {}s", kill_after.as_secs());
                if let Err(err) = child.kill().await {
                    log::warn!("failed to kill `{program}`: {err}");
                }
                let note = format!("{program}: timed out after {}s", kill_after.as_secs());
                (ABNORMAL_EXIT_CODE, Some(note))
            }
        };

        let drained = async {
            let _ = tokio::join!(stdout_task, stderr_task);
        };
        if tokio::time::timeout(DRAIN_GRACE, drained).await.is_err() {
            log::debug!("`{program}` pipes still open, keeping partial output");
        }

        let mut stderr = buffered_text(&stderr_buffer);
        if let Some(note) = note {
            if !stderr.is_empty() && !stderr.ends_with('\n') {
                stderr.push('\n');
            }
            stderr.push_str(&note);
        }

        Ok(ProcessOutput {
            exit_code,
            stdout: buffered_text(&stdout_buffer),
            stderr,
        })
    }
}

impl ProcessExecutor for SystemExecutor {
    fn execute(
        &self,
        argv: &[String],
        kill_after: Duration,
    ) -> Result<ProcessOutput, ExecutionError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ExecutionError::Runtime)?;

        rt.block_on(Self::run(argv, kill_after))
    }
}
