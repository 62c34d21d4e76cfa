//! Background save and build jobs.
//!
//! Jobs run on their own thread and report a single [`WorkerUpdate`] over a
//! channel. They never touch session state; the controller applies the
//! outcome through [`crate::EditorController::handle_update`].

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use pts_persistence::{content_signature, write_text};

use crate::config::BuildConfig;
use crate::error::WorkerError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Outcome of a background job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerUpdate {
    Saved {
        chip: &'static str,
        path: PathBuf,
        signature: String,
    },
    SaveFailed {
        chip: &'static str,
        path: PathBuf,
        message: String,
    },
    BuildFinished {
        output: PathBuf,
        elapsed: Duration,
    },
    BuildFailed {
        message: String,
    },
}

/// Write `text` to `path` on a worker thread.
pub fn spawn_save(
    chip: &'static str,
    path: PathBuf,
    text: String,
    sender: Sender<WorkerUpdate>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let update = match write_text(&path, &text) {
            Ok(()) => WorkerUpdate::Saved {
                chip,
                signature: content_signature(&text),
                path,
            },
            Err(error) => WorkerUpdate::SaveFailed {
                chip,
                path,
                message: error.user_message(),
            },
        };
        let _ = sender.send(update);
    })
}

/// Compile `input` into `output` on a worker thread.
pub fn spawn_build(
    config: BuildConfig,
    input: PathBuf,
    output: PathBuf,
    sender: Sender<WorkerUpdate>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let update = match run_build(&config, &input, &output) {
            Ok(elapsed) => WorkerUpdate::BuildFinished { output, elapsed },
            Err(error) => WorkerUpdate::BuildFailed {
                message: error.to_string(),
            },
        };
        let _ = sender.send(update);
    })
}

/// Run the configured compiler and check that it produced `output`.
pub fn run_build(config: &BuildConfig, input: &Path, output: &Path) -> Result<Duration, WorkerError> {
    let start = Instant::now();
    let args = config.resolved_args(input, output);
    tracing::info!(program = %config.program, input = %input.display(), "Starting build");

    run_with_timeout(&config.program, &args, config.timeout())?;

    if !output.exists() {
        return Err(WorkerError::MissingOutput {
            path: output.to_path_buf(),
        });
    }
    let elapsed = start.elapsed();
    tracing::info!(output = %output.display(), elapsed_ms = elapsed.as_millis(), "Build finished");
    Ok(elapsed)
}

/// Run `program` to completion, killing it once `timeout` has passed.
pub fn run_with_timeout(program: &str, args: &[String], timeout: Duration) -> Result<(), WorkerError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| WorkerError::Spawn {
            program: program.to_string(),
            source,
        })?;

    // Drained on a thread so a chatty child cannot block on a full pipe.
    let stderr_reader = child.stderr.take().map(|mut stderr| {
        std::thread::spawn(move || {
            let mut buffer = String::new();
            let _ = stderr.read_to_string(&mut buffer);
            buffer
        })
    });
    let collect_stderr = |reader: Option<JoinHandle<String>>| {
        reader
            .and_then(|handle| handle.join().ok())
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    };

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program, secs = timeout.as_secs(), "Killed after timeout");
                return Err(WorkerError::Timeout {
                    program: program.to_string(),
                    secs: timeout.as_secs(),
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(WorkerError::Wait {
                    program: program.to_string(),
                    source,
                });
            }
        }
    };

    let stderr = collect_stderr(stderr_reader);
    if status.success() {
        Ok(())
    } else {
        Err(WorkerError::Exit {
            program: program.to_string(),
            status: status.to_string(),
            stderr,
        })
    }
}
