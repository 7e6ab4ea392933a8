//! Launching the external simulation binary and tailing its progress.

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::mpsc::{Receiver, channel};
use std::thread::{self, JoinHandle};

use tr_deffile::{prepare_for_run, save_lines};

use crate::document::DefDocument;
use crate::error::{AppError, AppResult};
use crate::progress::{ProgressUpdate, parse_progress_line};

/// Name of the external fitting binary.
pub const SIM_PROGRAM: &str = "tirific";

/// Messages emitted by the run worker to the control thread.
#[derive(Debug, Clone)]
pub enum RunMessage {
    /// Loop-index progress from the binary's output stream.
    Progress { loops_done: usize, loops_total: usize },
    /// A raw output line, for the log view.
    Output(String),
    Finished { message: String },
    Error { message: String },
}

/// A running simulation: progress events plus the tail worker's handle.
/// The child is never blocked on; dropping this leaves it running.
#[derive(Debug)]
pub struct SimRun {
    pub events: Receiver<RunMessage>,
    pub loops_total: usize,
    _handle: JoinHandle<()>,
}

/// Save the document, rewrite the fit controls for an unattended run,
/// check the INSET data cube exists, then spawn the binary and tail its
/// stdout on a worker thread.
pub fn start_run(doc: &mut DefDocument) -> AppResult<SimRun> {
    let cube = doc.inset_path();
    if !cube.is_file() {
        return Err(AppError::MissingDataCube {
            inset: doc.inset().to_string(),
            path: cube,
        });
    }

    doc.save()?;
    let run_lines = prepare_for_run(&doc_lines(doc)?);
    save_lines(doc.path(), &run_lines)?;

    let loops_total = doc.loops();
    let mut child = Command::new(SIM_PROGRAM)
        .arg("deffile=")
        .arg(doc.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| AppError::ExternalProcessUnavailable {
            program: SIM_PROGRAM.to_string(),
        })?;
    tracing::info!(path = %doc.path().display(), loops = loops_total, "simulation started");

    let stdout = child.stdout.take();
    let (tx, rx) = channel();
    let handle = thread::spawn(move || {
        let Some(stdout) = stdout else {
            let _ = tx.send(RunMessage::Error {
                message: "simulation stdout unavailable".to_string(),
            });
            return;
        };
        for line in BufReader::new(stdout).lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    let _ = tx.send(RunMessage::Error {
                        message: format!("progress stream error: {e}"),
                    });
                    break;
                }
            };
            match parse_progress_line(&line) {
                Some(ProgressUpdate::Loop { done, total }) => {
                    let _ = tx.send(RunMessage::Progress {
                        loops_done: done,
                        loops_total: total,
                    });
                }
                Some(ProgressUpdate::Finished(message)) => {
                    let _ = tx.send(RunMessage::Finished { message });
                }
                None => {}
            }
            let _ = tx.send(RunMessage::Output(line));
        }
        // stream closed: the binary exited; liveness is polled, not joined
        let _ = child.wait();
    });

    Ok(SimRun {
        events: rx,
        loops_total,
        _handle: handle,
    })
}

fn doc_lines(doc: &DefDocument) -> AppResult<Vec<String>> {
    let content = std::fs::read_to_string(doc.path())?;
    Ok(content.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cube_aborts_before_any_launch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.def");
        std::fs::write(
            &path,
            "INSET= absent.fits\nLOOPS= 1\nNUR= 2\nRADI= 0 40\nVROT= 10 20\n",
        )
        .unwrap();
        let mut doc = DefDocument::open(&path).unwrap();
        let err = start_run(&mut doc).unwrap_err();
        assert!(matches!(err, AppError::MissingDataCube { .. }));
    }
}
