//! Sync bridge between the plots and an external text editor.
//!
//! The current model is saved to a sibling temp file and the user's editor
//! is spawned on it. A worker thread polls the temp file's modification
//! time; when it changes, the file is re-parsed and the extracted parameter
//! vectors are sent over a channel. The worker never touches the model:
//! all mutation happens on the control thread that drains the channel.
//! When the editor exits, the temp file is renamed back over the original
//! path and a terminal event is emitted.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use tr_deffile::{DefFile, ParsedParameter};

use crate::error::{AppError, AppResult};

/// Poll interval for the shared file's modification time.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct SyncEvent {
    /// Bridge generation this event belongs to. The control thread drops
    /// events whose generation is stale, so a late callback can never
    /// resurrect an already-closed dataset.
    pub generation: u64,
    pub kind: SyncEventKind,
}

#[derive(Debug, Clone)]
pub enum SyncEventKind {
    /// The temp file changed on disk; carries the re-parsed vectors.
    FileChanged { parameters: Vec<ParsedParameter> },
    /// The editor exited; the temp file has been renamed back over the
    /// original path and the bridge is done.
    EditorClosed,
    Error { message: String },
}

/// A live editor-sync bridge. Owns the poll worker; the GUI drains
/// [`EditorSync::events`] from its control thread.
pub struct EditorSync {
    pub events: Receiver<SyncEvent>,
    generation: u64,
    stop: Arc<AtomicBool>,
    _handle: JoinHandle<()>,
}

impl EditorSync {
    /// Spawn `editor_cmd` on `temp_path` and start polling.
    ///
    /// The baseline mtime is captured here, at launch, so an edit landing
    /// before the first poll still registers as a change.
    pub fn start(
        generation: u64,
        editor_cmd: &str,
        temp_path: PathBuf,
        original_path: PathBuf,
    ) -> AppResult<Self> {
        let mut child = Command::new(editor_cmd)
            .arg(&temp_path)
            .spawn()
            .map_err(|_| AppError::ExternalProcessUnavailable {
                program: editor_cmd.to_string(),
            })?;
        let baseline = mtime_of(&temp_path)?;
        tracing::info!(
            editor = editor_cmd,
            temp = %temp_path.display(),
            "editor sync started"
        );

        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let (tx, rx) = channel();
        let handle = thread::spawn(move || {
            let mut last_seen = baseline;
            loop {
                thread::sleep(POLL_INTERVAL);

                if worker_stop.load(Ordering::Relaxed) {
                    // bridge cancelled from the control thread; the editor
                    // may still be running, but its file goes back anyway
                    restore(&temp_path, &original_path, generation, &tx);
                    break;
                }

                // flush a pending edit before the liveness verdict, so a
                // save made just before the editor exits is not lost
                if let Ok(mtime) = mtime_of(&temp_path) {
                    if mtime != last_seen {
                        last_seen = mtime;
                        match DefFile::load(&temp_path) {
                            Ok(def) => {
                                let _ = tx.send(SyncEvent {
                                    generation,
                                    kind: SyncEventKind::FileChanged {
                                        parameters: def.parameters,
                                    },
                                });
                            }
                            Err(e) => {
                                // a half-saved file parses on the next poll
                                let _ = tx.send(SyncEvent {
                                    generation,
                                    kind: SyncEventKind::Error {
                                        message: format!("re-parse failed: {e}"),
                                    },
                                });
                            }
                        }
                    }
                }

                // liveness probe, never a blocking wait
                match child.try_wait() {
                    Ok(Some(_)) => {
                        restore(&temp_path, &original_path, generation, &tx);
                        let _ = tx.send(SyncEvent {
                            generation,
                            kind: SyncEventKind::EditorClosed,
                        });
                        break;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        let _ = tx.send(SyncEvent {
                            generation,
                            kind: SyncEventKind::Error {
                                message: format!("editor liveness probe failed: {e}"),
                            },
                        });
                        break;
                    }
                }
            }
        });

        Ok(Self {
            events: rx,
            generation,
            stop,
            _handle: handle,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ask the worker to finish after its current poll tick.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for EditorSync {
    // a dropped bridge must not leave the worker polling a dead temp file
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn mtime_of(path: &Path) -> std::io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

/// One-time rename of the temp working file back to the original path.
fn restore(temp: &Path, original: &Path, generation: u64, tx: &Sender<SyncEvent>) {
    if let Err(e) = std::fs::rename(temp, original) {
        let _ = tx.send(SyncEvent {
            generation,
            kind: SyncEventKind::Error {
                message: format!("could not restore {}: {e}", original.display()),
            },
        });
    } else {
        tracing::info!(path = %original.display(), "editor sync stopped, file restored");
    }
}
