//! tr-model: the editable tilted-ring parameter model.
//!
//! A model is a set of named curves (rotation velocity, inclination, ...)
//! sampled on a shared radius axis. This crate owns the data model, the
//! per-curve undo/redo history, the pointer-event edit state machine, and
//! the cross-parameter invariants (every curve has exactly `ring_count`
//! samples). Rendering and file I/O live elsewhere; everything here is
//! plain data and pure logic so it can be tested without a GUI.

pub mod error;
pub mod history;
pub mod interact;
pub mod series;
pub mod set;

pub use error::{ModelError, ModelResult};
pub use history::HistoryStack;
pub use interact::{DragState, InteractionController};
pub use series::{ParameterSeries, ViewBounds};
pub use set::{GridSlot, InsertMode, ParameterSet, SeriesSamples, RADIUS_AXIS};
