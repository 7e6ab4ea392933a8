//! Pointer/keyboard edit state machine for one plot panel.
//!
//! Each interactive surface owns its own controller instance; there is no
//! shared capture state between panels. The controller works in data
//! coordinates and mutates a [`ParameterSeries`] plus its [`HistoryStack`];
//! the caller maps pixels to data space and triggers redraws.

use tr_core::{Real, ensure_finite};

use crate::error::ModelResult;
use crate::history::HistoryStack;
use crate::series::ParameterSeries;

/// Default hit-test half-width around a sample's x position, in data units.
///
/// Deliberately a constant independent of zoom; callers working at unusual
/// axis scales can override [`InteractionController::hit_band`].
pub const DEFAULT_HIT_BAND: Real = 3.0;

/// Geometric growth applied to the last seen value when the pointer leaves
/// the plot area mid-drag, so the drag keeps moving instead of stalling.
const OFF_PLOT_GROWTH: Real = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    /// A sample is captured; motion events move it.
    Dragging { index: usize },
    /// An undo/redo replay is redrawing; drag logic is suppressed.
    Replaying,
}

#[derive(Debug)]
pub struct InteractionController {
    /// Hit-test half-width in data units.
    pub hit_band: Real,
    state: DragState,
    last_value: Real,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self {
            hit_band: DEFAULT_HIT_BAND,
            state: DragState::Idle,
            last_value: 0.0,
        }
    }
}

impl InteractionController {
    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    fn hit_test(&self, series: &ParameterSeries, dx: Real) -> Option<usize> {
        series
            .x_values()
            .iter()
            .position(|&x| (dx - x).abs() <= self.hit_band)
    }

    /// Pointer press at data coordinates. Captures the hit sample and enters
    /// the drag state; presses while not idle are ignored.
    pub fn pointer_down(&mut self, series: &ParameterSeries, dx: Real) -> Option<usize> {
        if self.state != DragState::Idle {
            return None;
        }
        let index = self.hit_test(series, dx)?;
        self.last_value = series.y_values()[index];
        self.state = DragState::Dragging { index };
        Some(index)
    }

    /// Pointer motion while dragging. `dy` is the pointer's y position in
    /// data coordinates, or `None` when the pointer is outside the plot
    /// area, in which case the last value continues geometrically.
    pub fn pointer_move(
        &mut self,
        series: &mut ParameterSeries,
        dy: Option<Real>,
    ) -> ModelResult<bool> {
        let DragState::Dragging { index } = self.state else {
            return Ok(false);
        };
        let motion = match dy {
            Some(v) => {
                self.last_value = v;
                v
            }
            None => {
                self.last_value *= OFF_PLOT_GROWTH;
                self.last_value
            }
        };
        series.set_value(index, motion)?;
        series.rescale_around(motion);
        Ok(true)
    }

    /// Pointer release: clears the capture and snapshots the drag result.
    /// Returns whether history actually recorded a change.
    pub fn pointer_up(&mut self, series: &ParameterSeries, history: &mut HistoryStack) -> bool {
        if !self.is_dragging() {
            return false;
        }
        self.state = DragState::Idle;
        history.record(series.y_values())
    }

    /// Confirmed numeric entry from a double-click prompt: sets the hit
    /// sample directly (no drag delta), rescales by the drag rule, and
    /// snapshots. Returns the edited index, or `None` when no sample was in
    /// the hit band.
    pub fn set_point(
        &mut self,
        series: &mut ParameterSeries,
        history: &mut HistoryStack,
        dx: Real,
        value: Real,
    ) -> ModelResult<Option<usize>> {
        let value = ensure_finite(value, "node value")?;
        let Some(index) = self.hit_test(series, dx) else {
            return Ok(None);
        };
        series.set_value(index, value)?;
        series.rescale_around(value);
        history.record(series.y_values());
        self.state = DragState::Idle;
        Ok(Some(index))
    }

    /// Step the series back one snapshot. The restore replaces the y vector
    /// wholesale and forces a full viewport recompute: an undo can jump
    /// arbitrarily far, so the incremental edge rules do not apply.
    pub fn undo(
        &mut self,
        series: &mut ParameterSeries,
        history: &mut HistoryStack,
    ) -> ModelResult<()> {
        let restored = history.undo()?.to_vec();
        self.replay(series, restored)
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(
        &mut self,
        series: &mut ParameterSeries,
        history: &mut HistoryStack,
    ) -> ModelResult<()> {
        let restored = history.redo()?.to_vec();
        self.replay(series, restored)
    }

    fn replay(&mut self, series: &mut ParameterSeries, values: Vec<Real>) -> ModelResult<()> {
        self.state = DragState::Replaying;
        let outcome = series.replace_values(values);
        series.recompute_view_bounds();
        self.state = DragState::Idle;
        outcome?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    fn fixture() -> (ParameterSeries, HistoryStack) {
        let x = vec![0.0, 40.0, 80.0, 120.0];
        let y = vec![5.0, 5.0, 5.0, 5.0];
        let series = ParameterSeries::new("VROT", "km s-1", x, y.clone(), 2, 2);
        let history = HistoryStack::new(y);
        (series, history)
    }

    #[test]
    fn press_outside_hit_band_is_ignored() {
        let (series, _) = fixture();
        let mut ctl = InteractionController::default();
        assert_eq!(ctl.pointer_down(&series, 20.0), None);
        assert_eq!(ctl.state(), DragState::Idle);
    }

    #[test]
    fn press_within_band_captures_the_sample() {
        let (series, _) = fixture();
        let mut ctl = InteractionController::default();
        assert_eq!(ctl.pointer_down(&series, 81.5), Some(2));
        assert_eq!(ctl.state(), DragState::Dragging { index: 2 });
    }

    #[test]
    fn band_edge_is_inclusive() {
        let (series, _) = fixture();
        let mut ctl = InteractionController::default();
        // exactly hit_band away from the sample at x = 40
        assert_eq!(ctl.pointer_down(&series, 40.0 + DEFAULT_HIT_BAND), Some(1));
    }

    #[test]
    fn drag_and_release_records_exactly_one_snapshot() {
        let (mut series, mut history) = fixture();
        let mut ctl = InteractionController::default();
        ctl.pointer_down(&series, 80.0).unwrap();
        ctl.pointer_move(&mut series, Some(6.0)).unwrap();
        ctl.pointer_move(&mut series, Some(7.5)).unwrap();
        assert!(ctl.pointer_up(&series, &mut history));
        assert_eq!(history.depth(), 2);
        assert_eq!(history.current(), &[5.0, 5.0, 7.5, 5.0]);
        assert_eq!(ctl.state(), DragState::Idle);
    }

    #[test]
    fn release_without_net_change_records_nothing() {
        let (mut series, mut history) = fixture();
        let mut ctl = InteractionController::default();
        ctl.pointer_down(&series, 80.0).unwrap();
        ctl.pointer_move(&mut series, Some(5.0)).unwrap();
        assert!(!ctl.pointer_up(&series, &mut history));
        assert_eq!(history.depth(), 1);
    }

    #[test]
    fn off_plot_motion_extrapolates_geometrically() {
        let (mut series, mut history) = fixture();
        let mut ctl = InteractionController::default();
        ctl.pointer_down(&series, 0.0).unwrap();
        ctl.pointer_move(&mut series, Some(10.0)).unwrap();
        ctl.pointer_move(&mut series, None).unwrap();
        assert_eq!(series.y_values()[0], 11.0);
        ctl.pointer_move(&mut series, None).unwrap();
        assert!((series.y_values()[0] - 12.1).abs() < 1e-9);
        ctl.pointer_up(&series, &mut history);
    }

    #[test]
    fn motion_while_idle_does_nothing() {
        let (mut series, _) = fixture();
        let mut ctl = InteractionController::default();
        assert!(!ctl.pointer_move(&mut series, Some(42.0)).unwrap());
        assert_eq!(series.y_values(), &[5.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn double_click_sets_value_directly() {
        let (mut series, mut history) = fixture();
        let mut ctl = InteractionController::default();
        let idx = ctl
            .set_point(&mut series, &mut history, 40.0, -2.5)
            .unwrap();
        assert_eq!(idx, Some(1));
        assert_eq!(series.y_values()[1], -2.5);
        assert_eq!(history.depth(), 2);
    }

    #[test]
    fn double_click_rejects_non_finite_input() {
        let (mut series, mut history) = fixture();
        let mut ctl = InteractionController::default();
        assert!(
            ctl.set_point(&mut series, &mut history, 40.0, Real::NAN)
                .is_err()
        );
        assert_eq!(series.y_values()[1], 5.0);
    }

    #[test]
    fn undo_redo_round_trip_restores_exact_values() {
        let (mut series, mut history) = fixture();
        let mut ctl = InteractionController::default();
        ctl.pointer_down(&series, 80.0);
        ctl.pointer_move(&mut series, Some(9.0)).unwrap();
        ctl.pointer_up(&series, &mut history);
        let edited = series.y_values().to_vec();

        ctl.undo(&mut series, &mut history).unwrap();
        assert_eq!(series.y_values(), &[5.0, 5.0, 5.0, 5.0]);
        ctl.redo(&mut series, &mut history).unwrap();
        assert_eq!(series.y_values(), edited.as_slice());
        assert_eq!(ctl.state(), DragState::Idle);
    }

    #[test]
    fn undo_past_initial_state_surfaces_history_exhausted() {
        let (mut series, mut history) = fixture();
        let mut ctl = InteractionController::default();
        let err = ctl.undo(&mut series, &mut history).unwrap_err();
        assert!(matches!(err, ModelError::HistoryExhausted));
        assert_eq!(series.y_values(), &[5.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn undo_forces_full_viewport_recompute() {
        let (mut series, mut history) = fixture();
        let mut ctl = InteractionController::default();
        ctl.pointer_down(&series, 80.0);
        ctl.pointer_move(&mut series, Some(500.0)).unwrap();
        ctl.pointer_up(&series, &mut history);
        ctl.undo(&mut series, &mut history).unwrap();
        // flat 5.0 curve again: forced skewed window, not a drag-rule window
        let vb = series.view_bounds();
        assert_eq!(vb.y_min, -2.5);
        assert_eq!(vb.y_max, 7.5);
    }
}
