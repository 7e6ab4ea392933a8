//! The set of parameter curves loaded from one model file.

use std::collections::BTreeMap;

use tr_core::Real;

use crate::error::{ModelError, ModelResult};
use crate::history::HistoryStack;
use crate::series::ParameterSeries;

/// Name of the shared independent axis.
pub const RADIUS_AXIS: &str = "RADI";

/// Step appended to the radius axis when the file under-specifies rings.
const RADIUS_PAD_STEP: Real = 40.0;

/// One parsed parameter as handed over by the file layer.
#[derive(Debug, Clone)]
pub struct SeriesSamples {
    pub name: String,
    pub unit: String,
    pub values: Vec<Real>,
    pub precision: usize,
}

impl SeriesSamples {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        values: Vec<Real>,
        precision: usize,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            values,
            precision,
        }
    }
}

/// Where a newly displayed parameter goes in the display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertMode {
    /// At the end of the display order.
    Append,
    /// Immediately after the named (focused) parameter.
    After(String),
}

/// Row-major grid placement of one displayed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSlot {
    pub name: String,
    pub row: usize,
    pub col: usize,
}

/// Owns every [`ParameterSeries`] plus its [`HistoryStack`] and enforces the
/// cross-parameter invariants: every series has exactly `ring_count` samples
/// and every displayed name has a backing series.
///
/// A set is built fresh when a file is opened and dropped when it closes;
/// there is no merging of old and new state.
#[derive(Debug)]
pub struct ParameterSet {
    ring_count: usize,
    x_precision: usize,
    series_by_name: BTreeMap<String, ParameterSeries>,
    history_by_name: BTreeMap<String, HistoryStack>,
    displayed_order: Vec<String>,
    rows: usize,
    cols: usize,
}

impl ParameterSet {
    /// Build a set from parsed samples, padding every sequence up to
    /// `ring_count`.
    ///
    /// Source files may under-specify trailing rings; padding keeps all
    /// series length-aligned. Ordinary parameters repeat their last value
    /// (zeros when entirely absent); the radius axis continues in fixed
    /// steps [`RADIUS_PAD_STEP`] apart, or is synthesized evenly spaced from
    /// zero when entirely absent.
    pub fn load(ring_count: usize, samples: Vec<SeriesSamples>) -> Self {
        let mut radii = samples
            .iter()
            .find(|s| s.name == RADIUS_AXIS)
            .map(|s| s.values.clone())
            .unwrap_or_default();
        pad_radius(&mut radii, ring_count);

        let x_precision = samples
            .iter()
            .find(|s| s.name == RADIUS_AXIS)
            .map(|s| s.precision)
            .unwrap_or(0);

        let (x_lo, x_hi) = derive_x_scale(&radii);

        let mut series_by_name = BTreeMap::new();
        let mut history_by_name = BTreeMap::new();
        for sample in samples {
            if sample.name == RADIUS_AXIS {
                continue;
            }
            let mut values = sample.values;
            pad_values(&mut values, ring_count);
            let mut series = ParameterSeries::new(
                sample.name.clone(),
                sample.unit,
                radii.clone(),
                values.clone(),
                x_precision,
                sample.precision,
            );
            series.set_x_bounds(x_lo, x_hi);
            history_by_name.insert(sample.name.clone(), HistoryStack::new(values));
            series_by_name.insert(sample.name, series);
        }

        Self {
            ring_count,
            x_precision,
            series_by_name,
            history_by_name,
            displayed_order: Vec::new(),
            rows: 4,
            cols: 1,
        }
    }

    pub fn ring_count(&self) -> usize {
        self.ring_count
    }

    pub fn x_precision(&self) -> usize {
        self.x_precision
    }

    /// The shared radius axis (identical across all series).
    pub fn radii(&self) -> Vec<Real> {
        self.series_by_name
            .values()
            .next()
            .map(|s| s.x_values().to_vec())
            .unwrap_or_default()
    }

    pub fn known_names(&self) -> impl Iterator<Item = &str> {
        self.series_by_name.keys().map(String::as_str)
    }

    /// Known parameters that are not currently displayed.
    pub fn hidden_names(&self) -> Vec<String> {
        self.series_by_name
            .keys()
            .filter(|name| !self.displayed_order.iter().any(|d| d == *name))
            .cloned()
            .collect()
    }

    pub fn displayed_order(&self) -> &[String] {
        &self.displayed_order
    }

    pub fn grid(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn series(&self, name: &str) -> Option<&ParameterSeries> {
        self.series_by_name.get(name)
    }

    pub fn history(&self, name: &str) -> Option<&HistoryStack> {
        self.history_by_name.get(name)
    }

    /// Disjoint mutable access to one series and its history, the shape the
    /// interaction controller needs.
    pub fn series_and_history_mut(
        &mut self,
        name: &str,
    ) -> Option<(&mut ParameterSeries, &mut HistoryStack)> {
        let series = self.series_by_name.get_mut(name)?;
        let history = self.history_by_name.get_mut(name)?;
        Some((series, history))
    }

    /// Seed the initial display order, keeping only names with a backing
    /// series.
    pub fn set_displayed(&mut self, names: &[&str]) {
        self.displayed_order = names
            .iter()
            .filter(|n| self.series_by_name.contains_key(**n))
            .map(|n| (*n).to_string())
            .collect();
    }

    /// Display a parameter, creating a zero-valued series when the file did
    /// not define one.
    pub fn add_parameter(
        &mut self,
        name: &str,
        unit: &str,
        mode: InsertMode,
    ) -> ModelResult<usize> {
        if self.displayed_order.iter().any(|d| d == name) {
            return Err(ModelError::DuplicateParameter {
                name: name.to_string(),
            });
        }

        let position = match &mode {
            InsertMode::Append => self.displayed_order.len(),
            InsertMode::After(focus) => {
                let focus_idx = self
                    .displayed_order
                    .iter()
                    .position(|d| d == focus)
                    .ok_or_else(|| ModelError::UnknownParameter {
                        name: focus.clone(),
                    })?;
                focus_idx + 1
            }
        };

        if !self.series_by_name.contains_key(name) {
            let zeros = vec![0.0; self.ring_count];
            let (x_lo, x_hi) = derive_x_scale(&self.radii());
            let mut series = ParameterSeries::new(
                name,
                unit,
                self.radii(),
                zeros.clone(),
                self.x_precision,
                1,
            );
            series.set_x_bounds(x_lo, x_hi);
            series.set_y_bounds(-100.0, 100.0);
            self.series_by_name.insert(name.to_string(), series);
            self.history_by_name
                .insert(name.to_string(), HistoryStack::new(zeros));
        } else if let Some(series) = self.series_by_name.get_mut(name) {
            if series.unit().is_empty() && !unit.is_empty() {
                series.set_unit(unit);
            }
        }

        self.displayed_order.insert(position, name.to_string());
        Ok(position)
    }

    /// Swap a displayed slot's identity to another known parameter without
    /// changing its grid position.
    pub fn replace_displayed(&mut self, name: &str, new_name: &str) -> ModelResult<()> {
        if self.displayed_order.iter().any(|d| d == new_name) {
            return Err(ModelError::DuplicateParameter {
                name: new_name.to_string(),
            });
        }
        if !self.series_by_name.contains_key(new_name) {
            return Err(ModelError::UnknownParameter {
                name: new_name.to_string(),
            });
        }
        let slot = self
            .displayed_order
            .iter()
            .position(|d| d == name)
            .ok_or_else(|| ModelError::UnknownParameter {
                name: name.to_string(),
            })?;
        self.displayed_order[slot] = new_name.to_string();
        Ok(())
    }

    /// Re-derive grid placement, row-major by display order.
    pub fn set_layout(&mut self, rows: usize, cols: usize) -> ModelResult<Vec<GridSlot>> {
        if rows * cols < self.displayed_order.len() {
            return Err(ModelError::LayoutMismatch {
                rows,
                cols,
                displayed: self.displayed_order.len(),
            });
        }
        self.rows = rows;
        self.cols = cols;
        Ok(self.grid_slots())
    }

    /// Current row-major placement of the displayed parameters.
    pub fn grid_slots(&self) -> Vec<GridSlot> {
        self.displayed_order
            .iter()
            .enumerate()
            .map(|(i, name)| GridSlot {
                name: name.clone(),
                row: i / self.cols,
                col: i % self.cols,
            })
            .collect()
    }

    /// Apply values re-read from the shared file (external editor sync).
    ///
    /// Overwrites the series wholesale, padding to the ring count first, and
    /// snapshots into history when the values actually differ. Returns
    /// whether anything changed. Radius-axis updates propagate to every
    /// series' x values.
    pub fn apply_external(&mut self, name: &str, values: &[Real]) -> ModelResult<bool> {
        if name == RADIUS_AXIS {
            let mut radii = values.to_vec();
            pad_radius(&mut radii, self.ring_count);
            let mut changed = false;
            for series in self.series_by_name.values_mut() {
                if series.x_values() != radii.as_slice() {
                    series.replace_x_values(radii.clone())?;
                    changed = true;
                }
            }
            return Ok(changed);
        }

        let Some((series, history)) = self.series_and_history_mut(name) else {
            return Err(ModelError::UnknownParameter {
                name: name.to_string(),
            });
        };
        let mut padded = values.to_vec();
        pad_values(&mut padded, series.len());
        if series.y_values() == padded.as_slice() {
            return Ok(false);
        }
        series.replace_values(padded)?;
        series.recompute_view_bounds();
        history.record(series.y_values());
        Ok(true)
    }
}

/// Pad an ordinary parameter: repeat the last value, or zeros when empty.
fn pad_values(values: &mut Vec<Real>, ring_count: usize) {
    if values.is_empty() {
        values.resize(ring_count, 0.0);
    } else {
        let last = *values.last().expect("checked non-empty");
        values.resize(ring_count, last);
    }
    values.truncate(ring_count);
}

/// Pad the radius axis: continue in fixed steps past the last sample, or
/// synthesize an evenly spaced axis from zero when empty.
fn pad_radius(radii: &mut Vec<Real>, ring_count: usize) {
    if radii.is_empty() {
        for i in 0..ring_count {
            radii.push(i as Real * RADIUS_PAD_STEP);
        }
    } else {
        while radii.len() < ring_count {
            let last = *radii.last().expect("checked non-empty");
            radii.push(last + RADIUS_PAD_STEP);
        }
    }
    radii.truncate(ring_count);
}

/// Shared x scale from the radius extent: min/max padded by 10% of range,
/// rounded outward to whole data units.
fn derive_x_scale(radii: &[Real]) -> (Real, Real) {
    let Some(first) = radii.first().copied() else {
        return (0.0, 0.0);
    };
    let (lo, hi) = radii.iter().fold((first, first), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    let pad = 0.1 * (hi - lo);
    ((lo - pad).ceil(), (hi + pad).ceil())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, unit: &str, values: Vec<Real>) -> SeriesSamples {
        SeriesSamples::new(name, unit, values, 2)
    }

    fn loaded() -> ParameterSet {
        let mut set = ParameterSet::load(
            5,
            vec![
                sample(RADIUS_AXIS, "arcsec", vec![0.0, 10.0, 20.0]),
                sample("VROT", "km s-1", vec![1.0, 2.0]),
                sample("INCL", "degrees", vec![60.0; 5]),
                sample("PA", "degrees", vec![]),
            ],
        );
        set.set_displayed(&["VROT", "INCL", "PA"]);
        set
    }

    #[test]
    fn load_pads_radius_with_fixed_step_and_values_with_last_repeat() {
        let set = loaded();
        assert_eq!(set.radii(), vec![0.0, 10.0, 20.0, 60.0, 100.0]);
        let vrot = set.series("VROT").unwrap();
        assert_eq!(vrot.y_values(), &[1.0, 2.0, 2.0, 2.0, 2.0]);
        let pa = set.series("PA").unwrap();
        assert_eq!(pa.y_values(), &[0.0; 5]);
        for name in ["VROT", "INCL", "PA"] {
            assert_eq!(set.series(name).unwrap().len(), set.ring_count());
        }
    }

    #[test]
    fn load_synthesizes_radius_axis_when_absent() {
        let set = ParameterSet::load(4, vec![sample("VROT", "km s-1", vec![1.0; 4])]);
        assert_eq!(set.radii(), vec![0.0, 40.0, 80.0, 120.0]);
    }

    #[test]
    fn displayed_order_drops_names_without_series() {
        let mut set = loaded();
        set.set_displayed(&["VROT", "SBR", "INCL"]);
        assert_eq!(set.displayed_order(), &["VROT", "INCL"]);
    }

    #[test]
    fn add_parameter_rejects_duplicates() {
        let mut set = loaded();
        let err = set
            .add_parameter("VROT", "km s-1", InsertMode::Append)
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateParameter { .. }));
        assert_eq!(set.displayed_order().len(), 3);
    }

    #[test]
    fn add_parameter_append_creates_zero_series() {
        let mut set = loaded();
        let pos = set
            .add_parameter("SDIS", "km s-1", InsertMode::Append)
            .unwrap();
        assert_eq!(pos, 3);
        let sdis = set.series("SDIS").unwrap();
        assert_eq!(sdis.y_values(), &[0.0; 5]);
        assert_eq!(sdis.view_bounds().y_min, -100.0);
        assert!(set.history("SDIS").is_some());
    }

    #[test]
    fn add_parameter_insert_lands_after_focus() {
        let mut set = loaded();
        let pos = set
            .add_parameter("Z0", "arcsec", InsertMode::After("VROT".into()))
            .unwrap();
        assert_eq!(pos, 1);
        assert_eq!(set.displayed_order(), &["VROT", "Z0", "INCL", "PA"]);
    }

    #[test]
    fn insert_after_unknown_focus_fails() {
        let mut set = loaded();
        let err = set
            .add_parameter("Z0", "arcsec", InsertMode::After("SBR".into()))
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownParameter { .. }));
    }

    #[test]
    fn replace_displayed_swaps_slot_in_place() {
        let mut set = loaded();
        set.add_parameter("Z0", "arcsec", InsertMode::Append).unwrap();
        // hide Z0 again so it is known but not displayed
        set.set_displayed(&["VROT", "INCL", "PA"]);
        set.replace_displayed("INCL", "Z0").unwrap();
        assert_eq!(set.displayed_order(), &["VROT", "Z0", "PA"]);
    }

    #[test]
    fn replace_displayed_requires_existing_series() {
        let mut set = loaded();
        let err = set.replace_displayed("INCL", "SBR").unwrap_err();
        assert!(matches!(err, ModelError::UnknownParameter { .. }));
        assert_eq!(set.displayed_order(), &["VROT", "INCL", "PA"]);
    }

    #[test]
    fn set_layout_row_major_placement() {
        let mut set = loaded();
        set.add_parameter("Z0", "arcsec", InsertMode::Append).unwrap();
        let slots = set.set_layout(2, 2).unwrap();
        assert_eq!(
            slots,
            vec![
                GridSlot { name: "VROT".into(), row: 0, col: 0 },
                GridSlot { name: "INCL".into(), row: 0, col: 1 },
                GridSlot { name: "PA".into(), row: 1, col: 0 },
                GridSlot { name: "Z0".into(), row: 1, col: 1 },
            ]
        );
    }

    #[test]
    fn undersized_layout_fails_and_keeps_previous_grid() {
        let mut set = loaded();
        set.add_parameter("Z0", "arcsec", InsertMode::Append).unwrap();
        set.set_layout(2, 2).unwrap();
        let err = set.set_layout(1, 1).unwrap_err();
        assert!(matches!(err, ModelError::LayoutMismatch { .. }));
        assert_eq!(set.grid(), (2, 2));
        assert_eq!(set.displayed_order().len(), 4);
    }

    #[test]
    fn apply_external_overwrites_and_records_history() {
        let mut set = loaded();
        let changed = set
            .apply_external("VROT", &[9.0, 9.0, 9.0, 9.0, 9.0])
            .unwrap();
        assert!(changed);
        assert_eq!(set.history("VROT").unwrap().depth(), 2);
        // identical values again: no new snapshot
        let changed = set
            .apply_external("VROT", &[9.0, 9.0, 9.0, 9.0, 9.0])
            .unwrap();
        assert!(!changed);
        assert_eq!(set.history("VROT").unwrap().depth(), 2);
    }

    #[test]
    fn apply_external_pads_short_vectors() {
        let mut set = loaded();
        set.apply_external("INCL", &[45.0, 50.0]).unwrap();
        let incl = set.series("INCL").unwrap();
        assert_eq!(incl.y_values(), &[45.0, 50.0, 50.0, 50.0, 50.0]);
    }

    #[test]
    fn apply_external_radius_propagates_to_every_series() {
        let mut set = loaded();
        set.apply_external(RADIUS_AXIS, &[0.0, 5.0, 10.0, 15.0, 20.0])
            .unwrap();
        for name in ["VROT", "INCL", "PA"] {
            assert_eq!(
                set.series(name).unwrap().x_values(),
                &[0.0, 5.0, 10.0, 15.0, 20.0]
            );
        }
    }
}
