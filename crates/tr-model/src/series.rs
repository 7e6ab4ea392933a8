//! A single named tilted-ring parameter curve.

use tr_core::{Real, TrError, TrResult, approx_near};

/// Relative tolerance for "value sits at a viewport boundary" checks.
const EDGE_REL_TOL: Real = 5e-2;

/// Visible axis ranges of one plot, independent of the data domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub x_min: Real,
    pub x_max: Real,
    pub y_min: Real,
    pub y_max: Real,
}

impl Default for ViewBounds {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 0.0,
            y_min: 0.0,
            y_max: 0.0,
        }
    }
}

/// One named curve: ordered (x, y) sample pairs plus precision metadata.
///
/// All mutation goes through [`set_value`](Self::set_value) or
/// [`replace_values`](Self::replace_values) so the sample-count invariant
/// holds after every edit. Viewport recomputation is a separate explicit
/// step; callers decide which rescale rule applies.
#[derive(Debug, Clone)]
pub struct ParameterSeries {
    name: String,
    unit: String,
    x_values: Vec<Real>,
    y_values: Vec<Real>,
    x_precision: usize,
    y_precision: usize,
    view_bounds: ViewBounds,
}

impl ParameterSeries {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        x_values: Vec<Real>,
        y_values: Vec<Real>,
        x_precision: usize,
        y_precision: usize,
    ) -> Self {
        debug_assert_eq!(x_values.len(), y_values.len());
        let mut series = Self {
            name: name.into(),
            unit: unit.into(),
            x_values,
            y_values,
            x_precision,
            y_precision,
            view_bounds: ViewBounds::default(),
        };
        series.recompute_view_bounds();
        series
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = unit.into();
    }

    pub fn len(&self) -> usize {
        self.y_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y_values.is_empty()
    }

    pub fn x_values(&self) -> &[Real] {
        &self.x_values
    }

    pub fn y_values(&self) -> &[Real] {
        &self.y_values
    }

    pub fn x_precision(&self) -> usize {
        self.x_precision
    }

    pub fn y_precision(&self) -> usize {
        self.y_precision
    }

    pub fn view_bounds(&self) -> ViewBounds {
        self.view_bounds
    }

    /// Override the visible x range (shared radius scale).
    pub fn set_x_bounds(&mut self, x_min: Real, x_max: Real) {
        self.view_bounds.x_min = x_min;
        self.view_bounds.x_max = x_max;
    }

    /// Override the visible y range (scale-manager style manual scale).
    pub fn set_y_bounds(&mut self, y_min: Real, y_max: Real) {
        self.view_bounds.y_min = y_min;
        self.view_bounds.y_max = y_max;
    }

    /// Set one sample, failing if `index` is outside `[0, ring_count)`.
    pub fn set_value(&mut self, index: usize, new_y: Real) -> TrResult<()> {
        let len = self.y_values.len();
        match self.y_values.get_mut(index) {
            Some(slot) => {
                *slot = new_y;
                Ok(())
            }
            None => Err(TrError::IndexOob {
                what: "sample index",
                index,
                len,
            }),
        }
    }

    /// Replace the whole y vector (undo/redo restore, external sync).
    pub fn replace_values(&mut self, new_y: Vec<Real>) -> TrResult<()> {
        if new_y.len() != self.y_values.len() {
            return Err(TrError::Invariant {
                what: "replacement vector must match ring count",
            });
        }
        self.y_values = new_y;
        Ok(())
    }

    /// Replace the shared x axis (external sync may rewrite RADI).
    pub fn replace_x_values(&mut self, new_x: Vec<Real>) -> TrResult<()> {
        if new_x.len() != self.x_values.len() {
            return Err(TrError::Invariant {
                what: "replacement axis must match ring count",
            });
        }
        self.x_values = new_x;
        Ok(())
    }

    fn y_min_max(&self) -> Option<(Real, Real)> {
        let mut it = self.y_values.iter().copied();
        let first = it.next()?;
        let mut lo = first;
        let mut hi = first;
        for v in it {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        Some((lo, hi))
    }

    /// Full from-scratch y viewport: 10%-of-range padding on each side.
    ///
    /// Two edge rules keep the result usable:
    /// - a flat curve gets a forced non-zero-height window skewed below and
    ///   above the value;
    /// - a recomputed lower bound landing within ~5% of the existing lower
    ///   bound widens asymmetrically instead, so a run of small edits does
    ///   not churn the viewport by a pixel per frame.
    pub fn recompute_view_bounds(&mut self) {
        let Some((min_y, max_y)) = self.y_min_max() else {
            return;
        };

        if min_y == max_y {
            self.view_bounds.y_min = if min_y == 0.0 { -10.0 } else { -min_y.abs() / 2.0 };
            self.view_bounds.y_max = if max_y == 0.0 { 10.0 } else { max_y.abs() * 1.5 };
            return;
        }

        let pad = 0.1 * (max_y - min_y);
        let mut lower = min_y - pad;
        let mut upper = max_y + pad;
        if approx_near(lower, self.view_bounds.y_min, EDGE_REL_TOL) {
            lower = self.view_bounds.y_min * 1.2;
            upper = max_y * 1.1;
        }
        self.view_bounds.y_min = lower;
        self.view_bounds.y_max = upper;
    }

    /// Incremental rescale after a local edit of `moved` at one sample.
    ///
    /// Drag edits are small perturbations near the current extremes, so the
    /// viewport only grows when the edited value is (within 5%) the new
    /// minimum or maximum: 30% of range on the pushed side, 10% opposite.
    pub fn rescale_around(&mut self, moved: Real) {
        let Some((min_y, max_y)) = self.y_min_max() else {
            return;
        };

        if min_y == max_y {
            self.recompute_view_bounds();
            return;
        }

        let range = max_y - min_y;
        if approx_near(moved, min_y, EDGE_REL_TOL) {
            self.view_bounds.y_min = min_y - 0.3 * range;
            self.view_bounds.y_max = max_y + 0.1 * range;
        } else if approx_near(moved, max_y, EDGE_REL_TOL) {
            self.view_bounds.y_max = max_y + 0.3 * range;
            self.view_bounds.y_min = min_y - 0.1 * range;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(y: Vec<Real>) -> ParameterSeries {
        let x = (0..y.len()).map(|i| i as Real * 40.0).collect();
        ParameterSeries::new("VROT", "km s-1", x, y, 2, 2)
    }

    #[test]
    fn set_value_rejects_out_of_range_index() {
        let mut s = series(vec![1.0, 2.0, 3.0]);
        assert!(s.set_value(2, 9.0).is_ok());
        let err = s.set_value(3, 9.0).unwrap_err();
        assert!(format!("{err}").contains("out of bounds"));
        assert_eq!(s.y_values(), &[1.0, 2.0, 9.0]);
    }

    #[test]
    fn flat_series_never_gets_zero_height_viewport() {
        let s = series(vec![7.0, 7.0, 7.0]);
        let vb = s.view_bounds();
        assert!(vb.y_min < 0.0);
        assert!(vb.y_max > 7.0);
        assert_eq!(vb.y_min, -3.5);
        assert_eq!(vb.y_max, 10.5);
    }

    #[test]
    fn flat_zero_series_uses_fixed_window() {
        let s = series(vec![0.0, 0.0]);
        assert_eq!(s.view_bounds().y_min, -10.0);
        assert_eq!(s.view_bounds().y_max, 10.0);
    }

    #[test]
    fn full_recompute_pads_ten_percent_each_side() {
        let s = series(vec![0.0, 50.0, 100.0]);
        let vb = s.view_bounds();
        assert_eq!(vb.y_min, -10.0);
        assert_eq!(vb.y_max, 110.0);
    }

    #[test]
    fn near_stationary_lower_bound_widens_asymmetrically() {
        let mut s = series(vec![-100.0, 0.0, 100.0]);
        // first pass: [-120, 120]
        assert_eq!(s.view_bounds().y_min, -120.0);
        // unchanged data recomputes to the same lower bound, which trips
        // the nearness rule and widens instead of churning
        s.recompute_view_bounds();
        assert_eq!(s.view_bounds().y_min, -144.0);
        assert_eq!(s.view_bounds().y_max, 110.0);
    }

    #[test]
    fn drag_to_new_minimum_expands_downward_more() {
        let mut s = series(vec![0.0, 50.0, 100.0]);
        s.set_value(0, -20.0).unwrap();
        s.rescale_around(-20.0);
        let vb = s.view_bounds();
        // range 120: bottom -20 - 36, top 100 + 12
        assert_eq!(vb.y_min, -56.0);
        assert_eq!(vb.y_max, 112.0);
    }

    #[test]
    fn drag_in_the_middle_leaves_viewport_alone() {
        let mut s = series(vec![0.0, 50.0, 100.0]);
        let before = s.view_bounds();
        s.set_value(1, 60.0).unwrap();
        s.rescale_around(60.0);
        assert_eq!(s.view_bounds(), before);
    }
}
