use crate::TrError;

/// Floating point type used throughout the system
pub type Real = f64;

/// True when `a` lies within `rel_tol * |b|` of `b`.
///
/// The tolerance is relative to `b` on purpose: the viewport rules ask
/// "is this value near that boundary", not "are these two values equal".
pub fn approx_near(a: Real, b: Real, rel_tol: Real) -> bool {
    (b - a).abs() <= (rel_tol * b).abs()
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, TrError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TrError::NonFinite { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_near_is_relative_to_second_argument() {
        assert!(approx_near(99.0, 100.0, 5e-2));
        assert!(approx_near(104.9, 100.0, 5e-2));
        assert!(!approx_near(94.0, 100.0, 5e-2));
        // zero reference admits only an exact match
        assert!(approx_near(0.0, 0.0, 5e-2));
        assert!(!approx_near(0.1, 0.0, 5e-2));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }
}
