use crate::{Error, Result};
use std::collections::BTreeMap;

/// Score per node. Sums to 1 whenever it is a PageRank estimate.
pub type RankVector<K> = BTreeMap<K, f64>;

/// Probability of the random surfer's next node, given its current one.
pub type TransitionDistribution<K> = BTreeMap<K, f64>;

pub const DEFAULT_DAMPING: f64 = 0.85;
pub const DEFAULT_SAMPLES: usize = 10_000;
pub const DEFAULT_TOLERANCE: f64 = 0.001;

pub fn norm_1<'a, I: IntoIterator<Item = &'a f64>>(v: I) -> f64 {
    v.into_iter().map(|x| x.abs()).sum()
}

pub(crate) fn check_damping(damping: f64) -> Result<()> {
    if damping > 0.0 && damping < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "damping={damping}, expected in (0, 1)"
        )))
    }
}

pub(crate) fn check_tolerance(tolerance: f64) -> Result<()> {
    // ranks are at most 1, so smaller deltas are below f64 rounding
    if tolerance >= f64::EPSILON && tolerance.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "tolerance={tolerance}, expected at least {}",
            f64::EPSILON
        )))
    }
}

pub(crate) fn check_samples(samples: usize) -> Result<()> {
    if samples > 0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(
            "samples=0, expected positive".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damping_bounds() {
        assert!(check_damping(0.85).is_ok());
        assert!(check_damping(0.0).is_err());
        assert!(check_damping(1.0).is_err());
        assert!(check_damping(-0.5).is_err());
        assert!(check_damping(f64::NAN).is_err());
    }

    #[test]
    fn tolerance_bounds() {
        assert!(check_tolerance(1e-3).is_ok());
        assert!(check_tolerance(0.0).is_err());
        assert!(check_tolerance(-1e-3).is_err());
        assert!(check_tolerance(f64::INFINITY).is_err());
        assert!(check_tolerance(1e-300).is_err());
        assert!(check_tolerance(f64::EPSILON).is_ok());
    }

    #[test]
    fn samples_bounds() {
        assert!(check_samples(1).is_ok());
        assert_eq!(
            check_samples(0),
            Err(Error::InvalidParameter("samples=0, expected positive".to_string()))
        );
    }

    #[test]
    fn norm_1_ignores_sign() {
        assert_eq!(norm_1(&[0.25, -0.25, 0.5]), 1.0);
    }
}
