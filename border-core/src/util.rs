//! Utilities for interaction of agents and environments.

/// Returns the index of the maximum value.
///
/// Ties are broken by the lowest index and `NaN` values never win.
/// Returns `None` for an empty slice or a slice of `NaN`s.
///
/// ```
/// use border_core::util::argmax;
///
/// assert_eq!(argmax(&[1.0, 0.5]), Some(0));
/// assert_eq!(argmax(&[0.0, 2.0, 2.0]), Some(1));
/// ```
pub fn argmax(xs: &[f32]) -> Option<usize> {
    xs.iter()
        .enumerate()
        .filter(|(_, x)| !x.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, &x)| match best {
            Some((_, b)) if b >= x => best,
            _ => Some((i, x)),
        })
        .map(|(i, _)| i)
}

/// Summary statistics of episode returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStats {
    /// Mean.
    pub mean: f32,

    /// Population standard deviation.
    pub std: f32,

    /// Minimum.
    pub min: f32,

    /// Maximum.
    pub max: f32,
}

impl ReturnStats {
    /// Computes statistics of the given returns, `None` if there is no return.
    pub fn from_returns(returns: &[f32]) -> Option<Self> {
        if returns.is_empty() {
            return None;
        }

        let n = returns.len() as f32;
        let mean = returns.iter().sum::<f32>() / n;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / n;
        let min = returns.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = returns.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        Some(Self {
            mean,
            std: var.sqrt(),
            min,
            max,
        })
    }
}
