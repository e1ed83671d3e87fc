//! Local-maximum peak finding with shape constraints.
//!
//! Peaks are strict local maxima; a flat plateau bordered by lower samples
//! counts as one peak located at its midpoint. Candidates are then filtered by
//! plateau size, height, threshold, distance, prominence and width, in that
//! order.

use crate::error::{EpochError, Result};
use serde::{Deserialize, Serialize};

/// Inclusive interval constraint; a missing side is unbounded.
///
/// Deserializes from a bare number (lower bound only), a two-element array
/// `[min, max]` with optional `null`s, or an object `{ "min": .., "max": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BoundRepr")]
pub struct Bound {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoundRepr {
    Min(f64),
    Pair([Option<f64>; 2]),
    Object {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

impl From<BoundRepr> for Bound {
    fn from(repr: BoundRepr) -> Self {
        match repr {
            BoundRepr::Min(min) => Bound::at_least(min),
            BoundRepr::Pair([min, max]) => Bound { min, max },
            BoundRepr::Object { min, max } => Bound { min, max },
        }
    }
}

impl Bound {
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |m| m <= value) && self.max.map_or(true, |m| value <= m)
    }
}

/// Constraints applied when selecting peaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakPolicy {
    /// Required peak height.
    pub height: Option<Bound>,
    /// Required vertical distance to the neighbouring samples.
    pub threshold: Option<Bound>,
    /// Minimum horizontal distance (in samples) between neighbouring peaks.
    pub distance: Option<f64>,
    /// Required prominence.
    pub prominence: Option<Bound>,
    /// Required width (in samples) at `rel_height` of the prominence.
    pub width: Option<Bound>,
    /// Window length for the prominence search, in samples.
    pub wlen: Option<f64>,
    /// Relative height at which widths are measured.
    pub rel_height: f64,
    /// Required plateau size, in samples.
    pub plateau_size: Option<Bound>,
}

impl Default for PeakPolicy {
    fn default() -> Self {
        Self {
            height: None,
            threshold: None,
            distance: None,
            prominence: None,
            width: None,
            wlen: None,
            rel_height: 0.5,
            plateau_size: None,
        }
    }
}

impl PeakPolicy {
    /// Set the minimum peak height.
    pub fn min_height(mut self, height: f64) -> Self {
        self.height = Some(Bound::at_least(height));
        self
    }

    /// Set the height constraint.
    pub fn height(mut self, bound: Bound) -> Self {
        self.height = Some(bound);
        self
    }

    /// Set the threshold constraint.
    pub fn threshold(mut self, bound: Bound) -> Self {
        self.threshold = Some(bound);
        self
    }

    /// Set the minimum distance between peaks.
    pub fn distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Set the prominence constraint.
    pub fn prominence(mut self, bound: Bound) -> Self {
        self.prominence = Some(bound);
        self
    }

    /// Set the width constraint.
    pub fn width(mut self, bound: Bound) -> Self {
        self.width = Some(bound);
        self
    }

    /// Set the prominence window length.
    pub fn wlen(mut self, wlen: f64) -> Self {
        self.wlen = Some(wlen);
        self
    }

    /// Set the relative height used for width filtering.
    pub fn rel_height(mut self, rel_height: f64) -> Self {
        self.rel_height = rel_height;
        self
    }

    /// Set the plateau size constraint.
    pub fn plateau_size(mut self, bound: Bound) -> Self {
        self.plateau_size = Some(bound);
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(d) = self.distance {
            if !(d >= 1.0) {
                return Err(EpochError::InvalidParameter(format!(
                    "peak distance must be >= 1, got {d}"
                )));
            }
        }
        if let Some(w) = self.wlen {
            if !(w > 1.0) {
                return Err(EpochError::InvalidParameter(format!(
                    "prominence window length must be > 1, got {w}"
                )));
            }
        }
        if !(self.rel_height >= 0.0) {
            return Err(EpochError::InvalidParameter(format!(
                "relative height must be >= 0, got {}",
                self.rel_height
            )));
        }
        Ok(())
    }

    fn wlen_samples(&self) -> Option<usize> {
        self.wlen.map(|w| w.ceil() as usize)
    }
}

/// Extent of a (possibly flat) local maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plateau {
    pub midpoint: usize,
    pub left_edge: usize,
    pub right_edge: usize,
}

impl Plateau {
    pub fn size(&self) -> usize {
        self.right_edge - self.left_edge + 1
    }
}

/// Prominence of a peak and the bases it was measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prominence {
    pub prominence: f64,
    pub left_base: usize,
    pub right_base: usize,
}

/// Width of a peak with interpolated crossing positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Width {
    pub width: f64,
    /// Height at which the width was measured.
    pub width_height: f64,
    pub left_ip: f64,
    pub right_ip: f64,
}

/// A peak found by [`find_peaks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakInfo {
    pub index: usize,
    pub height: f64,
    pub plateau: Plateau,
    /// Present when the policy constrains prominence or width.
    pub prominence: Option<Prominence>,
    /// Present when the policy constrains width.
    pub width: Option<Width>,
}

fn check_finite(x: &[f64]) -> Result<()> {
    if x.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(EpochError::InvalidParameter(
            "signal contains non-finite values".to_string(),
        ))
    }
}

/// Find all local maxima, treating flat plateaus as one peak.
pub fn local_maxima(x: &[f64]) -> Vec<Plateau> {
    let n = x.len();
    let mut maxima = Vec::new();
    if n < 3 {
        return maxima;
    }

    let i_max = n - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < i_max && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                let (left_edge, right_edge) = (i, ahead - 1);
                maxima.push(Plateau {
                    midpoint: (left_edge + right_edge) / 2,
                    left_edge,
                    right_edge,
                });
                i = ahead;
            }
        }
        i += 1;
    }

    maxima
}

/// Keep the highest peaks such that no two are closer than `distance` samples.
fn select_by_distance(peaks: &[usize], priority: &[f64], distance: f64) -> Vec<bool> {
    let distance = distance.ceil() as usize;
    let n = peaks.len();
    let mut keep = vec![true; n];

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        priority[a]
            .partial_cmp(&priority[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < n && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    keep
}

/// Compute the prominence of each peak.
///
/// With `wlen`, the search for the bases is restricted to `wlen / 2` samples
/// on each side of the peak.
pub fn peak_prominences(x: &[f64], peaks: &[usize], wlen: Option<usize>) -> Result<Vec<Prominence>> {
    check_finite(x)?;
    let n = x.len();

    peaks
        .iter()
        .map(|&peak| {
            if peak >= n {
                return Err(EpochError::IndexOutOfBounds { index: peak, size: n });
            }
            let (mut i_min, mut i_max) = (0, n - 1);
            if let Some(w) = wlen.filter(|&w| w >= 2) {
                i_min = peak.saturating_sub(w / 2);
                i_max = (peak + w / 2).min(n - 1);
            }

            let top = x[peak];

            let mut left_base = peak;
            let mut left_min = top;
            let mut i = peak;
            while x[i] <= top {
                if x[i] < left_min {
                    left_min = x[i];
                    left_base = i;
                }
                if i == i_min {
                    break;
                }
                i -= 1;
            }

            let mut right_base = peak;
            let mut right_min = top;
            let mut i = peak;
            while i <= i_max && x[i] <= top {
                if x[i] < right_min {
                    right_min = x[i];
                    right_base = i;
                }
                i += 1;
            }

            Ok(Prominence {
                prominence: top - left_min.max(right_min),
                left_base,
                right_base,
            })
        })
        .collect()
}

/// Compute the width of each peak at `rel_height` of its prominence.
///
/// The crossing positions are linearly interpolated between samples and
/// never extend beyond the peak's bases.
pub fn peak_widths(
    x: &[f64],
    peaks: &[usize],
    rel_height: f64,
    prominences: &[Prominence],
) -> Result<Vec<Width>> {
    check_finite(x)?;
    if !(rel_height >= 0.0) {
        return Err(EpochError::InvalidParameter(format!(
            "relative height must be >= 0, got {rel_height}"
        )));
    }
    if peaks.len() != prominences.len() {
        return Err(EpochError::DimensionMismatch {
            expected: peaks.len(),
            got: prominences.len(),
        });
    }
    let n = x.len();

    peaks
        .iter()
        .zip(prominences)
        .map(|(&peak, prom)| {
            let (i_min, i_max) = (prom.left_base, prom.right_base);
            if !(i_min <= peak && peak <= i_max && i_max < n) {
                return Err(EpochError::InvalidParameter(format!(
                    "peak {peak} lies outside its bases [{i_min}, {i_max}]"
                )));
            }
            let height = x[peak] - prom.prominence * rel_height;

            let mut i = peak;
            while i_min < i && height < x[i] {
                i -= 1;
            }
            let mut left_ip = i as f64;
            if x[i] < height {
                left_ip += (height - x[i]) / (x[i + 1] - x[i]);
            }

            let mut i = peak;
            while i < i_max && height < x[i] {
                i += 1;
            }
            let mut right_ip = i as f64;
            if x[i] < height {
                right_ip -= (height - x[i]) / (x[i - 1] - x[i]);
            }

            Ok(Width {
                width: right_ip - left_ip,
                width_height: height,
                left_ip,
                right_ip,
            })
        })
        .collect()
}

/// Find peaks in `x` satisfying `policy`.
///
/// # Returns
/// Peaks ordered by increasing index.
pub fn find_peaks(x: &[f64], policy: &PeakPolicy) -> Result<Vec<PeakInfo>> {
    check_finite(x)?;
    policy.validate()?;

    let mut peaks: Vec<PeakInfo> = local_maxima(x)
        .into_iter()
        .map(|plateau| PeakInfo {
            index: plateau.midpoint,
            height: x[plateau.midpoint],
            plateau,
            prominence: None,
            width: None,
        })
        .collect();

    if let Some(bound) = policy.plateau_size {
        peaks.retain(|p| bound.contains(p.plateau.size() as f64));
    }

    if let Some(bound) = policy.height {
        peaks.retain(|p| bound.contains(p.height));
    }

    if let Some(bound) = policy.threshold {
        peaks.retain(|p| {
            let left = x[p.index] - x[p.index - 1];
            let right = x[p.index] - x[p.index + 1];
            bound.min.map_or(true, |m| m <= left.min(right))
                && bound.max.map_or(true, |m| left.max(right) <= m)
        });
    }

    if let Some(distance) = policy.distance {
        let index: Vec<usize> = peaks.iter().map(|p| p.index).collect();
        let heights: Vec<f64> = peaks.iter().map(|p| p.height).collect();
        let keep = select_by_distance(&index, &heights, distance);
        let mut flags = keep.into_iter();
        peaks.retain(|_| flags.next().unwrap_or(false));
    }

    if policy.prominence.is_some() || policy.width.is_some() {
        let index: Vec<usize> = peaks.iter().map(|p| p.index).collect();
        let proms = peak_prominences(x, &index, policy.wlen_samples())?;
        for (peak, prom) in peaks.iter_mut().zip(proms) {
            peak.prominence = Some(prom);
        }
    }

    if let Some(bound) = policy.prominence {
        peaks.retain(|p| p.prominence.map_or(false, |pr| bound.contains(pr.prominence)));
    }

    if let Some(bound) = policy.width {
        let index: Vec<usize> = peaks.iter().map(|p| p.index).collect();
        let proms: Vec<Prominence> = peaks.iter().filter_map(|p| p.prominence).collect();
        let widths = peak_widths(x, &index, policy.rel_height, &proms)?;
        for (peak, width) in peaks.iter_mut().zip(widths) {
            peak.width = Some(width);
        }
        peaks.retain(|p| p.width.map_or(false, |w| bound.contains(w.width)));
    }

    Ok(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn indices(peaks: &[PeakInfo]) -> Vec<usize> {
        peaks.iter().map(|p| p.index).collect()
    }

    // ==================== local_maxima ====================

    #[test]
    fn local_maxima_simple() {
        let x = [0.0, 1.0, 0.0, 2.0, 0.0];
        let maxima = local_maxima(&x);
        assert_eq!(
            maxima.iter().map(|m| m.midpoint).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn local_maxima_plateau_midpoint() {
        let x = [0.0, 1.0, 1.0, 1.0, 1.0, 0.0];
        let maxima = local_maxima(&x);
        assert_eq!(maxima.len(), 1);
        assert_eq!(maxima[0].left_edge, 1);
        assert_eq!(maxima[0].right_edge, 4);
        assert_eq!(maxima[0].midpoint, 2);
        assert_eq!(maxima[0].size(), 4);
    }

    #[test]
    fn local_maxima_ignores_edges_and_open_plateaus() {
        assert!(local_maxima(&[3.0, 1.0, 0.0]).is_empty());
        assert!(local_maxima(&[0.0, 1.0, 3.0]).is_empty());
        assert!(local_maxima(&[0.0, 1.0, 1.0]).is_empty());
        assert!(local_maxima(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn local_maxima_flat_signal() {
        assert!(local_maxima(&[0.0; 10]).is_empty());
    }

    // ==================== prominences / widths ====================

    #[test]
    fn prominence_uses_higher_base() {
        let x = [0.0, 3.0, 1.0, 4.0, 2.0];
        let proms = peak_prominences(&x, &[1, 3], None).unwrap();

        // Peak at 1: left min 0, right min 1 (stops at the higher 4.0)
        assert_relative_eq!(proms[0].prominence, 2.0, epsilon = 1e-12);
        assert_eq!(proms[0].left_base, 0);
        assert_eq!(proms[0].right_base, 2);
        // Peak at 3: left min 0 over the whole series, right min 2
        assert_relative_eq!(proms[1].prominence, 2.0, epsilon = 1e-12);
        assert_eq!(proms[1].left_base, 0);
        assert_eq!(proms[1].right_base, 4);
    }

    #[test]
    fn prominence_window_limits_search() {
        let x = [0.0, 1.0, 2.0, 5.0, 2.0, 1.0, 0.0];
        let proms = peak_prominences(&x, &[3], Some(3)).unwrap();
        assert_relative_eq!(proms[0].prominence, 3.0, epsilon = 1e-12);
        assert_eq!(proms[0].left_base, 2);
        assert_eq!(proms[0].right_base, 4);
    }

    #[test]
    fn prominence_out_of_bounds_peak() {
        assert!(peak_prominences(&[0.0, 1.0, 0.0], &[5], None).is_err());
    }

    #[test]
    fn width_at_half_prominence_interpolates() {
        let x = [0.0, 0.0, 1.0, 0.0, 0.0];
        let proms = peak_prominences(&x, &[2], None).unwrap();
        let widths = peak_widths(&x, &[2], 0.5, &proms).unwrap();

        assert_relative_eq!(widths[0].width_height, 0.5, epsilon = 1e-12);
        assert_relative_eq!(widths[0].left_ip, 1.5, epsilon = 1e-12);
        assert_relative_eq!(widths[0].right_ip, 2.5, epsilon = 1e-12);
        assert_relative_eq!(widths[0].width, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn width_of_plateau() {
        let x = [0.0, 1.0, 1.0, 1.0, 0.0];
        let proms = peak_prominences(&x, &[2], None).unwrap();
        let widths = peak_widths(&x, &[2], 0.5, &proms).unwrap();
        assert_relative_eq!(widths[0].left_ip, 0.5, epsilon = 1e-12);
        assert_relative_eq!(widths[0].right_ip, 3.5, epsilon = 1e-12);
    }

    #[test]
    fn width_requires_matching_prominences() {
        let x = [0.0, 1.0, 0.0];
        assert!(peak_widths(&x, &[1], 0.5, &[]).is_err());
    }

    // ==================== find_peaks ====================

    #[test]
    fn find_peaks_no_constraints() {
        let x = [0.0, 0.2, 0.1, 0.8, 0.1, 0.5, 0.0];
        let peaks = find_peaks(&x, &PeakPolicy::default()).unwrap();
        assert_eq!(indices(&peaks), vec![1, 3, 5]);
        assert!(peaks.iter().all(|p| p.prominence.is_none()));
    }

    #[test]
    fn find_peaks_height() {
        let x = [0.0, 0.2, 0.1, 0.8, 0.1, 0.5, 0.0];
        let peaks = find_peaks(&x, &PeakPolicy::default().min_height(0.4)).unwrap();
        assert_eq!(indices(&peaks), vec![3, 5]);

        let peaks = find_peaks(&x, &PeakPolicy::default().height(Bound::between(0.4, 0.6))).unwrap();
        assert_eq!(indices(&peaks), vec![5]);
    }

    #[test]
    fn find_peaks_threshold() {
        let x = [0.0, 0.2, 0.1, 0.8, 0.1, 0.5, 0.0];
        let peaks = find_peaks(&x, &PeakPolicy::default().threshold(Bound::at_least(0.3))).unwrap();
        assert_eq!(indices(&peaks), vec![3, 5]);
    }

    #[test]
    fn find_peaks_distance_keeps_highest() {
        let x = [0.0, 0.6, 0.0, 0.9, 0.0, 0.7, 0.0, 0.0, 0.0, 0.4, 0.0];
        let peaks = find_peaks(&x, &PeakPolicy::default().distance(3.0)).unwrap();
        assert_eq!(indices(&peaks), vec![3, 9]);
    }

    #[test]
    fn find_peaks_prominence() {
        let x = [0.0, 3.0, 2.5, 2.8, 0.0];
        let peaks = find_peaks(&x, &PeakPolicy::default().prominence(Bound::at_least(1.0))).unwrap();
        assert_eq!(indices(&peaks), vec![1]);
        assert_relative_eq!(peaks[0].prominence.unwrap().prominence, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn find_peaks_width() {
        let x = [0.0, 1.0, 0.0, 0.0, 0.5, 1.0, 1.0, 0.5, 0.0];
        let peaks = find_peaks(&x, &PeakPolicy::default().width(Bound::at_least(2.0))).unwrap();
        assert_eq!(indices(&peaks), vec![5]);
        assert!(peaks[0].width.unwrap().width >= 2.0);
    }

    #[test]
    fn find_peaks_plateau_size() {
        let x = [0.0, 1.0, 0.0, 2.0, 2.0, 2.0, 0.0];
        let peaks = find_peaks(&x, &PeakPolicy::default().plateau_size(Bound::at_least(2.0))).unwrap();
        assert_eq!(indices(&peaks), vec![4]);
    }

    #[test]
    fn find_peaks_all_zero_below_height() {
        let peaks = find_peaks(&[0.0; 20], &PeakPolicy::default().min_height(0.5)).unwrap();
        assert!(peaks.is_empty());
    }

    #[test]
    fn find_peaks_rejects_nan_and_bad_policy() {
        assert!(find_peaks(&[0.0, f64::NAN, 0.0], &PeakPolicy::default()).is_err());
        assert!(find_peaks(&[0.0, 1.0, 0.0], &PeakPolicy::default().distance(0.5)).is_err());
        assert!(find_peaks(&[0.0, 1.0, 0.0], &PeakPolicy::default().wlen(1.0)).is_err());
    }

    // ==================== serde ====================

    #[test]
    fn bound_deserializes_from_number_pair_and_object() {
        let b: Bound = serde_json::from_str("0.5").unwrap();
        assert_eq!(b, Bound::at_least(0.5));

        let b: Bound = serde_json::from_str("[null, 2.0]").unwrap();
        assert_eq!(b, Bound::at_most(2.0));

        let b: Bound = serde_json::from_str(r#"{"min": 1.0, "max": 3.0}"#).unwrap();
        assert_eq!(b, Bound::between(1.0, 3.0));
    }

    #[test]
    fn policy_deserializes_with_defaults() {
        let policy: PeakPolicy = serde_json::from_str(r#"{"height": 0.5, "distance": 4}"#).unwrap();
        assert_eq!(policy.height, Some(Bound::at_least(0.5)));
        assert_eq!(policy.distance, Some(4.0));
        assert_relative_eq!(policy.rel_height, 0.5, epsilon = 1e-12);
        assert!(policy.prominence.is_none());
    }
}
