//! Confidence-gated derivative windows.
//!
//! A window around sample `i` spans `ceil(width / 2)` samples on each side,
//! clipped to the recording. Bounds that land on a low-confidence sample are
//! pulled *inward* toward `i` one sample at a time, except at the very first
//! and last sample of the recording, which are never adjusted.
//!
//! Bounds move inward, never outward to a confident sample further from `i`.
//! This looks odd but the published feature values depend on it;
//! `test_dip_next_to_edge_moves_inward` pins it.

use crate::config::DEFAULT_MIN_CONFIDENCE;

/// Threshold test applied to every sample's confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceGate {
    threshold: f64,
}

impl ConfidenceGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Strictly below the threshold. A missing (`NaN`) confidence is not
    /// below anything, so it does not fail.
    pub fn fails(&self, confidence: f64) -> bool {
        confidence < self.threshold
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONFIDENCE)
    }
}

/// Inclusive sample range used for one derivative estimate. `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

/// Half-width step for a nominal window width.
pub fn half_width(width: usize) -> usize {
    width.div_ceil(2)
}

/// Find the window around `center`, or `None` if the center fails the gate
/// or the bounds collapse onto a single sample.
pub fn locate(
    center: usize,
    step: usize,
    confidence: &[f64],
    gate: ConfidenceGate,
) -> Option<Window> {
    let n = confidence.len();
    if center >= n || gate.fails(confidence[center]) {
        return None;
    }

    let mut start = center.saturating_sub(step);
    let mut end = center.saturating_add(step).min(n - 1);

    // The center does not fail the gate, so both loops stop at `center` at the latest.
    while start > 0 && start < center && gate.fails(confidence[start]) {
        start += 1;
    }
    while end < n - 1 && end > center && gate.fails(confidence[end]) {
        end -= 1;
    }

    (start != end).then_some(Window { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GATE: ConfidenceGate = ConfidenceGate { threshold: 0.75 };

    #[test]
    fn test_half_width() {
        assert_eq!(half_width(1), 1);
        assert_eq!(half_width(2), 1);
        assert_eq!(half_width(4), 2);
        assert_eq!(half_width(8), 4);
        assert_eq!(half_width(16), 8);
        assert_eq!(half_width(0), 0);
    }

    #[test]
    fn test_clipped_to_recording() {
        let conf = [1.0; 5];
        assert_eq!(locate(0, 2, &conf, GATE), Some(Window { start: 0, end: 2 }));
        assert_eq!(locate(4, 2, &conf, GATE), Some(Window { start: 2, end: 4 }));
        assert_eq!(locate(2, 8, &conf, GATE), Some(Window { start: 0, end: 4 }));
    }

    #[test]
    fn test_low_confidence_center_has_no_window() {
        let conf = [1.0, 0.5, 1.0];
        assert_eq!(locate(1, 1, &conf, GATE), None);
    }

    #[test]
    fn test_missing_confidence_is_not_below_gate() {
        let conf = [1.0, f64::NAN, 1.0];
        // A missing center still gets a window.
        assert_eq!(locate(1, 1, &conf, GATE), Some(Window { start: 0, end: 2 }));
        // A missing bound is not pulled inward.
        assert_eq!(locate(0, 1, &conf, GATE), Some(Window { start: 0, end: 1 }));
        assert_eq!(locate(2, 1, &conf, GATE), Some(Window { start: 1, end: 2 }));
    }

    #[test]
    fn test_dip_next_to_edge_moves_inward() {
        // Index 1 is a dip one sample inside the left edge of the window around 3.
        // The start bound walks right to 2; it does not search left to the
        // confident sample at 0.
        let conf = [1.0, 0.2, 1.0, 1.0, 1.0, 1.0, 1.0];
        assert_eq!(locate(3, 2, &conf, GATE), Some(Window { start: 2, end: 5 }));

        // Mirror image on the right.
        let conf = [1.0, 1.0, 1.0, 1.0, 1.0, 0.2, 1.0];
        assert_eq!(locate(3, 2, &conf, GATE), Some(Window { start: 1, end: 4 }));
    }

    #[test]
    fn test_recording_edges_are_never_adjusted() {
        // Low-confidence first and last samples stay in the window.
        let conf = [0.1, 1.0, 0.1];
        assert_eq!(locate(1, 1, &conf, GATE), Some(Window { start: 0, end: 2 }));
    }

    #[test]
    fn test_bounds_collapse_onto_center() {
        let conf = [1.0, 0.1, 1.0, 0.1, 1.0];
        assert_eq!(locate(2, 1, &conf, GATE), None);
    }

    #[test]
    fn test_one_sided_collapse_keeps_window() {
        let conf = [1.0, 0.1, 1.0, 1.0, 1.0];
        assert_eq!(locate(2, 1, &conf, GATE), Some(Window { start: 2, end: 3 }));
    }

    #[test]
    fn test_zero_step_or_single_sample() {
        assert_eq!(locate(0, 3, &[1.0], GATE), None);
        assert_eq!(locate(1, 0, &[1.0, 1.0, 1.0], GATE), None);
    }
}
