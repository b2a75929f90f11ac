use crate::error::{Error, Result};
use crate::geometry::{Path, PathMeasure};

/// Upper bound on dashes emitted for one path. Past it the path is drawn
/// undashed.
pub const MAX_DASH_COUNT: f32 = 1_000_000.0;

/// Dash pattern: alternating on/off lengths starting at `phase`.
#[derive(Debug, Clone, PartialEq)]
pub struct DashEffect {
    intervals: Vec<f32>,
    phase: f32,
    interval_length: f32,
    initial_index: usize,
    initial_length: f32,
}

impl DashEffect {
    /// `intervals` must have an even count of at least 2 with every entry
    /// finite and positive. Negative or oversized phases wrap into the pattern.
    pub fn new(intervals: &[f32], phase: f32) -> Result<Self> {
        if intervals.len() < 2 || intervals.len() % 2 != 0 {
            return Err(Error::invalid(format!(
                "dash intervals need an even count >= 2, got {}",
                intervals.len()
            )));
        }
        if let Some(bad) = intervals.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(Error::invalid(format!("dash intervals must be finite and > 0, got {bad}")));
        }
        if !phase.is_finite() {
            return Err(Error::invalid("dash phase must be finite"));
        }

        let len: f32 = intervals.iter().sum();
        if !len.is_finite() {
            return Err(Error::invalid("dash pattern length overflows"));
        }

        // Fold the phase into [0, len); -20 on a 100-long pattern is 80.
        let mut phase = phase;
        if phase < 0.0 {
            phase = -phase;
            if phase > len {
                phase %= len;
            }
            phase = len - phase;
            if phase == len {
                phase = 0.0;
            }
        } else if phase >= len {
            phase %= len;
        }

        let (initial_index, initial_length) = first_interval(intervals, phase);
        Ok(Self {
            intervals: intervals.to_vec(),
            phase,
            interval_length: len,
            initial_index,
            initial_length,
        })
    }

    #[inline]
    pub fn intervals(&self) -> &[f32] {
        &self.intervals
    }

    /// Normalized phase in `[0, interval_sum)`.
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Dashes every contour of `src`. Returns `None` when the dash count
    /// would exceed [`MAX_DASH_COUNT`].
    pub(crate) fn filter(&self, src: &Path, tolerance: f32) -> Option<Path> {
        let measure = PathMeasure::new(src, false, tolerance);
        let pairs = (self.intervals.len() / 2) as f32;
        let mut dst = Path::with_fill_type(src.fill_type());
        let mut dash_count = 0.0f32;

        for contour in &measure {
            let length = contour.length();
            dash_count += length * pairs / self.interval_length;
            if dash_count > MAX_DASH_COUNT {
                log::warn!("dash pattern too dense ({dash_count} dashes), drawing undashed");
                return None;
            }

            let mut skip_first = contour.is_closed();
            let mut added = false;
            let mut index = self.initial_index;
            let mut distance = 0.0f64;
            let mut dlen = self.initial_length as f64;

            while distance < length as f64 {
                added = false;
                if index % 2 == 0 && !skip_first {
                    added = true;
                    contour.segment(distance as f32, (distance + dlen) as f32, &mut dst, true);
                }
                distance += dlen;
                skip_first = false;
                index = (index + 1) % self.intervals.len();
                dlen = self.intervals[index] as f64;
            }

            // The run cut off at the seam of a closed contour continues the
            // last dash (or starts its own when the contour ended in a gap).
            if contour.is_closed() && self.initial_index % 2 == 0 {
                contour.segment(0.0, self.initial_length, &mut dst, !added);
            }
        }
        Some(dst)
    }
}

/// Interval index the phase falls in, and what is left of that interval.
fn first_interval(intervals: &[f32], mut phase: f32) -> (usize, f32) {
    for (i, &gap) in intervals.iter().enumerate() {
        if phase > gap || (phase == gap && gap != 0.0) {
            phase -= gap;
        } else {
            return (i, gap - phase);
        }
    }
    // Rounding in the pattern sum can leave a sliver of phase.
    (0, intervals[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::geometry::{PathDirection, PathVerb};

    fn on_length(p: &Path) -> f32 {
        PathMeasure::new(p, false, 0.01).total_length()
    }

    fn moves(p: &Path) -> usize {
        p.verbs().iter().filter(|v| **v == PathVerb::Move).count()
    }

    // ── construction ─────────────────────────────────────────────────────

    #[test]
    fn rejects_malformed_patterns() {
        assert!(matches!(DashEffect::new(&[10.0], 0.0), Err(Error::InvalidArgument(_))));
        assert!(DashEffect::new(&[10.0, 5.0, 3.0], 0.0).is_err());
        assert!(DashEffect::new(&[10.0, 0.0], 0.0).is_err());
        assert!(DashEffect::new(&[10.0, -2.0], 0.0).is_err());
        assert!(DashEffect::new(&[10.0, f32::NAN], 0.0).is_err());
        assert!(DashEffect::new(&[10.0, 10.0], f32::INFINITY).is_err());
    }

    #[test]
    fn phase_wraps_into_pattern() {
        let d = DashEffect::new(&[10.0, 5.0], -3.0).unwrap();
        assert_eq!(d.phase(), 12.0);
        assert_eq!((d.initial_index, d.initial_length), (1, 3.0));

        let d = DashEffect::new(&[10.0, 5.0], 31.0).unwrap();
        assert_eq!(d.phase(), 1.0);
        assert_eq!((d.initial_index, d.initial_length), (0, 9.0));
    }

    // ── dashing ──────────────────────────────────────────────────────────

    #[test]
    fn open_line_alternates() {
        let mut line = Path::new();
        line.move_to(0.0, 0.0).line_to(100.0, 0.0);
        let out = DashEffect::new(&[10.0, 10.0], 0.0).unwrap().filter(&line, 0.25).unwrap();
        assert_eq!(moves(&out), 5);
        assert!((on_length(&out) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn closed_rect_is_half_on() {
        let rect = Path::rect(Rect::new(0.0, 0.0, 100.0, 60.0), PathDirection::Cw);
        let out = DashEffect::new(&[10.0, 10.0], 0.0).unwrap().filter(&rect, 0.25).unwrap();
        assert!((on_length(&out) - 160.0).abs() < 1e-2);
    }

    #[test]
    fn closed_circle_is_about_half_on() {
        let d = 7.0;
        let circle = Path::circle(0.0, 0.0, 50.0, PathDirection::Cw).unwrap();
        let perimeter = PathMeasure::new(&circle, false, 0.01).total_length();
        let out = DashEffect::new(&[d, d], 0.0).unwrap().filter(&circle, 0.01).unwrap();
        assert!((on_length(&out) - perimeter / 2.0).abs() <= d);
    }

    #[test]
    fn phase_shifts_dashes_along_open_line() {
        let mut line = Path::new();
        line.move_to(0.0, 0.0).line_to(100.0, 0.0);
        let out = DashEffect::new(&[10.0, 10.0], 5.0).unwrap().filter(&line, 0.25).unwrap();
        assert_eq!(moves(&out), 6);
        assert_eq!(out.points()[0].x, 0.0);
        assert!((out.points()[1].x - 5.0).abs() < 1e-4);
        assert!((out.points()[2].x - 15.0).abs() < 1e-4);
        assert!((on_length(&out) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn any_phase_keeps_closed_rect_half_on() {
        let rect = Path::rect(Rect::new(0.0, 0.0, 100.0, 60.0), PathDirection::Cw);
        for step in 0..16 {
            let phase = step as f32 * 2.5 - 10.0;
            let out = DashEffect::new(&[10.0, 10.0], phase).unwrap().filter(&rect, 0.25).unwrap();
            let on = on_length(&out);
            assert!((on - 160.0).abs() < 1e-2, "phase {phase}: {on}");
        }
    }

    #[test]
    fn seam_dash_joins_the_last_run() {
        let square = Path::rect(Rect::new(0.0, 0.0, 10.0, 10.0), PathDirection::Cw);
        let out = DashEffect::new(&[15.0, 10.0], 0.0).unwrap().filter(&square, 0.25).unwrap();
        assert_eq!(moves(&out), 1);
        assert!((on_length(&out) - 30.0).abs() < 1e-3);
    }

    #[test]
    fn zero_length_path_dashes_to_nothing() {
        let mut dot = Path::new();
        dot.move_to(5.0, 5.0).line_to(5.0, 5.0);
        let out = DashEffect::new(&[4.0, 4.0], 0.0).unwrap().filter(&dot, 0.25).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn too_many_dashes_falls_back() {
        let mut line = Path::new();
        line.move_to(0.0, 0.0).line_to(1.0e6, 0.0);
        assert!(DashEffect::new(&[0.25, 0.25], 0.0).unwrap().filter(&line, 0.25).is_none());
    }
}
