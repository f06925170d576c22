//! Aspect-ratio-locked dimension coupling.
//!
//! The aspect ratio (width / height) is captured once when a source image is
//! loaded and held constant for the whole session; it is never recomputed
//! from an already-resized image.

/// Which dimension the caller just changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
}

/// Compute the complementary dimension for a changed one.
///
/// Returns `None` when locking is off; the complementary field is then left
/// untouched by the caller. No clamping is performed here: a zero or negative
/// target is rejected later by the pipeline, not by the geometry.
pub fn couple_dimension(changed: Dimension, value: u32, aspect_ratio: f64, lock: bool) -> Option<u32> {
    if !lock {
        return None;
    }

    let coupled = match changed {
        Dimension::Width => value as f64 / aspect_ratio,
        Dimension::Height => value as f64 * aspect_ratio,
    };

    Some(coupled.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_change_derives_height() {
        // 1000x500 source: aspect 2.0, width 500 -> height 250
        assert_eq!(couple_dimension(Dimension::Width, 500, 2.0, true), Some(250));
    }

    #[test]
    fn height_change_derives_width() {
        assert_eq!(couple_dimension(Dimension::Height, 250, 2.0, true), Some(500));
    }

    #[test]
    fn unlocked_is_a_no_op() {
        assert_eq!(couple_dimension(Dimension::Width, 500, 2.0, false), None);
    }

    #[test]
    fn rounds_to_nearest() {
        // 100 / 3.0 = 33.33 -> 33; 200 / 3.0 = 66.67 -> 67
        assert_eq!(couple_dimension(Dimension::Width, 100, 3.0, true), Some(33));
        assert_eq!(couple_dimension(Dimension::Width, 200, 3.0, true), Some(67));
    }

    #[test]
    fn round_trip_is_within_one_unit() {
        for &ratio in &[0.5, 1.0, 1.3333, 1.7778, 2.0, 3.1] {
            for width in (50u32..2000).step_by(173) {
                let height = couple_dimension(Dimension::Width, width, ratio, true).unwrap();
                let back = couple_dimension(Dimension::Height, height, ratio, true).unwrap();
                assert!(
                    (back as i64 - width as i64).abs() <= 1,
                    "ratio {ratio}: {width} -> {height} -> {back}"
                );
            }
        }
    }
}
