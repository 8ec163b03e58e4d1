//! Poincaré sections of a sampled trajectory.
//!
//! Two section modes are supported:
//!
//! - **Interpolated**: every trajectory segment `[r1, r2]` that crosses a plane
//!   `n·r + d = 0` contributes the linearly interpolated crossing point.
//! - **Threshold**: samples lying in a thin band around a coordinate plane are
//!   kept as they are, without interpolation.
//!
//! In interpolated mode the default [`CrossingTest::OriginSign`] detects a
//! crossing when `n·r1` and `n·r2` have opposite signs, i.e. it ignores the
//! offset `d`, which only enters the interpolation parameter. Segments
//! detected this way are still dropped unless the interpolated parameter
//! lies in `[0, 1]`, so with `d != 0` a segment is reported only when it
//! spans both the plane through the origin and the offset plane.
//! [`CrossingTest::SignedDistance`] tests `(n·r1 + d)(n·r2 + d) < 0` instead.

use crate::error::ConfigError;
use crate::system::State;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// The plane `normal · r + offset = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vector3::new(0.0, 1.0, 0.0),
            offset: -1.0,
        }
    }
}

impl Plane {
    pub fn new(normal: Vector3<f64>, offset: f64) -> Self {
        Self { normal, offset }
    }

    pub fn signed_distance(&self, r: &State) -> f64 {
        self.normal.dot(r) + self.offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingTest {
    /// Sign change of `n·r`, offset ignored.
    #[default]
    OriginSign,
    /// Sign change of `n·r + d`.
    SignedDistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SectionMode {
    Interpolated {
        plane: Plane,
        #[serde(default)]
        test: CrossingTest,
    },
    /// Keeps samples with `|r[axis]| < half_width` whose other two
    /// coordinates are strictly positive.
    Threshold { axis: Axis, half_width: f64 },
}

impl Default for SectionMode {
    fn default() -> Self {
        SectionMode::Interpolated {
            plane: Plane::default(),
            test: CrossingTest::OriginSign,
        }
    }
}

impl SectionMode {
    /// Default band of the thresholding variant: `|x| < 0.01`, `y > 0`, `z > 0`.
    pub fn default_threshold() -> Self {
        SectionMode::Threshold {
            axis: Axis::X,
            half_width: 0.01,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            SectionMode::Interpolated { plane, .. } => {
                if !(plane.normal.iter().all(|v| v.is_finite()) && plane.offset.is_finite()) {
                    return Err(ConfigError::NonFinite {
                        field: "section plane",
                    });
                }
                if plane.normal.iter().all(|v| *v == 0.0) {
                    return Err(ConfigError::ZeroNormal);
                }
                Ok(())
            }
            SectionMode::Threshold { half_width, .. } => {
                if !(half_width.is_finite() && *half_width > 0.0) {
                    return Err(ConfigError::InvalidSectionWidth(*half_width));
                }
                Ok(())
            }
        }
    }

    pub fn extract(&self, states: &[State]) -> Vec<State> {
        match *self {
            SectionMode::Interpolated { plane, test } => plane_crossings(states, &plane, test),
            SectionMode::Threshold { axis, half_width } => {
                threshold_band(states, axis, half_width)
            }
        }
    }
}

/// Crossing point of the segment `[r1, r2]` with `plane`, if any.
///
/// Parallel segments (zero denominator) never intersect. Both ends of the
/// parameter range are inclusive, so a crossing exactly at a sample may be
/// reported by both adjacent segments.
pub fn segment_crossing(r1: &State, r2: &State, plane: &Plane, test: CrossingTest) -> Option<State> {
    let detected = match test {
        CrossingTest::OriginSign => plane.normal.dot(r1) * plane.normal.dot(r2) < 0.0,
        CrossingTest::SignedDistance => plane.signed_distance(r1) * plane.signed_distance(r2) < 0.0,
    };
    if !detected {
        return None;
    }

    let direction = r2 - r1;
    let denom = plane.normal.dot(&direction);
    if denom == 0.0 {
        return None;
    }
    let t = -plane.signed_distance(r1) / denom;
    if (0.0..=1.0).contains(&t) {
        Some(r1 + direction * t)
    } else {
        None
    }
}

/// All crossings of consecutive sample pairs, in trajectory order.
pub fn plane_crossings(states: &[State], plane: &Plane, test: CrossingTest) -> Vec<State> {
    states
        .windows(2)
        .filter_map(|pair| segment_crossing(&pair[0], &pair[1], plane, test))
        .collect()
}

pub fn threshold_band(states: &[State], axis: Axis, half_width: f64) -> Vec<State> {
    let k = axis.index();
    states
        .iter()
        .filter(|r| {
            r[k].abs() < half_width && (0..3).filter(|&i| i != k).all(|i| r[i] > 0.0)
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn y_plane(offset: f64) -> Plane {
        Plane::new(Vector3::new(0.0, 1.0, 0.0), offset)
    }

    #[test]
    fn midpoint_crossing_is_exact() {
        let r1 = Vector3::new(1.0, -1.0, 2.0);
        let r2 = Vector3::new(3.0, 1.0, 4.0);
        let points = plane_crossings(&[r1, r2], &y_plane(0.0), CrossingTest::OriginSign);
        assert_eq!(points.len(), 1);
        assert!((points[0] - Vector3::new(2.0, 0.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn one_sided_trajectory_has_no_crossings() {
        let states: Vec<State> = (0..50)
            .map(|i| Vector3::new(i as f64, 0.5 + (i as f64).sin().abs(), -1.0))
            .collect();
        for test in [CrossingTest::OriginSign, CrossingTest::SignedDistance] {
            assert!(plane_crossings(&states, &y_plane(0.0), test).is_empty());
        }
    }

    #[test]
    fn degenerate_trajectories_are_empty() {
        let plane = y_plane(0.0);
        assert!(plane_crossings(&[], &plane, CrossingTest::OriginSign).is_empty());
        assert!(
            plane_crossings(&[Vector3::new(0.0, 1.0, 0.0)], &plane, CrossingTest::OriginSign)
                .is_empty()
        );
    }

    #[test]
    fn parallel_segment_is_not_an_intersection() {
        let plane = Plane::new(Vector3::new(1.0, 1.0, 0.0), 0.0);
        let r1 = Vector3::new(-1.0, 0.5, 0.0);
        let r2 = Vector3::new(-0.5, 0.0, 0.0);
        assert_eq!(plane.normal.dot(&(r2 - r1)), 0.0);
        assert_eq!(
            segment_crossing(&r1, &r2, &plane, CrossingTest::OriginSign),
            None
        );
    }

    #[test]
    fn origin_sign_test_ignores_offset() {
        // Crosses y = 1 but not y = 0.
        let r1 = Vector3::new(0.0, 0.5, 0.0);
        let r2 = Vector3::new(0.0, 1.5, 0.0);
        let plane = y_plane(-1.0);
        assert_eq!(
            segment_crossing(&r1, &r2, &plane, CrossingTest::OriginSign),
            None
        );
        let point = segment_crossing(&r1, &r2, &plane, CrossingTest::SignedDistance)
            .expect("crossing of y = 1");
        assert!((point.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn origin_sign_test_reports_segments_spanning_both_planes() {
        let r1 = Vector3::new(0.0, -1.0, 0.0);
        let r2 = Vector3::new(4.0, 3.0, 0.0);
        let point = segment_crossing(&r1, &r2, &y_plane(-1.0), CrossingTest::OriginSign)
            .expect("segment spans y = 0 and y = 1");
        assert!((point - Vector3::new(2.0, 1.0, 0.0)).norm() < 1e-12);

        // Crosses y = 0 only; the interpolated parameter falls outside [0, 1].
        let r2 = Vector3::new(1.0, 0.5, 0.0);
        assert_eq!(
            segment_crossing(&r1, &r2, &y_plane(-1.0), CrossingTest::OriginSign),
            None
        );
    }

    #[test]
    fn crossings_follow_trajectory_order() {
        let states = vec![
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(2.0, -1.0, 0.0),
            Vector3::new(3.0, 1.0, 0.0),
        ];
        let points = plane_crossings(&states, &y_plane(0.0), CrossingTest::SignedDistance);
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.5, 1.5, 2.5]);
    }

    #[test]
    fn threshold_band_keeps_points_near_the_axis_plane() {
        let states = vec![
            Vector3::new(0.005, 1.0, 1.0),
            Vector3::new(0.02, 1.0, 1.0),
            Vector3::new(-0.009, 2.0, 0.5),
            Vector3::new(0.0, -1.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.01, 1.0, 1.0),
        ];
        let kept = SectionMode::default_threshold().extract(&states);
        assert_eq!(kept, vec![states[0], states[2]]);

        let band = [Vector3::new(1.0, 1.0, 0.1), Vector3::new(-1.0, 1.0, 0.1)];
        assert_eq!(threshold_band(&band, Axis::Z, 0.5), vec![band[0]]);
    }

    #[test]
    fn validate_rejects_bad_sections() {
        let zero = SectionMode::Interpolated {
            plane: Plane::new(Vector3::zeros(), 1.0),
            test: CrossingTest::OriginSign,
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroNormal));

        let nan = SectionMode::Interpolated {
            plane: Plane::new(Vector3::new(0.0, 1.0, 0.0), f64::NAN),
            test: CrossingTest::OriginSign,
        };
        assert!(matches!(nan.validate(), Err(ConfigError::NonFinite { .. })));

        let width = SectionMode::Threshold {
            axis: Axis::X,
            half_width: 0.0,
        };
        assert_eq!(width.validate(), Err(ConfigError::InvalidSectionWidth(0.0)));
        assert_eq!(SectionMode::default().validate(), Ok(()));
    }
}
