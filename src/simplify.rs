//! Point-budget simplification for rendering.
//!
//! The default is uniform-stride sampling: cheap, order-preserving and
//! independent of geometry. It can under-sample tight switchbacks, which is
//! accepted for map previews. [`SimplifyMethod::DouglasPeucker`] is available
//! when shape fidelity matters more than speed; its output is still capped to
//! the same budget.
//!
//! Both methods work on indices so callers can line up the kept points with
//! per-point data such as cumulative distance.

use geo::{Coord, LineString, SimplifyIdx};

use crate::TrackPoint;

/// Default point budget for simplified output.
pub const DEFAULT_MAX_POINTS: u32 = 500;

/// How to reduce a track to the point budget.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimplifyMethod {
    /// Keep first, last and every `ceil(count / budget)`-th interior point.
    #[default]
    Uniform,
    /// Douglas-Peucker with the given tolerance (in degrees), then the uniform cap.
    DouglasPeucker { tolerance_degrees: f64 },
}

/// Indices kept by uniform-stride sampling.
///
/// - `count <= budget`: every index (identity).
/// - otherwise: `0`, every interior multiple of `stride = ceil(count / budget)`,
///   and `count - 1`. The result is strictly increasing, has no duplicates and
///   holds at most `budget + 2` entries.
///
/// A budget of zero is treated as one.
///
/// # Example
///
/// ```rust
/// use route_geometry::simplify::uniform_indices;
///
/// assert_eq!(uniform_indices(3, 500), vec![0, 1, 2]);
/// assert_eq!(uniform_indices(10, 4), vec![0, 3, 6, 9]);
/// assert_eq!(uniform_indices(11, 4), vec![0, 3, 6, 9, 10]);
/// ```
pub fn uniform_indices(count: usize, budget: usize) -> Vec<usize> {
    let budget = budget.max(1);
    if count <= budget {
        return (0..count).collect();
    }

    let stride = count.div_ceil(budget);
    let last = count - 1;

    let mut indices = Vec::with_capacity(budget + 2);
    indices.push(0);
    indices.extend((stride..last).step_by(stride));
    indices.push(last);
    indices
}

/// Indices kept by `method` under the given point budget.
pub fn simplify_indices(points: &[TrackPoint], budget: usize, method: SimplifyMethod) -> Vec<usize> {
    match method {
        SimplifyMethod::Uniform => uniform_indices(points.len(), budget),
        SimplifyMethod::DouglasPeucker { tolerance_degrees } => {
            if points.len() <= 2 {
                return (0..points.len()).collect();
            }

            let line: LineString<f64> = points
                .iter()
                .map(|p| Coord { x: p.longitude, y: p.latitude })
                .collect();
            let kept = line.simplify_idx(&tolerance_degrees);

            uniform_indices(kept.len(), budget)
                .into_iter()
                .map(|i| kept[i])
                .collect()
        }
    }
}

/// Uniform-stride simplification with the given budget.
///
/// Returns the input unchanged when it already fits.
pub fn simplify(points: &[TrackPoint], budget: usize) -> Vec<TrackPoint> {
    simplify_with(points, budget, SimplifyMethod::Uniform)
}

/// Simplify with an explicit method.
pub fn simplify_with(points: &[TrackPoint], budget: usize, method: SimplifyMethod) -> Vec<TrackPoint> {
    simplify_indices(points, budget, method)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(count: usize) -> Vec<TrackPoint> {
        (0..count)
            .map(|i| TrackPoint::new(45.0 + i as f64 * 0.0001, 7.0))
            .collect()
    }

    #[test]
    fn test_identity_within_budget() {
        let points = line(500);
        assert_eq!(simplify(&points, 500), points);
        assert_eq!(simplify(&points[..3], 500), points[..3].to_vec());
    }

    #[test]
    fn test_empty_and_single() {
        assert!(simplify(&[], 10).is_empty());
        assert_eq!(simplify(&line(1), 10).len(), 1);
    }

    #[test]
    fn test_keeps_first_and_last() {
        let points = line(1234);
        let simplified = simplify(&points, 100);
        assert_eq!(simplified.first(), points.first());
        assert_eq!(simplified.last(), points.last());
    }

    #[test]
    fn test_bounded_by_budget_plus_two() {
        for count in [501, 502, 999, 1000, 1001, 1499, 5000, 12_345] {
            for budget in [1, 2, 3, 7, 100, 500] {
                let indices = uniform_indices(count, budget);
                assert!(
                    indices.len() <= budget + 2,
                    "count={} budget={} kept={}",
                    count,
                    budget,
                    indices.len()
                );
                assert!(indices.windows(2).all(|w| w[0] < w[1]), "not strictly increasing");
                assert_eq!(indices[0], 0);
                assert_eq!(*indices.last().unwrap(), count - 1);
            }
        }
    }

    #[test]
    fn test_interior_indices_are_stride_multiples() {
        let indices = uniform_indices(1001, 500);
        // stride = ceil(1001 / 500) = 3
        let interior = &indices[1..indices.len() - 1];
        assert!(interior.iter().all(|i| i % 3 == 0));
        assert_eq!(interior.len(), 333);
    }

    #[test]
    fn test_last_point_not_duplicated_when_on_stride() {
        // count - 1 = 9 is a multiple of stride 3
        assert_eq!(uniform_indices(10, 4), vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_zero_budget_treated_as_one() {
        assert_eq!(uniform_indices(3, 0), vec![0, 2]);
        assert_eq!(uniform_indices(1, 0), vec![0]);
    }

    #[test]
    fn test_douglas_peucker_collapses_straight_line() {
        let points = line(50);
        let simplified = simplify_with(
            &points,
            500,
            SimplifyMethod::DouglasPeucker { tolerance_degrees: 0.00001 },
        );
        assert_eq!(simplified, vec![points[0], points[49]]);
    }

    #[test]
    fn test_douglas_peucker_keeps_corner() {
        let points = vec![
            TrackPoint::new(0.0, 0.0),
            TrackPoint::new(0.0, 0.5),
            TrackPoint::new(0.0, 1.0),
            TrackPoint::new(0.5, 1.0),
            TrackPoint::new(1.0, 1.0),
        ];
        let indices = simplify_indices(
            &points,
            500,
            SimplifyMethod::DouglasPeucker { tolerance_degrees: 0.01 },
        );
        assert_eq!(indices, vec![0, 2, 4]);
    }

    #[test]
    fn test_douglas_peucker_respects_budget() {
        // Zig-zag that Douglas-Peucker cannot reduce
        let points: Vec<TrackPoint> = (0..300)
            .map(|i| TrackPoint::new(if i % 2 == 0 { 0.0 } else { 0.1 }, i as f64 * 0.01))
            .collect();
        let indices = simplify_indices(
            &points,
            50,
            SimplifyMethod::DouglasPeucker { tolerance_degrees: 0.001 },
        );
        assert!(indices.len() <= 52);
        assert_eq!(indices[0], 0);
        assert_eq!(*indices.last().unwrap(), 299);
    }
}
