//! Fuzzy one-dimensional clustering of access point coordinates.
//!
//! Points on a floor are partitioned into ordered bands (rows or columns)
//! along one axis using a distance threshold. Banding is a single greedy
//! pass over the sorted coordinates, so the result is fully determined by
//! the coordinates, the threshold and the anchor policy.

pub mod axis;
pub mod bands;

pub use axis::{AnchorPolicy, Axis, Threshold};
pub use bands::{assign_bands, band_count};

use anyhow::Result;

use crate::models::{Coord, FloorPlan};

/// Clusters points on one floor along `axis`.
///
/// Resolves `threshold` against the floor, then delegates to
/// [`assign_bands`]. The result is indexed like `points`.
pub fn cluster_floor(
    points: &[Coord],
    floor: &FloorPlan,
    axis: Axis,
    threshold: Threshold,
    anchor: AnchorPolicy,
) -> Result<Vec<u32>> {
    let limit = threshold.resolve(axis, floor)?;
    let values: Vec<f64> = points.iter().map(|p| axis.value(*p)).collect();
    Ok(assign_bands(&values, limit, anchor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_floor_uses_axis_extent() {
        let floor = FloorPlan::new("f1", "Ground", 1000.0, 200.0);
        let points = [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 40.0, y: 40.0 },
        ];
        let threshold = Threshold::FloorFraction { divisor: 10.0 };

        // x threshold = 100: same column
        let columns = cluster_floor(&points, &floor, Axis::X, threshold, AnchorPolicy::Fixed).unwrap();
        assert_eq!(columns, vec![1, 1]);

        // y threshold = 20: different rows
        let rows = cluster_floor(&points, &floor, Axis::Y, threshold, AnchorPolicy::Fixed).unwrap();
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn test_cluster_floor_rejects_bad_threshold() {
        let floor = FloorPlan::new("f1", "Ground", 1000.0, 200.0);
        let result = cluster_floor(
            &[Coord { x: 0.0, y: 0.0 }],
            &floor,
            Axis::X,
            Threshold::FloorFraction { divisor: 0.0 },
            AnchorPolicy::Fixed,
        );
        assert!(result.is_err());
    }
}
