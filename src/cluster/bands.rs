//! Single-pass greedy band assignment along one axis.

use super::axis::AnchorPolicy;

/// Assigns each value to a band.
///
/// Values are visited in ascending order (stable, so equal values keep
/// their input order). The first value opens band 1. Each following value
/// joins the current band if `value - anchor <= threshold`, otherwise it
/// opens the next band and becomes its anchor. With [`AnchorPolicy::Sliding`]
/// every accepted value also becomes the new anchor.
///
/// The result is indexed like `values`. Bands are numbered contiguously
/// from 1 in ascending coordinate order.
pub fn assign_bands(values: &[f64], threshold: f64, anchor: AnchorPolicy) -> Vec<u32> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut bands = vec![0; values.len()];
    let mut visit = order.into_iter();
    let Some(first) = visit.next() else {
        return bands;
    };

    let mut band = 1;
    let mut anchor_value = values[first];
    bands[first] = band;

    for index in visit {
        let value = values[index];
        if value - anchor_value <= threshold {
            if anchor == AnchorPolicy::Sliding {
                anchor_value = value;
            }
        } else {
            band += 1;
            anchor_value = value;
        }
        bands[index] = band;
    }

    bands
}

/// Number of distinct bands in an assignment.
pub fn band_count(bands: &[u32]) -> u32 {
    bands.iter().copied().max().unwrap_or(0)
}
