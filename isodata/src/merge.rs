//! Cluster merging
//!
//! Provides functions for:
//! - Ranking every pair of cluster centers by distance
//! - Fusing the closest pairs into population-weighted clusters

use tracing::trace;

use crate::{
    error::{IsodataError, Result},
    types::{Assignment, Cluster, ClusterSet, EuclideanDistance},
};

/// Distance between the clusters at two positions, `first > second`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairDistance {
    pub distance: f64,
    pub first: usize,
    pub second: usize,
}

/// Compute the distance between every two cluster centers, sorted ascending
///
/// Pairs are keyed by position, not id. Equal distances keep the order
/// in which the pairs were generated.
pub fn compute_pairwise_distances(clusters: &ClusterSet) -> Vec<PairDistance> {
    let mut pair_dists: Vec<PairDistance> = Vec::new();
    for (i, ci) in clusters.iter().enumerate() {
        for (j, cj) in clusters.iter().enumerate().take(i) {
            pair_dists.push(PairDistance {
                distance: ci.center.euclidean_distance(cj.center.as_slice()),
                first: i,
                second: j,
            });
        }
    }
    pair_dists.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    pair_dists
}

/// Merge up to `p` pairs of clusters closer than `theta_c`
///
/// Each merged center is the member-count weighted mean of the two old
/// centers, rounded to the nearest integer per feature. A cluster takes
/// part in at most one merge per call. Merged clusters get fresh ids above
/// every id present before the merge, then the set is re-sorted.
///
/// # Arguments
/// * `assignment` - Cluster id per sample, used for the weights
/// * `clusters` - Clusters to merge in place
/// * `p` - Maximum number of closest pairs considered
/// * `theta_c` - Pairs at this distance or more are never merged
///
/// # Returns
/// * Number of pairs merged
pub fn merge_clusters(
    assignment: &Assignment,
    clusters: &mut ClusterSet,
    p: usize,
    theta_c: f64,
) -> Result<usize> {
    clusters.check_consistency("merge_clusters")?;

    let pair_dists = compute_pairwise_distances(clusters);
    let below_threshold: Vec<&PairDistance> = pair_dists
        .iter()
        .take(p)
        .filter(|pair| pair.distance < theta_c)
        .collect();

    if below_threshold.is_empty() {
        return Ok(0);
    }

    let counts = assignment.member_counts();
    let next_id = clusters.max_id().map(|id| id + 1).unwrap_or(0);
    let mut consumed = vec![false; clusters.len()];
    let mut to_add: Vec<Cluster> = Vec::new();
    let mut to_delete: Vec<usize> = Vec::new();

    for pair in below_threshold {
        if consumed[pair.first] || consumed[pair.second] {
            continue;
        }
        let (c1, c2) = match (clusters.get(pair.first), clusters.get(pair.second)) {
            (Some(c1), Some(c2)) => (c1, c2),
            _ => {
                return Err(IsodataError::InternalConsistency {
                    step: "merge_clusters",
                    reason: format!("pair ({}, {}) out of range", pair.first, pair.second),
                });
            }
        };
        let c1_count = counts.get(&c1.id).copied().unwrap_or(0) as f64;
        let c2_count = counts.get(&c2.id).copied().unwrap_or(0) as f64;
        let (w1, w2) = if c1_count + c2_count > 0.0 {
            (c1_count / (c1_count + c2_count), c2_count / (c1_count + c2_count))
        } else {
            (0.5, 0.5)
        };
        let center: Vec<f64> = c1
            .center
            .iter()
            .zip(c2.center.iter())
            .map(|(a, b)| (w1 * a + w2 * b).round())
            .collect();

        trace!(first = c1.id, second = c2.id, distance = pair.distance, "merging clusters");

        to_add.push(Cluster { id: next_id + to_add.len(), center });
        to_delete.push(pair.first);
        to_delete.push(pair.second);
        consumed[pair.first] = true;
        consumed[pair.second] = true;
    }

    let merged = to_add.len();
    clusters.remove_positions(&to_delete);
    for cluster in to_add {
        clusters.push(cluster)?;
    }
    clusters.sort_by_first();

    clusters.check_consistency("merge_clusters")?;
    Ok(merged)
}
