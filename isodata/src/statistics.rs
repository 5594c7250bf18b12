//! Distance statistics used by the split decision

use rayon::prelude::*;

use crate::{
    error::{IsodataError, Result},
    types::{Assignment, ClusterSet, EuclideanDistance, SampleMatrix},
};

/// Average distance from the members of each cluster to its center
///
/// # Returns
/// * One value per cluster, in cluster order
/// * `Err(DegenerateInput)` for a cluster without members
pub fn compute_avg_distance(
    samples: &SampleMatrix,
    assignment: &Assignment,
    clusters: &ClusterSet,
) -> Result<Vec<f64>> {
    let members = assignment.members();
    clusters
        .iter()
        .collect::<Vec<_>>()
        .par_iter()
        .map(|cluster| {
            let indices = members
                .get(&cluster.id)
                .filter(|indices| !indices.is_empty())
                .ok_or(IsodataError::DegenerateInput {
                    step: "compute_avg_distance",
                    cluster_id: cluster.id,
                })?;
            let total: f64 = indices
                .iter()
                .map(|&i| samples.row(i).euclidean_distance(cluster.center.as_slice()))
                .sum();
            Ok(total / indices.len() as f64)
        })
        .collect()
}

/// Overall average distance of the samples to their cluster centers
///
/// Per-cluster averages weighted by cluster population, divided by the
/// total number of samples in those clusters.
pub fn compute_overall_distance(
    assignment: &Assignment,
    avg_dists_to_clusters: &[f64],
    clusters: &ClusterSet,
) -> Result<f64> {
    if avg_dists_to_clusters.len() != clusters.len() {
        return Err(IsodataError::InternalConsistency {
            step: "compute_overall_distance",
            reason: format!(
                "{} average distances for {} clusters",
                avg_dists_to_clusters.len(),
                clusters.len()
            ),
        });
    }
    let counts = assignment.member_counts();
    let (total_dist, total_count) = clusters.iter().zip(avg_dists_to_clusters.iter()).fold(
        (0.0, 0usize),
        |(dist, count), (cluster, avg)| {
            let nbr_points = counts.get(&cluster.id).copied().unwrap_or(0);
            (dist + avg * nbr_points as f64, count + nbr_points)
        },
    );
    if total_count == 0 {
        return Err(IsodataError::InternalConsistency {
            step: "compute_overall_distance",
            reason: format!("no sample is assigned to any of {} clusters", clusters.len()),
        });
    }
    Ok(total_dist / total_count as f64)
}
