//! Cluster splitting
//! Breaks the most spread-out cluster in two when it is both wide and
//! well populated

use rayon::prelude::*;
use tracing::trace;

use crate::{
    error::{IsodataError, Result},
    statistics::{compute_avg_distance, compute_overall_distance},
    types::{Assignment, Cluster, ClusterSet, EuclideanDistance, SampleMatrix},
};

/// Split the cluster with the largest standard deviation into two
///
/// The standard deviation of a cluster is `sqrt(sum(|x - c|^2) / n)` over its
/// members. The widest cluster is split only if all of these hold:
/// - its standard deviation is above `theta_s`
/// - its average member distance is at least the overall average distance
/// - it has more than `2 * theta_m` members
///
/// The chosen cluster is replaced by two clusters centered at
/// `center + offset` and `center - offset`, with ids one and two above the
/// current maximum id, and the set is re-sorted.
///
/// # Returns
/// * `true` if a split happened, `false` if the set is unchanged
pub fn split_clusters(
    samples: &SampleMatrix,
    assignment: &Assignment,
    clusters: &mut ClusterSet,
    theta_s: f64,
    theta_m: usize,
    offset: f64,
) -> Result<bool> {
    clusters.check_consistency("split_clusters")?;
    if clusters.is_empty() {
        return Ok(false);
    }

    let avg_dists_to_clusters = compute_avg_distance(samples, assignment, clusters)?;
    let d = compute_overall_distance(assignment, &avg_dists_to_clusters, clusters)?;

    let members = assignment.members();
    let spread: Vec<(usize, f64)> = clusters
        .iter()
        .collect::<Vec<_>>()
        .par_iter()
        .map(|cluster| {
            let indices = members.get(&cluster.id).map(Vec::as_slice).unwrap_or(&[]);
            if indices.is_empty() {
                return Err(IsodataError::DegenerateInput {
                    step: "split_clusters",
                    cluster_id: cluster.id,
                });
            }
            let value: f64 = indices
                .iter()
                .map(|&i| samples.row(i).squared_distance(cluster.center.as_slice()))
                .sum();
            Ok((indices.len(), (value / indices.len() as f64).sqrt()))
        })
        .collect::<Result<_>>()?;

    // first maximum wins
    let (position, &(count, max_stddev)) = spread
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, &(usize, f64))>, (i, s)| match best {
            Some((_, b)) if b.1 >= s.1 => best,
            _ => Some((i, s)),
        })
        .ok_or(IsodataError::InternalConsistency {
            step: "split_clusters",
            reason: "no cluster statistics".to_string(),
        })?;

    trace!(
        position,
        max_stddev,
        avg = avg_dists_to_clusters[position],
        overall = d,
        count,
        "split candidate"
    );

    if max_stddev <= theta_s || avg_dists_to_clusters[position] < d || count as f64 <= 2.0 * theta_m as f64 {
        return Ok(false);
    }

    let max_id = clusters.max_id().unwrap_or(0);
    let old_center = clusters
        .get(position)
        .map(|c| c.center.clone())
        .unwrap_or_default();

    clusters.remove_positions(&[position]);
    clusters.push(Cluster {
        id: max_id + 1,
        center: old_center.iter().map(|v| v + offset).collect(),
    })?;
    clusters.push(Cluster {
        id: max_id + 2,
        center: old_center.iter().map(|v| v - offset).collect(),
    })?;
    clusters.sort_by_first();

    clusters.check_consistency("split_clusters")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assign::assign_samples, update::update_clusters};

    // Tight cluster around 0 and a wide one around 100, 30 samples each
    fn two_groups() -> SampleMatrix {
        let mut rows = Vec::new();
        for i in 0..30 {
            rows.push(vec![(i % 3) as f64 * 0.01]);
            rows.push(vec![100.0 + (i as f64 - 15.0) * 2.0]);
        }
        SampleMatrix::from_rows(&rows).unwrap()
    }

    fn settled(samples: &SampleMatrix) -> (Assignment, ClusterSet) {
        let mut clusters = ClusterSet::from_parts(vec![vec![0.0], vec![100.0]], vec![3, 5]).unwrap();
        let assignment = assign_samples(samples, &clusters).unwrap();
        update_clusters(samples, &assignment, &mut clusters).unwrap();
        (assignment, clusters)
    }

    #[test]
    fn widest_cluster_is_split_with_fresh_ids() {
        let samples = two_groups();
        let (assignment, mut clusters) = settled(&samples);
        let wide_center = clusters.get(1).unwrap().center[0];

        let split = split_clusters(&samples, &assignment, &mut clusters, 1.0, 10, 10.0).unwrap();

        assert!(split);
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters.ids(), vec![3, 7, 6]);
        let firsts: Vec<f64> = clusters.iter().map(|c| c.center[0]).collect();
        assert_eq!(firsts[1], wide_center - 10.0);
        assert_eq!(firsts[2], wide_center + 10.0);
        assert!(firsts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn no_split_below_stddev_threshold() {
        let samples = two_groups();
        let (assignment, mut clusters) = settled(&samples);
        let before = clusters.clone();
        assert!(!split_clusters(&samples, &assignment, &mut clusters, 1000.0, 10, 10.0).unwrap());
        assert_eq!(clusters, before);
    }

    #[test]
    fn no_split_when_population_is_small() {
        let samples = two_groups();
        let (assignment, mut clusters) = settled(&samples);
        let before = clusters.clone();
        // every cluster has 30 members, 30 <= 2 * 15
        assert!(!split_clusters(&samples, &assignment, &mut clusters, 0.0, 15, 10.0).unwrap());
        assert_eq!(clusters, before);
    }

    #[test]
    fn no_split_when_widest_is_below_overall_average() {
        // around 0: ten samples at distance 3 (stddev 3, average 3)
        // around 100: eight on the center, two at distance 10 (stddev ~4.47, average 2)
        // overall average is 2.5, so the widest cluster is not overextended
        let mut rows: Vec<Vec<f64>> = (0..10).map(|i| vec![if i % 2 == 0 { -3.0 } else { 3.0 }]).collect();
        rows.extend((0..8).map(|_| vec![100.0]));
        rows.push(vec![90.0]);
        rows.push(vec![110.0]);
        let samples = SampleMatrix::from_rows(&rows).unwrap();
        let mut clusters = ClusterSet::from_parts(vec![vec![0.0], vec![100.0]], vec![0, 1]).unwrap();
        let assignment = assign_samples(&samples, &clusters).unwrap();

        let before = clusters.clone();
        assert!(!split_clusters(&samples, &assignment, &mut clusters, 0.5, 1, 10.0).unwrap());
        assert_eq!(clusters, before);
    }
}
