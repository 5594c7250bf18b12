//! Removal of under-populated clusters

use tracing::trace;

use crate::{
    error::Result,
    types::{Assignment, ClusterSet},
};

/// Discard clusters with `theta_m` members or fewer
///
/// All under-populated clusters are removed in a single pass, so the
/// surviving records keep their relative order.
///
/// # Returns
/// * Number of clusters removed
pub fn discard_clusters(
    assignment: &Assignment,
    clusters: &mut ClusterSet,
    theta_m: usize,
) -> Result<usize> {
    clusters.check_consistency("discard_clusters")?;
    let counts = assignment.member_counts();

    let to_delete: Vec<usize> = clusters
        .iter()
        .enumerate()
        .filter(|(_, cluster)| counts.get(&cluster.id).copied().unwrap_or(0) <= theta_m)
        .map(|(position, _)| position)
        .collect();

    if !to_delete.is_empty() {
        trace!(removed = ?to_delete, theta_m, "discarding under-populated clusters");
        clusters.remove_positions(&to_delete);
    }

    clusters.check_consistency("discard_clusters")?;
    Ok(to_delete.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(labels: Vec<usize>) -> Assignment {
        let n = labels.len();
        Assignment { labels, distances: vec![0.0; n] }
    }

    #[test]
    fn clusters_at_or_below_threshold_are_removed() {
        let mut clusters =
            ClusterSet::from_parts(vec![vec![0.0], vec![5.0], vec![9.0]], vec![10, 11, 12]).unwrap();
        // 10 -> 3 members, 11 -> 2 members, 12 -> none
        let labels = assignment(vec![10, 10, 11, 10, 11]);
        let removed = discard_clusters(&labels, &mut clusters, 2).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(clusters.ids(), vec![10]);
    }

    #[test]
    fn nothing_removed_when_all_populated() {
        let mut clusters = ClusterSet::from_centers(vec![vec![0.0], vec![5.0]]).unwrap();
        let before = clusters.clone();
        let removed = discard_clusters(&assignment(vec![0, 1, 0, 1]), &mut clusters, 1).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(clusters, before);
    }

    #[test]
    fn zero_threshold_only_drops_empty_clusters() {
        let mut clusters = ClusterSet::from_centers(vec![vec![0.0], vec![5.0], vec![7.0]]).unwrap();
        discard_clusters(&assignment(vec![0, 2]), &mut clusters, 0).unwrap();
        assert_eq!(clusters.ids(), vec![0, 2]);
    }
}
