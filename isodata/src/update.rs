//! Cluster center recalculation
//! Each center becomes the arithmetic mean of its assigned samples

use rayon::prelude::*;

use crate::{
    error::{IsodataError, Result},
    types::{Assignment, ClusterSet, SampleMatrix},
};

/// Recalculate every center as the mean of its members, then re-sort
///
/// The number of clusters never changes here. Samples whose label is not
/// a current cluster id (their cluster was discarded) are ignored.
///
/// # Arguments
/// * `samples` - Sample matrix (N, F)
/// * `assignment` - Cluster id per sample
/// * `clusters` - Clusters to update in place
///
/// # Returns
/// * `Err(DegenerateInput)` if a cluster has no members; averaging it would
///   produce NaN centers
pub fn update_clusters(
    samples: &SampleMatrix,
    assignment: &Assignment,
    clusters: &mut ClusterSet,
) -> Result<()> {
    clusters.check_consistency("update_clusters")?;
    let members = assignment.members();
    let n_features = samples.n_features();

    clusters.clusters_mut().par_iter_mut().try_for_each(|cluster| {
        let indices = match members.get(&cluster.id) {
            Some(indices) if !indices.is_empty() => indices,
            _ => {
                return Err(IsodataError::DegenerateInput {
                    step: "update_clusters",
                    cluster_id: cluster.id,
                });
            }
        };
        let mut sum = vec![0.0; n_features];
        for &i in indices.iter() {
            sum.iter_mut().zip(samples.row(i).iter()).for_each(|(s, v)| *s += v);
        }
        let count = indices.len() as f64;
        cluster.center = sum.into_iter().map(|s| s / count).collect();
        Ok(())
    })?;

    clusters.sort_by_first();
    clusters.check_consistency("update_clusters")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::assign_samples;

    #[test]
    fn centers_move_to_member_mean_and_resort() {
        let samples = SampleMatrix::from_rows(&[
            vec![0.0, 1.0],
            vec![2.0, 3.0],
            vec![10.0, 0.0],
            vec![-8.0, 4.0],
        ])
        .unwrap();
        let mut clusters = ClusterSet::from_parts(vec![vec![1.0, 2.0], vec![2.0, 2.0]], vec![4, 7]).unwrap();
        let assignment = Assignment {
            labels: vec![4, 4, 7, 7],
            distances: vec![0.0; 4],
        };
        update_clusters(&samples, &assignment, &mut clusters).unwrap();

        // cluster 7 mean is (1, 2), cluster 4 mean is (1, 2) too; stable order keeps 4 first
        assert_eq!(clusters.ids(), vec![4, 7]);
        assert_eq!(clusters.get(0).unwrap().center, vec![1.0, 2.0]);
        assert_eq!(clusters.get(1).unwrap().center, vec![1.0, 2.0]);
    }

    #[test]
    fn order_follows_first_feature_after_update() {
        let samples = SampleMatrix::from_rows(&[vec![50.0], vec![52.0], vec![1.0], vec![3.0]]).unwrap();
        let mut clusters = ClusterSet::from_parts(vec![vec![0.0], vec![100.0]], vec![0, 1]).unwrap();
        let assignment = Assignment {
            labels: vec![0, 0, 1, 1],
            distances: vec![0.0; 4],
        };
        update_clusters(&samples, &assignment, &mut clusters).unwrap();
        assert_eq!(clusters.ids(), vec![1, 0]);
        assert_eq!(clusters.center_matrix().column(0).to_vec(), vec![2.0, 51.0]);
    }

    #[test]
    fn empty_cluster_is_degenerate() {
        let samples = SampleMatrix::from_rows(&[vec![1.0], vec![2.0]]).unwrap();
        let mut clusters = ClusterSet::from_centers(vec![vec![0.0], vec![9.0]]).unwrap();
        let assignment = Assignment { labels: vec![0, 0], distances: vec![0.0; 2] };
        assert_eq!(
            update_clusters(&samples, &assignment, &mut clusters),
            Err(IsodataError::DegenerateInput { step: "update_clusters", cluster_id: 1 })
        );
    }

    #[test]
    fn update_is_idempotent_without_reassignment() {
        let samples = SampleMatrix::from_rows(&[
            vec![0.5, 1.0],
            vec![1.5, 2.0],
            vec![7.0, 7.0],
            vec![8.0, 9.5],
            vec![9.0, 8.0],
        ])
        .unwrap();
        let mut clusters = ClusterSet::from_centers(vec![vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap();
        let assignment = assign_samples(&samples, &clusters).unwrap();
        update_clusters(&samples, &assignment, &mut clusters).unwrap();
        let once = clusters.clone();
        update_clusters(&samples, &assignment, &mut clusters).unwrap();
        assert_eq!(clusters, once);
    }
}
