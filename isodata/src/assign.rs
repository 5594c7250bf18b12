//! Nearest-center assignment (vector quantization)

use rayon::prelude::*;

use crate::{
    error::{IsodataError, Result},
    types::{Assignment, ClusterSet, EuclideanDistance, SampleMatrix},
};

/// Assign every sample to its closest cluster center
///
/// Distances are L2 over all features. On ties the cluster at the lowest
/// position wins. Samples are processed in parallel.
///
/// # Returns
/// * Assignment holding the winning cluster id and distance per sample
pub fn assign_samples(samples: &SampleMatrix, clusters: &ClusterSet) -> Result<Assignment> {
    if clusters.is_empty() {
        return Err(IsodataError::InternalConsistency {
            step: "assign_samples",
            reason: "no cluster centers to assign to".to_string(),
        });
    }
    if clusters.n_features() != samples.n_features() {
        return Err(IsodataError::InternalConsistency {
            step: "assign_samples",
            reason: format!(
                "centers have {} features, samples have {}",
                clusters.n_features(),
                samples.n_features()
            ),
        });
    }

    let nearest: Vec<(usize, f64)> = (0..samples.n_samples())
        .into_par_iter()
        .map(|i| {
            let row = samples.row(i);
            let mut best: Option<(usize, f64)> = None;
            for cluster in clusters.iter() {
                let d = row.squared_distance(cluster.center.as_slice());
                if best.is_none_or(|(_, b)| d < b) {
                    best = Some((cluster.id, d));
                }
            }
            // clusters is non-empty, so best is always set
            let (id, d) = best.unwrap_or((0, f64::INFINITY));
            (id, d.sqrt())
        })
        .collect();

    let (labels, distances) = nearest.into_iter().unzip();
    Ok(Assignment { labels, distances })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_go_to_nearest_center() {
        let samples = SampleMatrix::from_rows(&[
            vec![0.0, 0.0],
            vec![9.0, 9.0],
            vec![1.0, 0.0],
            vec![10.0, 12.0],
        ])
        .unwrap();
        let clusters = ClusterSet::from_parts(vec![vec![0.0, 0.0], vec![10.0, 10.0]], vec![3, 8]).unwrap();
        let assignment = assign_samples(&samples, &clusters).unwrap();
        assert_eq!(assignment.labels, vec![3, 8, 3, 8]);
        assert_eq!(assignment.distances[0], 0.0);
        assert_eq!(assignment.distances[2], 1.0);
        assert_eq!(assignment.distances[3], 2.0);
    }

    #[test]
    fn ties_go_to_lowest_position() {
        let samples = SampleMatrix::from_rows(&[vec![5.0]]).unwrap();
        let clusters = ClusterSet::from_parts(vec![vec![4.0], vec![6.0]], vec![9, 1]).unwrap();
        let assignment = assign_samples(&samples, &clusters).unwrap();
        assert_eq!(assignment.labels, vec![9]);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let samples = SampleMatrix::from_rows(&[vec![5.0, 1.0]]).unwrap();
        let clusters = ClusterSet::from_centers(vec![vec![4.0]]).unwrap();
        assert!(matches!(
            assign_samples(&samples, &clusters),
            Err(IsodataError::InternalConsistency { .. })
        ));
    }
}
