//! Initial cluster centers
//! Starting centers are either spread evenly over each feature's range or
//! drawn from the samples themselves

use rand::RngExt;
use rand_chacha::ChaCha20Rng;

use crate::{
    context::InitMethod,
    error::{IsodataError, Result},
    types::{ClusterSet, SampleMatrix},
};

/// Define the initial cluster centers, with ids `0..k_`
///
/// # Arguments
/// * `samples` - Sample matrix (N, F)
/// * `k_` - Number of centers to create
/// * `method` - `Linspace` or `Random`
/// * `rng` - Seeded generator, only drawn from by `Random`
///
/// # Returns
/// * ClusterSet of shape (k_, F)
///
/// # Methods
/// - Linspace: center `i` of feature `f` is `min_f + i * (max_f - min_f) / (k_ - 1)`,
///   so the first center holds the per-feature minima and the last the maxima
/// - Random: `k_` row indices drawn uniformly with replacement
pub fn initial_clusters(
    samples: &SampleMatrix,
    k_: usize,
    method: InitMethod,
    rng: &mut ChaCha20Rng,
) -> Result<ClusterSet> {
    if k_ == 0 {
        return Err(IsodataError::configuration("k_", k_, "must be >= 1"));
    }
    let centers: Vec<Vec<f64>> = match method {
        InitMethod::Linspace => {
            let (minimum, maximum) = samples.feature_bounds();
            (0..k_)
                .map(|i| {
                    minimum
                        .iter()
                        .zip(maximum.iter())
                        .map(|(&lo, &hi)| linspace_at(lo, hi, k_, i))
                        .collect()
                })
                .collect()
        }
        InitMethod::Random => (0..k_)
            .map(|_| samples.row(rng.random_range(0..samples.n_samples())).to_vec())
            .collect(),
    };
    ClusterSet::from_centers(centers)
}

// i-th of `num` evenly spaced values over [start, stop], endpoints exact
fn linspace_at(start: f64, stop: f64, num: usize, i: usize) -> f64 {
    if num == 1 || i == 0 {
        start
    } else if i == num - 1 {
        stop
    } else {
        start + (stop - start) * (i as f64) / ((num - 1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn linspace_spans_feature_range() {
        let samples = SampleMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let centers = initial_clusters(&samples, 2, InitMethod::Linspace, &mut rng).unwrap();
        let matrix = centers.center_matrix();
        assert_eq!(matrix.dim(), (2, 2));
        assert_eq!(matrix.row(0).to_vec(), vec![1.0, 2.0]);
        assert_eq!(matrix.row(1).to_vec(), vec![5.0, 6.0]);
        assert_eq!(centers.ids(), vec![0, 1]);
    }

    #[test]
    fn linspace_interior_points_are_even() {
        let samples = SampleMatrix::from_rows(&[vec![0.0], vec![10.0]]).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let centers = initial_clusters(&samples, 5, InitMethod::Linspace, &mut rng).unwrap();
        let firsts: Vec<f64> = centers.iter().map(|c| c.center[0]).collect();
        assert_eq!(firsts, vec![0.0, 2.5, 5.0, 7.5, 10.0]);

        let single = initial_clusters(&samples, 1, InitMethod::Linspace, &mut rng).unwrap();
        assert_eq!(single.center_matrix().row(0).to_vec(), vec![0.0]);
    }

    #[test]
    fn random_draws_sample_rows_reproducibly() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, (i * i) as f64]).collect();
        let samples = SampleMatrix::from_rows(&rows).unwrap();

        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let first = initial_clusters(&samples, 4, InitMethod::Random, &mut rng).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let second = initial_clusters(&samples, 4, InitMethod::Random, &mut rng).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        for cluster in first.iter() {
            assert!(rows.contains(&cluster.center));
        }
    }

    #[test]
    fn zero_centers_is_a_configuration_error() {
        let samples = SampleMatrix::from_rows(&[vec![1.0]]).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert!(matches!(
            initial_clusters(&samples, 0, InitMethod::Linspace, &mut rng),
            Err(IsodataError::Configuration { .. })
        ));
    }
}
